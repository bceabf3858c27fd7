pub mod builder;
pub mod conversion;
pub mod definition;

pub use builder::*;
pub use conversion::*;
pub use definition::*;
