//! Structural checks run before a flow may be laid out.

mod cycle;
mod merge;

pub use cycle::check_acyclic;
pub use merge::validate_merges;
