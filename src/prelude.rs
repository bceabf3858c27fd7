//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and functions from the flowgrid
//! crate. Import this module to get access to the core functionality without having to
//! import each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use flowgrid::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let json = std::fs::read_to_string("path/to/flow.json")?;
//! let flow = FlowDescription::from_json(&json)?;
//!
//! let layout = LayoutEngine::builder(flow)
//!     .with_alignment(Alignment::Top)
//!     .build()
//!     .layout()?;
//!
//! print!("{}", GridFormatter::format(&layout));
//! # Ok(())
//! # }
//! ```

// Pipeline entry points
pub use crate::pipeline::{LayoutEngine, LayoutEngineBuilder, build_layout, is_valid, validate};

// Flat description
pub use crate::description::{
    BranchDefinition, ContentElement, FlowDescription, FlowDescriptionBuilder, FlowElement,
    GatewayElement, IntoFlow, Payload,
};

// Tree and layout
pub use crate::layout::{Alignment, FlowLayout, GridCell, GridFormatter, NodeLayout, project};
pub use crate::tree::{FlowNode, FlowTree, NodeId, NodeKind, TargetKey};

// Edits
pub use crate::edit::{FlowEdit, apply_edit, try_edit};

// Error types
pub use crate::error::{ConversionError, FlowError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
