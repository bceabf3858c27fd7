use itertools::Itertools;
use thiserror::Error;

/// Errors produced while validating or laying out a flow description.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    #[error("Flow contains a cycle through element '{element_id}'")]
    Cycle { element_id: String },

    #[error("Converging gateways join non-neighboring branches before: {}", .targets.iter().join(", "))]
    Merge { targets: Vec<String> },

    #[error("Row-count propagation did not settle after {passes} passes")]
    LayoutDiverged { passes: usize },

    #[error("Failed to parse flow description JSON: {0}")]
    Json(String),
}

impl FlowError {
    /// The element identifiers (or `"end"`) this error points at.
    pub fn targets(&self) -> Vec<&str> {
        match self {
            FlowError::Cycle { element_id } => vec![element_id.as_str()],
            FlowError::Merge { targets } => targets.iter().map(String::as_str).collect(),
            FlowError::LayoutDiverged { .. } | FlowError::Json(_) => Vec::new(),
        }
    }
}

/// An alignment name other than `top` or `bottom`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown alignment '{0}', expected 'top' or 'bottom'")]
pub struct ParseAlignmentError(pub String);

/// Errors that can occur when converting a custom user format into a `FlowDescription`.
#[derive(Error, Debug, Clone)]
pub enum ConversionError {
    #[error("Invalid custom data: {0}")]
    Invalid(String),
}
