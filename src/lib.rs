//! # flowgrid - Flow Model Construction & Layout Engine
//!
//! **flowgrid** turns a flat, pointer-based flow description (steps, diverging gateways
//! and the places where paths meet again) into a validated tree laid out on a strict
//! rectangular grid. Every node receives a column index and a row span so that each
//! column of the grid is completely and consistently filled.
//!
//! ## Core Workflow
//!
//! 1.  **Describe the flow**: Build a `FlowDescription` directly, parse it from JSON, or
//!     implement the `IntoFlow` trait for your own editor model.
//! 2.  **Validate**: `validate` rejects cycles and merges of branches that are not direct
//!     neighbors (they would need crossing edges on a grid).
//! 3.  **Lay out**: `build_layout` builds the tree, synthesizes the converging gateways
//!     where paths meet, and solves column indices and row counts.
//! 4.  **Project**: `project` flattens the layout into grid cells for rendering.
//!
//! Edits go through the `edit` module, which produces a new description and can check
//! it with the same pipeline before the change is accepted.
//!
//! ## Quick Start
//!
//! ```rust
//! use flowgrid::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let flow = FlowDescription::from_json(r#"{
//!         "firstElementId": "a",
//!         "elements": {
//!             "a": { "branches": [{ "next": "b" }, { "next": "c" }] },
//!             "b": { "next": "d" },
//!             "c": { "next": "d" },
//!             "d": {}
//!         }
//!     }"#)?;
//!
//!     validate(&flow)?;
//!     let layout = build_layout(&flow, Alignment::Top)?;
//!
//!     // Start, a, two branches, b/c, two converging branches, the merge, d, End.
//!     assert_eq!(layout.column_count(), 8);
//!     assert_eq!(layout.row_total(), 2);
//!
//!     for cell in project(&layout) {
//!         println!("{:>6} at column {} row {} ({} rows)", cell.label, cell.column, cell.row, cell.row_span);
//!     }
//!     Ok(())
//! }
//! ```

pub mod description;
pub mod edit;
pub mod error;
pub mod layout;
pub mod pipeline;
pub mod prelude;
pub mod tree;
pub mod validate;

pub use pipeline::{build_layout, is_valid, validate};
