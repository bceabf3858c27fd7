//! Column and row-span assignment for a built flow tree, and its projection onto a grid.

use crate::error::ParseAlignmentError;
use crate::tree::{FlowTree, NodeId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod formatter;
pub mod projector;
mod solver;

pub use formatter::GridFormatter;
pub use projector::{GridCell, project};
pub use solver::RowCountSolver;

/// Which sibling absorbs the spare rows when a gateway is taller than its branches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Branches hug the top edge; the last branch stretches.
    #[default]
    Top,
    /// Branches hug the bottom edge; the first branch stretches.
    Bottom,
}

impl FromStr for Alignment {
    type Err = ParseAlignmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(Alignment::Top),
            "bottom" => Ok(Alignment::Bottom),
            other => Err(ParseAlignmentError(other.to_string())),
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alignment::Top => write!(f, "top"),
            Alignment::Bottom => write!(f, "bottom"),
        }
    }
}

/// Grid attributes of one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeLayout {
    /// 1-based column; strictly increases along every edge.
    pub column_index: usize,
    /// Number of grid rows the node spans, at least 1.
    pub row_count: usize,
}

/// A flow tree together with its solved grid attributes.
#[derive(Debug, Clone)]
pub struct FlowLayout {
    tree: FlowTree,
    attributes: Vec<NodeLayout>,
    column_count: usize,
    alignment: Alignment,
}

impl FlowLayout {
    /// Solves the layout of `tree`.
    pub fn compute(tree: FlowTree, alignment: Alignment) -> Result<Self, crate::error::FlowError> {
        let attributes = RowCountSolver::new(&tree, alignment).solve()?;
        let column_count = attributes
            .iter()
            .map(|attrs| attrs.column_index)
            .max()
            .unwrap_or(0);
        Ok(Self {
            tree,
            attributes,
            column_count,
            alignment,
        })
    }

    pub fn tree(&self) -> &FlowTree {
        &self.tree
    }

    pub fn into_tree(self) -> FlowTree {
        self.tree
    }

    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    /// Number of columns of the grid.
    pub fn column_count(&self) -> usize {
        self.column_count
    }

    /// Number of rows of the grid: the span of the `Start` node.
    pub fn row_total(&self) -> usize {
        self.row_count(self.tree.root())
    }

    /// Column and row span of one node.
    pub fn node_layout(&self, id: NodeId) -> NodeLayout {
        self.attributes[id.index()]
    }

    pub fn column_index(&self, id: NodeId) -> usize {
        self.attributes[id.index()].column_index
    }

    pub fn row_count(&self, id: NodeId) -> usize {
        self.attributes[id.index()].row_count
    }
}
