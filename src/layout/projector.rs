use super::FlowLayout;
use crate::tree::{NodeId, NodeKind};
use serde::Serialize;

/// The rectangle one node occupies on the grid. Rows and columns are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    pub node: NodeId,
    pub kind: &'static str,
    pub label: String,
    pub column: usize,
    pub column_span: usize,
    pub row: usize,
    pub row_span: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sibling_count: Option<usize>,
}

/// Flattens a solved layout into grid cells, one per node, in node order.
///
/// Row positions follow tree ownership from `Start` down: a node continues on its
/// predecessor's row, diverging branches stack below each other, and a converging
/// gateway starts on the row of its first branch. Converging branches stretch
/// horizontally up to their gateway's column.
pub fn project(layout: &FlowLayout) -> Vec<GridCell> {
    let tree = layout.tree();
    let mut row_starts = vec![0; tree.len()];
    row_starts[tree.root().index()] = 1;

    let mut stack = vec![tree.root()];
    while let Some(id) = stack.pop() {
        let node = tree.node(id);
        let row = row_starts[id.index()];
        match node.kind() {
            NodeKind::DivergingGateway { .. } => {
                let mut offset = row;
                for &branch in node.outgoing() {
                    row_starts[branch.index()] = offset;
                    offset += layout.row_count(branch);
                    stack.push(branch);
                }
            }
            NodeKind::ConvergingBranch { branch_index } => {
                // Only the owning branch places its gateway.
                if *branch_index == 0 {
                    if let Some(&gateway) = node.outgoing().first() {
                        row_starts[gateway.index()] = row;
                        stack.push(gateway);
                    }
                }
            }
            NodeKind::Start
            | NodeKind::Content { .. }
            | NodeKind::DivergingBranch { .. }
            | NodeKind::ConvergingGateway { .. }
            | NodeKind::End => {
                for &next in node.outgoing() {
                    row_starts[next.index()] = row;
                    stack.push(next);
                }
            }
        }
    }

    tree.iter()
        .map(|(id, node)| {
            let column = layout.column_index(id);
            let column_span = match node.kind() {
                NodeKind::ConvergingBranch { .. } => node
                    .outgoing()
                    .first()
                    .map(|&gateway| layout.column_index(gateway).saturating_sub(column).max(1))
                    .unwrap_or(1),
                _ => 1,
            };
            GridCell {
                node: id,
                kind: node.kind().name(),
                label: tree.describe(id),
                column,
                column_span,
                row: row_starts[id.index()],
                row_span: layout.row_count(id),
                branch_index: node.kind().branch_index(),
                sibling_count: tree.sibling_count(id),
            }
        })
        .collect()
}
