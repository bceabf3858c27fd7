use super::{Alignment, NodeLayout};
use crate::error::FlowError;
use crate::tree::{FlowTree, NodeId, NodeKind};
use tracing::{debug, trace, warn};

/// A relation between row counts that the solved layout must satisfy.
#[derive(Debug)]
enum Constraint {
    /// A node and its only successor, which has no other predecessor, span the same rows.
    Same(NodeId, NodeId),
    /// A gateway spans exactly the rows of its branches together.
    Split { hub: NodeId, parts: Vec<NodeId> },
}

/// Assigns every node of a tree a column index and a row count.
///
/// Row counts start from each node's own minimum and are only ever raised, pass after
/// pass, until every constraint holds.
pub struct RowCountSolver<'a> {
    tree: &'a FlowTree,
    alignment: Alignment,
}

impl<'a> RowCountSolver<'a> {
    pub fn new(tree: &'a FlowTree, alignment: Alignment) -> Self {
        Self { tree, alignment }
    }

    pub fn solve(&self) -> Result<Vec<NodeLayout>, FlowError> {
        let columns = self.column_indices();
        let rows = self.row_counts()?;
        Ok(columns
            .into_iter()
            .zip(rows)
            .map(|(column_index, row_count)| NodeLayout {
                column_index,
                row_count,
            })
            .collect())
    }

    /// Longest-path distance from `Start` (which is column 1), in topological order.
    pub fn column_indices(&self) -> Vec<usize> {
        let tree = self.tree;
        let mut columns = vec![0; tree.len()];
        let mut remaining: Vec<usize> = tree.iter().map(|(_, node)| node.incoming().len()).collect();
        let mut ready = vec![tree.root()];
        columns[tree.root().index()] = 1;

        while let Some(id) = ready.pop() {
            let column = columns[id.index()];
            for &next in tree.node(id).outgoing() {
                let slot = &mut columns[next.index()];
                *slot = (*slot).max(column + 1);
                remaining[next.index()] -= 1;
                if remaining[next.index()] == 0 {
                    ready.push(next);
                }
            }
        }
        columns
    }

    pub fn row_counts(&self) -> Result<Vec<usize>, FlowError> {
        let tree = self.tree;

        let root = tree.node(tree.root());
        if let [only] = root.outgoing() {
            if matches!(tree.kind(*only), NodeKind::End) {
                trace!("Empty flow, skipping row propagation");
                return Ok(vec![1; tree.len()]);
            }
        }

        let mut rows: Vec<usize> = tree
            .iter()
            .map(|(_, node)| node.incoming().len().max(node.outgoing().len()).max(1))
            .collect();
        let constraints = self.constraints();

        // On a tree built from an acyclic description no row count exceeds the node
        // count, and every pass that changes something raises at least one count, so
        // n² + 1 passes always suffice. Trees built from cyclic descriptions (the cycle
        // check skipped) can grow without bound and hit the cap.
        let max_passes = tree.len() * tree.len() + 1;
        for pass in 1..=max_passes {
            if !self.propagate(&constraints, &mut rows) {
                debug!(
                    passes = pass,
                    rows = rows[tree.root().index()],
                    alignment = %self.alignment,
                    "Row counts settled"
                );
                return Ok(rows);
            }
        }

        warn!(passes = max_passes, "Row counts did not settle");
        Err(FlowError::LayoutDiverged { passes: max_passes })
    }

    fn constraints(&self) -> Vec<Constraint> {
        let tree = self.tree;
        let mut constraints = Vec::new();
        for (id, node) in tree.iter() {
            match node.kind() {
                NodeKind::DivergingGateway { .. } => constraints.push(Constraint::Split {
                    hub: id,
                    parts: node.outgoing().to_vec(),
                }),
                NodeKind::ConvergingGateway { .. } => {
                    constraints.push(Constraint::Split {
                        hub: id,
                        parts: node.incoming().to_vec(),
                    });
                    if let Some(&target) = node.outgoing().first() {
                        constraints.push(Constraint::Same(id, target));
                    }
                }
                NodeKind::Start
                | NodeKind::Content { .. }
                | NodeKind::DivergingBranch { .. }
                | NodeKind::ConvergingBranch { .. } => {
                    // Edges into a converging gateway are covered by its split.
                    if let Some(&next) = node.outgoing().first() {
                        if tree.node(next).incoming().len() == 1 {
                            constraints.push(Constraint::Same(id, next));
                        }
                    }
                }
                NodeKind::End => {}
            }
        }
        constraints
    }

    /// Runs one pass over all constraints. Returns whether any row count grew.
    fn propagate(&self, constraints: &[Constraint], rows: &mut [usize]) -> bool {
        let mut changed = false;
        for constraint in constraints {
            match constraint {
                Constraint::Same(a, b) => {
                    let span = rows[a.index()].max(rows[b.index()]);
                    changed |= raise(rows, *a, span);
                    changed |= raise(rows, *b, span);
                }
                Constraint::Split { hub, parts } => {
                    let total: usize = parts.iter().map(|part| rows[part.index()]).sum();
                    let hub_rows = rows[hub.index()];
                    if total > hub_rows {
                        changed |= raise(rows, *hub, total);
                    } else if total < hub_rows {
                        let absorber = match self.alignment {
                            Alignment::Top => parts.last(),
                            Alignment::Bottom => parts.first(),
                        };
                        if let Some(&absorber) = absorber {
                            rows[absorber.index()] += hub_rows - total;
                            changed = true;
                        }
                    }
                }
            }
        }
        changed
    }
}

fn raise(rows: &mut [usize], id: NodeId, to: usize) -> bool {
    let slot = &mut rows[id.index()];
    if *slot < to {
        *slot = to;
        true
    } else {
        false
    }
}
