use crate::error::FlowError;
use crate::tree::{FlowTree, NodeId, NodeKind};
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;
use tracing::debug;

/// Checks that every converging gateway only joins branches that are direct
/// neighbors in diagram order.
///
/// All offending gateways are reported at once, identified by their target.
pub fn validate_merges(tree: &FlowTree) -> Result<(), FlowError> {
    let targets: Vec<String> = tree
        .converging_gateways()
        .filter(|&gateway| !branches_are_neighbors(tree, gateway))
        .filter_map(|gateway| match tree.kind(gateway) {
            NodeKind::ConvergingGateway { target } => Some(target.to_string()),
            _ => None,
        })
        .collect();

    if targets.is_empty() {
        Ok(())
    } else {
        debug!(?targets, "Rejected non-neighboring merges");
        Err(FlowError::Merge { targets })
    }
}

fn branches_are_neighbors(tree: &FlowTree, gateway: NodeId) -> bool {
    tree.node(gateway)
        .incoming()
        .iter()
        .filter_map(|&branch| tree.parent(branch))
        .tuple_windows()
        .all(|(upper, lower)| are_neighbors(tree, upper, lower))
}

/// Whether the lane ending in `upper` sits directly above the lane ending in `lower`.
///
/// The lower lane's ancestry is taken along owning parents, which trace the top edge of
/// every merged band. The upper lane has to leave each gateway through its last branch
/// until it reaches a gateway it shares with the lower lane, where it must sit on the
/// branch right before the lower lane's.
pub(crate) fn are_neighbors(tree: &FlowTree, upper: NodeId, lower: NodeId) -> bool {
    let lower_chain = diverging_ancestry(tree, lower);
    let positions: AHashMap<NodeId, usize> = lower_chain
        .iter()
        .enumerate()
        .map(|(position, &(gateway, _))| (gateway, position))
        .collect();

    let mut visited = AHashSet::new();
    let mut alternatives = vec![upper];

    while let Some(mut current) = alternatives.pop() {
        loop {
            if !visited.insert(current) {
                break;
            }
            let node = tree.node(current);
            match node.kind() {
                NodeKind::Start => break,
                NodeKind::DivergingBranch { branch_index, .. } => {
                    let Some(gateway) = tree.parent(current) else {
                        break;
                    };
                    if let Some(&position) = positions.get(&gateway) {
                        let lower_index = lower_chain[position].1;
                        let lower_on_top_edge = lower_chain[..position]
                            .iter()
                            .all(|&(_, index)| index == 0);
                        if branch_index + 1 == lower_index && lower_on_top_edge {
                            return true;
                        }
                        break;
                    }
                    // Only the bottom branch may step out of a gateway the lanes don't share.
                    if branch_index + 1 != tree.node(gateway).outgoing().len() {
                        break;
                    }
                    current = gateway;
                }
                NodeKind::ConvergingGateway { .. } => {
                    let Some((&bottom, rest)) = node.incoming().split_last() else {
                        break;
                    };
                    alternatives.extend_from_slice(rest);
                    current = bottom;
                }
                NodeKind::Content { .. }
                | NodeKind::DivergingGateway { .. }
                | NodeKind::ConvergingBranch { .. }
                | NodeKind::End => {
                    let Some(parent) = tree.parent(current) else {
                        break;
                    };
                    current = parent;
                }
            }
        }
    }

    false
}

/// The `(diverging gateway, branch index)` pairs on the owning path from `from` up to `Start`,
/// innermost first.
fn diverging_ancestry(tree: &FlowTree, from: NodeId) -> Vec<(NodeId, usize)> {
    let mut chain = Vec::new();
    let mut current = Some(from);
    while let Some(id) = current {
        if let NodeKind::DivergingBranch { branch_index, .. } = tree.kind(id) {
            if let Some(gateway) = tree.parent(id) {
                chain.push((gateway, *branch_index));
            }
        }
        current = tree.parent(id);
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::description::FlowDescriptionBuilder;
    use crate::tree::TreeBuilder;

    #[test]
    fn lanes_of_adjacent_branches_are_neighbors() {
        let flow = FlowDescriptionBuilder::new()
            .first("g")
            .gateway("g", [Some("x"), Some("y"), Some("z")])
            .content("x", None)
            .content("y", None)
            .content("z", None)
            .build();
        let tree = TreeBuilder::new(&flow).build();
        let x = tree.element_node("x").unwrap();
        let y = tree.element_node("y").unwrap();
        let z = tree.element_node("z").unwrap();

        assert!(are_neighbors(&tree, x, y));
        assert!(are_neighbors(&tree, y, z));
        assert!(!are_neighbors(&tree, x, z));
    }

    #[test]
    fn merged_band_continues_from_its_bottom_lane() {
        // x and y merge into m, which then merges with z.
        let flow = FlowDescriptionBuilder::new()
            .first("g")
            .gateway("g", [Some("x"), Some("y"), Some("z")])
            .content("x", Some("m"))
            .content("y", Some("m"))
            .content("m", Some("n"))
            .content("z", Some("n"))
            .content("n", None)
            .build();
        let tree = TreeBuilder::new(&flow).build();
        assert!(validate_merges(&tree).is_ok());
    }

    #[test]
    fn skipping_a_nested_branch_is_rejected() {
        // x merges with q, but p lies between them.
        let flow = FlowDescriptionBuilder::new()
            .first("g")
            .gateway("g", [Some("x"), Some("h")])
            .gateway("h", [Some("p"), Some("q")])
            .content("x", Some("m"))
            .content("p", None)
            .content("q", Some("m"))
            .content("m", None)
            .build();
        let tree = TreeBuilder::new(&flow).build();
        assert_eq!(
            validate_merges(&tree),
            Err(FlowError::Merge {
                targets: vec!["m".to_string()]
            })
        );
    }
}
