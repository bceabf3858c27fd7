//! Edit operations over the flat description.
//!
//! Edits are addressed through nodes of a tree built from the same description and
//! always produce a new description; the tree itself is never modified. Passing a node
//! from another (or an outdated) tree, or an out-of-range branch index, is a bug in the
//! caller and panics.

use crate::description::{
    BranchDefinition, ContentElement, FlowDescription, FlowElement, GatewayElement, Payload,
};
use crate::error::FlowError;
use crate::pipeline::validate;
use crate::tree::{FlowTree, NodeId, NodeKind};
use ahash::AHashSet;
use tracing::debug;

/// A single change to a flow.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowEdit {
    /// Inserts a content element on the outgoing edge of `after`.
    InsertContent {
        after: NodeId,
        element_id: String,
        payload: Payload,
    },
    /// Inserts a diverging gateway on the outgoing edge of `after`. The previous
    /// continuation moves to branch 0; the other branches end.
    InsertGateway {
        after: NodeId,
        element_id: String,
        branch_count: usize,
        payload: Payload,
    },
    /// Appends an empty branch to a diverging gateway.
    AddBranch { gateway: NodeId },
    /// Removes one branch of a diverging gateway, together with the elements only
    /// that branch reached.
    RemoveBranch { gateway: NodeId, branch_index: usize },
    /// Removes an element. References to it are relinked to its continuation
    /// (branch 0's continuation for a gateway). Elements only reachable through the
    /// gateway's other branches are removed as well.
    RemoveElement { node: NodeId },
}

/// A flat link that can be rewired.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LinkSlot {
    First,
    Content(String),
    Branch(String, usize),
}

/// Applies `edit` to a copy of `description` and returns it.
///
/// The result is not validated; use [`try_edit`] to reject edits that would produce an
/// invalid flow.
///
/// # Panics
///
/// Panics if a node does not belong to `tree`, does not fit the edit, refers to an
/// element missing from `description`, if a branch index is out of range, or if an
/// inserted element id is already taken.
pub fn apply_edit(description: &FlowDescription, tree: &FlowTree, edit: &FlowEdit) -> FlowDescription {
    let mut edited = description.clone();
    match edit {
        FlowEdit::InsertContent {
            after,
            element_id,
            payload,
        } => {
            let next = insert_on_edge(&mut edited, tree, *after, element_id);
            edited.elements.insert(
                element_id.clone(),
                FlowElement::Content(ContentElement {
                    next,
                    payload: payload.clone(),
                }),
            );
        }
        FlowEdit::InsertGateway {
            after,
            element_id,
            branch_count,
            payload,
        } => {
            let next = insert_on_edge(&mut edited, tree, *after, element_id);
            let mut branches = vec![BranchDefinition::default(); (*branch_count).max(1)];
            branches[0].next = next;
            edited.elements.insert(
                element_id.clone(),
                FlowElement::Gateway(GatewayElement {
                    branches,
                    payload: payload.clone(),
                }),
            );
        }
        FlowEdit::AddBranch { gateway } => {
            let (element_id, branch_count) = diverging_gateway(tree, *gateway);
            let branches = gateway_branches(&mut edited, &element_id);
            if branches.len() < branch_count {
                branches.resize(branch_count, BranchDefinition::default());
            }
            branches.push(BranchDefinition::default());
        }
        FlowEdit::RemoveBranch {
            gateway,
            branch_index,
        } => {
            let (element_id, branch_count) = diverging_gateway(tree, *gateway);
            assert!(
                *branch_index < branch_count,
                "branch index {} out of range for gateway '{}' with {} branches",
                branch_index,
                element_id,
                branch_count
            );
            let branches = gateway_branches(&mut edited, &element_id);
            // Padded branches only exist in the tree; there is nothing to remove.
            if *branch_index < branches.len() {
                branches.remove(*branch_index);
            }
            prune_orphans(description, &mut edited);
        }
        FlowEdit::RemoveElement { node } => {
            let element_id = element_of(tree, *node);
            let continuation = match edited.elements.remove(&element_id) {
                Some(FlowElement::Content(content)) => content.next,
                Some(FlowElement::Gateway(gateway)) => {
                    gateway.branches.into_iter().next().and_then(|b| b.next)
                }
                None => panic!("element '{}' is not part of the description", element_id),
            };
            relink(&mut edited, &element_id, continuation);
            prune_orphans(description, &mut edited);
        }
    }
    debug!(?edit, "Applied flow edit");
    edited
}

/// Applies `edit` and keeps the result only if it is still a valid flow.
pub fn try_edit(
    description: &FlowDescription,
    tree: &FlowTree,
    edit: &FlowEdit,
) -> Result<FlowDescription, FlowError> {
    let edited = apply_edit(description, tree, edit);
    validate(&edited)?;
    Ok(edited)
}

/// Points every link realizing the outgoing edge of `after` at `element_id` and
/// returns the link's previous target.
fn insert_on_edge(
    description: &mut FlowDescription,
    tree: &FlowTree,
    after: NodeId,
    element_id: &str,
) -> Option<String> {
    assert!(
        !description.elements.contains_key(element_id),
        "element id '{}' is already taken",
        element_id
    );
    let slots = outgoing_slots(tree, after);
    let continuation = slots
        .first()
        .and_then(|slot| read_slot(description, slot))
        .filter(|next| description.elements.contains_key(next));
    for slot in &slots {
        write_slot(description, slot, Some(element_id.to_string()));
    }
    continuation
}

/// The flat links that make up the tree edge leaving `node`.
fn outgoing_slots(tree: &FlowTree, node: NodeId) -> Vec<LinkSlot> {
    assert!(tree.contains(node), "node {} does not belong to this tree", node);
    match tree.kind(node) {
        NodeKind::Start => vec![LinkSlot::First],
        NodeKind::Content { element_id, .. } => vec![LinkSlot::Content(element_id.clone())],
        NodeKind::DivergingBranch { branch_index, .. } => {
            let gateway = tree
                .parent(node)
                .map(|gateway| element_of(tree, gateway))
                .unwrap_or_else(|| panic!("diverging branch {} has no gateway", node));
            vec![LinkSlot::Branch(gateway, *branch_index)]
        }
        NodeKind::ConvergingBranch { .. } => match tree.parent(node) {
            Some(predecessor) => outgoing_slots(tree, predecessor),
            None => panic!("converging branch {} has no predecessor", node),
        },
        NodeKind::ConvergingGateway { .. } => tree
            .node(node)
            .incoming()
            .iter()
            .flat_map(|&branch| outgoing_slots(tree, branch))
            .collect(),
        NodeKind::DivergingGateway { .. } | NodeKind::End => {
            panic!("node {} ({}) has no single outgoing edge", node, tree.kind(node).name())
        }
    }
}

fn read_slot(description: &FlowDescription, slot: &LinkSlot) -> Option<String> {
    match slot {
        LinkSlot::First => description.first_element_id.clone(),
        LinkSlot::Content(id) => match description.element(id) {
            Some(FlowElement::Content(content)) => content.next.clone(),
            _ => panic!("element '{}' is not a content element", id),
        },
        LinkSlot::Branch(id, index) => match description.element(id) {
            Some(FlowElement::Gateway(gateway)) => {
                gateway.branches.get(*index).and_then(|b| b.next.clone())
            }
            _ => panic!("element '{}' is not a gateway", id),
        },
    }
}

fn write_slot(description: &mut FlowDescription, slot: &LinkSlot, next: Option<String>) {
    match slot {
        LinkSlot::First => description.first_element_id = next,
        LinkSlot::Content(id) => match description.elements.get_mut(id) {
            Some(FlowElement::Content(content)) => content.next = next,
            _ => panic!("element '{}' is not a content element", id),
        },
        LinkSlot::Branch(id, index) => {
            let branches = gateway_branches(description, id);
            if branches.len() <= *index {
                branches.resize(*index + 1, BranchDefinition::default());
            }
            branches[*index].next = next;
        }
    }
}

/// Replaces every reference to `removed` by `continuation`.
fn relink(description: &mut FlowDescription, removed: &str, continuation: Option<String>) {
    if description.first_element_id.as_deref() == Some(removed) {
        description.first_element_id = continuation.clone();
    }
    for element in description.elements.values_mut() {
        match element {
            FlowElement::Content(content) => {
                if content.next.as_deref() == Some(removed) {
                    content.next = continuation.clone();
                }
            }
            FlowElement::Gateway(gateway) => {
                for branch in &mut gateway.branches {
                    if branch.next.as_deref() == Some(removed) {
                        branch.next = continuation.clone();
                    }
                }
            }
        }
    }
}

/// Element ids reachable from the first element.
fn reachable(description: &FlowDescription) -> AHashSet<&str> {
    let mut seen = AHashSet::new();
    let mut stack: Vec<&str> = description
        .resolve(description.first_element_id.as_deref())
        .map(|(id, _)| id)
        .into_iter()
        .collect();
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        if let Some(element) = description.element(id) {
            stack.extend(
                element
                    .next_ids()
                    .into_iter()
                    .filter_map(|next| description.resolve(next).map(|(next_id, _)| next_id)),
            );
        }
    }
    seen
}

/// Drops the elements that were reachable in `original` but no longer are in `edited`.
/// Elements that were unreachable to begin with are kept.
fn prune_orphans(original: &FlowDescription, edited: &mut FlowDescription) {
    let orphans: Vec<String> = {
        let before = reachable(original);
        let after = reachable(edited);
        before
            .difference(&after)
            .filter(|id| edited.elements.contains_key(**id))
            .map(|id| id.to_string())
            .collect()
    };
    if !orphans.is_empty() {
        debug!(?orphans, "Pruned unreachable elements");
    }
    for id in &orphans {
        edited.elements.remove(id);
    }
}

fn element_of(tree: &FlowTree, node: NodeId) -> String {
    assert!(tree.contains(node), "node {} does not belong to this tree", node);
    match tree.kind(node).element_id() {
        Some(element_id) => element_id.to_string(),
        None => panic!(
            "node {} ({}) does not stand for an element",
            node,
            tree.kind(node).name()
        ),
    }
}

/// Element id and tree branch count of a diverging gateway node.
fn diverging_gateway(tree: &FlowTree, node: NodeId) -> (String, usize) {
    assert!(tree.contains(node), "node {} does not belong to this tree", node);
    match tree.kind(node) {
        NodeKind::DivergingGateway { element_id, .. } => {
            (element_id.clone(), tree.node(node).outgoing().len())
        }
        other => panic!("node {} is a {}, not a diverging gateway", node, other.name()),
    }
}

fn gateway_branches<'a>(
    description: &'a mut FlowDescription,
    element_id: &str,
) -> &'a mut Vec<BranchDefinition> {
    match description.elements.get_mut(element_id) {
        Some(FlowElement::Gateway(gateway)) => &mut gateway.branches,
        _ => panic!("element '{}' is not a gateway", element_id),
    }
}
