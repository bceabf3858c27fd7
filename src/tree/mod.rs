//! The explicit node/branch tree built from a flat description.
//!
//! Nodes live in an arena and refer to each other through [`NodeId`]s. Every node
//! keeps an ordered list of incoming and outgoing neighbors; splicing a converging
//! gateway into the tree only rewrites these index lists.

use crate::description::Payload;
use ahash::AHashMap;
use serde::Serialize;
use std::fmt;

mod builder;

pub use builder::TreeBuilder;

/// Stable index of a node inside a [`FlowTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a `next` link resolves to: a known element, or the end of the flow.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetKey {
    Element(String),
    End,
}

impl fmt::Display for TargetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKey::Element(id) => write!(f, "{}", id),
            TargetKey::End => write!(f, "end"),
        }
    }
}

/// The kind of a tree node, with the data specific to that kind.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Start,
    Content {
        element_id: String,
        payload: Payload,
    },
    DivergingGateway {
        element_id: String,
        payload: Payload,
    },
    DivergingBranch {
        branch_index: usize,
        payload: Payload,
    },
    ConvergingGateway {
        target: TargetKey,
    },
    ConvergingBranch {
        branch_index: usize,
    },
    End,
}

impl NodeKind {
    /// Short, stable name of the kind.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Start => "start",
            NodeKind::Content { .. } => "content",
            NodeKind::DivergingGateway { .. } => "diverging-gateway",
            NodeKind::DivergingBranch { .. } => "diverging-branch",
            NodeKind::ConvergingGateway { .. } => "converging-gateway",
            NodeKind::ConvergingBranch { .. } => "converging-branch",
            NodeKind::End => "end",
        }
    }

    /// The identifier of the flat element this node was built from, if any.
    pub fn element_id(&self) -> Option<&str> {
        match self {
            NodeKind::Content { element_id, .. } | NodeKind::DivergingGateway { element_id, .. } => {
                Some(element_id.as_str())
            }
            NodeKind::Start
            | NodeKind::DivergingBranch { .. }
            | NodeKind::ConvergingGateway { .. }
            | NodeKind::ConvergingBranch { .. }
            | NodeKind::End => None,
        }
    }

    pub fn branch_index(&self) -> Option<usize> {
        match self {
            NodeKind::DivergingBranch { branch_index, .. }
            | NodeKind::ConvergingBranch { branch_index } => Some(*branch_index),
            NodeKind::Start
            | NodeKind::Content { .. }
            | NodeKind::DivergingGateway { .. }
            | NodeKind::ConvergingGateway { .. }
            | NodeKind::End => None,
        }
    }
}

/// A single node of the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowNode {
    pub(crate) kind: NodeKind,
    pub(crate) incoming: Vec<NodeId>,
    pub(crate) outgoing: Vec<NodeId>,
}

impl FlowNode {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            incoming: Vec::new(),
            outgoing: Vec::new(),
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Predecessors in edge order. Converging gateways list their branches in discovery order.
    pub fn incoming(&self) -> &[NodeId] {
        &self.incoming
    }

    /// Successors in edge order. Diverging gateways list their branches in branch order.
    pub fn outgoing(&self) -> &[NodeId] {
        &self.outgoing
    }
}

/// A built flow tree rooted at its unique `Start` node.
#[derive(Debug, Clone)]
pub struct FlowTree {
    pub(crate) nodes: Vec<FlowNode>,
    pub(crate) root: NodeId,
    pub(crate) registry: AHashMap<TargetKey, NodeId>,
}

impl FlowTree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the node behind `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree.
    pub fn node(&self, id: NodeId) -> &FlowNode {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&FlowNode> {
        self.nodes.get(id.0)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    /// All nodes with their ids, in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &FlowNode)> {
        self.nodes.iter().enumerate().map(|(i, node)| (NodeId(i), node))
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    /// The node built for a flat element, if the element is reachable.
    pub fn element_node(&self, element_id: &str) -> Option<NodeId> {
        self.registry
            .get(&TargetKey::Element(element_id.to_string()))
            .copied()
    }

    /// The tree's single `End` node.
    pub fn end_node(&self) -> Option<NodeId> {
        self.registry.get(&TargetKey::End).copied()
    }

    /// The owning parent of a node: its first predecessor.
    ///
    /// For a converging gateway this is branch 0, the path that discovered the
    /// merged target first.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).incoming.first().copied()
    }

    /// Number of siblings (including the node itself) of a branch node.
    pub fn sibling_count(&self, id: NodeId) -> Option<usize> {
        match self.kind(id) {
            NodeKind::DivergingBranch { .. } => {
                let gateway = self.parent(id)?;
                Some(self.node(gateway).outgoing.len())
            }
            NodeKind::ConvergingBranch { .. } => {
                let gateway = *self.node(id).outgoing.first()?;
                Some(self.node(gateway).incoming.len())
            }
            NodeKind::Start
            | NodeKind::Content { .. }
            | NodeKind::DivergingGateway { .. }
            | NodeKind::ConvergingGateway { .. }
            | NodeKind::End => None,
        }
    }

    /// All synthesized converging gateways, in creation order.
    pub fn converging_gateways(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.iter()
            .filter(|(_, node)| matches!(node.kind, NodeKind::ConvergingGateway { .. }))
            .map(|(id, _)| id)
    }

    /// Human readable description of a node, used in logs and text output.
    pub fn describe(&self, id: NodeId) -> String {
        match self.kind(id) {
            NodeKind::Start => "start".to_string(),
            NodeKind::Content { element_id, .. } => element_id.clone(),
            NodeKind::DivergingGateway { element_id, .. } => format!("<{}>", element_id),
            NodeKind::DivergingBranch { branch_index, .. } => format!("/{}", branch_index),
            NodeKind::ConvergingGateway { target } => format!(">{}<", target),
            NodeKind::ConvergingBranch { branch_index } => format!("\\{}", branch_index),
            NodeKind::End => "end".to_string(),
        }
    }
}
