use super::{FlowNode, FlowTree, NodeId, NodeKind, TargetKey};
use crate::description::{FlowDescription, FlowElement};
use ahash::AHashMap;
use tracing::{debug, trace};

/// Diverging gateways with fewer declared branches are padded up to this count.
pub const MIN_GATEWAY_BRANCHES: usize = 2;

/// Responsible for expanding a flat `FlowDescription` into an explicit `FlowTree`.
///
/// The description must be acyclic; run the cycle detector first.
pub struct TreeBuilder<'a> {
    description: &'a FlowDescription,
    nodes: Vec<FlowNode>,
    registry: AHashMap<TargetKey, NodeId>,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(description: &'a FlowDescription) -> Self {
        Self {
            description,
            nodes: Vec::new(),
            registry: AHashMap::new(),
        }
    }

    /// Builds the tree in depth-first discovery order.
    pub fn build(mut self) -> FlowTree {
        let root = self.push(NodeKind::Start);
        let first = self.target_key(self.description.first_element_id.as_deref());

        // LIFO work stack of (target, preceding node). Branches are pushed in reverse so
        // that branch 0's whole subtree is discovered before branch 1 is looked at.
        let mut pending = vec![(first, root)];
        while let Some((target, preceding)) = pending.pop() {
            self.resolve_next(target, preceding, &mut pending);
        }

        debug!(
            nodes = self.nodes.len(),
            registered = self.registry.len(),
            "Built flow tree"
        );

        FlowTree {
            nodes: self.nodes,
            root,
            registry: self.registry,
        }
    }

    fn target_key(&self, next: Option<&str>) -> TargetKey {
        match self.description.resolve(next) {
            Some((id, _)) => TargetKey::Element(id.to_string()),
            None => TargetKey::End,
        }
    }

    /// Creates (or re-converges on) the node for `target`, entered from `preceding`.
    fn resolve_next(
        &mut self,
        target: TargetKey,
        preceding: NodeId,
        pending: &mut Vec<(TargetKey, NodeId)>,
    ) {
        if let Some(&existing) = self.registry.get(&target) {
            self.attach_converging_branch(existing, preceding);
            return;
        }

        let description = self.description;
        let element = match &target {
            TargetKey::Element(id) => description.element(id),
            TargetKey::End => None,
        };

        match element {
            None => {
                let end = self.push(NodeKind::End);
                self.link(preceding, end);
                self.registry.insert(TargetKey::End, end);
            }
            Some(FlowElement::Content(content)) => {
                let element_id = target.to_string();
                let node = self.push(NodeKind::Content {
                    element_id,
                    payload: content.payload.clone(),
                });
                self.link(preceding, node);
                self.registry.insert(target, node);
                pending.push((self.target_key(content.next.as_deref()), node));
            }
            Some(FlowElement::Gateway(gateway)) => {
                let element_id = target.to_string();
                let node = self.push(NodeKind::DivergingGateway {
                    element_id: element_id.clone(),
                    payload: gateway.payload.clone(),
                });
                self.link(preceding, node);
                self.registry.insert(target, node);

                let declared = gateway.branches.len();
                if declared < MIN_GATEWAY_BRANCHES {
                    trace!(
                        gateway = %element_id,
                        declared,
                        "Padding diverging gateway with synthetic branches"
                    );
                }

                let mut branches = Vec::with_capacity(declared.max(MIN_GATEWAY_BRANCHES));
                for branch_index in 0..declared.max(MIN_GATEWAY_BRANCHES) {
                    let definition = gateway.branches.get(branch_index);
                    let branch = self.push(NodeKind::DivergingBranch {
                        branch_index,
                        payload: definition
                            .map(|b| b.payload.clone())
                            .unwrap_or_default(),
                    });
                    self.link(node, branch);
                    let next = definition.and_then(|b| b.next.as_deref());
                    branches.push((self.target_key(next), branch));
                }
                pending.extend(branches.into_iter().rev());
            }
        }
    }

    /// Records that `preceding` also leads into the already-built `existing` node.
    ///
    /// The first time this happens a converging gateway is spliced in front of
    /// `existing`; afterwards the same gateway just gains another branch. The subtree
    /// starting at `existing` is reused as is.
    fn attach_converging_branch(&mut self, existing: NodeId, preceding: NodeId) -> NodeId {
        let predecessor = self.nodes[existing.0].incoming.first().copied();
        let gateway = match predecessor {
            Some(p) if matches!(self.nodes[p.0].kind, NodeKind::ConvergingGateway { .. }) => p,
            _ => self.splice_converging_gateway(existing, predecessor),
        };

        let branch_index = self.nodes[gateway.0].incoming.len();
        let branch = self.push(NodeKind::ConvergingBranch { branch_index });
        self.link(preceding, branch);
        self.link(branch, gateway);

        trace!(
            target = %self.target_of(existing),
            branch_index,
            "Added converging branch"
        );
        branch
    }

    fn splice_converging_gateway(
        &mut self,
        existing: NodeId,
        predecessor: Option<NodeId>,
    ) -> NodeId {
        let target = self.target_of(existing);
        trace!(target = %target, "Synthesizing converging gateway");

        let gateway = self.push(NodeKind::ConvergingGateway { target });
        if let Some(predecessor) = predecessor {
            let first_branch = self.push(NodeKind::ConvergingBranch { branch_index: 0 });
            if let Some(edge) = self.nodes[predecessor.0]
                .outgoing
                .iter_mut()
                .find(|edge| **edge == existing)
            {
                *edge = first_branch;
            }
            self.nodes[first_branch.0].incoming.push(predecessor);
            self.link(first_branch, gateway);
        }

        self.nodes[existing.0].incoming = vec![gateway];
        self.nodes[gateway.0].outgoing.push(existing);
        gateway
    }

    fn target_of(&self, id: NodeId) -> TargetKey {
        match self.nodes[id.0].kind.element_id() {
            Some(element_id) => TargetKey::Element(element_id.to_string()),
            None => TargetKey::End,
        }
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(FlowNode::new(kind));
        id
    }

    fn link(&mut self, from: NodeId, to: NodeId) {
        self.nodes[from.0].outgoing.push(to);
        self.nodes[to.0].incoming.push(from);
    }
}
