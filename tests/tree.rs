//! Tests for building the explicit tree from a flat description.
mod common;
use common::*;
use flowgrid::prelude::*;
use flowgrid::tree::TreeBuilder;
use serde_json::json;

fn element(tree: &FlowTree, id: &str) -> NodeId {
    tree.element_node(id)
        .unwrap_or_else(|| panic!("element '{}' should be in the tree", id))
}

#[test]
fn test_empty_flow_is_start_then_end() {
    let flow = FlowDescription::new();
    let tree = TreeBuilder::new(&flow).build();

    assert_eq!(tree.len(), 2);
    let root = tree.node(tree.root());
    assert_eq!(root.kind(), &NodeKind::Start);
    assert_eq!(root.outgoing().len(), 1);
    assert_eq!(tree.kind(root.outgoing()[0]), &NodeKind::End);
    assert_eq!(tree.end_node(), Some(root.outgoing()[0]));
}

#[test]
fn test_first_element_pointing_nowhere_is_an_empty_flow() {
    let flow = FlowDescriptionBuilder::new().first("ghost").build();
    assert!(flow.is_empty());

    let tree = TreeBuilder::new(&flow).build();
    assert_eq!(tree.len(), 2);
}

#[test]
fn test_linear_flow_keeps_element_order() {
    let flow = FlowDescriptionBuilder::new()
        .first("a")
        .content("a", Some("b"))
        .content("b", Some("c"))
        .content("c", None)
        .build();
    let tree = TreeBuilder::new(&flow).build();

    let a = element(&tree, "a");
    let b = element(&tree, "b");
    let c = element(&tree, "c");
    assert_eq!(tree.node(tree.root()).outgoing(), &[a]);
    assert_eq!(tree.node(a).outgoing(), &[b]);
    assert_eq!(tree.node(b).outgoing(), &[c]);
    assert_eq!(tree.node(c).outgoing(), &[tree.end_node().unwrap()]);
    assert_eq!(count_kind(&tree, "converging-gateway"), 0);
}

#[test]
fn test_unknown_link_ends_the_path() {
    let flow = FlowDescriptionBuilder::new()
        .first("a")
        .content("a", Some("missing"))
        .build();
    let tree = TreeBuilder::new(&flow).build();

    let a = element(&tree, "a");
    assert_eq!(tree.node(a).outgoing(), &[tree.end_node().unwrap()]);
    assert!(tree.element_node("missing").is_none());
}

#[test]
fn test_legal_merge_synthesizes_one_converging_gateway() {
    let flow = legal_merge_flow();
    let tree = TreeBuilder::new(&flow).build();

    // start, a, 2 diverging branches, b, c, d, end, converging gateway, 2 converging branches
    assert_eq!(tree.len(), 11);
    assert_eq!(count_kind(&tree, "converging-gateway"), 1);
    assert_eq!(count_kind(&tree, "end"), 1);

    let d = element(&tree, "d");
    let gateway = tree.parent(d).unwrap();
    assert_eq!(
        tree.kind(gateway),
        &NodeKind::ConvergingGateway {
            target: TargetKey::Element("d".to_string())
        }
    );
    assert_eq!(tree.node(gateway).outgoing(), &[d]);
    assert_eq!(tree.node(d).incoming(), &[gateway]);

    let branches = tree.node(gateway).incoming();
    assert_eq!(branches.len(), 2);
    let predecessors: Vec<NodeId> = branches.iter().map(|&b| tree.parent(b).unwrap()).collect();
    assert_eq!(predecessors, vec![element(&tree, "b"), element(&tree, "c")]);
    for (index, &branch) in branches.iter().enumerate() {
        assert_eq!(tree.kind(branch).branch_index(), Some(index));
        assert_eq!(tree.sibling_count(branch), Some(2));
    }
}

#[test]
fn test_branch_zero_is_discovered_first() {
    let flow = legal_merge_flow();
    let tree = TreeBuilder::new(&flow).build();

    let b = element(&tree, "b");
    let c = element(&tree, "c");
    let d = element(&tree, "d");
    // The whole subtree of branch 0 (b, then d) exists before c is built.
    assert!(b < d);
    assert!(d < c);
    assert!(tree.end_node().unwrap() < c);
}

#[test]
fn test_repeated_merges_reuse_the_same_gateway_and_subtree() {
    let flow = triple_merge_flow();
    let tree = TreeBuilder::new(&flow).build();

    assert_eq!(count_kind(&tree, "converging-gateway"), 1);
    assert_eq!(count_kind(&tree, "converging-branch"), 3);
    assert_eq!(
        tree.iter()
            .filter(|(_, node)| node.kind().element_id() == Some("x"))
            .count(),
        1
    );

    let d = element(&tree, "d");
    let gateway = tree.parent(d).unwrap();
    // d was built once, when branch 0 first reached it, before any merge happened.
    assert!(d < gateway);
    assert_eq!(tree.node(d).outgoing(), &[element(&tree, "x")]);

    let indices: Vec<Option<usize>> = tree
        .node(gateway)
        .incoming()
        .iter()
        .map(|&branch| tree.kind(branch).branch_index())
        .collect();
    assert_eq!(indices, vec![Some(0), Some(1), Some(2)]);
}

#[test]
fn test_all_paths_end_in_a_single_end_node() {
    let flow = FlowDescriptionBuilder::new()
        .first("g")
        .gateway("g", [Some("a"), Some("b"), None])
        .content("a", None)
        .content("b", None)
        .build();
    let tree = TreeBuilder::new(&flow).build();

    assert_eq!(count_kind(&tree, "end"), 1);
    let end = tree.end_node().unwrap();
    let gateway = tree.parent(end).unwrap();
    assert_eq!(
        tree.kind(gateway),
        &NodeKind::ConvergingGateway {
            target: TargetKey::End
        }
    );
    assert_eq!(tree.node(gateway).incoming().len(), 3);
}

#[test]
fn test_gateways_are_padded_to_two_branches() {
    let flow = FlowDescriptionBuilder::new()
        .first("single")
        .gateway("single", [Some("empty")])
        .gateway("empty", std::iter::empty())
        .build();
    let tree = TreeBuilder::new(&flow).build();

    for id in ["single", "empty"] {
        let gateway = element(&tree, id);
        let branches = tree.node(gateway).outgoing();
        assert_eq!(branches.len(), 2, "gateway '{}' should have two branches", id);
        for (index, &branch) in branches.iter().enumerate() {
            assert_eq!(tree.kind(branch).branch_index(), Some(index));
            assert_eq!(tree.sibling_count(branch), Some(2));
        }
    }
}

#[test]
fn test_payloads_are_carried_onto_nodes() {
    let flow = flow_from(json!({
        "firstElementId": "g",
        "elements": {
            "g": {
                "branches": [
                    { "next": "a", "payload": { "condition": "x > 1" } },
                    { "payload": { "condition": "otherwise" } }
                ],
                "payload": { "label": "Check" }
            },
            "a": { "payload": { "label": "Act" } }
        }
    }));
    let tree = TreeBuilder::new(&flow).build();

    let g = element(&tree, "g");
    match tree.kind(g) {
        NodeKind::DivergingGateway { payload, .. } => assert_eq!(payload["label"], "Check"),
        other => panic!("expected a diverging gateway, got {:?}", other),
    }
    match tree.kind(tree.node(g).outgoing()[1]) {
        NodeKind::DivergingBranch { payload, .. } => assert_eq!(payload["condition"], "otherwise"),
        other => panic!("expected a diverging branch, got {:?}", other),
    }
    match tree.kind(element(&tree, "a")) {
        NodeKind::Content { payload, .. } => assert_eq!(payload["label"], "Act"),
        other => panic!("expected content, got {:?}", other),
    }
}

#[test]
fn test_building_twice_gives_identical_trees() {
    let flow = illegal_merge_flow();
    let first = TreeBuilder::new(&flow).build();
    let second = TreeBuilder::new(&flow).build();

    assert_eq!(first.len(), second.len());
    for ((id_a, node_a), (id_b, node_b)) in first.iter().zip(second.iter()) {
        assert_eq!(id_a, id_b);
        assert_eq!(node_a, node_b);
    }
}
