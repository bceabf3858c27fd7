//! Common test utilities for building flow descriptions and checking layouts.
use flowgrid::prelude::*;
use rand::Rng;
use serde_json::json;

/// Parses a `serde_json::Value` fixture into a `FlowDescription`.
#[allow(dead_code)]
pub fn flow_from(value: serde_json::Value) -> FlowDescription {
    serde_json::from_value(value).expect("fixture should be a valid flow description")
}

/// Two branches of `a` meeting again at `d`.
#[allow(dead_code)]
pub fn legal_merge_flow() -> FlowDescription {
    flow_from(json!({
        "firstElementId": "a",
        "elements": {
            "a": { "branches": [{ "next": "b" }, { "next": "c" }] },
            "b": { "next": "d" },
            "c": { "next": "d" },
            "d": {}
        }
    }))
}

/// Branches 0 and 2 merge at `f`, branches 0 and 3 merge at `b`: both skip a branch.
#[allow(dead_code)]
pub fn illegal_merge_flow() -> FlowDescription {
    flow_from(json!({
        "firstElementId": "a",
        "elements": {
            "a": { "branches": [{ "next": "b" }, { "next": "c" }, { "next": "d" }, { "next": "e" }] },
            "b": { "next": "f" },
            "c": {},
            "d": { "next": "f" },
            "e": { "next": "b" },
            "f": {}
        }
    }))
}

/// Three branches of `a` meeting at `d`, which continues to `x`.
#[allow(dead_code)]
pub fn triple_merge_flow() -> FlowDescription {
    flow_from(json!({
        "firstElementId": "a",
        "elements": {
            "a": { "branches": [{ "next": "b" }, { "next": "c" }, { "next": "e" }] },
            "b": { "next": "d" },
            "c": { "next": "d" },
            "e": { "next": "d" },
            "d": { "next": "x" },
            "x": {}
        }
    }))
}

/// A two-lane merge into a three-branch gateway: the merge is shorter than its target.
#[allow(dead_code)]
pub fn short_merge_flow() -> FlowDescription {
    FlowDescriptionBuilder::new()
        .first("g")
        .gateway("g", [Some("a"), Some("b")])
        .content("a", Some("h"))
        .content("b", Some("h"))
        .gateway("h", [Some("x"), Some("y"), Some("z")])
        .content("x", None)
        .content("y", None)
        .content("z", None)
        .build()
}

/// Generates a random flow of nested gateways. Paths only meet again at the end.
#[allow(dead_code)]
pub fn random_nested_flow<R: Rng>(rng: &mut R, depth: usize) -> FlowDescription {
    fn chain<R: Rng>(
        rng: &mut R,
        flow: &mut FlowDescription,
        counter: &mut usize,
        depth: usize,
    ) -> Option<String> {
        let mut next = if depth > 0 && rng.random_bool(0.6) {
            *counter += 1;
            let id = format!("g{}", counter);
            let branch_count = rng.random_range(1..=4);
            let branches = (0..branch_count)
                .map(|_| BranchDefinition {
                    next: chain(rng, flow, counter, depth - 1),
                    payload: Payload::new(),
                })
                .collect();
            flow.elements.insert(
                id.clone(),
                FlowElement::Gateway(GatewayElement {
                    branches,
                    payload: Payload::new(),
                }),
            );
            Some(id)
        } else {
            None
        };
        for _ in 0..rng.random_range(0..=2) {
            *counter += 1;
            let id = format!("c{}", counter);
            flow.elements.insert(
                id.clone(),
                FlowElement::Content(ContentElement {
                    next,
                    payload: Payload::new(),
                }),
            );
            next = Some(id);
        }
        next
    }

    let mut flow = FlowDescription::new();
    let mut counter = 0;
    flow.first_element_id = chain(rng, &mut flow, &mut counter, depth);
    flow
}

/// Generates a random flow whose gateways rejoin: every branch of a gateway runs into
/// the gateway's continuation, which may itself open a wider or narrower gateway.
/// Merges happen inside the flow, so gateways can end up taller than their branches.
#[allow(dead_code)]
pub fn random_joined_flow<R: Rng>(rng: &mut R, depth: usize) -> FlowDescription {
    fn segment<R: Rng>(
        rng: &mut R,
        flow: &mut FlowDescription,
        counter: &mut usize,
        depth: usize,
        exit: Option<String>,
    ) -> Option<String> {
        let mut next = exit;
        if depth > 0 && rng.random_bool(0.7) {
            let join = segment(rng, flow, counter, depth - 1, next);
            *counter += 1;
            let id = format!("g{}", counter);
            let branch_count = rng.random_range(2..=4);
            let branches = (0..branch_count)
                .map(|_| BranchDefinition {
                    next: segment(rng, flow, counter, depth - 1, join.clone()),
                    payload: Payload::new(),
                })
                .collect();
            flow.elements.insert(
                id.clone(),
                FlowElement::Gateway(GatewayElement {
                    branches,
                    payload: Payload::new(),
                }),
            );
            next = Some(id);
        }
        for _ in 0..rng.random_range(0..=2) {
            *counter += 1;
            let id = format!("c{}", counter);
            flow.elements.insert(
                id.clone(),
                FlowElement::Content(ContentElement {
                    next,
                    payload: Payload::new(),
                }),
            );
            next = Some(id);
        }
        next
    }

    let mut flow = FlowDescription::new();
    let mut counter = 0;
    flow.first_element_id = segment(rng, &mut flow, &mut counter, depth, None);
    flow
}

/// Asserts column monotonicity, positive row counts and the gateway row-sum invariant.
#[allow(dead_code)]
pub fn assert_layout_invariants(layout: &FlowLayout) {
    let tree = layout.tree();
    assert_eq!(layout.column_index(tree.root()), 1);

    for (id, node) in tree.iter() {
        assert!(layout.row_count(id) >= 1, "node {} has no rows", id);
        for &next in node.outgoing() {
            assert!(
                layout.column_index(next) > layout.column_index(id),
                "column of {} ({}) is not after {} ({})",
                tree.describe(next),
                layout.column_index(next),
                tree.describe(id),
                layout.column_index(id)
            );
        }
        match node.kind() {
            NodeKind::DivergingGateway { .. } => {
                let total: usize = node.outgoing().iter().map(|&b| layout.row_count(b)).sum();
                assert_eq!(total, layout.row_count(id), "branch rows of {}", tree.describe(id));
            }
            NodeKind::ConvergingGateway { .. } => {
                let total: usize = node.incoming().iter().map(|&b| layout.row_count(b)).sum();
                assert_eq!(total, layout.row_count(id), "branch rows of {}", tree.describe(id));
            }
            _ => {}
        }
    }
}

/// Asserts that the projected cells cover every grid position exactly once.
#[allow(dead_code)]
pub fn assert_cells_tile_grid(layout: &FlowLayout) {
    let height = layout.row_total();
    let width = layout.column_count();
    let mut covered = vec![vec![false; width]; height];

    for cell in project(layout) {
        assert!(cell.row >= 1 && cell.column >= 1, "cell {:?} starts at 0", cell);
        for row in cell.row..cell.row + cell.row_span {
            for column in cell.column..cell.column + cell.column_span {
                assert!(
                    row <= height && column <= width,
                    "cell {:?} leaves the {}x{} grid",
                    cell,
                    width,
                    height
                );
                assert!(
                    !covered[row - 1][column - 1],
                    "position ({}, {}) covered twice, last by {:?}",
                    row,
                    column,
                    cell
                );
                covered[row - 1][column - 1] = true;
            }
        }
    }

    for (row, line) in covered.iter().enumerate() {
        for (column, &is_covered) in line.iter().enumerate() {
            assert!(is_covered, "position ({}, {}) is empty", row + 1, column + 1);
        }
    }
}

/// Counts the nodes of a given kind name.
#[allow(dead_code)]
pub fn count_kind(tree: &FlowTree, name: &str) -> usize {
    tree.iter().filter(|(_, node)| node.kind().name() == name).count()
}
