use crate::description::FlowDescription;
use crate::error::FlowError;
use crate::layout::{Alignment, FlowLayout};
use crate::tree::{FlowTree, TreeBuilder};
use crate::validate::{check_acyclic, validate_merges};
use tracing::debug;

/// Runs the structural checks and returns the validated tree.
fn build_validated_tree(description: &FlowDescription) -> Result<FlowTree, FlowError> {
    check_acyclic(description)?;
    let tree = TreeBuilder::new(description).build();
    validate_merges(&tree)?;
    Ok(tree)
}

/// Checks that a flow description can be laid out: no cycles, and only neighboring
/// branches merge. Does not compute the layout itself.
///
/// Edit operations use this as a dry run before committing a change.
pub fn validate(description: &FlowDescription) -> Result<(), FlowError> {
    build_validated_tree(description).map(|_| ())
}

/// Same as [`validate`], with the error reduced to `false`.
pub fn is_valid(description: &FlowDescription) -> bool {
    validate(description).is_ok()
}

/// Runs the whole pipeline and returns the laid-out tree.
pub fn build_layout(
    description: &FlowDescription,
    alignment: Alignment,
) -> Result<FlowLayout, FlowError> {
    let tree = build_validated_tree(description)?;
    let layout = FlowLayout::compute(tree, alignment)?;
    debug!(
        nodes = layout.tree().len(),
        columns = layout.column_count(),
        rows = layout.row_total(),
        "Built flow layout"
    );
    Ok(layout)
}

/// Configured entry point to the pipeline.
///
/// ```rust
/// use flowgrid::prelude::*;
///
/// let flow = FlowDescription::from_json(r#"{
///     "firstElementId": "a",
///     "elements": { "a": { "branches": [{ "next": "b" }, {}] }, "b": {} }
/// }"#).unwrap();
///
/// let layout = LayoutEngine::builder(flow)
///     .with_alignment(Alignment::Bottom)
///     .build()
///     .layout()
///     .unwrap();
/// assert_eq!(layout.row_total(), 2);
/// ```
pub struct LayoutEngine {
    description: FlowDescription,
    alignment: Alignment,
}

pub struct LayoutEngineBuilder {
    description: FlowDescription,
    alignment: Alignment,
}

impl LayoutEngineBuilder {
    pub fn new(description: FlowDescription) -> Self {
        Self {
            description,
            alignment: Alignment::default(),
        }
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn build(self) -> LayoutEngine {
        LayoutEngine {
            description: self.description,
            alignment: self.alignment,
        }
    }
}

impl LayoutEngine {
    pub fn builder(description: FlowDescription) -> LayoutEngineBuilder {
        LayoutEngineBuilder::new(description)
    }

    pub fn description(&self) -> &FlowDescription {
        &self.description
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn validate(&self) -> Result<(), FlowError> {
        validate(&self.description)
    }

    /// Builds the tree without laying it out. The tree is validated.
    pub fn tree(&self) -> Result<FlowTree, FlowError> {
        build_validated_tree(&self.description)
    }

    pub fn layout(&self) -> Result<FlowLayout, FlowError> {
        build_layout(&self.description, self.alignment)
    }
}
