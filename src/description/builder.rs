use super::definition::{
    BranchDefinition, ContentElement, FlowDescription, FlowElement, GatewayElement, Payload,
};

/// Fluent construction of a `FlowDescription`, mostly useful for tests and converters.
///
/// ```rust
/// use flowgrid::description::FlowDescriptionBuilder;
///
/// let flow = FlowDescriptionBuilder::new()
///     .first("a")
///     .gateway("a", [Some("b"), Some("c")])
///     .content("b", Some("d"))
///     .content("c", Some("d"))
///     .content("d", None)
///     .build();
/// assert_eq!(flow.elements.len(), 4);
/// ```
#[derive(Debug, Default)]
pub struct FlowDescriptionBuilder {
    description: FlowDescription,
}

impl FlowDescriptionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn first(mut self, id: &str) -> Self {
        self.description.first_element_id = Some(id.to_string());
        self
    }

    pub fn content(self, id: &str, next: Option<&str>) -> Self {
        self.content_with_payload(id, next, Payload::new())
    }

    pub fn content_with_payload(mut self, id: &str, next: Option<&str>, payload: Payload) -> Self {
        self.description.elements.insert(
            id.to_string(),
            FlowElement::Content(ContentElement {
                next: next.map(str::to_string),
                payload,
            }),
        );
        self
    }

    pub fn gateway<'a, I>(mut self, id: &str, branches: I) -> Self
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let branches = branches
            .into_iter()
            .map(|next| BranchDefinition {
                next: next.map(str::to_string),
                payload: Payload::new(),
            })
            .collect();
        self.description.elements.insert(
            id.to_string(),
            FlowElement::Gateway(GatewayElement {
                branches,
                payload: Payload::new(),
            }),
        );
        self
    }

    pub fn build(self) -> FlowDescription {
        self.description
    }
}
