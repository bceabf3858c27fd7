use super::definition::FlowDescription;
use crate::error::ConversionError;

/// A trait for custom data models that can be converted into a `FlowDescription`.
///
/// Editors and storage layers keep flows in their own shape; implementing this trait
/// provides the translation layer into the engine's canonical flat description.
///
/// # Example
///
/// ```rust
/// use flowgrid::description::{ContentElement, FlowDescription, FlowElement, IntoFlow};
/// use flowgrid::error::ConversionError;
///
/// // A linear checklist stored as an ordered list of step names.
/// struct Checklist { steps: Vec<String> }
///
/// impl IntoFlow for Checklist {
///     fn into_flow(self) -> Result<FlowDescription, ConversionError> {
///         let mut flow = FlowDescription::new();
///         flow.first_element_id = self.steps.first().cloned();
///         for (index, step) in self.steps.iter().enumerate() {
///             if step.is_empty() {
///                 return Err(ConversionError::Invalid(format!("step {} has no name", index)));
///             }
///             let next = self.steps.get(index + 1).cloned();
///             flow.elements.insert(
///                 step.clone(),
///                 FlowElement::Content(ContentElement { next, ..Default::default() }),
///             );
///         }
///         Ok(flow)
///     }
/// }
///
/// let flow = Checklist { steps: vec!["pack".into(), "ship".into()] }.into_flow().unwrap();
/// assert_eq!(flow.first_element_id.as_deref(), Some("pack"));
/// ```
pub trait IntoFlow {
    /// Consumes the object and converts it into a flat flow description.
    fn into_flow(self) -> Result<FlowDescription, ConversionError>;
}

impl IntoFlow for FlowDescription {
    fn into_flow(self) -> Result<FlowDescription, ConversionError> {
        Ok(self)
    }
}
