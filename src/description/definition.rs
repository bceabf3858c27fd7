use crate::error::FlowError;
use ahash::AHashMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Opaque key-value data attached to elements and branches. The engine never inspects it.
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// The flat, pointer-based description of a flow.
/// This is the external form callers build, edit and persist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowDescription {
    #[serde(default)]
    pub first_element_id: Option<String>,
    #[serde(default)]
    pub elements: AHashMap<String, FlowElement>,
}

/// A single element of the flat description.
///
/// Elements carrying a `branches` key are diverging gateways; everything else is content.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FlowElement {
    Gateway(GatewayElement),
    Content(ContentElement),
}

/// A step with a single outgoing link.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContentElement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub payload: Payload,
}

/// A diverging gateway with an ordered list of outgoing branches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayElement {
    pub branches: Vec<BranchDefinition>,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub payload: Payload,
}

/// One outgoing branch of a diverging gateway. The payload usually holds its condition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BranchDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub payload: Payload,
}

impl<'de> Deserialize<'de> for FlowElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        let is_gateway = fields.contains_key("branches");
        let value = serde_json::Value::Object(fields);
        let element = if is_gateway {
            serde_json::from_value(value).map(FlowElement::Gateway)
        } else {
            serde_json::from_value(value).map(FlowElement::Content)
        };
        element.map_err(D::Error::custom)
    }
}

impl FlowElement {
    /// Every outgoing link of this element, in branch order.
    pub fn next_ids(&self) -> Vec<Option<&str>> {
        match self {
            FlowElement::Content(content) => vec![content.next.as_deref()],
            FlowElement::Gateway(gateway) => gateway
                .branches
                .iter()
                .map(|branch| branch.next.as_deref())
                .collect(),
        }
    }

    pub fn payload(&self) -> &Payload {
        match self {
            FlowElement::Content(content) => &content.payload,
            FlowElement::Gateway(gateway) => &gateway.payload,
        }
    }

    pub fn is_gateway(&self) -> bool {
        matches!(self, FlowElement::Gateway(_))
    }
}

impl FlowDescription {
    /// Creates an empty flow: `Start` followed directly by `End`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a description from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, FlowError> {
        serde_json::from_str(json).map_err(|e| FlowError::Json(e.to_string()))
    }

    /// Serializes the description to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, FlowError> {
        serde_json::to_string_pretty(self).map_err(|e| FlowError::Json(e.to_string()))
    }

    pub fn element(&self, id: &str) -> Option<&FlowElement> {
        self.elements.get(id)
    }

    /// Resolves a `next` link: `None` when the link denotes the end of the flow.
    pub fn resolve<'a>(&'a self, next: Option<&'a str>) -> Option<(&'a str, &'a FlowElement)> {
        let id = next?;
        self.elements.get(id).map(|element| (id, element))
    }

    pub fn is_empty(&self) -> bool {
        self.resolve(self.first_element_id.as_deref()).is_none()
    }
}
