/*!
 * In-memory model representation.
 *
 * A model is a named bag of JSON attributes plus the name of the attribute
 * that keys its row (`id` unless overridden). The full attribute map is what
 * gets serialized into the `value` column; extra filter columns are copied
 * out of the same map at statement-build time.
 */

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ident;

/// Attribute used to key rows unless the model overrides it
pub const DEFAULT_ID_ATTRIBUTE: &str = "id";

/// Legacy attribute adopted as the id when the id attribute is unset
pub const LEGACY_ID_ATTRIBUTE: &str = "apiid";

/// A persistable model: an attribute map, the id attribute name, and an
/// optional url used for route resolution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Model {
    /// Name of the attribute holding the row key
    id_attribute: String,
    /// Url this model resolves against when the request supplies none
    url: Option<String>,
    /// Full attribute state
    attributes: Map<String, Value>,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    /// Create an empty model keyed on the default id attribute
    pub fn new() -> Self {
        Self {
            id_attribute: DEFAULT_ID_ATTRIBUTE.to_string(),
            url: None,
            attributes: Map::new(),
        }
    }

    /// Create a model from an existing attribute map
    pub fn with_attributes(attributes: Map<String, Value>) -> Self {
        Self {
            attributes,
            ..Self::new()
        }
    }

    /// Set the url the model resolves against
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Override the attribute that keys the row
    pub fn with_id_attribute(mut self, name: impl Into<String>) -> Self {
        self.id_attribute = name.into();
        self
    }

    /// Name of the attribute holding the row key
    pub fn id_attribute(&self) -> &str {
        &self.id_attribute
    }

    /// The model's own url, if any
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Read an attribute
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Set an attribute
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Remove an attribute, returning its previous value
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.attributes.remove(name)
    }

    /// The value under the id attribute. Null, `false`, zero, and the empty
    /// string all count as unset, so a create replaces them with a real key.
    pub fn id(&self) -> Option<&Value> {
        self.attributes
            .get(&self.id_attribute)
            .filter(|value| !is_unset(value))
    }

    /// Whether the model currently carries a row key
    pub fn has_id(&self) -> bool {
        self.id().is_some()
    }

    /// The row key rendered as plain text, for messages and row lookups
    pub fn id_text(&self) -> Option<String> {
        self.id().map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// Full attribute state as a JSON object. This is the single source of
    /// truth persisted into the `value` column.
    pub fn to_json(&self) -> Value {
        Value::Object(self.attributes.clone())
    }

    /// Ensure the model has a row key before a create.
    ///
    /// If the id attribute is unset, a legacy `apiid` attribute is adopted as
    /// the id and removed from the attribute set; otherwise a fresh
    /// identifier is generated and assigned. Returns the resolved id value.
    pub fn resolve_id(&mut self) -> Value {
        if let Some(id) = self.id() {
            return id.clone();
        }

        let id = match self.attributes.remove(LEGACY_ID_ATTRIBUTE) {
            Some(legacy) if !is_unset(&legacy) => legacy,
            _ => Value::String(ident::generate()),
        };
        self.attributes
            .insert(self.id_attribute.clone(), id.clone());
        id
    }
}

/// Values that never serve as a row key
fn is_unset(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f == 0.0),
        _ => false,
    }
}
