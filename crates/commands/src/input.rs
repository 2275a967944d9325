//! Untyped caller input.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value as JsonValue};

/// The raw field mapping supplied by the caller.
///
/// Guards validate this form; after the chain passes, each command
/// deserializes it into its own typed request struct via [`RawInput::parse`]
/// and the body never touches the untyped mapping again.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct RawInput(Map<String, JsonValue>);

impl RawInput {
    pub fn new(fields: Map<String, JsonValue>) -> Self {
        Self(fields)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&JsonValue> {
        self.0.get(field)
    }

    /// Whether the field is present and non-null.
    pub fn has(&self, field: &str) -> bool {
        matches!(self.0.get(field), Some(value) if !value.is_null())
    }

    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(JsonValue::as_str)
    }

    /// Deserialize the whole mapping into a typed request.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(JsonValue::Object(self.0.clone()))
    }
}

impl From<Map<String, JsonValue>> for RawInput {
    fn from(fields: Map<String, JsonValue>) -> Self {
        Self(fields)
    }
}
