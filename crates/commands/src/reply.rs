//! Uniform command reply contract.

use serde::ser::{Error as _, SerializeMap};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};

/// Closed set of structured error codes.
///
/// Guards may only produce the first four; the not-found codes are surfaced
/// by command bodies. Extend only by adding new codes, never by reusing one
/// for a different condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidParameter,
    Unauthenticated,
    PermissionDenied,
    OrganizationNotFound,
    KeyboardDefinitionNotFound,
    TaskNotFound,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidParameter => "INVALID_PARAMETER",
            ErrorCode::Unauthenticated => "UNAUTHENTICATED",
            ErrorCode::PermissionDenied => "PERMISSION_DENIED",
            ErrorCode::OrganizationNotFound => "ORGANIZATION_NOT_FOUND",
            ErrorCode::KeyboardDefinitionNotFound => "KEYBOARD_DEFINITION_NOT_FOUND",
            ErrorCode::TaskNotFound => "TASK_NOT_FOUND",
        }
    }
}

impl core::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The discriminated reply every command returns.
///
/// Serializes as `{"success": true, ...payload}` or
/// `{"success": false, "errorCode": ..., "errorMessage": ...}`. A reply is
/// structurally either one or the other; there is no way to build a success
/// carrying an error code.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Success(Map<String, JsonValue>),
    Failure { code: ErrorCode, message: String },
}

impl Reply {
    /// Success with no payload fields.
    pub fn ok() -> Self {
        Reply::Success(Map::new())
    }

    /// Success with the given payload flattened alongside `success`.
    pub fn with_payload<P: Serialize>(payload: &P) -> Result<Self, serde_json::Error> {
        Ok(Reply::Success(json_object(payload)?))
    }

    pub fn failure(code: ErrorCode, message: impl Into<String>) -> Self {
        Reply::Failure {
            code,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Reply::Success(_))
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            Reply::Success(_) => None,
            Reply::Failure { code, .. } => Some(*code),
        }
    }
}

impl Serialize for Reply {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Reply::Success(payload) => {
                let mut map = serializer.serialize_map(Some(payload.len() + 1))?;
                map.serialize_entry("success", &true)?;
                for (key, value) in payload {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Reply::Failure { code, message } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("success", &false)?;
                map.serialize_entry("errorCode", code)?;
                map.serialize_entry("errorMessage", message)?;
                map.end()
            }
        }
    }
}

/// Serialize a value to a JSON object map.
///
/// Reply payloads and signed-token payloads must be objects; anything else is
/// a programming error surfaced as a serialization failure.
pub fn json_object<T: Serialize>(value: &T) -> Result<Map<String, JsonValue>, serde_json::Error> {
    match serde_json::to_value(value)? {
        JsonValue::Object(map) => Ok(map),
        other => Err(serde_json::Error::custom(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}
