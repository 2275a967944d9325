//! Per-invocation execution context.

use serde_json::{Map, Value as JsonValue};

use kbdhub_auth::Principal;

/// Caller identity and request-scoped ambient data.
///
/// Built by the invocation boundary, immutable for the request's lifetime.
/// Absence of a principal *is* the unauthenticated state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionContext {
    principal: Option<Principal>,
    metadata: Map<String, JsonValue>,
}

impl ExecutionContext {
    /// Context for an unauthenticated caller.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Context for an authenticated caller.
    pub fn authenticated(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
            metadata: Map::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: Map<String, JsonValue>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    pub fn metadata(&self) -> &Map<String, JsonValue> {
        &self.metadata
    }
}
