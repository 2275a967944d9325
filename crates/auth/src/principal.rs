//! Authenticated principal model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use kbdhub_core::Uid;

/// Decoded token claims attached to a principal.
///
/// Claims are an open map at this layer; well-known claims get typed
/// accessors. The administrator claim is a boolean custom claim set by the
/// identity provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, JsonValue>);

impl Claims {
    pub const ADMIN: &'static str = "admin";

    pub fn new(claims: Map<String, JsonValue>) -> Self {
        Self(claims)
    }

    pub fn get(&self, name: &str) -> Option<&JsonValue> {
        self.0.get(name)
    }

    pub fn bool_claim(&self, name: &str) -> bool {
        matches!(self.0.get(name), Some(JsonValue::Bool(true)))
    }
}

/// A fully resolved authenticated identity.
///
/// Presence of a `Principal` in the execution context *is* the
/// authentication state: an unauthenticated request simply has none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    pub uid: Uid,
    pub claims: Claims,
}

impl Principal {
    pub fn new(uid: impl Into<Uid>) -> Self {
        Self {
            uid: uid.into(),
            claims: Claims::default(),
        }
    }

    pub fn with_claims(uid: impl Into<Uid>, claims: Claims) -> Self {
        Self {
            uid: uid.into(),
            claims,
        }
    }

    /// Mark this principal as an administrator.
    pub fn admin(mut self) -> Self {
        self.claims
            .0
            .insert(Claims::ADMIN.to_string(), JsonValue::Bool(true));
        self
    }

    pub fn is_admin(&self) -> bool {
        self.claims.bool_claim(Claims::ADMIN)
    }
}
