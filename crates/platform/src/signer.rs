//! Token signing boundary.
//!
//! Review-status notifications are authorized downstream by a short-lived
//! signed token over the notification payload.

use std::sync::RwLock;

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Map, Value as JsonValue};

use crate::error::PlatformError;

/// Produces a short-lived signed token from a payload.
pub trait TokenSigner: Send + Sync {
    fn sign(&self, payload: &Map<String, JsonValue>) -> Result<String, PlatformError>;
}

/// HS256 signer over a shared secret, with `iat`/`exp` claims.
pub struct JwtTokenSigner {
    secret: String,
    ttl: Duration,
}

impl JwtTokenSigner {
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }
}

impl TokenSigner for JwtTokenSigner {
    fn sign(&self, payload: &Map<String, JsonValue>) -> Result<String, PlatformError> {
        let now = Utc::now();
        let mut claims = payload.clone();
        claims.insert("iat".to_string(), JsonValue::from(now.timestamp()));
        claims.insert(
            "exp".to_string(),
            JsonValue::from((now + self.ttl).timestamp()),
        );

        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| PlatformError::Signer(e.to_string()))
    }
}

/// Recording signer for tests: returns a fixed token, remembers payloads.
#[derive(Debug, Default)]
pub struct RecordingTokenSigner {
    signed: RwLock<Vec<Map<String, JsonValue>>>,
}

impl RecordingTokenSigner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed(&self) -> Vec<Map<String, JsonValue>> {
        self.signed.read().expect("lock poisoned").clone()
    }
}

impl TokenSigner for RecordingTokenSigner {
    fn sign(&self, payload: &Map<String, JsonValue>) -> Result<String, PlatformError> {
        self.signed
            .write()
            .map_err(|_| PlatformError::Signer("lock poisoned".to_string()))?
            .push(payload.clone());
        Ok("signed-token".to_string())
    }
}
