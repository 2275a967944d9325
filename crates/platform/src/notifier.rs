//! Webhook notification boundary.

use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::{Map, Value as JsonValue, json};

use crate::error::PlatformError;

/// Delivers a signed payload to a notification endpoint.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(
        &self,
        token: &str,
        payload: &Map<String, JsonValue>,
    ) -> Result<(), PlatformError>;
}

/// Posts `{token, payload}` as JSON to a fixed endpoint.
pub struct HttpNotifier {
    client: reqwest::Client,
    url: String,
}

impl HttpNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn notify(
        &self,
        token: &str,
        payload: &Map<String, JsonValue>,
    ) -> Result<(), PlatformError> {
        let body = json!({
            "token": token,
            "payload": payload,
        });
        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| PlatformError::Notifier(e.to_string()))?;
        response
            .error_for_status()
            .map_err(|e| PlatformError::Notifier(e.to_string()))?;
        tracing::info!(url = %self.url, "notification delivered");
        Ok(())
    }
}

/// Recording notifier for tests: deliveries are stored, never sent.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    deliveries: RwLock<Vec<(String, Map<String, JsonValue>)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deliveries(&self) -> Vec<(String, Map<String, JsonValue>)> {
        self.deliveries.read().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(
        &self,
        token: &str,
        payload: &Map<String, JsonValue>,
    ) -> Result<(), PlatformError> {
        self.deliveries
            .write()
            .map_err(|_| PlatformError::Notifier("lock poisoned".to_string()))?
            .push((token.to_string(), payload.clone()));
        Ok(())
    }
}
