//! Deployment configuration for platform collaborators.

use chrono::Duration;

/// Externalized deployment settings.
///
/// These were once module-level constants scattered through the command
/// handlers; they are injected here so tests and alternate deployments can
/// substitute their own values.
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// Cloud project hosting the task queue.
    pub project_id: String,
    /// Region of the task queue.
    pub queue_location: String,
    /// Name of the firmware build queue.
    pub queue_name: String,
    /// Base URL of the firmware build server.
    pub build_server_url: String,
    /// Endpoint receiving signed review-status notifications.
    pub notification_url: String,
    /// Shared secret for signing notification tokens.
    pub jwt_secret: String,
    /// Lifetime of a signed notification token.
    pub token_ttl: Duration,
}

impl PlatformConfig {
    /// Fully-qualified queue path, `projects/{p}/locations/{l}/queues/{q}`.
    pub fn queue_path(&self) -> String {
        format!(
            "projects/{}/locations/{}/queues/{}",
            self.project_id, self.queue_location, self.queue_name
        )
    }
}
