//! Task queue boundary.

use std::sync::RwLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PlatformError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
}

/// An HTTP-callback task to enqueue.
///
/// Mirrors the hosted queue's task shape: the queue later performs the HTTP
/// request itself, the enqueue call only registers it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpCallbackTask {
    /// Fully-qualified queue path, see [`crate::PlatformConfig::queue_path`].
    pub queue_path: String,
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
}

/// Enqueues HTTP-callback tasks on a distributed queue.
#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// Enqueue a task, returning the queue-assigned task name.
    async fn enqueue(&self, task: HttpCallbackTask) -> Result<String, PlatformError>;
}

/// Recording queue for tests/dev: tasks are stored, never executed.
#[derive(Debug, Default)]
pub struct RecordingTaskQueue {
    tasks: RwLock<Vec<HttpCallbackTask>>,
}

impl RecordingTaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueued(&self) -> Vec<HttpCallbackTask> {
        self.tasks.read().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl TaskQueue for RecordingTaskQueue {
    async fn enqueue(&self, task: HttpCallbackTask) -> Result<String, PlatformError> {
        let mut tasks = self
            .tasks
            .write()
            .map_err(|_| PlatformError::Queue("lock poisoned".to_string()))?;
        let name = format!("{}/tasks/{}", task.queue_path, tasks.len());
        tracing::debug!(task = %name, url = %task.url, "task recorded");
        tasks.push(task);
        Ok(name)
    }
}
