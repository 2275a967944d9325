//! Firmware build commands.

use async_trait::async_trait;
use serde::Deserialize;

use kbdhub_core::TaskId;
use kbdhub_platform::{HttpCallbackTask, HttpMethod, Platform};

use crate::command::{Command, PipelineError, parse_request};
use crate::context::ExecutionContext;
use crate::guard::Guard;
use crate::input::RawInput;
use crate::reply::{ErrorCode, Reply};

/// Enqueue the firmware build for a task the caller owns.
///
/// A task owned by someone else answers exactly like a missing task, so the
/// reply is not an existence oracle for other users' tasks.
pub struct CreateFirmwareBuildingTaskCommand {
    platform: Platform,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateBuildRequest {
    task_id: TaskId,
}

impl CreateFirmwareBuildingTaskCommand {
    pub const NAME: &'static str = "createFirmwareBuildingTask";

    const GUARDS: &'static [Guard] = &[
        Guard::Authentication,
        Guard::RequiredFields(&["taskId"]),
    ];

    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }
}

#[async_trait]
impl Command for CreateFirmwareBuildingTaskCommand {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn guards(&self) -> &'static [Guard] {
        Self::GUARDS
    }

    fn platform(&self) -> &Platform {
        &self.platform
    }

    async fn run(
        &self,
        input: &RawInput,
        ctx: &ExecutionContext,
    ) -> Result<Reply, PipelineError> {
        let request: CreateBuildRequest = match parse_request(input) {
            Ok(request) => request,
            Err(reply) => return Ok(reply),
        };
        let Some(principal) = ctx.principal() else {
            return Ok(Reply::failure(
                ErrorCode::Unauthenticated,
                "authentication required",
            ));
        };

        let Some(task) = self.platform.store.build_task(&request.task_id).await? else {
            return Ok(Reply::failure(
                ErrorCode::TaskNotFound,
                format!("The task [{}] is not found (1)", request.task_id),
            ));
        };
        if task.uid != principal.uid {
            return Ok(Reply::failure(
                ErrorCode::TaskNotFound,
                format!("The task [{}] is not found (2)", request.task_id),
            ));
        }

        let config = &self.platform.config;
        let callback = HttpCallbackTask {
            queue_path: config.queue_path(),
            method: HttpMethod::Get,
            url: format!(
                "{}/build?uid={}&taskId={}",
                config.build_server_url, principal.uid, request.task_id
            ),
            headers: vec![("Content-Type".to_string(), "text/plain".to_string())],
        };
        let task_name = self.platform.queue.enqueue(callback).await?;
        tracing::info!(task = %task_name, "firmware building task enqueued");

        Ok(Reply::ok())
    }
}
