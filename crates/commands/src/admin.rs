//! Moderation commands for keyboard definitions (administrator-only).

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use kbdhub_core::{DefinitionId, DefinitionStatus, KeyboardDefinition};
use kbdhub_platform::Platform;

use crate::command::{Command, PipelineError, parse_request};
use crate::context::ExecutionContext;
use crate::guard::Guard;
use crate::input::RawInput;
use crate::reply::{ErrorCode, Reply, json_object};

/// Permitted `status` literals, matching [`DefinitionStatus`].
pub(crate) const DEFINITION_STATUS_VALUES: &[&str] =
    &["draft", "in_review", "rejected", "approved"];

/// Wire representation of a definition in moderation listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct DefinitionSummary {
    id: DefinitionId,
    author_uid: kbdhub_core::Uid,
    created_at: i64,
    json: String,
    name: String,
    product_id: i64,
    product_name: String,
    reject_reason: Option<String>,
    status: DefinitionStatus,
    updated_at: i64,
    vendor_id: i64,
}

impl From<KeyboardDefinition> for DefinitionSummary {
    fn from(definition: KeyboardDefinition) -> Self {
        Self {
            id: definition.id,
            author_uid: definition.author_uid,
            created_at: definition.created_at.timestamp_millis(),
            json: definition.json,
            name: definition.name,
            product_id: definition.product_id,
            product_name: definition.product_name,
            reject_reason: definition.reject_reason,
            status: definition.status,
            updated_at: definition.updated_at.timestamp_millis(),
            vendor_id: definition.vendor_id,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// FetchKeyboardDefinitionListByStatusCommand
// ─────────────────────────────────────────────────────────────────────────────

/// List definitions in a given moderation status, newest first.
pub struct FetchKeyboardDefinitionListByStatusCommand {
    platform: Platform,
}

#[derive(Debug, Deserialize)]
struct FetchByStatusRequest {
    status: DefinitionStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FetchByStatusPayload {
    keyboard_definition_list: Vec<DefinitionSummary>,
}

impl FetchKeyboardDefinitionListByStatusCommand {
    pub const NAME: &'static str = "fetchKeyboardDefinitionListByStatus";

    const GUARDS: &'static [Guard] = &[
        Guard::Authentication,
        Guard::Administrator,
        Guard::RequiredFields(&["status"]),
        Guard::AllowedValues(&[("status", DEFINITION_STATUS_VALUES)]),
    ];

    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }
}

#[async_trait]
impl Command for FetchKeyboardDefinitionListByStatusCommand {
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
        _ctx: &ExecutionContext,
    ) -> Result<Reply, PipelineError> {
        let request: FetchByStatusRequest = match parse_request(input) {
            Ok(request) => request,
            Err(reply) => return Ok(reply),
        };

        let definitions = self
            .platform
            .store
            .definitions_by_status(request.status)
            .await?;
        let payload = FetchByStatusPayload {
            keyboard_definition_list: definitions.into_iter().map(Into::into).collect(),
        };
        Ok(Reply::with_payload(&payload)?)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// UpdateKeyboardDefinitionStatusCommand
// ─────────────────────────────────────────────────────────────────────────────

/// Apply a review decision and notify the definition's author.
///
/// The notification is authorized downstream by a short-lived signed token
/// over the same payload that gets delivered.
pub struct UpdateKeyboardDefinitionStatusCommand {
    platform: Platform,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateStatusRequest {
    id: DefinitionId,
    status: DefinitionStatus,
    reject_reason: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusNotification {
    email: String,
    display_name: String,
    keyboard: String,
    status: DefinitionStatus,
    definition_id: DefinitionId,
}

impl UpdateKeyboardDefinitionStatusCommand {
    pub const NAME: &'static str = "updateKeyboardDefinitionStatus";

    const GUARDS: &'static [Guard] = &[
        Guard::Authentication,
        Guard::Administrator,
        Guard::RequiredFields(&["id", "status", "rejectReason"]),
        Guard::AllowedValues(&[("status", DEFINITION_STATUS_VALUES)]),
    ];

    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }
}

#[async_trait]
impl Command for UpdateKeyboardDefinitionStatusCommand {
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
        _ctx: &ExecutionContext,
    ) -> Result<Reply, PipelineError> {
        let request: UpdateStatusRequest = match parse_request(input) {
            Ok(request) => request,
            Err(reply) => return Ok(reply),
        };

        let Some(definition) = self.platform.store.definition(&request.id).await? else {
            return Ok(Reply::failure(
                ErrorCode::KeyboardDefinitionNotFound,
                format!("Keyboard Definition not found: {}", request.id),
            ));
        };

        self.platform
            .store
            .update_definition_review(
                &request.id,
                request.status,
                Some(request.reject_reason),
                Utc::now(),
            )
            .await?;
        tracing::info!(
            definition = request.id.as_str(),
            status = request.status.as_str(),
            "definition review status updated"
        );

        let author = self.platform.identity.profile(&definition.author_uid).await?;
        let notification = StatusNotification {
            email: author.email,
            display_name: author.display_name,
            keyboard: definition.name,
            status: request.status,
            definition_id: request.id,
        };
        let payload = json_object(&notification)?;
        let token = self.platform.signer.sign(&payload)?;
        self.platform.notifier.notify(&token, &payload).await?;

        Ok(Reply::ok())
    }
}
