//! Command contract and dispatch integration.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

use kbdhub_platform::{Platform, PlatformError};

use crate::context::ExecutionContext;
use crate::guard::{Guard, GuardOutcome, run_guards};
use crate::input::RawInput;
use crate::reply::{ErrorCode, Reply};

/// A fatal, non-structured failure of one invocation.
///
/// These propagate to the invocation boundary's generic handler; they are
/// never converted into a `Reply::Failure`. Callers can therefore always
/// tell "rejected for a known reason" from "the service failed".
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error("payload serialization failed: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("unknown command: {0}")]
    UnknownCommand(String),
}

/// One business operation: an ordered guard chain plus a body.
///
/// The body is only reached through [`execute`], so it may assume every
/// declared guard passed: the caller is authenticated, authorized, and the
/// declared fields are present with permitted values.
#[async_trait]
pub trait Command: Send + Sync {
    /// Operation name used by the dispatcher.
    fn name(&self) -> &'static str;

    /// Guard chain, evaluated strictly in this order.
    fn guards(&self) -> &'static [Guard];

    /// Injected collaborators.
    fn platform(&self) -> &Platform;

    /// The body. Side effects (store mutation, enqueue, webhook) live only
    /// here, never in guards.
    async fn run(
        &self,
        input: &RawInput,
        ctx: &ExecutionContext,
    ) -> Result<Reply, PipelineError>;
}

/// Run a command: guard chain first, body only if every guard passed.
///
/// The first failing guard becomes the reply; later guards and the body are
/// never evaluated for that invocation.
pub async fn execute(
    command: &dyn Command,
    input: &RawInput,
    ctx: &ExecutionContext,
) -> Result<Reply, PipelineError> {
    let store = command.platform().store.clone();
    match run_guards(command.guards(), input, ctx, store.as_ref()).await? {
        GuardOutcome::Pass => {}
        GuardOutcome::Fail { code, message } => {
            tracing::info!(
                command = command.name(),
                code = code.as_str(),
                "guard rejected invocation"
            );
            return Ok(Reply::failure(code, message));
        }
    }
    command.run(input, ctx).await
}

/// Deserialize the validated input into a typed request struct.
///
/// Guards already checked presence and permitted values; a shape mismatch
/// that still slips through (e.g. a number where a string belongs) is an
/// `INVALID_PARAMETER` rejection, not a boundary error.
pub(crate) fn parse_request<T: DeserializeOwned>(input: &RawInput) -> Result<T, Reply> {
    input
        .parse()
        .map_err(|e| Reply::failure(ErrorCode::InvalidParameter, format!("malformed input: {e}")))
}

/// Maps operation names to command instances for the invocation boundary.
///
/// The boundary itself (transport, token verification, timeouts) stays
/// outside this crate; it hands over a `RawInput` and an `ExecutionContext`
/// and gets the uniform `Reply` back.
pub struct CommandRegistry {
    commands: HashMap<&'static str, Arc<dyn Command>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    /// Registry with every business command wired to the given platform.
    pub fn with_default_commands(platform: Platform) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(
            crate::admin::FetchKeyboardDefinitionListByStatusCommand::new(platform.clone()),
        ));
        registry.register(Arc::new(
            crate::admin::UpdateKeyboardDefinitionStatusCommand::new(platform.clone()),
        ));
        registry.register(Arc::new(
            crate::organizations::FetchOrganizationMembersCommand::new(platform.clone()),
        ));
        registry.register(Arc::new(
            crate::firmware::CreateFirmwareBuildingTaskCommand::new(platform),
        ));
        registry
    }

    pub fn register(&mut self, command: Arc<dyn Command>) {
        self.commands.insert(command.name(), command);
    }

    /// Execute the named command. An unknown name is a boundary error, not a
    /// structured `Reply::Failure`.
    pub async fn dispatch(
        &self,
        name: &str,
        input: &RawInput,
        ctx: &ExecutionContext,
    ) -> Result<Reply, PipelineError> {
        let command = self
            .commands
            .get(name)
            .ok_or_else(|| PipelineError::UnknownCommand(name.to_string()))?;
        execute(command.as_ref(), input, ctx).await
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
