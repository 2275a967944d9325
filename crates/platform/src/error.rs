//! Infrastructure error model.

use thiserror::Error;

/// An unexpected collaborator failure.
///
/// These are *not* part of the command reply contract: a `PlatformError`
/// propagates out of the pipeline to the invocation boundary's generic
/// handler. Expected conditions (missing document, denied permission) are
/// values, never errors.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("document store error: {0}")]
    Store(String),

    #[error("identity provider error: {0}")]
    Identity(String),

    #[error("task queue error: {0}")]
    Queue(String),

    #[error("token signing error: {0}")]
    Signer(String),

    #[error("notification delivery error: {0}")]
    Notifier(String),
}
