//! `kbdhub-platform` — external collaborators behind traits.
//!
//! Everything the command pipeline talks to (document store, identity
//! provider, task queue, token signer, webhook notifier) lives here as a
//! trait plus at least one implementation. Commands receive a [`Platform`]
//! bundle at construction; nothing reaches for process-wide singletons.

pub mod config;
pub mod error;
pub mod identity;
pub mod notifier;
pub mod queue;
pub mod signer;
pub mod store;

use std::sync::Arc;

pub use config::PlatformConfig;
pub use error::PlatformError;
pub use identity::{IdentityProvider, InMemoryIdentityProvider, UserProfile};
pub use notifier::{HttpNotifier, Notifier, RecordingNotifier};
pub use queue::{HttpCallbackTask, HttpMethod, RecordingTaskQueue, TaskQueue};
pub use signer::{JwtTokenSigner, RecordingTokenSigner, TokenSigner};
pub use store::{DocumentStore, InMemoryDocumentStore};

/// The full set of collaborators a command needs, injected at construction.
#[derive(Clone)]
pub struct Platform {
    pub store: Arc<dyn DocumentStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub queue: Arc<dyn TaskQueue>,
    pub signer: Arc<dyn TokenSigner>,
    pub notifier: Arc<dyn Notifier>,
    pub config: PlatformConfig,
}

impl Platform {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
        queue: Arc<dyn TaskQueue>,
        signer: Arc<dyn TokenSigner>,
        notifier: Arc<dyn Notifier>,
        config: PlatformConfig,
    ) -> Self {
        Self {
            store,
            identity,
            queue,
            signer,
            notifier,
            config,
        }
    }
}
