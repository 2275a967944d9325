//! Identity provider boundary.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use kbdhub_core::Uid;

use crate::error::PlatformError;

/// Profile attributes resolved from a uid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub uid: Uid,
    pub email: String,
    pub display_name: String,
}

/// Resolves uids to user profiles.
///
/// A missing record is an infrastructure error, not an expected condition:
/// every uid the pipeline sees came from the identity provider in the first
/// place.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn profile(&self, uid: &Uid) -> Result<UserProfile, PlatformError>;
}

/// In-memory identity provider for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryIdentityProvider {
    profiles: RwLock<HashMap<Uid, UserProfile>>,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, profile: UserProfile) {
        self.profiles
            .write()
            .expect("lock poisoned")
            .insert(profile.uid.clone(), profile);
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn profile(&self, uid: &Uid) -> Result<UserProfile, PlatformError> {
        let profiles = self
            .profiles
            .read()
            .map_err(|_| PlatformError::Identity("lock poisoned".to_string()))?;
        profiles
            .get(uid)
            .cloned()
            .ok_or_else(|| PlatformError::Identity(format!("no user record for uid {uid}")))
    }
}
