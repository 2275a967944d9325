//! Document store boundary.
//!
//! The production deployment fronts a hosted document database; the pipeline
//! only depends on this trait. The in-memory implementation backs tests and
//! local development.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use kbdhub_core::{
    BuildTask, DefinitionId, DefinitionStatus, KeyboardDefinition, Organization, OrganizationId,
    TaskId,
};

use crate::error::PlatformError;

/// Read/query/update access to the document collections the commands use.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read a keyboard definition by id.
    async fn definition(
        &self,
        id: &DefinitionId,
    ) -> Result<Option<KeyboardDefinition>, PlatformError>;

    /// All definitions with the given status, newest `updated_at` first.
    async fn definitions_by_status(
        &self,
        status: DefinitionStatus,
    ) -> Result<Vec<KeyboardDefinition>, PlatformError>;

    /// Apply a review decision to an existing definition.
    ///
    /// The definition must exist; callers check existence first (read-then-act,
    /// no atomicity guarantee).
    async fn update_definition_review(
        &self,
        id: &DefinitionId,
        status: DefinitionStatus,
        reject_reason: Option<String>,
        updated_at: DateTime<Utc>,
    ) -> Result<(), PlatformError>;

    /// Read an organization profile by id.
    async fn organization(
        &self,
        id: &OrganizationId,
    ) -> Result<Option<Organization>, PlatformError>;

    /// Read a firmware build task by id.
    async fn build_task(&self, id: &TaskId) -> Result<Option<BuildTask>, PlatformError>;
}

/// In-memory document store.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    definitions: RwLock<HashMap<DefinitionId, KeyboardDefinition>>,
    organizations: RwLock<HashMap<OrganizationId, Organization>>,
    tasks: RwLock<HashMap<TaskId, BuildTask>>,
}

fn poisoned(_: impl core::fmt::Debug) -> PlatformError {
    PlatformError::Store("lock poisoned".to_string())
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_definition(&self, definition: KeyboardDefinition) {
        self.definitions
            .write()
            .expect("lock poisoned")
            .insert(definition.id.clone(), definition);
    }

    pub fn insert_organization(&self, organization: Organization) {
        self.organizations
            .write()
            .expect("lock poisoned")
            .insert(organization.id.clone(), organization);
    }

    pub fn insert_build_task(&self, task: BuildTask) {
        self.tasks
            .write()
            .expect("lock poisoned")
            .insert(task.id.clone(), task);
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn definition(
        &self,
        id: &DefinitionId,
    ) -> Result<Option<KeyboardDefinition>, PlatformError> {
        let definitions = self.definitions.read().map_err(poisoned)?;
        Ok(definitions.get(id).cloned())
    }

    async fn definitions_by_status(
        &self,
        status: DefinitionStatus,
    ) -> Result<Vec<KeyboardDefinition>, PlatformError> {
        let definitions = self.definitions.read().map_err(poisoned)?;
        let mut matched: Vec<KeyboardDefinition> = definitions
            .values()
            .filter(|d| d.status == status)
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(matched)
    }

    async fn update_definition_review(
        &self,
        id: &DefinitionId,
        status: DefinitionStatus,
        reject_reason: Option<String>,
        updated_at: DateTime<Utc>,
    ) -> Result<(), PlatformError> {
        let mut definitions = self.definitions.write().map_err(poisoned)?;
        let definition = definitions
            .get_mut(id)
            .ok_or_else(|| PlatformError::Store(format!("no such definition: {id}")))?;
        definition.status = status;
        definition.reject_reason = reject_reason;
        definition.updated_at = updated_at;
        tracing::debug!(definition = id.as_str(), status = status.as_str(), "definition updated");
        Ok(())
    }

    async fn organization(
        &self,
        id: &OrganizationId,
    ) -> Result<Option<Organization>, PlatformError> {
        let organizations = self.organizations.read().map_err(poisoned)?;
        Ok(organizations.get(id).cloned())
    }

    async fn build_task(&self, id: &TaskId) -> Result<Option<BuildTask>, PlatformError> {
        let tasks = self.tasks.read().map_err(poisoned)?;
        Ok(tasks.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use kbdhub_core::Uid;

    fn definition(id: &str, status: DefinitionStatus, updated_secs: i64) -> KeyboardDefinition {
        let at = Utc.timestamp_opt(updated_secs, 0).unwrap();
        KeyboardDefinition {
            id: DefinitionId::new(id),
            author_uid: Uid::new("author"),
            name: format!("kbd-{id}"),
            vendor_id: 0xfeed,
            product_id: 0x6060,
            product_name: "prod".to_string(),
            status,
            json: "{}".to_string(),
            reject_reason: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[tokio::test]
    async fn query_filters_by_status_and_orders_newest_first() {
        let store = InMemoryDocumentStore::new();
        store.insert_definition(definition("a", DefinitionStatus::Approved, 100));
        store.insert_definition(definition("b", DefinitionStatus::Draft, 300));
        store.insert_definition(definition("c", DefinitionStatus::Approved, 200));

        let approved = store
            .definitions_by_status(DefinitionStatus::Approved)
            .await
            .unwrap();
        let ids: Vec<&str> = approved.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a"]);
    }

    #[tokio::test]
    async fn review_update_rewrites_status_and_reason() {
        let store = InMemoryDocumentStore::new();
        store.insert_definition(definition("a", DefinitionStatus::InReview, 100));

        let now = Utc.timestamp_opt(500, 0).unwrap();
        store
            .update_definition_review(
                &DefinitionId::new("a"),
                DefinitionStatus::Rejected,
                Some("bad layout".to_string()),
                now,
            )
            .await
            .unwrap();

        let stored = store.definition(&DefinitionId::new("a")).await.unwrap().unwrap();
        assert_eq!(stored.status, DefinitionStatus::Rejected);
        assert_eq!(stored.reject_reason.as_deref(), Some("bad layout"));
        assert_eq!(stored.updated_at, now);
    }
}
