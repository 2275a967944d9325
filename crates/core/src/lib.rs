//! `kbdhub-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod definition;
pub mod id;
pub mod organization;
pub mod task;

pub use definition::{DefinitionStatus, KeyboardDefinition};
pub use id::{DefinitionId, OrganizationId, TaskId, Uid};
pub use organization::Organization;
pub use task::BuildTask;
