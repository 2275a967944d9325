//! `kbdhub-commands` — the command pipeline.
//!
//! Every remotely-invocable operation is a [`Command`]: an ordered guard
//! chain (authentication, authorization, input validation) plus a body. The
//! generic [`execute`] runner evaluates the chain strictly in declared order,
//! short-circuits on the first failing guard, and only then awaits the body.
//! All commands produce the uniform [`Reply`] contract.

pub mod admin;
pub mod command;
pub mod context;
pub mod firmware;
pub mod guard;
pub mod input;
pub mod organizations;
pub mod reply;

pub use admin::{FetchKeyboardDefinitionListByStatusCommand, UpdateKeyboardDefinitionStatusCommand};
pub use command::{Command, CommandRegistry, PipelineError, execute};
pub use context::ExecutionContext;
pub use firmware::CreateFirmwareBuildingTaskCommand;
pub use guard::{Guard, GuardOutcome, run_guards};
pub use input::RawInput;
pub use organizations::FetchOrganizationMembersCommand;
pub use reply::{ErrorCode, Reply};
