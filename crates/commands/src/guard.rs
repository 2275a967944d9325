//! Guard chain: the checks every command passes before its body runs.
//!
//! Guards are declared per command as an explicit ordered slice, replacing
//! any implicit ordering, and evaluated strictly sequentially: a later guard
//! never runs once an earlier one fails, and is entitled to assume every
//! earlier guard passed. Guards read; they never mutate anything.
//!
//! Declared order follows one policy: authentication, then authorization
//! (administrator or organization membership), then input-shape validation.
//! An unauthenticated caller therefore never observes a validation error,
//! and no authorization I/O happens before identity is confirmed.

use kbdhub_platform::{DocumentStore, PlatformError};

use crate::context::ExecutionContext;
use crate::input::RawInput;
use crate::reply::ErrorCode;

/// A single pass/fail check over `(RawInput, ExecutionContext)`.
///
/// The membership variant also reads the organization document, the one
/// guard that performs I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// Fail `UNAUTHENTICATED` unless the context carries a principal.
    Authentication,
    /// Fail `PERMISSION_DENIED` unless the principal has the admin claim.
    /// Assumes `Authentication` already passed.
    Administrator,
    /// Fail `ORGANIZATION_NOT_FOUND` / `PERMISSION_DENIED` based on the
    /// membership set of the organization named by `field`.
    OrganizationMember { field: &'static str },
    /// Fail `INVALID_PARAMETER` naming the first absent-or-null field.
    RequiredFields(&'static [&'static str]),
    /// Fail `INVALID_PARAMETER` when a present field's value is outside its
    /// permitted literal set. Absent fields pass; presence is
    /// `RequiredFields`' concern.
    AllowedValues(&'static [(&'static str, &'static [&'static str])]),
}

/// Outcome of a single guard or a whole chain. Never partially succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Pass,
    Fail { code: ErrorCode, message: String },
}

impl GuardOutcome {
    fn fail(code: ErrorCode, message: impl Into<String>) -> Self {
        GuardOutcome::Fail {
            code,
            message: message.into(),
        }
    }
}

impl Guard {
    /// Evaluate this guard. Infrastructure failures propagate as errors;
    /// expected rejections come back as `GuardOutcome::Fail`.
    pub async fn check(
        &self,
        input: &RawInput,
        ctx: &ExecutionContext,
        store: &dyn DocumentStore,
    ) -> Result<GuardOutcome, PlatformError> {
        match *self {
            Guard::Authentication => Ok(check_authentication(ctx)),
            Guard::Administrator => Ok(check_administrator(ctx)),
            Guard::OrganizationMember { field } => {
                check_organization_member(field, input, ctx, store).await
            }
            Guard::RequiredFields(fields) => Ok(check_required_fields(fields, input)),
            Guard::AllowedValues(constraints) => Ok(check_allowed_values(constraints, input)),
        }
    }
}

fn check_authentication(ctx: &ExecutionContext) -> GuardOutcome {
    if ctx.principal().is_some() {
        GuardOutcome::Pass
    } else {
        GuardOutcome::fail(ErrorCode::Unauthenticated, "authentication required")
    }
}

fn check_administrator(ctx: &ExecutionContext) -> GuardOutcome {
    let is_admin = ctx.principal().is_some_and(|p| p.is_admin());
    if is_admin {
        GuardOutcome::Pass
    } else {
        GuardOutcome::fail(
            ErrorCode::PermissionDenied,
            "administrator permission required",
        )
    }
}

async fn check_organization_member(
    field: &str,
    input: &RawInput,
    ctx: &ExecutionContext,
    store: &dyn DocumentStore,
) -> Result<GuardOutcome, PlatformError> {
    let Some(organization_id) = input.str_field(field) else {
        return Ok(GuardOutcome::fail(
            ErrorCode::InvalidParameter,
            format!("{field} is required"),
        ));
    };

    let organization = store.organization(&organization_id.into()).await?;
    let Some(organization) = organization else {
        return Ok(GuardOutcome::fail(
            ErrorCode::OrganizationNotFound,
            format!("Organization not found: {organization_id}"),
        ));
    };

    let is_member = ctx
        .principal()
        .is_some_and(|p| organization.is_member(&p.uid));
    if is_member {
        Ok(GuardOutcome::Pass)
    } else {
        Ok(GuardOutcome::fail(
            ErrorCode::PermissionDenied,
            format!("not a member of organization {organization_id}"),
        ))
    }
}

fn check_required_fields(fields: &[&str], input: &RawInput) -> GuardOutcome {
    for &field in fields {
        if !input.has(field) {
            return GuardOutcome::fail(ErrorCode::InvalidParameter, format!("{field} is required"));
        }
    }
    GuardOutcome::Pass
}

fn check_allowed_values(
    constraints: &[(&str, &[&str])],
    input: &RawInput,
) -> GuardOutcome {
    for &(field, allowed) in constraints {
        let Some(value) = input.get(field) else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        let permitted = value.as_str().is_some_and(|s| allowed.contains(&s));
        if !permitted {
            return GuardOutcome::fail(
                ErrorCode::InvalidParameter,
                format!("invalid value for {field}: {value}"),
            );
        }
    }
    GuardOutcome::Pass
}

/// Evaluate a guard chain strictly in order, stopping at the first failure.
///
/// Short-circuit evaluation, not merely fail-fast reporting: a later guard is
/// never evaluated (and its I/O never issued) once an earlier one failed.
pub async fn run_guards(
    guards: &[Guard],
    input: &RawInput,
    ctx: &ExecutionContext,
    store: &dyn DocumentStore,
) -> Result<GuardOutcome, PlatformError> {
    for guard in guards {
        match guard.check(input, ctx, store).await? {
            GuardOutcome::Pass => {}
            fail @ GuardOutcome::Fail { .. } => return Ok(fail),
        }
    }
    Ok(GuardOutcome::Pass)
}
