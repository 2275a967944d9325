//! Organization commands.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use kbdhub_core::{OrganizationId, Uid};
use kbdhub_platform::Platform;

use crate::command::{Command, PipelineError, parse_request};
use crate::context::ExecutionContext;
use crate::guard::Guard;
use crate::input::RawInput;
use crate::reply::{ErrorCode, Reply};

/// List the members of an organization the caller belongs to.
pub struct FetchOrganizationMembersCommand {
    platform: Platform,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FetchMembersRequest {
    organization_id: OrganizationId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OrganizationMember {
    uid: Uid,
    email: String,
    display_name: String,
    /// Marks the entry matching the caller.
    me: bool,
}

#[derive(Debug, Serialize)]
struct FetchMembersPayload {
    members: Vec<OrganizationMember>,
}

impl FetchOrganizationMembersCommand {
    pub const NAME: &'static str = "fetchOrganizationMembers";

    // RequiredFields runs before the membership guard so the guard can rely
    // on `organizationId` being present.
    const GUARDS: &'static [Guard] = &[
        Guard::Authentication,
        Guard::RequiredFields(&["organizationId"]),
        Guard::OrganizationMember {
            field: "organizationId",
        },
    ];

    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }
}

#[async_trait]
impl Command for FetchOrganizationMembersCommand {
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
        let request: FetchMembersRequest = match parse_request(input) {
            Ok(request) => request,
            Err(reply) => return Ok(reply),
        };
        let Some(principal) = ctx.principal() else {
            return Ok(Reply::failure(
                ErrorCode::Unauthenticated,
                "authentication required",
            ));
        };

        // Re-read after the membership guard; the window between the two
        // reads is a stale-read window, not a transaction.
        let organization = self
            .platform
            .store
            .organization(&request.organization_id)
            .await?;
        let Some(organization) = organization else {
            return Ok(Reply::failure(
                ErrorCode::OrganizationNotFound,
                format!("Organization not found: {}", request.organization_id),
            ));
        };

        let mut members = Vec::with_capacity(organization.members.len());
        for member_uid in &organization.members {
            let profile = self.platform.identity.profile(member_uid).await?;
            members.push(OrganizationMember {
                uid: member_uid.clone(),
                email: profile.email,
                display_name: profile.display_name,
                me: *member_uid == principal.uid,
            });
        }

        Ok(Reply::with_payload(&FetchMembersPayload { members })?)
    }
}
