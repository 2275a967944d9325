//! Organization profile model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{OrganizationId, Uid};

/// An organization profile document.
///
/// `members` is the authorization boundary: a uid must appear here for the
/// caller to act on behalf of the organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    pub description: String,
    pub icon_image_url: String,
    pub website_url: String,
    pub contact_email_address: String,
    pub contact_person_name: String,
    pub contact_tel: String,
    pub contact_address: String,
    pub members: Vec<Uid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    pub fn is_member(&self, uid: &Uid) -> bool {
        self.members.contains(uid)
    }
}
