use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthMethod, Role};
use crate::db::Collection;
use crate::repositories::Record;

use super::{RequestStatus, Reviewable};

/// Request from a prospective user for an account. Approval provisions the
/// account with the granted role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessRequest {
    #[serde(default, skip_serializing)]
    pub id: String,
    pub name: String,
    pub email: String,
    pub auth_method: AuthMethod,
    pub status: RequestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granted_role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl AccessRequest {
    pub fn is_for(&self, email: &str) -> bool {
        self.email.trim().eq_ignore_ascii_case(email.trim())
    }
}

impl Record for AccessRequest {
    const COLLECTION: Collection = Collection::AccessRequests;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Reviewable for AccessRequest {
    const KIND: &'static str = "access";

    fn status(&self) -> RequestStatus {
        self.status
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
