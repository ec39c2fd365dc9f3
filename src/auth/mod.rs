/*!
 * # Authentication and account collaborator
 *
 * Sign-in, session lookup and account provisioning are owned by an external
 * identity service. This module defines the narrow contract the workflow
 * calls through, the roles it hands out and an in-memory implementation
 * used by tests and the demo binary.
 */

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::errors::CollaboratorError;

pub mod memory;
pub mod rbac;

pub use memory::InMemoryAccounts;

/// Roles that can be granted to an account, most privileged first.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    Admin,
    Manager,
    Staff,
}

impl Role {
    pub fn least_privileged() -> Self {
        Role::Staff
    }
}

/// How a requester intends to sign in once their access is approved.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AuthMethod {
    Password,
    Google,
}

/// An authenticated session as reported by the identity service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub account_id: String,
    pub email: String,
    pub role: Role,
    pub method: AuthMethod,
    pub signed_in_at: DateTime<Utc>,
}

/// Contract of the external authentication/account service.
#[async_trait]
pub trait AccountProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, CollaboratorError>;

    /// Federated sign-in, e.g. `"google"`.
    async fn sign_in_with_provider(&self, provider: &str) -> Result<Session, CollaboratorError>;

    /// Creates an account bound to `email` with `role` and returns its id.
    ///
    /// Provisioning an email that already holds a provisioned account with
    /// the same role returns that account's id, so an approval retried after
    /// a failed status write can complete. Any other existing account is an
    /// error.
    async fn provision_account(&self, email: &str, role: Role) -> Result<String, CollaboratorError>;

    async fn current_session(&self) -> Option<Session>;

    async fn sign_out(&self) -> Result<(), CollaboratorError>;
}
