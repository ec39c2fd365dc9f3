use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use validator::Validate;

use crate::{
    auth::Role,
    commands::{load_pending, Command},
    errors::ServiceError,
    metrics::{record_failure, REQUEST_APPROVALS},
    models::{AccessRequest, NotificationCategory, RequestStatus, Reviewable},
    notifications::NewNotification,
    WorkflowContext,
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApproveAccessRequestCommand {
    #[validate(length(min = 1))]
    pub request_id: String,
    /// Role to grant. Falls back to the configured default when absent,
    /// unless explicit roles are required.
    pub role: Option<Role>,
}

fn failed(err: impl Into<ServiceError>) -> ServiceError {
    let err = err.into();
    if err.is_local() {
        warn!(error = %err, "Access approval refused");
    } else {
        error!(error = %err, "Access approval failed");
    }
    record_failure(AccessRequest::KIND, err)
}

impl ApproveAccessRequestCommand {
    fn resolve_role(&self, ctx: &WorkflowContext) -> Result<Role, ServiceError> {
        match self.role {
            Some(role) => Ok(role),
            None if ctx.config.require_explicit_role => Err(ServiceError::ValidationError(
                "A role must be chosen to approve an access request".to_string(),
            )),
            None => Ok(ctx.config.default_access_role),
        }
    }
}

#[async_trait]
impl Command for ApproveAccessRequestCommand {
    type Result = AccessRequest;

    #[instrument(skip(self, ctx), fields(request_id = %self.request_id, role = ?self.role))]
    async fn execute(&self, ctx: Arc<WorkflowContext>) -> Result<Self::Result, ServiceError> {
        self.validate().map_err(failed)?;
        let role = self.resolve_role(&ctx).map_err(failed)?;

        let requests = ctx.repository::<AccessRequest>();
        let mut request = load_pending(&requests, &self.request_id)
            .await
            .map_err(failed)?;

        let account_id = ctx
            .accounts
            .provision_account(&request.email, role)
            .await
            .map_err(failed)?;

        let now = ctx.clock.now();
        requests
            .patch(
                &request.id,
                json!({
                    "status": RequestStatus::Approved,
                    "granted_role": role,
                    "account_id": account_id,
                    "updated_at": now,
                }),
            )
            .await
            .map_err(failed)?;
        request.status = RequestStatus::Approved;
        request.granted_role = Some(role);
        request.account_id = Some(account_id);
        request.updated_at = Some(now);

        ctx.notifications
            .dismiss_correlated(&request.id)
            .await
            .map_err(failed)?;
        ctx.notifications
            .emit(NewNotification::new(
                "Access Approved",
                format!(
                    "{} ({}) was granted {} access",
                    request.name, request.email, role
                ),
                NotificationCategory::Info,
            ))
            .await
            .map_err(failed)?;

        REQUEST_APPROVALS
            .with_label_values(&[AccessRequest::KIND])
            .inc();
        info!(email = %request.email, %role, "Access request approved");
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AccountProvider, AuthMethod, Session};
    use crate::clock::ManualClock;
    use crate::commands::access_requests::SubmitAccessRequestCommand;
    use crate::config::WorkflowConfig;
    use crate::db::{Collection, InMemoryStore};
    use crate::errors::CollaboratorError;
    use assert_matches::assert_matches;
    use chrono::{Duration, TimeZone, Utc};
    use mockall::mock;

    mock! {
        pub Accounts {}

        #[async_trait]
        impl AccountProvider for Accounts {
            async fn sign_in(&self, email: &str, password: &str) -> Result<Session, CollaboratorError>;
            async fn sign_in_with_provider(&self, provider: &str) -> Result<Session, CollaboratorError>;
            async fn provision_account(&self, email: &str, role: Role) -> Result<String, CollaboratorError>;
            async fn current_session(&self) -> Option<Session>;
            async fn sign_out(&self) -> Result<(), CollaboratorError>;
        }
    }

    fn context(accounts: MockAccounts, config: WorkflowConfig) -> Arc<WorkflowContext> {
        let clock = Arc::new(ManualClock::with_step(
            Utc.with_ymd_and_hms(2024, 9, 2, 8, 0, 0).unwrap(),
            Duration::seconds(1),
        ));
        Arc::new(WorkflowContext::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(accounts),
            clock,
            config,
        ))
    }

    async fn submit(ctx: &Arc<WorkflowContext>) -> AccessRequest {
        SubmitAccessRequestCommand {
            name: "Jo Teacher".into(),
            email: "jo@school.com".into(),
            auth_method: AuthMethod::Google,
        }
        .execute(ctx.clone())
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn missing_role_defaults_to_least_privileged() {
        let mut accounts = MockAccounts::new();
        accounts
            .expect_provision_account()
            .withf(|email, role| email.eq_ignore_ascii_case("jo@school.com") && *role == Role::Staff)
            .times(1)
            .returning(|_, _| Ok("acct-1".to_string()));
        let ctx = context(accounts, WorkflowConfig::default());
        let request = submit(&ctx).await;

        let approved = ApproveAccessRequestCommand {
            request_id: request.id.clone(),
            role: None,
        }
        .execute(ctx.clone())
        .await
        .unwrap();

        assert_eq!(approved.status, RequestStatus::Approved);
        assert_eq!(approved.granted_role, Some(Role::Staff));
        assert_eq!(approved.account_id.as_deref(), Some("acct-1"));

        let events = ctx.notifications.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Access Approved");
        assert_eq!(events[0].category, NotificationCategory::Info);
    }

    #[tokio::test]
    async fn explicit_role_is_passed_through() {
        let mut accounts = MockAccounts::new();
        accounts
            .expect_provision_account()
            .withf(|_, role| *role == Role::Manager)
            .times(1)
            .returning(|_, _| Ok("acct-2".to_string()));
        let ctx = context(accounts, WorkflowConfig::default());
        let request = submit(&ctx).await;

        let approved = ApproveAccessRequestCommand {
            request_id: request.id,
            role: Some(Role::Manager),
        }
        .execute(ctx)
        .await
        .unwrap();
        assert_eq!(approved.granted_role, Some(Role::Manager));
    }

    #[tokio::test]
    async fn required_role_is_checked_before_any_call() {
        let mut accounts = MockAccounts::new();
        accounts.expect_provision_account().times(0);
        let config = WorkflowConfig {
            require_explicit_role: true,
            ..WorkflowConfig::default()
        };
        let ctx = context(accounts, config);
        let request = submit(&ctx).await;

        let result = ApproveAccessRequestCommand {
            request_id: request.id.clone(),
            role: None,
        }
        .execute(ctx.clone())
        .await;

        assert_matches!(result, Err(ServiceError::ValidationError(_)));
        let stored = ctx
            .repository::<AccessRequest>()
            .find(&request.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, RequestStatus::Pending);
    }

    #[tokio::test]
    async fn provisioning_failure_leaves_request_pending() {
        let mut accounts = MockAccounts::new();
        accounts
            .expect_provision_account()
            .times(1)
            .returning(|_, _| Err(CollaboratorError::QuotaExceeded("accounts".into())));
        let store = Arc::new(InMemoryStore::new());
        let ctx = Arc::new(WorkflowContext::new(
            store.clone(),
            Arc::new(accounts),
            Arc::new(ManualClock::new(Utc::now())),
            WorkflowConfig::default(),
        ));
        let request = submit(&ctx).await;

        let result = ApproveAccessRequestCommand {
            request_id: request.id.clone(),
            role: Some(Role::Staff),
        }
        .execute(ctx.clone())
        .await;

        assert_matches!(
            result,
            Err(ServiceError::Collaborator(CollaboratorError::QuotaExceeded(_)))
        );
        let stored = ctx
            .repository::<AccessRequest>()
            .find(&request.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, RequestStatus::Pending);
        assert!(stored.account_id.is_none());
        // the actionable prompt is still there
        assert_eq!(store.len(Collection::Notifications), 1);
    }

    #[tokio::test]
    async fn unknown_request_is_not_found() {
        let mut accounts = MockAccounts::new();
        accounts.expect_provision_account().times(0);
        let ctx = context(accounts, WorkflowConfig::default());

        let result = ApproveAccessRequestCommand {
            request_id: "missing".into(),
            role: Some(Role::Staff),
        }
        .execute(ctx)
        .await;
        assert_matches!(result, Err(ServiceError::NotFound(_)));
    }
}
