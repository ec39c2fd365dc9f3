use std::sync::Arc;
use tracing::instrument;

use crate::{
    auth::Role,
    commands::access_requests::{
        ApproveAccessRequestCommand, RejectAccessRequestCommand, SubmitAccessRequestCommand,
    },
    commands::Command,
    errors::ServiceError,
    models::{AccessRequest, RequestStatus},
    WorkflowContext,
};

use super::{filter_newest_first, RequestSummary};

/// Service for the account access request lifecycle
#[derive(Clone)]
pub struct AccessService {
    ctx: Arc<WorkflowContext>,
}

impl AccessService {
    pub fn new(ctx: Arc<WorkflowContext>) -> Self {
        Self { ctx }
    }

    /// Records a new pending access request
    #[instrument(skip(self))]
    pub async fn submit(
        &self,
        command: SubmitAccessRequestCommand,
    ) -> Result<AccessRequest, ServiceError> {
        command.execute(self.ctx.clone()).await
    }

    /// Provisions the requester's account with `role` (or the configured
    /// default) and approves the request
    #[instrument(skip(self))]
    pub async fn approve(
        &self,
        request_id: &str,
        role: Option<Role>,
    ) -> Result<AccessRequest, ServiceError> {
        ApproveAccessRequestCommand {
            request_id: request_id.to_string(),
            role,
        }
        .execute(self.ctx.clone())
        .await
    }

    #[instrument(skip(self))]
    pub async fn reject(&self, request_id: &str) -> Result<AccessRequest, ServiceError> {
        RejectAccessRequestCommand {
            request_id: request_id.to_string(),
        }
        .execute(self.ctx.clone())
        .await
    }

    pub async fn get(&self, request_id: &str) -> Result<AccessRequest, ServiceError> {
        self.ctx
            .repository::<AccessRequest>()
            .find(request_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("access request {} not found", request_id)))
    }

    pub async fn list(
        &self,
        status: Option<RequestStatus>,
    ) -> Result<Vec<AccessRequest>, ServiceError> {
        let requests = self.ctx.repository::<AccessRequest>().all().await?;
        Ok(filter_newest_first(requests, status))
    }

    pub async fn summary(&self) -> Result<RequestSummary, ServiceError> {
        let requests = self.ctx.repository::<AccessRequest>().all().await?;
        Ok(RequestSummary::of(&requests))
    }
}
