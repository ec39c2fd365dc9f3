use async_trait::async_trait;
use std::sync::Arc;

use crate::{errors::ServiceError, models::Reviewable, repositories::Repository, WorkflowContext};

/// Command trait for implementing the Command Pattern
///
/// Each mutating workflow operation is a value that validates its own input
/// and executes against the shared [`WorkflowContext`].
#[async_trait]
pub trait Command: Send + Sync {
    /// The return type of the command when executed successfully
    type Result;

    /// Execute the command. Collaborator failures are returned unchanged and
    /// never retried.
    async fn execute(&self, ctx: Arc<WorkflowContext>) -> Result<Self::Result, ServiceError>;
}

pub mod access_requests;
pub mod inventory_items;
pub mod purchase_requests;

/// Loads a request that may still transition.
///
/// `NotFound` when no request has this id, `InvalidState` when it exists but
/// is already approved or rejected. Nothing is written in either case.
pub(crate) async fn load_pending<T: Reviewable>(
    repo: &Repository<T>,
    id: &str,
) -> Result<T, ServiceError> {
    let request = repo.find(id).await?.ok_or_else(|| {
        ServiceError::NotFound(format!("{} request {} not found", T::KIND, id))
    })?;

    if request.status().is_terminal() {
        return Err(ServiceError::InvalidState(format!(
            "{} request {} is already {}",
            T::KIND,
            id,
            request.status()
        )));
    }

    Ok(request)
}
