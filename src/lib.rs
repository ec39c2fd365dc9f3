//! School Assets workflow library
//!
//! Derived-status inventory workflow for a school administration dashboard:
//! stock severity classification, the purchase and access request
//! lifecycles, and the notification side channel. Persistence and account
//! management are external collaborators reached through [`db::DocumentStore`]
//! and [`auth::AccountProvider`].
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod clock;
pub mod commands;
pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod models;
pub mod notifications;
pub mod repositories;
pub mod services;

use std::sync::Arc;

use crate::auth::{AccountProvider, InMemoryAccounts};
use crate::clock::{Clock, SystemClock};
use crate::config::WorkflowConfig;
use crate::db::{DocumentStore, InMemoryStore};
use crate::errors::CollaboratorError;
use crate::notifications::NotificationRelay;
use crate::repositories::{Record, Repository};

pub use crate::errors::ServiceError;
pub use crate::services::stock_status::{classify, StockTier};
pub use crate::services::WorkflowServices;

/// Collaborators and policy shared by every command.
pub struct WorkflowContext {
    pub store: Arc<dyn DocumentStore>,
    pub accounts: Arc<dyn AccountProvider>,
    pub clock: Arc<dyn Clock>,
    pub notifications: Arc<NotificationRelay>,
    pub config: WorkflowConfig,
}

impl WorkflowContext {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        accounts: Arc<dyn AccountProvider>,
        clock: Arc<dyn Clock>,
        config: WorkflowConfig,
    ) -> Self {
        let notifications = Arc::new(NotificationRelay::new(
            store.clone(),
            clock.clone(),
            config.notification_limit,
        ));
        Self {
            store,
            accounts,
            clock,
            notifications,
            config,
        }
    }

    /// Context backed by in-process collaborators with the default accounts
    /// seeded.
    pub fn in_memory(config: WorkflowConfig) -> Result<Self, CollaboratorError> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let accounts = InMemoryAccounts::with_default_users(clock.clone())?;
        Ok(Self::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(accounts),
            clock,
            config,
        ))
    }

    pub fn repository<T: Record>(&self) -> Repository<T> {
        Repository::new(self.store.clone())
    }
}
