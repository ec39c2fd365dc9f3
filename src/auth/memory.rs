use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{AccountProvider, AuthMethod, Role, Session};
use crate::clock::Clock;
use crate::errors::CollaboratorError;

/// Password shared by the seeded default accounts.
pub const DEFAULT_PASSWORD: &str = "password";

const DEFAULT_USERS: [(&str, Role); 3] = [
    ("admin@school.com", Role::Admin),
    ("manager@school.com", Role::Manager),
    ("staff@school.com", Role::Staff),
];

#[derive(Debug, Clone)]
struct Account {
    id: String,
    email: String,
    role: Role,
    password_hash: Option<String>,
}

/// In-process account service. Accounts are keyed by lower-cased email.
///
/// Provisioned accounts carry no password; they sign in through the
/// federated provider once their email is linked with
/// [`InMemoryAccounts::link_provider_identity`].
pub struct InMemoryAccounts {
    accounts: DashMap<String, Account>,
    session: RwLock<Option<Session>>,
    provider_identity: RwLock<Option<String>>,
    clock: Arc<dyn Clock>,
    hasher: Argon2<'static>,
}

fn account_key(email: &str) -> String {
    email.trim().to_lowercase()
}

fn invalid_credentials() -> CollaboratorError {
    CollaboratorError::Auth("Invalid email or password".to_string())
}

impl InMemoryAccounts {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        // Light parameters: this store backs tests and demos, not production logins.
        let params = Params::new(4096, 1, 1, None).unwrap_or_default();
        Self {
            accounts: DashMap::new(),
            session: RwLock::new(None),
            provider_identity: RwLock::new(None),
            clock,
            hasher: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    /// Seeds the admin, manager and staff accounts of a fresh installation.
    pub fn with_default_users(clock: Arc<dyn Clock>) -> Result<Self, CollaboratorError> {
        let accounts = Self::new(clock);
        for (email, role) in DEFAULT_USERS {
            accounts.register(email, DEFAULT_PASSWORD, role)?;
        }
        Ok(accounts)
    }

    /// Creates a password account.
    pub fn register(
        &self,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<String, CollaboratorError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .hasher
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| CollaboratorError::Auth(e.to_string()))?
            .to_string();
        self.insert_account(email, role, Some(hash))
    }

    /// Makes `email` the identity returned by the federated provider.
    pub fn link_provider_identity(&self, email: &str) {
        *self
            .provider_identity
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(account_key(email));
    }

    pub fn role_of(&self, email: &str) -> Option<Role> {
        self.accounts.get(&account_key(email)).map(|a| a.role)
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    fn insert_account(
        &self,
        email: &str,
        role: Role,
        password_hash: Option<String>,
    ) -> Result<String, CollaboratorError> {
        match self.accounts.entry(account_key(email)) {
            Entry::Occupied(_) => Err(CollaboratorError::Auth(format!(
                "An account already exists for {}",
                email.trim()
            ))),
            Entry::Vacant(slot) => {
                let id = Uuid::new_v4().to_string();
                slot.insert(Account {
                    id: id.clone(),
                    email: email.trim().to_string(),
                    role,
                    password_hash,
                });
                Ok(id)
            }
        }
    }

    fn start_session(&self, account: &Account, method: AuthMethod) -> Session {
        let session = Session {
            account_id: account.id.clone(),
            email: account.email.clone(),
            role: account.role,
            method,
            signed_in_at: self.clock.now(),
        };
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        session
    }
}

#[async_trait]
impl AccountProvider for InMemoryAccounts {
    #[instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, CollaboratorError> {
        let account = self
            .accounts
            .get(&account_key(email))
            .map(|a| a.value().clone())
            .ok_or_else(invalid_credentials)?;

        let stored = account.password_hash.as_deref().ok_or_else(|| {
            CollaboratorError::Auth(format!(
                "{} has no password; sign in with the linked provider",
                account.email
            ))
        })?;
        let parsed =
            PasswordHash::new(stored).map_err(|e| CollaboratorError::Auth(e.to_string()))?;

        if self
            .hasher
            .verify_password(password.as_bytes(), &parsed)
            .is_err()
        {
            warn!(email = %account.email, "Rejected sign-in");
            return Err(invalid_credentials());
        }

        info!(email = %account.email, role = %account.role, "Signed in");
        Ok(self.start_session(&account, AuthMethod::Password))
    }

    #[instrument(skip(self))]
    async fn sign_in_with_provider(&self, provider: &str) -> Result<Session, CollaboratorError> {
        let method = AuthMethod::from_str(provider)
            .ok()
            .filter(|m| *m != AuthMethod::Password)
            .ok_or_else(|| CollaboratorError::Auth(format!("Unsupported provider: {provider}")))?;

        let identity = self
            .provider_identity
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| CollaboratorError::Auth("Provider sign-in was cancelled".to_string()))?;

        let account = self
            .accounts
            .get(&identity)
            .map(|a| a.value().clone())
            .ok_or_else(|| {
                CollaboratorError::Auth(format!("No account exists for {identity}; request access"))
            })?;

        info!(email = %account.email, %method, "Signed in with provider");
        Ok(self.start_session(&account, method))
    }

    #[instrument(skip(self))]
    async fn provision_account(&self, email: &str, role: Role) -> Result<String, CollaboratorError> {
        if let Some(existing) = self.accounts.get(&account_key(email)) {
            if existing.password_hash.is_none() && existing.role == role {
                info!(account_id = %existing.id, %role, "Account already provisioned");
                return Ok(existing.id.clone());
            }
        }

        let id = self.insert_account(email, role, None)?;
        info!(account_id = %id, %role, "Account provisioned");
        Ok(id)
    }

    async fn current_session(&self) -> Option<Session> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn sign_out(&self) -> Result<(), CollaboratorError> {
        self.session
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        Ok(())
    }
}
