//! Persistence ports.
//!
//! Adapters live in `accountsys-infra`. The store owns id assignment and the
//! owner index (user id → set of account ids); entities never hold references
//! to each other.

use async_trait::async_trait;
use thiserror::Error;

use accountsys_core::{AccountId, UserId};

use crate::account::{Account, NewAccount};
use crate::user::{User, UserProfile};

/// Infrastructure failure reported by a repository adapter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Store-level referential integrity check: the owner row does not exist.
    #[error("owner user {0} does not exist")]
    MissingOwner(UserId),

    /// Anything else the backend reported (connection, SQL, poisoned lock...).
    #[error("{operation} failed: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },
}

impl RepositoryError {
    pub fn backend(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Backend {
            operation,
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user; the returned value carries the assigned id.
    async fn save(&self, profile: UserProfile) -> Result<User, RepositoryError>;

    /// Load a user together with its current account set.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    async fn find_all(&self) -> Result<Vec<User>, RepositoryError>;
}

#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Persist a new account and index it under its owner.
    ///
    /// Fails with [`RepositoryError::MissingOwner`] if the owner is unknown.
    async fn save(&self, account: NewAccount) -> Result<Account, RepositoryError>;

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError>;

    async fn find_all(&self) -> Result<Vec<Account>, RepositoryError>;

    /// Hard delete. Deleting an unknown id is a no-op.
    async fn delete_by_id(&self, id: AccountId) -> Result<(), RepositoryError>;
}
