//! Domain services: explicit handles built once at startup and shared by
//! request handlers.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument};

use accountsys_core::{AccountId, DomainError, Entity, UserId};

use crate::account::{Account, NewAccount};
use crate::ports::{AccountRepository, RepositoryError, UserRepository};
use crate::user::{User, UserProfile};

/// Failure of a service operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            // The store caught an orphan insert the service-level lookup missed.
            RepositoryError::MissingOwner(id) => Self::Domain(DomainError::user_not_found(id)),
            other => Self::Repository(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// User creation, lookup, and association removal.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    accounts: Arc<dyn AccountRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, accounts: Arc<dyn AccountRepository>) -> Self {
        Self { users, accounts }
    }

    /// Persist a validated profile. No duplicate detection.
    #[instrument(skip_all, err)]
    pub async fn create_user(&self, profile: UserProfile) -> ServiceResult<User> {
        let user = self.users.save(profile).await?;
        info!(user_id = %user.id(), "user created");
        Ok(user)
    }

    /// Load a user or fail with `UserNotFound`. Never returns an absence marker.
    #[instrument(skip_all, fields(user_id = %id), err)]
    pub async fn get_user(&self, id: UserId) -> ServiceResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::user_not_found(id).into())
    }

    #[instrument(skip_all, err)]
    pub async fn list_users(&self) -> ServiceResult<Vec<User>> {
        Ok(self.users.find_all().await?)
    }

    /// Remove an account from its owner and hard delete it.
    ///
    /// Checks run in a fixed order: user, then account, then membership. The
    /// unlink and the delete are two separate steps with no transaction around
    /// them.
    #[instrument(skip_all, fields(user_id = %user_id, account_id = %account_id), err)]
    pub async fn remove_account(&self, user_id: UserId, account_id: AccountId) -> ServiceResult<()> {
        let mut user = self.get_user(user_id).await?;

        let account = self
            .accounts
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| DomainError::account_missing(account_id))?;

        if !user.owns(&account) {
            return Err(DomainError::account_not_owned(user_id).into());
        }

        user.unlink_account(account.id());
        self.accounts.delete_by_id(account.id()).await?;

        info!(remaining = user.account_ids().len(), "account removed from user");
        Ok(())
    }
}

/// Account creation and lookup.
#[derive(Clone)]
pub struct AccountService {
    accounts: Arc<dyn AccountRepository>,
    users: Arc<dyn UserRepository>,
}

impl AccountService {
    pub fn new(accounts: Arc<dyn AccountRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { accounts, users }
    }

    /// Create an account owned by `request.owner`.
    ///
    /// Fails with `UserNotFound` (and persists nothing) if the owner is unknown.
    #[instrument(skip_all, fields(user_id = %request.owner), err)]
    pub async fn create_account(&self, request: NewAccount) -> ServiceResult<Account> {
        if self.users.find_by_id(request.owner).await?.is_none() {
            return Err(DomainError::user_not_found(request.owner).into());
        }

        let account = self.accounts.save(request).await?;
        info!(account_id = %account.id(), "account created");
        Ok(account)
    }

    /// Absence is `Ok(None)`, not an error.
    #[instrument(skip_all, fields(account_id = %id), err)]
    pub async fn get_account(&self, id: AccountId) -> ServiceResult<Option<Account>> {
        Ok(self.accounts.find_by_id(id).await?)
    }

    #[instrument(skip_all, err)]
    pub async fn list_accounts(&self) -> ServiceResult<Vec<Account>> {
        Ok(self.accounts.find_all().await?)
    }
}
