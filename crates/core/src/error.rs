//! Domain error model.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::id::{AccountId, UserId};

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (missing
/// records, invalid payloads). Storage failures belong to the service layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The referenced user has no persisted record.
    #[error("User not found with id: {0}")]
    UserNotFound(UserId),

    /// The referenced account is missing, or is not owned by the given user.
    #[error("{0}")]
    AccountNotFound(AccountNotFound),

    /// A creation payload failed field validation.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),
}

impl DomainError {
    pub fn user_not_found(id: UserId) -> Self {
        Self::UserNotFound(id)
    }

    pub fn account_missing(id: AccountId) -> Self {
        Self::AccountNotFound(AccountNotFound::Missing(id))
    }

    pub fn account_not_owned(owner: UserId) -> Self {
        Self::AccountNotFound(AccountNotFound::NotOwnedBy(owner))
    }

    /// Whether this error is one of the "no such record" kinds.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UserNotFound(_) | Self::AccountNotFound(_))
    }
}

/// Why an account lookup failed.
///
/// Both variants surface as the same error kind; only the message differs.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AccountNotFound {
    #[error("Account not found with id: {0}")]
    Missing(AccountId),

    #[error("Account not associated with the user with id: {0}")]
    NotOwnedBy(UserId),
}

/// Field name → violation message, as reported back to API callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation. The first message recorded for a field wins.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `Ok(())` when nothing was recorded, otherwise a validation error.
    pub fn into_result(self) -> DomainResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(self))
        }
    }
}

impl core::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}
