use std::collections::BTreeSet;

use accountsys_core::{AccountId, DomainResult, Entity, FieldErrors, UserId};

use crate::account::Account;

const BLANK: &str = "must not be blank";
const MALFORMED_EMAIL: &str = "must be a well-formed email address";

/// Validated profile fields of a user, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    name: String,
    email: String,
}

impl UserProfile {
    /// Validate raw profile fields.
    ///
    /// All violations are collected so callers can report every bad field at
    /// once, keyed by the JSON field name.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        let email = email.into();

        let mut errors = FieldErrors::new();
        if name.trim().is_empty() {
            errors.add("name", BLANK);
        }
        if email.trim().is_empty() {
            errors.add("email", BLANK);
        } else if !is_well_formed_email(&email) {
            errors.add("email", MALFORMED_EMAIL);
        }
        errors.into_result()?;

        Ok(Self { name, email })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

fn is_well_formed_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

/// Entity: User (account owner).
///
/// The account set is a snapshot of the owner index kept by the store at the
/// time the user was loaded; it is not a live view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    name: String,
    email: String,
    accounts: BTreeSet<AccountId>,
}

impl User {
    /// Rehydrate a stored user.
    pub fn new(
        id: UserId,
        profile: UserProfile,
        accounts: impl IntoIterator<Item = AccountId>,
    ) -> Self {
        Self {
            id,
            name: profile.name,
            email: profile.email,
            accounts: accounts.into_iter().collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn account_ids(&self) -> &BTreeSet<AccountId> {
        &self.accounts
    }

    /// Whether `account` is in this user's current account set.
    pub fn owns(&self, account: &Account) -> bool {
        self.accounts.contains(&account.id())
    }

    /// Drop an account from the in-memory association set.
    ///
    /// Returns whether the account was present.
    pub fn unlink_account(&mut self, account_id: AccountId) -> bool {
        self.accounts.remove(&account_id)
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> Self::Id {
        self.id
    }
}
