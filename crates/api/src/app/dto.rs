use serde::Deserialize;

use accountsys_accounts::{Account, NewAccount, User, UserProfile};
use accountsys_core::{DomainResult, Entity, UserId};

// -------------------------
// Request DTOs
// -------------------------

/// `POST /users` body. Fields are optional so missing ones surface as field
/// errors instead of a deserialization failure.
#[derive(Debug, Default, Deserialize)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl CreateUserRequest {
    pub fn into_profile(self) -> DomainResult<UserProfile> {
        UserProfile::new(
            self.name.unwrap_or_default(),
            self.email.unwrap_or_default(),
        )
    }
}

/// `POST /addAccount` body. Name and currency are not validated.
///
/// A missing or null `userId` reads as id 0, which no user ever has, so the
/// request fails the owner lookup rather than deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddAccountRequest {
    pub user_id: Option<UserId>,
    pub account_name: Option<String>,
    pub account_currency: Option<String>,
}

impl AddAccountRequest {
    pub fn into_new_account(self) -> NewAccount {
        NewAccount {
            owner: self.user_id.unwrap_or_default(),
            account_name: self.account_name,
            account_currency: self.account_currency,
        }
    }
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn user_to_json(user: &User) -> serde_json::Value {
    serde_json::json!({
        "id": user.id(),
        "name": user.name(),
        "email": user.email(),
        "accounts": user.account_ids(),
    })
}

pub fn account_to_json(account: &Account) -> serde_json::Value {
    serde_json::json!({
        "id": account.id(),
        "accountName": account.account_name(),
        "accountCurrency": account.account_currency(),
        "userId": account.owner(),
    })
}
