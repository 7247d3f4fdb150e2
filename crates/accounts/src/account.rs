use accountsys_core::{AccountId, Entity, UserId};

/// An account that has not been persisted yet (no id assigned).
///
/// Name and currency are free-form and may be absent; duplicates are allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub owner: UserId,
    pub account_name: Option<String>,
    pub account_currency: Option<String>,
}

impl NewAccount {
    pub fn new(
        owner: UserId,
        account_name: impl Into<String>,
        account_currency: impl Into<String>,
    ) -> Self {
        Self {
            owner,
            account_name: Some(account_name.into()),
            account_currency: Some(account_currency.into()),
        }
    }

    /// Attach the store-assigned id.
    pub fn into_account(self, id: AccountId) -> Account {
        Account {
            id,
            account_name: self.account_name,
            account_currency: self.account_currency,
            user_id: self.owner,
        }
    }
}

/// Entity: Account.
///
/// The owning user is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    id: AccountId,
    account_name: Option<String>,
    account_currency: Option<String>,
    user_id: UserId,
}

impl Account {
    pub fn account_name(&self) -> Option<&str> {
        self.account_name.as_deref()
    }

    pub fn account_currency(&self) -> Option<&str> {
        self.account_currency.as_deref()
    }

    pub fn owner(&self) -> UserId {
        self.user_id
    }
}

impl Entity for Account {
    type Id = AccountId;

    fn id(&self) -> Self::Id {
        self.id
    }
}
