use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use accountsys_accounts::{
    Account, AccountRepository, NewAccount, RepositoryError, User, UserProfile, UserRepository,
};
use accountsys_core::{AccountId, Entity, UserId};

#[derive(Debug, Default)]
struct Tables {
    last_user_id: i32,
    last_account_id: i32,
    users: BTreeMap<UserId, UserProfile>,
    accounts: BTreeMap<AccountId, Account>,
    /// Owner index: user id → ids of the accounts it owns.
    owned: HashMap<UserId, BTreeSet<AccountId>>,
}

impl Tables {
    fn user(&self, id: UserId) -> Option<User> {
        let profile = self.users.get(&id)?;
        let accounts = self.owned.get(&id).into_iter().flatten().copied();
        Some(User::new(id, profile.clone(), accounts))
    }
}

/// In-memory store for tests/dev.
///
/// Ids come from per-table sequences starting at 1, like identity columns.
/// A single lock covers every table, so each operation is atomic on its own.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self, operation: &'static str) -> Result<RwLockReadGuard<'_, Tables>, RepositoryError> {
        self.tables
            .read()
            .map_err(|_| RepositoryError::backend(operation, "lock poisoned"))
    }

    fn write(&self, operation: &'static str) -> Result<RwLockWriteGuard<'_, Tables>, RepositoryError> {
        self.tables
            .write()
            .map_err(|_| RepositoryError::backend(operation, "lock poisoned"))
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn save(&self, profile: UserProfile) -> Result<User, RepositoryError> {
        let mut tables = self.write("save_user")?;
        tables.last_user_id += 1;
        let id = UserId::new(tables.last_user_id);
        tables.users.insert(id, profile.clone());
        Ok(User::new(id, profile, []))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.read("find_user")?.user(id))
    }

    async fn find_all(&self) -> Result<Vec<User>, RepositoryError> {
        let tables = self.read("list_users")?;
        Ok(tables.users.keys().filter_map(|id| tables.user(*id)).collect())
    }
}

#[async_trait]
impl AccountRepository for InMemoryStore {
    async fn save(&self, account: NewAccount) -> Result<Account, RepositoryError> {
        let mut tables = self.write("save_account")?;
        if !tables.users.contains_key(&account.owner) {
            return Err(RepositoryError::MissingOwner(account.owner));
        }

        tables.last_account_id += 1;
        let account = account.into_account(AccountId::new(tables.last_account_id));
        tables
            .owned
            .entry(account.owner())
            .or_default()
            .insert(account.id());
        tables.accounts.insert(account.id(), account.clone());
        Ok(account)
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        Ok(self.read("find_account")?.accounts.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Account>, RepositoryError> {
        Ok(self.read("list_accounts")?.accounts.values().cloned().collect())
    }

    async fn delete_by_id(&self, id: AccountId) -> Result<(), RepositoryError> {
        let mut tables = self.write("delete_account")?;
        if let Some(account) = tables.accounts.remove(&id) {
            if let Some(set) = tables.owned.get_mut(&account.owner()) {
                set.remove(&id);
            }
        }
        Ok(())
    }
}
