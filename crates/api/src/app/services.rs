use std::sync::Arc;

use accountsys_accounts::{
    AccountRepository, AccountService, RepositoryError, UserRepository, UserService,
};
use accountsys_infra::{InMemoryStore, PostgresStore, StoreConfig};

/// Domain services shared by every handler.
///
/// Built once at startup; handlers receive it through an `Extension`.
#[derive(Clone)]
pub struct AppServices {
    pub users: UserService,
    pub accounts: AccountService,
}

impl AppServices {
    /// Wire both services to a single store handle.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: UserRepository + AccountRepository + 'static,
    {
        let users: Arc<dyn UserRepository> = store.clone();
        let accounts: Arc<dyn AccountRepository> = store;
        Self {
            users: UserService::new(users.clone(), accounts.clone()),
            accounts: AccountService::new(accounts, users),
        }
    }

    /// In-memory wiring (dev/test).
    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(InMemoryStore::new()))
    }
}

pub async fn build_services(config: &StoreConfig) -> Result<AppServices, RepositoryError> {
    match config {
        StoreConfig::InMemory => {
            tracing::warn!("using in-memory stores; data is lost on restart");
            Ok(AppServices::in_memory())
        }
        StoreConfig::Postgres {
            database_url,
            max_connections,
        } => {
            let store = PostgresStore::connect(database_url, *max_connections).await?;
            store.ensure_schema().await?;
            tracing::info!(max_connections, "using postgres stores");
            Ok(AppServices::from_store(Arc::new(store)))
        }
    }
}
