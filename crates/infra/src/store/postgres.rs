//! Postgres-backed store implementation.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | RepositoryError | Scenario |
//! |------------|----------------------|-----------------|----------|
//! | Database (foreign key violation) | `23503` | `MissingOwner` | Account insert for a user that does not exist |
//! | Database (other) | Any other | `Backend` | Other database errors |
//! | PoolClosed | N/A | `Backend` | Connection pool was closed |
//! | Other | N/A | `Backend` | Network errors, connection failures, etc. |
//!
//! The owner index is the `accounts.user_id` column; a user's account set is
//! aggregated from it on every load.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::{info, instrument};

use accountsys_accounts::{
    Account, AccountRepository, NewAccount, RepositoryError, User, UserProfile, UserRepository,
};
use accountsys_core::{AccountId, UserId};

const SCHEMA: &str = include_str!("../../sql/schema.sql");

const SELECT_USERS: &str = r#"
    SELECT
        u.id,
        u.name,
        u.email,
        COALESCE(array_agg(a.id ORDER BY a.id) FILTER (WHERE a.id IS NOT NULL), '{}'::INTEGER[]) AS account_ids
    FROM users u
    LEFT JOIN accounts a ON a.user_id = u.id
"#;

/// Postgres-backed user/account store.
///
/// Uses the SQLx connection pool, which is `Send + Sync`; every method is a
/// single statement, so no explicit transactions are opened.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    /// Create a store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool against `database_url`.
    #[instrument(skip(database_url), err)]
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, RepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Apply the idempotent bootstrap schema (`CREATE ... IF NOT EXISTS`).
    #[instrument(skip_all, err)]
    pub async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        info!("database schema ready");
        Ok(())
    }
}

#[async_trait]
impl UserRepository for PostgresStore {
    #[instrument(skip_all, err)]
    async fn save(&self, profile: UserProfile) -> Result<User, RepositoryError> {
        let row = sqlx::query("INSERT INTO users (name, email) VALUES ($1, $2) RETURNING id")
            .bind(profile.name())
            .bind(profile.email())
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("save_user", e))?;

        let id: i32 = row
            .try_get("id")
            .map_err(|e| map_sqlx_error("save_user", e))?;
        Ok(User::new(UserId::new(id), profile, []))
    }

    #[instrument(skip_all, fields(user_id = %id), err)]
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let sql = format!("{SELECT_USERS} WHERE u.id = $1 GROUP BY u.id");
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user", e))?;

        row.map(|r| user_from_row(&r)).transpose()
    }

    #[instrument(skip_all, err)]
    async fn find_all(&self) -> Result<Vec<User>, RepositoryError> {
        let sql = format!("{SELECT_USERS} GROUP BY u.id ORDER BY u.id");
        let rows = sqlx::query(&sql)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_users", e))?;

        rows.iter().map(user_from_row).collect()
    }
}

#[async_trait]
impl AccountRepository for PostgresStore {
    #[instrument(skip_all, fields(user_id = %account.owner), err)]
    async fn save(&self, account: NewAccount) -> Result<Account, RepositoryError> {
        let owner = account.owner;
        let row = sqlx::query(
            r#"
            INSERT INTO accounts (account_name, account_currency, user_id)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&account.account_name)
        .bind(&account.account_currency)
        .bind(owner.get())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                RepositoryError::MissingOwner(owner)
            } else {
                map_sqlx_error("save_account", e)
            }
        })?;

        let id: i32 = row
            .try_get("id")
            .map_err(|e| map_sqlx_error("save_account", e))?;
        Ok(account.into_account(AccountId::new(id)))
    }

    #[instrument(skip_all, fields(account_id = %id), err)]
    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, account_name, account_currency, user_id FROM accounts WHERE id = $1",
        )
        .bind(id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_account", e))?;

        row.map(|r| account_from_row(&r)).transpose()
    }

    #[instrument(skip_all, err)]
    async fn find_all(&self) -> Result<Vec<Account>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, account_name, account_currency, user_id FROM accounts ORDER BY id",
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_accounts", e))?;

        rows.iter().map(account_from_row).collect()
    }

    #[instrument(skip_all, fields(account_id = %id), err)]
    async fn delete_by_id(&self, id: AccountId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_account", e))?;
        Ok(())
    }
}

fn user_from_row(row: &PgRow) -> Result<User, RepositoryError> {
    let decode = |e| map_sqlx_error("decode_user", e);
    let id: i32 = row.try_get("id").map_err(decode)?;
    let name: String = row.try_get("name").map_err(decode)?;
    let email: String = row.try_get("email").map_err(decode)?;
    let account_ids: Vec<i32> = row.try_get("account_ids").map_err(decode)?;

    // Rows written by this store always pass validation.
    let profile = UserProfile::new(name, email)
        .map_err(|e| RepositoryError::backend("decode_user", e.to_string()))?;

    Ok(User::new(
        UserId::new(id),
        profile,
        account_ids.into_iter().map(AccountId::new),
    ))
}

fn account_from_row(row: &PgRow) -> Result<Account, RepositoryError> {
    let decode = |e| map_sqlx_error("decode_account", e);
    let id: i32 = row.try_get("id").map_err(decode)?;
    let account_name: Option<String> = row.try_get("account_name").map_err(decode)?;
    let account_currency: Option<String> = row.try_get("account_currency").map_err(decode)?;
    let user_id: i32 = row.try_get("user_id").map_err(decode)?;

    let account = NewAccount {
        owner: UserId::new(user_id),
        account_name,
        account_currency,
    };
    Ok(account.into_account(AccountId::new(id)))
}

/// Map SQLx errors to `RepositoryError`.
fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Database(db_err) => RepositoryError::backend(
            operation,
            format!("database error: {}", db_err.message()),
        ),
        sqlx::Error::PoolClosed => RepositoryError::backend(operation, "connection pool closed"),
        other => RepositoryError::backend(operation, format!("sqlx error: {other}")),
    }
}

/// Check if an error is a foreign key violation.
fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == "23503";
        }
    }
    false
}
