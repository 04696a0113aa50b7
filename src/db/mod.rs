#[cfg(test)]
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;

use crate::models::{
    character::Character,
    child::Child,
    feeling_log::{FeelingLog, NewFeelingLog},
    parent::{LinkedParent, Parent},
};

pub use postgres::PgStore;

// Constraint names from migrations/0001_init.sql. Both store implementations report these.
pub const PARENT_USERNAME_KEY: &str = "parents_parent_username_key";
pub const PARENT_EMAIL_KEY: &str = "parents_parent_email_key";
pub const PARENT_RESET_TOKEN_KEY: &str = "parents_reset_token_key";
pub const CHILD_USERNAME_KEY: &str = "children_child_username_key";
pub const PARENT_CHILD_LINK_KEY: &str = "parent_child_link_pkey";

pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Run the migrations embedded from ./migrations/
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },
    #[error("foreign key constraint violated: {constraint}")]
    ForeignKeyViolation { constraint: String },
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// True when this is a uniqueness violation whose constraint name mentions `needle`.
    pub fn violates_unique(&self, needle: &str) -> bool {
        matches!(self, StoreError::UniqueViolation { constraint } if constraint.contains(needle))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Parameterized reads and writes against the credential store.
///
/// Each call is one statement committing on its own. The only multi-column write that
/// must be atomic, token consumption, is a single call.
#[async_trait]
pub trait Store: Send + Sync {
    async fn parent_username_exists(&self, username: &str) -> StoreResult<bool>;
    async fn parent_email_exists(&self, email: &str) -> StoreResult<bool>;
    async fn insert_parent(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> StoreResult<Parent>;
    async fn find_parent(&self, id: i32) -> StoreResult<Option<Parent>>;
    async fn find_parent_by_username(&self, username: &str) -> StoreResult<Option<Parent>>;
    async fn find_parent_by_email(&self, email: &str) -> StoreResult<Option<Parent>>;
    async fn find_parent_by_reset_token(&self, token: &str) -> StoreResult<Option<Parent>>;

    /// Overwrites any previous token on the row.
    async fn store_reset_token(
        &self,
        parent_id: i32,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<()>;

    /// Sets the new hash and clears token + expiry in one statement, provided the row
    /// still holds `token`. Returns false when no row matched.
    async fn consume_reset_token(
        &self,
        parent_id: i32,
        token: &str,
        password_hash: &str,
    ) -> StoreResult<bool>;

    async fn insert_child(&self, username: &str, age: Option<i32>) -> StoreResult<Child>;
    async fn find_child(&self, id: i32) -> StoreResult<Option<Child>>;
    async fn find_child_by_username(&self, username: &str) -> StoreResult<Option<Child>>;

    async fn link_exists(&self, parent_id: i32, child_id: i32) -> StoreResult<bool>;
    async fn insert_link(&self, parent_id: i32, child_id: i32) -> StoreResult<()>;
    async fn children_of_parent(&self, parent_id: i32) -> StoreResult<Vec<Child>>;
    async fn parents_of_child(&self, child_id: i32) -> StoreResult<Vec<LinkedParent>>;

    async fn list_characters(&self) -> StoreResult<Vec<Character>>;
    async fn character_name(&self, id: i32) -> StoreResult<Option<String>>;

    async fn insert_feeling_log(&self, log: &NewFeelingLog) -> StoreResult<FeelingLog>;

    /// Most recent first. `range` bounds are inclusive.
    async fn child_logs(
        &self,
        child_id: i32,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> StoreResult<Vec<FeelingLog>>;
}
