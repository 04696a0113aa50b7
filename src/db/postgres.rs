use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{error::ErrorKind, PgPool};

use super::{Store, StoreError, StoreResult};
use crate::models::{
    character::Character,
    child::Child,
    feeling_log::{FeelingLog, NewFeelingLog},
    parent::{LinkedParent, Parent},
};

const PARENT_COLUMNS: &str = "parent_id AS id, parent_username AS username, parent_email AS email,
     hashed_password AS password_hash, reset_token, reset_token_expiry";

const CHILD_COLUMNS: &str = "child_id AS id, child_username AS username, child_age AS age";

const LOG_COLUMNS: &str = "log_id AS id, child_id, character_id, character_name,
     feeling_level AS level, logging_time AS logged_at, investigation";

/// Turn constraint failures into structured variants; everything else passes through.
fn classify(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        let constraint = db_err.constraint().unwrap_or_default().to_string();
        match db_err.kind() {
            ErrorKind::UniqueViolation => return StoreError::UniqueViolation { constraint },
            ErrorKind::ForeignKeyViolation => {
                return StoreError::ForeignKeyViolation { constraint }
            }
            _ => {}
        }
    }
    StoreError::Database(e)
}

/// `Store` backed by the shared Postgres pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_parent_where(
        &self,
        column: &str,
        value: &str,
    ) -> StoreResult<Option<Parent>> {
        let parent = sqlx::query_as::<_, Parent>(&format!(
            "SELECT {PARENT_COLUMNS} FROM parents WHERE {column} = $1"
        ))
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;
        Ok(parent)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn parent_username_exists(&self, username: &str) -> StoreResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM parents WHERE parent_username = $1)",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn parent_email_exists(&self, email: &str) -> StoreResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM parents WHERE parent_email = $1)",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn insert_parent(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> StoreResult<Parent> {
        sqlx::query_as::<_, Parent>(&format!(
            "INSERT INTO parents (parent_username, parent_email, hashed_password)
             VALUES ($1, $2, $3)
             RETURNING {PARENT_COLUMNS}"
        ))
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    async fn find_parent(&self, id: i32) -> StoreResult<Option<Parent>> {
        let parent = sqlx::query_as::<_, Parent>(&format!(
            "SELECT {PARENT_COLUMNS} FROM parents WHERE parent_id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(parent)
    }

    async fn find_parent_by_username(&self, username: &str) -> StoreResult<Option<Parent>> {
        self.find_parent_where("parent_username", username).await
    }

    async fn find_parent_by_email(&self, email: &str) -> StoreResult<Option<Parent>> {
        self.find_parent_where("parent_email", email).await
    }

    async fn find_parent_by_reset_token(&self, token: &str) -> StoreResult<Option<Parent>> {
        self.find_parent_where("reset_token", token).await
    }

    async fn store_reset_token(
        &self,
        parent_id: i32,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        sqlx::query(
            "UPDATE parents SET reset_token = $1, reset_token_expiry = $2 WHERE parent_id = $3",
        )
        .bind(token)
        .bind(expires_at)
        .bind(parent_id)
        .execute(&self.pool)
        .await
        .map_err(classify)?;
        Ok(())
    }

    async fn consume_reset_token(
        &self,
        parent_id: i32,
        token: &str,
        password_hash: &str,
    ) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE parents
             SET hashed_password = $1, reset_token = NULL, reset_token_expiry = NULL
             WHERE parent_id = $2 AND reset_token = $3",
        )
        .bind(password_hash)
        .bind(parent_id)
        .bind(token)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn insert_child(&self, username: &str, age: Option<i32>) -> StoreResult<Child> {
        sqlx::query_as::<_, Child>(&format!(
            "INSERT INTO children (child_username, child_age) VALUES ($1, $2)
             RETURNING {CHILD_COLUMNS}"
        ))
        .bind(username)
        .bind(age)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    async fn find_child(&self, id: i32) -> StoreResult<Option<Child>> {
        let child = sqlx::query_as::<_, Child>(&format!(
            "SELECT {CHILD_COLUMNS} FROM children WHERE child_id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(child)
    }

    async fn find_child_by_username(&self, username: &str) -> StoreResult<Option<Child>> {
        let child = sqlx::query_as::<_, Child>(&format!(
            "SELECT {CHILD_COLUMNS} FROM children WHERE child_username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(child)
    }

    async fn link_exists(&self, parent_id: i32, child_id: i32) -> StoreResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM parent_child_link WHERE parent_id = $1 AND child_id = $2)",
        )
        .bind(parent_id)
        .bind(child_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn insert_link(&self, parent_id: i32, child_id: i32) -> StoreResult<()> {
        sqlx::query("INSERT INTO parent_child_link (parent_id, child_id) VALUES ($1, $2)")
            .bind(parent_id)
            .bind(child_id)
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn children_of_parent(&self, parent_id: i32) -> StoreResult<Vec<Child>> {
        let children = sqlx::query_as::<_, Child>(
            "SELECT c.child_id AS id, c.child_username AS username, c.child_age AS age
             FROM children c
             JOIN parent_child_link pcl ON pcl.child_id = c.child_id
             WHERE pcl.parent_id = $1
             ORDER BY c.child_id",
        )
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(children)
    }

    async fn parents_of_child(&self, child_id: i32) -> StoreResult<Vec<LinkedParent>> {
        let parents = sqlx::query_as::<_, LinkedParent>(
            "SELECT p.parent_id AS id, p.parent_username AS username
             FROM parents p
             JOIN parent_child_link pcl ON pcl.parent_id = p.parent_id
             WHERE pcl.child_id = $1
             ORDER BY p.parent_id",
        )
        .bind(child_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(parents)
    }

    async fn list_characters(&self) -> StoreResult<Vec<Character>> {
        let characters = sqlx::query_as::<_, Character>(
            "SELECT character_id AS id, character_name AS name,
                    character_description AS description,
                    character_photo AS photo, audio_file AS audio
             FROM characters
             ORDER BY character_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(characters)
    }

    async fn character_name(&self, id: i32) -> StoreResult<Option<String>> {
        let name: Option<String> =
            sqlx::query_scalar("SELECT character_name FROM characters WHERE character_id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(name)
    }

    async fn insert_feeling_log(&self, log: &NewFeelingLog) -> StoreResult<FeelingLog> {
        sqlx::query_as::<_, FeelingLog>(&format!(
            "INSERT INTO logging (child_id, character_id, character_name, feeling_level, investigation)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {LOG_COLUMNS}"
        ))
        .bind(log.child_id)
        .bind(log.character_id)
        .bind(&log.character_name)
        .bind(log.level)
        .bind(&log.investigation)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    async fn child_logs(
        &self,
        child_id: i32,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> StoreResult<Vec<FeelingLog>> {
        let logs = match range {
            Some((start, end)) => {
                sqlx::query_as::<_, FeelingLog>(&format!(
                    "SELECT {LOG_COLUMNS} FROM logging
                     WHERE child_id = $1 AND logging_time BETWEEN $2 AND $3
                     ORDER BY logging_time DESC, log_id DESC"
                ))
                .bind(child_id)
                .bind(start)
                .bind(end)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, FeelingLog>(&format!(
                    "SELECT {LOG_COLUMNS} FROM logging
                     WHERE child_id = $1
                     ORDER BY logging_time DESC, log_id DESC"
                ))
                .bind(child_id)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(logs)
    }
}
