//! In-process `Store` for unit tests.
//!
//! Enforces the same unique and foreign-key constraints as the Postgres schema and
//! reports the same constraint names, so conflict re-mapping can be exercised without
//! a database.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{
    Store, StoreError, StoreResult, CHILD_USERNAME_KEY, PARENT_CHILD_LINK_KEY, PARENT_EMAIL_KEY,
    PARENT_RESET_TOKEN_KEY, PARENT_USERNAME_KEY,
};
use crate::models::{
    character::Character,
    child::Child,
    feeling_log::{FeelingLog, NewFeelingLog},
    parent::{LinkedParent, Parent},
};

#[derive(Default)]
struct Tables {
    parents: Vec<Parent>,
    children: Vec<Child>,
    links: Vec<(i32, i32)>,
    characters: Vec<Character>,
    logs: Vec<FeelingLog>,
    /// Existence pre-checks answer "absent", as if a concurrent insert landed after them.
    racing_checks: bool,
    /// Every write fails with a non-constraint database error.
    broken: bool,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

fn unique(constraint: &str) -> StoreError {
    StoreError::UniqueViolation {
        constraint: constraint.to_string(),
    }
}

fn foreign_key(constraint: &str) -> StoreError {
    StoreError::ForeignKeyViolation {
        constraint: constraint.to_string(),
    }
}

impl Tables {
    fn check_writable(&self) -> StoreResult<()> {
        if self.broken {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().expect("memory store poisoned")
    }

    pub fn set_racing_checks(&self, racing: bool) {
        self.lock().racing_checks = racing;
    }

    pub fn set_broken(&self, broken: bool) {
        self.lock().broken = broken;
    }

    pub fn add_character(&self, name: &str, photo: Option<&[u8]>) -> i32 {
        let mut t = self.lock();
        let id = t.characters.len() as i32 + 1;
        t.characters.push(Character {
            id,
            name: name.to_string(),
            description: Some(format!("{name} description")),
            photo: photo.map(<[u8]>::to_vec),
            audio: None,
        });
        id
    }

    pub fn rename_character(&self, id: i32, name: &str) {
        let mut t = self.lock();
        if let Some(c) = t.characters.iter_mut().find(|c| c.id == id) {
            c.name = name.to_string();
        }
    }

    pub fn link_rows(&self, parent_id: i32, child_id: i32) -> usize {
        self.lock()
            .links
            .iter()
            .filter(|&&(p, c)| p == parent_id && c == child_id)
            .count()
    }

    pub fn reset_state(&self, parent_id: i32) -> (Option<String>, Option<DateTime<Utc>>) {
        let t = self.lock();
        t.parents
            .iter()
            .find(|p| p.id == parent_id)
            .map(|p| (p.reset_token.clone(), p.reset_token_expiry))
            .unwrap_or((None, None))
    }

    pub fn set_reset_expiry(&self, parent_id: i32, expires_at: DateTime<Utc>) {
        let mut t = self.lock();
        if let Some(p) = t.parents.iter_mut().find(|p| p.id == parent_id) {
            p.reset_token_expiry = Some(expires_at);
        }
    }

    /// Insert a log with an explicit timestamp.
    pub fn insert_log_at(&self, log: NewFeelingLog, logged_at: DateTime<Utc>) -> FeelingLog {
        let mut t = self.lock();
        let row = FeelingLog {
            id: t.logs.len() as i32 + 1,
            child_id: log.child_id,
            character_id: log.character_id,
            character_name: log.character_name,
            level: log.level,
            logged_at,
            investigation: log.investigation,
        };
        t.logs.push(row.clone());
        row
    }

    fn parent_where(&self, pred: impl Fn(&Parent) -> bool) -> Option<Parent> {
        self.lock().parents.iter().find(|p| pred(p)).cloned()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn parent_username_exists(&self, username: &str) -> StoreResult<bool> {
        let t = self.lock();
        Ok(!t.racing_checks && t.parents.iter().any(|p| p.username == username))
    }

    async fn parent_email_exists(&self, email: &str) -> StoreResult<bool> {
        let t = self.lock();
        Ok(!t.racing_checks && t.parents.iter().any(|p| p.email == email))
    }

    async fn insert_parent(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> StoreResult<Parent> {
        let mut t = self.lock();
        t.check_writable()?;
        if t.parents.iter().any(|p| p.username == username) {
            return Err(unique(PARENT_USERNAME_KEY));
        }
        if t.parents.iter().any(|p| p.email == email) {
            return Err(unique(PARENT_EMAIL_KEY));
        }
        let parent = Parent {
            id: t.parents.len() as i32 + 1,
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            reset_token: None,
            reset_token_expiry: None,
        };
        t.parents.push(parent.clone());
        Ok(parent)
    }

    async fn find_parent(&self, id: i32) -> StoreResult<Option<Parent>> {
        Ok(self.parent_where(|p| p.id == id))
    }

    async fn find_parent_by_username(&self, username: &str) -> StoreResult<Option<Parent>> {
        Ok(self.parent_where(|p| p.username == username))
    }

    async fn find_parent_by_email(&self, email: &str) -> StoreResult<Option<Parent>> {
        Ok(self.parent_where(|p| p.email == email))
    }

    async fn find_parent_by_reset_token(&self, token: &str) -> StoreResult<Option<Parent>> {
        Ok(self.parent_where(|p| p.reset_token.as_deref() == Some(token)))
    }

    async fn store_reset_token(
        &self,
        parent_id: i32,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut t = self.lock();
        t.check_writable()?;
        if t
            .parents
            .iter()
            .any(|p| p.id != parent_id && p.reset_token.as_deref() == Some(token))
        {
            return Err(unique(PARENT_RESET_TOKEN_KEY));
        }
        if let Some(p) = t.parents.iter_mut().find(|p| p.id == parent_id) {
            p.reset_token = Some(token.to_string());
            p.reset_token_expiry = Some(expires_at);
        }
        Ok(())
    }

    async fn consume_reset_token(
        &self,
        parent_id: i32,
        token: &str,
        password_hash: &str,
    ) -> StoreResult<bool> {
        let mut t = self.lock();
        t.check_writable()?;
        match t
            .parents
            .iter_mut()
            .find(|p| p.id == parent_id && p.reset_token.as_deref() == Some(token))
        {
            Some(p) => {
                p.password_hash = password_hash.to_string();
                p.reset_token = None;
                p.reset_token_expiry = None;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_child(&self, username: &str, age: Option<i32>) -> StoreResult<Child> {
        let mut t = self.lock();
        t.check_writable()?;
        if t.children.iter().any(|c| c.username == username) {
            return Err(unique(CHILD_USERNAME_KEY));
        }
        let child = Child {
            id: t.children.len() as i32 + 1,
            username: username.to_string(),
            age,
        };
        t.children.push(child.clone());
        Ok(child)
    }

    async fn find_child(&self, id: i32) -> StoreResult<Option<Child>> {
        Ok(self.lock().children.iter().find(|c| c.id == id).cloned())
    }

    async fn find_child_by_username(&self, username: &str) -> StoreResult<Option<Child>> {
        Ok(self
            .lock()
            .children
            .iter()
            .find(|c| c.username == username)
            .cloned())
    }

    async fn link_exists(&self, parent_id: i32, child_id: i32) -> StoreResult<bool> {
        let t = self.lock();
        Ok(!t.racing_checks && t.links.contains(&(parent_id, child_id)))
    }

    async fn insert_link(&self, parent_id: i32, child_id: i32) -> StoreResult<()> {
        let mut t = self.lock();
        t.check_writable()?;
        if !t.parents.iter().any(|p| p.id == parent_id) {
            return Err(foreign_key("parent_child_link_parent_id_fkey"));
        }
        if !t.children.iter().any(|c| c.id == child_id) {
            return Err(foreign_key("parent_child_link_child_id_fkey"));
        }
        if t.links.contains(&(parent_id, child_id)) {
            return Err(unique(PARENT_CHILD_LINK_KEY));
        }
        t.links.push((parent_id, child_id));
        Ok(())
    }

    async fn children_of_parent(&self, parent_id: i32) -> StoreResult<Vec<Child>> {
        let t = self.lock();
        let mut children: Vec<Child> = t
            .children
            .iter()
            .filter(|c| t.links.contains(&(parent_id, c.id)))
            .cloned()
            .collect();
        children.sort_by_key(|c| c.id);
        Ok(children)
    }

    async fn parents_of_child(&self, child_id: i32) -> StoreResult<Vec<LinkedParent>> {
        let t = self.lock();
        let mut parents: Vec<LinkedParent> = t
            .parents
            .iter()
            .filter(|p| t.links.contains(&(p.id, child_id)))
            .map(|p| LinkedParent {
                id: p.id,
                username: p.username.clone(),
            })
            .collect();
        parents.sort_by_key(|p| p.id);
        Ok(parents)
    }

    async fn list_characters(&self) -> StoreResult<Vec<Character>> {
        Ok(self.lock().characters.clone())
    }

    async fn character_name(&self, id: i32) -> StoreResult<Option<String>> {
        Ok(self
            .lock()
            .characters
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.clone()))
    }

    async fn insert_feeling_log(&self, log: &NewFeelingLog) -> StoreResult<FeelingLog> {
        {
            let t = self.lock();
            t.check_writable()?;
            if !t.children.iter().any(|c| c.id == log.child_id) {
                return Err(foreign_key("logging_child_id_fkey"));
            }
        }
        Ok(self.insert_log_at(log.clone(), Utc::now()))
    }

    async fn child_logs(
        &self,
        child_id: i32,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> StoreResult<Vec<FeelingLog>> {
        let t = self.lock();
        let mut logs: Vec<FeelingLog> = t
            .logs
            .iter()
            .filter(|l| l.child_id == child_id)
            .filter(|l| match range {
                Some((start, end)) => l.logged_at >= start && l.logged_at <= end,
                None => true,
            })
            .cloned()
            .collect();
        logs.sort_by(|a, b| b.logged_at.cmp(&a.logged_at).then(b.id.cmp(&a.id)));
        Ok(logs)
    }
}
