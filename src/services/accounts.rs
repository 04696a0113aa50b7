use tracing::{debug, info, warn};

use super::{metrics, non_empty, parse_id, FbiService};
use crate::{
    db::{StoreError, CHILD_USERNAME_KEY, PARENT_EMAIL_KEY, PARENT_USERNAME_KEY},
    error::{ApiError, ApiResult},
    models::{child::ChildProfile, parent::ParentProfile},
};

/// Re-map a uniqueness violation from the parents table to the matching domain error.
fn parent_conflict(e: StoreError) -> ApiError {
    if e.violates_unique(PARENT_USERNAME_KEY) {
        ApiError::UsernameTaken
    } else if e.violates_unique(PARENT_EMAIL_KEY) {
        ApiError::EmailTaken
    } else {
        ApiError::Store(e)
    }
}

impl FbiService {
    /// Register a parent. When `child_id` is given, the link to that child is attempted
    /// afterwards; a failure there is logged and does not undo the registration.
    pub async fn create_parent(
        &self,
        username: &str,
        email: &str,
        password: &str,
        child_id: Option<&str>,
    ) -> ApiResult<ParentProfile> {
        let result = self.register_parent(username, email, password, child_id).await;
        metrics::REGISTRATIONS_COUNTER
            .with_label_values(&[metrics::outcome(&result)])
            .inc();
        result
    }

    async fn register_parent(
        &self,
        username: &str,
        email: &str,
        password: &str,
        child_id: Option<&str>,
    ) -> ApiResult<ParentProfile> {
        if self.store.parent_username_exists(username).await? {
            return Err(ApiError::UsernameTaken);
        }
        if self.store.parent_email_exists(email).await? {
            return Err(ApiError::EmailTaken);
        }

        let password_hash = self.hasher.hash(password)?;

        // The pre-checks above can lose a race; the unique constraints are authoritative.
        let parent = self
            .store
            .insert_parent(username, email, &password_hash)
            .await
            .map_err(parent_conflict)?;
        info!("Created parent account {} ({})", parent.id, parent.username);

        if let Some(raw) = non_empty(child_id) {
            match parse_id(raw) {
                Some(child_id) => {
                    if let Err(e) = self.ensure_link(parent.id, child_id).await {
                        warn!(
                            "Auto-link of parent {} to child {} failed: {}",
                            parent.id, child_id, e
                        );
                    }
                }
                None => debug!("Skipping auto-link, child id {:?} is not numeric", raw),
            }
        }

        Ok(parent.into())
    }

    /// One-shot credential check. No session is issued.
    pub async fn login_parent(&self, username: &str, password: &str) -> ApiResult<ParentProfile> {
        let result = self.check_credentials(username, password).await;
        metrics::LOGINS_COUNTER
            .with_label_values(&[metrics::outcome(&result)])
            .inc();
        result
    }

    async fn check_credentials(&self, username: &str, password: &str) -> ApiResult<ParentProfile> {
        let parent = self
            .store
            .find_parent_by_username(username)
            .await?
            .ok_or(ApiError::UnknownUsername)?;

        if !self.hasher.verify(password, &parent.password_hash)? {
            return Err(ApiError::IncorrectPassword);
        }
        Ok(parent.into())
    }

    pub async fn create_child(&self, username: &str, age: Option<i32>) -> ApiResult<ChildProfile> {
        let child = self
            .store
            .insert_child(username, age)
            .await
            .map_err(|e| {
                if e.violates_unique(CHILD_USERNAME_KEY) {
                    ApiError::DuplicateChildUsername
                } else {
                    ApiError::Store(e)
                }
            })?;
        info!("Created child account {} ({})", child.id, child.username);
        Ok(child.into())
    }

    pub async fn child_profile(&self, id: &str) -> ApiResult<Option<ChildProfile>> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };
        Ok(self.store.find_child(id).await?.map(Into::into))
    }

    pub async fn child_by_username(&self, username: &str) -> ApiResult<Option<ChildProfile>> {
        Ok(self
            .store
            .find_child_by_username(username)
            .await?
            .map(Into::into))
    }

    pub async fn parent_profile(&self, id: &str) -> ApiResult<Option<ParentProfile>> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };
        Ok(self.store.find_parent(id).await?.map(Into::into))
    }
}
