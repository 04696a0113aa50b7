use tracing::info;

use super::{parse_id, FbiService};
use crate::{
    db::PARENT_CHILD_LINK_KEY,
    error::{ApiError, ApiResult},
    models::{child::ChildProfile, parent::ParentSummary},
};

impl FbiService {
    /// Link a parent to a child. Succeeds (true) whether the link is new or already there;
    /// every failure is an error, never `false`.
    pub async fn link_parent_child(&self, parent_id: &str, child_id: &str) -> ApiResult<bool> {
        let (Some(parent_id), Some(child_id)) = (parse_id(parent_id), parse_id(child_id)) else {
            return Err(ApiError::InvalidId);
        };

        if self.store.find_parent(parent_id).await?.is_none() {
            return Err(ApiError::ParentNotFound);
        }
        if self.store.find_child(child_id).await?.is_none() {
            return Err(ApiError::ChildNotFound);
        }

        self.ensure_link(parent_id, child_id).await?;
        Ok(true)
    }

    /// Check-then-insert. A unique violation on the link key means a concurrent request
    /// created the same link first, which counts as success.
    pub(crate) async fn ensure_link(&self, parent_id: i32, child_id: i32) -> ApiResult<()> {
        if self.store.link_exists(parent_id, child_id).await? {
            info!("Link already exists between parent {} and child {}", parent_id, child_id);
            return Ok(());
        }

        match self.store.insert_link(parent_id, child_id).await {
            Ok(()) => info!("Linked parent {} to child {}", parent_id, child_id),
            Err(e) if e.violates_unique(PARENT_CHILD_LINK_KEY) => {
                info!("Link already exists between parent {} and child {}", parent_id, child_id)
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    /// Read-only variant: malformed ids answer `false` instead of erroring.
    pub async fn is_parent_linked_to_child(
        &self,
        parent_id: &str,
        child_id: &str,
    ) -> ApiResult<bool> {
        let (Some(parent_id), Some(child_id)) = (parse_id(parent_id), parse_id(child_id)) else {
            return Ok(false);
        };
        Ok(self.store.link_exists(parent_id, child_id).await?)
    }

    pub async fn parent_children(&self, parent_id: &str) -> ApiResult<Vec<ChildProfile>> {
        let Some(parent_id) = parse_id(parent_id) else {
            return Ok(Vec::new());
        };
        let children = self.store.children_of_parent(parent_id).await?;
        Ok(children.into_iter().map(Into::into).collect())
    }

    pub async fn child_parents(&self, child_id: &str) -> ApiResult<Vec<ParentSummary>> {
        let Some(child_id) = parse_id(child_id) else {
            return Ok(Vec::new());
        };
        let parents = self.store.parents_of_child(child_id).await?;
        Ok(parents.into_iter().map(Into::into).collect())
    }
}
