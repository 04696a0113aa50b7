use axum::{extract::State, Json};

use super::HandlerError;
use crate::{models::parent::LinkParentChildRequest, AppState};

/// POST /links. Idempotent: linking an already linked pair also answers `true`.
pub async fn link_parent_child(
    State(state): State<AppState>,
    Json(body): Json<LinkParentChildRequest>,
) -> Result<Json<bool>, HandlerError> {
    state
        .service
        .link_parent_child(&body.parent_id, &body.child_id)
        .await
        .map(Json)
        .map_err(Into::into)
}
