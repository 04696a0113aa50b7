use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::HandlerError;
use crate::{
    models::{
        child::ChildProfile,
        parent::{CreateParentRequest, ParentProfile},
    },
    AppState,
};

pub async fn get_parent(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Option<ParentProfile>>, HandlerError> {
    state
        .service
        .parent_profile(&id)
        .await
        .map(Json)
        .map_err(Into::into)
}

pub async fn create_parent(
    State(state): State<AppState>,
    Json(body): Json<CreateParentRequest>,
) -> Result<(StatusCode, Json<ParentProfile>), HandlerError> {
    state
        .service
        .create_parent(
            &body.username,
            &body.email,
            &body.password,
            body.child_id.as_deref(),
        )
        .await
        .map(|parent| (StatusCode::CREATED, Json(parent)))
        .map_err(Into::into)
}

pub async fn list_children(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ChildProfile>>, HandlerError> {
    state
        .service
        .parent_children(&id)
        .await
        .map(Json)
        .map_err(Into::into)
}

pub async fn is_linked(
    State(state): State<AppState>,
    Path((parent_id, child_id)): Path<(String, String)>,
) -> Result<Json<bool>, HandlerError> {
    state
        .service
        .is_parent_linked_to_child(&parent_id, &child_id)
        .await
        .map(Json)
        .map_err(Into::into)
}
