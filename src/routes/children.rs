use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::HandlerError;
use crate::{
    models::{
        child::{ChildProfile, CreateChildRequest},
        parent::ParentSummary,
    },
    AppState,
};

/// Missing or malformed ids answer `null`, not 404.
pub async fn get_child(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Option<ChildProfile>>, HandlerError> {
    state
        .service
        .child_profile(&id)
        .await
        .map(Json)
        .map_err(Into::into)
}

pub async fn get_child_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Option<ChildProfile>>, HandlerError> {
    state
        .service
        .child_by_username(&username)
        .await
        .map(Json)
        .map_err(Into::into)
}

pub async fn create_child(
    State(state): State<AppState>,
    Json(body): Json<CreateChildRequest>,
) -> Result<(StatusCode, Json<ChildProfile>), HandlerError> {
    state
        .service
        .create_child(&body.username, body.age)
        .await
        .map(|child| (StatusCode::CREATED, Json(child)))
        .map_err(Into::into)
}

pub async fn list_parents(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ParentSummary>>, HandlerError> {
    state
        .service
        .child_parents(&id)
        .await
        .map(Json)
        .map_err(Into::into)
}
