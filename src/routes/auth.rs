use axum::{extract::State, Json};

use super::HandlerError;
use crate::{
    models::parent::{
        ForgotPasswordRequest, LoginRequest, ParentProfile, ResetPasswordRequest,
    },
    AppState,
};

/// Credential check only; there is no session or token to hand back.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<ParentProfile>, HandlerError> {
    state
        .service
        .login_parent(&body.username, &body.password)
        .await
        .map(Json)
        .map_err(Into::into)
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> Result<Json<bool>, HandlerError> {
    state
        .service
        .request_password_reset(&body.email, body.child_id.as_deref())
        .await
        .map(Json)
        .map_err(Into::into)
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<Json<bool>, HandlerError> {
    state
        .service
        .reset_password(&body.token, &body.new_password)
        .await
        .map(Json)
        .map_err(Into::into)
}
