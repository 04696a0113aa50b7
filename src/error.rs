use axum::{http::StatusCode, Json};
use serde_json::{json, Value};
use thiserror::Error;

use crate::db::StoreError;

/// Every way a resolver can fail. Messages are shown to end users as-is.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Username already taken")]
    UsernameTaken,
    #[error("Email address already registered")]
    EmailTaken,
    #[error("This detective name is already taken. Please choose a different name.")]
    DuplicateChildUsername,
    #[error("Parent account not found")]
    ParentNotFound,
    /// `ParentNotFound` as reported by login.
    #[error("Parent account not found. Please check your username and try again.")]
    UnknownUsername,
    #[error("Child account not found")]
    ChildNotFound,
    #[error("No account found with this email address. Please check your email or create a new account.")]
    NoAccountForEmail,
    // Distinct from UnknownUsername, so a username's existence is observable.
    #[error("Incorrect password. Please try again.")]
    IncorrectPassword,
    #[error("Invalid parent or child ID")]
    InvalidId,
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
    #[error("This parent is not linked to the current child.")]
    NotLinkedToChild,
    #[error("Invalid or expired reset token")]
    InvalidOrExpiredToken,
    #[error("Reset token has expired. Please request a new password reset.")]
    TokenExpired,
    #[error("Failed to send reset code email: {0}")]
    EmailDeliveryFailed(String),
    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::UsernameTaken | ApiError::EmailTaken | ApiError::DuplicateChildUsername => {
                StatusCode::CONFLICT
            }
            ApiError::ParentNotFound
            | ApiError::UnknownUsername
            | ApiError::ChildNotFound
            | ApiError::NoAccountForEmail => StatusCode::NOT_FOUND,
            ApiError::IncorrectPassword => StatusCode::UNAUTHORIZED,
            ApiError::NotLinkedToChild => StatusCode::FORBIDDEN,
            ApiError::InvalidId
            | ApiError::InvalidTimestamp(_)
            | ApiError::InvalidOrExpiredToken
            | ApiError::TokenExpired => StatusCode::BAD_REQUEST,
            ApiError::EmailDeliveryFailed(_) => StatusCode::BAD_GATEWAY,
            ApiError::Hash(_) | ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ApiError> for (StatusCode, Json<Value>) {
    fn from(e: ApiError) -> Self {
        if matches!(e, ApiError::Hash(_) | ApiError::Store(_)) {
            tracing::error!("Request failed: {}", e);
        }
        (e.status_code(), Json(json!({ "error": e.to_string() })))
    }
}
