pub mod auth;
pub mod characters;
pub mod children;
pub mod health;
pub mod links;
pub mod logs;
pub mod metrics;
pub mod parents;

use axum::{http::StatusCode, Json};
use serde_json::Value;

/// Error half of every handler result: a status plus `{"error": message}`.
pub type HandlerError = (StatusCode, Json<Value>);
