use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// DB row struct for `parents`; columns are aliased to these names in SQL.
#[derive(Debug, Clone, FromRow)]
pub struct Parent {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub reset_token: Option<String>,
    pub reset_token_expiry: Option<DateTime<Utc>>,
}

/// A parent reached through the link table (`Child.parents`). Email is not exposed there.
#[derive(Debug, Clone, FromRow)]
pub struct LinkedParent {
    pub id: i32,
    pub username: String,
}

/// Public view of a parent account. The password hash never leaves the service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParentProfile {
    pub id: String,
    pub username: String,
    pub email: String,
}

impl From<Parent> for ParentProfile {
    fn from(p: Parent) -> Self {
        Self {
            id: p.id.to_string(),
            username: p.username,
            email: p.email,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParentSummary {
    pub id: String,
    pub username: String,
}

impl From<LinkedParent> for ParentSummary {
    fn from(p: LinkedParent) -> Self {
        Self {
            id: p.id.to_string(),
            username: p.username,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateParentRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Child to link right after registration (best-effort).
    pub child_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkParentChildRequest {
    pub parent_id: String,
    pub child_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    pub email: String,
    pub child_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}
