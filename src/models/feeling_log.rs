use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One row of the append-only `logging` table.
#[derive(Debug, Clone, FromRow)]
pub struct FeelingLog {
    pub id: i32,
    pub child_id: i32,
    pub character_id: i32,
    /// Character name as it was when the log was written.
    pub character_name: Option<String>,
    pub level: i32,
    pub logged_at: DateTime<Utc>,
    pub investigation: Option<Vec<String>>,
}

/// Insert payload; `id` and `logged_at` are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewFeelingLog {
    pub child_id: i32,
    pub character_id: i32,
    pub character_name: Option<String>,
    pub level: i32,
    pub investigation: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: String,
    pub child_id: String,
    pub character_id: String,
    pub character_name: Option<String>,
    pub level: i32,
    /// RFC 3339, millisecond precision, UTC (`2024-01-01T08:30:00.000Z`).
    pub timestamp: String,
    pub investigation: Vec<String>,
}

impl From<FeelingLog> for LogEntry {
    fn from(log: FeelingLog) -> Self {
        Self {
            id: log.id.to_string(),
            child_id: log.child_id.to_string(),
            character_id: log.character_id.to_string(),
            character_name: log.character_name,
            level: log.level,
            timestamp: log.logged_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            investigation: log.investigation.unwrap_or_default(),
        }
    }
}

/// Body for POST /children/{id}/logs.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFeelingRequest {
    pub character_id: String,
    pub level: i32,
    pub investigation: Option<Vec<String>>,
}

/// Query params for GET /children/{id}/logs.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildLogsQuery {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}
