use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::HandlerError;
use crate::{
    models::feeling_log::{ChildLogsQuery, LogEntry, LogFeelingRequest},
    AppState,
};

/// GET /children/{id}/logs?startTime=..&endTime=..
pub async fn list_logs(
    State(state): State<AppState>,
    Path(child_id): Path<String>,
    Query(range): Query<ChildLogsQuery>,
) -> Result<Json<Vec<LogEntry>>, HandlerError> {
    state
        .service
        .child_logs(
            &child_id,
            range.start_time.as_deref(),
            range.end_time.as_deref(),
        )
        .await
        .map(Json)
        .map_err(Into::into)
}

pub async fn log_feeling(
    State(state): State<AppState>,
    Path(child_id): Path<String>,
    Json(body): Json<LogFeelingRequest>,
) -> Result<(StatusCode, Json<LogEntry>), HandlerError> {
    state
        .service
        .log_feeling(&child_id, &body.character_id, body.level, body.investigation)
        .await
        .map(|entry| (StatusCode::CREATED, Json(entry)))
        .map_err(Into::into)
}
