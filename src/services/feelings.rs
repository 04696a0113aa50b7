use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::info;

use super::{metrics, non_empty, parse_id, FbiService};
use crate::{
    error::{ApiError, ApiResult},
    models::{
        character::CharacterView,
        feeling_log::{LogEntry, NewFeelingLog},
    },
};

/// Accepts RFC 3339, or a zone-less date-time / date taken as UTC.
fn parse_timestamp(raw: &str) -> ApiResult<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ApiError::InvalidTimestamp(raw.to_string()))
}

impl FbiService {
    /// Append a feeling log. The character's current name is copied onto the row, so a
    /// later rename leaves history untouched. The level is stored as given.
    pub async fn log_feeling(
        &self,
        child_id: &str,
        character_id: &str,
        level: i32,
        investigation: Option<Vec<String>>,
    ) -> ApiResult<LogEntry> {
        let (Some(child_id), Some(character_id)) = (parse_id(child_id), parse_id(character_id))
        else {
            return Err(ApiError::InvalidId);
        };

        let character_name = self.store.character_name(character_id).await?;
        let log = self
            .store
            .insert_feeling_log(&NewFeelingLog {
                child_id,
                character_id,
                character_name,
                level,
                investigation,
            })
            .await?;

        metrics::FEELING_LOGS_COUNTER.inc();
        info!("Logged feeling {} for child {}", log.id, child_id);
        Ok(log.into())
    }

    /// Logs for a child, newest first. Bounds apply only when both are given and are
    /// inclusive; a lone bound is ignored.
    pub async fn child_logs(
        &self,
        child_id: &str,
        start_time: Option<&str>,
        end_time: Option<&str>,
    ) -> ApiResult<Vec<LogEntry>> {
        let Some(child_id) = parse_id(child_id) else {
            return Err(ApiError::InvalidId);
        };

        let range = match (non_empty(start_time), non_empty(end_time)) {
            (Some(start), Some(end)) => Some((parse_timestamp(start)?, parse_timestamp(end)?)),
            _ => None,
        };

        let logs = self.store.child_logs(child_id, range).await?;
        Ok(logs.into_iter().map(Into::into).collect())
    }

    pub async fn character_library(&self) -> ApiResult<Vec<CharacterView>> {
        let characters = self.store.list_characters().await?;
        Ok(characters.into_iter().map(Into::into).collect())
    }
}
