use axum::{extract::State, Json};

use super::HandlerError;
use crate::{models::character::CharacterView, AppState};

pub async fn list_characters(
    State(state): State<AppState>,
) -> Result<Json<Vec<CharacterView>>, HandlerError> {
    state
        .service
        .character_library()
        .await
        .map(Json)
        .map_err(Into::into)
}
