use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use sqlx::FromRow;

/// Reference content shown to a child before logging a feeling.
#[derive(Debug, Clone, FromRow)]
pub struct Character {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub photo: Option<Vec<u8>>,
    pub audio: Option<Vec<u8>>,
}

/// Binary media is shipped as base64 text, or null when absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharacterView {
    pub id: String,
    pub name: String,
    pub photo: Option<String>,
    pub description: Option<String>,
    pub audio: Option<String>,
}

impl From<Character> for CharacterView {
    fn from(c: Character) -> Self {
        Self {
            id: c.id.to_string(),
            name: c.name,
            photo: c.photo.map(|bytes| STANDARD.encode(bytes)),
            description: c.description,
            audio: c.audio.map(|bytes| STANDARD.encode(bytes)),
        }
    }
}
