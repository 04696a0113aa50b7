//! Load the character library into the database.
//!
//! Reads one image per built-in character from `--image-dir` and inserts it,
//! leaving existing characters untouched. With `--audio-dir`, characters that
//! have a voice clip get it attached by name.
//!
//! Usage:
//!   DATABASE_URL=... ./populate-characters --image-dir data/characters --audio-dir data/audio

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{info, warn};

struct CharacterSeed {
    name: &'static str,
    image: &'static str,
    audio: Option<&'static str>,
    description: &'static str,
}

const CHARACTERS: &[CharacterSeed] = &[
    CharacterSeed {
        name: "Henry the Heartbeat",
        image: "henry_heartbeat.png",
        audio: Some("henry_heartbeat.mp3"),
        description: "I am a very powerful machine that pumps blood to all of the parts of your body.",
    },
    CharacterSeed {
        name: "Samantha Sweat",
        image: "samatha_sweat.png",
        audio: None,
        description: "I like to visit you when your body is preparing for a challenge. I help keep your body cool so you can face the challenge.",
    },
    CharacterSeed {
        name: "Gassy Gus",
        image: "gassy_gus.png",
        audio: None,
        description: "I sometimes cause sharp pains in your stomach that you can get rid of by doing guess what?? FARTING",
    },
];

#[derive(Parser)]
#[command(name = "populate-characters", about = "Insert the character library from image and audio files")]
struct Args {
    /// Directory holding the character images
    #[arg(long, default_value = "data/characters")]
    image_dir: PathBuf,

    /// Directory holding character audio clips (skipped if not given)
    #[arg(long)]
    audio_dir: Option<PathBuf>,

    /// Maximum number of database connections
    #[arg(long, default_value_t = 2)]
    max_connections: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();
    let config = fbi_api::config::Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(args.max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    fbi_api::db::run_migrations(&pool).await?;

    for seed in CHARACTERS {
        insert_character(&pool, &args.image_dir, seed).await?;
    }

    if let Some(audio_dir) = &args.audio_dir {
        for seed in CHARACTERS {
            if let Some(file) = seed.audio {
                attach_audio(&pool, &audio_dir.join(file), seed.name).await?;
            }
        }
    }

    let rows: Vec<(i32, String, Option<i32>, Option<i32>)> = sqlx::query_as(
        "SELECT character_id, character_name, LENGTH(character_photo), LENGTH(audio_file)
         FROM characters ORDER BY character_id",
    )
    .fetch_all(&pool)
    .await?;
    for (id, name, photo, audio) in rows {
        info!(
            "{} (id {}): photo {} bytes, audio {} bytes",
            name,
            id,
            photo.unwrap_or(0),
            audio.unwrap_or(0)
        );
    }

    pool.close().await;
    Ok(())
}

async fn insert_character(pool: &PgPool, image_dir: &Path, seed: &CharacterSeed) -> Result<()> {
    let path = image_dir.join(seed.image);
    if !path.exists() {
        warn!("Image not found for {}: {:?}", seed.name, path);
        return Ok(());
    }

    let photo = tokio::fs::read(&path)
        .await
        .with_context(|| format!("Failed to read {:?}", path))?;
    info!("Loading {}: {} bytes", seed.name, photo.len());

    let inserted = sqlx::query(
        "INSERT INTO characters (character_name, character_photo, character_description)
         VALUES ($1, $2, $3)
         ON CONFLICT (character_name) DO NOTHING",
    )
    .bind(seed.name)
    .bind(photo)
    .bind(seed.description)
    .execute(pool)
    .await
    .with_context(|| format!("Failed to insert {}", seed.name))?
    .rows_affected();

    if inserted == 0 {
        info!("{} already present", seed.name);
    } else {
        info!("Added {}", seed.name);
    }
    Ok(())
}

async fn attach_audio(pool: &PgPool, path: &Path, name: &str) -> Result<()> {
    if !path.exists() {
        warn!("Audio file not found for {}: {:?}", name, path);
        return Ok(());
    }

    let audio = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {:?}", path))?;

    let updated: Option<i32> = sqlx::query_scalar(
        "UPDATE characters SET audio_file = $1 WHERE character_name = $2 RETURNING character_id",
    )
    .bind(audio)
    .bind(name)
    .fetch_optional(pool)
    .await?;

    match updated {
        Some(id) => info!("Attached audio to {} (id {})", name, id),
        None => warn!("Character not found: {}", name),
    }
    Ok(())
}
