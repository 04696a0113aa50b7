//! Reset accounts and logs to a fixed demo data set.
//!
//! - 3 children: alice_child, bob_child, charlie_child
//! - 3 parents (password `password123` unless --password): alice_mom, alice_dad, bob_mom
//! - links: alice_mom and alice_dad to alice_child, bob_mom to bob_child
//! - a few feeling logs per linked child
//!
//! The character library is left as is; run populate-characters for it.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use fbi_api::services::password::PasswordHasher;

const CHILDREN: &[(i32, &str, &str, i32)] = &[
    (1, "alice_child", "Alice", 8),
    (2, "bob_child", "Bob", 7),
    (3, "charlie_child", "Charlie", 9),
];

const PARENTS: &[(i32, &str)] = &[(1, "alice_mom"), (2, "alice_dad"), (3, "bob_mom")];

const LINKS: &[(i32, i32)] = &[(1, 1), (2, 1), (3, 2)];

/// (child, character, level, hours ago, investigation)
const LOGS: &[(i32, i32, i32, i64, &[&str])] = &[
    (1, 1, 7, 50, &["racing heart", "before a test"]),
    (1, 3, 4, 26, &["tummy ache"]),
    (1, 2, 12, 3, &[]),
    (2, 2, 5, 30, &["sweaty hands"]),
    (2, 1, 0, 1, &[]),
];

#[derive(Parser)]
#[command(name = "seed-test-data", about = "Reset the database to the demo accounts and logs")]
struct Args {
    /// Password given to every seeded parent
    #[arg(long, default_value = "password123")]
    password: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();
    let config = fbi_api::config::Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    fbi_api::db::run_migrations(&pool).await?;

    let mut tx = pool.begin().await?;

    for table in ["logging", "parent_child_link", "parents", "children"] {
        sqlx::query(&format!("DELETE FROM {table}"))
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to clear {table}"))?;
    }
    info!("Cleared existing accounts and logs");

    for &(id, username, name, age) in CHILDREN {
        sqlx::query(
            "INSERT INTO children (child_id, child_username, child_name, child_age)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(id)
        .bind(username)
        .bind(name)
        .bind(age)
        .execute(&mut *tx)
        .await?;
        info!("Created child {} (id {})", username, id);
    }

    let password_hash = PasswordHasher::default().hash(&args.password)?;
    for &(id, username) in PARENTS {
        sqlx::query(
            "INSERT INTO parents (parent_id, parent_username, parent_email, hashed_password)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(id)
        .bind(username)
        .bind(format!("{username}@example.com"))
        .bind(&password_hash)
        .execute(&mut *tx)
        .await?;
        info!("Created parent {} (id {})", username, id);
    }

    // Explicit ids above leave the sequences behind.
    for (seq, table, column) in [
        ("children_child_id_seq", "children", "child_id"),
        ("parents_parent_id_seq", "parents", "parent_id"),
    ] {
        sqlx::query(&format!(
            "SELECT setval('{seq}', (SELECT MAX({column}) FROM {table}))"
        ))
        .execute(&mut *tx)
        .await?;
    }

    for &(parent_id, child_id) in LINKS {
        sqlx::query("INSERT INTO parent_child_link (parent_id, child_id) VALUES ($1, $2)")
            .bind(parent_id)
            .bind(child_id)
            .execute(&mut *tx)
            .await?;
        info!("Linked parent {} to child {}", parent_id, child_id);
    }

    let now = Utc::now();
    for &(child_id, character_id, level, hours_ago, investigation) in LOGS {
        let investigation: Vec<String> = investigation.iter().map(|s| s.to_string()).collect();
        sqlx::query(
            "INSERT INTO logging
                 (child_id, character_id, character_name, feeling_level, logging_time, investigation)
             VALUES ($1, $2, (SELECT character_name FROM characters WHERE character_id = $2), $3, $4, $5)",
        )
        .bind(child_id)
        .bind(character_id)
        .bind(level.clamp(1, 10))
        .bind(now - Duration::hours(hours_ago))
        .bind(investigation)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    pool.close().await;

    info!(
        "Seeded {} children, {} parents, {} links, {} logs",
        CHILDREN.len(),
        PARENTS.len(),
        LINKS.len(),
        LOGS.len()
    );
    Ok(())
}
