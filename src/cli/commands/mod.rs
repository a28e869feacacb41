pub mod migrate;
pub mod token;
pub mod user;

use anyhow::Context;
use sqlx::PgPool;

use crate::config::config;
use crate::database::{DatabaseManager, Stores};

/// Postgres-backed stores for administrative commands; the in-memory
/// fallback is never used here since nothing it writes would survive.
pub(crate) async fn open_stores() -> anyhow::Result<Stores> {
    Stores::open(&config().database, false)
        .await
        .context("failed to connect to the sigil database (is DATABASE_URL set?)")
}

pub(crate) async fn connect() -> anyhow::Result<PgPool> {
    DatabaseManager::connect(&config().database)
        .await
        .context("failed to connect to the sigil database (is DATABASE_URL set?)")
}
