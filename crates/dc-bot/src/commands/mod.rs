//! Command implementations.

pub mod chat;
pub mod job;
pub mod leaderboard;
pub mod stats;
pub mod users;

use std::sync::Arc;

use anyhow::{Context, Result};
use dc_db::Database;
use dc_engine::{Engine, EngineConfig, MemorySessionStore, Transport};

use crate::adapters::{LlmGenerator, SqliteRepository};
use crate::config::Config;

/// Wires the engine to the database, the configured generator and `transport`.
pub fn build_engine<T: Transport + 'static>(
    config: &Config,
    db: Database,
    transport: Arc<T>,
) -> Result<Engine> {
    let timeout = i64::try_from(config.session_timeout_secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .context("session_timeout_secs is out of range")?;
    let generator = LlmGenerator::from_config(&config.llm)
        .context("failed to create the text generator")?;

    Ok(Engine::new(
        Arc::new(SqliteRepository::new(db)),
        Arc::new(generator),
        transport,
        Arc::new(MemorySessionStore::new(timeout)),
        EngineConfig {
            timezone: config.tz()?,
            admin: config.admin(),
        },
    ))
}
