//! SQLite-backed persistent store.
//!
//! Split into focused submodules:
//! - `users`: account lifecycle (create, lookup, profile updates, soft delete)
//! - `chats`: chat sessions owned by a user
//! - `messages`: chat messages, conversation pages and completion history

mod chats;
mod messages;
mod users;

pub use messages::ConversationPage;

use chrono::{DateTime, SecondsFormat, Utc};
use eko_core::{config::MemoryConfig, error::EkoError, shellexpand};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::info;

/// Path value that selects a private in-memory database.
pub const IN_MEMORY: &str = ":memory:";

/// Persistent store backed by SQLite.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

/// Row counts reported by `eko status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub users: i64,
    pub chats: i64,
    pub messages: i64,
}

impl Store {
    /// Whether an on-disk database already exists at the configured path.
    /// Never true for the in-memory database.
    pub fn exists(config: &MemoryConfig) -> bool {
        config.db_path != IN_MEMORY
            && std::path::Path::new(&shellexpand(&config.db_path)).is_file()
    }

    /// Create a new store, running migrations on first use.
    pub async fn new(config: &MemoryConfig) -> Result<Self, EkoError> {
        let pool = if config.db_path == IN_MEMORY {
            // One connection that never idles out, or the database vanishes.
            let opts = SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| EkoError::Memory(format!("invalid db path: {e}")))?;
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(opts)
                .await
                .map_err(|e| EkoError::Memory(format!("failed to open sqlite: {e}")))?
        } else {
            let db_path = shellexpand(&config.db_path);

            // Ensure parent directory exists.
            if let Some(parent) = std::path::Path::new(&db_path).parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| EkoError::Memory(format!("failed to create data dir: {e}")))?;
            }

            let opts = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
                .map_err(|e| EkoError::Memory(format!("invalid db path: {e}")))?
                .create_if_missing(true)
                .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

            SqlitePoolOptions::new()
                .max_connections(4)
                .connect_with(opts)
                .await
                .map_err(|e| EkoError::Memory(format!("failed to connect to sqlite: {e}")))?
        };

        Self::run_migrations(&pool).await?;

        info!("Store initialized at {}", config.db_path);

        Ok(Self { pool })
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get the database file size in bytes.
    pub async fn db_size(&self) -> Result<u64, EkoError> {
        let (page_count,): (i64,) = sqlx::query_as("PRAGMA page_count")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| EkoError::Memory(format!("pragma failed: {e}")))?;

        let (page_size,): (i64,) = sqlx::query_as("PRAGMA page_size")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| EkoError::Memory(format!("pragma failed: {e}")))?;

        Ok((page_count * page_size) as u64)
    }

    /// Count live (non-deleted) rows.
    pub async fn stats(&self) -> Result<StoreStats, EkoError> {
        let (users, chats, messages): (i64, i64, i64) = sqlx::query_as(
            "SELECT \
             (SELECT COUNT(*) FROM users WHERE is_deleted = 0), \
             (SELECT COUNT(*) FROM chats WHERE is_deleted = 0), \
             (SELECT COUNT(*) FROM messages WHERE is_deleted = 0)",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| EkoError::Memory(format!("stats query failed: {e}")))?;

        Ok(StoreStats {
            users,
            chats,
            messages,
        })
    }

    /// Run SQL migrations, tracking which have already been applied.
    async fn run_migrations(pool: &SqlitePool) -> Result<(), EkoError> {
        sqlx::raw_sql(
            "CREATE TABLE IF NOT EXISTS _migrations (
                name TEXT PRIMARY KEY,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            );",
        )
        .execute(pool)
        .await
        .map_err(|e| EkoError::Memory(format!("failed to create migrations table: {e}")))?;

        let migrations: &[(&str, &str)] =
            &[("001_init", include_str!("../../migrations/001_init.sql"))];

        for (name, sql) in migrations {
            let applied: Option<(String,)> =
                sqlx::query_as("SELECT name FROM _migrations WHERE name = ?")
                    .bind(name)
                    .fetch_optional(pool)
                    .await
                    .map_err(|e| {
                        EkoError::Memory(format!("failed to check migration {name}: {e}"))
                    })?;

            if applied.is_some() {
                continue;
            }

            sqlx::raw_sql(sql)
                .execute(pool)
                .await
                .map_err(|e| EkoError::Memory(format!("migration {name} failed: {e}")))?;

            sqlx::query("INSERT INTO _migrations (name) VALUES (?)")
                .bind(name)
                .execute(pool)
                .await
                .map_err(|e| {
                    EkoError::Memory(format!("failed to record migration {name}: {e}"))
                })?;
        }
        Ok(())
    }
}

/// Fixed-width RFC 3339 so stored timestamps sort as text.
pub(crate) fn format_ts(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_ts(raw: &str) -> Result<DateTime<Utc>, EkoError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| EkoError::Memory(format!("bad timestamp '{raw}': {e}")))
}

/// Current time truncated to what the store keeps.
pub(crate) fn now() -> Result<DateTime<Utc>, EkoError> {
    parse_ts(&format_ts(&Utc::now()))
}

#[cfg(test)]
mod tests;
