//! Database module for SQLite persistence.
//!
//! Every collection lives in its own named slot: one row per slot holding the
//! JSON document and a version used for compare-and-swap writes.

mod slot_store;
mod store;

pub use slot_store::*;
pub use store::*;

use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};

use crate::errors::AppError;

/// Open the slot database at `db_path`, creating the file and its parent
/// directories on first use.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, AppError> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            AppError::Database(format!(
                "Cannot create data directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    // WAL lets a second client read while another holds the write lock
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;
    tracing::debug!(path = %db_path.display(), "Slot database ready");

    Ok(pool)
}

/// Create the `slots` table.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS slots (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            version INTEGER NOT NULL DEFAULT 1,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_creates_nested_directories() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("a").join("b").join("chazu.sqlite");

        let pool = init_database(&db_path).await.unwrap();
        assert!(db_path.exists());

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM slots")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count.0, 0);
    }

    #[tokio::test]
    async fn test_init_reports_unusable_data_directory() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();

        let err = init_database(&blocker.join("data").join("chazu.sqlite"))
            .await
            .unwrap_err();
        match err {
            AppError::Database(message) => assert!(message.contains("Cannot create data directory")),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
