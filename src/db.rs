//! SQLite pool construction and schema migrations.

use anyhow::Result;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::{path::Path, str::FromStr};

const INIT_SQL: &str = include_str!("../migrations/0001_init.sql");

/// Open a SQLite pool for `database_url`, creating the database file and
/// its parent directory when missing.
pub async fn connect(database_url: &str) -> Result<SqlitePool> {
    if let Some(db_path) = database_url.strip_prefix("sqlite://") {
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
                tracing::info!("Created missing directory {:?}", parent);
            }
        }
    }

    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let db = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;
    Ok(db)
}

/// Run migrations from the embedded SQL, one statement at a time.
pub async fn run_migrations(db: &SqlitePool) -> Result<()> {
    let statements = INIT_SQL
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>();

    tracing::info!("Running {} migration statements...", statements.len());

    for stmt in statements {
        tracing::debug!("Executing migration SQL: {}", stmt);
        sqlx::query(stmt).execute(db).await?;
    }

    Ok(())
}
