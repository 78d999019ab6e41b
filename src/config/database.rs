//! Database configuration for the storage collaborator.
//!
//! This module handles `SQLite` connection setup and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs without hand-written SQL.

use crate::entities::StoredRecord;
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use std::path::Path;

/// Default local database, created on first use.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/bill_splitter.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable, falling
/// back to [`DEFAULT_DATABASE_URL`].
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Returns the file path of a `sqlite://` URL, or `None` for in-memory and
/// non-`SQLite` URLs.
#[must_use]
pub fn sqlite_file_path(url: &str) -> Option<&Path> {
    let rest = url.strip_prefix("sqlite://").or_else(|| url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() || path.contains(":memory:") {
        None
    } else {
        Some(Path::new(path))
    }
}

/// Establishes a connection to the database at `database_url`.
///
/// For file-backed `SQLite` the parent directory is created first so a fresh
/// checkout can start without setup.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    if let Some(parent) = sqlite_file_path(database_url).and_then(Path::parent)
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    tracing::debug!("Connecting to database at {}", database_url);
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all tables that do not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut stored_record_table = schema.create_table_from_entity(StoredRecord);
    stored_record_table.if_not_exists();

    db.execute(builder.build(&stored_record_table)).await?;

    Ok(())
}
