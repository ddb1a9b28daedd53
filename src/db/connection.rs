use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::info;

/// Open (or create) the SQLite file at `path` and make sure the `coffee`
/// table exists. Missing parent directories are created first.
pub fn open_database(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }

    let conn = Connection::open(path)
        .with_context(|| format!("failed to open SQLite database at {}", path.display()))?;
    ensure_schema(&conn)?;

    info!(path = %path.display(), "opened coffee database");
    Ok(conn)
}

/// Run the lazy migration. The `CHECK` clauses mirror the form validation so a
/// row with blank text or a textual price can never land in the table, even
/// if something other than this application writes to it.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS coffee (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL CHECK (length(trim(name)) > 0),
            roasting TEXT NOT NULL CHECK (length(trim(roasting)) > 0),
            type TEXT NOT NULL CHECK (length(trim(type)) > 0),
            description TEXT NOT NULL CHECK (length(trim(description)) > 0),
            cost REAL NOT NULL CHECK (typeof(cost) = 'real' AND cost >= 0),
            volume REAL NOT NULL CHECK (typeof(volume) = 'real')
        )",
        [],
    )
    .context("failed to create coffee table")?;

    Ok(())
}
