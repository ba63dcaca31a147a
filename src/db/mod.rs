/// Database module with track item queries and migrations.
mod migrations;
mod track_items;

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

pub use track_items::create_track_item;

/// Opens (or creates) the SQLite database and runs migrations.
pub fn init(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    migrations::run_migrations(&conn)?;
    Ok(conn)
}

/// Opens an existing database for a background reader.
pub fn open(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    Ok(conn)
}
