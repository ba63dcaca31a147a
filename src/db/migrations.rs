/// Database migrations and schema management.
use anyhow::Result;
use rusqlite::Connection;

/// Creates the initial schema if it doesn't exist yet.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS track_items (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            kind        TEXT    NOT NULL,
            app         TEXT,
            title       TEXT,
            begin_date  TEXT    NOT NULL,
            end_date    TEXT    NOT NULL
        );
        ",
    )?;
    migrate_add_begin_index(conn)?;
    Ok(())
}

fn migrate_add_begin_index(conn: &Connection) -> Result<()> {
    let mut stmt = conn.prepare("PRAGMA index_list(track_items)")?;
    let rows = stmt.query_map([], |row| {
        let name: String = row.get(1)?;
        Ok(name)
    })?;
    for row in rows {
        if row? == "idx_track_items_begin" {
            return Ok(());
        }
    }

    conn.execute(
        "CREATE INDEX idx_track_items_begin ON track_items (begin_date)",
        [],
    )?;
    Ok(())
}
