/// Track item database queries.
use anyhow::Result;
use chrono::{DateTime, Local, SecondsFormat, Utc};
use rusqlite::{Connection, params};

use crate::engine::{DeletionStore, RecordSource};
use crate::types::{
    OnlineState, TrackItem, TrackItemBatch, TrackItemId, TrackItemKind, TrackItemType,
    parse_timestamp,
};

/// Timestamps are stored as UTC RFC 3339 with fixed precision so text order is time order.
fn to_db_timestamp(dt: DateTime<Local>) -> String {
    dt.with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

struct TrackItemRow {
    id: TrackItemId,
    kind: String,
    app: Option<String>,
    title: Option<String>,
    begin_date: String,
    end_date: String,
}

impl TrackItemRow {
    fn into_track_item(self) -> Result<TrackItem> {
        let item_type = TrackItemType::parse(&self.kind)
            .ok_or_else(|| anyhow::anyhow!("Unknown track item kind '{}'", self.kind))?;
        let kind = match item_type {
            TrackItemType::App => TrackItemKind::App {
                app: self.app.unwrap_or_default(),
                title: self.title.unwrap_or_default(),
            },
            TrackItemType::Status => {
                let raw = self.app.unwrap_or_default();
                let state = OnlineState::parse(&raw)
                    .ok_or_else(|| anyhow::anyhow!("Unknown status '{raw}'"))?;
                TrackItemKind::Status { state }
            }
            TrackItemType::Log => TrackItemKind::Log {
                title: self.title.unwrap_or_default(),
            },
        };
        Ok(TrackItem {
            id: self.id,
            kind,
            begin_date: parse_timestamp(&self.begin_date)?,
            end_date: parse_timestamp(&self.end_date)?,
        })
    }
}

/// Items overlapping `[from, to]`, split by type.
pub fn query_track_items(
    from: DateTime<Local>,
    to: DateTime<Local>,
    conn: &Connection,
) -> Result<TrackItemBatch> {
    let mut stmt = conn.prepare(
        "SELECT id, kind, app, title, begin_date, end_date FROM track_items
         WHERE begin_date <= ?2 AND end_date >= ?1
         ORDER BY begin_date",
    )?;
    let rows = stmt.query_map([to_db_timestamp(from), to_db_timestamp(to)], |row| {
        Ok(TrackItemRow {
            id: row.get(0)?,
            kind: row.get(1)?,
            app: row.get(2)?,
            title: row.get(3)?,
            begin_date: row.get(4)?,
            end_date: row.get(5)?,
        })
    })?;
    let mut batch = TrackItemBatch::default();
    for row in rows {
        let row = row?;
        let id = row.id;
        match row.into_track_item() {
            Ok(item) => batch.push(item),
            Err(err) => log::warn!("Skipping unreadable track item {id}: {err:#}"),
        }
    }
    Ok(batch)
}

pub fn create_track_item(
    kind: TrackItemKind,
    begin_date: DateTime<Local>,
    end_date: DateTime<Local>,
    conn: &Connection,
) -> Result<TrackItemId> {
    let (item_type, app, title) = match kind {
        TrackItemKind::App { app, title } => (TrackItemType::App, Some(app), Some(title)),
        TrackItemKind::Status { state } => {
            (TrackItemType::Status, Some(state.as_str().to_string()), None)
        }
        TrackItemKind::Log { title } => (TrackItemType::Log, None, Some(title)),
    };
    conn.execute(
        "INSERT INTO track_items (kind, app, title, begin_date, end_date) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            item_type.as_str(),
            app,
            title,
            to_db_timestamp(begin_date),
            to_db_timestamp(end_date),
        ],
    )?;
    Ok(conn.last_insert_rowid() as TrackItemId)
}

/// Deletes all `ids` in one transaction. Returns how many rows were removed.
pub fn delete_track_items(ids: &[TrackItemId], conn: &Connection) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut removed = 0;
    {
        let mut stmt = tx.prepare("DELETE FROM track_items WHERE id = ?1")?;
        for id in ids {
            removed += stmt.execute([id])?;
        }
    }
    tx.commit()?;
    if removed < ids.len() {
        log::debug!("{} of {} track items were already gone", ids.len() - removed, ids.len());
    }
    Ok(removed)
}

impl RecordSource for Connection {
    fn fetch_records(&self, begin: DateTime<Local>, end: DateTime<Local>) -> Result<TrackItemBatch> {
        query_track_items(begin, end, self)
    }
}

impl DeletionStore for Connection {
    fn delete_by_ids(&self, ids: &[TrackItemId]) -> Result<()> {
        delete_track_items(ids, self)?;
        Ok(())
    }
}
