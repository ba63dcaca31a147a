use std::fmt;

use anyhow::Result;
use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone};

pub type TrackItemId = u32;

/// Naive wire timestamps (no offset) are read in local time.
const NAIVE_WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub const TIME_FORMAT: &str = "%H:%M:%S";
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OnlineState {
    Online,
    Idle,
    Offline,
}

impl OnlineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            OnlineState::Online => "ONLINE",
            OnlineState::Idle => "IDLE",
            OnlineState::Offline => "OFFLINE",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ONLINE" => Some(OnlineState::Online),
            "IDLE" => Some(OnlineState::Idle),
            "OFFLINE" => Some(OnlineState::Offline),
            _ => None,
        }
    }
}

/// What a track item recorded. Each kind carries the fields it needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrackItemKind {
    App { app: String, title: String },
    Status { state: OnlineState },
    Log { title: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TrackItemType {
    App,
    Status,
    Log,
}

impl TrackItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackItemType::App => "app",
            TrackItemType::Status => "status",
            TrackItemType::Log => "log",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "app" => Some(TrackItemType::App),
            "status" => Some(TrackItemType::Status),
            "log" => Some(TrackItemType::Log),
            _ => None,
        }
    }
}

impl fmt::Display for TrackItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Summary class a track item's time counts towards on the calendar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CategoryClass {
    Worked,
    Online,
}

///A single recorded interval
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackItem {
    pub id: TrackItemId,
    pub kind: TrackItemKind,
    pub begin_date: DateTime<Local>,
    pub end_date: DateTime<Local>,
}

impl TrackItem {
    pub fn item_type(&self) -> TrackItemType {
        match self.kind {
            TrackItemKind::App { .. } => TrackItemType::App,
            TrackItemKind::Status { .. } => TrackItemType::Status,
            TrackItemKind::Log { .. } => TrackItemType::Log,
        }
    }

    /// Value of the "App" column. Log entries have none.
    pub fn app(&self) -> Option<&str> {
        match &self.kind {
            TrackItemKind::App { app, .. } => Some(app.as_str()),
            TrackItemKind::Status { state } => Some(state.as_str()),
            TrackItemKind::Log { .. } => None,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match &self.kind {
            TrackItemKind::App { title, .. } | TrackItemKind::Log { title } => Some(title.as_str()),
            TrackItemKind::Status { .. } => None,
        }
    }

    pub fn class(&self) -> Option<CategoryClass> {
        match self.kind {
            TrackItemKind::App { .. } | TrackItemKind::Log { .. } => Some(CategoryClass::Worked),
            TrackItemKind::Status {
                state: OnlineState::Online,
            } => Some(CategoryClass::Online),
            TrackItemKind::Status { .. } => None,
        }
    }

    pub fn is_anomalous(&self) -> bool {
        self.end_date < self.begin_date
    }

    /// Elapsed time between begin and end, never negative.
    pub fn duration(&self) -> Duration {
        let elapsed = self.end_date.signed_duration_since(self.begin_date);
        if elapsed < Duration::zero() {
            Duration::zero()
        } else {
            elapsed
        }
    }
}

/// Track items of one fetch, partitioned by type the way the store returns them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrackItemBatch {
    pub app_items: Vec<TrackItem>,
    pub status_items: Vec<TrackItem>,
    pub log_items: Vec<TrackItem>,
}

impl TrackItemBatch {
    pub fn push(&mut self, item: TrackItem) {
        match item.item_type() {
            TrackItemType::App => self.app_items.push(item),
            TrackItemType::Status => self.status_items.push(item),
            TrackItemType::Log => self.log_items.push(item),
        }
    }

    pub fn len(&self) -> usize {
        self.app_items.len() + self.status_items.len() + self.log_items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackItem> {
        self.app_items
            .iter()
            .chain(self.status_items.iter())
            .chain(self.log_items.iter())
    }

    pub fn remove_ids(&mut self, ids: &[TrackItemId]) {
        for items in [
            &mut self.app_items,
            &mut self.status_items,
            &mut self.log_items,
        ] {
            items.retain(|item| !ids.contains(&item.id));
        }
    }
}

impl FromIterator<TrackItem> for TrackItemBatch {
    fn from_iter<I: IntoIterator<Item = TrackItem>>(iter: I) -> Self {
        let mut batch = TrackItemBatch::default();
        for item in iter {
            batch.push(item);
        }
        batch
    }
}

/// Parses a wire timestamp: RFC 3339, or a naive local `YYYY-MM-DDTHH:MM:SS`.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Local>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Local));
    }
    let naive = NaiveDateTime::parse_from_str(raw, NAIVE_WIRE_FORMAT)
        .map_err(|err| anyhow::anyhow!("Invalid timestamp '{raw}': {err}"))?;
    local_from_naive(naive).ok_or_else(|| anyhow::anyhow!("Timestamp '{raw}' does not exist locally"))
}

/// Resolves a naive local time, taking the earlier instant when ambiguous.
pub fn local_from_naive(naive: NaiveDateTime) -> Option<DateTime<Local>> {
    Local.from_local_datetime(&naive).earliest()
}

/// True when both instants fall on the same local calendar day.
pub fn same_day(a: DateTime<Local>, b: DateTime<Local>) -> bool {
    a.date_naive() == b.date_naive()
}

/// Picks the render format for timestamps shown within `[begin, end]`.
pub fn timestamp_format(begin: DateTime<Local>, end: DateTime<Local>) -> &'static str {
    if same_day(begin, end) {
        TIME_FORMAT
    } else {
        DATE_TIME_FORMAT
    }
}
