/// Calendar summaries: worked and online time bucketed by day or by month.
use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveTime, TimeZone};

use crate::types::{CategoryClass, TrackItem, local_from_naive};

/// Calendar zoom. `Day` shows the days of one month, `Month` the months of one year.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SummaryMode {
    Day,
    Month,
}

impl SummaryMode {
    pub fn toggle(self) -> Self {
        match self {
            SummaryMode::Day => SummaryMode::Month,
            SummaryMode::Month => SummaryMode::Day,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SummaryMode::Day => "Month view",
            SummaryMode::Month => "Year view",
        }
    }
}

/// Bucket key to accumulated duration, one map per category class.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CalendarSummary {
    pub worked: BTreeMap<u32, Duration>,
    pub online: BTreeMap<u32, Duration>,
}

impl CalendarSummary {
    pub fn worked_for(&self, key: u32) -> Option<Duration> {
        self.worked.get(&key).copied()
    }

    pub fn online_for(&self, key: u32) -> Option<Duration> {
        self.online.get(&key).copied()
    }
}

/// Builds a fresh summary for the month (day mode) or year (month mode) containing `active`.
///
/// Each record is credited in full to the bucket of its begin timestamp, even when
/// it runs past the end of that day or month.
pub fn summarize<'a, I>(records: I, mode: SummaryMode, active: NaiveDate) -> CalendarSummary
where
    I: IntoIterator<Item = &'a TrackItem>,
{
    let mut summary = CalendarSummary::default();
    for record in records {
        let Some(class) = record.class() else {
            continue;
        };
        let begin = record.begin_date.date_naive();
        let key = match mode {
            SummaryMode::Day => {
                if begin.year() != active.year() || begin.month() != active.month() {
                    continue;
                }
                begin.day()
            }
            SummaryMode::Month => {
                if begin.year() != active.year() {
                    continue;
                }
                begin.month0()
            }
        };
        if record.is_anomalous() {
            log::warn!(
                "Track item {} ends before it begins ({} < {}), counting zero",
                record.id,
                record.end_date,
                record.begin_date
            );
        }
        let bucket = match class {
            CategoryClass::Worked => &mut summary.worked,
            CategoryClass::Online => &mut summary.online,
        };
        *bucket.entry(key).or_insert_with(Duration::zero) += record.duration();
    }
    summary
}

/// Last summary together with the inputs it was built from.
#[derive(Debug, Default)]
pub struct SummaryMemo {
    key: Option<(u64, SummaryMode, NaiveDate)>,
    summary: CalendarSummary,
}

impl SummaryMemo {
    /// Returns the cached summary when the batch generation, mode and displayed
    /// period are unchanged, otherwise recomputes it from `records`.
    pub fn get<'a, I>(
        &mut self,
        generation: u64,
        mode: SummaryMode,
        active: NaiveDate,
        records: I,
    ) -> &CalendarSummary
    where
        I: IntoIterator<Item = &'a TrackItem>,
    {
        let key = (generation, mode, summary_range(mode, active).0.date_naive());
        if self.key != Some(key) {
            self.summary = summarize(records, mode, active);
            self.key = Some(key);
        }
        &self.summary
    }

    /// Summary from the last `get`, without recomputing.
    pub fn summary(&self) -> &CalendarSummary {
        &self.summary
    }
}

/// Local `[start, end]` range a calendar in `mode` covers around `active`.
pub fn summary_range(mode: SummaryMode, active: NaiveDate) -> (DateTime<Local>, DateTime<Local>) {
    let (first, next_first) = match mode {
        SummaryMode::Day => {
            let first = active.with_day(1).unwrap_or(active);
            (first, first_of_next_month(first))
        }
        SummaryMode::Month => {
            let first = NaiveDate::from_ymd_opt(active.year(), 1, 1).unwrap_or(active);
            let next = NaiveDate::from_ymd_opt(active.year() + 1, 1, 1).unwrap_or(active);
            (first, next)
        }
    };
    let start = start_of_day(first);
    let end = start_of_day(next_first) - Duration::milliseconds(1);
    (start, end)
}

/// Local `[00:00:00.000, 23:59:59.999]` of `date`.
pub fn day_range(date: NaiveDate) -> (DateTime<Local>, DateTime<Local>) {
    let start = start_of_day(date);
    let next = date.succ_opt().unwrap_or(date);
    (start, start_of_day(next) - Duration::milliseconds(1))
}

pub fn start_of_day(date: NaiveDate) -> DateTime<Local> {
    let naive = date.and_time(NaiveTime::MIN);
    match local_from_naive(naive) {
        Some(dt) => dt,
        // Midnight skipped by a DST change; the day starts an hour later.
        None => local_from_naive(naive + Duration::hours(1))
            .unwrap_or_else(|| Local.from_utc_datetime(&naive)),
    }
}

pub fn first_of_next_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}

pub fn days_in_month(date: NaiveDate) -> u32 {
    let first = date.with_day(1).unwrap_or(date);
    first_of_next_month(first)
        .signed_duration_since(first)
        .num_days() as u32
}
