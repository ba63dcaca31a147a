/// CLI argument parsing and command handling.
use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use rusqlite::Connection;

use crate::config::Config;
use crate::engine::summary::{day_range, summary_range};
use crate::engine::table::parse_filter;
use crate::engine::{
    Column, ColumnFilter, DeleteError, RecordSource, SummaryMode, TableViewState, delete_selected,
    summarize,
};
use crate::types::{OnlineState, TrackItemBatch, TrackItemId, TrackItemKind, TrackItemType, parse_timestamp, timestamp_format};
use crate::ui::format_duration;
use crate::db;

#[derive(Parser)]
#[command(
    name = "trackview",
    version,
    about = "Trackview - A terminal-based viewer for tracked time"
)]
pub struct Cli {
    /// SQLite database with track items
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,
    /// File diagnostics are appended to
    #[arg(long = "log-file", global = true)]
    pub log_file: Option<PathBuf>,
    /// Table rows per page (50, 100, 300 or 500)
    #[arg(long = "page-size", global = true)]
    pub page_size: Option<usize>,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ModeArg {
    /// Days of one month
    Day,
    /// Months of one year
    Month,
}

impl From<ModeArg> for SummaryMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Day => SummaryMode::Day,
            ModeArg::Month => SummaryMode::Month,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Record a track item
    Add {
        /// app, status or log
        kind: String,
        #[arg(short = 'b', long = "begin")]
        begin: String,
        #[arg(short = 'e', long = "end")]
        end: String,
        #[arg(short = 'a', long = "app")]
        app: Option<String>,
        #[arg(short = 't', long = "title")]
        title: Option<String>,
        /// ONLINE, IDLE or OFFLINE (status items)
        #[arg(short = 's', long = "state")]
        state: Option<String>,
    },
    /// Print track items as a table
    List {
        /// Start of the range (date or timestamp), defaults to today
        #[arg(long)]
        from: Option<String>,
        /// End of the range (date or timestamp), defaults to the end of `from`'s day
        #[arg(long)]
        to: Option<String>,
        #[arg(long)]
        search: Option<String>,
        /// Accepted app values
        #[arg(long = "app")]
        apps: Vec<String>,
        /// Accepted titles
        #[arg(long = "title")]
        titles: Vec<String>,
        /// Only items that begin after this date or timestamp
        #[arg(long = "begin-after")]
        begin_after: Option<String>,
        /// Only items that end after this date or timestamp
        #[arg(long = "end-after")]
        end_after: Option<String>,
        /// app, title, beginDate, endDate or duration
        #[arg(long)]
        sort: Option<String>,
        #[arg(long)]
        desc: bool,
        /// Zero-based page
        #[arg(long, default_value_t = 0)]
        page: usize,
    },
    /// Print worked and online time per day or month
    Summary {
        #[arg(long, value_enum, default_value_t = ModeArg::Day)]
        mode: ModeArg,
        /// Any date inside the month (day mode) or year (month mode)
        #[arg(long)]
        date: Option<String>,
    },
    /// Delete track items by id
    Delete { ids: Vec<TrackItemId> },
}

/// Execute a CLI command.
pub fn run(command: Command, conn: &Connection, config: &Config) -> Result<()> {
    match command {
        Command::Add {
            kind,
            begin,
            end,
            app,
            title,
            state,
        } => handle_add(kind, begin, end, app, title, state, conn)?,
        Command::List {
            from,
            to,
            search,
            apps,
            titles,
            begin_after,
            end_after,
            sort,
            desc,
            page,
        } => {
            let range = parse_range(from, to)?;
            let mut state = TableViewState::default().with_page_size(config.page_size);
            if let Some(text) = search {
                state = state.with_search(text);
            }
            if !apps.is_empty() {
                state = state.with_filter(Column::App, Some(ColumnFilter::Values(apps.into_iter().collect::<BTreeSet<_>>())));
            }
            if !titles.is_empty() {
                state = state.with_filter(Column::Title, Some(ColumnFilter::Values(titles.into_iter().collect::<BTreeSet<_>>())));
            }
            if let Some(value) = begin_after {
                state = state.with_filter(Column::BeginDate, parse_filter(Column::BeginDate, &value)?);
            }
            if let Some(value) = end_after {
                state = state.with_filter(Column::EndDate, parse_filter(Column::EndDate, &value)?);
            }
            if let Some(key) = sort {
                let Some(column) = Column::parse(&key) else {
                    println!("Unknown column '{key}'.");
                    return Ok(());
                };
                state = state.toggle_sort(column);
                if desc {
                    state = state.toggle_sort(column);
                }
            }
            handle_list(range, state.with_page(page), conn)?
        }
        Command::Summary { mode, date } => handle_summary(mode.into(), date, conn)?,
        Command::Delete { ids } => handle_delete(ids, conn)?,
    }
    Ok(())
}

fn handle_add(
    kind: String,
    begin: String,
    end: String,
    app: Option<String>,
    title: Option<String>,
    state: Option<String>,
    conn: &Connection,
) -> Result<()> {
    let Some(item_type) = TrackItemType::parse(&kind) else {
        println!("Unknown kind '{kind}', expected app, status or log.");
        return Ok(());
    };
    let begin_date = parse_timestamp(&begin)?;
    let end_date = parse_timestamp(&end)?;
    if end_date < begin_date {
        println!("End time must not be before the begin time.");
        return Ok(());
    }
    let kind = match item_type {
        TrackItemType::App => {
            let Some(app) = app else {
                println!("App items need --app.");
                return Ok(());
            };
            TrackItemKind::App {
                app,
                title: title.unwrap_or_default(),
            }
        }
        TrackItemType::Status => {
            let raw = state.or(app).unwrap_or_default();
            let Some(state) = OnlineState::parse(&raw) else {
                println!("Status items need --state ONLINE, IDLE or OFFLINE.");
                return Ok(());
            };
            TrackItemKind::Status { state }
        }
        TrackItemType::Log => TrackItemKind::Log {
            title: title.unwrap_or_default(),
        },
    };
    let id = db::create_track_item(kind, begin_date, end_date, conn)?;
    println!("Added {item_type} item {id}.");
    Ok(())
}

fn handle_list(
    (from, to): (DateTime<Local>, DateTime<Local>),
    state: TableViewState,
    conn: &Connection,
) -> Result<()> {
    let batch = conn.fetch_records(from, to)?;
    let view = state.view(batch.iter());
    if view.rows.is_empty() {
        println!("No track items found.");
        return Ok(());
    }
    let format = timestamp_format(from, to);
    for item in &view.rows {
        println!(
            "{:>6}  {:<7} {:<20} {:<19} {:<19} {:>8}  {}",
            item.id,
            item.item_type(),
            item.app().unwrap_or("-"),
            item.begin_date.format(format),
            item.end_date.format(format),
            format_duration(item.duration()),
            item.title().unwrap_or(""),
        );
    }
    println!(
        "Page {}/{}, {} matching items. Total {}",
        view.page + 1,
        view.page_count,
        view.matched,
        format_duration(view.total)
    );
    Ok(())
}

fn handle_summary(mode: SummaryMode, date: Option<String>, conn: &Connection) -> Result<()> {
    let active = match date {
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")?,
        None => Local::now().date_naive(),
    };
    let (begin, end) = summary_range(mode, active);
    let batch: TrackItemBatch = conn.fetch_records(begin, end)?;
    let summary = summarize(batch.iter(), mode, active);
    let keys = summary
        .worked
        .keys()
        .chain(summary.online.keys())
        .copied()
        .collect::<BTreeSet<_>>();
    if keys.is_empty() {
        println!("Nothing tracked.");
        return Ok(());
    }
    for key in keys {
        let label = match mode {
            SummaryMode::Day => format!("{}-{:02}", active.format("%Y-%m"), key),
            SummaryMode::Month => format!("{}-{:02}", active.format("%Y"), key + 1),
        };
        let worked = summary.worked_for(key).map(format_duration).unwrap_or_else(|| "-".to_string());
        let online = summary.online_for(key).map(format_duration).unwrap_or_else(|| "-".to_string());
        println!("{label}  Worked: {worked:>8}  Online: {online:>8}");
    }
    Ok(())
}

fn handle_delete(ids: Vec<TrackItemId>, conn: &Connection) -> Result<()> {
    let state = TableViewState::default().with_selection(ids);
    match delete_selected(conn, &state, &TrackItemBatch::default()) {
        Ok(deleted) => println!("Deleted {} track items.", deleted.ids.len()),
        Err(DeleteError::EmptySelection) => println!("No ids given, nothing deleted."),
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

/// A date means the whole local day; timestamps are taken as given.
fn parse_range(from: Option<String>, to: Option<String>) -> Result<(DateTime<Local>, DateTime<Local>)> {
    let from = match from {
        Some(raw) => parse_bound(&raw)?,
        None => day_range(Local::now().date_naive()),
    };
    let to = match to {
        Some(raw) => parse_bound(&raw)?.1,
        None => day_range(from.0.date_naive()).1,
    };
    Ok((from.0, to))
}

fn parse_bound(raw: &str) -> Result<(DateTime<Local>, DateTime<Local>)> {
    match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
        Ok(date) => Ok(day_range(date)),
        Err(_) => {
            let dt = parse_timestamp(raw)?;
            Ok((dt, dt))
        }
    }
}
