use std::path::PathBuf;

use chrono::{DateTime, Days, Local, Months, NaiveDate};
use crossterm::event::KeyCode;
use rusqlite::Connection;

use crate::db;
use crate::engine::summary::{day_range, summary_range};
use crate::engine::table::{COLUMNS, TableView, parse_filter};
use crate::engine::{
    CalendarSummary, Column, DeleteError, FilterDropdown, Loader, RecordSource, SummaryMemo,
    SummaryMode, TableViewState, delete_selected,
};
use crate::types::TrackItemBatch;

use super::{AppEvent, AppView, Navigator, TABS, select_calendar_cell};

type TimeRange = (DateTime<Local>, DateTime<Local>);

/// The top-level application state.
pub struct App {
    pub running: bool,
    pub db: Connection,
    db_path: PathBuf,
    pub view: AppView,
    view_history: Vec<AppView>,
    pub status: Option<String>,
    pub selected_tab_index: usize,
    pub calendar_date: NaiveDate,
    pub calendar_mode: SummaryMode,
    calendar_batch: TrackItemBatch,
    calendar_generation: u64,
    summary_memo: SummaryMemo,
    calendar_loader: Loader<(SummaryMode, NaiveDate)>,
    pub table: TableViewState,
    pub table_range: TimeRange,
    pub table_batch: TrackItemBatch,
    table_loader: Loader<TimeRange>,
    pub selected_row_index: usize,
    pub selected_column_index: usize,
    pub search_active: bool,
}

impl App {
    pub fn new(db: Connection, db_path: PathBuf, page_size: usize) -> Self {
        let today = Local::now().date_naive();
        let mut app = Self {
            running: true,
            db,
            db_path,
            view: AppView::Calendar,
            view_history: Vec::new(),
            status: None,
            selected_tab_index: 0,
            calendar_date: today,
            calendar_mode: SummaryMode::Day,
            calendar_batch: TrackItemBatch::default(),
            calendar_generation: 0,
            summary_memo: SummaryMemo::default(),
            calendar_loader: Loader::default(),
            table: TableViewState::default().with_page_size(page_size),
            table_range: day_range(today),
            table_batch: TrackItemBatch::default(),
            table_loader: Loader::default(),
            selected_row_index: 0,
            selected_column_index: 0,
            search_active: false,
        };
        app.load_calendar(true);
        app.load_table(true);
        app.refresh_summary();
        app
    }

    /// Central update function - process an event and mutate state.
    pub fn update(&mut self, event: AppEvent) {
        match event {
            AppEvent::Tick => {}
            AppEvent::KeyPress(key) => self.handle_key(key),
        }
        self.poll_loaders();
        self.refresh_summary();
    }

    /// Summary of the displayed month or year.
    pub fn calendar_summary(&self) -> &CalendarSummary {
        self.summary_memo.summary()
    }

    pub fn table_view(&self) -> TableView<'_> {
        self.table.view(self.table_batch.iter())
    }

    pub fn selected_column(&self) -> Column {
        COLUMNS[self.selected_column_index].column
    }

    pub fn is_loading(&self) -> bool {
        self.calendar_loader.is_loading() || self.table_loader.is_loading()
    }

    fn handle_key(&mut self, key: KeyCode) {
        if matches!(self.table.dropdown, FilterDropdown::Open { .. }) {
            self.handle_dropdown_key(key);
            return;
        }
        if self.search_active {
            self.handle_search_key(key);
            return;
        }

        match key {
            KeyCode::Char('q') => self.running = false,
            KeyCode::Char('?') => {
                if self.view == AppView::Help {
                    self.go_back();
                } else {
                    self.navigate_to(AppView::Help);
                }
            }
            KeyCode::Tab => {
                self.selected_tab_index = (self.selected_tab_index + 1) % TABS.len();
                self.navigate_to(TABS[self.selected_tab_index].clone());
            }
            KeyCode::Esc => self.go_back(),
            KeyCode::Char('r') => {
                self.load_calendar(true);
                self.load_table(true);
            }
            _ => match self.view {
                AppView::Calendar => self.handle_calendar_key(key),
                AppView::Search => self.handle_table_key(key),
                AppView::Help => {}
            },
        }
    }

    fn handle_calendar_key(&mut self, key: KeyCode) {
        let date = self.calendar_date;
        let moved = match (self.calendar_mode, key) {
            (SummaryMode::Day, KeyCode::Left) => date.checked_sub_days(Days::new(1)),
            (SummaryMode::Day, KeyCode::Right) => date.checked_add_days(Days::new(1)),
            (SummaryMode::Day, KeyCode::Up) => date.checked_sub_days(Days::new(7)),
            (SummaryMode::Day, KeyCode::Down) => date.checked_add_days(Days::new(7)),
            (SummaryMode::Day, KeyCode::PageUp) => date.checked_sub_months(Months::new(1)),
            (SummaryMode::Day, KeyCode::PageDown) => date.checked_add_months(Months::new(1)),
            (SummaryMode::Month, KeyCode::Left) => date.checked_sub_months(Months::new(1)),
            (SummaryMode::Month, KeyCode::Right) => date.checked_add_months(Months::new(1)),
            (SummaryMode::Month, KeyCode::Up) => date.checked_sub_months(Months::new(3)),
            (SummaryMode::Month, KeyCode::Down) => date.checked_add_months(Months::new(3)),
            (SummaryMode::Month, KeyCode::PageUp) => date.checked_sub_months(Months::new(12)),
            (SummaryMode::Month, KeyCode::PageDown) => date.checked_add_months(Months::new(12)),
            (_, KeyCode::Char('t')) => Some(Local::now().date_naive()),
            (_, KeyCode::Char('m')) => {
                self.calendar_mode = self.calendar_mode.toggle();
                self.load_calendar(false);
                None
            }
            (mode, KeyCode::Enter) => {
                if !select_calendar_cell(self, mode, date) {
                    // A month cell opens that month's days instead.
                    self.calendar_mode = SummaryMode::Day;
                    self.load_calendar(false);
                }
                None
            }
            _ => None,
        };
        if let Some(moved) = moved {
            self.calendar_date = moved;
            self.load_calendar(false);
        }
    }

    fn handle_table_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Up => {
                self.selected_row_index = self.selected_row_index.saturating_sub(1);
            }
            KeyCode::Down => {
                let rows = self.table_view().rows.len();
                if self.selected_row_index + 1 < rows {
                    self.selected_row_index += 1;
                }
            }
            KeyCode::Left => {
                if self.selected_column_index == 0 {
                    self.selected_column_index = COLUMNS.len() - 1;
                } else {
                    self.selected_column_index -= 1;
                }
            }
            KeyCode::Right => {
                self.selected_column_index = (self.selected_column_index + 1) % COLUMNS.len();
            }
            KeyCode::Char(' ') => {
                let id = self.table_view().rows.get(self.selected_row_index).map(|item| item.id);
                if let Some(id) = id {
                    self.update_table(|table| table.toggle_row(id));
                }
            }
            KeyCode::Char('a') => {
                let page_ids = self
                    .table_view()
                    .rows
                    .iter()
                    .map(|item| item.id)
                    .collect::<Vec<_>>();
                let all_selected = !page_ids.is_empty()
                    && page_ids.iter().all(|id| self.table.is_selected(*id));
                let mut selection = self.table.selected_ids.clone();
                if all_selected {
                    selection.retain(|id| !page_ids.contains(id));
                } else {
                    for id in page_ids {
                        if !selection.contains(&id) {
                            selection.push(id);
                        }
                    }
                }
                self.update_table(|table| table.with_selection(selection));
            }
            KeyCode::Char('s') => {
                let column = self.selected_column();
                self.update_table(|table| table.toggle_sort(column));
            }
            KeyCode::Char('f') => {
                let column = self.selected_column();
                if column.descriptor().filter.is_some() {
                    self.update_table(|table| table.open_dropdown(column));
                    self.clear_status();
                } else {
                    self.status = Some(format!("{} cannot be filtered.", column.descriptor().title));
                }
            }
            KeyCode::Char('/') => {
                self.search_active = true;
                self.clear_status();
            }
            KeyCode::Char('[') => {
                let page_count = self.table_view().page_count;
                self.update_table(|table| table.prev_page(page_count));
                self.selected_row_index = 0;
            }
            KeyCode::Char(']') => {
                let page_count = self.table_view().page_count;
                self.update_table(|table| table.next_page(page_count));
                self.selected_row_index = 0;
            }
            KeyCode::Char('p') => {
                self.update_table(TableViewState::cycle_page_size);
                self.selected_row_index = 0;
            }
            KeyCode::Char('d') => self.delete_selected_rows(),
            KeyCode::Char('x') => {
                self.update_table(TableViewState::reset);
                self.selected_row_index = 0;
                self.clear_status();
            }
            _ => {}
        }
    }

    fn handle_dropdown_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => self.update_table(TableViewState::cancel_dropdown),
            KeyCode::Enter => {
                let FilterDropdown::Open { column, draft, .. } = &self.table.dropdown else {
                    return;
                };
                match parse_filter(*column, draft) {
                    Ok(filter) => {
                        self.update_table(|table| table.apply_dropdown(filter));
                        self.selected_row_index = 0;
                        self.clear_status();
                    }
                    Err(err) => self.status = Some(format!("{err}")),
                }
            }
            KeyCode::Backspace | KeyCode::Delete => {
                self.update_table(|table| {
                    table.edit_dropdown(|draft| {
                        draft.pop();
                    })
                });
            }
            KeyCode::Char(ch) => {
                if ch.is_control() {
                    return;
                }
                self.update_table(|table| table.edit_dropdown(|draft| draft.push(ch)));
            }
            _ => {}
        }
    }

    fn handle_search_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.search_active = false;
                self.update_table(|table| table.with_search(""));
                self.selected_row_index = 0;
            }
            KeyCode::Enter => self.search_active = false,
            KeyCode::Backspace | KeyCode::Delete => {
                let mut text = self.table.search_text.clone();
                text.pop();
                self.update_table(|table| table.with_search(text));
                self.selected_row_index = 0;
            }
            KeyCode::Char(ch) => {
                if ch.is_control() {
                    return;
                }
                let mut text = self.table.search_text.clone();
                text.push(ch);
                self.update_table(|table| table.with_search(text));
                self.selected_row_index = 0;
            }
            _ => {}
        }
    }

    fn update_table(&mut self, transition: impl FnOnce(TableViewState) -> TableViewState) {
        self.table = transition(std::mem::take(&mut self.table));
    }

    fn navigate_to(&mut self, view: AppView) {
        if self.view != view {
            self.view_history.push(self.view.clone());
            self.view = view;
            if let Some(index) = TABS.iter().position(|tab| *tab == self.view) {
                self.selected_tab_index = index;
            }
        }
    }

    fn go_back(&mut self) {
        if let Some(prev_view) = self.view_history.pop() {
            self.view = prev_view;
            if let Some(index) = TABS.iter().position(|tab| *tab == self.view) {
                self.selected_tab_index = index;
            }
        }
        self.clear_status();
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    fn load_calendar(&mut self, force: bool) {
        let (begin, end) = summary_range(self.calendar_mode, self.calendar_date);
        let params = (self.calendar_mode, begin.date_naive());
        if !force && self.calendar_loader.latest_params() == Some(&params) {
            return;
        }
        let db_path = self.db_path.clone();
        self.calendar_loader.spawn(params, move || {
            let conn = db::open(&db_path)?;
            conn.fetch_records(begin, end)
        });
    }

    fn load_table(&mut self, force: bool) {
        let (begin, end) = self.table_range;
        if !force && self.table_loader.latest_params() == Some(&self.table_range) {
            return;
        }
        let db_path = self.db_path.clone();
        self.table_loader.spawn(self.table_range, move || {
            let conn = db::open(&db_path)?;
            conn.fetch_records(begin, end)
        });
    }

    fn poll_loaders(&mut self) {
        if let Some((params, result)) = self.calendar_loader.poll() {
            match result {
                Ok(batch) => {
                    log::debug!("Calendar loaded {} track items for {params:?}", batch.len());
                    self.calendar_batch = batch;
                    self.calendar_generation += 1;
                }
                Err(err) => {
                    log::error!("Loading calendar for {params:?} failed: {err:#}");
                    self.status = Some(format!("Loading calendar failed: {err}"));
                }
            }
        }
        if let Some((params, result)) = self.table_loader.poll() {
            match result {
                Ok(batch) => {
                    log::debug!("Table loaded {} track items for {params:?}", batch.len());
                    self.table_batch = batch;
                    self.clamp_row_index();
                }
                Err(err) => {
                    log::error!("Loading track items for {params:?} failed: {err:#}");
                    self.status = Some(format!("Loading track items failed: {err}"));
                }
            }
        }
    }

    fn refresh_summary(&mut self) {
        self.summary_memo.get(
            self.calendar_generation,
            self.calendar_mode,
            self.calendar_date,
            self.calendar_batch.iter(),
        );
    }

    /// Keeps the stored page and the cursor inside the rows after they changed.
    fn clamp_row_index(&mut self) {
        let page_count = self.table_view().page_count;
        self.update_table(|table| table.clamp_page(page_count));
        let rows = self.table_view().rows.len();
        self.selected_row_index = self.selected_row_index.min(rows.saturating_sub(1));
    }

    fn delete_selected_rows(&mut self) {
        match delete_selected(&self.db, &self.table, &self.table_batch) {
            Ok(deleted) => {
                self.status = Some(format!("Deleted {} track items.", deleted.ids.len()));
                self.calendar_batch.remove_ids(&deleted.ids);
                self.calendar_generation += 1;
                self.table = deleted.state;
                self.table_batch = deleted.batch;
                self.clamp_row_index();
                self.load_calendar(true);
                self.load_table(true);
            }
            Err(DeleteError::EmptySelection) => {
                self.status = Some("No track items selected.".to_string());
            }
            Err(err) => self.status = Some(err.to_string()),
        }
    }
}

impl Navigator for App {
    fn open_timerange(&mut self, begin: DateTime<Local>, end: DateTime<Local>) {
        log::debug!("Opening track items from {begin} to {end}");
        self.table_range = (begin, end);
        self.update_table(|table| table.with_selection(Vec::new()).with_page(0));
        self.selected_row_index = 0;
        self.load_table(false);
        self.navigate_to(AppView::Search);
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::types::TrackItemKind;
    use crate::types::tests::local;

    fn app_with_items() -> (tempfile::TempDir, App) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("trackview.db");
        let conn = db::init(&db_path).unwrap();
        for (app, title, begin, end) in [
            ("code", "main.rs", local(2024, 3, 4, 9, 0), local(2024, 3, 4, 10, 0)),
            ("browser", "docs", local(2024, 3, 4, 10, 0), local(2024, 3, 4, 10, 30)),
            ("code", "lib.rs", local(2024, 3, 5, 9, 0), local(2024, 3, 5, 9, 15)),
        ] {
            let kind = TrackItemKind::App {
                app: app.to_string(),
                title: title.to_string(),
            };
            db::create_track_item(kind, begin, end, &conn).unwrap();
        }
        let mut app = App::new(conn, db_path, 50);
        app.calendar_date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        app.load_calendar(false);
        wait_for_loads(&mut app);
        (dir, app)
    }

    fn wait_for_loads(app: &mut App) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while app.is_loading() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
            app.update(AppEvent::Tick);
        }
        assert!(!app.is_loading(), "loads did not finish");
    }

    fn press(app: &mut App, keys: &[KeyCode]) {
        for key in keys {
            app.update(AppEvent::KeyPress(*key));
        }
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.update(AppEvent::KeyPress(KeyCode::Char(ch)));
        }
    }

    fn app_with_many_items(count: u32) -> (tempfile::TempDir, App) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("trackview.db");
        let conn = db::init(&db_path).unwrap();
        let begin = local(2024, 3, 4, 9, 0);
        for index in 0..count {
            let kind = TrackItemKind::App {
                app: "code".to_string(),
                title: format!("file {index}"),
            };
            db::create_track_item(kind, begin, begin + chrono::Duration::minutes(1), &conn).unwrap();
        }
        let mut app = App::new(conn, db_path, 50);
        app.open_timerange(local(2024, 3, 4, 0, 0), local(2024, 3, 4, 23, 59));
        wait_for_loads(&mut app);
        (dir, app)
    }

    #[test]
    fn select_page_keeps_rows_selected_on_other_pages() {
        let (_dir, mut app) = app_with_many_items(60);
        press(&mut app, &[KeyCode::Char(' ')]);
        let first = app.table.selected_ids.clone();
        assert_eq!(first.len(), 1);

        press(&mut app, &[KeyCode::Char(']'), KeyCode::Char('a')]);
        assert_eq!(app.table_view().page, 1);
        assert_eq!(app.table.selected_ids.len(), 11);
        assert!(app.table.is_selected(first[0]));

        // Second press unselects only this page
        press(&mut app, &[KeyCode::Char('a')]);
        assert_eq!(app.table.selected_ids, first);
    }

    #[test]
    fn shrinking_rows_pulls_page_back() {
        let (_dir, mut app) = app_with_many_items(60);
        press(&mut app, &[KeyCode::Char(']'), KeyCode::Char('a'), KeyCode::Char('d')]);
        assert_eq!(app.status.as_deref(), Some("Deleted 10 track items."));
        assert_eq!(app.table.pagination.page, 0);
        wait_for_loads(&mut app);
        assert_eq!(app.table_view().rows.len(), 50);
        assert_eq!(app.table.pagination.page, 0);
    }

    #[test]
    fn calendar_summarises_loaded_month() {
        let (_dir, app) = app_with_items();
        let summary = app.calendar_summary();
        assert_eq!(summary.worked_for(4), Some(chrono::Duration::minutes(90)));
        assert_eq!(summary.worked_for(5), Some(chrono::Duration::minutes(15)));
    }

    #[test]
    fn enter_on_day_opens_table_for_that_day() {
        let (_dir, mut app) = app_with_items();
        press(&mut app, &[KeyCode::Enter]);
        assert_eq!(app.view, AppView::Search);
        assert_eq!(app.table_range.0, local(2024, 3, 4, 0, 0));
        wait_for_loads(&mut app);
        assert_eq!(app.table_view().rows.len(), 2);
    }

    #[test]
    fn enter_in_month_mode_drills_down_without_navigating() {
        let (_dir, mut app) = app_with_items();
        press(&mut app, &[KeyCode::Char('m'), KeyCode::Enter]);
        assert_eq!(app.view, AppView::Calendar);
        assert_eq!(app.calendar_mode, SummaryMode::Day);
    }

    #[test]
    fn deleting_selected_rows_updates_table_and_calendar() {
        let (_dir, mut app) = app_with_items();
        press(&mut app, &[KeyCode::Enter]);
        wait_for_loads(&mut app);

        press(&mut app, &[KeyCode::Char(' '), KeyCode::Char('d')]);
        assert_eq!(app.status.as_deref(), Some("Deleted 1 track items."));
        assert!(app.table.selected_ids.is_empty());
        assert_eq!(app.table_view().rows.len(), 1);
        wait_for_loads(&mut app);
        assert_eq!(app.table_view().rows.len(), 1);
        assert_eq!(
            app.calendar_summary().worked_for(4),
            Some(chrono::Duration::minutes(30))
        );
    }

    #[test]
    fn delete_without_selection_keeps_rows() {
        let (_dir, mut app) = app_with_items();
        press(&mut app, &[KeyCode::Enter]);
        wait_for_loads(&mut app);

        press(&mut app, &[KeyCode::Char('d')]);
        assert_eq!(app.status.as_deref(), Some("No track items selected."));
        assert_eq!(app.table_view().rows.len(), 2);
    }

    #[test]
    fn filter_dropdown_applies_and_rejects_bad_input() {
        let (_dir, mut app) = app_with_items();
        press(&mut app, &[KeyCode::Enter]);
        wait_for_loads(&mut app);

        press(&mut app, &[KeyCode::Char('f')]);
        type_text(&mut app, "code");
        press(&mut app, &[KeyCode::Enter]);
        assert_eq!(app.table.dropdown, FilterDropdown::Closed);
        assert_eq!(app.table_view().rows.len(), 1);

        // Begin column
        press(&mut app, &[KeyCode::Right, KeyCode::Right, KeyCode::Char('f')]);
        type_text(&mut app, "soon");
        press(&mut app, &[KeyCode::Enter]);
        assert!(matches!(app.table.dropdown, FilterDropdown::Open { .. }));
        assert!(app.status.is_some());
        press(&mut app, &[KeyCode::Esc]);
        assert_eq!(app.table.dropdown, FilterDropdown::Closed);
    }

    #[test]
    fn search_input_filters_while_typing() {
        let (_dir, mut app) = app_with_items();
        press(&mut app, &[KeyCode::Enter]);
        wait_for_loads(&mut app);

        press(&mut app, &[KeyCode::Char('/')]);
        type_text(&mut app, "DOC");
        assert_eq!(app.table_view().rows.len(), 1);
        // typed 'q' must not quit
        type_text(&mut app, "q");
        assert!(app.running);
        press(&mut app, &[KeyCode::Esc]);
        assert!(!app.search_active);
        assert_eq!(app.table_view().rows.len(), 2);
    }
}
