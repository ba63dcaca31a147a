/// Track item table: search, column filters, sorting, pagination and row selection.
///
/// `TableViewState` is a plain value. Every user action is a transition that takes
/// the current state and returns the next one; the rows to show are derived from
/// a state and a record batch with [`TableViewState::view`].
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use anyhow::Result;
use chrono::{DateTime, Duration, Local, NaiveDate};

use crate::engine::summary::start_of_day;
use crate::types::{TrackItem, TrackItemId, parse_timestamp};

pub const PAGE_SIZE_OPTIONS: [usize; 4] = [50, 100, 300, 500];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    App,
    Title,
    BeginDate,
    EndDate,
    Duration,
}

impl Column {
    pub fn descriptor(self) -> &'static ColumnDescriptor {
        match self {
            Column::App => &COLUMNS[0],
            Column::Title => &COLUMNS[1],
            Column::BeginDate => &COLUMNS[2],
            Column::EndDate => &COLUMNS[3],
            Column::Duration => &COLUMNS[4],
        }
    }

    pub fn key(self) -> &'static str {
        self.descriptor().key
    }

    pub fn parse(value: &str) -> Option<Self> {
        COLUMNS
            .iter()
            .find(|descriptor| descriptor.key.eq_ignore_ascii_case(value.trim()))
            .map(|descriptor| descriptor.column)
    }
}

/// How a column can be filtered, if at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterKind {
    /// Value must be one of an accepted set.
    ValueSet,
    /// Timestamp must be strictly after a threshold.
    After,
}

pub struct ColumnDescriptor {
    pub column: Column,
    pub key: &'static str,
    pub title: &'static str,
    pub width: u16,
    pub comparator: fn(&TrackItem, &TrackItem) -> Ordering,
    pub filter: Option<FilterKind>,
}

pub static COLUMNS: [ColumnDescriptor; 5] = [
    ColumnDescriptor {
        column: Column::App,
        key: "app",
        title: "App",
        width: 20,
        comparator: compare_app,
        filter: Some(FilterKind::ValueSet),
    },
    ColumnDescriptor {
        column: Column::Title,
        key: "title",
        title: "Title",
        width: 0,
        comparator: compare_title_length,
        filter: Some(FilterKind::ValueSet),
    },
    ColumnDescriptor {
        column: Column::BeginDate,
        key: "beginDate",
        title: "Begin",
        width: 19,
        comparator: compare_begin,
        filter: Some(FilterKind::After),
    },
    ColumnDescriptor {
        column: Column::EndDate,
        key: "endDate",
        title: "End",
        width: 19,
        comparator: compare_end,
        filter: Some(FilterKind::After),
    },
    ColumnDescriptor {
        column: Column::Duration,
        key: "duration",
        title: "Dur",
        width: 8,
        comparator: compare_duration,
        filter: None,
    },
];

fn compare_app(a: &TrackItem, b: &TrackItem) -> Ordering {
    a.app().unwrap_or("").cmp(b.app().unwrap_or(""))
}

/// Titles order by length only, not by content.
fn compare_title_length(a: &TrackItem, b: &TrackItem) -> Ordering {
    let len = |item: &TrackItem| item.title().map_or(0, |title| title.chars().count());
    len(a).cmp(&len(b))
}

fn compare_begin(a: &TrackItem, b: &TrackItem) -> Ordering {
    a.begin_date.cmp(&b.begin_date)
}

fn compare_end(a: &TrackItem, b: &TrackItem) -> Ordering {
    a.end_date.cmp(&b.end_date)
}

fn compare_duration(a: &TrackItem, b: &TrackItem) -> Ordering {
    a.duration().cmp(&b.duration())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortSpec {
    pub column: Column,
    pub direction: SortDirection,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ColumnFilter {
    Values(BTreeSet<String>),
    After(DateTime<Local>),
}

impl ColumnFilter {
    pub fn kind(&self) -> FilterKind {
        match self {
            ColumnFilter::Values(_) => FilterKind::ValueSet,
            ColumnFilter::After(_) => FilterKind::After,
        }
    }

    pub fn accepts(&self, column: Column, item: &TrackItem) -> bool {
        match (self, column) {
            (ColumnFilter::Values(values), Column::App) => {
                item.app().is_some_and(|app| values.contains(app))
            }
            (ColumnFilter::Values(values), Column::Title) => {
                item.title().is_some_and(|title| values.contains(title))
            }
            (ColumnFilter::After(threshold), Column::BeginDate) => item.begin_date > *threshold,
            (ColumnFilter::After(threshold), Column::EndDate) => item.end_date > *threshold,
            _ => true,
        }
    }

    /// Text shown in the dropdown input when a filter is reopened.
    pub fn draft(&self) -> String {
        match self {
            ColumnFilter::Values(values) => values.iter().cloned().collect::<Vec<_>>().join(", "),
            ColumnFilter::After(threshold) => threshold.to_rfc3339(),
        }
    }
}

/// Parses dropdown input for `column`. Empty input means "no filter".
pub fn parse_filter(column: Column, input: &str) -> Result<Option<ColumnFilter>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    match column.descriptor().filter {
        Some(FilterKind::ValueSet) => {
            let values = input
                .split(',')
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
                .map(str::to_string)
                .collect::<BTreeSet<_>>();
            if values.is_empty() {
                Ok(None)
            } else {
                Ok(Some(ColumnFilter::Values(values)))
            }
        }
        Some(FilterKind::After) => {
            let threshold = match NaiveDate::parse_from_str(input, "%Y-%m-%d") {
                Ok(date) => start_of_day(date),
                Err(_) => parse_timestamp(input)?,
            };
            Ok(Some(ColumnFilter::After(threshold)))
        }
        None => anyhow::bail!("Column '{}' cannot be filtered", column.key()),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub page_size: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: PAGE_SIZE_OPTIONS[0],
        }
    }
}

/// Per-column filter input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterDropdown {
    Closed,
    Open {
        column: Column,
        draft: String,
        focused: bool,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableViewState {
    pub filters: BTreeMap<Column, ColumnFilter>,
    pub sort: Option<SortSpec>,
    pub search_text: String,
    pub selected_ids: Vec<TrackItemId>,
    pub pagination: Pagination,
    pub dropdown: FilterDropdown,
    /// Bumped every time an input takes focus.
    pub focus_count: u64,
}

impl Default for TableViewState {
    fn default() -> Self {
        Self {
            filters: BTreeMap::new(),
            sort: None,
            search_text: String::new(),
            selected_ids: Vec::new(),
            pagination: Pagination::default(),
            dropdown: FilterDropdown::Closed,
            focus_count: 0,
        }
    }
}

/// Rows derived from a state and a batch.
#[derive(Debug)]
pub struct TableView<'a> {
    /// Rows of the current page, in display order.
    pub rows: Vec<&'a TrackItem>,
    /// Rows left after search and filters, before pagination.
    pub matched: usize,
    pub page: usize,
    pub page_count: usize,
    /// Total duration of `rows`.
    pub total: Duration,
}

impl TableViewState {
    pub fn with_page_size(self, page_size: usize) -> Self {
        let page_size = if PAGE_SIZE_OPTIONS.contains(&page_size) {
            page_size
        } else {
            log::warn!("Unsupported page size {page_size}, keeping {}", self.pagination.page_size);
            self.pagination.page_size
        };
        Self {
            pagination: Pagination { page: 0, page_size },
            ..self
        }
    }

    pub fn filter_for(&self, column: Column) -> Option<&ColumnFilter> {
        self.filters.get(&column)
    }

    pub fn with_search(self, text: impl Into<String>) -> Self {
        let search_text = text.into();
        log::debug!("Search text changed: {search_text:?}");
        Self {
            search_text,
            pagination: Pagination {
                page: 0,
                ..self.pagination
            },
            ..self
        }
    }

    /// Sets or clears the filter of one column.
    pub fn with_filter(self, column: Column, filter: Option<ColumnFilter>) -> Self {
        let mut filters = self.filters;
        match filter {
            Some(filter) if column.descriptor().filter == Some(filter.kind()) => {
                filters.insert(column, filter);
            }
            Some(filter) => {
                log::warn!("Filter {filter:?} does not apply to column {}", column.key());
            }
            None => {
                filters.remove(&column);
            }
        }
        log::debug!("Filters changed: {filters:?}");
        Self {
            filters,
            pagination: Pagination {
                page: 0,
                ..self.pagination
            },
            ..self
        }
    }

    /// Cycles `column` through ascending, descending and unsorted.
    pub fn toggle_sort(self, column: Column) -> Self {
        let sort = match self.sort {
            Some(SortSpec {
                column: current,
                direction: SortDirection::Ascending,
            }) if current == column => Some(SortSpec {
                column,
                direction: SortDirection::Descending,
            }),
            Some(SortSpec {
                column: current,
                direction: SortDirection::Descending,
            }) if current == column => None,
            _ => Some(SortSpec {
                column,
                direction: SortDirection::Ascending,
            }),
        };
        log::debug!("Sort changed: {sort:?}");
        Self { sort, ..self }
    }

    /// Replaces the selection with the full new set.
    pub fn with_selection(self, selected_ids: Vec<TrackItemId>) -> Self {
        log::debug!("Selected ids changed: {selected_ids:?}");
        Self {
            selected_ids,
            ..self
        }
    }

    pub fn toggle_row(self, id: TrackItemId) -> Self {
        let mut selected = self.selected_ids.clone();
        if let Some(index) = selected.iter().position(|selected_id| *selected_id == id) {
            selected.remove(index);
        } else {
            selected.push(id);
        }
        self.with_selection(selected)
    }

    pub fn is_selected(&self, id: TrackItemId) -> bool {
        self.selected_ids.contains(&id)
    }

    pub fn with_page(self, page: usize) -> Self {
        log::debug!("Page changed: {page}");
        Self {
            pagination: Pagination {
                page,
                ..self.pagination
            },
            ..self
        }
    }

    pub fn next_page(self, page_count: usize) -> Self {
        let last = page_count.saturating_sub(1);
        let page = (self.pagination.page + 1).min(last);
        self.with_page(page)
    }

    /// Steps back from the page actually shown, also when the stored page ran past the end.
    pub fn prev_page(self, page_count: usize) -> Self {
        let last = page_count.saturating_sub(1);
        let page = self.pagination.page.min(last).saturating_sub(1);
        self.with_page(page)
    }

    /// Pulls a stored page that ran past the end back onto the last page.
    pub fn clamp_page(self, page_count: usize) -> Self {
        let last = page_count.saturating_sub(1);
        if self.pagination.page > last {
            self.with_page(last)
        } else {
            self
        }
    }

    pub fn cycle_page_size(self) -> Self {
        let index = PAGE_SIZE_OPTIONS
            .iter()
            .position(|size| *size == self.pagination.page_size)
            .unwrap_or(0);
        let page_size = PAGE_SIZE_OPTIONS[(index + 1) % PAGE_SIZE_OPTIONS.len()];
        log::debug!("Page size changed: {page_size}");
        Self {
            pagination: Pagination { page: 0, page_size },
            ..self
        }
    }

    /// Opens the filter input of `column` and focuses it, also when it is reopened.
    pub fn open_dropdown(self, column: Column) -> Self {
        let draft = self
            .filter_for(column)
            .map(ColumnFilter::draft)
            .unwrap_or_default();
        Self {
            dropdown: FilterDropdown::Open {
                column,
                draft,
                focused: true,
            },
            focus_count: self.focus_count + 1,
            ..self
        }
    }

    pub fn edit_dropdown(self, edit: impl FnOnce(&mut String)) -> Self {
        match self.dropdown {
            FilterDropdown::Open {
                column,
                mut draft,
                focused,
            } => {
                edit(&mut draft);
                Self {
                    dropdown: FilterDropdown::Open {
                        column,
                        draft,
                        focused,
                    },
                    ..self
                }
            }
            FilterDropdown::Closed => self,
        }
    }

    /// Closes the dropdown and applies `filter` to the column it was open for.
    pub fn apply_dropdown(self, filter: Option<ColumnFilter>) -> Self {
        let FilterDropdown::Open { column, .. } = self.dropdown else {
            return self;
        };
        Self {
            dropdown: FilterDropdown::Closed,
            ..self
        }
        .with_filter(column, filter)
    }

    pub fn cancel_dropdown(self) -> Self {
        Self {
            dropdown: FilterDropdown::Closed,
            ..self
        }
    }

    /// Clears filters, sort and selection.
    pub fn reset(self) -> Self {
        log::debug!("Table view reset");
        Self {
            pagination: Pagination {
                page: 0,
                ..self.pagination
            },
            focus_count: self.focus_count,
            ..Self::default()
        }
    }

    pub fn view<'a, I>(&self, records: I) -> TableView<'a>
    where
        I: IntoIterator<Item = &'a TrackItem>,
    {
        let searched = search(records, &self.search_text);
        let filtered = apply_filters(searched, &self.filters);
        let matched = filtered.len();
        let sorted = apply_sort(filtered, self.sort);

        let page_size = self.pagination.page_size.max(1);
        let page_count = matched.div_ceil(page_size).max(1);
        let page = self.pagination.page.min(page_count - 1);
        let rows = sorted
            .into_iter()
            .skip(page * page_size)
            .take(page_size)
            .collect::<Vec<_>>();
        let total = aggregate_total(rows.iter().copied());
        TableView {
            rows,
            matched,
            page,
            page_count,
            total,
        }
    }
}

/// Case-insensitive substring match over app and title. Empty text matches all.
pub fn search<'a, I>(records: I, text: &str) -> Vec<&'a TrackItem>
where
    I: IntoIterator<Item = &'a TrackItem>,
{
    let needle = text.trim().to_lowercase();
    records
        .into_iter()
        .filter(|item| {
            if needle.is_empty() {
                return true;
            }
            [item.app(), item.title()]
                .into_iter()
                .flatten()
                .any(|value| value.to_lowercase().contains(&needle))
        })
        .collect()
}

pub fn apply_filters<'a, I>(records: I, filters: &BTreeMap<Column, ColumnFilter>) -> Vec<&'a TrackItem>
where
    I: IntoIterator<Item = &'a TrackItem>,
{
    records
        .into_iter()
        .filter(|item| {
            filters
                .iter()
                .all(|(column, filter)| filter.accepts(*column, item))
        })
        .collect()
}

pub fn apply_sort(mut records: Vec<&TrackItem>, sort: Option<SortSpec>) -> Vec<&TrackItem> {
    if let Some(spec) = sort {
        let comparator = spec.column.descriptor().comparator;
        // sort_by is stable, equal rows keep their fetch order.
        records.sort_by(|a, b| match spec.direction {
            SortDirection::Ascending => comparator(a, b),
            SortDirection::Descending => comparator(b, a),
        });
    }
    records
}

pub fn aggregate_total<'a, I>(records: I) -> Duration
where
    I: IntoIterator<Item = &'a TrackItem>,
{
    records
        .into_iter()
        .fold(Duration::zero(), |acc, item| acc + item.duration())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OnlineState;
    use crate::types::tests::{app_item, local, log_item, status_item};

    fn fixture() -> Vec<TrackItem> {
        vec![
            app_item(1, "Code", "bb", local(2024, 4, 2, 9, 0), local(2024, 4, 2, 10, 0)),
            app_item(2, "Browser", "a", local(2024, 4, 2, 10, 0), local(2024, 4, 2, 10, 20)),
            app_item(3, "Code", "ccc", local(2024, 4, 2, 11, 0), local(2024, 4, 2, 11, 5)),
            status_item(4, OnlineState::Online, local(2024, 4, 2, 8, 0), local(2024, 4, 2, 12, 0)),
            log_item(5, "Planning notes", local(2024, 4, 2, 13, 0), local(2024, 4, 2, 13, 30)),
        ]
    }

    fn ids(rows: &[&TrackItem]) -> Vec<TrackItemId> {
        rows.iter().map(|item| item.id).collect()
    }

    #[test]
    fn title_sort_orders_by_length_not_content() {
        let records = vec![
            app_item(1, "x", "bb", local(2024, 4, 2, 9, 0), local(2024, 4, 2, 10, 0)),
            app_item(2, "x", "a", local(2024, 4, 2, 9, 0), local(2024, 4, 2, 10, 0)),
            app_item(3, "x", "ccc", local(2024, 4, 2, 9, 0), local(2024, 4, 2, 10, 0)),
        ];
        let state = TableViewState::default().toggle_sort(Column::Title);
        let titles = state
            .view(&records)
            .rows
            .iter()
            .map(|item| item.title().unwrap_or_default().to_string())
            .collect::<Vec<_>>();
        assert_eq!(titles, vec!["a", "bb", "ccc"]);

        let state = state.toggle_sort(Column::Title);
        assert_eq!(ids(&state.view(&records).rows), vec![3, 1, 2]);

        let longer_but_earlier = vec![
            app_item(1, "x", "zz", local(2024, 4, 2, 9, 0), local(2024, 4, 2, 10, 0)),
            app_item(2, "x", "aaa", local(2024, 4, 2, 9, 0), local(2024, 4, 2, 10, 0)),
        ];
        let state = TableViewState::default().toggle_sort(Column::Title);
        assert_eq!(ids(&state.view(&longer_but_earlier).rows), vec![1, 2]);
    }

    #[test]
    fn app_sort_compares_text_deterministically() {
        // Corrected behavior: app names compare as strings instead of always-equal.
        let records = fixture();
        let state = TableViewState::default().toggle_sort(Column::App);
        let apps = state
            .view(&records)
            .rows
            .iter()
            .map(|item| item.app().unwrap_or("").to_string())
            .collect::<Vec<_>>();
        assert_eq!(apps, vec!["", "Browser", "Code", "Code", "ONLINE"]);
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let records = fixture();
        let state = TableViewState::default().toggle_sort(Column::App);
        let rows = state.view(&records).rows;
        let code_ids = rows
            .iter()
            .filter(|item| item.app() == Some("Code"))
            .map(|item| item.id)
            .collect::<Vec<_>>();
        assert_eq!(code_ids, vec![1, 3]);
    }

    #[test]
    fn date_and_duration_sorts() {
        let records = fixture();
        let state = TableViewState::default().toggle_sort(Column::BeginDate);
        assert_eq!(ids(&state.view(&records).rows), vec![4, 1, 2, 3, 5]);

        let state = TableViewState::default().toggle_sort(Column::EndDate);
        assert_eq!(ids(&state.view(&records).rows), vec![1, 2, 3, 4, 5]);

        let state = TableViewState::default().toggle_sort(Column::Duration);
        assert_eq!(ids(&state.view(&records).rows), vec![3, 2, 5, 1, 4]);
    }

    #[test]
    fn sort_toggle_cycles_and_is_exclusive() {
        let state = TableViewState::default().toggle_sort(Column::App);
        assert_eq!(
            state.sort,
            Some(SortSpec {
                column: Column::App,
                direction: SortDirection::Ascending
            })
        );
        let state = state.toggle_sort(Column::App);
        assert_eq!(state.sort.map(|spec| spec.direction), Some(SortDirection::Descending));
        let state = state.toggle_sort(Column::App);
        assert_eq!(state.sort, None);

        let state = state.toggle_sort(Column::App).toggle_sort(Column::App).toggle_sort(Column::Title);
        assert_eq!(
            state.sort,
            Some(SortSpec {
                column: Column::Title,
                direction: SortDirection::Ascending
            })
        );
    }

    #[test]
    fn value_filter_requires_membership() {
        let records = fixture();
        let state = TableViewState::default().with_filter(
            Column::App,
            Some(ColumnFilter::Values(BTreeSet::from(["Code".to_string()]))),
        );
        assert_eq!(ids(&state.view(&records).rows), vec![1, 3]);

        let state = state.with_filter(Column::App, None);
        assert_eq!(state.view(&records).matched, 5);
    }

    #[test]
    fn date_filter_is_strictly_after_threshold() {
        // Current behavior: a record starting exactly at the threshold is excluded.
        let records = fixture();
        let state = TableViewState::default().with_filter(
            Column::BeginDate,
            Some(ColumnFilter::After(local(2024, 4, 2, 10, 0))),
        );
        assert_eq!(ids(&state.view(&records).rows), vec![3, 5]);

        let state = TableViewState::default().with_filter(
            Column::EndDate,
            Some(ColumnFilter::After(local(2024, 4, 2, 12, 0))),
        );
        assert_eq!(ids(&state.view(&records).rows), vec![5]);
    }

    #[test]
    fn mismatched_filter_kind_is_ignored() {
        let state = TableViewState::default().with_filter(
            Column::App,
            Some(ColumnFilter::After(local(2024, 4, 2, 10, 0))),
        );
        assert!(state.filter_for(Column::App).is_none());
    }

    #[test]
    fn search_is_case_insensitive_and_composes_with_filters() {
        let records = fixture();
        let state = TableViewState::default().with_search("code");
        assert_eq!(ids(&state.view(&records).rows), vec![1, 3]);

        let state = TableViewState::default().with_search("NOTES");
        assert_eq!(ids(&state.view(&records).rows), vec![5]);

        let state = TableViewState::default()
            .with_search("c")
            .with_filter(
                Column::Title,
                Some(ColumnFilter::Values(BTreeSet::from(["ccc".to_string()]))),
            );
        assert_eq!(ids(&state.view(&records).rows), vec![3]);
    }

    #[test]
    fn total_covers_only_filtered_rows() {
        let records = fixture();
        let unfiltered = TableViewState::default().view(&records).total;
        assert_eq!(unfiltered, Duration::minutes(60 + 20 + 5 + 240 + 30));

        let state = TableViewState::default().with_filter(
            Column::App,
            Some(ColumnFilter::Values(BTreeSet::from(["Code".to_string()]))),
        );
        let view = state.view(&records);
        assert_eq!(view.total, Duration::minutes(65));
        assert!(view.total < unfiltered);
    }

    #[test]
    fn single_page_total_does_not_depend_on_sort_order() {
        let records = fixture();
        let unsorted = TableViewState::default().view(&records).total;
        let sorted = TableViewState::default()
            .toggle_sort(Column::Duration)
            .toggle_sort(Column::Duration)
            .view(&records)
            .total;
        assert_eq!(unsorted, sorted);
    }

    #[test]
    fn multi_page_total_follows_sorted_window() {
        // 60 one-minute rows and 40 two-minute rows, two pages of 50
        let records = (1..=100)
            .map(|id| {
                let minutes = if id <= 60 { 1 } else { 2 };
                app_item(id, "x", "t", local(2024, 4, 2, 9, 0), local(2024, 4, 2, 9, minutes))
            })
            .collect::<Vec<_>>();
        let ascending = TableViewState::default().toggle_sort(Column::Duration);
        assert_eq!(ascending.view(&records).total, Duration::minutes(50));

        let descending = ascending.toggle_sort(Column::Duration);
        assert_eq!(descending.view(&records).total, Duration::minutes(90));
    }

    #[test]
    fn prev_page_steps_back_from_shown_page() {
        let records = (1..=100)
            .map(|id| {
                app_item(id, "x", "t", local(2024, 4, 2, 9, 0), local(2024, 4, 2, 9, 1))
            })
            .collect::<Vec<_>>();
        let state = TableViewState::default().with_page(2);
        let view = state.view(&records);
        assert_eq!(view.page, 1);

        let state = state.prev_page(view.page_count);
        assert_eq!(state.view(&records).page, 0);
    }

    #[test]
    fn clamp_page_pulls_stale_page_onto_last() {
        let state = TableViewState::default().with_page(4);
        assert_eq!(state.clone().clamp_page(2).pagination.page, 1);
        assert_eq!(state.clamp_page(10).pagination.page, 4);
    }

    #[test]
    fn pagination_limits_rows_and_total_to_page() {
        let records = (1..=120)
            .map(|id| {
                app_item(id, "x", "t", local(2024, 4, 2, 9, 0), local(2024, 4, 2, 9, 1))
            })
            .collect::<Vec<_>>();
        let state = TableViewState::default();
        let view = state.view(&records);
        assert_eq!(view.rows.len(), 50);
        assert_eq!(view.page_count, 3);
        assert_eq!(view.total, Duration::minutes(50));

        let state = state.next_page(view.page_count).next_page(view.page_count).next_page(3);
        let view = state.view(&records);
        assert_eq!(view.page, 2);
        assert_eq!(view.rows.len(), 20);
        assert_eq!(view.rows[0].id, 101);

        let state = state.cycle_page_size();
        assert_eq!(state.pagination, Pagination { page: 0, page_size: 100 });
        assert_eq!(state.prev_page(2).pagination.page, 0);
    }

    #[test]
    fn changing_search_returns_to_first_page() {
        let state = TableViewState::default().with_page(3).with_search("x");
        assert_eq!(state.pagination.page, 0);
    }

    #[test]
    fn selection_is_stored_verbatim() {
        let state = TableViewState::default().with_selection(vec![3, 1, 2]);
        assert_eq!(state.selected_ids, vec![3, 1, 2]);

        let state = state.toggle_row(1).toggle_row(7);
        assert_eq!(state.selected_ids, vec![3, 2, 7]);
        assert!(state.is_selected(7));
        assert!(!state.is_selected(1));
    }

    #[test]
    fn dropdown_focuses_on_every_open() {
        let state = TableViewState::default().open_dropdown(Column::App);
        assert_eq!(state.focus_count, 1);
        let state = state
            .edit_dropdown(|draft| draft.push_str("Code"))
            .apply_dropdown(Some(ColumnFilter::Values(BTreeSet::from(["Code".to_string()]))));
        assert_eq!(state.dropdown, FilterDropdown::Closed);
        assert!(state.filter_for(Column::App).is_some());

        let state = state.open_dropdown(Column::App);
        assert_eq!(state.focus_count, 2);
        assert_eq!(
            state.dropdown,
            FilterDropdown::Open {
                column: Column::App,
                draft: "Code".to_string(),
                focused: true
            }
        );
        let state = state.cancel_dropdown();
        assert_eq!(state.dropdown, FilterDropdown::Closed);
        assert!(state.filter_for(Column::App).is_some());
    }

    #[test]
    fn parse_filter_by_column_kind() {
        let filter = parse_filter(Column::App, "Code, Browser").unwrap();
        assert_eq!(
            filter,
            Some(ColumnFilter::Values(BTreeSet::from([
                "Browser".to_string(),
                "Code".to_string()
            ])))
        );
        assert_eq!(parse_filter(Column::Title, "  ").unwrap(), None);
        assert_eq!(
            parse_filter(Column::BeginDate, "2024-04-02").unwrap(),
            Some(ColumnFilter::After(local(2024, 4, 2, 0, 0)))
        );
        assert!(parse_filter(Column::EndDate, "soon").is_err());
        assert!(parse_filter(Column::Duration, "1h").is_err());
    }

    #[test]
    fn reset_clears_filters_sort_and_selection() {
        let state = TableViewState::default()
            .with_page_size(300)
            .with_search("x")
            .toggle_sort(Column::App)
            .with_selection(vec![1])
            .with_filter(
                Column::App,
                Some(ColumnFilter::Values(BTreeSet::from(["Code".to_string()]))),
            )
            .reset();
        assert!(state.filters.is_empty());
        assert_eq!(state.sort, None);
        assert!(state.selected_ids.is_empty());
        assert!(state.search_text.is_empty());
        assert_eq!(state.pagination.page_size, 300);
    }

    #[test]
    fn column_lookup_by_key() {
        assert_eq!(Column::parse("beginDate"), Some(Column::BeginDate));
        assert_eq!(Column::parse("DURATION"), Some(Column::Duration));
        assert_eq!(Column::parse("nope"), None);
        assert_eq!(Column::Title.descriptor().column, Column::Title);
    }
}
