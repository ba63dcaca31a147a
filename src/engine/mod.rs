/// Pure track item computations: calendar summaries, the table engine,
/// deletion and background fetching.
pub mod delete;
pub mod fetch;
pub mod summary;
pub mod table;

pub use delete::{DeleteError, DeletionStore, delete_selected};
pub use fetch::{Loader, RecordSource};
pub use summary::{CalendarSummary, SummaryMemo, SummaryMode, summarize};
pub use table::{Column, ColumnFilter, FilterDropdown, SortDirection, TableViewState};
