mod state;

use chrono::{DateTime, Local, NaiveDate};
use crossterm::event::KeyCode;

use crate::engine::SummaryMode;
use crate::engine::summary::day_range;

pub use state::App;

/// Possible input events the app reacts to.
pub enum AppEvent {
    Tick,
    KeyPress(KeyCode),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppView {
    Calendar,
    Search,
    Help,
}

pub const TABS: [AppView; 2] = [AppView::Calendar, AppView::Search];

/// Receives a time range to show in detail.
pub trait Navigator {
    fn open_timerange(&mut self, begin: DateTime<Local>, end: DateTime<Local>);
}

/// Opens the selected calendar cell. Only a concrete day navigates; month cells do not.
pub fn select_calendar_cell<N: Navigator + ?Sized>(
    navigator: &mut N,
    mode: SummaryMode,
    date: NaiveDate,
) -> bool {
    match mode {
        SummaryMode::Day => {
            let (begin, end) = day_range(date);
            navigator.open_timerange(begin, end);
            true
        }
        SummaryMode::Month => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::tests::local;

    #[derive(Default)]
    struct RecordingNavigator {
        ranges: Vec<(DateTime<Local>, DateTime<Local>)>,
    }

    impl Navigator for RecordingNavigator {
        fn open_timerange(&mut self, begin: DateTime<Local>, end: DateTime<Local>) {
            self.ranges.push((begin, end));
        }
    }

    #[test]
    fn day_cell_navigates_to_whole_day() {
        let mut navigator = RecordingNavigator::default();
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert!(select_calendar_cell(&mut navigator, SummaryMode::Day, date));
        assert_eq!(navigator.ranges.len(), 1);
        let (begin, end) = navigator.ranges[0];
        assert_eq!(begin, local(2024, 3, 9, 0, 0));
        assert_eq!(end.date_naive(), date);
    }

    #[test]
    fn month_cell_does_not_navigate() {
        let mut navigator = RecordingNavigator::default();
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert!(!select_calendar_cell(&mut navigator, SummaryMode::Month, date));
        assert!(navigator.ranges.is_empty());
    }
}
