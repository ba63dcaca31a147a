use chrono::{Datelike, Duration, NaiveDate};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
};

use super::helpers::format_duration;
use super::theme::Theme;
use crate::app::App;
use crate::engine::summary::days_in_month;
use crate::engine::{CalendarSummary, SummaryMode};

const DAY_CELL_WIDTH: usize = 11;
const MONTH_CELL_WIDTH: usize = 20;
const WEEKDAYS: [&str; 7] = ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"];
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub fn build_calendar_text(app: &App) -> Text<'_> {
    let mut lines = Vec::new();
    let active = app.calendar_date;
    let title = match app.calendar_mode {
        SummaryMode::Day => active.format("%B %Y").to_string(),
        SummaryMode::Month => active.format("%Y").to_string(),
    };
    lines.push(Line::from(vec![
        Span::styled(
            format!("  {title}"),
            Style::default()
                .fg(Theme::accent())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  ({})", app.calendar_mode.label()),
            Style::default().fg(Theme::dim()),
        ),
    ]));
    lines.push(Line::from(""));

    let summary = app.calendar_summary();
    match app.calendar_mode {
        SummaryMode::Day => lines.extend(day_grid(summary, active)),
        SummaryMode::Month => lines.extend(month_grid(summary, active)),
    }

    lines.push(Line::from(vec![
        Span::styled("  W ", Style::default().fg(Theme::worked())),
        Span::styled("Worked  ", Style::default().fg(Theme::dim())),
        Span::styled("O ", Style::default().fg(Theme::online())),
        Span::styled("Online", Style::default().fg(Theme::dim())),
    ]));
    Text::from(lines)
}

fn day_grid(summary: &CalendarSummary, active: NaiveDate) -> Vec<Line<'static>> {
    let first = active.with_day(1).unwrap_or(active);
    let offset = first.weekday().num_days_from_monday() as usize;
    let cells = std::iter::repeat_n(None, offset)
        .chain((1..=days_in_month(active)).map(Some))
        .collect::<Vec<_>>();

    let mut lines = vec![Line::from(
        std::iter::once(Span::raw("  "))
            .chain(WEEKDAYS.iter().map(|day| {
                Span::styled(
                    format!("{day:<DAY_CELL_WIDTH$}"),
                    Style::default().fg(Theme::secondary()),
                )
            }))
            .collect::<Vec<_>>(),
    )];

    for week in cells.chunks(7) {
        let mut heading = vec![Span::raw("  ")];
        let mut worked = vec![Span::raw("  ")];
        let mut online = vec![Span::raw("  ")];
        for cell in week {
            let Some(day) = *cell else {
                let blank = " ".repeat(DAY_CELL_WIDTH);
                heading.push(Span::raw(blank.clone()));
                worked.push(Span::raw(blank.clone()));
                online.push(Span::raw(blank));
                continue;
            };
            let selected = day == active.day();
            heading.push(Span::styled(
                format!("{day:>2}{}", " ".repeat(DAY_CELL_WIDTH - 2)),
                cell_style(selected, Theme::text()),
            ));
            worked.push(duration_span("W", summary.worked_for(day), DAY_CELL_WIDTH, selected, Theme::worked()));
            online.push(duration_span("O", summary.online_for(day), DAY_CELL_WIDTH, selected, Theme::online()));
        }
        lines.push(Line::from(heading));
        lines.push(Line::from(worked));
        lines.push(Line::from(online));
        lines.push(Line::from(""));
    }
    lines
}

fn month_grid(summary: &CalendarSummary, active: NaiveDate) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let month_keys = (0..12u32).collect::<Vec<_>>();
    for row in month_keys.chunks(3) {
        let mut heading = vec![Span::raw("  ")];
        let mut worked = vec![Span::raw("  ")];
        let mut online = vec![Span::raw("  ")];
        for &key in row {
            let selected = key == active.month0();
            heading.push(Span::styled(
                format!("{:<MONTH_CELL_WIDTH$}", MONTHS[key as usize]),
                cell_style(selected, Theme::text()),
            ));
            worked.push(duration_span("Worked:", summary.worked_for(key), MONTH_CELL_WIDTH, selected, Theme::worked()));
            online.push(duration_span("Online:", summary.online_for(key), MONTH_CELL_WIDTH, selected, Theme::online()));
        }
        lines.push(Line::from(heading));
        lines.push(Line::from(worked));
        lines.push(Line::from(online));
        lines.push(Line::from(""));
    }
    lines
}

fn duration_span(
    label: &str,
    duration: Option<Duration>,
    width: usize,
    selected: bool,
    color: Color,
) -> Span<'static> {
    let text = match duration {
        Some(duration) => format!("{label} {}", format_duration(duration)),
        None => String::new(),
    };
    Span::styled(format!("{text:<width$}"), cell_style(selected, color))
}

fn cell_style(selected: bool, color: Color) -> Style {
    if selected {
        Style::default()
            .fg(Color::Black)
            .bg(Theme::highlight())
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(color)
    }
}
