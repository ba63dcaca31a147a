use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span, Text},
};

use super::theme::Theme;

pub fn build_help_text() -> Text<'static> {
    let mut lines = Vec::new();

    lines.push(Line::from(Span::styled(
        "Key bindings",
        Style::default()
            .fg(Theme::accent())
            .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));

    lines.push(section_title("Global"));
    lines.extend(section_lines(&[
        "q: Quit",
        "?: Toggle help",
        "Tab: Switch between calendar and table",
        "r: Reload track items",
        "esc: Back",
    ]));

    lines.push(Line::from(""));
    lines.push(section_title("Calendar"));
    lines.extend(section_lines(&[
        "Left/Right: Previous/next day (month in year view)",
        "Up/Down: Previous/next week (quarter in year view)",
        "PageUp/PageDown: Previous/next month (year in year view)",
        "m: Toggle month/year view",
        "t: Jump to today",
        "Enter: Open the day in the table (year view: open the month)",
    ]));

    lines.push(Line::from(""));
    lines.push(section_title("Table"));
    lines.extend(section_lines(&[
        "Up/Down: Move cursor",
        "Left/Right: Select column",
        "space: Select/unselect row",
        "a: Select/unselect all rows on the page",
        "s: Sort by column (ascending, descending, off)",
        "f: Filter column",
        "/: Search app and title",
        "[ / ]: Previous/next page",
        "p: Change page size",
        "d: Delete selected rows",
        "x: Clear filters, sort and selection",
    ]));

    lines.push(Line::from(""));
    lines.push(section_title("Filter input"));
    lines.extend(section_lines(&[
        "App/Title: comma separated values",
        "Begin/End: date (YYYY-MM-DD) or timestamp, shows later items",
        "Enter: apply (empty input clears), Esc: cancel",
    ]));

    Text::from(lines)
}

fn section_title(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!("  {title}"),
        Style::default()
            .fg(Theme::secondary())
            .add_modifier(Modifier::BOLD),
    ))
}

fn section_lines(items: &[&str]) -> Vec<Line<'static>> {
    items
        .iter()
        .map(|item| {
            Line::from(Span::styled(
                format!("  - {item}"),
                Style::default().fg(Theme::text()),
            ))
        })
        .collect()
}
