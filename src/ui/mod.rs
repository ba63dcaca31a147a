mod calendar;
mod help;
mod helpers;
mod search;
mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    prelude::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::app::{App, AppView, TABS};
use crate::engine::FilterDropdown;
use crate::engine::table::FilterKind;
use theme::Theme;

pub use helpers::format_duration;

/// Renders the entire UI for a single frame.
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(area);

    let header_lines = vec![Line::from(vec![
        Span::styled(
            "  Trackview  ",
            Style::default().fg(Color::Black).bg(Theme::primary()),
        ),
        Span::raw(" "),
        Span::styled(
            "tracked time",
            Style::default()
                .fg(Theme::secondary())
                .add_modifier(Modifier::BOLD),
        ),
    ])];
    let header = Paragraph::new(Text::from(header_lines))
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .style(Style::default().fg(Theme::secondary())),
        );
    frame.render_widget(header, layout[0]);

    let body_text = match app.view {
        AppView::Calendar => calendar::build_calendar_text(app),
        AppView::Search => search::build_search_text(app, layout[1].width),
        AppView::Help => help::build_help_text(),
    };
    let mut body_lines = vec![tabs_line(app), Line::from("")];
    body_lines.extend(body_text.lines);
    body_lines.push(Line::from(""));
    body_lines.push(Line::from(Span::styled(
        "----------------------------------------",
        Style::default().fg(Theme::dim()),
    )));
    body_lines.extend(keybinds_lines(app));
    let body = Paragraph::new(Text::from(body_lines))
        .style(Style::default().fg(Theme::text()))
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .style(Style::default().fg(Theme::secondary())),
        );
    frame.render_widget(body, layout[1]);

    let footer = Paragraph::new(Text::from(status_line(app)))
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .style(Style::default().fg(Theme::secondary())),
        );
    frame.render_widget(footer, layout[2]);

    if let FilterDropdown::Open { column, draft, .. } = &app.table.dropdown {
        let descriptor = column.descriptor();
        let hint = match descriptor.filter {
            Some(FilterKind::ValueSet) => "Comma separated values, e.g. code, browser",
            Some(FilterKind::After) => "Items after a date (YYYY-MM-DD) or timestamp",
            None => "",
        };
        render_filter_popup(frame, descriptor.title, hint, draft, app.status.as_deref());
    }
}

fn render_filter_popup(frame: &mut Frame, title: &str, hint: &str, draft: &str, error: Option<&str>) {
    let area = centered_rect(60, 35, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(Span::styled(
            format!("Filter {title}"),
            Style::default()
                .fg(Theme::accent())
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(hint.to_string(), Style::default().fg(Theme::dim()))),
        Line::from(vec![
            Span::styled("> ", Style::default().fg(Theme::selection_marker())),
            Span::styled(
                draft.to_string(),
                Style::default()
                    .fg(Theme::text())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("_", Style::default().fg(Theme::highlight())),
        ]),
        Line::from(""),
    ];
    if let Some(error) = error {
        lines.push(Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Theme::warn()),
        )));
    }
    lines.push(Line::from(Span::styled(
        "Enter: apply (empty clears). Esc: cancel.",
        Style::default().fg(Theme::dim()),
    )));

    let popup = Paragraph::new(Text::from(lines))
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .style(Style::default().fg(Theme::secondary()))
                .title(" Filter "),
        );
    frame.render_widget(popup, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ]
            .as_ref(),
        )
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(popup_layout[1])[1]
}

fn tabs_line(app: &App) -> Line<'_> {
    let mut spans = Vec::new();
    for (index, view) in TABS.iter().enumerate() {
        if index > 0 {
            spans.push(Span::raw("  "));
        }
        let name = match view {
            AppView::Calendar => "Calendar",
            AppView::Search => "Search",
            AppView::Help => "Help",
        };
        let style = if *view == app.view {
            Style::default()
                .fg(Color::Black)
                .bg(Theme::highlight())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Theme::dim())
        };
        spans.push(Span::styled(format!(" {name} "), style));
    }
    Line::from(spans)
}

fn status_line(app: &App) -> Line<'_> {
    if let Some(status) = &app.status {
        return Line::from(Span::styled(
            status.as_str(),
            Style::default()
                .fg(Theme::warn())
                .add_modifier(Modifier::BOLD),
        ));
    }
    if app.is_loading() {
        return Line::from(Span::styled(
            "● Loading track items...",
            Style::default().fg(Theme::warn()),
        ));
    }
    Line::from(Span::styled(
        format!("● {} track items in the table", app.table_batch.len()),
        Style::default().fg(Theme::dim()),
    ))
}

fn keybinds_lines(app: &App) -> Vec<Line<'static>> {
    let (primary, secondary) = match app.view {
        AppView::Calendar => (
            "←/→/↑/↓: Move  PgUp/PgDn: Page  m: Month/Year  t: Today  Enter: Open day",
            "Tab: Table  r: Reload  ?: Help  q: Quit",
        ),
        AppView::Search => (
            "↑/↓: Row  ←/→: Column  space: Select  s: Sort  f: Filter  /: Search  [/]: Page",
            "a: Select page  d: Delete  x: Reset  p: Page size  Tab: Calendar  ?: Help  q: Quit",
        ),
        AppView::Help => ("Press ? or ESC to close this help screen", ""),
    };
    vec![
        Line::from(Span::styled(primary, Style::default().fg(Theme::dim()))),
        Line::from(Span::styled(secondary, Style::default().fg(Theme::dim()))),
    ]
}
