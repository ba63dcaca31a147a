use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span, Text},
};

use super::helpers::{clamp_name, format_duration};
use super::theme::Theme;
use crate::app::App;
use crate::engine::table::{COLUMNS, ColumnDescriptor};
use crate::engine::{Column, ColumnFilter, SortDirection};
use crate::types::{DATE_TIME_FORMAT, TrackItem, timestamp_format};

/// Marker, checkbox and the gaps between columns.
const ROW_PREFIX_WIDTH: usize = 6;
const MIN_TITLE_WIDTH: usize = 10;

pub fn build_search_text(app: &App, width: u16) -> Text<'_> {
    let mut lines = Vec::new();
    let (begin, end) = app.table_range;

    let mut range_spans = vec![
        Span::styled("  Range: ", Style::default().fg(Theme::dim())),
        Span::styled(
            format!(
                "{} - {}",
                begin.format(DATE_TIME_FORMAT),
                end.format(DATE_TIME_FORMAT)
            ),
            Style::default().fg(Theme::text()),
        ),
    ];
    if app.is_loading() {
        range_spans.push(Span::styled("  loading...", Style::default().fg(Theme::warn())));
    }
    lines.push(Line::from(range_spans));

    if app.search_active {
        lines.push(Line::from(vec![
            Span::styled(
                "  Search: ",
                Style::default()
                    .fg(Theme::highlight())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(app.table.search_text.as_str(), Style::default().fg(Theme::text())),
            Span::styled("_", Style::default().fg(Theme::highlight())),
        ]));
    } else if !app.table.search_text.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("  Search: ", Style::default().fg(Theme::accent())),
            Span::styled(app.table.search_text.as_str(), Style::default().fg(Theme::text())),
            Span::styled(" (press / to edit)", Style::default().fg(Theme::dim())),
        ]));
    }
    if let Some(filters) = filters_line(app) {
        lines.push(filters);
    }
    lines.push(Line::from(""));

    let title_width = title_width(width);
    lines.push(header_line(app, title_width));

    let view = app.table_view();
    if view.rows.is_empty() {
        let message = if app.table_batch.is_empty() {
            "  No track items in this range."
        } else {
            "  No track items match. Press x to reset."
        };
        lines.push(Line::from(Span::styled(message, Style::default().fg(Theme::dim()))));
    }
    let format = timestamp_format(begin, end);
    for (index, item) in view.rows.iter().enumerate() {
        let cursor = index == app.selected_row_index;
        lines.push(row_line(app, item, cursor, format, title_width));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  Total ", Style::default().fg(Theme::dim())),
        Span::styled(
            format_duration(view.total),
            Style::default()
                .fg(Theme::accent())
                .add_modifier(Modifier::BOLD),
        ),
    ]));
    lines.push(Line::from(Span::styled(
        format!(
            "  Page {}/{}  {} items  {} per page  {} selected",
            view.page + 1,
            view.page_count,
            view.matched,
            app.table.pagination.page_size,
            app.table.selected_ids.len()
        ),
        Style::default().fg(Theme::dim()),
    )));
    Text::from(lines)
}

fn title_width(width: u16) -> usize {
    let fixed = COLUMNS
        .iter()
        .filter(|descriptor| descriptor.column != Column::Title)
        .map(|descriptor| descriptor.width as usize + 1)
        .sum::<usize>();
    // Borders and left padding
    (width as usize)
        .saturating_sub(fixed + ROW_PREFIX_WIDTH + 4)
        .max(MIN_TITLE_WIDTH)
}

fn column_width(descriptor: &ColumnDescriptor, title_width: usize) -> usize {
    if descriptor.width == 0 {
        title_width
    } else {
        descriptor.width as usize
    }
}

fn header_line(app: &App, title_width: usize) -> Line<'static> {
    let mut spans = vec![Span::raw("      ")];
    for descriptor in COLUMNS.iter() {
        let mut label = descriptor.title.to_string();
        if let Some(sort) = app.table.sort.filter(|sort| sort.column == descriptor.column) {
            label.push_str(match sort.direction {
                SortDirection::Ascending => " ^",
                SortDirection::Descending => " v",
            });
        }
        if app.table.filter_for(descriptor.column).is_some() {
            label.push('*');
        }
        let style = if descriptor.column == app.selected_column() {
            Style::default()
                .fg(Theme::highlight())
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default()
                .fg(Theme::secondary())
                .add_modifier(Modifier::BOLD)
        };
        spans.push(Span::styled(
            clamp_name(&label, column_width(descriptor, title_width)),
            style,
        ));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

fn row_line(
    app: &App,
    item: &TrackItem,
    cursor: bool,
    format: &str,
    title_width: usize,
) -> Line<'static> {
    let line_style = if cursor {
        Style::default()
            .fg(Theme::highlight())
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Theme::text())
    };
    let marker_style = if cursor {
        Style::default().fg(Theme::selection_marker())
    } else {
        Style::default().fg(Theme::dim())
    };
    let checkbox = if app.table.is_selected(item.id) {
        "[x] "
    } else {
        "[ ] "
    };

    let mut spans = vec![
        Span::styled(if cursor { "> " } else { "  " }, marker_style),
        Span::styled(checkbox, marker_style),
    ];
    for descriptor in COLUMNS.iter() {
        let value = match descriptor.column {
            Column::App => item.app().unwrap_or("").to_string(),
            Column::Title => item.title().unwrap_or("").to_string(),
            Column::BeginDate => item.begin_date.format(format).to_string(),
            Column::EndDate => item.end_date.format(format).to_string(),
            Column::Duration => format_duration(item.duration()),
        };
        spans.push(Span::styled(
            clamp_name(&value, column_width(descriptor, title_width)),
            line_style,
        ));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

fn filters_line(app: &App) -> Option<Line<'static>> {
    if app.table.filters.is_empty() {
        return None;
    }
    let text = app
        .table
        .filters
        .iter()
        .map(|(column, filter)| match filter {
            ColumnFilter::Values(_) => format!("{} in [{}]", column.key(), filter.draft()),
            ColumnFilter::After(threshold) => {
                format!("{} > {}", column.key(), threshold.format(DATE_TIME_FORMAT))
            }
        })
        .collect::<Vec<_>>()
        .join("  ");
    Some(Line::from(vec![
        Span::styled("  Filters: ", Style::default().fg(Theme::accent())),
        Span::styled(text, Style::default().fg(Theme::text())),
    ]))
}
