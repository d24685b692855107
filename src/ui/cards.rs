//! Sensor cards view.
//!
//! Lays the sensors out as a grid of cards. Each card shows the formatted
//! value and unit, a description, the trend with a sparkline of recent
//! samples, and a gauge for percentage-like sensors.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::catalog::{display_title, display_unit, format_value};
use crate::data::chart::render_sparkline;
use crate::data::{classify, SensorKind, Trend};
use crate::source::SensorReading;

/// Narrowest a card may get before the grid drops a column.
const CARD_MIN_WIDTH: u16 = 30;
/// Card height including borders.
const CARD_HEIGHT: u16 = 7;

/// Render the cards view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let sensors = app.sensors();

    if sensors.is_empty() {
        let text = if app.dashboard.is_loading() {
            "Conectando con los sensores..."
        } else {
            "Sin sensores"
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border));
        let paragraph = Paragraph::new(vec![Line::from(""), Line::from(text)])
            .alignment(Alignment::Center)
            .style(Style::default().fg(app.theme.muted))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let columns = grid_columns(area.width);
    let visible_rows = (area.height / CARD_HEIGHT).max(1) as usize;
    let selected_row = app.selected_index / columns;
    let first_row = first_visible_row(selected_row, visible_rows);

    let row_areas = Layout::vertical(vec![Constraint::Length(CARD_HEIGHT); visible_rows]).split(area);
    let col_constraints = vec![Constraint::Ratio(1, columns as u32); columns];

    for (row_offset, row_area) in row_areas.iter().enumerate() {
        let cells = Layout::horizontal(col_constraints.clone()).split(*row_area);
        for (col, cell) in cells.iter().enumerate() {
            let index = (first_row + row_offset) * columns + col;
            let Some(reading) = sensors.get(index) else {
                return;
            };
            render_card(frame, app, reading, index == app.selected_index, *cell);
        }
    }
}

fn render_card(frame: &mut Frame, app: &App, reading: &SensorReading, selected: bool, area: Rect) {
    let kind = SensorKind::from_code(reading.code());
    let class = classify(reading);
    let status_style = app.theme.status_style(class.level);
    let muted = Style::default().fg(app.theme.muted);

    let points = reading
        .key()
        .map(|key| app.dashboard.history.points(key))
        .unwrap_or_default();

    let inner_width = area.width.saturating_sub(2) as usize;

    let mut lines = vec![Line::from(vec![
        Span::styled(
            format_value(reading),
            status_style.add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(display_unit(reading), muted),
    ])];
    lines.push(Line::from(Span::styled(kind.describe(&reading.value), muted)));

    lines.push(match Trend::of(&points) {
        Some(trend) => Line::from(vec![
            Span::raw(format!("{} {} ", trend.arrow(), trend.label())),
            Span::styled(
                render_sparkline(&points, inner_width.saturating_sub(12)),
                Style::default().fg(app.theme.highlight),
            ),
        ]),
        None => Line::from(Span::styled("Sin historial", muted)),
    });

    if let Some(pct) = kind.progress(&reading.value) {
        lines.push(Line::from(vec![
            Span::styled(
                progress_bar(pct, inner_width.saturating_sub(5)),
                status_style,
            ),
            Span::raw(format!(" {}%", pct)),
        ]));
    }

    lines.push(Line::from(Span::styled(
        format!("{} {}", class.level.symbol(), class.note),
        status_style,
    )));

    let border_style = if selected {
        app.theme.selected
    } else {
        Style::default().fg(app.theme.border)
    };

    let block = Block::default()
        .title(format!(" {} {} ", kind.icon(), display_title(reading)))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(border_style);

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Number of card columns that fit in `width`.
pub fn grid_columns(width: u16) -> usize {
    (width / CARD_MIN_WIDTH).max(1) as usize
}

/// First grid row to draw so the selected row stays on screen.
pub fn first_visible_row(selected_row: usize, visible_rows: usize) -> usize {
    selected_row.saturating_sub(visible_rows.saturating_sub(1))
}

/// Horizontal bar `width` cells wide, filled to `pct` percent.
pub fn progress_bar(pct: u16, width: usize) -> String {
    let filled = (usize::from(pct.min(100)) * width + 50) / 100;
    let mut bar = "█".repeat(filled);
    bar.push_str(&"░".repeat(width - filled));
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_columns() {
        assert_eq!(grid_columns(20), 1);
        assert_eq!(grid_columns(60), 2);
        assert_eq!(grid_columns(119), 3);
    }

    #[test]
    fn test_first_visible_row_keeps_selection_on_screen() {
        assert_eq!(first_visible_row(0, 3), 0);
        assert_eq!(first_visible_row(2, 3), 0);
        assert_eq!(first_visible_row(5, 3), 3);
        assert_eq!(first_visible_row(4, 0), 4);
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0, 4), "░░░░");
        assert_eq!(progress_bar(50, 4), "██░░");
        assert_eq!(progress_bar(100, 4), "████");
        assert_eq!(progress_bar(250, 2), "██");
        assert_eq!(progress_bar(66, 0), "");
    }
}
