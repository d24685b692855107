//! Status map view.
//!
//! A row of pills with the number of sensors at each level, then one chip
//! per sensor with its level, note and heat indicator.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::catalog::{display_title, display_unit, format_value};
use crate::data::classify::HEAT_SEGMENTS;
use crate::data::{classify, Classification, HealthStatus, LevelCounts};

/// Render the status map view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(3), // Pills
        Constraint::Min(3),    // Chips
    ])
    .split(area);

    let sensors = app.sensors();
    let counts = app.level_counts();

    render_pills(frame, app, &counts, chunks[0]);

    let header = Row::new(vec![
        Cell::from("Nivel"),
        Cell::from("Sensor"),
        Cell::from("Valor"),
        Cell::from("Nota"),
        Cell::from("Intensidad"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = sensors
        .iter()
        .map(|reading| {
            let class = classify(reading);
            let status_style = app.theme.status_style(class.level);
            Row::new(vec![
                Cell::from(class.level.symbol()).style(status_style),
                Cell::from(display_title(reading)),
                Cell::from(format!("{} {}", format_value(reading), display_unit(reading))),
                Cell::from(class.note).style(status_style),
                Cell::from(heat_line(app, &class)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(6),                        // Level
        Constraint::Fill(2),                          // Sensor
        Constraint::Fill(1),                          // Value
        Constraint::Fill(2),                          // Note
        Constraint::Length(HEAT_SEGMENTS as u16 + 1), // Heat
    ];

    let title = if sensors.is_empty() {
        " Sensores (0) ".to_string()
    } else {
        format!(" Sensores [{}/{}] ", app.selected_index + 1, sensors.len())
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    if !sensors.is_empty() {
        state.select(Some(app.selected_index.min(sensors.len() - 1)));
    }

    frame.render_stateful_widget(table, chunks[1], &mut state);
}

fn render_pills(frame: &mut Frame, app: &App, counts: &LevelCounts, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for level in [HealthStatus::Healthy, HealthStatus::Warning, HealthStatus::Critical] {
        spans.push(Span::styled(
            format!(" ● {} {} ", level.label(), counts.get(level)),
            app.theme.status_style(level).add_modifier(Modifier::REVERSED),
        ));
        spans.push(Span::raw("  "));
    }

    let worst = counts.worst();
    let block = Block::default()
        .title(" Estado general ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.status_color(worst)));

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

/// Heat indicator as lit and unlit squares.
fn heat_line(app: &App, class: &Classification) -> Line<'static> {
    let lit = Style::default().fg(app.theme.status_color(class.level));
    let unlit = Style::default().fg(app.theme.muted);
    Line::from(
        class
            .heat()
            .iter()
            .map(|&on| {
                if on {
                    Span::styled("■", lit)
                } else {
                    Span::styled("□", unlit)
                }
            })
            .collect::<Vec<_>>(),
    )
}
