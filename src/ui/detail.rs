//! Detail overlay rendering.
//!
//! Displays a modal overlay for the selected sensor: headline figures, a
//! line chart of its history, min/max/last, and suggested ranges.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Cell, Chart, Clear, Dataset, GraphType, Paragraph, Row, Table},
    Frame,
};

use crate::app::App;
use crate::data::catalog::{display_title, display_unit, format_value};
use crate::data::chart::{format_stat, indexed};
use crate::data::{classify, Bounds, SensorKind, SeriesStats};

/// Minimum width required for the detail overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 50;
/// Minimum height required for the detail overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 18;

/// Render the sensor detail as a modal overlay.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    // Skip rendering if terminal is too small for the overlay
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }

    let Some(reading) = app.selected_reading() else {
        return;
    };

    let kind = SensorKind::from_code(reading.code());
    let class = classify(reading);
    let points = reading
        .key()
        .map(|key| app.dashboard.history.points(key))
        .unwrap_or_default();
    let unit = display_unit(reading);

    let overlay_width = percent_of(area.width, 95).clamp(MIN_OVERLAY_WIDTH, 100);
    let overlay_height = percent_of(area.height, 90).clamp(MIN_OVERLAY_HEIGHT, 40);

    let x = area.x + (area.width.saturating_sub(overlay_width)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_height)) / 2;
    let overlay_area = Rect::new(x, y, overlay_width, overlay_height);

    frame.render_widget(Clear, overlay_area);

    let chunks = Layout::vertical([
        Constraint::Length(5), // KPIs
        Constraint::Min(6),    // Chart
        Constraint::Length(6), // Stats and ranges
        Constraint::Length(1), // Footer
    ])
    .split(overlay_area);

    // ===== KPIs =====
    let status_style = app.theme.status_style(class.level);
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let header_lines = vec![
        Line::from(Span::styled(
            kind.describe(&reading.value),
            Style::default().fg(app.theme.muted),
        )),
        Line::from(""),
        Line::from(vec![
            Span::raw(" Valor actual: "),
            Span::styled(format!("{} {}", format_value(reading), unit), bold),
            Span::raw("    Lecturas: "),
            Span::styled(format!("{}", points.len()), bold),
            Span::raw("    Código: "),
            Span::styled(
                if reading.code().is_empty() { "--" } else { reading.code() }.to_string(),
                bold,
            ),
            Span::raw("    Estado: "),
            Span::styled(
                format!("{} {}", class.level.symbol(), class.note),
                status_style.add_modifier(Modifier::BOLD),
            ),
        ]),
    ];

    let header_block = Block::default()
        .title(format!(" {} {} ", kind.icon(), display_title(reading)))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));
    frame.render_widget(Paragraph::new(header_lines).block(header_block), chunks[0]);

    // ===== CHART =====
    let chart_block = Block::default()
        .title(" Historial ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    match Bounds::of(&points) {
        Some(bounds) => {
            let data = indexed(&points);
            let dataset = Dataset::default()
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(app.theme.status_color(class.level)))
                .data(&data);

            let x_max = (points.len().saturating_sub(1)).max(1) as f64;
            let (y_min, y_max) = if bounds.max > bounds.min {
                (bounds.min, bounds.max)
            } else {
                (bounds.min - bounds.span / 2.0, bounds.max + bounds.span / 2.0)
            };

            let chart = Chart::new(vec![dataset])
                .block(chart_block)
                .x_axis(
                    Axis::default()
                        .style(Style::default().fg(app.theme.muted))
                        .bounds([0.0, x_max]),
                )
                .y_axis(
                    Axis::default()
                        .style(Style::default().fg(app.theme.muted))
                        .bounds([y_min, y_max])
                        .labels([format_stat(Some(y_min)), format_stat(Some(y_max))]),
                );
            frame.render_widget(chart, chunks[1]);
        }
        None => {
            let empty = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "  Sin datos numéricos todavía",
                    Style::default().add_modifier(Modifier::DIM),
                )),
            ])
            .block(chart_block);
            frame.render_widget(empty, chunks[1]);
        }
    }

    // ===== STATS AND RANGES =====
    let bottom = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);

    let stats = SeriesStats::of(&points);
    let stat_rows = vec![
        Row::new(vec![Cell::from("Mínimo"), Cell::from(format_stat(stats.min))]),
        Row::new(vec![Cell::from("Máximo"), Cell::from(format_stat(stats.max))]),
        Row::new(vec![Cell::from("Último"), Cell::from(format_stat(stats.last))]),
    ];
    let stats_table = Table::new(stat_rows, [Constraint::Fill(1), Constraint::Fill(1)]).block(
        Block::default()
            .title(format!(" Resumen ({}) ", unit))
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border)),
    );
    frame.render_widget(stats_table, bottom[0]);

    let range_rows: Vec<Row> = kind
        .ranges()
        .iter()
        .map(|r| Row::new(vec![Cell::from(r.label), Cell::from(r.range)]))
        .collect();
    let ranges_table = Table::new(range_rows, [Constraint::Fill(1), Constraint::Fill(1)])
        .header(Row::new(vec!["Rango", "Valores"]).style(app.theme.header))
        .block(
            Block::default()
                .title(" Rangos sugeridos ")
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        );
    frame.render_widget(ranges_table, bottom[1]);

    // ===== FOOTER =====
    let footer = Paragraph::new(Line::from(vec![Span::styled(
        " Esc: cerrar  ↑↓: otro sensor ",
        Style::default().add_modifier(Modifier::DIM),
    )]));
    frame.render_widget(footer, chunks[3]);
}

/// `percent`% of `len`, computed without `u16` overflow.
fn percent_of(len: u16, percent: u32) -> u16 {
    u16::try_from(u32::from(len) * percent / 100).unwrap_or(u16::MAX)
}
