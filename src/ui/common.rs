//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, disconnected banner,
//! status bar, and help overlay.

use std::time::Duration;

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::data::HealthStatus;
use crate::poll::Visibility;

/// Render the header bar with connection status and level counts.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let dashboard = &app.dashboard;
    let clock = Span::styled(
        format!(" {} ", app.clock),
        Style::default().add_modifier(Modifier::BOLD),
    );

    if dashboard.is_loading() {
        let line = Line::from(vec![
            Span::styled(" ENVWATCH ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("│ "),
            Span::raw(dashboard.status.message.clone()),
            Span::raw(" │"),
            clock,
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let counts = app.level_counts();
    let connection_style = if dashboard.status.connected {
        Style::default().fg(app.theme.healthy)
    } else {
        Style::default().fg(app.theme.critical).add_modifier(Modifier::BOLD)
    };

    let line = Line::from(vec![
        Span::styled(" ● ", connection_style),
        Span::styled("ENVWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(dashboard.status.message.clone(), connection_style),
        Span::raw(" │ "),
        count_span(app, counts.ok, HealthStatus::Healthy),
        Span::raw(" ok "),
        count_span(app, counts.warn, HealthStatus::Warning),
        Span::raw(" warn "),
        count_span(app, counts.crit, HealthStatus::Critical),
        Span::raw(" crit │ "),
        Span::styled(
            format!("{}", counts.total()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" sensores │"),
        clock,
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

fn count_span(app: &App, count: usize, status: HealthStatus) -> Span<'static> {
    if count > 0 {
        Span::styled(format!("{}", count), app.theme.status_style(status))
    } else {
        Span::styled("0", Style::default().add_modifier(Modifier::DIM))
    }
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = [View::Sensors, View::StatusMap]
        .iter()
        .enumerate()
        .map(|(i, view)| Line::from(format!(" {}:{} ", i + 1, view.label())))
        .collect();

    let selected = match app.current_view {
        View::Sensors => 0,
        View::StatusMap => 1,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// The banner is shown once a poll has failed, until the next success.
pub fn banner_visible(app: &App) -> bool {
    !app.dashboard.status.connected && app.dashboard.last_error.is_some()
}

/// Render the disconnected banner with the last error.
pub fn render_banner(frame: &mut Frame, app: &App, area: Rect) {
    let error = app.dashboard.last_error.as_deref().unwrap_or_default();
    let text = format!(
        " ⚠ Sin conexión con la API: {} │ reintento en {} ",
        error,
        format_secs(app.dashboard.next_poll_in)
    );
    frame.render_widget(Paragraph::new(text).style(app.theme.banner), area);
}

/// Render the status bar at the bottom.
///
/// Shows: source, time of last update, next poll, controls.
/// Also displays temporary status messages.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let dashboard = &app.dashboard;
    let updated = dashboard
        .last_update
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--".to_string());
    let background = match app.visibility() {
        Visibility::Visible => "",
        Visibility::Hidden => " (en segundo plano)",
    };
    let failures = if dashboard.consecutive_failures > 0 {
        format!(" | {} fallos", dashboard.consecutive_failures)
    } else {
        String::new()
    };

    let controls = match app.current_view {
        View::Sensors => "↑↓:select Enter:detail r:refresh t:theme ?:help q:quit",
        View::StatusMap => "↑↓:select Tab:switch r:refresh ?:help q:quit",
    };

    let status = format!(
        " {} | Actualizado {} | Próxima en {}{}{} | {}",
        app.source_description(),
        updated,
        format_secs(dashboard.next_poll_in),
        background,
        failures,
        controls,
    );

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

fn format_secs(d: Duration) -> String {
    format!("{:.1}s", d.as_secs_f64())
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let help_text = vec![
        Line::from(vec![Span::styled("Atajos de teclado", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(" Navegación", bold)]),
        Line::from("  ←/→ Tab     Cambiar vista"),
        Line::from("  ↑/↓ j/k     Seleccionar sensor"),
        Line::from("  Home/End    Primero/último"),
        Line::from("  Enter       Ver detalle"),
        Line::from("  Esc         Volver"),
        Line::from(""),
        Line::from(vec![Span::styled(" General", bold)]),
        Line::from("  r         Actualizar ahora"),
        Line::from("  t         Cambiar tema"),
        Line::from("  e         Exportar a JSON"),
        Line::from("  q         Salir"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Pulsa cualquier tecla para cerrar",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Ayuda ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 18u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
