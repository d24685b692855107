//! Terminal UI rendering using ratatui.
//!
//! Each view is implemented in its own submodule with a `render` function.
//!
//! ## Submodules
//!
//! - [`cards`]: One card per sensor with value, trend, sparkline and gauge
//! - [`status_map`]: Level counts and a compact chip per sensor
//! - [`detail`]: Modal overlay with the history chart for one sensor
//! - [`common`]: Shared components (header, tabs, banner, status bar, help overlay)
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//!
//! ## Rendering Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├──────────────────────────────────────┤
//! │ Tabs (common::render_tabs)           │
//! ├──────────────────────────────────────┤
//! │ Banner, only while disconnected      │
//! ├──────────────────────────────────────┤
//! │                                      │
//! │ View Content                         │
//! │ (cards/status_map::render)           │
//! │                                      │
//! ├──────────────────────────────────────┤
//! │ Status Bar (common::render_status)   │
//! └──────────────────────────────────────┘
//!         ↑
//!    Overlays rendered on top:
//!    - detail::render_overlay
//!    - common::render_help
//! ```

pub mod cards;
pub mod common;
pub mod detail;
pub mod status_map;
pub mod theme;

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::Style,
    widgets::Paragraph,
    Frame,
};

pub use theme::Theme;

use crate::app::{App, View};

/// Minimum terminal size for a usable display.
pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 12;

/// Draw the whole dashboard for one frame.
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = format!(
            "Terminal demasiado pequeña: {}x{}\nMínimo: {}x{}",
            area.width, area.height, MIN_WIDTH, MIN_HEIGHT
        );
        let paragraph = Paragraph::new(msg)
            .alignment(Alignment::Center)
            .style(Style::default().fg(app.theme.warning));
        let centered = Rect::new(0, (area.height / 2).saturating_sub(1), area.width, 3)
            .intersection(area);
        frame.render_widget(paragraph, centered);
        return;
    }

    let show_banner = common::banner_visible(app);
    let chunks = Layout::vertical([
        Constraint::Length(1),                  // Header bar
        Constraint::Length(1),                  // Tabs
        Constraint::Length(show_banner.into()), // Banner
        Constraint::Min(6),                     // Content
        Constraint::Length(1),                  // Status bar
    ])
    .split(area);

    common::render_header(frame, app, chunks[0]);
    common::render_tabs(frame, app, chunks[1]);
    if show_banner {
        common::render_banner(frame, app, chunks[2]);
    }

    match app.current_view {
        View::Sensors => cards::render(frame, app, chunks[3]),
        View::StatusMap => status_map::render(frame, app, chunks[3]),
    }

    common::render_status_bar(frame, app, chunks[4]);

    if app.show_detail_overlay {
        detail::render_overlay(frame, app, area);
    }

    if app.show_help {
        common::render_help(frame, app, area);
    }
}
