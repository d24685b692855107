//! Theme configuration for the TUI.
//!
//! Supports light and dark themes. The choice normally comes from the
//! stored preference; `auto` asks the terminal for its background.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::HealthStatus;
use crate::prefs::ThemePreference;

/// Color and style theme for the TUI.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Which preference this theme renders.
    pub kind: ThemePreference,
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    pub warning: Color,
    pub critical: Color,
    pub healthy: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Color for dimmed, secondary text.
    pub muted: Color,
    /// Style for section headers.
    pub header: Style,
    /// Style for the selected card or chip border.
    pub selected: Style,
    pub tab_active: Style,
    pub tab_inactive: Style,
    /// Style for the disconnected banner.
    pub banner: Style,
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            kind: ThemePreference::Dark,
            highlight: Color::Cyan,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            border: Color::Gray,
            muted: Color::DarkGray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            banner: Style::default().fg(Color::White).bg(Color::Red).add_modifier(Modifier::BOLD),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            kind: ThemePreference::Light,
            highlight: Color::Blue,
            warning: Color::Rgb(176, 120, 0),
            critical: Color::Red,
            healthy: Color::Green,
            border: Color::DarkGray,
            muted: Color::Gray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            banner: Style::default().fg(Color::White).bg(Color::LightRed).add_modifier(Modifier::BOLD),
            border_type: BorderType::Rounded,
        }
    }

    pub fn from_preference(pref: ThemePreference) -> Self {
        match pref {
            ThemePreference::Dark => Self::dark(),
            ThemePreference::Light => Self::light(),
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Get style for a health status
    pub fn status_style(&self, status: HealthStatus) -> Style {
        match status {
            HealthStatus::Healthy => Style::default().fg(self.healthy),
            HealthStatus::Warning => Style::default().fg(self.warning),
            HealthStatus::Critical => {
                Style::default().fg(self.critical).add_modifier(Modifier::BOLD)
            }
        }
    }

    pub fn status_color(&self, status: HealthStatus) -> Color {
        match status {
            HealthStatus::Healthy => self.healthy,
            HealthStatus::Warning => self.warning,
            HealthStatus::Critical => self.critical,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_preference() {
        assert_eq!(Theme::from_preference(ThemePreference::Light).kind, ThemePreference::Light);
        assert_eq!(Theme::from_preference(ThemePreference::Dark).highlight, Color::Cyan);
    }

    #[test]
    fn test_critical_is_bold() {
        let style = Theme::dark().status_style(HealthStatus::Critical);
        assert!(style.add_modifier.contains(Modifier::BOLD));
    }
}
