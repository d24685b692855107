//! Application state and navigation logic.

use std::time::{Duration, Instant};

use anyhow::Result;

use crate::data::LevelCounts;
use crate::export::write_export;
use crate::poll::{DashboardState, PollHandle, Visibility};
use crate::prefs::{PreferenceStore, Preferences};
use crate::source::SensorReading;
use crate::ui::Theme;

/// The current view/tab in the TUI.
///
/// Sensor detail is shown as an overlay (controlled by
/// `App::show_detail_overlay`) rather than as a separate view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Live cards with value, trend and sparkline per sensor.
    Sensors,
    /// Level counts and a compact chip per sensor.
    StatusMap,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Sensors => View::StatusMap,
            View::StatusMap => View::Sensors,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        // Two views: previous and next coincide.
        self.next()
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Sensors => "Sensores",
            View::StatusMap => "Mapa de estado",
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,
    pub show_detail_overlay: bool,

    poller: PollHandle,
    /// Latest state published by the poll loop.
    pub dashboard: DashboardState,
    /// Latest clock text.
    pub clock: String,

    pub selected_index: usize,

    pub theme: Theme,
    prefs: Option<PreferenceStore>,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App around a running poll loop.
    ///
    /// When `prefs` is given, theme changes are written back to it.
    pub fn new(poller: PollHandle, theme: Theme, prefs: Option<PreferenceStore>) -> Self {
        let dashboard = poller.latest();
        let clock = poller.clock();
        Self {
            running: true,
            current_view: View::Sensors,
            show_help: false,
            show_detail_overlay: false,
            poller,
            dashboard,
            clock,
            selected_index: 0,
            theme,
            prefs,
            status_message: None,
        }
    }

    /// Returns a description of the data source.
    pub fn source_description(&self) -> &str {
        self.poller.description()
    }

    /// Give back the poll handle, for shutdown.
    pub fn into_poller(self) -> PollHandle {
        self.poller
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    /// Pull the latest state from the poll loop.
    ///
    /// Returns true if a new poll outcome arrived.
    pub fn reload_data(&mut self) -> bool {
        self.clock = self.poller.clock();

        let Some(dashboard) = self.poller.take_update() else {
            return false;
        };
        self.dashboard = dashboard;

        let count = self.sensors().len();
        if self.selected_index >= count {
            self.selected_index = count.saturating_sub(1);
        }
        if count == 0 {
            self.show_detail_overlay = false;
        }
        true
    }

    /// Readings to render, one per sensor key.
    ///
    /// Keeps the position of a key's first occurrence and the value of its
    /// last. Readings without a key are all kept.
    pub fn sensors(&self) -> Vec<&SensorReading> {
        dedup_last_wins(&self.dashboard.sensors)
    }

    /// Level counts across the full snapshot, repeated keys included.
    pub fn level_counts(&self) -> LevelCounts {
        LevelCounts::from_snapshot(&self.dashboard.sensors)
    }

    /// The reading under the cursor.
    pub fn selected_reading(&self) -> Option<&SensorReading> {
        self.sensors().get(self.selected_index).copied()
    }

    /// Ask the poll loop for an immediate poll.
    pub fn refresh_now(&mut self) {
        if self.poller.refresh() {
            self.set_status_message("Actualizando...".to_string());
        } else {
            self.set_status_message("Actualización ya en curso".to_string());
        }
    }

    /// Forward terminal focus changes to the poll loop.
    pub fn set_visibility(&mut self, visibility: Visibility) {
        self.poller.set_visibility(visibility);
    }

    pub fn visibility(&self) -> Visibility {
        self.poller.visibility()
    }

    /// Switch between light and dark and persist the choice.
    pub fn toggle_theme(&mut self) {
        let kind = self.theme.kind.toggled();
        self.theme = Theme::from_preference(kind);

        if let Some(ref store) = self.prefs {
            if let Err(e) = store.save(&Preferences { theme: kind }) {
                self.set_status_message(format!("No se pudo guardar el tema: {}", e));
            }
        }
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        let max = self.sensors().len().saturating_sub(1);
        self.selected_index = (self.selected_index + n).min(max);
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        self.selected_index = self.selected_index.saturating_sub(n);
    }

    /// Jump to the first item in the list.
    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    /// Jump to the last item in the list.
    pub fn select_last(&mut self) {
        self.selected_index = self.sensors().len().saturating_sub(1);
    }

    /// Open the detail overlay for the selected sensor.
    pub fn enter_detail(&mut self) {
        if self.selected_reading().is_some() {
            self.show_detail_overlay = true;
        }
    }

    /// Navigate back: close overlay first, then return to the cards.
    pub fn go_back(&mut self) {
        if self.show_detail_overlay {
            self.show_detail_overlay = false;
        } else if self.current_view != View::Sensors {
            self.current_view = View::Sensors;
        }
    }

    /// Close the detail overlay if open.
    pub fn close_overlay(&mut self) {
        self.show_detail_overlay = false;
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export current state to a file.
    pub fn export_state(&self, path: &std::path::Path) -> Result<()> {
        if self.dashboard.polls == 0 {
            anyhow::bail!("No data to export");
        }
        write_export(&self.dashboard, path)
    }
}

fn dedup_last_wins(readings: &[SensorReading]) -> Vec<&SensorReading> {
    let mut out: Vec<&SensorReading> = Vec::with_capacity(readings.len());
    for reading in readings {
        let existing = reading
            .key()
            .and_then(|key| out.iter().position(|r| r.key() == Some(key)));
        match existing {
            Some(i) => out[i] = reading,
            None => out.push(reading),
        }
    }
    out
}
