//! The poll state machine.
//!
//! [`PollState`] owns everything a poll outcome mutates: the displayed
//! snapshot, the connection status, the history windows and the backoff.
//! Transitions are plain functions so ordering rules can be tested without
//! a runtime.

use std::time::Duration;

use chrono::{DateTime, Local};
use serde::Serialize;

use super::backoff::{Backoff, BackoffPolicy};
use super::Visibility;
use crate::data::History;
use crate::error::FetchError;
use crate::source::SensorSnapshot;

/// Connection status shown in the header and banner.
///
/// Always replaced as a whole, never patched field by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionStatus {
    pub connected: bool,
    pub message: String,
}

impl ConnectionStatus {
    /// Status before the first poll completes.
    pub fn connecting() -> Self {
        Self {
            connected: false,
            message: "Conectando...".to_string(),
        }
    }

    pub fn connected() -> Self {
        Self {
            connected: true,
            message: "Conectado".to_string(),
        }
    }

    pub fn disconnected() -> Self {
        Self {
            connected: false,
            message: "Error de conexión".to_string(),
        }
    }
}

/// Everything the dashboard renders, published after every poll.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// Readings from the most recent successful poll.
    pub sensors: SensorSnapshot,
    pub status: ConnectionStatus,
    /// Description of the most recent failure, cleared on success.
    pub last_error: Option<String>,
    /// Wall-clock time of the most recent successful poll.
    pub last_update: Option<DateTime<Local>>,
    pub history: History,
    /// Current backoff interval (used while visible).
    pub backoff: Duration,
    /// Delay chosen for the next scheduled poll.
    pub next_poll_in: Duration,
    pub consecutive_failures: u32,
    /// Number of polls applied so far.
    pub polls: u64,
}

impl DashboardState {
    fn new(max_points: usize, backoff: Duration) -> Self {
        Self {
            sensors: SensorSnapshot::new(),
            status: ConnectionStatus::connecting(),
            last_error: None,
            last_update: None,
            history: History::new(max_points),
            backoff,
            next_poll_in: Duration::ZERO,
            consecutive_failures: 0,
            polls: 0,
        }
    }

    /// True before any poll has delivered data.
    pub fn is_loading(&self) -> bool {
        !self.status.connected && self.sensors.is_empty()
    }
}

/// Poll state machine.
#[derive(Debug, Clone)]
pub struct PollState {
    view: DashboardState,
    backoff: Backoff,
    next_seq: u64,
    applied_seq: u64,
}

impl PollState {
    pub fn new(policy: BackoffPolicy, max_points: usize) -> Self {
        let backoff = Backoff::new(policy);
        Self {
            view: DashboardState::new(max_points, backoff.current()),
            backoff,
            next_seq: 0,
            applied_seq: 0,
        }
    }

    /// Start a poll and return its sequence number.
    pub fn begin(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    /// Apply the outcome of poll `seq`.
    ///
    /// Outcomes for polls older than the last applied one are ignored so a
    /// slow response can never overwrite newer data. Returns whether the
    /// outcome was applied.
    pub fn apply(
        &mut self,
        seq: u64,
        outcome: Result<SensorSnapshot, FetchError>,
        now: DateTime<Local>,
    ) -> bool {
        if seq <= self.applied_seq {
            return false;
        }
        self.applied_seq = seq;
        self.view.polls += 1;

        match outcome {
            Ok(snapshot) => {
                self.view.history.record(&snapshot);
                self.view.sensors = snapshot;
                self.view.status = ConnectionStatus::connected();
                self.view.last_error = None;
                self.view.last_update = Some(now);
                self.view.consecutive_failures = 0;
                self.backoff.reset();
            }
            Err(err) => {
                // Stale sensors stay visible next to the disconnected banner.
                self.view.status = ConnectionStatus::disconnected();
                self.view.last_error = Some(err.to_string());
                self.view.consecutive_failures += 1;
                self.backoff.grow();
            }
        }
        self.view.backoff = self.backoff.current();
        true
    }

    /// Delay before the next poll.
    ///
    /// A hidden dashboard polls at the fixed `hidden_interval`; a visible one
    /// uses the backoff. Hiding never resets the backoff.
    pub fn next_delay(&self, visibility: Visibility, hidden_interval: Duration) -> Duration {
        match visibility {
            Visibility::Hidden => hidden_interval,
            Visibility::Visible => self.backoff.current(),
        }
    }

    /// Record the delay picked for the next poll so the UI can show it.
    pub fn schedule(&mut self, delay: Duration) {
        self.view.next_poll_in = delay;
    }

    pub fn view(&self) -> &DashboardState {
        &self.view
    }

    pub fn backoff(&self) -> Duration {
        self.backoff.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{SensorReading, SensorValue};

    fn temp(v: f64) -> SensorSnapshot {
        vec![SensorReading::new("temp_current", SensorValue::Number(v))]
    }

    fn failure() -> Result<SensorSnapshot, FetchError> {
        Err(FetchError::Http { status: 500 })
    }

    fn poll(state: &mut PollState, outcome: Result<SensorSnapshot, FetchError>) -> bool {
        let seq = state.begin();
        state.apply(seq, outcome, Local::now())
    }

    #[test]
    fn test_initial_state() {
        let state = PollState::new(BackoffPolicy::default(), 30);
        assert_eq!(state.view().status, ConnectionStatus::connecting());
        assert!(state.view().is_loading());
        assert!(state.view().last_update.is_none());
        assert_eq!(state.backoff(), Duration::from_millis(3_000));
    }

    #[test]
    fn test_success_replaces_snapshot_and_connects() {
        let mut state = PollState::new(BackoffPolicy::default(), 30);
        assert!(poll(&mut state, Ok(temp(22.0))));

        let view = state.view();
        assert_eq!(view.status, ConnectionStatus::connected());
        assert_eq!(view.sensors, temp(22.0));
        assert!(view.last_error.is_none());
        assert!(view.last_update.is_some());
        assert_eq!(view.history.points("temp_current"), vec![22.0]);
    }

    #[test]
    fn test_failure_keeps_stale_snapshot() {
        let mut state = PollState::new(BackoffPolicy::default(), 30);
        poll(&mut state, Ok(temp(22.0)));
        let updated_at = state.view().last_update;
        poll(&mut state, failure());

        let view = state.view();
        assert_eq!(view.status, ConnectionStatus::disconnected());
        assert_eq!(view.sensors, temp(22.0));
        assert_eq!(view.last_error.as_deref(), Some("API returned status 500"));
        assert_eq!(view.last_update, updated_at);
        assert_eq!(view.consecutive_failures, 1);
        assert_eq!(view.backoff, Duration::from_millis(4_800));
        assert!(!view.is_loading());
    }

    #[test]
    fn test_success_resets_backoff_after_failures() {
        let mut state = PollState::new(BackoffPolicy::default(), 30);
        for _ in 0..7 {
            poll(&mut state, failure());
        }
        assert_eq!(state.backoff(), Duration::from_millis(20_000));
        poll(&mut state, Ok(temp(23.0)));
        assert_eq!(state.backoff(), Duration::from_millis(3_000));
        assert_eq!(state.view().consecutive_failures, 0);
    }

    #[test]
    fn test_stale_outcomes_are_ignored() {
        let mut state = PollState::new(BackoffPolicy::default(), 30);
        let slow = state.begin();
        let fast = state.begin();

        assert!(state.apply(fast, Ok(temp(25.0)), Local::now()));
        assert!(!state.apply(slow, Ok(temp(19.0)), Local::now()));

        assert_eq!(state.view().sensors, temp(25.0));
        assert_eq!(state.view().history.points("temp_current"), vec![25.0]);
        assert_eq!(state.view().polls, 1);
    }

    #[test]
    fn test_hidden_uses_fixed_interval_and_keeps_backoff() {
        let hidden = Duration::from_millis(10_000);
        let mut state = PollState::new(BackoffPolicy::default(), 30);
        poll(&mut state, failure());
        poll(&mut state, failure());

        assert_eq!(state.next_delay(Visibility::Hidden, hidden), hidden);
        poll(&mut state, failure());
        assert_eq!(state.next_delay(Visibility::Hidden, hidden), hidden);

        // Back to visible: backoff kept growing underneath.
        let expected = 3_000.0 * 1.6_f64.powi(3);
        let visible = state.next_delay(Visibility::Visible, hidden);
        assert!((visible.as_secs_f64() * 1_000.0 - expected).abs() < 0.01);
    }
}
