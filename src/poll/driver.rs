//! Async driver for the poll state machine.
//!
//! [`PollHandle::spawn`] starts two tasks on the current tokio runtime:
//!
//! - the poll loop, which owns a [`PollState`], fetches from the source,
//!   publishes a [`DashboardState`] after every poll and sleeps until the
//!   next one;
//! - the clock, which publishes the formatted local time every second.
//!
//! Both stop when the handle is shut down or dropped.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::state::{DashboardState, PollState};
use super::{PollConfig, Visibility};
use crate::source::SensorSource;

/// Placeholder shown before the clock's first tick.
pub const CLOCK_PLACEHOLDER: &str = "--:--:--";

/// Commands the dashboard can send to the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollCommand {
    /// Poll now instead of waiting for the timer.
    RefreshNow,
}

/// What ended the wait between two polls.
enum Tick {
    Elapsed,
    Refresh,
    Cancelled,
}

/// Handle to a running poll loop and clock.
#[derive(Debug)]
pub struct PollHandle {
    state: watch::Receiver<DashboardState>,
    clock: watch::Receiver<String>,
    visibility: watch::Sender<Visibility>,
    commands: mpsc::Sender<PollCommand>,
    cancel: CancellationToken,
    poll_task: Option<JoinHandle<()>>,
    clock_task: Option<JoinHandle<()>>,
    description: String,
}

impl PollHandle {
    /// Spawn the poll loop and the clock on the current runtime.
    ///
    /// The first poll starts immediately, whatever the visibility.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    pub fn spawn(source: Arc<dyn SensorSource>, config: PollConfig) -> Self {
        let poll_state = PollState::new(config.backoff, config.max_points);
        let (state_tx, state_rx) = watch::channel(poll_state.view().clone());
        let (clock_tx, clock_rx) = watch::channel(CLOCK_PLACEHOLDER.to_string());
        let (visibility_tx, visibility_rx) = watch::channel(Visibility::Visible);
        let (command_tx, command_rx) = mpsc::channel(4);
        let cancel = CancellationToken::new();
        let description = source.description().to_string();

        info!("Starting poll loop for {}", description);

        let poll_task = tokio::spawn(run_poll_loop(
            source,
            poll_state,
            config.hidden_interval,
            state_tx,
            visibility_rx,
            command_rx,
            cancel.clone(),
        ));
        let clock_task = tokio::spawn(run_clock(clock_tx, config.clock_interval, cancel.clone()));

        Self {
            state: state_rx,
            clock: clock_rx,
            visibility: visibility_tx,
            commands: command_tx,
            cancel,
            poll_task: Some(poll_task),
            clock_task: Some(clock_task),
            description,
        }
    }

    /// Returns the source description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// A receiver that is notified after every applied poll.
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state.clone()
    }

    /// Take the latest state if it changed since the last call.
    pub fn take_update(&mut self) -> Option<DashboardState> {
        if self.state.has_changed().unwrap_or(false) {
            Some(self.state.borrow_and_update().clone())
        } else {
            None
        }
    }

    /// The latest published state.
    pub fn latest(&self) -> DashboardState {
        self.state.borrow().clone()
    }

    /// The latest clock text (`HH:MM:SS`).
    pub fn clock(&self) -> String {
        self.clock.borrow().clone()
    }

    /// Tell the poll loop whether the dashboard is visible.
    ///
    /// Takes effect at the next scheduling decision.
    pub fn set_visibility(&self, visibility: Visibility) {
        self.visibility.send_if_modified(|current| {
            if *current == visibility {
                false
            } else {
                debug!("Visibility changed to {:?}", visibility);
                *current = visibility;
                true
            }
        });
    }

    pub fn visibility(&self) -> Visibility {
        *self.visibility.borrow()
    }

    /// Ask for an immediate poll.
    ///
    /// Returns false if the request could not be queued. Requests that
    /// arrive while a poll is in flight are dropped by the loop.
    pub fn refresh(&self) -> bool {
        self.commands.try_send(PollCommand::RefreshNow).is_ok()
    }

    /// Stop both tasks and wait for them to finish.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        for task in [self.poll_task.take(), self.clock_task.take()].into_iter().flatten() {
            let _ = task.await;
        }
        info!("Poll loop for {} shut down", self.description);
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
        for task in [self.poll_task.take(), self.clock_task.take()].into_iter().flatten() {
            task.abort();
        }
    }
}

async fn run_poll_loop(
    source: Arc<dyn SensorSource>,
    mut state: PollState,
    hidden_interval: Duration,
    state_tx: watch::Sender<DashboardState>,
    visibility: watch::Receiver<Visibility>,
    mut commands: mpsc::Receiver<PollCommand>,
    cancel: CancellationToken,
) {
    loop {
        let seq = state.begin();
        trace!("Poll #{} started", seq);

        let outcome = tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Poll #{} abandoned on shutdown", seq);
                break;
            }
            outcome = source.fetch() => outcome,
        };

        match &outcome {
            Ok(snapshot) => debug!("Poll #{} returned {} sensors", seq, snapshot.len()),
            Err(e) => warn!("Poll #{} failed: {}", seq, e),
        }
        state.apply(seq, outcome, Local::now());

        // Refresh requests that piled up during the fetch are dropped.
        let mut dropped = 0;
        while commands.try_recv().is_ok() {
            dropped += 1;
        }
        if dropped > 0 {
            trace!("Dropped {} refresh request(s) received during poll #{}", dropped, seq);
        }

        let current_visibility = *visibility.borrow();
        let delay = state.next_delay(current_visibility, hidden_interval);
        state.schedule(delay);
        state_tx.send_replace(state.view().clone());
        debug!("Next poll in {:?} ({:?})", delay, current_visibility);

        match wait_for_next_tick(delay, &mut commands, &cancel).await {
            Tick::Elapsed => {}
            Tick::Refresh => debug!("Refresh requested"),
            Tick::Cancelled => break,
        }
    }
    info!("Poll loop stopped");
}

async fn wait_for_next_tick(
    delay: Duration,
    commands: &mut mpsc::Receiver<PollCommand>,
    cancel: &CancellationToken,
) -> Tick {
    let sleep = tokio::time::sleep(delay);
    tokio::pin!(sleep);
    let mut commands_open = true;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => return Tick::Cancelled,
            _ = &mut sleep => return Tick::Elapsed,
            command = commands.recv(), if commands_open => match command {
                Some(PollCommand::RefreshNow) => return Tick::Refresh,
                None => commands_open = false,
            },
        }
    }
}

async fn run_clock(tx: watch::Sender<String>, period: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                tx.send_replace(format_clock(&Local::now()));
            }
        }
    }
}

/// Format a time as `HH:MM:SS` (24 h).
pub fn format_clock(time: &DateTime<Local>) -> String {
    time.format("%H:%M:%S").to_string()
}
