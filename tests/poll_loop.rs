//! Poll loop behaviour under a paused tokio clock.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use envwatch::{
    FetchError, PollConfig, PollHandle, SensorReading, SensorSnapshot, SensorSource, SensorValue,
    Visibility,
};

#[derive(Debug, Clone, Copy)]
enum Step {
    Ok(f64),
    Fail,
    /// Succeed after a delay.
    Slow(Duration, f64),
}

/// Source that plays back a fixed script, then keeps succeeding with 20.0.
#[derive(Debug)]
struct ScriptedSource {
    script: Mutex<VecDeque<Step>>,
    calls: AtomicUsize,
    started: Mutex<Vec<Instant>>,
}

impl ScriptedSource {
    fn new(steps: &[Step]) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(steps.iter().copied().collect()),
            calls: AtomicUsize::new(0),
            started: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Offsets from `origin` at which each fetch started.
    fn offsets(&self, origin: Instant) -> Vec<Duration> {
        self.started.lock().unwrap().iter().map(|t| *t - origin).collect()
    }
}

fn temp(v: f64) -> SensorSnapshot {
    vec![SensorReading::new("temp_current", SensorValue::Number(v))]
}

#[async_trait]
impl SensorSource for ScriptedSource {
    async fn fetch(&self) -> Result<SensorSnapshot, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.started.lock().unwrap().push(Instant::now());
        let step = self.script.lock().unwrap().pop_front().unwrap_or(Step::Ok(20.0));
        match step {
            Step::Ok(v) => Ok(temp(v)),
            Step::Fail => Err(FetchError::Network("connection refused".to_string())),
            Step::Slow(delay, v) => {
                tokio::time::sleep(delay).await;
                Ok(temp(v))
            }
        }
    }

    fn description(&self) -> &str {
        "scripted"
    }
}

fn assert_near(actual: Duration, expected_ms: u64) {
    let expected = Duration::from_millis(expected_ms);
    let diff = if actual > expected { actual - expected } else { expected - actual };
    assert!(
        diff <= Duration::from_millis(5),
        "expected ~{:?}, got {:?}",
        expected,
        actual
    );
}

async fn wait_until_calls(source: &ScriptedSource, n: usize) {
    while source.calls() < n {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test(start_paused = true)]
async fn recovers_after_failures_and_keeps_history() {
    let source = ScriptedSource::new(&[Step::Ok(22.0), Step::Fail, Step::Fail, Step::Ok(23.0)]);
    let handle = PollHandle::spawn(source.clone(), PollConfig::default());
    let mut updates = handle.subscribe();

    let state = updates.wait_for(|s| s.polls >= 4).await.unwrap().clone();

    assert!(state.status.connected);
    assert_eq!(state.status.message, "Conectado");
    assert!(state.last_error.is_none());
    assert_eq!(state.sensors, temp(23.0));
    assert_eq!(state.history.points("temp_current"), vec![22.0, 23.0]);
    assert_eq!(state.backoff, Duration::from_millis(3_000));
    assert_eq!(state.consecutive_failures, 0);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn failures_show_disconnected_with_stale_data() {
    let source = ScriptedSource::new(&[Step::Ok(22.0), Step::Fail]);
    let handle = PollHandle::spawn(source.clone(), PollConfig::default());
    let mut updates = handle.subscribe();

    let state = updates.wait_for(|s| s.polls >= 2).await.unwrap().clone();

    assert!(!state.status.connected);
    assert_eq!(state.status.message, "Error de conexión");
    assert_eq!(state.last_error.as_deref(), Some("Network error: connection refused"));
    assert_eq!(state.sensors, temp(22.0));
    assert_eq!(state.next_poll_in, Duration::from_millis(4_800));

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn backoff_spaces_out_retries_then_resets() {
    let origin = Instant::now();
    let source = ScriptedSource::new(&[Step::Fail, Step::Fail, Step::Ok(21.0)]);
    let handle = PollHandle::spawn(source.clone(), PollConfig::default());
    let mut updates = handle.subscribe();

    updates.wait_for(|s| s.polls >= 4).await.unwrap();
    let offsets = source.offsets(origin);

    assert_near(offsets[0], 0);
    assert_near(offsets[1], 4_800);
    assert_near(offsets[2], 4_800 + 7_680);
    assert_near(offsets[3], 4_800 + 7_680 + 3_000);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn hidden_dashboard_polls_at_fixed_interval() {
    let origin = Instant::now();
    let source = ScriptedSource::new(&[Step::Fail]);
    let handle = PollHandle::spawn(source.clone(), PollConfig::default());
    handle.set_visibility(Visibility::Hidden);
    let mut updates = handle.subscribe();

    let state = updates.wait_for(|s| s.polls >= 3).await.unwrap().clone();
    let offsets = source.offsets(origin);

    assert_near(offsets[1], 10_000);
    assert_near(offsets[2], 20_000);
    // The success after the first failure reset the backoff.
    assert_eq!(state.backoff, Duration::from_millis(3_000));

    handle.set_visibility(Visibility::Visible);
    updates.wait_for(|s| s.polls >= 4).await.unwrap();
    let offsets = source.offsets(origin);
    assert_near(offsets[3], 30_000);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn rapid_visibility_toggles_neither_add_nor_skip_polls() {
    let origin = Instant::now();
    let source = ScriptedSource::new(&[]);
    let handle = PollHandle::spawn(source.clone(), PollConfig::default());
    let mut updates = handle.subscribe();

    updates.wait_for(|s| s.polls >= 1).await.unwrap();
    for _ in 0..5 {
        tokio::time::sleep(Duration::from_millis(200)).await;
        handle.set_visibility(Visibility::Hidden);
        handle.set_visibility(Visibility::Visible);
    }
    handle.set_visibility(Visibility::Hidden);
    assert_eq!(source.calls(), 1);

    // The wait chosen while visible (3 s) still runs to completion.
    updates.wait_for(|s| s.polls >= 2).await.unwrap();
    assert_eq!(source.calls(), 2);
    assert_near(source.offsets(origin)[1], 3_000);

    // The next decision sees the final state: hidden.
    updates.wait_for(|s| s.polls >= 3).await.unwrap();
    assert_eq!(source.calls(), 3);
    assert_near(source.offsets(origin)[2], 13_000);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn refresh_cuts_the_wait_short() {
    let origin = Instant::now();
    let source = ScriptedSource::new(&[]);
    let handle = PollHandle::spawn(source.clone(), PollConfig::default());
    let mut updates = handle.subscribe();

    updates.wait_for(|s| s.polls >= 1).await.unwrap();
    assert!(handle.refresh());
    updates.wait_for(|s| s.polls >= 2).await.unwrap();

    let offsets = source.offsets(origin);
    assert!(offsets[1] < Duration::from_millis(100), "refresh waited {:?}", offsets[1]);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn refresh_during_a_fetch_is_dropped() {
    let origin = Instant::now();
    let source = ScriptedSource::new(&[Step::Slow(Duration::from_secs(2), 22.0)]);
    let handle = PollHandle::spawn(source.clone(), PollConfig::default());
    let mut updates = handle.subscribe();

    wait_until_calls(&source, 1).await;
    assert!(handle.refresh());

    updates.wait_for(|s| s.polls >= 2).await.unwrap();
    let offsets = source.offsets(origin);

    // Slow fetch (2 s) then the regular 3 s interval, not an immediate poll.
    assert_eq!(source.calls(), 2);
    assert_near(offsets[1], 5_000);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn shutdown_discards_in_flight_result() {
    let source = ScriptedSource::new(&[Step::Ok(22.0), Step::Slow(Duration::from_secs(5), 99.0)]);
    let handle = PollHandle::spawn(source.clone(), PollConfig::default());
    let updates = handle.subscribe();

    wait_until_calls(&source, 2).await;
    handle.shutdown().await;

    tokio::time::sleep(Duration::from_secs(60)).await;

    let state = updates.borrow().clone();
    assert_eq!(state.polls, 1);
    assert_eq!(state.sensors, temp(22.0));
    assert_eq!(source.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_stops_polling() {
    let source = ScriptedSource::new(&[]);
    let handle = PollHandle::spawn(source.clone(), PollConfig::default());
    let mut updates = handle.subscribe();

    updates.wait_for(|s| s.polls >= 1).await.unwrap();
    drop(handle);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(source.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn clock_ticks_every_second() {
    let source = ScriptedSource::new(&[]);
    let handle = PollHandle::spawn(source, PollConfig::default());

    tokio::time::sleep(Duration::from_millis(1_500)).await;
    let clock = handle.clock();
    assert_eq!(clock.len(), 8);
    assert_eq!(clock.matches(':').count(), 2);

    handle.shutdown().await;
}
