//! Rolling history per sensor for sparklines and the detail chart.

use std::collections::{BTreeMap, HashMap, VecDeque};

use crate::source::SensorSnapshot;

/// Default number of samples kept per sensor.
pub const DEFAULT_MAX_POINTS: usize = 30;

/// Tracks a bounded window of numeric samples per sensor key.
///
/// Windows are created lazily on the first numeric observation of a key and
/// live for the whole session. Each [`record`](History::record) appends at
/// most one sample per reading and evicts the oldest sample once a window
/// exceeds `max_points`.
#[derive(Debug, Clone)]
pub struct History {
    windows: HashMap<String, VecDeque<f64>>,
    max_points: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_POINTS)
    }
}

impl History {
    /// Create an empty history keeping up to `max_points` samples per key.
    pub fn new(max_points: usize) -> Self {
        Self {
            windows: HashMap::new(),
            max_points: max_points.max(1),
        }
    }

    pub fn max_points(&self) -> usize {
        self.max_points
    }

    /// Record one snapshot.
    ///
    /// Readings without a key, and readings whose value is neither a number
    /// nor a boolean, leave history untouched.
    pub fn record(&mut self, snapshot: &SensorSnapshot) {
        for reading in snapshot {
            let Some(key) = reading.key() else {
                continue;
            };
            let Some(sample) = reading.value.as_sample() else {
                continue;
            };

            let window = self.windows.entry(key.to_string()).or_default();
            window.push_back(sample);
            if window.len() > self.max_points {
                window.pop_front();
            }
        }
    }

    /// An owned copy of every window, oldest sample first.
    pub fn current(&self) -> BTreeMap<String, Vec<f64>> {
        self.windows
            .iter()
            .map(|(key, window)| (key.clone(), window.iter().copied().collect()))
            .collect()
    }

    /// The window for a single key.
    pub fn get(&self, key: &str) -> Option<&VecDeque<f64>> {
        self.windows.get(key)
    }

    /// The samples for a key as a contiguous Vec (empty if unknown).
    pub fn points(&self, key: &str) -> Vec<f64> {
        self.windows
            .get(key)
            .map(|w| w.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Number of samples stored for a key.
    pub fn len(&self, key: &str) -> usize {
        self.windows.get(key).map_or(0, VecDeque::len)
    }

    /// Returns true if no window has been created yet.
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{SensorReading, SensorValue};

    fn snapshot(code: &str, value: SensorValue) -> SensorSnapshot {
        vec![SensorReading::new(code, value)]
    }

    #[test]
    fn test_window_is_capped_fifo() {
        let mut history = History::new(5);
        for i in 0..12 {
            history.record(&snapshot("temp_current", SensorValue::Number(i as f64)));
            assert_eq!(history.len("temp_current"), (i + 1).min(5));
        }
        assert_eq!(history.points("temp_current"), vec![7.0, 8.0, 9.0, 10.0, 11.0]);
    }

    #[test]
    fn test_default_keeps_thirty_points() {
        let mut history = History::default();
        for i in 0..45 {
            history.record(&snapshot("co2_value", SensorValue::Number(i as f64)));
        }
        let points = history.points("co2_value");
        assert_eq!(points.len(), 30);
        assert_eq!(points.first(), Some(&15.0));
        assert_eq!(points.last(), Some(&44.0));
    }

    #[test]
    fn test_booleans_coerce_to_one_and_zero() {
        let mut history = History::default();
        history.record(&snapshot("charge_state", SensorValue::Bool(true)));
        history.record(&snapshot("charge_state", SensorValue::Bool(false)));
        assert_eq!(history.points("charge_state"), vec![1.0, 0.0]);
    }

    #[test]
    fn test_non_numeric_values_leave_window_alone() {
        let mut history = History::default();
        history.record(&snapshot("humidity_value", SensorValue::Number(45.0)));
        history.record(&snapshot("humidity_value", SensorValue::Text("n/a".into())));
        history.record(&snapshot("humidity_value", SensorValue::Missing));
        assert_eq!(history.points("humidity_value"), vec![45.0]);

        // A string-only sensor never gets a window at all.
        history.record(&snapshot("air_quality_index", SensorValue::Text("level_1".into())));
        assert!(history.get("air_quality_index").is_none());
    }

    #[test]
    fn test_keyless_readings_are_skipped() {
        let mut history = History::default();
        history.record(&vec![SensorReading {
            value: SensorValue::Number(1.0),
            ..Default::default()
        }]);
        assert!(history.is_empty());
    }

    #[test]
    fn test_name_is_fallback_key() {
        let mut history = History::default();
        history.record(&vec![SensorReading {
            name: Some("Ruido".into()),
            value: SensorValue::Number(40.0),
            ..Default::default()
        }]);
        assert_eq!(history.points("Ruido"), vec![40.0]);
    }

    #[test]
    fn test_current_is_a_copy() {
        let mut history = History::default();
        history.record(&snapshot("pm25_value", SensorValue::Number(12.0)));

        let mut copy = history.current();
        copy.get_mut("pm25_value").unwrap().push(99.0);
        copy.clear();

        assert_eq!(history.points("pm25_value"), vec![12.0]);
    }
}
