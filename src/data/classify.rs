//! Sensor classification into health levels.
//!
//! [`classify`] is a pure function of a single reading; it is called fresh
//! on every render and carries no state between snapshots.

use serde::Serialize;

use crate::source::{SensorReading, SensorSnapshot};

/// Health level for a sensor reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum HealthStatus {
    #[serde(rename = "ok")]
    Healthy,
    #[serde(rename = "warn")]
    Warning,
    #[serde(rename = "crit")]
    Critical,
}

impl HealthStatus {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "OK",
            HealthStatus::Warning => "WARN",
            HealthStatus::Critical => "CRIT",
        }
    }

    /// Returns the label used in the status overview pills.
    pub fn label(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "OK",
            HealthStatus::Warning => "Atención",
            HealthStatus::Critical => "Crítico",
        }
    }

    /// Score driving the heat indicator.
    pub fn score(&self) -> f64 {
        match self {
            HealthStatus::Healthy => OK_SCORE,
            HealthStatus::Warning => WARN_SCORE,
            HealthStatus::Critical => CRIT_SCORE,
        }
    }
}

const OK_SCORE: f64 = 0.2;
const WARN_SCORE: f64 = 0.6;
const CRIT_SCORE: f64 = 1.0;
const FALLBACK_SCORE: f64 = 0.3;

/// Number of segments in the heat indicator.
pub const HEAT_SEGMENTS: usize = 10;

/// The outcome of classifying one reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    pub level: HealthStatus,
    pub note: &'static str,
    pub score: f64,
}

impl Classification {
    fn new(level: HealthStatus, note: &'static str) -> Self {
        Self {
            level,
            note,
            score: level.score(),
        }
    }

    fn fallback() -> Self {
        Self {
            level: HealthStatus::Healthy,
            note: "Activo",
            score: FALLBACK_SCORE,
        }
    }

    /// Which of the heat indicator segments are lit.
    ///
    /// Segment `i` is on when `i / 9 <= score`.
    pub fn heat(&self) -> [bool; HEAT_SEGMENTS] {
        let mut segments = [false; HEAT_SEGMENTS];
        for (i, on) in segments.iter_mut().enumerate() {
            *on = i as f64 / (HEAT_SEGMENTS - 1) as f64 <= self.score;
        }
        segments
    }
}

/// Classify a single reading.
pub fn classify(reading: &SensorReading) -> Classification {
    use HealthStatus::*;

    let value = &reading.value;
    match (reading.code(), value.as_number()) {
        ("air_quality_index", _) => match value.as_text() {
            Some("level_1") => Classification::new(Healthy, "Buena"),
            Some("level_2") => Classification::new(Warning, "Moderada"),
            Some("level_3") => Classification::new(Critical, "Mala"),
            _ => Classification::fallback(),
        },
        ("humidity_value", Some(v)) => {
            if !(40.0..=60.0).contains(&v) {
                Classification::new(Warning, "Fuera de óptimo")
            } else {
                Classification::new(Healthy, "Óptimo")
            }
        }
        ("temp_current", Some(v)) => {
            if !(18.0..=25.0).contains(&v) {
                Classification::new(Warning, "Fuera de confort")
            } else {
                Classification::new(Healthy, "Confort")
            }
        }
        ("co2_value", Some(v)) => {
            if v > 1000.0 {
                Classification::new(Critical, "Ventilación")
            } else if v > 800.0 {
                Classification::new(Warning, "Atención")
            } else {
                Classification::new(Healthy, "Bueno")
            }
        }
        ("battery_percentage", Some(v)) => {
            if v <= 10.0 {
                Classification::new(Critical, "Batería crítica")
            } else if v <= 20.0 {
                Classification::new(Warning, "Batería baja")
            } else {
                Classification::new(Healthy, "OK")
            }
        }
        _ => Classification::fallback(),
    }
}

/// Count of readings per level across a snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LevelCounts {
    pub ok: usize,
    pub warn: usize,
    pub crit: usize,
}

impl LevelCounts {
    pub fn from_snapshot(snapshot: &SensorSnapshot) -> Self {
        let mut counts = Self::default();
        for reading in snapshot {
            counts.add(classify(reading).level);
        }
        counts
    }

    pub fn add(&mut self, level: HealthStatus) {
        match level {
            HealthStatus::Healthy => self.ok += 1,
            HealthStatus::Warning => self.warn += 1,
            HealthStatus::Critical => self.crit += 1,
        }
    }

    pub fn get(&self, level: HealthStatus) -> usize {
        match level {
            HealthStatus::Healthy => self.ok,
            HealthStatus::Warning => self.warn,
            HealthStatus::Critical => self.crit,
        }
    }

    pub fn total(&self) -> usize {
        self.ok + self.warn + self.crit
    }

    /// The worst level present, or `Healthy` when empty.
    pub fn worst(&self) -> HealthStatus {
        if self.crit > 0 {
            HealthStatus::Critical
        } else if self.warn > 0 {
            HealthStatus::Warning
        } else {
            HealthStatus::Healthy
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SensorValue;

    fn num(code: &str, v: f64) -> SensorReading {
        SensorReading::new(code, SensorValue::Number(v))
    }

    fn text(code: &str, v: &str) -> SensorReading {
        SensorReading::new(code, SensorValue::Text(v.to_string()))
    }

    #[test]
    fn test_co2_boundaries() {
        assert_eq!(
            classify(&num("co2_value", 1001.0)),
            Classification {
                level: HealthStatus::Critical,
                note: "Ventilación",
                score: 1.0
            }
        );
        assert_eq!(classify(&num("co2_value", 1000.0)).level, HealthStatus::Warning);
        assert_eq!(classify(&num("co2_value", 801.0)).note, "Atención");
        assert_eq!(
            classify(&num("co2_value", 800.0)),
            Classification {
                level: HealthStatus::Healthy,
                note: "Bueno",
                score: 0.2
            }
        );
    }

    #[test]
    fn test_battery_boundaries() {
        assert_eq!(classify(&num("battery_percentage", 10.0)).level, HealthStatus::Critical);
        assert_eq!(classify(&num("battery_percentage", 10.0)).note, "Batería crítica");
        assert_eq!(classify(&num("battery_percentage", 11.0)).level, HealthStatus::Warning);
        assert_eq!(classify(&num("battery_percentage", 20.0)).note, "Batería baja");
        assert_eq!(classify(&num("battery_percentage", 21.0)).level, HealthStatus::Healthy);
        assert_eq!(classify(&num("battery_percentage", 21.0)).note, "OK");
    }

    #[test]
    fn test_humidity_and_temperature_ranges_are_inclusive() {
        assert_eq!(classify(&num("humidity_value", 40.0)).note, "Óptimo");
        assert_eq!(classify(&num("humidity_value", 60.0)).note, "Óptimo");
        assert_eq!(classify(&num("humidity_value", 39.9)).note, "Fuera de óptimo");
        assert_eq!(classify(&num("humidity_value", 60.1)).level, HealthStatus::Warning);

        assert_eq!(classify(&num("temp_current", 18.0)).note, "Confort");
        assert_eq!(classify(&num("temp_current", 25.0)).note, "Confort");
        assert_eq!(classify(&num("temp_current", 17.5)).note, "Fuera de confort");
        assert_eq!(classify(&num("temp_current", 25.5)).level, HealthStatus::Warning);
    }

    #[test]
    fn test_air_quality_levels() {
        assert_eq!(classify(&text("air_quality_index", "level_1")).note, "Buena");
        assert_eq!(classify(&text("air_quality_index", "level_2")).level, HealthStatus::Warning);
        assert_eq!(classify(&text("air_quality_index", "level_3")).level, HealthStatus::Critical);
        assert_eq!(classify(&text("air_quality_index", "level_9")).note, "Activo");
    }

    #[test]
    fn test_fallback_for_unknown_and_mismatched_values() {
        let unknown = classify(&num("pm25_value", 80.0));
        assert_eq!(unknown.level, HealthStatus::Healthy);
        assert_eq!(unknown.note, "Activo");
        assert_eq!(unknown.score, 0.3);

        // A numeric code carrying a string falls back too.
        assert_eq!(classify(&text("co2_value", "high")).note, "Activo");
        assert_eq!(
            classify(&SensorReading::new("temp_current", SensorValue::Bool(true))).note,
            "Activo"
        );
    }

    #[test]
    fn test_classify_is_deterministic() {
        let reading = num("co2_value", 950.0);
        assert_eq!(classify(&reading), classify(&reading));
    }

    #[test]
    fn test_heat_segments() {
        let lit = |c: Classification| c.heat().iter().filter(|on| **on).count();
        assert_eq!(lit(classify(&num("co2_value", 400.0))), 2);
        assert_eq!(lit(classify(&num("co2_value", 900.0))), 6);
        assert_eq!(lit(classify(&num("co2_value", 1500.0))), 10);
        assert_eq!(lit(classify(&num("pm1", 3.0))), 3);
        assert!(classify(&num("co2_value", 400.0)).heat()[0]);
    }

    #[test]
    fn test_level_counts() {
        let snapshot = vec![
            num("co2_value", 1200.0),
            num("temp_current", 30.0),
            num("humidity_value", 50.0),
            text("air_quality_index", "level_3"),
            num("pm10", 12.0),
        ];
        let counts = LevelCounts::from_snapshot(&snapshot);
        assert_eq!(counts, LevelCounts { ok: 2, warn: 1, crit: 2 });
        assert_eq!(counts.total(), 5);
        assert_eq!(counts.worst(), HealthStatus::Critical);
        assert_eq!(LevelCounts::default().worst(), HealthStatus::Healthy);
    }
}
