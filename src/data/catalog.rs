//! Display rules per sensor code.
//!
//! Every known sensor code maps to a [`SensorKind`]; unknown codes fall
//! back to [`SensorKind::Unknown`], which renders with generic labels.

use crate::source::{SensorReading, SensorValue};

/// Known sensor kinds, resolved from the API's sensor code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    AirQuality,
    Temperature,
    Humidity,
    Co2,
    Formaldehyde,
    Pm25,
    Pm1,
    Pm10,
    Battery,
    ChargeState,
    Unknown,
}

/// Air quality grade derived from the `level_N` index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AirQualityGrade {
    pub name: &'static str,
    /// Fill percentage for the progress bar.
    pub progress: u16,
}

/// A suggested range shown in the detail view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestedRange {
    pub label: &'static str,
    pub range: &'static str,
}

impl SensorKind {
    pub fn from_code(code: &str) -> Self {
        match code {
            "air_quality_index" => SensorKind::AirQuality,
            "temp_current" => SensorKind::Temperature,
            "humidity_value" => SensorKind::Humidity,
            "co2_value" => SensorKind::Co2,
            "ch2o_value" => SensorKind::Formaldehyde,
            "pm25_value" => SensorKind::Pm25,
            "pm1" => SensorKind::Pm1,
            "pm10" => SensorKind::Pm10,
            "battery_percentage" => SensorKind::Battery,
            "charge_state" => SensorKind::ChargeState,
            _ => SensorKind::Unknown,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            SensorKind::AirQuality => "Calidad del Aire",
            SensorKind::Temperature => "Temperatura",
            SensorKind::Humidity => "Humedad",
            SensorKind::Co2 => "CO₂",
            SensorKind::Formaldehyde => "Formaldehído",
            SensorKind::Pm25 => "PM2.5",
            SensorKind::Pm1 => "PM1.0",
            SensorKind::Pm10 => "PM10",
            SensorKind::Battery => "Batería",
            SensorKind::ChargeState => "Estado de Carga",
            SensorKind::Unknown => "Sensor Desconocido",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            SensorKind::Temperature => "°C",
            SensorKind::Humidity | SensorKind::Battery => "%",
            SensorKind::Co2 => "ppm",
            SensorKind::Formaldehyde => "mg/m³",
            SensorKind::Pm25 | SensorKind::Pm1 | SensorKind::Pm10 => "μg/m³",
            SensorKind::AirQuality | SensorKind::ChargeState | SensorKind::Unknown => "",
        }
    }

    /// Single-character glyph used in cards and chips.
    pub fn icon(&self) -> &'static str {
        match self {
            SensorKind::AirQuality => "≋",
            SensorKind::Temperature => "°",
            SensorKind::Humidity => "◒",
            SensorKind::Co2 => "◎",
            SensorKind::Formaldehyde => "⚗",
            SensorKind::Pm25 | SensorKind::Pm10 => "░",
            SensorKind::Pm1 => "·",
            SensorKind::Battery => "▮",
            SensorKind::ChargeState => "⚡",
            SensorKind::Unknown => "●",
        }
    }

    /// Short description of the current value.
    pub fn describe(&self, value: &SensorValue) -> String {
        if let SensorKind::AirQuality = self {
            return match value.as_text() {
                Some(index) => format!("Índice: {}", index),
                None => "Índice desconocido".to_string(),
            };
        }
        if let SensorKind::ChargeState = self {
            let charging = value.as_bool().unwrap_or_else(|| value.as_sample().unwrap_or(0.0) != 0.0);
            return if charging { "Cargando" } else { "Desconectado" }.to_string();
        }

        let v = value.as_number();
        let text = match (self, v) {
            (SensorKind::Temperature, Some(v)) if v > 25.0 => "Ambiente cálido",
            (SensorKind::Temperature, Some(v)) if v < 18.0 => "Ambiente frío",
            (SensorKind::Temperature, _) => "Temperatura ideal",
            (SensorKind::Humidity, Some(v)) if v > 60.0 => "Humedad alta",
            (SensorKind::Humidity, Some(v)) if v < 40.0 => "Ambiente seco",
            (SensorKind::Humidity, _) => "Humedad óptima",
            (SensorKind::Co2, Some(v)) if v > 1000.0 => "Ventilación necesaria",
            (SensorKind::Co2, _) => "Nivel aceptable",
            (SensorKind::Formaldehyde, _) => "Compuesto orgánico volátil",
            (SensorKind::Pm25, Some(v)) if v > 35.0 => "Partículas elevadas",
            (SensorKind::Pm25, _) => "Aire limpio",
            (SensorKind::Pm1, _) => "Partículas ultrafinas",
            (SensorKind::Pm10, Some(v)) if v > 50.0 => "Partículas elevadas",
            (SensorKind::Pm10, _) => "Nivel aceptable",
            (SensorKind::Battery, Some(v)) if v > 20.0 => "Batería suficiente",
            (SensorKind::Battery, _) => "Batería baja",
            _ => "Sensor activo",
        };
        text.to_string()
    }

    /// Air quality grade for `level_1..3`, `None` for any other kind.
    pub fn air_quality_grade(&self, value: &SensorValue) -> Option<AirQualityGrade> {
        if *self != SensorKind::AirQuality {
            return None;
        }
        let (name, progress) = match value.as_text() {
            Some("level_1") => ("Buena", 33),
            Some("level_2") => ("Moderada", 66),
            Some("level_3") => ("Mala", 100),
            _ => ("Desconocida", 0),
        };
        Some(AirQualityGrade { name, progress })
    }

    /// Progress bar fill (0..=100) for percentage-like sensors.
    pub fn progress(&self, value: &SensorValue) -> Option<u16> {
        if let Some(grade) = self.air_quality_grade(value) {
            return Some(grade.progress);
        }
        match self {
            SensorKind::Battery | SensorKind::Humidity => {
                value.as_number().map(|v| v.clamp(0.0, 100.0).round() as u16)
            }
            _ => None,
        }
    }

    pub fn ranges(&self) -> [SuggestedRange; 3] {
        let r = |label, range| SuggestedRange { label, range };
        match self {
            SensorKind::Temperature => [
                r("Frío", "< 18°C"),
                r("Óptimo", "18–25°C"),
                r("Cálido", "> 25°C"),
            ],
            SensorKind::Humidity => [
                r("Seco", "< 40%"),
                r("Óptimo", "40–60%"),
                r("Alto", "> 60%"),
            ],
            SensorKind::Co2 => [
                r("Bueno", "< 800 ppm"),
                r("Atención", "800–1000 ppm"),
                r("Ventilar", "> 1000 ppm"),
            ],
            _ => [r("Bajo", "—"), r("Medio", "—"), r("Alto", "—")],
        }
    }
}

/// Title for a reading: its own name, else the catalog title.
pub fn display_title(reading: &SensorReading) -> String {
    match reading.name.as_deref() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => SensorKind::from_code(reading.code()).title().to_string(),
    }
}

/// Unit for a reading: the API's unit if sent, else the catalog unit.
pub fn display_unit(reading: &SensorReading) -> String {
    match reading.unit.as_deref() {
        Some(unit) if !unit.is_empty() => unit.to_string(),
        _ => SensorKind::from_code(reading.code()).unit().to_string(),
    }
}

/// Format a reading's value for a card.
///
/// Whole numbers print without decimals, other numbers with two; booleans
/// print as `SÍ`/`NO`; air quality prints its grade name.
pub fn format_value(reading: &SensorReading) -> String {
    let kind = SensorKind::from_code(reading.code());
    if let Some(grade) = kind.air_quality_grade(&reading.value) {
        return grade.name.to_string();
    }
    match &reading.value {
        SensorValue::Number(n) => format_number(*n),
        SensorValue::Bool(true) => "SÍ".to_string(),
        SensorValue::Bool(false) => "NO".to_string(),
        SensorValue::Text(s) => s.clone(),
        SensorValue::Missing => "--".to_string(),
        SensorValue::Other(v) => v.to_string(),
    }
}

/// Round to two decimals, dropping the fraction for whole numbers.
pub fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return "--".to_string();
    }
    // Large values skip the scaling by 100, which could overflow.
    let rounded = if n.abs() < 1e15 { (n * 100.0).round() / 100.0 } else { n };
    if rounded.fract() == 0.0 {
        // `+ 0.0` turns -0 into 0.
        format!("{}", rounded + 0.0)
    } else {
        format!("{:.2}", rounded)
    }
}
