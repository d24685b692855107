//! JSON export of the dashboard state.

use std::path::Path;

use anyhow::Result;
use serde_json::{json, Value};

use crate::data::catalog::{display_title, display_unit, format_value};
use crate::data::{classify, LevelCounts};
use crate::poll::DashboardState;

/// Build the export document for a dashboard state.
///
/// Contains the connection status, level counts, every sensor with its
/// classification, and the history windows.
pub fn build_export(state: &DashboardState) -> Value {
    let counts = LevelCounts::from_snapshot(&state.sensors);

    let sensors: Vec<Value> = state
        .sensors
        .iter()
        .map(|reading| {
            let classification = classify(reading);
            json!({
                "key": reading.key(),
                "code": reading.code,
                "title": display_title(reading),
                "value": reading.value,
                "display": format_value(reading),
                "unit": display_unit(reading),
                "level": classification.level,
                "note": classification.note,
                "score": classification.score,
            })
        })
        .collect();

    json!({
        "status": state.status,
        "last_error": state.last_error,
        "last_update": state.last_update.map(|t| t.to_rfc3339()),
        "summary": {
            "total": counts.total(),
            "ok": counts.ok,
            "warn": counts.warn,
            "crit": counts.crit,
        },
        "sensors": sensors,
        "history": state.history.current(),
    })
}

/// Write the export document to `path` as pretty JSON.
pub fn write_export(state: &DashboardState, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&build_export(state))?;
    std::fs::write(path, json)?;
    Ok(())
}
