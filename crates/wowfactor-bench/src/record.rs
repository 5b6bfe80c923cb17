//! A single benchmark result as persisted in the results directory.

use chrono::{DateTime, Local, NaiveDateTime};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::workload::RunStats;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemInfo {
    pub platform: String,
    pub processor_model: String,
    pub processor_frequency: String,
}

impl SystemInfo {
    /// Machine identity used to group scores.
    pub fn machine_id(&self) -> (&str, &str) {
        (&self.processor_model, &self.platform)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRecord {
    pub timestamp: String,
    pub duration_seconds: f64,
    pub total_operations: u64,
    pub ops_per_second: f64,
    pub system: SystemInfo,
}

impl ScoreRecord {
    pub fn from_run(stats: &RunStats, system: SystemInfo, at: DateTime<Local>) -> Self {
        Self {
            timestamp: at.format(TIMESTAMP_FORMAT).to_string(),
            duration_seconds: round_to(stats.elapsed.as_secs_f64(), 4),
            total_operations: stats.total_ops,
            ops_per_second: round_to(stats.ops_per_second(), 2),
            system,
        }
    }

    /// Checks the minimum shape every score file must have, then decodes it.
    /// Only the presence of `ops_per_second`, `system` and
    /// `system.processor_model` decides validity; any other field that is
    /// missing or of the wrong type reads as its default.
    pub fn from_json_value(value: Value) -> Result<Self, String> {
        let obj = value.as_object().ok_or("not a JSON object")?;
        if !obj.contains_key("ops_per_second") {
            return Err("missing 'ops_per_second'".into());
        }
        let system = obj.get("system").ok_or("missing 'system'")?;
        let system = system.as_object().ok_or("'system' is not an object")?;
        if !system.contains_key("processor_model") {
            return Err("missing 'system.processor_model'".into());
        }
        Ok(Self {
            timestamp: text_field(obj, "timestamp"),
            duration_seconds: number_field(obj, "duration_seconds"),
            total_operations: count_field(obj, "total_operations"),
            ops_per_second: number_field(obj, "ops_per_second"),
            system: SystemInfo {
                platform: text_field(system, "platform"),
                processor_model: text_field(system, "processor_model"),
                processor_frequency: text_field(system, "processor_frequency"),
            },
        })
    }

    pub fn parsed_timestamp(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.timestamp, TIMESTAMP_FORMAT).ok()
    }
}

fn text_field(obj: &Map<String, Value>, key: &str) -> String {
    match obj.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

fn number_field(obj: &Map<String, Value>, key: &str) -> f64 {
    let n = match obj.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    n.filter(|v: &f64| v.is_finite()).unwrap_or(0.0)
}

// Float counts are truncated; `as` saturates negatives to 0.
fn count_field(obj: &Map<String, Value>, key: &str) -> u64 {
    match obj.get(key) {
        Some(Value::Number(n)) => n
            .as_u64()
            .unwrap_or_else(|| n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0) as u64),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
