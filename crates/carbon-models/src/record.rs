//! Utilization records flowing through the model.

use serde_json::{Map, Value};

use crate::error::{ModelError, Result};

pub const TIMESTAMP: &str = "timestamp";
pub const DURATION: &str = "duration";
pub const CPU_UTILIZATION: &str = "cpu-utilization";
pub const RESOURCES_RESERVED: &str = "resources-reserved";
pub const RESOURCES_TOTAL: &str = "resources-total";
pub const ENERGY: &str = "energy";
pub const EMBODIED_CARBON: &str = "embodied-carbon";

/// Input record: an ordered JSON object.
pub type Record = Map<String, Value>;

/// Typed view of the fields of a [`Record`] used by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct UtilizationRecord {
    pub timestamp: String,
    /// Seconds, positive.
    pub duration: f64,
    /// Percent, 0-100.
    pub cpu_utilization: f64,
    pub resources_reserved: Option<f64>,
    pub resources_total: Option<f64>,
}

impl UtilizationRecord {
    /// Extracts and validates the model inputs of `record`.
    pub fn parse(record: &Record) -> Result<Self> {
        let timestamp = match record.get(TIMESTAMP) {
            Some(Value::String(timestamp)) => timestamp.clone(),
            Some(Value::Number(timestamp)) => timestamp.to_string(),
            Some(value) => return Err(invalid(TIMESTAMP, value, "a string or a number")),
            None => return Err(missing(TIMESTAMP)),
        };
        let duration = required_number(record, DURATION)?;
        if duration <= 0. {
            return Err(invalid(DURATION, &record[DURATION], "a positive number of seconds"));
        }
        let cpu_utilization = required_number(record, CPU_UTILIZATION)?;
        if !(0. ..=100.).contains(&cpu_utilization) {
            return Err(invalid(CPU_UTILIZATION, &record[CPU_UTILIZATION], "a percentage in 0-100"));
        }
        Ok(Self {
            timestamp,
            duration,
            cpu_utilization,
            resources_reserved: positive_option(record, RESOURCES_RESERVED)?,
            resources_total: positive_option(record, RESOURCES_TOTAL)?,
        })
    }
}

fn required_number(record: &Record, key: &str) -> Result<f64> {
    let value = record.get(key).ok_or_else(|| missing(key))?;
    value.as_f64().ok_or_else(|| invalid(key, value, "a number"))
}

fn positive_option(record: &Record, key: &str) -> Result<Option<f64>> {
    match record.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => match value.as_f64() {
            Some(number) if number > 0. => Ok(Some(number)),
            _ => Err(invalid(key, value, "a positive number")),
        },
    }
}

fn missing(key: &str) -> ModelError {
    ModelError::input("CarbonModel", format!("record has no '{}'", key))
}

fn invalid(key: &str, value: &Value, expected: &str) -> ModelError {
    ModelError::input("CarbonModel", format!("record '{}' must be {}, got {}", key, expected, value))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(value: Value) -> Record {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn parse_valid_record() {
        let parsed = UtilizationRecord::parse(&record(json!({
            "timestamp": "2024-01-01T00:00:00Z",
            "duration": 60,
            "cpu-utilization": 12.5
        })))
        .unwrap();
        assert_eq!(parsed.duration, 60.);
        assert_eq!(parsed.cpu_utilization, 12.5);
        assert_eq!(parsed.resources_reserved, None);
    }

    #[test]
    fn required_fields() {
        for key in [TIMESTAMP, DURATION, CPU_UTILIZATION] {
            let mut r = record(json!({"timestamp": "t", "duration": 60, "cpu-utilization": 10}));
            r.remove(key);
            assert!(UtilizationRecord::parse(&r).unwrap_err().is_input_validation(), "{}", key);
        }
    }

    #[test]
    fn out_of_range_values() {
        let r = record(json!({"timestamp": "t", "duration": 0, "cpu-utilization": 10}));
        assert!(UtilizationRecord::parse(&r).unwrap_err().is_input_validation());
        let r = record(json!({"timestamp": "t", "duration": 1, "cpu-utilization": 100.5}));
        assert!(UtilizationRecord::parse(&r).unwrap_err().is_input_validation());
        let r = record(json!({"timestamp": "t", "duration": 1, "cpu-utilization": "50"}));
        assert!(UtilizationRecord::parse(&r).unwrap_err().is_input_validation());
    }
}
