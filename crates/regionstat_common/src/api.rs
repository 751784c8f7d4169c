//! Request and response bodies for the HTTP API.

use crate::aggregator::DEFAULT_THRESHOLD_MS;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Parsed `POST /` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRequest {
    pub regions: Vec<String>,
    pub threshold_ms: f64,
}

impl Default for MetricsRequest {
    fn default() -> Self {
        Self {
            regions: Vec::new(),
            threshold_ms: DEFAULT_THRESHOLD_MS,
        }
    }
}

impl MetricsRequest {
    /// Parse a raw body, coercing rather than rejecting.
    ///
    /// A body that is not a JSON object is an empty request. `regions` that
    /// is not an array counts as empty and non-string entries are dropped.
    /// `threshold_ms` accepts a number or a numeric string; anything else
    /// falls back to the default.
    pub fn from_json_bytes(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(value) => Self::from_value(&value),
            Err(e) => {
                debug!("Request body is not JSON ({}), treating as empty", e);
                Self::default()
            }
        }
    }

    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            debug!("Request body is not a JSON object, treating as empty");
            return Self::default();
        };

        let regions = match object.get("regions") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            None | Some(Value::Null) => Vec::new(),
            Some(other) => {
                debug!("Ignoring non-array regions: {}", other);
                Vec::new()
            }
        };

        let threshold_ms = match object.get("threshold_ms") {
            None | Some(Value::Null) => DEFAULT_THRESHOLD_MS,
            Some(raw) => coerce_threshold(raw).unwrap_or_else(|| {
                debug!("Ignoring non-numeric threshold_ms: {}", raw);
                DEFAULT_THRESHOLD_MS
            }),
        };

        Self {
            regions,
            threshold_ms,
        }
    }
}

fn coerce_threshold(raw: &Value) -> Option<f64> {
    let number = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

/// `GET /` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}
