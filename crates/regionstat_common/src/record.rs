//! Telemetry records and the in-memory table they are loaded into.

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// One observation: a region, its measured latency and uptime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub region: String,
    pub latency_ms: f64,
    /// Conventionally in [0, 1]
    pub uptime: f64,
}

impl TelemetryRecord {
    pub fn new(region: impl Into<String>, latency_ms: f64, uptime: f64) -> Self {
        Self {
            region: region.into(),
            latency_ms,
            uptime,
        }
    }
}

/// Ordered, read-only collection of every record loaded for this process.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetryTable {
    records: Vec<TelemetryRecord>,
}

impl TelemetryTable {
    pub fn new(records: Vec<TelemetryRecord>) -> Self {
        Self { records }
    }

    /// Parse CSV text with a header row.
    ///
    /// The `region`, `latency_ms` and `uptime` columns are required and may
    /// appear in any order; other columns are ignored. A single malformed row
    /// fails the whole parse.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, StoreError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let records = reader
            .deserialize::<TelemetryRecord>()
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { records })
    }

    pub fn from_csv_str(text: &str) -> Result<Self, StoreError> {
        Self::from_csv_reader(text.as_bytes())
    }

    pub fn records(&self) -> &[TelemetryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records whose region equals `region` exactly, in table order.
    pub fn for_region<'a>(
        &'a self,
        region: &'a str,
    ) -> impl Iterator<Item = &'a TelemetryRecord> + 'a {
        self.records.iter().filter(move |r| r.region == region)
    }
}
