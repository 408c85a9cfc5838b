// Repository trait for telemetry data access
use crate::domain::series::{RawRecord, TimeRange};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("invalid query: {0}")]
    InvalidRequest(String),
    #[error("time-series store request failed: {0}")]
    Store(String),
}

/// A range-bounded request for some fields of one measurement
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesQuery {
    pub measurement: String,
    pub fields: Vec<String>,
    pub range: TimeRange,
}

impl SeriesQuery {
    pub fn new(measurement: impl Into<String>, fields: Vec<String>, range: TimeRange) -> Self {
        Self {
            measurement: measurement.into(),
            fields,
            range,
        }
    }
}

#[async_trait]
pub trait TelemetryRepository: Send + Sync {
    /// Fetch the records matching `query`, one `RawRecord` per field value
    async fn fetch_records(&self, query: &SeriesQuery) -> Result<Vec<RawRecord>, QueryError>;
}
