// Time series domain models
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    #[error("field '{0}' is not part of the table")]
    UnknownField(String),
    #[error("expected 3 axis fields, got {0}")]
    AxisCount(usize),
}

/// Lookback window in minutes, ending now. Always > 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    minutes: u32,
}

impl TimeRange {
    pub fn new(minutes: u32) -> Option<Self> {
        (minutes > 0).then_some(Self { minutes })
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    /// Relative start literal understood by Flux, e.g. "-60m"
    pub fn flux_start(&self) -> String {
        format!("-{}m", self.minutes)
    }

    pub fn start_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::minutes(i64::from(self.minutes))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeBounds {
    pub min_minutes: u32,
    pub max_minutes: u32,
    pub default_minutes: u32,
}

impl Default for RangeBounds {
    fn default() -> Self {
        Self {
            min_minutes: 10,
            max_minutes: 180,
            default_minutes: 60,
        }
    }
}

impl RangeBounds {
    /// Clamp a requested lookback into the bounds. Missing requests get the default.
    pub fn clamp(&self, requested: Option<i64>) -> TimeRange {
        let min = self.min_minutes.max(1);
        let max = self.max_minutes.max(min);
        let minutes = match requested {
            Some(m) => m.clamp(i64::from(min), i64::from(max)) as u32,
            None => self.default_minutes.clamp(min, max),
        };
        TimeRange { minutes }
    }
}

/// One measurement/field/value sample as returned by the store
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub measurement: String,
    pub field: String,
    pub value: f64,
    pub time: DateTime<Utc>,
}

impl RawRecord {
    pub fn new(measurement: impl Into<String>, field: impl Into<String>, value: f64, time: DateTime<Utc>) -> Self {
        Self {
            measurement: measurement.into(),
            field: field.into(),
            value,
            time,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRow {
    pub time: DateTime<Utc>,
    /// Aligned with `SeriesTable::fields`; NaN where the store had no value
    pub values: Vec<f64>,
}

/// Wide table: one row per timestamp, one column per field, ascending by time.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesTable {
    fields: Vec<String>,
    rows: Vec<SeriesRow>,
}

impl SeriesTable {
    /// Pivot long-format records into wide rows keyed by timestamp.
    ///
    /// Records for fields outside `fields` are ignored. When the same
    /// timestamp/field pair appears twice the later record wins.
    pub fn pivot<I>(fields: Vec<String>, records: I) -> Self
    where
        I: IntoIterator<Item = RawRecord>,
    {
        let mut by_time: BTreeMap<DateTime<Utc>, Vec<f64>> = BTreeMap::new();

        for record in records {
            let Some(idx) = fields.iter().position(|f| *f == record.field) else {
                continue;
            };
            let values = by_time
                .entry(record.time)
                .or_insert_with(|| vec![f64::NAN; fields.len()]);
            values[idx] = record.value;
        }

        let rows = by_time
            .into_iter()
            .map(|(time, values)| SeriesRow { time, values })
            .collect();

        Self { fields, rows }
    }

    pub(crate) fn from_rows(fields: Vec<String>, rows: Vec<SeriesRow>) -> Self {
        Self { fields, rows }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn rows(&self) -> &[SeriesRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn field_index(&self, field: &str) -> Result<usize, SeriesError> {
        self.fields
            .iter()
            .position(|f| f == field)
            .ok_or_else(|| SeriesError::UnknownField(field.to_string()))
    }

    pub fn column(&self, field: &str) -> Result<Vec<f64>, SeriesError> {
        let idx = self.field_index(field)?;
        Ok(self.rows.iter().map(|r| r.values[idx]).collect())
    }

    pub fn times(&self) -> Vec<DateTime<Utc>> {
        self.rows.iter().map(|r| r.time).collect()
    }
}
