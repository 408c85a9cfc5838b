// InfluxDB 2.x repository implementation
use crate::application::telemetry_repository::{QueryError, SeriesQuery, TelemetryRepository};
use crate::domain::series::RawRecord;
use crate::infrastructure::config::InfluxSettings;
use crate::infrastructure::flux::build_series_query;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use influxdb2::Client;
use influxdb2::models::Query;
use influxdb2_structmap::value::Value;
use std::collections::BTreeMap;

/// Holds one client for the whole process; every query reuses it
pub struct InfluxRepository {
    client: Client,
    bucket: String,
}

impl InfluxRepository {
    pub fn new(settings: &InfluxSettings) -> Self {
        Self {
            client: Client::new(
                settings.url.trim_end_matches('/'),
                settings.org.as_str(),
                settings.token.as_str(),
            ),
            bucket: settings.bucket.clone(),
        }
    }
}

#[async_trait]
impl TelemetryRepository for InfluxRepository {
    async fn fetch_records(&self, query: &SeriesQuery) -> Result<Vec<RawRecord>, QueryError> {
        let flux = build_series_query(&self.bucket, query);
        tracing::debug!("Executing flux query: {}", flux);

        // The client's CSV parser can panic on cells it cannot read; keep that inside this group
        let client = self.client.clone();
        let records = tokio::spawn(async move { client.query_raw(Some(Query::new(flux))).await })
            .await
            .map_err(|e| QueryError::Store(format!("store client aborted: {}", e)))?
            .map_err(|e| QueryError::Store(e.to_string()))?;

        Ok(decode_records(query, records.iter().map(|r| &r.values)))
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Double(v) => Some(v.into_inner()),
        Value::Long(v) => Some(*v as f64),
        Value::UnsignedLong(v) => Some(*v as f64),
        _ => None,
    }
}

fn as_time(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::TimeRFC(t) => Some(t.with_timezone(&Utc)),
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        _ => None,
    }
}

/// Turn long-form store rows (`_time`, `_field`, `_value`) into `RawRecord`s.
///
/// Rows without a usable timestamp, field name or numeric value are skipped.
fn decode_records<'a, I>(query: &SeriesQuery, rows: I) -> Vec<RawRecord>
where
    I: IntoIterator<Item = &'a BTreeMap<String, Value>>,
{
    let mut records = Vec::new();

    for row in rows {
        let Some(time) = row.get("_time").and_then(as_time) else {
            tracing::warn!("Skipping {} row without a timestamp", query.measurement);
            continue;
        };
        let (Some(Value::String(field)), Some(value)) =
            (row.get("_field"), row.get("_value").and_then(as_f64))
        else {
            tracing::debug!("Skipping {} row without a numeric field value", query.measurement);
            continue;
        };
        let measurement = match row.get("_measurement") {
            Some(Value::String(m)) => m.clone(),
            _ => query.measurement.clone(),
        };

        records.push(RawRecord::new(measurement, field.clone(), value, time));
    }

    records
}
