// Query pipeline - Fetch a signal group and reshape it into a series table
use crate::application::telemetry_repository::{QueryError, SeriesQuery, TelemetryRepository};
use crate::domain::series::{SeriesTable, TimeRange};
use chrono::Utc;
use std::sync::Arc;

#[derive(Clone)]
pub struct QueryPipeline {
    repository: Arc<dyn TelemetryRepository>,
}

impl QueryPipeline {
    pub fn new(repository: Arc<dyn TelemetryRepository>) -> Self {
        Self { repository }
    }

    /// Fetch `fields` of `measurement` over the trailing `range`.
    ///
    /// Returns an empty table (with the requested field names) when the store
    /// has nothing in range. Single and multi-field requests share one path.
    pub async fn fetch_series(
        &self,
        measurement: &str,
        fields: &[String],
        range: TimeRange,
    ) -> Result<SeriesTable, QueryError> {
        if fields.is_empty() {
            return Err(QueryError::InvalidRequest(format!(
                "no fields requested for measurement '{}'",
                measurement
            )));
        }

        let since = range.start_from(Utc::now());
        let query = SeriesQuery::new(measurement, fields.to_vec(), range);
        let records = self.repository.fetch_records(&query).await?;
        let fetched = records.len();

        let table = SeriesTable::pivot(
            fields.to_vec(),
            records.into_iter().filter(|r| r.time >= since),
        );

        tracing::debug!(
            "Fetched {} records for {} {:?} over {}m -> {} rows",
            fetched,
            measurement,
            fields,
            range.minutes(),
            table.len()
        );

        Ok(table)
    }
}
