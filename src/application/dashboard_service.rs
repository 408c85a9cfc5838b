// Dashboard service - One refresh cycle over every signal group
use crate::application::query_pipeline::QueryPipeline;
use crate::domain::dashboard::{Dashboard, Panel, PanelState};
use crate::domain::decoration::Decoration;
use crate::domain::derived::{latest, vector_magnitude};
use crate::domain::series::{SeriesError, SeriesTable, TimeRange};
use crate::infrastructure::config::SignalGroupConfig;
use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RefreshError {
    /// Another refresh on the same service started after this one. The
    /// generation counter is shared by every caller of the service, so two
    /// viewers refreshing at once also overtake each other.
    #[error("refresh {0} was superseded by a newer range selection")]
    Superseded(u64),
}

#[derive(Clone)]
pub struct DashboardService {
    pipeline: QueryPipeline,
    groups: Vec<SignalGroupConfig>,
    decoration: Arc<dyn Decoration>,
    decoration_group: String,
    /// Latest refresh ticket, process-wide (one dashboard viewer at a time)
    generation: Arc<AtomicU64>,
}

impl DashboardService {
    pub fn new(
        pipeline: QueryPipeline,
        groups: Vec<SignalGroupConfig>,
        decoration: Arc<dyn Decoration>,
        decoration_group: String,
    ) -> Self {
        Self {
            pipeline,
            groups,
            decoration,
            decoration_group,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Rebuild every panel for `range`. Groups are fetched one after another;
    /// a failing group only fails its own panel.
    pub async fn refresh(&self, range: TimeRange) -> Result<Dashboard, RefreshError> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mut panels = Vec::with_capacity(self.groups.len());
        let mut humidity = 0.0;

        for group in &self.groups {
            let state = self.fetch_panel_state(group, range).await;

            if self.generation.load(Ordering::SeqCst) != ticket {
                tracing::debug!("Dropping refresh {} after group {}", ticket, group.id);
                return Err(RefreshError::Superseded(ticket));
            }

            if group.id == self.decoration_group {
                // Derived groups keep only their output column
                if let PanelState::Data(table) = &state {
                    if let Some(field) = table.fields().first() {
                        humidity = latest(table, field);
                    }
                }
            }

            panels.push(Panel::new(
                group.id.clone(),
                group.title.clone(),
                group.unit.clone(),
                state,
            ));
        }

        let decoration = self.decoration.render(humidity);
        Ok(Dashboard::new(range, Utc::now(), panels, decoration))
    }

    async fn fetch_panel_state(&self, group: &SignalGroupConfig, range: TimeRange) -> PanelState {
        let table = match self
            .pipeline
            .fetch_series(&group.measurement, &group.fields, range)
            .await
        {
            Ok(table) => table,
            Err(e) => {
                tracing::error!("Error fetching group {}: {}", group.id, e);
                return PanelState::Failed(e.to_string());
            }
        };

        let table = match derive(group, table) {
            Ok(table) => table,
            Err(e) => {
                tracing::error!("Error deriving metrics for group {}: {}", group.id, e);
                return PanelState::Failed(e.to_string());
            }
        };

        if table.is_empty() {
            PanelState::NoData(group.no_data_message())
        } else {
            PanelState::Data(table)
        }
    }
}

fn derive(group: &SignalGroupConfig, table: SeriesTable) -> Result<SeriesTable, SeriesError> {
    match &group.magnitude {
        Some(output) => vector_magnitude(&table, &group.fields, output),
        None => Ok(table),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::query_pipeline::tests::{FakeRepository, minutes_ago};
    use crate::application::telemetry_repository::{QueryError, SeriesQuery, TelemetryRepository};
    use crate::domain::decoration::{PlantSketch, VitalityState};
    use crate::domain::series::RawRecord;
    use crate::infrastructure::config::default_groups;
    use async_trait::async_trait;
    use tokio::sync::Notify;

    fn service(repo: Arc<dyn TelemetryRepository>) -> DashboardService {
        DashboardService::new(
            QueryPipeline::new(repo),
            default_groups(),
            Arc::new(PlantSketch),
            "humidity".to_string(),
        )
    }

    fn state_of<'a>(dashboard: &'a Dashboard, id: &str) -> &'a PanelState {
        &dashboard.panels.iter().find(|p| p.id == id).unwrap().state
    }

    fn range() -> TimeRange {
        TimeRange::new(60).unwrap()
    }

    #[tokio::test]
    async fn test_missing_movement_only_blanks_movement_panels() {
        let repo = FakeRepository::default()
            .with(RawRecord::new("airSensor", "temperature", 21.5, minutes_ago(3)))
            .with(RawRecord::new("airSensor", "humidity", 48.0, minutes_ago(3)))
            .with(RawRecord::new("airSensor", "humidity", 55.0, minutes_ago(1)));

        let dashboard = service(Arc::new(repo)).refresh(range()).await.unwrap();

        assert_eq!(dashboard.panels.len(), 4);
        assert!(matches!(state_of(&dashboard, "temperature"), PanelState::Data(_)));
        assert!(matches!(state_of(&dashboard, "humidity"), PanelState::Data(_)));
        assert!(matches!(state_of(&dashboard, "movement"), PanelState::NoData(_)));
        assert!(matches!(state_of(&dashboard, "orientation"), PanelState::NoData(_)));

        assert_eq!(dashboard.decoration.humidity, 55.0);
        assert_eq!(dashboard.decoration.state, VitalityState::Active);
    }

    #[tokio::test]
    async fn test_failing_group_does_not_abort_others() {
        let repo = FakeRepository::default()
            .with(RawRecord::new("gyroscope", "gx", 0.1, minutes_ago(2)))
            .failing("airSensor");

        let dashboard = service(Arc::new(repo)).refresh(range()).await.unwrap();

        assert!(matches!(state_of(&dashboard, "temperature"), PanelState::Failed(_)));
        assert!(matches!(state_of(&dashboard, "humidity"), PanelState::Failed(_)));
        assert!(matches!(state_of(&dashboard, "orientation"), PanelState::Data(_)));
        assert_eq!(dashboard.decoration.humidity, 0.0);
        assert_eq!(dashboard.decoration.state, VitalityState::Dormant);
    }

    #[tokio::test]
    async fn test_movement_panel_holds_magnitude() {
        let at = minutes_ago(2);
        let repo = FakeRepository::default()
            .with(RawRecord::new("accelerometer", "ax", 3.0, at))
            .with(RawRecord::new("accelerometer", "ay", 4.0, at))
            .with(RawRecord::new("accelerometer", "az", 0.0, at));

        let dashboard = service(Arc::new(repo)).refresh(range()).await.unwrap();

        let PanelState::Data(table) = state_of(&dashboard, "movement") else {
            panic!("movement panel should have data");
        };
        assert_eq!(table.fields(), &["accel_magnitude"]);
        assert_eq!(table.column("accel_magnitude").unwrap(), vec![5.0]);
    }

    #[tokio::test]
    async fn test_decoration_reads_derived_group() {
        let repo = FakeRepository::default()
            .with(RawRecord::new("accelerometer", "ax", 30.0, minutes_ago(5)))
            .with(RawRecord::new("accelerometer", "ay", 40.0, minutes_ago(5)))
            .with(RawRecord::new("accelerometer", "az", 0.0, minutes_ago(5)))
            .with(RawRecord::new("accelerometer", "ax", 60.0, minutes_ago(1)))
            .with(RawRecord::new("accelerometer", "ay", 80.0, minutes_ago(1)))
            .with(RawRecord::new("accelerometer", "az", 0.0, minutes_ago(1)));
        let service = DashboardService::new(
            QueryPipeline::new(Arc::new(repo)),
            default_groups(),
            Arc::new(PlantSketch),
            "movement".to_string(),
        );

        let dashboard = service.refresh(range()).await.unwrap();

        assert_eq!(dashboard.decoration.humidity, 100.0);
        assert_eq!(dashboard.decoration.state, VitalityState::Vivid);
    }

    /// Blocks the first query until released so a second refresh can overtake it
    struct GatedRepository {
        gate: Notify,
        entered: Notify,
        inner: FakeRepository,
        calls: AtomicU64,
    }

    #[async_trait]
    impl TelemetryRepository for GatedRepository {
        async fn fetch_records(&self, query: &SeriesQuery) -> Result<Vec<RawRecord>, QueryError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                self.entered.notify_one();
                self.gate.notified().await;
            }
            self.inner.fetch_records(query).await
        }
    }

    #[tokio::test]
    async fn test_newer_refresh_supersedes_older() {
        let repo = Arc::new(GatedRepository {
            gate: Notify::new(),
            entered: Notify::new(),
            inner: FakeRepository::default(),
            calls: AtomicU64::new(0),
        });
        let service = service(repo.clone());

        let stale = {
            let service = service.clone();
            tokio::spawn(async move { service.refresh(range()).await })
        };
        repo.entered.notified().await;

        let fresh = service.refresh(TimeRange::new(30).unwrap()).await.unwrap();
        assert_eq!(fresh.range.minutes(), 30);

        repo.gate.notify_one();
        assert_eq!(stale.await.unwrap().unwrap_err(), RefreshError::Superseded(1));
    }
}
