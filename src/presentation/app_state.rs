// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardService;
use crate::domain::series::RangeBounds;

#[derive(Clone)]
pub struct AppState {
    pub dashboard_service: DashboardService,
    pub range_bounds: RangeBounds,
}
