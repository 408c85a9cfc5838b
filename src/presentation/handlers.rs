// HTTP request handlers
use crate::application::dashboard_service::RefreshError;
use crate::presentation::app_state::AppState;
use crate::presentation::views::{RangeView, dashboard_to_view};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct RangeQuery {
    pub minutes: Option<i64>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Slider bounds for the range selector
pub async fn range_bounds(State(state): State<Arc<AppState>>) -> Json<RangeView> {
    Json(state.range_bounds.into())
}

/// Rebuild every panel for the requested lookback window
pub async fn dashboard(
    Query(query): Query<RangeQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let range = state.range_bounds.clamp(query.minutes);

    match state.dashboard_service.refresh(range).await {
        Ok(dashboard) => Json(dashboard_to_view(dashboard)).into_response(),
        Err(e @ RefreshError::Superseded(_)) => {
            tracing::debug!("{}", e);
            (StatusCode::CONFLICT, e.to_string()).into_response()
        }
    }
}
