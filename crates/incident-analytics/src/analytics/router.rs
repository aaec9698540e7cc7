use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::json;
use tracing::error;

use super::error::AnalyticsError;
use super::service::IncidentAnalyticsService;
use super::store::ReportStore;
use super::window::WindowQuery;

/// Body returned for any server-side failure; details stay in the logs.
pub const GENERIC_FAILURE: &str = "failed to compute analytics";

/// Router builder exposing the analytics dashboard.
pub fn analytics_router<S>(service: Arc<IncidentAnalyticsService<S>>) -> Router
where
    S: ReportStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/analytics/dashboard",
            get(dashboard_handler::<S>),
        )
        .with_state(service)
}

pub(crate) async fn dashboard_handler<S>(
    State(service): State<Arc<IncidentAnalyticsService<S>>>,
    Query(query): Query<WindowQuery>,
) -> Response
where
    S: ReportStore + 'static,
{
    match service.dashboard(&query).await {
        Ok(dashboard) => (StatusCode::OK, axum::Json(dashboard)).into_response(),
        Err(AnalyticsError::InvalidInput(message)) => {
            let payload = json!({
                "error": message,
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        Err(other) => {
            error!(error = %other, "analytics dashboard failed");
            let payload = json!({
                "error": GENERIC_FAILURE,
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
