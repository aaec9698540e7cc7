use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryReportStore};
use crate::routes::with_analytics_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use incident_analytics::analytics::IncidentAnalyticsService;
use incident_analytics::config::AppConfig;
use incident_analytics::error::AppError;
use incident_analytics::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = match &config.data.seed_csv {
        Some(path) => InMemoryReportStore::from_csv(path)?,
        None => {
            info!("no APP_SEED_CSV configured; starting with an empty report store");
            InMemoryReportStore::default()
        }
    };
    let analytics_service = Arc::new(IncidentAnalyticsService::new(Arc::new(store)));

    let app = with_analytics_routes(analytics_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "incident analytics service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
