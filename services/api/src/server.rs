use crate::cli::ServeArgs;
use crate::infra::{demo_roster, AppState};
use crate::routes::with_maintenance_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use repairdesk::config::AppConfig;
use repairdesk::error::AppError;
use repairdesk::telemetry;
use repairdesk::workflows::maintenance::TriageEngine;
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

    let engine = TriageEngine::new(demo_roster(), config.dispatch);

    let app = with_maintenance_routes(engine)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        dispatch_delay_ms = config.dispatch.delay.as_millis() as u64,
        "maintenance triage service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
