use crate::cli::ServeArgs;
use crate::infra::{AppState, ScoringContext};
use crate::routes::with_scoring_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tenant_risk::config::AppConfig;
use tenant_risk::error::AppError;
use tenant_risk::scoring::HttpScoringClient;
use tenant_risk::telemetry;
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
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let client = HttpScoringClient::new(&config.scoring)?;
    info!(endpoint = %client.endpoint(), timeout = ?config.scoring.timeout, "scoring service configured");
    let context = ScoringContext::new(
        Arc::new(client),
        config.scoring.thresholds,
        config.server.session_capacity,
    );

    let app = with_scoring_routes(context)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "tenant risk assessment page ready");

    axum::serve(listener, app).await?;
    Ok(())
}
