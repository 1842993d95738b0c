use crate::cli::ServeArgs;
use crate::infra::InMemoryLeadRepository;
use crate::routes::{cors_layer, with_lead_routes, AppState};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use findmeagent::config::AppConfig;
use findmeagent::error::AppError;
use findmeagent::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
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
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryLeadRepository::default());
    let app = with_lead_routes(repository, cors_layer(&config.server))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        cors_origins = ?config.server.cors_origins,
        "lead intake api ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
