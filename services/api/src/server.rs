use crate::cli::ServeArgs;
use crate::infra::{file_chat_store, AppState, FleetState};
use crate::routes::with_fleet_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use fleet_telematics::config::AppConfig;
use fleet_telematics::error::AppError;
use fleet_telematics::telemetry;
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

    let fleet_state = FleetState::sample(file_chat_store(&config.chat), config.chat.reply_delay)?;
    let vehicles = fleet_state.data.snapshot.vehicles.len();

    let app = with_fleet_routes(fleet_state)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, vehicles, "fleet telematics service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
