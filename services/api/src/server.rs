use crate::cli::ServeArgs;
use crate::infra::{seed_demo_users, AppState};
use crate::routes::with_listing_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use bridge::clock::SystemClock;
use bridge::config::AppConfig;
use bridge::error::AppError;
use bridge::listings::{ListingService, MemoryListingStore};
use bridge::telemetry;
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

    let store = Arc::new(MemoryListingStore::new());
    if !args.no_seed {
        let users = seed_demo_users(&store)?;
        info!(users = users.len(), "seeded user directory");
    }
    let listing_service = Arc::new(ListingService::new(
        store,
        Arc::new(SystemClock),
        config.ranking,
    ));

    let app = with_listing_routes(listing_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        top_projects_limit = config.ranking.top_projects_limit,
        "bridge listing service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
