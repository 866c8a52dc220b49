use crate::cli::ServeArgs;
use crate::images::ImageResolver;
use crate::infra::{Advisor, AppState};
use crate::routes::with_recommendation_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};
use wheelchair_advisor::catalog::{CatalogProvider, CsvCatalog};
use wheelchair_advisor::config::AppConfig;
use wheelchair_advisor::error::AppError;
use wheelchair_advisor::service::RecommendationService;
use wheelchair_advisor::telemetry;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(catalog) = args.catalog.take() {
        config.catalog.path = catalog;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let catalog = CsvCatalog::new(config.catalog.path.clone());
    match catalog.load() {
        Ok(table) => info!(path = %catalog.path().display(), rows = table.len(), "catalog available"),
        Err(err) => warn!(error = %err, "catalog not readable yet; requests will report it"),
    }

    let images = ImageResolver::new(&config.images);
    if !images.directory().is_dir() {
        warn!(directory = %images.directory().display(), "image directory missing; responses omit images");
    }

    let service = RecommendationService::new(Arc::new(catalog));
    let advisor = Arc::new(Advisor::new(service, images, config.random_seed));

    let app = with_recommendation_routes(advisor)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "wheelchair advisor ready");

    axum::serve(listener, app).await?;
    Ok(())
}
