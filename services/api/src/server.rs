use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryFormStore, LocalFileStorage};
use crate::routes::with_form_routes;
use axum::extract::DefaultBodyLimit;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use formdesk::config::AppConfig;
use formdesk::error::AppError;
use formdesk::forms::FormService;
use formdesk::telemetry;
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
    if let Some(upload_dir) = args.upload_dir.take() {
        config.storage.upload_dir = upload_dir;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemoryFormStore::default());
    let files = Arc::new(LocalFileStorage::new(config.storage.upload_dir.clone()));
    let form_service = Arc::new(FormService::new(store, files));

    let app = with_form_routes(form_service)
        .layer(Extension(app_state))
        .layer(DefaultBodyLimit::max(config.storage.max_upload_bytes))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        upload_dir = %config.storage.upload_dir.display(),
        "form service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
