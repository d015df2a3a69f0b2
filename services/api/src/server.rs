use crate::cli::ServeArgs;
use crate::infra::{collaborators, AppState, InMemoryApplicationStore, InMemoryPostingStore};
use crate::routes::with_screening_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use talent_screen::config::{AppConfig, ConfigError};
use talent_screen::error::AppError;
use talent_screen::telemetry;
use talent_screen::workflows::applications::ScreeningPipeline;
use talent_screen::workflows::postings::PostingEditorService;
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

    let postings = Arc::new(InMemoryPostingStore::default());
    let applications = Arc::new(InMemoryApplicationStore::default());
    let collaborators = collaborators(&config.collaborators)
        .map_err(|err| ConfigError::InvalidCollaborator(err.to_string()))?;

    let editor = Arc::new(PostingEditorService::new(
        postings.clone(),
        config.screening.default_currency,
    ));
    let pipeline = Arc::new(ScreeningPipeline::new(
        postings,
        applications,
        collaborators.digitizer,
        collaborators.scorer,
        &config.screening,
    ));

    let app = with_screening_routes(editor, pipeline)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        currency = config.screening.default_currency.code(),
        max_cv_bytes = config.screening.max_cv_bytes,
        "screening service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
