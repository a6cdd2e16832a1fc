use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryDocumentStore};
use crate::routes::with_survey_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use persona_survey::config::AppConfig;
use persona_survey::error::AppError;
use persona_survey::survey::router::SurveyApi;
use persona_survey::survey::service::{AdminService, SurveyService};
use persona_survey::telemetry;
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

    let store = Arc::new(InMemoryDocumentStore::default());
    for admin in &config.admin.bootstrap_admins {
        store.grant_admin(admin);
    }

    let api = SurveyApi {
        survey: Arc::new(SurveyService::new(store.clone())),
        admin: Arc::new(AdminService::new(store)),
    };

    let app = with_survey_routes(api)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "survey service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
