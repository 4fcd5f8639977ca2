use crate::cli::ServeArgs;
use crate::infra::{open_store, AppState};
use crate::routes::with_operational_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use contact_intake::config::AppConfig;
use contact_intake::error::AppError;
use contact_intake::submissions::{
    submission_router, NotificationDispatcher, OriginPolicy, SubmissionService,
};
use contact_intake::telemetry;
use std::net::SocketAddr;
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

    // Client handles live for the whole process and are shared by every request.
    let store = Arc::new(open_store(&config.store)?);
    let notifier = Arc::new(NotificationDispatcher::from_config(&config.notifications));
    let service = Arc::new(SubmissionService::new(store, notifier));
    let origins = OriginPolicy::from_config(&config.cors);

    let app = with_operational_routes(submission_router(service, origins))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        environment = ?config.environment,
        notifications = ?config.notifications.mode,
        %addr,
        "contact intake service ready"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
