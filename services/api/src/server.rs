use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryAccountRepository, InMemoryComplaintRepository};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use complaint_desk::accounts::{AccountService, Argon2Hasher, EmailPolicy};
use complaint_desk::attachments::{AttachmentPolicy, FsAttachmentStore};
use complaint_desk::complaints::{ComplaintService, TransitionPolicy};
use complaint_desk::config::AppConfig;
use complaint_desk::error::AppError;
use complaint_desk::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
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

    let attachments = Arc::new(FsAttachmentStore::open(&config.storage.upload_dir)?);
    let complaint_service = Arc::new(ComplaintService::new(
        Arc::new(InMemoryComplaintRepository::default()),
        attachments,
        AttachmentPolicy::new(config.storage.max_upload_bytes),
        TransitionPolicy {
            allow_reopen_resolved: config.policy.allow_reopen_resolved,
        },
    ));
    let account_service = Arc::new(AccountService::new(
        Arc::new(InMemoryAccountRepository::default()),
        Arc::new(Argon2Hasher::default()),
        EmailPolicy::new(&config.policy.email_domain),
    ));

    let app = with_service_routes(complaint_service, account_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer)
        .layer(CorsLayer::permissive());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        upload_dir = %config.storage.upload_dir.display(),
        "complaint desk ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
