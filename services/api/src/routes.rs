use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use complaint_desk::accounts::{auth_router, AccountRepository, AccountService, CredentialHasher};
use complaint_desk::attachments::AttachmentStore;
use complaint_desk::complaints::{complaint_router, ComplaintRepository, ComplaintService};
use serde_json::json;
use std::sync::Arc;

const BANNER: &str = "Complaint desk is running";

/// Merge the account and complaint routers with the operational endpoints.
pub(crate) fn with_service_routes<CR, S, AR, H>(
    complaints: Arc<ComplaintService<CR, S>>,
    accounts: Arc<AccountService<AR, H>>,
) -> Router
where
    CR: ComplaintRepository + 'static,
    S: AttachmentStore + 'static,
    AR: AccountRepository + 'static,
    H: CredentialHasher + 'static,
{
    Router::new()
        .route("/", get(banner))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .merge(auth_router(accounts))
        .merge(complaint_router(complaints))
}

pub(crate) async fn banner() -> &'static str {
    BANNER
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
