use std::sync::Arc;

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{JsonRejection, QueryRejection},
        DefaultBodyLimit, Multipart, Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::domain::{Complaint, ComplaintKey, ComplaintSubmission, ListingScope, StatusUpdate};
use super::repository::ComplaintRepository;
use super::service::ComplaintService;
use crate::attachments::{AttachmentPolicy, AttachmentStore, AttachmentUpload};
use crate::error::ApiError;
use crate::store::run_blocking;

/// Headroom above the attachment ceiling for the text fields and multipart framing.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

const ATTACHMENT_FIELD: &str = "attachment";

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListQuery {
    pub(crate) role: Option<String>,
    pub(crate) email: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ComplaintEnvelope {
    pub(crate) message: &'static str,
    pub(crate) complaint: Complaint,
}

/// Router builder exposing complaint intake, listing, triage updates, and downloads.
pub fn complaint_router<R, S>(service: Arc<ComplaintService<R, S>>) -> Router
where
    R: ComplaintRepository + 'static,
    S: AttachmentStore + 'static,
{
    let body_limit = service
        .upload_policy()
        .max_bytes()
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route(
            "/complaints",
            post(submit_handler::<R, S>).get(list_handler::<R, S>),
        )
        .route("/complaints/:id/status", put(status_handler::<R, S>))
        .route(
            "/complaints/attachment/:filename",
            get(attachment_handler::<R, S>),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(service)
}

fn malformed(err: MultipartError) -> ApiError {
    ApiError::Validation(format!("Malformed multipart body: {}", err.body_text()))
}

/// Collect the text fields and the optional `attachment` file.
///
/// The file is checked against the policy while it streams in, so an oversized or disallowed
/// upload is refused before the service sees the submission.
pub(crate) async fn read_submission(
    mut multipart: Multipart,
    policy: AttachmentPolicy,
) -> Result<(ComplaintSubmission, Option<AttachmentUpload>), ApiError> {
    let mut submission = ComplaintSubmission::default();
    let mut upload = None;

    while let Some(mut field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            ATTACHMENT_FIELD => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                if file_name.is_empty() {
                    // Browsers send an empty part when no file was chosen.
                    continue;
                }
                if upload.is_some() {
                    return Err(ApiError::Validation(
                        "Only one attachment may be uploaded".to_string(),
                    ));
                }

                let content_type = field.content_type().map(str::to_string);
                policy.check_content_type(content_type.as_deref())?;

                let mut bytes = Vec::new();
                while let Some(chunk) = field.chunk().await.map_err(malformed)? {
                    bytes.extend_from_slice(&chunk);
                    policy.check_size(bytes.len())?;
                }

                upload = Some(AttachmentUpload {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            "title" => submission.title = Some(field.text().await.map_err(malformed)?),
            "description" => submission.description = Some(field.text().await.map_err(malformed)?),
            "category" => submission.category = Some(field.text().await.map_err(malformed)?),
            "createdByEmail" => {
                submission.created_by_email = Some(field.text().await.map_err(malformed)?)
            }
            _ => {}
        }
    }

    Ok((submission, upload))
}

pub(crate) async fn submit_handler<R, S>(
    State(service): State<Arc<ComplaintService<R, S>>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError>
where
    R: ComplaintRepository + 'static,
    S: AttachmentStore + 'static,
{
    let (submission, upload) = read_submission(multipart?, service.upload_policy()).await?;
    let complaint = run_blocking(move || service.submit(submission, upload)).await??;

    let envelope = ComplaintEnvelope {
        message: "Complaint submitted successfully",
        complaint,
    };
    Ok((StatusCode::CREATED, Json(envelope)).into_response())
}

pub(crate) async fn list_handler<R, S>(
    State(service): State<Arc<ComplaintService<R, S>>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Complaint>>, ApiError>
where
    R: ComplaintRepository + 'static,
    S: AttachmentStore + 'static,
{
    let Query(query) = query?;
    let scope = ListingScope::from_query(query.role.as_deref(), query.email.as_deref());
    let complaints = service.list(&scope)?;
    Ok(Json(complaints))
}

pub(crate) async fn status_handler<R, S>(
    State(service): State<Arc<ComplaintService<R, S>>>,
    Path(id): Path<String>,
    payload: Result<Json<StatusUpdate>, JsonRejection>,
) -> Result<Json<ComplaintEnvelope>, ApiError>
where
    R: ComplaintRepository + 'static,
    S: AttachmentStore + 'static,
{
    let Json(update) = payload?;
    let complaint = service.update_status(&ComplaintKey::parse(&id), update)?;
    Ok(Json(ComplaintEnvelope {
        message: "Complaint status updated successfully",
        complaint,
    }))
}

pub(crate) async fn attachment_handler<R, S>(
    State(service): State<Arc<ComplaintService<R, S>>>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError>
where
    R: ComplaintRepository + 'static,
    S: AttachmentStore + 'static,
{
    let blob = run_blocking(move || service.attachment(&filename)).await??;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, blob.content_type)],
        blob.bytes,
    )
        .into_response())
}
