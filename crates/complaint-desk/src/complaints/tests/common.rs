use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::attachments::{AttachmentError, AttachmentPolicy, AttachmentStore};
use crate::complaints::domain::{
    Complaint, ComplaintFilter, ComplaintId, ComplaintKey, ComplaintStatus, ComplaintSubmission,
    Priority,
};
use crate::complaints::id::ComplaintIdGenerator;
use crate::complaints::repository::{sort_newest_first, ComplaintRepository, RepositoryError};
use crate::complaints::status::TransitionPolicy;
use crate::complaints::{complaint_router, ComplaintService};

pub(super) type TestService = ComplaintService<MemoryRepository, MemoryBlobs>;

pub(super) fn submission(email: &str, description: &str) -> ComplaintSubmission {
    ComplaintSubmission {
        title: Some("Hostel issue".to_string()),
        description: Some(description.to_string()),
        category: Some("Hostel".to_string()),
        created_by_email: Some(email.to_string()),
    }
}

pub(super) fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 2, day, hour, 0, 0).unwrap()
}

pub(super) fn stored_complaint(reference: &str, email: &str, date: DateTime<Utc>) -> Complaint {
    Complaint {
        id: Uuid::new_v4(),
        complaint_id: ComplaintId(reference.to_string()),
        title: "Broken fan".to_string(),
        description: "The ceiling fan in room 12 is broken".to_string(),
        category: "Maintenance".to_string(),
        priority: Priority::High,
        summary: "The ceiling fan in room 12 is broken".to_string(),
        status: ComplaintStatus::Pending,
        created_by_email: email.to_string(),
        admin_response: None,
        attachment_name: None,
        attachment_type: None,
        attachment_path: None,
        date,
        last_updated: None,
        resolution_date: None,
    }
}

pub(super) fn build_service() -> (TestService, Arc<MemoryRepository>, Arc<MemoryBlobs>) {
    build_service_with(AttachmentPolicy::default(), TransitionPolicy::default())
}

pub(super) fn build_service_with(
    upload_policy: AttachmentPolicy,
    transitions: TransitionPolicy,
) -> (TestService, Arc<MemoryRepository>, Arc<MemoryBlobs>) {
    let repository = Arc::new(MemoryRepository::default());
    let blobs = Arc::new(MemoryBlobs::default());
    let service = ComplaintService::new(
        repository.clone(),
        blobs.clone(),
        upload_policy,
        transitions,
    );
    (service, repository, blobs)
}

pub(super) fn router_with_service(service: TestService) -> axum::Router {
    complaint_router(Arc::new(service))
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<Uuid, Complaint>>>,
}

impl MemoryRepository {
    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("repository mutex poisoned").len()
    }
}

impl ComplaintRepository for MemoryRepository {
    fn insert(&self, record: Complaint) -> Result<Complaint, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id)
            || guard
                .values()
                .any(|existing| existing.complaint_id == record.complaint_id)
        {
            return Err(RepositoryError::Conflict(format!(
                "complaint {} already exists",
                record.complaint_id
            )));
        }
        guard.insert(record.id, record.clone());
        Ok(record)
    }

    fn list(&self, filter: &ComplaintFilter) -> Result<Vec<Complaint>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut matching: Vec<Complaint> = guard
            .values()
            .filter(|complaint| filter.matches(complaint))
            .cloned()
            .collect();
        sort_newest_first(&mut matching);
        Ok(matching)
    }

    fn fetch(&self, key: &ComplaintKey) -> Result<Option<Complaint>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().find(|complaint| key.matches(complaint)).cloned())
    }

    fn update(&self, record: Complaint) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        match guard.get_mut(&record.id) {
            Some(existing) => {
                *existing = record;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }
}

pub(super) struct UnavailableRepository;

impl ComplaintRepository for UnavailableRepository {
    fn insert(&self, _record: Complaint) -> Result<Complaint, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self, _filter: &ComplaintFilter) -> Result<Vec<Complaint>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _key: &ComplaintKey) -> Result<Option<Complaint>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: Complaint) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryBlobs {
    blobs: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryBlobs {
    pub(super) fn bytes(&self, name: &str) -> Option<Vec<u8>> {
        self.blobs
            .lock()
            .expect("blob mutex poisoned")
            .get(name)
            .cloned()
    }

    pub(super) fn names(&self) -> Vec<String> {
        let guard = self.blobs.lock().expect("blob mutex poisoned");
        let mut names: Vec<String> = guard.keys().cloned().collect();
        names.sort();
        names
    }
}

impl AttachmentStore for MemoryBlobs {
    fn store(&self, name: &str, bytes: &[u8]) -> Result<(), AttachmentError> {
        let mut guard = self.blobs.lock().expect("blob mutex poisoned");
        if guard.contains_key(name) {
            return Err(AttachmentError::AlreadyExists {
                name: name.to_string(),
            });
        }
        guard.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    fn exists(&self, name: &str) -> Result<bool, AttachmentError> {
        Ok(self
            .blobs
            .lock()
            .expect("blob mutex poisoned")
            .contains_key(name))
    }

    fn read(&self, name: &str) -> Result<Option<Vec<u8>>, AttachmentError> {
        Ok(self
            .blobs
            .lock()
            .expect("blob mutex poisoned")
            .get(name)
            .cloned())
    }

    fn remove(&self, name: &str) -> Result<(), AttachmentError> {
        self.blobs.lock().expect("blob mutex poisoned").remove(name);
        Ok(())
    }
}

/// Always hands out the same reference, to exercise the uniqueness guard.
pub(super) struct FixedIds(pub(super) &'static str);

impl ComplaintIdGenerator for FixedIds {
    fn next_id(&self) -> ComplaintId {
        ComplaintId(self.0.to_string())
    }
}

pub(super) const BOUNDARY: &str = "complaint-desk-test-boundary";

/// Hand-rolled multipart body: text fields plus an optional `(filename, content type, bytes)`.
pub(super) fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, content_type, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"attachment\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub(super) fn multipart_request(body: Vec<u8>) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::post("/complaints")
        .header(
            axum::http::header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(axum::body::Body::from(body))
        .unwrap()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(response.status(), expected);
}
