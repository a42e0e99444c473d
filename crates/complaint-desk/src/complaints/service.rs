use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::classifier::classify;
use super::domain::{
    Complaint, ComplaintKey, ComplaintStatus, ComplaintSubmission, ListingScope, StatusUpdate,
};
use super::id::{ComplaintIdGenerator, SequencedIdGenerator};
use super::repository::{ComplaintRepository, RepositoryError};
use super::status::{Transition, TransitionError, TransitionPolicy};
use super::summary::summarize;
use crate::attachments::{
    sanitize_file_name, stored_file_name, AttachmentBlob, AttachmentError, AttachmentPolicy,
    AttachmentStore, AttachmentUpload, UploadRejection,
};

/// Service composing triage, the complaint repository, and attachment storage.
pub struct ComplaintService<R, S> {
    repository: Arc<R>,
    attachments: Arc<S>,
    ids: Arc<dyn ComplaintIdGenerator>,
    upload_policy: AttachmentPolicy,
    transitions: TransitionPolicy,
}

fn required(value: Option<String>, message: &str) -> Result<String, ComplaintServiceError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ComplaintServiceError::Validation(message.to_string())),
    }
}

impl<R, S> ComplaintService<R, S>
where
    R: ComplaintRepository + 'static,
    S: AttachmentStore + 'static,
{
    pub fn new(
        repository: Arc<R>,
        attachments: Arc<S>,
        upload_policy: AttachmentPolicy,
        transitions: TransitionPolicy,
    ) -> Self {
        Self {
            repository,
            attachments,
            ids: Arc::new(SequencedIdGenerator),
            upload_policy,
            transitions,
        }
    }

    pub fn with_id_generator<G>(mut self, ids: G) -> Self
    where
        G: ComplaintIdGenerator + 'static,
    {
        self.ids = Arc::new(ids);
        self
    }

    pub fn upload_policy(&self) -> AttachmentPolicy {
        self.upload_policy
    }

    /// Triage and persist a new complaint.
    ///
    /// The attachment, when present, is validated before anything is written and stored before
    /// the record that references it.
    pub fn submit(
        &self,
        submission: ComplaintSubmission,
        upload: Option<AttachmentUpload>,
    ) -> Result<Complaint, ComplaintServiceError> {
        let created_by_email = required(submission.created_by_email, "User email is required")?;
        let title = required(submission.title, "Title is required")?;
        let description = required(submission.description, "Description is required")?;
        let category = required(submission.category, "Category is required")?;

        let validated = match &upload {
            Some(upload) => Some(self.upload_policy.validate(upload).map_err(|rejection| {
                warn!(%created_by_email, file = %upload.file_name, %rejection, "attachment rejected");
                rejection
            })?),
            None => None,
        };

        let now = Utc::now();
        let mut complaint = Complaint {
            id: Uuid::new_v4(),
            complaint_id: self.ids.next_id(),
            priority: classify(&description),
            summary: summarize(&description),
            title,
            description,
            category,
            status: ComplaintStatus::Pending,
            created_by_email,
            admin_response: None,
            attachment_name: None,
            attachment_type: None,
            attachment_path: None,
            date: now,
            last_updated: None,
            resolution_date: None,
        };

        if let (Some(upload), Some((content_type, file_name))) = (upload, validated) {
            let stored_name = stored_file_name(now, Uuid::new_v4(), &file_name);
            self.attachments.store(&stored_name, &upload.bytes)?;
            complaint.attachment_name = Some(upload.file_name);
            complaint.attachment_type = Some(content_type);
            complaint.attachment_path = Some(stored_name);
        }

        let stored_name = complaint.attachment_path.clone();
        match self.repository.insert(complaint) {
            Ok(stored) => {
                info!(
                    complaint_id = %stored.complaint_id,
                    priority = stored.priority.label(),
                    attachment = stored.attachment_path.is_some(),
                    "complaint submitted"
                );
                Ok(stored)
            }
            Err(err) => {
                if let Some(stored_name) = stored_name {
                    self.discard_orphaned_attachment(&stored_name);
                }
                Err(err.into())
            }
        }
    }

    /// Best effort: the record never landed, so nothing references the blob.
    fn discard_orphaned_attachment(&self, stored_name: &str) {
        if let Err(err) = self.attachments.remove(stored_name) {
            error!(%stored_name, %err, "failed to remove orphaned attachment");
        }
    }

    /// Complaints visible for the given scope, most recent first.
    pub fn list(&self, scope: &ListingScope) -> Result<Vec<Complaint>, ComplaintServiceError> {
        if *scope == ListingScope::Unscoped {
            warn!("complaint listing requested without role/email; returning every complaint");
        }
        Ok(self.repository.list(&scope.filter())?)
    }

    pub fn get(&self, key: &ComplaintKey) -> Result<Complaint, ComplaintServiceError> {
        self.repository
            .fetch(key)?
            .ok_or(ComplaintServiceError::NotFound)
    }

    /// Validate and apply an admin status change.
    pub fn update_status(
        &self,
        key: &ComplaintKey,
        update: StatusUpdate,
    ) -> Result<Complaint, ComplaintServiceError> {
        let raw_status = required(update.status, "Status is required")?;
        let status = raw_status
            .parse::<ComplaintStatus>()
            .map_err(|err| ComplaintServiceError::Validation(err.to_string()))?;
        let transition = Transition::new(status, update.admin_response.as_deref())?;

        let mut complaint = self.get(key)?;
        let previous = complaint.status;
        transition.apply(&mut complaint, self.transitions, Utc::now())?;

        match self.repository.update(complaint.clone()) {
            Ok(()) => {}
            Err(RepositoryError::NotFound) => return Err(ComplaintServiceError::NotFound),
            Err(other) => return Err(other.into()),
        }

        info!(
            complaint_id = %complaint.complaint_id,
            from = %previous,
            to = %complaint.status,
            "complaint status updated"
        );
        Ok(complaint)
    }

    /// Load a stored attachment by name; only the base name of `file_name` is honoured.
    pub fn attachment(&self, file_name: &str) -> Result<AttachmentBlob, ComplaintServiceError> {
        let name = sanitize_file_name(file_name).ok_or(ComplaintServiceError::AttachmentNotFound)?;
        if !self.attachments.exists(&name)? {
            return Err(ComplaintServiceError::AttachmentNotFound);
        }

        let bytes = self
            .attachments
            .read(&name)?
            .ok_or(ComplaintServiceError::AttachmentNotFound)?;
        Ok(AttachmentBlob::new(name, bytes))
    }
}

/// Error raised by the complaint service.
#[derive(Debug, thiserror::Error)]
pub enum ComplaintServiceError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Upload(#[from] UploadRejection),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("Complaint not found")]
    NotFound,
    #[error("File not found")]
    AttachmentNotFound,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Attachment(#[from] AttachmentError),
}
