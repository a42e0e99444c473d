use chrono::{DateTime, Utc};

use super::domain::{Complaint, ComplaintStatus};

/// Lifecycle rules that are a deployment decision rather than a fixed invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionPolicy {
    pub allow_reopen_resolved: bool,
}

impl Default for TransitionPolicy {
    fn default() -> Self {
        Self {
            allow_reopen_resolved: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("Admin response is required when marking complaint as {0}")]
    ResponseRequired(ComplaintStatus),
    #[error("Complaint is already resolved")]
    AlreadyResolved,
}

/// Validated status change, ready to be applied to a stored complaint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    status: ComplaintStatus,
    admin_response: Option<String>,
}

impl Transition {
    /// Check the response requirement before any record is touched.
    ///
    /// The response is only carried for statuses that require one; moving back to `Pending`
    /// ignores it and leaves the stored response alone.
    pub fn new(
        status: ComplaintStatus,
        admin_response: Option<&str>,
    ) -> Result<Self, TransitionError> {
        if !status.requires_response() {
            return Ok(Self {
                status,
                admin_response: None,
            });
        }

        match admin_response {
            Some(response) if !response.trim().is_empty() => Ok(Self {
                status,
                admin_response: Some(response.to_string()),
            }),
            _ => Err(TransitionError::ResponseRequired(status)),
        }
    }

    pub fn status(&self) -> ComplaintStatus {
        self.status
    }

    pub fn apply(
        self,
        complaint: &mut Complaint,
        policy: TransitionPolicy,
        now: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        if complaint.status == ComplaintStatus::Resolved
            && self.status != ComplaintStatus::Resolved
            && !policy.allow_reopen_resolved
        {
            return Err(TransitionError::AlreadyResolved);
        }

        complaint.status = self.status;
        complaint.last_updated = Some(now);
        if let Some(response) = self.admin_response {
            complaint.admin_response = Some(response);
        }
        complaint.resolution_date = match self.status {
            ComplaintStatus::Resolved => complaint.resolution_date.or(Some(now)),
            ComplaintStatus::Pending | ComplaintStatus::InProgress => None,
        };

        Ok(())
    }
}
