use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Human-facing complaint reference, e.g. `CMP17291234567890001`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComplaintId(pub String);

impl fmt::Display for ComplaintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Triage level assigned once at submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const fn label(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

/// Lifecycle position of a complaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComplaintStatus {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
}

impl ComplaintStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "Pending",
            ComplaintStatus::InProgress => "In Progress",
            ComplaintStatus::Resolved => "Resolved",
        }
    }

    /// Statuses that may only be entered with a written admin response.
    pub const fn requires_response(self) -> bool {
        matches!(self, ComplaintStatus::InProgress | ComplaintStatus::Resolved)
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown complaint status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for ComplaintStatus {
    type Err = UnknownStatus;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "Pending" => Ok(Self::Pending),
            "In Progress" => Ok(Self::InProgress),
            "Resolved" => Ok(Self::Resolved),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Metadata for a stored attachment; the three fields are always set together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentMeta {
    /// Filename as supplied by the uploader.
    pub original_name: String,
    pub content_type: String,
    /// Generated blob name inside the attachment store.
    pub stored_name: String,
}

/// Persisted complaint record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    /// Storage-assigned primary key.
    pub id: Uuid,
    pub complaint_id: ComplaintId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: Priority,
    pub summary: String,
    pub status: ComplaintStatus,
    pub created_by_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_path: Option<String>,
    pub date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution_date: Option<DateTime<Utc>>,
}

impl Complaint {
    pub fn attachment(&self) -> Option<AttachmentMeta> {
        match (
            &self.attachment_name,
            &self.attachment_type,
            &self.attachment_path,
        ) {
            (Some(name), Some(content_type), Some(path)) => Some(AttachmentMeta {
                original_name: name.clone(),
                content_type: content_type.clone(),
                stored_name: path.clone(),
            }),
            _ => None,
        }
    }
}

/// Submitter-provided fields; every one is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintSubmission {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub created_by_email: Option<String>,
}

/// Admin request to move a complaint to a new status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub status: Option<String>,
    #[serde(default)]
    pub admin_response: Option<String>,
}

/// How a path parameter addresses a complaint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComplaintKey {
    Id(Uuid),
    ComplaintId(ComplaintId),
}

impl ComplaintKey {
    /// UUIDs address the storage key; anything else is treated as a complaint reference.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match Uuid::parse_str(trimmed) {
            Ok(id) => Self::Id(id),
            Err(_) => Self::ComplaintId(ComplaintId(trimmed.to_string())),
        }
    }

    pub fn matches(&self, complaint: &Complaint) -> bool {
        match self {
            ComplaintKey::Id(id) => complaint.id == *id,
            ComplaintKey::ComplaintId(reference) => complaint.complaint_id == *reference,
        }
    }
}

/// Repository-level filter; `None` returns every complaint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplaintFilter {
    pub created_by_email: Option<String>,
}

/// Caller's view of the collection, derived from the listing query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingScope {
    All,
    OwnedBy(String),
    /// No recognised role/email pair was supplied; every complaint is returned.
    Unscoped,
}

impl ListingScope {
    pub fn from_query(role: Option<&str>, email: Option<&str>) -> Self {
        // Only a missing or empty email counts as absent; whitespace still filters.
        let email = email.filter(|value| !value.is_empty());
        match (role, email) {
            (Some("admin"), _) => Self::All,
            (Some("student"), Some(email)) => Self::OwnedBy(email.to_string()),
            _ => Self::Unscoped,
        }
    }

    pub fn filter(&self) -> ComplaintFilter {
        match self {
            ListingScope::OwnedBy(email) => ComplaintFilter {
                created_by_email: Some(email.clone()),
            },
            ListingScope::All | ListingScope::Unscoped => ComplaintFilter::default(),
        }
    }
}
