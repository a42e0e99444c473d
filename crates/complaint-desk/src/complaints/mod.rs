//! Complaint intake, keyword triage, listing, and the admin status lifecycle.

pub mod classifier;
pub mod domain;
pub mod id;
pub mod repository;
pub mod router;
pub mod service;
pub mod status;
pub mod summary;

#[cfg(test)]
mod tests;

pub use classifier::classify;
pub use domain::{
    AttachmentMeta, Complaint, ComplaintFilter, ComplaintId, ComplaintKey, ComplaintStatus,
    ComplaintSubmission, ListingScope, Priority, StatusUpdate, UnknownStatus,
};
pub use id::{ComplaintIdGenerator, SequencedIdGenerator, COMPLAINT_ID_PREFIX};
pub use repository::{sort_newest_first, ComplaintRepository, RepositoryError};
pub use router::complaint_router;
pub use service::{ComplaintService, ComplaintServiceError};
pub use status::{Transition, TransitionError, TransitionPolicy};
pub use summary::{summarize, EMPTY_SUMMARY};
