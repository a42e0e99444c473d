use super::domain::{Complaint, ComplaintFilter, ComplaintKey};
pub use crate::store::RepositoryError;

/// Storage abstraction so the service module can be exercised in isolation.
///
/// Implementations enforce uniqueness of both the storage id and the complaint reference.
pub trait ComplaintRepository: Send + Sync {
    fn insert(&self, record: Complaint) -> Result<Complaint, RepositoryError>;
    /// Matching complaints, most recent `date` first.
    fn list(&self, filter: &ComplaintFilter) -> Result<Vec<Complaint>, RepositoryError>;
    fn fetch(&self, key: &ComplaintKey) -> Result<Option<Complaint>, RepositoryError>;
    fn update(&self, record: Complaint) -> Result<(), RepositoryError>;
}

impl ComplaintFilter {
    pub fn matches(&self, complaint: &Complaint) -> bool {
        match &self.created_by_email {
            Some(email) => complaint.created_by_email == *email,
            None => true,
        }
    }
}

/// Shared ordering for repository implementations.
pub fn sort_newest_first(complaints: &mut [Complaint]) {
    complaints.sort_by(|left, right| right.date.cmp(&left.date));
}
