use super::domain::Account;
pub use crate::store::RepositoryError;

/// Account storage; emails are unique.
pub trait AccountRepository: Send + Sync {
    fn find_by_email(&self, email: &str) -> Result<Option<Account>, RepositoryError>;
    /// Fails with `RepositoryError::Conflict` when the email is already registered.
    fn insert(&self, account: Account) -> Result<Account, RepositoryError>;
}
