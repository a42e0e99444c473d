use std::sync::{Arc, OnceLock};

use chrono::Utc;
use tracing::info;

use super::credentials::{CredentialError, CredentialHasher};
use super::domain::{
    Account, AccountValidationError, AccountView, EmailPolicy, LoginRequest, RegistrationRequest,
    Role,
};
use super::repository::{AccountRepository, RepositoryError};

/// Registration and login over an account repository.
pub struct AccountService<R, H> {
    repository: Arc<R>,
    hasher: Arc<H>,
    email_policy: EmailPolicy,
    decoy_hash: OnceLock<Option<String>>,
}

const DECOY_PASSWORD: &str = "complaint-desk-decoy";

fn present(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

impl<R, H> AccountService<R, H>
where
    R: AccountRepository + 'static,
    H: CredentialHasher + 'static,
{
    pub fn new(repository: Arc<R>, hasher: Arc<H>, email_policy: EmailPolicy) -> Self {
        Self {
            repository,
            hasher,
            email_policy,
            decoy_hash: OnceLock::new(),
        }
    }

    pub fn register(
        &self,
        request: RegistrationRequest,
    ) -> Result<AccountView, AccountServiceError> {
        let (Some(email), Some(password), Some(role)) = (
            present(request.email),
            present(request.password),
            present(request.role),
        ) else {
            return Err(AccountValidationError::MissingRegistrationFields.into());
        };

        self.email_policy.check(&email)?;
        let role = role.parse::<Role>()?;

        if self.repository.find_by_email(&email)?.is_some() {
            return Err(AccountServiceError::EmailTaken);
        }

        let account = Account {
            email,
            password_hash: self.hasher.hash(&password)?,
            role,
            created_at: Utc::now(),
        };

        let stored = match self.repository.insert(account) {
            Ok(stored) => stored,
            Err(RepositoryError::Conflict(_)) => return Err(AccountServiceError::EmailTaken),
            Err(other) => return Err(other.into()),
        };

        info!(email = %stored.email, role = %stored.role, "account registered");
        Ok(stored.view())
    }

    /// Unknown emails and wrong passwords fail identically.
    pub fn login(&self, request: LoginRequest) -> Result<AccountView, AccountServiceError> {
        let (Some(email), Some(password)) = (present(request.email), present(request.password))
        else {
            return Err(AccountValidationError::MissingLoginFields.into());
        };

        self.email_policy.check(&email)?;

        let Some(account) = self.repository.find_by_email(&email)? else {
            self.verify_decoy(&password);
            info!(%email, "login rejected");
            return Err(AccountServiceError::InvalidCredentials);
        };

        if !self.hasher.verify(&password, &account.password_hash)? {
            info!(%email, "login rejected");
            return Err(AccountServiceError::InvalidCredentials);
        }

        Ok(account.view())
    }

    /// Unknown emails pay for one verification, the same as a wrong password.
    fn verify_decoy(&self, password: &str) {
        let decoy = self
            .decoy_hash
            .get_or_init(|| self.hasher.hash(DECOY_PASSWORD).ok());
        if let Some(decoy) = decoy {
            let _ = self.hasher.verify(password, decoy);
        }
    }
}

/// Error raised by the account service.
#[derive(Debug, thiserror::Error)]
pub enum AccountServiceError {
    #[error(transparent)]
    Validation(#[from] AccountValidationError),
    #[error("User with this email already exists")]
    EmailTaken,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Credential(#[from] CredentialError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::credentials::{fast_hasher, Argon2Hasher};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryAccounts {
        accounts: Mutex<HashMap<String, Account>>,
    }

    impl AccountRepository for MemoryAccounts {
        fn find_by_email(&self, email: &str) -> Result<Option<Account>, RepositoryError> {
            let guard = self.accounts.lock().expect("account mutex poisoned");
            Ok(guard.get(email).cloned())
        }

        fn insert(&self, account: Account) -> Result<Account, RepositoryError> {
            let mut guard = self.accounts.lock().expect("account mutex poisoned");
            if guard.contains_key(&account.email) {
                return Err(RepositoryError::Conflict(account.email));
            }
            guard.insert(account.email.clone(), account.clone());
            Ok(account)
        }
    }

    /// Counts verifications so login paths can be compared.
    struct CountingHasher {
        inner: Argon2Hasher,
        verifications: AtomicUsize,
    }

    impl CountingHasher {
        fn new() -> Self {
            Self {
                inner: fast_hasher(),
                verifications: AtomicUsize::new(0),
            }
        }

        fn verifications(&self) -> usize {
            self.verifications.load(Ordering::SeqCst)
        }
    }

    impl CredentialHasher for CountingHasher {
        fn hash(&self, password: &str) -> Result<String, CredentialError> {
            self.inner.hash(password)
        }

        fn verify(&self, password: &str, stored: &str) -> Result<bool, CredentialError> {
            self.verifications.fetch_add(1, Ordering::SeqCst);
            self.inner.verify(password, stored)
        }
    }

    fn service() -> (
        AccountService<MemoryAccounts, Argon2Hasher>,
        Arc<MemoryAccounts>,
    ) {
        let repository = Arc::new(MemoryAccounts::default());
        let service = AccountService::new(
            repository.clone(),
            Arc::new(fast_hasher()),
            EmailPolicy::default(),
        );
        (service, repository)
    }

    fn registration(email: &str, password: &str, role: &str) -> RegistrationRequest {
        RegistrationRequest {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
            role: Some(role.to_string()),
        }
    }

    fn login(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    #[test]
    fn register_stores_a_hash_and_returns_the_view() {
        let (service, repository) = service();

        let view = service
            .register(registration("asha@gmail.com", "s3cret!", "student"))
            .expect("registration succeeds");

        assert_eq!(
            view,
            AccountView {
                email: "asha@gmail.com".to_string(),
                role: Role::Student,
            }
        );
        let stored = repository
            .find_by_email("asha@gmail.com")
            .unwrap()
            .expect("account stored");
        assert_ne!(stored.password_hash, "s3cret!");
        assert!(stored.password_hash.starts_with("$argon2id$"));
    }

    #[test]
    fn register_requires_every_field() {
        let (service, _) = service();
        let mut request = registration("asha@gmail.com", "s3cret!", "student");
        request.password = Some("   ".to_string());

        let err = service.register(request).unwrap_err();
        assert!(matches!(
            err,
            AccountServiceError::Validation(AccountValidationError::MissingRegistrationFields)
        ));
    }

    #[test]
    fn register_rejects_foreign_domains_before_anything_else() {
        let (service, repository) = service();

        let err = service
            .register(registration("user@yahoo.com", "pw", "superuser"))
            .unwrap_err();

        assert!(matches!(
            err,
            AccountServiceError::Validation(AccountValidationError::EmailDomain { .. })
        ));
        assert!(repository.find_by_email("user@yahoo.com").unwrap().is_none());
    }

    #[test]
    fn register_rejects_unknown_roles() {
        let (service, _) = service();
        let err = service
            .register(registration("asha@gmail.com", "pw", "dean"))
            .unwrap_err();
        assert!(matches!(
            err,
            AccountServiceError::Validation(AccountValidationError::InvalidRole)
        ));
    }

    #[test]
    fn second_registration_for_the_same_email_conflicts() {
        let (service, _) = service();
        service
            .register(registration("asha@gmail.com", "first", "student"))
            .expect("first registration succeeds");

        let err = service
            .register(registration("asha@gmail.com", "second", "admin"))
            .unwrap_err();
        assert!(matches!(err, AccountServiceError::EmailTaken));
        assert_eq!(err.to_string(), "User with this email already exists");
    }

    #[test]
    fn login_accepts_the_registered_password() {
        let (service, _) = service();
        service
            .register(registration("warden@gmail.com", "keys-123", "admin"))
            .expect("registration succeeds");

        let view = service
            .login(login("warden@gmail.com", "keys-123"))
            .expect("login succeeds");
        assert_eq!(view.role, Role::Admin);
    }

    #[test]
    fn login_failures_do_not_reveal_which_part_was_wrong() {
        let (service, _) = service();
        service
            .register(registration("warden@gmail.com", "keys-123", "admin"))
            .expect("registration succeeds");

        let wrong_password = service
            .login(login("warden@gmail.com", "keys-124"))
            .unwrap_err();
        let unknown_email = service
            .login(login("nobody@gmail.com", "keys-123"))
            .unwrap_err();

        assert!(matches!(wrong_password, AccountServiceError::InvalidCredentials));
        assert!(matches!(unknown_email, AccountServiceError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[test]
    fn login_validates_fields_and_domain() {
        let (service, _) = service();
        assert!(matches!(
            service.login(LoginRequest::default()).unwrap_err(),
            AccountServiceError::Validation(AccountValidationError::MissingLoginFields)
        ));
        assert!(matches!(
            service.login(login("user@yahoo.com", "pw")).unwrap_err(),
            AccountServiceError::Validation(AccountValidationError::EmailDomain { .. })
        ));
    }

    #[test]
    fn unknown_emails_cost_one_verification_like_wrong_passwords() {
        let hasher = Arc::new(CountingHasher::new());
        let service = AccountService::new(
            Arc::new(MemoryAccounts::default()),
            hasher.clone(),
            EmailPolicy::default(),
        );
        service
            .register(registration("warden@gmail.com", "keys-123", "admin"))
            .expect("registration succeeds");
        assert_eq!(hasher.verifications(), 0);

        service
            .login(login("warden@gmail.com", "keys-124"))
            .unwrap_err();
        assert_eq!(hasher.verifications(), 1);

        service
            .login(login("nobody@gmail.com", "keys-123"))
            .unwrap_err();
        assert_eq!(hasher.verifications(), 2);

        service
            .login(login("stranger@gmail.com", "keys-123"))
            .unwrap_err();
        assert_eq!(hasher.verifications(), 3);
    }
}
