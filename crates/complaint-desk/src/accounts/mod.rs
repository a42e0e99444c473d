//! Student and admin accounts: registration, login, and credential hashing.

pub mod credentials;
pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use credentials::{Argon2Hasher, CredentialError, CredentialHasher};
pub use domain::{
    Account, AccountValidationError, AccountView, EmailPolicy, LoginRequest, RegistrationRequest,
    Role,
};
pub use repository::AccountRepository;
pub use router::auth_router;
pub use service::{AccountService, AccountServiceError};
