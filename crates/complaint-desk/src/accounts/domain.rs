use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account role, fixed at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Admin,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Role {
    type Err = AccountValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "student" => Ok(Self::Student),
            "admin" => Ok(Self::Admin),
            _ => Err(AccountValidationError::InvalidRole),
        }
    }
}

/// Stored account. `password_hash` is a PHC string, never the submitted password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn view(&self) -> AccountView {
        AccountView {
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// Public projection of an account; the credential never leaves the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountView {
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RegistrationRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountValidationError {
    #[error("Email, password, and role are required")]
    MissingRegistrationFields,
    #[error("Email and password are required")]
    MissingLoginFields,
    #[error("Email must be an address ending with @{domain}")]
    EmailDomain { domain: String },
    #[error("Role must be either 'student' or 'admin'")]
    InvalidRole,
}

/// Restricts accounts to a single email domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailPolicy {
    domain: String,
}

impl EmailPolicy {
    pub fn new(domain: impl Into<String>) -> Self {
        let domain = domain.into();
        Self {
            domain: domain.trim_start_matches('@').to_ascii_lowercase(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn check(&self, email: &str) -> Result<(), AccountValidationError> {
        let suffix = format!("@{}", self.domain);
        if email.to_lowercase().ends_with(&suffix) {
            Ok(())
        } else {
            Err(AccountValidationError::EmailDomain {
                domain: self.domain.clone(),
            })
        }
    }
}

impl Default for EmailPolicy {
    fn default() -> Self {
        Self::new("gmail.com")
    }
}
