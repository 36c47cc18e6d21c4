//! Identity provider abstraction and client-side access rules
//!
//! The identity provider owns users and sessions. The application only holds
//! a read-only `UserIdentity`; the email doubles as the salesperson key on
//! client records and as the administrator-bypass key.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Minimum password length enforced before sign-up reaches the provider
pub const DEFAULT_MIN_PASSWORD_LEN: usize = 6;

/// An authenticated user as issued by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub uid: String,
    pub email: String,
}

/// A signed-in session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: UserIdentity,
    pub issued_at: DateTime<Utc>,
}

/// Identity provider trait
///
/// Implementations:
/// - `InMemoryIdentityProvider`: process-local users with argon2 hashes
///
/// Failures are reported as `Error::Auth` with the provider's own message.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Register a new user and sign them in
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession>;

    /// Sign in an existing user
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession>;

    /// End a session. Unknown tokens are not an error.
    async fn sign_out(&self, token: &str) -> Result<()>;

    /// Resolve a session token to its user
    async fn resolve(&self, token: &str) -> Result<UserIdentity>;
}

/// Client-side sign-up rules.
///
/// These run before the provider is contacted; the provider itself does
/// not enforce the domain allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationPolicy {
    /// Email domains allowed to register. Empty allows any domain.
    #[serde(default)]
    pub allowed_domains: Vec<String>,

    #[serde(default = "default_min_password_len")]
    pub min_password_len: usize,
}

fn default_min_password_len() -> usize {
    DEFAULT_MIN_PASSWORD_LEN
}

impl Default for RegistrationPolicy {
    fn default() -> Self {
        Self {
            allowed_domains: Vec::new(),
            min_password_len: DEFAULT_MIN_PASSWORD_LEN,
        }
    }
}

impl RegistrationPolicy {
    pub fn with_allowed_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_domains = domains.into_iter().map(Into::into).collect();
        self
    }

    /// Validate a sign-up form
    pub fn validate(&self, email: &str, password: &str, confirm_password: &str) -> Result<()> {
        if password != confirm_password {
            return Err(Error::Validation("Passwords do not match".to_string()));
        }
        if password.chars().count() < self.min_password_len {
            return Err(Error::Validation(format!(
                "Password must be at least {} characters",
                self.min_password_len
            )));
        }
        let domain = email_domain(email)
            .ok_or_else(|| Error::Validation(format!("'{}' is not a valid email", email)))?;
        if !self.allowed_domains.is_empty()
            && !self
                .allowed_domains
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(domain))
        {
            return Err(Error::Validation(format!(
                "Registration is restricted to: {}",
                self.allowed_domains.join(", ")
            )));
        }
        Ok(())
    }
}

/// Who may see every record regardless of owner
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPolicy {
    #[serde(default)]
    pub admin_emails: Vec<String>,
}

impl AccessPolicy {
    pub fn new<I, S>(admin_emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            admin_emails: admin_emails.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_admin(&self, user: &UserIdentity) -> bool {
        self.admin_emails
            .iter()
            .any(|admin| admin.eq_ignore_ascii_case(&user.email))
    }
}

/// Normalize an email for use as a lookup key
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn email_domain(email: &str) -> Option<&str> {
    let (local, domain) = email.trim().rsplit_once('@')?;
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return None;
    }
    Some(domain)
}

#[cfg(test)]
mod tests;
