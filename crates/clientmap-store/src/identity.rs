//! In-process identity provider
//!
//! Users are keyed by normalized email and stored with argon2 password
//! hashes. Sessions are opaque random tokens.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use async_trait::async_trait;
use chrono::Utc;
use clientmap_core::{
    AuthSession, Error, IdentityProvider, Result, UserIdentity, identity::normalize_email,
};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, info};
use uuid::Uuid;

pub const EMAIL_IN_USE: &str = "Email already in use";
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";
pub const SESSION_EXPIRED: &str = "Session expired";

#[derive(Debug, Clone)]
struct StoredUser {
    identity: UserIdentity,
    password_hash: String,
}

#[derive(Default)]
pub struct InMemoryIdentityProvider {
    users: DashMap<String, StoredUser>,
    sessions: DashMap<String, UserIdentity>,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn open_session(&self, user: UserIdentity) -> AuthSession {
        let token = Uuid::new_v4().simple().to_string();
        self.sessions.insert(token.clone(), user.clone());
        AuthSession {
            token,
            user,
            issued_at: Utc::now(),
        }
    }
}

fn hash_password(password: &str) -> Result<String> {
    // v4 UUIDs carry 122 random bits, plenty for a per-user salt
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
        .map_err(|e| Error::Internal(format!("Failed to encode salt: {}", e)))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Internal(format!("Failed to hash password: {}", e)))
}

/// Run argon2 work on the blocking pool
async fn blocking<T, F>(work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| Error::Internal(format!("Password hashing task failed: {}", e)))
}

fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession> {
        let key = normalize_email(email);
        if !key.contains('@') {
            return Err(Error::Auth("Invalid email address".to_string()));
        }
        let password = password.to_string();
        let password_hash = blocking(move || hash_password(&password)).await??;

        let identity = match self.users.entry(key.clone()) {
            Entry::Occupied(_) => return Err(Error::Auth(EMAIL_IN_USE.to_string())),
            Entry::Vacant(slot) => {
                let identity = UserIdentity {
                    uid: Uuid::new_v4().to_string(),
                    email: key,
                };
                slot.insert(StoredUser {
                    identity: identity.clone(),
                    password_hash,
                });
                identity
            }
        };
        info!(uid = %identity.uid, "Registered user {}", identity.email);
        Ok(self.open_session(identity))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession> {
        let key = normalize_email(email);
        let user = self
            .users
            .get(&key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::Auth(INVALID_CREDENTIALS.to_string()))?;
        let password = password.to_string();
        let hash = user.password_hash.clone();
        if !blocking(move || verify_password(&password, &hash)).await? {
            debug!("Rejected sign-in for {}", key);
            return Err(Error::Auth(INVALID_CREDENTIALS.to_string()));
        }
        Ok(self.open_session(user.identity))
    }

    async fn sign_out(&self, token: &str) -> Result<()> {
        if let Some((_, user)) = self.sessions.remove(token) {
            debug!(uid = %user.uid, "Signed out");
        }
        Ok(())
    }

    async fn resolve(&self, token: &str) -> Result<UserIdentity> {
        self.sessions
            .get(token)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::Auth(SESSION_EXPIRED.to_string()))
    }
}
