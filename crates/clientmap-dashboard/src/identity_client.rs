//! Client-side wrapper around the identity provider
//!
//! Applies the registration policy before any provider call and publishes
//! every session change, so views can route on sign-in and sign-out.

use clientmap_core::{AuthSession, IdentityProvider, RegistrationPolicy, Result, UserIdentity};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

pub struct IdentityClient {
    provider: Arc<dyn IdentityProvider>,
    policy: RegistrationPolicy,
    session: watch::Sender<Option<AuthSession>>,
}

impl IdentityClient {
    pub fn new(provider: Arc<dyn IdentityProvider>, policy: RegistrationPolicy) -> Self {
        let (session, _) = watch::channel(None);
        Self {
            provider,
            policy,
            session,
        }
    }

    pub fn session(&self) -> Option<AuthSession> {
        self.session.borrow().clone()
    }

    pub fn current_user(&self) -> Option<UserIdentity> {
        self.session.borrow().as_ref().map(|s| s.user.clone())
    }

    /// Session-changed notifications
    pub fn subscribe(&self) -> watch::Receiver<Option<AuthSession>> {
        self.session.subscribe()
    }

    /// Register and sign in.
    ///
    /// # Errors
    /// - `Error::Validation` if the form breaks the registration policy; the
    ///   provider is not contacted
    /// - `Error::Auth` with the provider's message
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<AuthSession> {
        self.policy.validate(email, password, confirm_password)?;
        let session = self.provider.sign_up(email, password).await?;
        info!(uid = %session.user.uid, "Signed up");
        self.session.send_replace(Some(session.clone()));
        Ok(session)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession> {
        let session = self.provider.sign_in(email, password).await?;
        info!(uid = %session.user.uid, "Signed in");
        self.session.send_replace(Some(session.clone()));
        Ok(session)
    }

    /// End the current session. The local session is cleared even when the
    /// provider fails to revoke it.
    pub async fn sign_out(&self) -> Result<()> {
        let Some(session) = self.session.send_replace(None) else {
            return Ok(());
        };
        if let Err(e) = self.provider.sign_out(&session.token).await {
            warn!("Failed to revoke session: {}", e);
            return Err(e);
        }
        info!(uid = %session.user.uid, "Signed out");
        Ok(())
    }
}
