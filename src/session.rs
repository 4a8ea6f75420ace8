use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use tokio::sync::watch;

use crate::youtube_rs::types::GoogleTokenResponse;

/// Bearer credential presented on every API call. The token never appears in
/// `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(access_token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at,
        }
    }

    pub fn from_token_response(response: &GoogleTokenResponse, issued_at: DateTime<Utc>) -> Self {
        Self::new(
            response.access_token.clone(),
            issued_at + TimeDelta::seconds(response.expires_in),
        )
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Source of the signed-in user's credential.
pub trait SessionProvider: Send + Sync {
    fn get_credential(&self) -> Option<Credential>;

    /// Forget the credential, returning it so the caller can revoke it.
    fn sign_out(&self) -> Option<Credential>;
}

/// In-memory session shared between the sign-in flow and the builder.
///
/// Sign-in completion is observable: `wait_for_sign_in` resolves as soon as a
/// credential is published, whichever task publishes it.
#[derive(Clone)]
pub struct Session {
    credential: Arc<watch::Sender<Option<Credential>>>,
}

impl Session {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            credential: Arc::new(sender),
        }
    }

    pub fn with_credential(credential: Credential) -> Self {
        let session = Self::new();
        session.sign_in(credential);
        session
    }

    /// Publish a credential, completing any pending `wait_for_sign_in`.
    pub fn sign_in(&self, credential: Credential) {
        tracing::info!(expires_at = %credential.expires_at(), "Signed in");
        self.credential.send_replace(Some(credential));
    }

    pub async fn wait_for_sign_in(&self) -> Result<Credential> {
        let mut receiver = self.credential.subscribe();
        let credential = receiver
            .wait_for(Option::is_some)
            .await
            .wrap_err("Session closed before sign-in completed")?;

        credential
            .clone()
            .ok_or_else(|| color_eyre::eyre::eyre!("Sign-in completed without a credential"))
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionProvider for Session {
    fn get_credential(&self) -> Option<Credential> {
        self.credential.borrow().clone()
    }

    fn sign_out(&self) -> Option<Credential> {
        let previous = self.credential.send_replace(None);
        if previous.is_some() {
            tracing::info!("Signed out");
        }
        previous
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::test_utils::valid_credential;

    #[test]
    fn test_credential_expiry() {
        let now = Utc::now();
        let credential = Credential::new("token", now + TimeDelta::minutes(5));

        assert!(!credential.is_expired(now));
        assert!(credential.is_expired(now + TimeDelta::minutes(5)));
        assert!(credential.is_expired(now + TimeDelta::hours(1)));
    }

    #[test]
    fn test_credential_from_token_response() {
        let issued_at = Utc::now();
        let response = GoogleTokenResponse {
            access_token: "ya29.token".to_string(),
            expires_in: 3599,
        };

        let credential = Credential::from_token_response(&response, issued_at);
        assert_eq!(credential.access_token(), "ya29.token");
        assert_eq!(
            credential.expires_at(),
            issued_at + TimeDelta::seconds(3599)
        );
    }

    #[test]
    fn test_credential_debug_redacts_token() {
        let credential = Credential::new("super-secret", Utc::now());
        let debug = format!("{credential:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("redacted"));
    }

    #[test]
    fn test_sign_out_clears_credential() {
        let credential = valid_credential();
        let session = Session::with_credential(credential.clone());
        assert_eq!(session.get_credential(), Some(credential.clone()));

        assert_eq!(session.sign_out(), Some(credential));
        assert!(session.get_credential().is_none());
        assert!(session.sign_out().is_none());
    }

    #[tokio::test]
    async fn test_wait_for_sign_in_resolves_when_published() {
        let session = Session::new();
        let publisher = session.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            publisher.sign_in(valid_credential());
        });

        let credential = session.wait_for_sign_in().await.unwrap();
        assert_eq!(credential.access_token(), valid_credential().access_token());
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_wait_for_sign_in_when_already_signed_in() {
        let session = Session::with_credential(valid_credential());
        let credential = session.wait_for_sign_in().await.unwrap();
        assert_eq!(credential.access_token(), valid_credential().access_token());
    }
}
