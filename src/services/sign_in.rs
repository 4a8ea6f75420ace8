use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use chrono::Utc;
use color_eyre::Result;
use color_eyre::eyre::{Context, eyre};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::oneshot;

use crate::session::{Credential, Session};
use crate::youtube_rs::auth::{exchange_code_for_token, initiate_oauth};

pub const CALLBACK_PATH: &str = "/callback";

const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Authorization code on success, the provider's error otherwise.
pub type CallbackResult = std::result::Result<String, String>;

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

struct CallbackState {
    expected_state: String,
    sender: Mutex<Option<oneshot::Sender<CallbackResult>>>,
}

impl CallbackState {
    /// Hand the result to the waiting sign-in. Only the first delivery counts.
    fn deliver(&self, result: CallbackResult) -> bool {
        let sender = match self.sender.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => None,
        };
        match sender {
            Some(sender) => sender.send(result).is_ok(),
            None => false,
        }
    }
}

async fn oauth_callback(
    State(state): State<Arc<CallbackState>>,
    Query(params): Query<CallbackParams>,
) -> (StatusCode, &'static str) {
    if params.state.as_deref() != Some(state.expected_state.as_str()) {
        tracing::warn!("Sign-in callback with mismatched state ignored");
        return (
            StatusCode::BAD_REQUEST,
            "State mismatch, please retry sign-in.",
        );
    }

    let result = match (params.code, params.error) {
        (_, Some(error)) => Err(error),
        (Some(code), None) => Ok(code),
        (None, None) => Err("missing authorization code".to_string()),
    };
    let succeeded = result.is_ok();

    if !state.deliver(result) {
        return (StatusCode::GONE, "Sign-in already completed.");
    }

    if succeeded {
        (
            StatusCode::OK,
            "Signed in successfully! You can close this tab.",
        )
    } else {
        (StatusCode::UNAUTHORIZED, "Sign-in was not completed.")
    }
}

/// Single-route router that completes `sender` when the OAuth redirect arrives.
pub fn callback_router(expected_state: String, sender: oneshot::Sender<CallbackResult>) -> Router {
    let state = Arc::new(CallbackState {
        expected_state,
        sender: Mutex::new(Some(sender)),
    });

    Router::new()
        .route(CALLBACK_PATH, get(oauth_callback))
        .with_state(state)
}

/// Browser sign-in with a loopback redirect, for Google "Desktop app" clients.
pub struct LoopbackSignIn {
    client: Client,
    client_id: String,
    client_secret: Option<String>,
    port: u16,
    /// How long to wait for the browser to come back
    timeout: Duration,
}

impl LoopbackSignIn {
    pub fn new(
        client: Client,
        client_id: String,
        client_secret: Option<String>,
        port: u16,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            client_id,
            client_secret,
            port,
            timeout,
        }
    }

    fn redirect_uri(&self) -> String {
        format!("http://127.0.0.1:{}{}", self.port, CALLBACK_PATH)
    }

    /// Run the flow to completion and publish the credential to `session`.
    pub async fn run(&self, session: &Session) -> Result<Credential> {
        let redirect_uri = self.redirect_uri();
        let (request, oauth_session) = initiate_oauth(&self.client_id, &redirect_uri);

        let (sender, receiver) = oneshot::channel();
        let router = callback_router(oauth_session.state.clone(), sender);

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", self.port))
            .await
            .wrap_err_with(|| eyre!("Failed to bind sign-in callback to port {}", self.port))?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        eprintln!(
            "Open this URL in your browser to sign in:\n\n{}\n",
            request.auth_url
        );
        tracing::info!(redirect_uri = %redirect_uri, "Waiting for sign-in callback");

        let callback = tokio::time::timeout(self.timeout, receiver).await;
        let _ = shutdown_tx.send(());
        // A browser keep-alive connection can hold the server open
        match tokio::time::timeout(SHUTDOWN_GRACE, server).await {
            Ok(joined) => joined
                .wrap_err("Sign-in callback server panicked")?
                .wrap_err("Sign-in callback server failed")?,
            Err(_) => tracing::debug!("Callback server still draining, detaching it"),
        }

        let code = callback
            .map_err(|_| eyre!("No sign-in callback within {:?}", self.timeout))?
            .wrap_err("Sign-in callback server stopped before sign-in completed")?
            .map_err(|reason| eyre!("Sign-in was rejected: {reason}"))?;

        let token = exchange_code_for_token(
            &self.client,
            &self.client_id,
            self.client_secret.as_deref(),
            &code,
            &oauth_session.code_verifier,
            &redirect_uri,
        )
        .await
        .wrap_err("Failed to exchange authorization code")?;

        let credential = Credential::from_token_response(&token, Utc::now());
        session.sign_in(credential.clone());
        Ok(credential)
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::session::SessionProvider;

    fn request(query: &str) -> Request<Body> {
        Request::builder()
            .uri(format!("{CALLBACK_PATH}?{query}"))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_callback_delivers_code() {
        let (sender, mut receiver) = oneshot::channel();
        let router = callback_router("expected".to_string(), sender);

        let response = router
            .oneshot(request("code=4%2F0Adeu5B&state=expected"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(receiver.try_recv().unwrap(), Ok("4/0Adeu5B".to_string()));
    }

    #[tokio::test]
    async fn test_callback_rejects_state_mismatch() {
        let (sender, mut receiver) = oneshot::channel();
        let router = callback_router("expected".to_string(), sender);

        let response = router
            .oneshot(request("code=abc&state=forged"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_callback_delivers_provider_error() {
        let (sender, mut receiver) = oneshot::channel();
        let router = callback_router("expected".to_string(), sender);

        let response = router
            .oneshot(request("error=access_denied&state=expected"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            receiver.try_recv().unwrap(),
            Err("access_denied".to_string())
        );
    }

    #[tokio::test]
    async fn test_second_callback_is_gone() {
        let (sender, _receiver) = oneshot::channel();
        let router = callback_router("expected".to_string(), sender);

        let first = router
            .clone()
            .oneshot(request("code=abc&state=expected"))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = router
            .oneshot(request("code=abc&state=expected"))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::GONE);
    }

    #[test]
    fn test_redirect_uri() {
        let sign_in = LoopbackSignIn::new(
            Client::new(),
            "id".to_string(),
            None,
            9004,
            Duration::from_secs(300),
        );
        assert_eq!(sign_in.redirect_uri(), "http://127.0.0.1:9004/callback");
    }

    #[tokio::test]
    async fn test_abandoned_sign_in_times_out() {
        // Port 0 lets the OS pick a free port; no browser ever calls back
        let sign_in = LoopbackSignIn::new(
            Client::new(),
            "id".to_string(),
            None,
            0,
            Duration::from_millis(50),
        );
        let session = Session::new();

        let error = sign_in.run(&session).await.unwrap_err();

        assert!(error.to_string().contains("No sign-in callback within"));
        assert!(session.get_credential().is_none());
    }
}
