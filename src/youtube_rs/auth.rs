use std::collections::HashMap;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use rand::Rng;
use reqwest::Client;
use sha2::{Digest, Sha256};

use crate::youtube_rs::types::{AuthorizationRequest, GoogleTokenResponse, OAuthSession};

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_REVOKE_URL: &str = "https://oauth2.googleapis.com/revoke";

/// Manage the user's playlists; search is covered by the same scope.
pub const YOUTUBE_SCOPE: &str = "https://www.googleapis.com/auth/youtube";

const PKCE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";

fn random_pkce_string(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| PKCE_CHARSET[rng.random_range(0..PKCE_CHARSET.len())] as char)
        .collect()
}

/// PKCE code verifier, at the 128 character maximum
fn generate_code_verifier() -> String {
    random_pkce_string(128)
}

/// S256 challenge: base64url(sha256(verifier)) without padding
fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

fn generate_state() -> String {
    random_pkce_string(32)
}

/// Start the Google OAuth flow for an installed app.
/// Returns the URL to open and the session needed to finish the exchange.
pub fn initiate_oauth(client_id: &str, redirect_uri: &str) -> (AuthorizationRequest, OAuthSession) {
    let code_verifier = generate_code_verifier();
    let code_challenge = generate_code_challenge(&code_verifier);
    let state = generate_state();

    let auth_url = format!(
        "{}?client_id={}&response_type=code&redirect_uri={}&state={}&scope={}&code_challenge={}&code_challenge_method=S256",
        GOOGLE_AUTH_URL,
        urlencoding::encode(client_id),
        urlencoding::encode(redirect_uri),
        urlencoding::encode(&state),
        urlencoding::encode(YOUTUBE_SCOPE),
        urlencoding::encode(&code_challenge),
    );

    let session = OAuthSession {
        code_verifier,
        state,
    };

    (AuthorizationRequest { auth_url }, session)
}

#[derive(Debug, thiserror::Error)]
pub enum ExchangeCodeForTokenError {
    #[error("Invalid code: {reason}")]
    InvalidCode { reason: String },
    #[error("Failed to send http request: {0}")]
    FailedToSendRequest(reqwest::Error),
    #[error("Failed to parse response: {0}")]
    FailedToParseResponse(reqwest::Error),
}

/// Exchange the authorization code (plus PKCE verifier) for an access token.
/// https://developers.google.com/identity/protocols/oauth2/native-app#exchange-authorization-code
pub async fn exchange_code_for_token(
    client: &Client,
    client_id: &str,
    client_secret: Option<&str>,
    code: &str,
    code_verifier: &str,
    // Must match the redirect URI the flow was started with
    redirect_uri: &str,
) -> Result<GoogleTokenResponse, ExchangeCodeForTokenError> {
    let mut params = HashMap::new();
    params.insert("grant_type", "authorization_code");
    params.insert("code", code);
    params.insert("code_verifier", code_verifier);
    params.insert("redirect_uri", redirect_uri);
    params.insert("client_id", client_id);
    if let Some(client_secret) = client_secret {
        params.insert("client_secret", client_secret);
    }

    let response = client
        .post(GOOGLE_TOKEN_URL)
        .form(&params)
        .timeout(Duration::from_secs(10))
        .send()
        .await
        .map_err(ExchangeCodeForTokenError::FailedToSendRequest)?;

    if !response.status().is_success() {
        return Err(ExchangeCodeForTokenError::InvalidCode {
            reason: response
                .text()
                .await
                .unwrap_or("Failed to get error text".to_string()),
        });
    }

    response
        .json::<GoogleTokenResponse>()
        .await
        .map_err(ExchangeCodeForTokenError::FailedToParseResponse)
}

/// Revoke an access token so it can no longer be presented.
pub async fn revoke_token(client: &Client, access_token: &str) -> Result<()> {
    client
        .post(GOOGLE_REVOKE_URL)
        .form(&[("token", access_token)])
        .timeout(Duration::from_secs(10))
        .send()
        .await
        .wrap_err("Failed to send token revocation request")?
        .error_for_status()
        .wrap_err("Google rejected the token revocation")?;

    Ok(())
}
