use serde::Deserialize;

/// Error body returned by Google APIs on non-success responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub reason: Option<String>,
}

/// Reasons Google attaches to a 403 when the token itself is the problem,
/// as opposed to quota or ownership failures.
const AUTH_FAILURE_REASONS: &[&str] = &["authError", "insufficientPermissions"];

#[derive(Debug, thiserror::Error)]
pub enum YoutubeApiError {
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },
    #[error("{message}")]
    Provider { status: u16, message: String },
    #[error("Failed to send http request: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("Failed to parse response: {0}")]
    MalformedResponse(#[source] serde_json::Error),
    #[error("Invalid request url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl YoutubeApiError {
    /// Classify a non-success response from its status code and raw body.
    ///
    /// The provider's `error.message` is surfaced verbatim when the body can
    /// be parsed; otherwise the raw body (or the status text) is used.
    pub fn from_response(status: reqwest::StatusCode, body: &str) -> Self {
        let parsed = serde_json::from_str::<ApiErrorResponse>(body).ok();

        let message = parsed
            .as_ref()
            .and_then(|response| response.error.message.clone())
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("Unknown error")
                        .to_string()
                } else {
                    body.trim().to_string()
                }
            });

        let auth_reason = parsed.as_ref().is_some_and(|response| {
            response.error.errors.iter().any(|detail| {
                detail
                    .reason
                    .as_deref()
                    .is_some_and(|reason| AUTH_FAILURE_REASONS.contains(&reason))
            })
        });

        if status == reqwest::StatusCode::UNAUTHORIZED
            || (status == reqwest::StatusCode::FORBIDDEN && auth_reason)
        {
            Self::Unauthorized { message }
        } else {
            Self::Provider {
                status: status.as_u16(),
                message,
            }
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// The message to show the user, without the variant prefix.
    pub fn provider_message(&self) -> String {
        match self {
            Self::Unauthorized { message } | Self::Provider { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;

    #[test]
    fn test_unauthorized_from_401() {
        let body = r#"{"error":{"code":401,"message":"Request had invalid authentication credentials.","status":"UNAUTHENTICATED"}}"#;
        let error = YoutubeApiError::from_response(StatusCode::UNAUTHORIZED, body);

        assert!(error.is_unauthorized());
        assert_eq!(
            error.provider_message(),
            "Request had invalid authentication credentials."
        );
    }

    #[test]
    fn test_quota_exceeded_is_provider_error() {
        let body = r#"{"error":{"code":403,"message":"The request cannot be completed because you have exceeded your quota.","errors":[{"reason":"quotaExceeded","domain":"youtube.quota"}]}}"#;
        let error = YoutubeApiError::from_response(StatusCode::FORBIDDEN, body);

        assert!(!error.is_unauthorized());
        match error {
            YoutubeApiError::Provider { status, message } => {
                assert_eq!(status, 403);
                assert!(message.contains("exceeded your quota"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_forbidden_with_auth_reason_is_unauthorized() {
        let body = r#"{"error":{"code":403,"message":"Insufficient Permission","errors":[{"reason":"insufficientPermissions"}]}}"#;
        let error = YoutubeApiError::from_response(StatusCode::FORBIDDEN, body);
        assert!(error.is_unauthorized());
    }

    #[test]
    fn test_unparseable_body_falls_back_to_raw_text() {
        let error = YoutubeApiError::from_response(StatusCode::BAD_GATEWAY, "upstream exploded");
        assert_eq!(error.provider_message(), "upstream exploded");

        let error = YoutubeApiError::from_response(StatusCode::BAD_GATEWAY, "");
        assert_eq!(error.provider_message(), "Bad Gateway");
    }
}
