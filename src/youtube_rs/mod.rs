use std::time::Duration;

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use url::Url;

pub mod auth;
pub mod error;
pub mod playlist;
pub mod search;
pub mod types;

pub use error::YoutubeApiError;

/// Docs:
/// https://developers.google.com/youtube/v3/docs
pub const YOUTUBE_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3/";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Shareable link for a playlist id.
pub fn playlist_url(playlist_id: &str) -> String {
    format!(
        "https://www.youtube.com/playlist?list={}",
        urlencoding::encode(playlist_id)
    )
}

/// Parse an API base URL, making sure relative joins land under it.
pub fn parse_base_url(base_url: &str) -> Result<Url, url::ParseError> {
    if base_url.ends_with('/') {
        Url::parse(base_url)
    } else {
        Url::parse(&format!("{}/", base_url))
    }
}

/// Send an authorized request and decode the JSON body, classifying failures.
async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
    access_token: &str,
) -> Result<T, YoutubeApiError> {
    let response = request
        .bearer_auth(access_token)
        .header("Accept", "application/json")
        .timeout(REQUEST_TIMEOUT)
        .send()
        .await
        .map_err(YoutubeApiError::Transport)?;

    let status = response.status();
    let body = response.text().await.map_err(YoutubeApiError::Transport)?;

    if !status.is_success() {
        return Err(YoutubeApiError::from_response(status, &body));
    }

    serde_json::from_str(&body).map_err(YoutubeApiError::MalformedResponse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playlist_url() {
        assert_eq!(
            playlist_url("PLabc123"),
            "https://www.youtube.com/playlist?list=PLabc123"
        );
    }

    #[test]
    fn test_parse_base_url_adds_trailing_slash() {
        let url = parse_base_url("http://localhost:9000/youtube/v3").unwrap();
        assert_eq!(
            url.join("playlists").unwrap().as_str(),
            "http://localhost:9000/youtube/v3/playlists"
        );

        let url = parse_base_url(YOUTUBE_API_BASE_URL).unwrap();
        assert_eq!(
            url.join("search").unwrap().as_str(),
            "https://www.googleapis.com/youtube/v3/search"
        );
    }
}
