use serde::{Deserialize, Serialize};

/* ---------- Playlists ---------- */

/// Body of `playlists.insert` (part=snippet,status)
#[derive(Debug, Clone, Serialize)]
pub struct PlaylistInsertRequest {
    pub snippet: PlaylistSnippet,
    pub status: PlaylistStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistSnippet {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistStatus {
    pub privacy_status: String,
}

/// Playlist resource as returned by `playlists.insert`
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistResource {
    pub id: String,
    #[serde(default)]
    pub snippet: Option<PlaylistSnippet>,
}

/* ---------- Search ---------- */

#[derive(Debug, Clone, Deserialize)]
pub struct SearchListResponse {
    #[serde(default)]
    pub items: Vec<SearchResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    pub id: SearchResultId,
    #[serde(default)]
    pub snippet: Option<SearchResultSnippet>,
}

/// Only video hits carry a `videoId`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultId {
    #[serde(default)]
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResultSnippet {
    pub title: String,
}

/* ---------- Playlist items ---------- */

/// Body of `playlistItems.insert` (part=snippet)
#[derive(Debug, Clone, Serialize)]
pub struct PlaylistItemInsertRequest {
    pub snippet: PlaylistItemSnippet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemSnippet {
    pub playlist_id: String,
    pub resource_id: ResourceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    pub kind: String,
    pub video_id: String,
}

/// Playlist item resource as returned by `playlistItems.insert`
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistItemResource {
    pub id: String,
    #[serde(default)]
    pub snippet: Option<PlaylistItemSnippet>,
}

/* ---------- OAuth ---------- */

/// Google OAuth token endpoint response. No refresh is ever attempted, so
/// only the access token and its lifetime are kept.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleTokenResponse {
    pub access_token: String,
    pub expires_in: i64,
}

/// PKCE OAuth session data, kept until the callback arrives
#[derive(Debug, Clone)]
pub struct OAuthSession {
    pub code_verifier: String,
    pub state: String,
}

/// Authorization URL to open in the browser
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub auth_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playlist_insert_request_shape() {
        let request = PlaylistInsertRequest {
            snippet: PlaylistSnippet {
                title: "Road trip".to_string(),
                description: Some("Created with Playlist Creator".to_string()),
            },
            status: PlaylistStatus {
                privacy_status: "private".to_string(),
            },
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["snippet"]["title"], "Road trip");
        assert_eq!(value["status"]["privacyStatus"], "private");
    }

    #[test]
    fn test_playlist_item_insert_request_shape() {
        let request = PlaylistItemInsertRequest {
            snippet: PlaylistItemSnippet {
                playlist_id: "PL123".to_string(),
                resource_id: ResourceId {
                    kind: "youtube#video".to_string(),
                    video_id: "dQw4w9WgXcQ".to_string(),
                },
                position: None,
            },
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["snippet"]["playlistId"], "PL123");
        assert_eq!(value["snippet"]["resourceId"]["videoId"], "dQw4w9WgXcQ");
        assert!(value["snippet"].get("position").is_none());
    }

    #[test]
    fn test_search_response_without_items() {
        let body = r#"{"kind":"youtube#searchListResponse","pageInfo":{"totalResults":0}}"#;
        let response: SearchListResponse = serde_json::from_str(body).unwrap();
        assert!(response.items.is_empty());
    }

    #[test]
    fn test_search_response_with_video() {
        let body = r#"{
            "items": [{
                "id": {"kind": "youtube#video", "videoId": "fJ9rUzIMcZQ"},
                "snippet": {"title": "Queen - Bohemian Rhapsody", "channelTitle": "Queen Official"}
            }]
        }"#;
        let response: SearchListResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.items.len(), 1);
        assert_eq!(
            response.items[0].id.video_id.as_deref(),
            Some("fJ9rUzIMcZQ")
        );
        assert_eq!(
            response.items[0].snippet.as_ref().unwrap().title,
            "Queen - Bohemian Rhapsody"
        );
    }

    #[test]
    fn test_token_response_ignores_unused_fields() {
        let body = r#"{
            "access_token": "ya29.a0Af",
            "expires_in": 3599,
            "token_type": "Bearer",
            "scope": "https://www.googleapis.com/auth/youtube",
            "refresh_token": "1//0g"
        }"#;
        let response: GoogleTokenResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.access_token, "ya29.a0Af");
        assert_eq!(response.expires_in, 3599);
    }
}
