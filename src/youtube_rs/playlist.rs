use reqwest::Client;
use url::Url;

use crate::youtube_rs::YoutubeApiError;
use crate::youtube_rs::send_json;
use crate::youtube_rs::types::{
    PlaylistInsertRequest, PlaylistItemInsertRequest, PlaylistItemResource, PlaylistItemSnippet,
    PlaylistResource, PlaylistSnippet, PlaylistStatus, ResourceId,
};

/* ---------- Create playlist ---------- */

pub async fn create_playlist(
    client: &Client,
    base_url: &Url,
    access_token: &str,
    title: &str,
    description: &str,
    privacy_status: &str,
) -> Result<PlaylistResource, YoutubeApiError> {
    let mut url = base_url.join("playlists")?;
    url.query_pairs_mut().append_pair("part", "snippet,status");

    let body = PlaylistInsertRequest {
        snippet: PlaylistSnippet {
            title: title.to_string(),
            description: Some(description.to_string()),
        },
        status: PlaylistStatus {
            privacy_status: privacy_status.to_string(),
        },
    };

    tracing::debug!(title, privacy_status, "Creating YouTube playlist");
    send_json(client.post(url).json(&body), access_token).await
}

/* ---------- Add item ---------- */

pub async fn insert_playlist_item(
    client: &Client,
    base_url: &Url,
    access_token: &str,
    playlist_id: &str,
    video_id: &str,
) -> Result<PlaylistItemResource, YoutubeApiError> {
    let mut url = base_url.join("playlistItems")?;
    url.query_pairs_mut().append_pair("part", "snippet");

    let body = PlaylistItemInsertRequest {
        snippet: PlaylistItemSnippet {
            playlist_id: playlist_id.to_string(),
            resource_id: ResourceId {
                kind: "youtube#video".to_string(),
                video_id: video_id.to_string(),
            },
            position: None,
        },
    };

    tracing::debug!(playlist_id, video_id, "Inserting playlist item");
    send_json(client.post(url).json(&body), access_token).await
}
