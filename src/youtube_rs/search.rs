use reqwest::Client;
use url::Url;

use crate::youtube_rs::YoutubeApiError;
use crate::youtube_rs::send_json;
use crate::youtube_rs::types::{SearchListResponse, SearchResult};

/// YouTube's fixed category id for "Music".
pub const MUSIC_CATEGORY_ID: &str = "10";

/// Build the `search.list` URL for a single relevance-ranked music video.
pub fn search_url(base_url: &Url, query: &str, max_results: u32) -> Result<Url, YoutubeApiError> {
    let mut url = base_url.join("search")?;
    url.query_pairs_mut()
        .append_pair("part", "snippet")
        .append_pair("q", query)
        .append_pair("type", "video")
        .append_pair("videoCategoryId", MUSIC_CATEGORY_ID)
        .append_pair("order", "relevance")
        .append_pair("maxResults", &max_results.to_string());
    Ok(url)
}

pub async fn search_videos(
    client: &Client,
    base_url: &Url,
    access_token: &str,
    query: &str,
    max_results: u32,
) -> Result<Vec<SearchResult>, YoutubeApiError> {
    let url = search_url(base_url, query, max_results)?;

    let res: SearchListResponse = send_json(client.get(url), access_token).await?;
    tracing::debug!(query, results = res.items.len(), "Search completed");

    Ok(res.items)
}
