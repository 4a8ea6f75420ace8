use reqwest::Client;
use url::Url;

use crate::ports::youtube::{
    CreatedPlaylist, InsertedItem, NewPlaylist, VideoMatch, YoutubeClient,
};
use crate::youtube_rs::YoutubeApiError;
use crate::youtube_rs::playlist::{create_playlist, insert_playlist_item};
use crate::youtube_rs::search::search_videos;

pub struct YoutubeHttpAdapter {
    client: Client,
    base_url: Url,
}

impl YoutubeHttpAdapter {
    pub fn new(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }
}

#[async_trait::async_trait]
impl YoutubeClient for YoutubeHttpAdapter {
    async fn create_playlist(
        &self,
        access_token: &str,
        playlist: &NewPlaylist,
    ) -> Result<CreatedPlaylist, YoutubeApiError> {
        let created = create_playlist(
            &self.client,
            &self.base_url,
            access_token,
            &playlist.title,
            &playlist.description,
            playlist.privacy.as_str(),
        )
        .await?;

        Ok(CreatedPlaylist {
            title: created
                .snippet
                .map(|snippet| snippet.title)
                .unwrap_or_else(|| playlist.title.clone()),
            id: created.id,
        })
    }

    async fn search_top_video(
        &self,
        access_token: &str,
        query: &str,
    ) -> Result<Option<VideoMatch>, YoutubeApiError> {
        let results = search_videos(&self.client, &self.base_url, access_token, query, 1).await?;

        // type=video should only yield videos, but channel/playlist hits carry no videoId
        Ok(results.into_iter().find_map(|result| {
            result.id.video_id.map(|video_id| VideoMatch {
                video_id,
                title: result.snippet.map(|snippet| snippet.title),
            })
        }))
    }

    async fn insert_playlist_item(
        &self,
        access_token: &str,
        playlist_id: &str,
        video_id: &str,
    ) -> Result<InsertedItem, YoutubeApiError> {
        let item = insert_playlist_item(
            &self.client,
            &self.base_url,
            access_token,
            playlist_id,
            video_id,
        )
        .await?;

        Ok(InsertedItem {
            id: item.id,
            position: item.snippet.and_then(|snippet| snippet.position),
        })
    }
}
