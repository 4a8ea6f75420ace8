use crate::youtube_rs::YoutubeApiError;

/// Visibility of a created playlist. Builds only ever create private ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privacy {
    Private,
}

impl Privacy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Privacy::Private => "private",
        }
    }
}

/// Playlist to create, decoupled from the API request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlaylist {
    pub title: String,
    pub description: String,
    pub privacy: Privacy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPlaylist {
    pub id: String,
    pub title: String,
}

/// Top search hit for a song request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoMatch {
    pub video_id: String,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertedItem {
    pub id: String,
    pub position: Option<u32>,
}

/// Port trait wrapping the three YouTube Data API calls the playlist builder makes.
///
/// Implementations live in `services::youtube::client` (production) or test mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait YoutubeClient: Send + Sync {
    async fn create_playlist(
        &self,
        access_token: &str,
        playlist: &NewPlaylist,
    ) -> Result<CreatedPlaylist, YoutubeApiError>;

    /// Returns the single most relevant music video for `query`, if any.
    async fn search_top_video(
        &self,
        access_token: &str,
        query: &str,
    ) -> Result<Option<VideoMatch>, YoutubeApiError>;

    async fn insert_playlist_item(
        &self,
        access_token: &str,
        playlist_id: &str,
        video_id: &str,
    ) -> Result<InsertedItem, YoutubeApiError>;
}
