use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::ports::youtube::{NewPlaylist, Privacy, YoutubeClient};
use crate::services::paced::{PacedError, PacedExecutor, StepOutcome};
use crate::session::Credential;
use crate::youtube_rs::{YoutubeApiError, playlist_url};

pub const DEFAULT_PLAYLIST_TITLE: &str = "My Playlist";
pub const PLAYLIST_DESCRIPTION: &str = "Created with Playlist Creator";
pub const DEFAULT_PACING_INTERVAL: Duration = Duration::from_millis(200);

/// Trimmed, non-blank song names in the order they were given. Duplicates are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongRequests(Vec<String>);

impl SongRequests {
    pub fn from_raw<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            raw.into_iter()
                .map(|song| song.as_ref().trim().to_string())
                .filter(|song| !song.is_empty())
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// Latest-only status line. Each report overwrites the previous one.
pub struct ProgressReporter {
    sender: watch::Sender<String>,
}

impl ProgressReporter {
    pub fn channel() -> (Self, watch::Receiver<String>) {
        let (sender, receiver) = watch::channel(String::new());
        (Self { sender }, receiver)
    }

    fn report(&self, status: String) {
        tracing::debug!(status = %status, "Progress");
        self.sender.send_replace(status);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertedSong {
    pub song: String,
    pub video_id: String,
    pub item_id: String,
}

/// Outcome of a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltPlaylist {
    pub id: String,
    pub url: String,
    pub inserted: Vec<InsertedSong>,
    /// Songs whose search returned no match.
    pub skipped: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Please add at least one song!")]
    EmptyInput,
    #[error("Authorization expired or revoked, sign in again: {message}")]
    AuthExpired { message: String },
    #[error("Failed to create playlist: {0}")]
    PlaylistCreateFailed(#[source] YoutubeApiError),
    #[error("Failed to search for \"{song}\": {source}")]
    SearchFailed {
        song: String,
        source: YoutubeApiError,
    },
    #[error("Failed to add \"{song}\" to playlist {playlist_id}: {source}")]
    ItemInsertFailed {
        song: String,
        playlist_id: String,
        source: YoutubeApiError,
    },
    #[error("Cancelled after {completed} songs, playlist {playlist_id} was kept")]
    Cancelled {
        playlist_id: String,
        completed: usize,
    },
}

impl BuildError {
    /// Status line shown to the user when a build stops.
    pub fn status_message(&self) -> String {
        match self {
            BuildError::EmptyInput => self.to_string(),
            BuildError::AuthExpired { message } => format!("Error: {message}"),
            BuildError::PlaylistCreateFailed(source)
            | BuildError::SearchFailed { source, .. }
            | BuildError::ItemInsertFailed { source, .. } => {
                format!("Error: {}", source.provider_message())
            }
            BuildError::Cancelled { .. } => format!("Error: {self}"),
        }
    }
}

/// Authorization failures take precedence over the per-step error kind.
fn classify(
    error: YoutubeApiError,
    fatal: impl FnOnce(YoutubeApiError) -> BuildError,
) -> BuildError {
    if error.is_unauthorized() {
        BuildError::AuthExpired {
            message: error.provider_message(),
        }
    } else {
        fatal(error)
    }
}

fn resolve_title(title: &str) -> String {
    let title = title.trim();
    if title.is_empty() {
        DEFAULT_PLAYLIST_TITLE.to_string()
    } else {
        title.to_string()
    }
}

/// Creates a private playlist and appends the top search match for each song.
///
/// The build is sequential and paced: one request in flight at a time, a fixed
/// pause between songs. A song without a match is skipped; any failed call
/// stops the build and leaves everything already created in place.
pub struct PlaylistBuilder<C: YoutubeClient> {
    client: C,
    executor: PacedExecutor,
    progress: ProgressReporter,
}

impl<C: YoutubeClient> PlaylistBuilder<C> {
    pub fn new(client: C, pacing: Duration, progress: ProgressReporter) -> Self {
        Self {
            client,
            executor: PacedExecutor::new(pacing),
            progress,
        }
    }

    #[tracing::instrument(skip_all, fields(title = title, songs = songs.len()))]
    pub async fn build<S: AsRef<str>>(
        &self,
        title: &str,
        songs: &[S],
        credential: &Credential,
        cancel: &CancellationToken,
    ) -> Result<BuiltPlaylist, BuildError> {
        let result = self.run(title, songs, credential, cancel).await;

        match &result {
            Ok(built) => {
                tracing::info!(
                    playlist_id = %built.id,
                    inserted = built.inserted.len(),
                    skipped = built.skipped.len(),
                    "Playlist build finished"
                );
                self.progress
                    .report(format!("Success! View your playlist: {}", built.url));
            }
            Err(error) => {
                tracing::error!(error = %error, "Playlist build failed");
                self.progress.report(error.status_message());
            }
        }

        result
    }

    async fn run<S: AsRef<str>>(
        &self,
        title: &str,
        songs: &[S],
        credential: &Credential,
        cancel: &CancellationToken,
    ) -> Result<BuiltPlaylist, BuildError> {
        let songs = SongRequests::from_raw(songs);
        if songs.is_empty() {
            return Err(BuildError::EmptyInput);
        }

        if credential.is_expired(Utc::now()) {
            return Err(BuildError::AuthExpired {
                message: format!("Access token expired at {}", credential.expires_at()),
            });
        }

        let token = credential.access_token();
        let new_playlist = NewPlaylist {
            title: resolve_title(title),
            description: PLAYLIST_DESCRIPTION.to_string(),
            privacy: Privacy::Private,
        };

        self.progress.report("Creating playlist...".to_string());
        let playlist = self
            .client
            .create_playlist(token, &new_playlist)
            .await
            .map_err(|error| classify(error, BuildError::PlaylistCreateFailed))?;
        tracing::info!(playlist_id = %playlist.id, title = %playlist.title, "Playlist created");

        let total = songs.len();
        self.progress
            .report(format!("Playlist created! Adding {total} songs..."));

        let client = &self.client;
        let progress = &self.progress;
        let playlist_id = playlist.id.as_str();

        let summary = self
            .executor
            .run(songs.as_slice(), cancel, |index, song| async move {
                progress.report(format!("Adding song {} of {}: {}", index + 1, total, song));

                let found = client
                    .search_top_video(token, song)
                    .await
                    .map_err(|source| {
                        classify(source, |source| BuildError::SearchFailed {
                            song: song.clone(),
                            source,
                        })
                    })?;

                let Some(video) = found else {
                    tracing::warn!(song = %song, "No results found, skipping");
                    return Ok(StepOutcome::Skipped);
                };

                let item = client
                    .insert_playlist_item(token, playlist_id, &video.video_id)
                    .await
                    .map_err(|source| {
                        classify(source, |source| BuildError::ItemInsertFailed {
                            song: song.clone(),
                            playlist_id: playlist_id.to_string(),
                            source,
                        })
                    })?;
                tracing::debug!(
                    song = %song,
                    video_id = %video.video_id,
                    position = ?item.position,
                    "Song added"
                );

                Ok::<_, BuildError>(StepOutcome::Done(InsertedSong {
                    song: song.clone(),
                    video_id: video.video_id,
                    item_id: item.id,
                }))
            })
            .await;

        let summary = match summary {
            Ok(summary) => summary,
            Err(PacedError::Step { error, .. }) => return Err(error),
            Err(PacedError::Cancelled { completed }) => {
                return Err(BuildError::Cancelled {
                    playlist_id: playlist.id.clone(),
                    completed,
                });
            }
        };

        let mut inserted = Vec::new();
        let mut skipped = Vec::new();
        for (song, outcome) in songs.as_slice().iter().zip(summary.outcomes) {
            match outcome {
                StepOutcome::Done(inserted_song) => inserted.push(inserted_song),
                StepOutcome::Skipped => skipped.push(song.clone()),
            }
        }

        Ok(BuiltPlaylist {
            url: playlist_url(&playlist.id),
            id: playlist.id,
            inserted,
            skipped,
        })
    }
}
