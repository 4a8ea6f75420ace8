mod config;
mod logging;
mod ports;
mod services;
mod session;
#[cfg(test)]
mod test_utils;
mod youtube_rs;

use std::io::Read;
use std::path::PathBuf;

use chrono::{TimeDelta, Utc};
use clap::{Parser, Subcommand};
use color_eyre::{
    Result,
    eyre::{Context, eyre},
};
use reqwest::Client;
use tokio_util::sync::CancellationToken;

use crate::{
    config::Config,
    logging::{init_tracing, shutdown_tracing},
    services::{
        playlist_builder::{BuildError, PlaylistBuilder, ProgressReporter, SongRequests},
        sign_in::LoopbackSignIn,
        youtube::client::YoutubeHttpAdapter,
    },
    session::{Credential, Session, SessionProvider},
    youtube_rs::auth::revoke_token,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The config file to use
    #[arg(short, long, env = "PLAYLIST_BUILDER_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Log filter, e.g. `info` or `playlist_builder=debug`
    #[arg(
        long,
        default_value = "warn",
        global = true,
        env = "PLAYLIST_BUILDER_LOG"
    )]
    log_level: String,

    /// OTLP gRPC endpoint to export traces to
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT", global = true)]
    otlp_endpoint: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

fn is_file(s: &str) -> Result<PathBuf, String> {
    let p: PathBuf = s.into();
    if p.is_file() {
        Ok(p)
    } else {
        Err(format!("`{}` is not an existing file", s))
    }
}

#[derive(clap::Args, Debug)]
struct BuildArgs {
    /// Playlist title (default: "My Playlist")
    #[arg(short, long)]
    title: Option<String>,

    /// Read song names from a file, one per line
    #[arg(short, long, value_parser = is_file, conflicts_with = "songs")]
    file: Option<PathBuf>,

    /// Song names, e.g. "Bohemian Rhapsody Queen".
    /// Read from stdin when neither songs nor --file are given
    songs: Vec<String>,

    /// Use an existing OAuth access token instead of signing in
    #[arg(long, env = "YOUTUBE_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// OAuth client id (overrides the config file)
    #[arg(long, env = "YOUTUBE_CLIENT_ID")]
    client_id: Option<String>,

    /// OAuth client secret (overrides the config file)
    #[arg(long, env = "YOUTUBE_CLIENT_SECRET", hide_env_values = true)]
    client_secret: Option<String>,

    /// Revoke the access token once the build finishes
    #[arg(long)]
    sign_out: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a private YouTube playlist from a list of song names
    Build(BuildArgs),
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Create a default config file, if it doesn't exist
    CreateDefault,
    /// Print the path to the config file
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let tracer_provider = init_tracing(args.otlp_endpoint.as_deref(), &args.log_level)?;

    let result = run(args).await;

    shutdown_tracing(tracer_provider);
    result
}

async fn run(args: Args) -> Result<()> {
    match args.command {
        Commands::Config(ConfigCommands::CreateDefault) => {
            let path = Config::create_default()?;
            println!("{}", path.display());
        }
        Commands::Config(ConfigCommands::Path) => match Config::config_path() {
            Some(path) => println!("{}", path.display()),
            None => println!("No default config path found"),
        },
        Commands::Build(build_args) => {
            tracing::debug!("Loading configuration");
            let config = match &args.config {
                Some(path) => Config::from_file(path),
                None => Config::load(),
            }
            .wrap_err("Failed to load playlist-builder config")?;

            build_playlist(config, build_args).await?;
        }
    }

    Ok(())
}

fn read_song_lines(args: &BuildArgs) -> Result<Vec<String>> {
    if !args.songs.is_empty() {
        return Ok(args.songs.clone());
    }

    let contents = match &args.file {
        Some(path) => std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read songs from {}", path.display()))?,
        None => {
            let mut contents = String::new();
            std::io::stdin()
                .read_to_string(&mut contents)
                .wrap_err("Failed to read songs from stdin")?;
            contents
        }
    };

    Ok(contents.lines().map(str::to_string).collect())
}

/// Resolve a credential, either the one given on the command line or through
/// the browser sign-in, and return once the session is signed in.
async fn establish_session(config: &Config, args: &BuildArgs, http: &Client) -> Result<Session> {
    if let Some(access_token) = &args.access_token {
        // Google access tokens live for an hour; the actual issue time is unknown
        let credential = Credential::new(access_token.clone(), Utc::now() + TimeDelta::hours(1));
        return Ok(Session::with_credential(credential));
    }

    let client_id = args
        .client_id
        .clone()
        .or_else(|| config.client_id.clone())
        .ok_or_else(|| {
            eyre!(
                "No OAuth client id: pass --client-id, set YOUTUBE_CLIENT_ID or add client_id to the config file"
            )
        })?;
    let client_secret = args
        .client_secret
        .clone()
        .or_else(|| config.client_secret.clone());

    let session = Session::new();
    let sign_in = LoopbackSignIn::new(
        http.clone(),
        client_id,
        client_secret,
        config.redirect_port,
        config.sign_in_timeout(),
    );
    let flow_session = session.clone();
    let mut flow = tokio::spawn(async move { sign_in.run(&flow_session).await });

    tokio::select! {
        credential = session.wait_for_sign_in() => {
            credential?;
        }
        joined = &mut flow => {
            joined.wrap_err("Sign-in task panicked")??;
        }
    }

    Ok(session)
}

async fn sign_out(session: &Session, http: &Client) {
    if let Some(credential) = session.sign_out()
        && let Err(error) = revoke_token(http, credential.access_token()).await
    {
        tracing::warn!(error = %error, "Failed to revoke access token");
    }
}

async fn build_playlist(config: Config, args: BuildArgs) -> Result<()> {
    let raw_songs = read_song_lines(&args)?;
    let songs = SongRequests::from_raw(&raw_songs);
    if songs.is_empty() {
        return Err(BuildError::EmptyInput.into());
    }
    tracing::debug!(songs = songs.len(), "Collected song requests");

    let http = Client::new();
    let session = establish_session(&config, &args, &http).await?;
    let credential = session
        .get_credential()
        .ok_or_else(|| eyre!("Signed out before the build started"))?;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, stopping after the current song");
                cancel.cancel();
            }
        });
    }

    let (progress, mut status) = ProgressReporter::channel();
    let printer = tokio::spawn(async move {
        while status.changed().await.is_ok() {
            let line = status.borrow_and_update().clone();
            eprintln!("{line}");
        }
    });

    let builder = PlaylistBuilder::new(
        YoutubeHttpAdapter::new(http.clone(), config.api_base_url()?),
        config.pacing_interval(),
        progress,
    );
    let title = args.title.clone().unwrap_or_default();
    let result = builder
        .build(&title, songs.as_slice(), &credential, &cancel)
        .await;

    // Dropping the builder closes the progress channel and ends the printer
    drop(builder);
    let _ = printer.await;

    if args.sign_out {
        sign_out(&session, &http).await;
    }

    let built = result?;
    if !built.skipped.is_empty() {
        eprintln!(
            "Added {} songs, no match found for: {}",
            built.inserted.len(),
            built.skipped.join(", ")
        );
    }
    println!("{}", built.url);

    Ok(())
}
