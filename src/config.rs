use std::path::{Path, PathBuf};
use std::time::Duration;

use color_eyre::Result;
use color_eyre::eyre::{Context, eyre};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::services::playlist_builder::DEFAULT_PACING_INTERVAL;
use crate::youtube_rs::{YOUTUBE_API_BASE_URL, parse_base_url};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OAuth client id of a Google "Desktop app" client
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub api_base_url: String,
    /// Pause between songs, in milliseconds
    pub pacing_ms: u64,
    /// Local port the sign-in redirect lands on
    pub redirect_port: u16,
    /// How long to wait for the browser sign-in, in seconds
    pub sign_in_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            api_base_url: YOUTUBE_API_BASE_URL.to_string(),
            pacing_ms: DEFAULT_PACING_INTERVAL.as_millis() as u64,
            redirect_port: 8080,
            sign_in_timeout_secs: 300,
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join("playlist-builder").join("config.toml"))
    }

    /// Load the default config file, or built-in defaults when there is none
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                tracing::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Write the default config to `path` unless a file is already there.
    /// Returns whether a file was written.
    pub fn write_default(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
        }

        let contents =
            toml::to_string_pretty(&Self::default()).wrap_err("Failed to serialize config")?;
        std::fs::write(path, contents)
            .wrap_err_with(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(true)
    }

    pub fn create_default() -> Result<PathBuf> {
        let path = Self::config_path().ok_or(eyre!("No config directory on this platform"))?;
        if !Self::write_default(&path)? {
            tracing::info!("Config already exists at {}", path.display());
        }
        Ok(path)
    }

    pub fn pacing_interval(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    pub fn sign_in_timeout(&self) -> Duration {
        Duration::from_secs(self.sign_in_timeout_secs)
    }

    pub fn api_base_url(&self) -> Result<Url> {
        parse_base_url(&self.api_base_url)
            .wrap_err_with(|| format!("Invalid api_base_url: {}", self.api_base_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.pacing_interval(), Duration::from_millis(200));
        assert_eq!(config.sign_in_timeout(), Duration::from_secs(300));
        assert_eq!(
            config.api_base_url().unwrap().as_str(),
            "https://www.googleapis.com/youtube/v3/"
        );
        assert!(config.client_id.is_none());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "client_id = \"abc.apps.googleusercontent.com\"\npacing_ms = 500\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(
            config.client_id.as_deref(),
            Some("abc.apps.googleusercontent.com")
        );
        assert_eq!(config.pacing_interval(), Duration::from_millis(500));
        assert_eq!(config.redirect_port, 8080);
        assert_eq!(config.api_base_url, YOUTUBE_API_BASE_URL);
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "pacing_ms = \"soon\"").unwrap();

        let error = Config::from_file(&path).unwrap_err();
        assert!(error.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_write_default_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        assert!(Config::write_default(&path).unwrap());
        assert_eq!(Config::from_file(&path).unwrap(), Config::default());

        std::fs::write(&path, "pacing_ms = 1000\n").unwrap();
        assert!(!Config::write_default(&path).unwrap());
        assert_eq!(Config::from_file(&path).unwrap().pacing_ms, 1000);
    }
}
