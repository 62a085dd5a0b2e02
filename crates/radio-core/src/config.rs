use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::model::Codec;
use super::naming::NamingConvention;
use super::platform;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub station: StationConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub player: PlayerConfig,
}

/// Where the station lives and how its endpoints and mounts are named.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationConfig {
    /// Scheme + host of the station website, e.g. `https://radio.example.org`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Base URL of the Icecast mounts.  Relative paths are resolved against
    /// `base_url`.
    #[serde(default = "default_stream_url_base")]
    pub stream_url_base: String,
    #[serde(default = "default_status_path")]
    pub status_path: String,
    /// `{channel}` is replaced with the channel name.
    #[serde(default = "default_playlist_path")]
    pub playlist_path: String,
    #[serde(default = "default_schedule_path")]
    pub schedule_path: String,
    /// `{channel}` is replaced with the channel name.
    #[serde(default = "default_file_list_path")]
    pub file_list_path: String,
    #[serde(default = "default_channel")]
    pub default_channel: String,
    #[serde(default)]
    pub naming: NamingConvention,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Playlist + listener status refresh.
    #[serde(default = "default_playlist_secs")]
    pub playlist_secs: u64,
    /// Local progress-bar smoothing tick.
    #[serde(default = "default_progress_secs")]
    pub progress_secs: u64,
    /// Weekly schedule refresh.  0 disables the schedule table.
    #[serde(default = "default_schedule_secs")]
    pub schedule_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    #[serde(default = "default_volume")]
    pub default_volume: f32,
    /// Codec loaded at startup.  Channel switches keep whatever is loaded.
    #[serde(default)]
    pub codec: Codec,
    /// Explicit mpv binary; otherwise searched beside the executable and on PATH.
    #[serde(default)]
    pub mpv_path: Option<PathBuf>,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            stream_url_base: default_stream_url_base(),
            status_path: default_status_path(),
            playlist_path: default_playlist_path(),
            schedule_path: default_schedule_path(),
            file_list_path: default_file_list_path(),
            default_channel: default_channel(),
            naming: NamingConvention::default(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            playlist_secs: default_playlist_secs(),
            progress_secs: default_progress_secs(),
            schedule_secs: default_schedule_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            default_volume: default_volume(),
            codec: Codec::default(),
            mpv_path: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost".to_string()
}

fn default_stream_url_base() -> String {
    "/radio".to_string()
}

fn default_status_path() -> String {
    "/radio/status-json.xsl".to_string()
}

fn default_playlist_path() -> String {
    "/playlist/{channel}.json".to_string()
}

fn default_schedule_path() -> String {
    "/schedule.json".to_string()
}

fn default_file_list_path() -> String {
    "/file-list/{channel}.html".to_string()
}

fn default_channel() -> String {
    "cyberia".to_string()
}

fn default_playlist_secs() -> u64 {
    15
}

fn default_progress_secs() -> u64 {
    1
}

fn default_schedule_secs() -> u64 {
    30 * 60
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_volume() -> f32 {
    crate::player::DEFAULT_VOLUME
}

impl StationConfig {
    /// Resolve a path (or absolute URL) against `base_url`.
    pub fn resolve(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!(
                "{}/{}",
                self.base_url.trim_end_matches('/'),
                path.trim_start_matches('/')
            )
        }
    }

    pub fn stream_base(&self) -> String {
        self.resolve(&self.stream_url_base)
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(&config_path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}
