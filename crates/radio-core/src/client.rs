//! HTTP client for the station's read-only JSON endpoints.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::{Config, StationConfig};
use crate::error::{Error, Result};
use crate::model::{IcecastStatus, PlaylistSnapshot, Schedule};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_USER_AGENT: &str = concat!("radio-dash/", env!("CARGO_PKG_VERSION"));

/// External links for a channel: the two playlist files for desktop players
/// and the channel's file listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamLinks {
    pub ogg_m3u: String,
    pub mp3_m3u: String,
    pub file_list: String,
}

#[derive(Clone)]
pub struct StationClient {
    http: Client,
    station: StationConfig,
}

impl StationClient {
    pub fn new(station: StationConfig) -> Result<Self> {
        Self::builder(station).build()
    }

    /// Client for `config.station` using the configured request timeout.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::builder(config.station.clone())
            .timeout(Duration::from_secs(config.polling.request_timeout_secs.max(1)))
            .build()
    }

    pub fn builder(station: StationConfig) -> StationClientBuilder {
        StationClientBuilder::new(station)
    }

    pub fn station(&self) -> &StationConfig {
        &self.station
    }

    pub fn status_url(&self) -> String {
        self.station.resolve(&self.station.status_path)
    }

    pub fn playlist_url(&self, channel: &str) -> String {
        self.station
            .resolve(&self.station.playlist_path.replace("{channel}", channel))
    }

    pub fn schedule_url(&self) -> String {
        self.station.resolve(&self.station.schedule_path)
    }

    pub fn stream_links(&self, channel: &str) -> StreamLinks {
        let base = self.station.stream_base();
        let base = base.trim_end_matches('/');
        StreamLinks {
            ogg_m3u: format!("{}/{}.ogg.m3u", base, channel),
            mp3_m3u: format!("{}/{}.mp3.m3u", base, channel),
            file_list: self
                .station
                .resolve(&self.station.file_list_path.replace("{channel}", channel)),
        }
    }

    pub async fn fetch_status(&self) -> Result<IcecastStatus> {
        self.get_json(&self.status_url()).await
    }

    pub async fn fetch_playlist(&self, channel: &str) -> Result<PlaylistSnapshot> {
        self.get_json(&self.playlist_url(channel)).await
    }

    pub async fn fetch_schedule(&self) -> Result<Schedule> {
        self.get_json(&self.schedule_url()).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("GET {}", url);
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

pub struct StationClientBuilder {
    station: StationConfig,
    client: Option<Client>,
    timeout: Duration,
    user_agent: String,
}

impl StationClientBuilder {
    fn new(station: StationConfig) -> Self {
        Self {
            station,
            client: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Use a preconfigured reqwest client; timeout and user agent are ignored.
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> Result<StationClient> {
        let http = match self.client {
            Some(c) => c,
            None => Client::builder()
                .user_agent(self.user_agent)
                .timeout(self.timeout)
                .build()?,
        };
        Ok(StationClient {
            http,
            station: self.station,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> StationClient {
        StationClient::new(StationConfig {
            base_url: "https://radio.example.org/".to_string(),
            ..StationConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_urls() {
        let c = client();
        assert_eq!(
            c.status_url(),
            "https://radio.example.org/radio/status-json.xsl"
        );
        assert_eq!(
            c.playlist_url("jazz"),
            "https://radio.example.org/playlist/jazz.json"
        );
        assert_eq!(c.schedule_url(), "https://radio.example.org/schedule.json");
    }

    #[test]
    fn test_stream_links() {
        let links = client().stream_links("jazz");
        assert!(links.ogg_m3u.ends_with("/jazz.ogg.m3u"));
        assert!(links.mp3_m3u.ends_with("/jazz.mp3.m3u"));
        assert_eq!(
            links.file_list,
            "https://radio.example.org/file-list/jazz.html"
        );
    }
}
