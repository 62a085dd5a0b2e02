#![allow(dead_code)]

use std::time::Duration;

use radio_core::config::Config;
use radio_core::dashboard::DashboardEvent;
use serde_json::json;
use tokio::sync::broadcast;
use wiremock::MockServer;

/// Icecast status with two channels in both codecs, a look-alike channel and
/// the aggregate mount.
pub fn status_json() -> serde_json::Value {
    json!({
        "icestats": {
            "admin": "icemaster@localhost",
            "source": [
                {
                    "server_name": "[mpd] cyberia (ogg)",
                    "listeners": 3,
                    "listener_peak": 10,
                    "artist": "Boards of Canada",
                    "title": "Roygbiv",
                    "server_description": "Electronic, ambient and chiptune"
                },
                {
                    "server_name": "[mpd] cyberia (mp3)",
                    "listeners": 2,
                    "listener_peak": 4,
                    "artist": "Boards of Canada",
                    "title": "Roygbiv"
                },
                { "server_name": "[mpd] jazz (ogg)", "listeners": 1, "listener_peak": 2 },
                { "server_name": "[mpd] jazz2 (ogg)", "listeners": 100, "listener_peak": 100 },
                { "server_name": "[mpd] everything (mp3)", "listeners": 50, "listener_peak": 60 },
                { "listenurl": "http://localhost:8000/relay" }
            ]
        }
    })
}

pub fn playlist_json(title: &str) -> serde_json::Value {
    json!({
        "current": { "artist": "Current Artist", "title": title, "album": "Now", "time": 240 },
        "before": [
            { "artist": "Prev Artist", "title": "Previous", "album": "Then", "time": "200" },
            { "title": "Older", "album": "", "time": 90 }
        ],
        "after": [
            { "artist": "Next Artist", "title": "Next", "album": "Soon", "time": 180 }
        ],
        "elapsed": 60,
        "listeners": { "current": 4, "peak": 9 }
    })
}

/// Config pointing at `server`, with timers long enough that only the
/// initial fetches and explicit commands hit the mock.
pub fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.station.base_url = server.uri();
    config.polling.playlist_secs = 3600;
    config.polling.schedule_secs = 0;
    config.polling.request_timeout_secs = 2;
    config
}

/// Wait until `pick` accepts an event.
pub async fn wait_for<T>(
    rx: &mut broadcast::Receiver<DashboardEvent>,
    mut pick: impl FnMut(&DashboardEvent) -> Option<T>,
) -> T {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Some(found) = pick(&event) {
                        return found;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(e) => panic!("dashboard event stream closed: {}", e),
            }
        }
    })
    .await
    .expect("timed out waiting for dashboard event")
}

/// Everything broadcast within `window`.
pub async fn collect_for(
    rx: &mut broadcast::Receiver<DashboardEvent>,
    window: Duration,
) -> Vec<DashboardEvent> {
    let mut events = Vec::new();
    let deadline = tokio::time::Instant::now() + window;
    while let Ok(Ok(event)) = tokio::time::timeout_at(deadline, rx.recv()).await {
        events.push(event);
    }
    events
}

pub async fn requested_paths(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| r.url.path().to_string())
        .collect()
}
