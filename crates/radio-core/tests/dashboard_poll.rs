mod common;

use std::time::Duration;

use radio_core::client::StationClient;
use radio_core::dashboard::{DashboardCommand, DashboardCore, DashboardEvent};
use radio_core::model::Codec;
use radio_core::player::{NullOutput, PlayIndicator};
use tokio::sync::{broadcast, mpsc};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{collect_for, config_for, playlist_json, requested_paths, status_json, wait_for};

async fn mount_json(server: &MockServer, at: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_startup_lists_channels_and_fetches_default() {
    let server = MockServer::start().await;
    mount_json(&server, "/radio/status-json.xsl", status_json()).await;
    mount_json(&server, "/playlist/cyberia.json", playlist_json("Roygbiv")).await;

    let config = config_for(&server);
    let client = StationClient::from_config(&config).unwrap();
    let (events_tx, mut events) = broadcast::channel(256);
    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    let core = DashboardCore::new(&config, client, NullOutput::new(), events_tx);
    let handle = tokio::spawn(core.run(cmd_rx));

    let (channels, selected) = wait_for(&mut events, |e| match e {
        DashboardEvent::ChannelsListed { channels, selected } => {
            Some((channels.clone(), selected.clone()))
        }
        _ => None,
    })
    .await;
    assert_eq!(channels, vec!["cyberia", "jazz", "jazz2"]);
    assert_eq!(selected.as_deref(), Some("cyberia"));

    let playlist = wait_for(&mut events, |e| match e {
        DashboardEvent::PlaylistUpdated(view) => Some(view.clone()),
        _ => None,
    })
    .await;
    assert_eq!(playlist.now_playing, "Current Artist - Roygbiv");
    assert_eq!(playlist.played().len(), 2);
    assert_eq!(playlist.played()[0].text, "Older");
    assert_eq!(playlist.upcoming()[0].when(), "in 3 mins");

    cmd_tx.send(DashboardCommand::Shutdown).await.unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_change_channel_fetches_new_playlist_and_links() {
    let server = MockServer::start().await;
    mount_json(&server, "/radio/status-json.xsl", status_json()).await;
    mount_json(&server, "/playlist/cyberia.json", playlist_json("Roygbiv")).await;
    mount_json(&server, "/playlist/jazz.json", playlist_json("So What")).await;

    let config = config_for(&server);
    let client = StationClient::from_config(&config).unwrap();
    let (events_tx, mut events) = broadcast::channel(256);
    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    let core = DashboardCore::new(&config, client, NullOutput::new(), events_tx);
    let handle = tokio::spawn(core.run(cmd_rx));

    let before = wait_for(&mut events, |e| match e {
        DashboardEvent::Player(view) => Some(view.clone()),
        _ => None,
    })
    .await;
    assert_eq!(before.codec, Codec::Ogg);

    cmd_tx
        .send(DashboardCommand::ChangeChannel("jazz".to_string()))
        .await
        .unwrap();

    let links = wait_for(&mut events, |e| match e {
        DashboardEvent::Links { channel, links } if channel == "jazz" => Some(links.clone()),
        _ => None,
    })
    .await;
    assert!(links.ogg_m3u.contains("/jazz.ogg.m3u"));
    assert!(links.mp3_m3u.contains("/jazz.mp3.m3u"));

    let after = wait_for(&mut events, |e| match e {
        DashboardEvent::Player(view) if view.channel == "jazz" => Some(view.clone()),
        _ => None,
    })
    .await;
    assert_eq!(after.codec, before.codec);
    assert_eq!(after.indicator, PlayIndicator::Play);

    // Playlist and status responses race; wait for both.  The status
    // document (peak 2) wins over the snapshot's own listener block.
    let mut saw_playlist = false;
    let mut status = None;
    wait_for(&mut events, |e| {
        match e {
            DashboardEvent::PlaylistUpdated(view) if view.now_playing.ends_with("So What") => {
                saw_playlist = true;
            }
            DashboardEvent::StatusUpdated(s) if s.channel == "jazz" && s.listener_peak == 2 => {
                status = Some(s.clone());
            }
            _ => {}
        }
        (saw_playlist && status.is_some()).then_some(())
    })
    .await;
    assert_eq!(status.map(|s| s.listeners), Some(1));

    assert!(requested_paths(&server)
        .await
        .iter()
        .any(|p| p == "/playlist/jazz.json"));

    cmd_tx.send(DashboardCommand::Shutdown).await.unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_failed_fetches_are_silent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/radio/status-json.xsl"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/playlist/cyberia.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let client = StationClient::from_config(&config).unwrap();
    let (events_tx, mut events) = broadcast::channel(256);
    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    let core = DashboardCore::new(&config, client, NullOutput::new(), events_tx);
    let handle = tokio::spawn(core.run(cmd_rx));

    cmd_tx.send(DashboardCommand::Refresh).await.unwrap();
    let seen = collect_for(&mut events, Duration::from_millis(500)).await;
    assert!(!seen.iter().any(|e| matches!(
        e,
        DashboardEvent::PlaylistUpdated(_)
            | DashboardEvent::StatusUpdated(_)
            | DashboardEvent::ChannelsListed { .. }
            | DashboardEvent::Progress(_)
    )));

    let paths = requested_paths(&server).await;
    assert!(paths.iter().filter(|p| *p == "/playlist/cyberia.json").count() >= 2);
    assert!(paths.iter().any(|p| p == "/radio/status-json.xsl"));

    // Still serving commands after the failures.
    cmd_tx.send(DashboardCommand::CycleVolume).await.unwrap();
    let view = wait_for(&mut events, |e| match e {
        DashboardEvent::Player(view) => Some(view.clone()),
        _ => None,
    })
    .await;
    assert_eq!(view.volume, 1.0);

    cmd_tx.send(DashboardCommand::Shutdown).await.unwrap();
    handle.await.unwrap().unwrap();
}
