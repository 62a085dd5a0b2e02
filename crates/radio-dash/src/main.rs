mod action;
mod app;
mod app_state;
mod component;
mod components;
mod focus;
mod mpv;
mod theme;
mod widgets;

use tokio::sync::{broadcast, mpsc};

use radio_core::client::StationClient;
use radio_core::config::Config;
use radio_core::dashboard::{DashboardCommand, DashboardCore, DashboardEvent};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let data_dir = radio_core::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;

    let log_path = data_dir.join("radio-dash.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // RUST_LOG overrides; HTTP client internals are noisy at debug.
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    eprintln!("radio-dash log: {}", log_path.display());
    tracing::info!("radio-dash starting…");

    // ── Config ───────────────────────────────────────────────────────────────
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("config: {}, using defaults", e);
            Config::default()
        }
    };
    let client = StationClient::from_config(&config)?;
    let output = mpv::Output::detect(config.player.mpv_path.as_deref());

    // ── Channels ─────────────────────────────────────────────────────────────
    let (events_tx, events_rx) = broadcast::channel::<DashboardEvent>(1024);
    let (cmd_tx, cmd_rx) = mpsc::channel::<DashboardCommand>(256);

    // ── Dashboard loop ───────────────────────────────────────────────────────
    let core = DashboardCore::new(&config, client, output, events_tx);
    let core_task = tokio::spawn(async move {
        if let Err(e) = core.run(cmd_rx).await {
            tracing::error!("dashboard exited with error: {}", e);
        }
    });

    // ── TUI ──────────────────────────────────────────────────────────────────
    let app = app::App::new(&config.station.default_channel, cmd_tx);
    let result = app.run(events_rx).await;

    // The app sends Shutdown on exit; give the player a moment to stop.
    let _ = tokio::time::timeout(std::time::Duration::from_secs(2), core_task).await;
    tracing::info!("radio-dash exiting");
    result
}
