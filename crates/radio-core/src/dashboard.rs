//! DashboardCore — single-owner event loop for the station dashboard.
//!
//! Owns the player, the progress clock and the client state exclusively;
//! front ends talk to it through `DashboardCommand` and read every change
//! back from the `DashboardEvent` broadcast.
//!
//! Network fetches are spawned tasks that post their result back into the
//! loop.  Each request carries the `(generation, channel)` it was issued
//! for; a channel switch bumps the generation and cancels in-flight requests,
//! and any late response that still arrives is dropped.  A failed fetch is
//! logged and otherwise ignored: the next timer tick is the retry.
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::client::{StationClient, StreamLinks};
use crate::config::{Config, PollingConfig};
use crate::error::Result;
use crate::model::{ChannelStatus, IcecastStatus, Listeners, PlaylistSnapshot, Schedule};
use crate::naming::NamingConvention;
use crate::player::{AudioOutput, Player, PlayerView};
use crate::playlist::PlaylistView;
use crate::progress::{ProgressClock, ProgressUpdate, ProgressView};

/// Minimum gap between two early refetches triggered by the progress clock.
/// Stops a server that keeps reporting an overrun track from being hammered.
const EARLY_REFETCH_GAP: Duration = Duration::from_secs(5);

// ── DashboardCommand / DashboardEvent ─────────────────────────────────────────

/// All inputs from the front end.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardCommand {
    ChangeChannel(String),
    TogglePlay,
    Play,
    Pause,
    Stop,
    /// Absolute slider volume, 0.0..=1.0.
    Volume(f32),
    StepVolume(f32),
    ToggleMute,
    CycleVolume,
    /// Fetch playlist and status now instead of waiting for the timer.
    Refresh,
    Shutdown,
}

/// Everything the front end renders.
#[derive(Debug, Clone)]
pub enum DashboardEvent {
    ChannelsListed {
        channels: Vec<String>,
        selected: Option<String>,
    },
    PlaylistUpdated(PlaylistView),
    StatusUpdated(ChannelStatus),
    ScheduleUpdated(Schedule),
    Progress(ProgressView),
    Player(PlayerView),
    Links {
        channel: String,
        links: StreamLinks,
    },
    /// A message worth surfacing to the user.
    Log(String),
}

// ── Fetch plumbing ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchKind {
    Playlist,
    Status,
    Schedule,
}

impl std::fmt::Display for FetchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Playlist => "playlist",
            Self::Status => "status",
            Self::Schedule => "schedule",
        })
    }
}

#[derive(Debug)]
enum Payload {
    Playlist(PlaylistSnapshot),
    Status(IcecastStatus),
    Schedule(Schedule),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RequestTag {
    generation: u64,
    channel: String,
}

#[derive(Debug)]
struct Fetched {
    tag: RequestTag,
    payload: Payload,
}

// ── ClientState ───────────────────────────────────────────────────────────────

/// Per-session state that used to be loose globals: the selected channel and
/// everything that must be reset when it changes.
#[derive(Debug)]
pub struct ClientState {
    pub channel: String,
    /// Bumped on every channel switch.
    pub generation: u64,
    cancel: CancellationToken,
    channels_listed: bool,
    has_snapshot: bool,
    /// Whether the last status document had a mount for `channel`.
    status_has_channel: bool,
    snapshot_listeners: Option<Listeners>,
}

impl ClientState {
    fn new(channel: String, parent: &CancellationToken) -> Self {
        Self {
            channel,
            generation: 0,
            cancel: parent.child_token(),
            channels_listed: false,
            has_snapshot: false,
            status_has_channel: false,
            snapshot_listeners: None,
        }
    }

    fn tag(&self) -> RequestTag {
        RequestTag {
            generation: self.generation,
            channel: self.channel.clone(),
        }
    }

    fn is_current(&self, tag: &RequestTag) -> bool {
        tag.generation == self.generation && tag.channel == self.channel
    }

    fn switch(&mut self, channel: &str, parent: &CancellationToken) {
        self.cancel.cancel();
        self.cancel = parent.child_token();
        self.generation += 1;
        self.channel = channel.to_string();
        self.has_snapshot = false;
        self.status_has_channel = false;
        self.snapshot_listeners = None;
    }
}

// ── Timers ────────────────────────────────────────────────────────────────────

/// The three recurring timers.  Always replaced as a set so the progress
/// clock stays in phase with the playlist poll.
struct Timers {
    poll: Interval,
    progress: Interval,
    schedule: Option<Interval>,
}

impl Timers {
    fn arm(polling: &PollingConfig) -> Self {
        Self {
            poll: every(polling.playlist_secs),
            progress: every(polling.progress_secs),
            schedule: (polling.schedule_secs > 0).then(|| every(polling.schedule_secs)),
        }
    }
}

/// An interval whose first tick is one period from now; the immediate fetch
/// is issued by hand when the timers are armed.
fn every(secs: u64) -> Interval {
    let period = Duration::from_secs(secs.max(1));
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(i) => {
            i.tick().await;
        }
        None => std::future::pending().await,
    }
}

enum Flow {
    Continue,
    Rearm,
    Shutdown,
}

// ── DashboardCore ─────────────────────────────────────────────────────────────

pub struct DashboardCore<O> {
    client: StationClient,
    naming: NamingConvention,
    polling: PollingConfig,
    initial_volume: f32,
    player: Player<O>,
    progress: ProgressClock,
    state: ClientState,
    /// Parent of every request token; cancelled on shutdown.
    shutdown: CancellationToken,
    events_tx: broadcast::Sender<DashboardEvent>,
    fetch_tx: mpsc::Sender<Fetched>,
    fetch_rx: mpsc::Receiver<Fetched>,
    last_early_refetch: Option<Instant>,
}

impl<O: AudioOutput + 'static> DashboardCore<O> {
    pub fn new(
        config: &Config,
        client: StationClient,
        output: O,
        events_tx: broadcast::Sender<DashboardEvent>,
    ) -> Self {
        let station = &config.station;
        let channel = station.default_channel.clone();
        let shutdown = CancellationToken::new();
        let (fetch_tx, fetch_rx) = mpsc::channel(64);

        Self {
            client,
            naming: station.naming.clone(),
            polling: config.polling.clone(),
            initial_volume: config.player.default_volume,
            player: Player::new(output, station.stream_base(), &channel, config.player.codec),
            progress: ProgressClock::new(),
            state: ClientState::new(channel, &shutdown),
            shutdown,
            events_tx,
            fetch_tx,
            fetch_rx,
            last_early_refetch: None,
        }
    }

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    pub fn player(&self) -> &Player<O> {
        &self.player
    }

    /// Run the loop.  Returns on `Shutdown` or when every command sender has
    /// been dropped.
    pub async fn run(mut self, mut cmd_rx: mpsc::Receiver<DashboardCommand>) -> Result<()> {
        info!("dashboard: starting on channel {}", self.state.channel);
        self.start().await;
        let mut timers = Timers::arm(&self.polling);

        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => match cmd {
                    None => {
                        info!("dashboard: command channel closed, shutting down");
                        break;
                    }
                    Some(cmd) => match self.handle_command(cmd).await {
                        Flow::Continue => {}
                        Flow::Rearm => timers = Timers::arm(&self.polling),
                        Flow::Shutdown => {
                            info!("dashboard: shutdown requested");
                            break;
                        }
                    },
                },

                Some(fetched) = self.fetch_rx.recv() => self.apply_fetch(fetched),

                _ = timers.poll.tick() => {
                    self.spawn_fetch(FetchKind::Playlist);
                    self.spawn_fetch(FetchKind::Status);
                }

                _ = timers.progress.tick() => self.tick_progress(),

                _ = next_tick(&mut timers.schedule) => self.spawn_fetch(FetchKind::Schedule),
            }
        }

        self.shutdown.cancel();
        if let Err(e) = self.player.stop().await {
            warn!("dashboard: stopping player on exit: {}", e);
        }
        Ok(())
    }

    /// Initial load: player ready (paused), links, channel list and the first
    /// round of fetches.
    async fn start(&mut self) {
        match self.player.init(self.initial_volume).await {
            Ok(view) => self.emit(DashboardEvent::Player(view)),
            Err(e) => {
                error!("dashboard: audio output failed to start: {}", e);
                self.emit(DashboardEvent::Log(format!("audio output unavailable: {}", e)));
            }
        }
        self.emit_links();
        self.spawn_fetch(FetchKind::Status);
        self.spawn_fetch(FetchKind::Playlist);
        if self.polling.schedule_secs > 0 {
            self.spawn_fetch(FetchKind::Schedule);
        }
    }

    // ── Commands ──────────────────────────────────────────────────────────────

    async fn handle_command(&mut self, cmd: DashboardCommand) -> Flow {
        debug!("dashboard: command {:?}", cmd);
        let result = match cmd {
            DashboardCommand::ChangeChannel(channel) => {
                return if self.change_channel(&channel).await {
                    Flow::Rearm
                } else {
                    Flow::Continue
                };
            }
            DashboardCommand::Refresh => {
                self.spawn_fetch(FetchKind::Playlist);
                self.spawn_fetch(FetchKind::Status);
                return Flow::Continue;
            }
            DashboardCommand::Shutdown => return Flow::Shutdown,
            DashboardCommand::TogglePlay => self.player.toggle_play().await,
            DashboardCommand::Play => Ok(self.player.play().await),
            DashboardCommand::Pause => self.player.pause().await,
            DashboardCommand::Stop => self.player.stop().await,
            DashboardCommand::Volume(v) => self.player.change_volume(v).await,
            DashboardCommand::StepVolume(d) => self.player.step_volume(d).await,
            DashboardCommand::ToggleMute => self.player.toggle_mute().await,
            DashboardCommand::CycleVolume => self.player.cycle_volume().await,
        };
        self.publish_player(result);
        Flow::Continue
    }

    /// Returns `false` when the name is blank and nothing changed.
    async fn change_channel(&mut self, channel: &str) -> bool {
        let channel = channel.trim();
        if channel.is_empty() {
            return false;
        }
        info!("dashboard: switching to channel {}", channel);

        self.state.switch(channel, &self.shutdown);
        self.progress = ProgressClock::new();
        self.last_early_refetch = None;
        self.emit_links();

        let result = self.player.change_channel(channel).await;
        self.publish_player(result);

        self.spawn_fetch(FetchKind::Playlist);
        self.spawn_fetch(FetchKind::Status);
        true
    }

    fn publish_player(&self, result: Result<PlayerView>) {
        match result {
            Ok(view) => self.emit(DashboardEvent::Player(view)),
            Err(e) => {
                error!("dashboard: player error: {}", e);
                self.emit(DashboardEvent::Log(format!("player: {}", e)));
            }
        }
    }

    // ── Fetches ───────────────────────────────────────────────────────────────

    fn spawn_fetch(&self, kind: FetchKind) {
        let client = self.client.clone();
        let tx = self.fetch_tx.clone();
        let tag = self.state.tag();
        let channel = tag.channel.clone();
        // The schedule is not per channel and survives channel switches.
        let cancel = match kind {
            FetchKind::Schedule => self.shutdown.clone(),
            FetchKind::Playlist | FetchKind::Status => self.state.cancel.clone(),
        };

        tokio::spawn(async move {
            let request = async move {
                match kind {
                    FetchKind::Playlist => client.fetch_playlist(&channel).await.map(Payload::Playlist),
                    FetchKind::Status => client.fetch_status().await.map(Payload::Status),
                    FetchKind::Schedule => client.fetch_schedule().await.map(Payload::Schedule),
                }
            };
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("dashboard: {} fetch for {} cancelled", kind, tag.channel);
                    return;
                }
                result = request => result,
            };
            match result {
                Ok(payload) => {
                    let _ = tx.send(Fetched { tag, payload }).await;
                }
                Err(e) => warn!("dashboard: {} fetch for {} failed: {}", kind, tag.channel, e),
            }
        });
    }

    fn apply_fetch(&mut self, fetched: Fetched) {
        let Fetched { tag, payload } = fetched;
        match payload {
            Payload::Schedule(schedule) => self.emit(DashboardEvent::ScheduleUpdated(schedule)),
            _ if !self.state.is_current(&tag) => {
                debug!(
                    "dashboard: dropping stale response for {} (generation {}, now {})",
                    tag.channel, tag.generation, self.state.generation
                );
            }
            Payload::Playlist(snapshot) => self.apply_playlist(snapshot),
            Payload::Status(status) => self.apply_status(status),
        }
    }

    fn apply_playlist(&mut self, snapshot: PlaylistSnapshot) {
        let view = PlaylistView::from_snapshot(&snapshot);
        let progress = self.progress.update(ProgressUpdate {
            length: snapshot.current.time,
            elapsed: snapshot.elapsed,
            live: snapshot.is_live(),
        });
        self.state.has_snapshot = true;
        self.state.snapshot_listeners = snapshot.listeners;

        self.emit(DashboardEvent::PlaylistUpdated(view));
        self.emit(DashboardEvent::Progress(progress));
        if !self.state.status_has_channel {
            if let Some(status) = self.fallback_status() {
                self.emit(DashboardEvent::StatusUpdated(status));
            }
        }
        self.maybe_refetch();
    }

    fn apply_status(&mut self, status: IcecastStatus) {
        let sources = &status.icestats.source;

        if !self.state.channels_listed {
            let channels = self.naming.channel_list(sources);
            if !channels.is_empty() {
                let selected = channels.iter().find(|c| **c == self.state.channel).cloned();
                info!("dashboard: {} channels available", channels.len());
                self.state.channels_listed = true;
                self.emit(DashboardEvent::ChannelsListed { channels, selected });
            }
        }

        self.state.status_has_channel = self.naming.has_channel(sources, &self.state.channel);
        let update = if self.state.status_has_channel {
            Some(self.naming.channel_status(sources, &self.state.channel))
        } else {
            debug!("dashboard: no mount for {} in status", self.state.channel);
            self.fallback_status()
        };
        if let Some(update) = update {
            self.emit(DashboardEvent::StatusUpdated(update));
        }
    }

    /// Listener counts from the playlist snapshot, for channels the status
    /// document does not list.
    fn fallback_status(&self) -> Option<ChannelStatus> {
        let listeners = self.state.snapshot_listeners.as_ref()?;
        Some(ChannelStatus {
            channel: self.state.channel.clone(),
            listeners: listeners.current,
            listener_peak: listeners.peak.unwrap_or(listeners.current),
            ..ChannelStatus::default()
        })
    }

    // ── Progress ──────────────────────────────────────────────────────────────

    fn tick_progress(&mut self) {
        if !self.state.has_snapshot {
            return;
        }
        let view = self.progress.tick();
        self.emit(DashboardEvent::Progress(view));
        self.maybe_refetch();
    }

    fn maybe_refetch(&mut self) {
        if !self.progress.take_refetch() {
            return;
        }
        let now = Instant::now();
        if let Some(last) = self.last_early_refetch {
            if now.duration_since(last) < EARLY_REFETCH_GAP {
                debug!("dashboard: track overrun again, waiting for the next poll");
                return;
            }
        }
        debug!("dashboard: track ended, refetching playlist");
        self.last_early_refetch = Some(now);
        self.spawn_fetch(FetchKind::Playlist);
    }

    // ── Output ────────────────────────────────────────────────────────────────

    fn emit_links(&self) {
        let channel = self.state.channel.clone();
        let links = self.client.stream_links(&channel);
        self.emit(DashboardEvent::Links { channel, links });
    }

    fn emit(&self, event: DashboardEvent) {
        // No receivers is fine: the front end may not have subscribed yet.
        let _ = self.events_tx.send(event);
    }
}
