//! Player — transport controls around a single streaming audio output.
//!
//! The output is the only source of truth for whether audio is playing: every
//! operation reads the paused state back from the output after acting on it
//! rather than assuming the command worked.

use std::future::Future;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::model::Codec;

/// Volume above which the "high" icon is shown.  Exactly 0.51 (the default
/// volume) is still "low".
pub const VOLUME_HIGH_THRESHOLD: f32 = 0.51;
pub const DEFAULT_VOLUME: f32 = 0.51;

/// A single audio sink that plays one stream URL at a time.
///
/// `load` replaces the source and leaves the output paused; callers resume
/// explicitly.
pub trait AudioOutput: Send {
    fn load(&mut self, url: &str) -> impl Future<Output = Result<()>> + Send;
    fn play(&mut self) -> impl Future<Output = Result<()>> + Send;
    fn pause(&mut self) -> impl Future<Output = Result<()>> + Send;
    /// Pause and drop buffered audio.  The source URL is kept.
    fn stop(&mut self) -> impl Future<Output = Result<()>> + Send;
    /// `volume` is 0.0..=1.0.
    fn set_volume(&mut self, volume: f32) -> impl Future<Output = Result<()>> + Send;
    fn is_paused(&mut self) -> impl Future<Output = bool> + Send;
    fn current_source(&self) -> Option<&str>;
}

/// Output used when no audio backend is available.  Tracks the source and
/// volume so the dashboard keeps working, but refuses to play.
#[derive(Debug, Default)]
pub struct NullOutput {
    source: Option<String>,
    volume: f32,
}

impl NullOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }
}

impl AudioOutput for NullOutput {
    async fn load(&mut self, url: &str) -> Result<()> {
        self.source = Some(url.to_string());
        Ok(())
    }

    async fn play(&mut self) -> Result<()> {
        Err(Error::audio("no audio output available"))
    }

    async fn pause(&mut self) -> Result<()> {
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        Ok(())
    }

    async fn set_volume(&mut self, volume: f32) -> Result<()> {
        self.volume = volume;
        Ok(())
    }

    async fn is_paused(&mut self) -> bool {
        true
    }

    fn current_source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub enum PlayIndicator {
    /// Output is paused; pressing the button plays.
    #[default]
    Play,
    /// Output is playing; pressing the button pauses.
    Pause,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub enum VolumeIcon {
    Off,
    #[default]
    Low,
    High,
}

impl VolumeIcon {
    pub fn for_volume(volume: f32) -> Self {
        if volume <= 0.0 {
            Self::Off
        } else if volume > VOLUME_HIGH_THRESHOLD {
            Self::High
        } else {
            Self::Low
        }
    }
}

/// In-memory player state.  Reset on every start.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerState {
    pub channel: String,
    pub playing: bool,
    /// Slider volume; kept while muted so unmute can restore it.
    pub volume: f32,
    pub muted: bool,
}

/// What the UI shows for the transport controls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub channel: String,
    pub codec: Codec,
    pub indicator: PlayIndicator,
    pub volume: f32,
    pub muted: bool,
    pub volume_icon: VolumeIcon,
}

pub fn stream_url(base: &str, channel: &str, codec: Codec) -> String {
    format!("{}/{}.{}", base.trim_end_matches('/'), channel, codec.extension())
}

pub struct Player<O> {
    output: O,
    stream_base: String,
    default_codec: Codec,
    state: PlayerState,
}

impl<O: AudioOutput> Player<O> {
    pub fn new(output: O, stream_base: impl Into<String>, channel: &str, codec: Codec) -> Self {
        Self {
            output,
            stream_base: stream_base.into(),
            default_codec: codec,
            state: PlayerState {
                channel: channel.to_string(),
                playing: false,
                volume: DEFAULT_VOLUME,
                muted: false,
            },
        }
    }

    /// Load the initial channel paused and apply the starting volume.
    pub async fn init(&mut self, volume: f32) -> Result<PlayerView> {
        let volume = volume.clamp(0.0, 1.0);
        self.output.set_volume(volume).await?;
        self.state.volume = volume;
        self.state.muted = volume <= 0.0;
        let url = stream_url(&self.stream_base, &self.state.channel, self.default_codec);
        self.output.load(&url).await?;
        info!("player: ready on {}", url);
        Ok(self.view().await)
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    /// Codec of the source currently loaded (or the configured default).
    pub fn codec(&self) -> Codec {
        self.output
            .current_source()
            .map(Codec::from_url)
            .unwrap_or(self.default_codec)
    }

    /// Switch to `channel` keeping the current codec.  Playback resumes only
    /// if the output was playing before the switch.
    pub async fn change_channel(&mut self, channel: &str) -> Result<PlayerView> {
        let was_paused = self.output.is_paused().await;
        let url = stream_url(&self.stream_base, channel, self.codec());
        debug!("player: switching to {} (was_paused={})", url, was_paused);

        self.output.load(&url).await?;
        self.state.channel = channel.to_string();
        if !was_paused {
            self.start_playback().await;
        }
        Ok(self.view().await)
    }

    pub async fn play(&mut self) -> PlayerView {
        self.start_playback().await;
        self.view().await
    }

    pub async fn pause(&mut self) -> Result<PlayerView> {
        self.output.pause().await?;
        Ok(self.view().await)
    }

    pub async fn toggle_play(&mut self) -> Result<PlayerView> {
        if self.output.is_paused().await {
            Ok(self.play().await)
        } else {
            self.pause().await
        }
    }

    pub async fn stop(&mut self) -> Result<PlayerView> {
        self.output.stop().await?;
        Ok(self.view().await)
    }

    /// Set the slider volume.  Any value above zero unmutes; zero mutes.
    pub async fn change_volume(&mut self, value: f32) -> Result<PlayerView> {
        let value = value.clamp(0.0, 1.0);
        self.output.set_volume(value).await?;
        self.state.volume = value;
        self.state.muted = value <= 0.0;
        Ok(self.view().await)
    }

    pub async fn step_volume(&mut self, delta: f32) -> Result<PlayerView> {
        let base = self.effective_volume();
        self.change_volume(base + delta).await
    }

    /// Mute keeps the slider volume and restores it on unmute.  A slider
    /// already at zero restores to the default volume.
    pub async fn toggle_mute(&mut self) -> Result<PlayerView> {
        if self.state.muted {
            if self.state.volume <= 0.0 {
                self.state.volume = DEFAULT_VOLUME;
            }
            self.output.set_volume(self.state.volume).await?;
            self.state.muted = false;
        } else {
            self.output.set_volume(0.0).await?;
            self.state.muted = true;
        }
        Ok(self.view().await)
    }

    /// Step through low → high → off.
    pub async fn cycle_volume(&mut self) -> Result<PlayerView> {
        let current = self.effective_volume();
        let next = if current < VOLUME_HIGH_THRESHOLD {
            VOLUME_HIGH_THRESHOLD
        } else if current < 1.0 {
            1.0
        } else {
            0.0
        };
        self.change_volume(next).await
    }

    pub fn effective_volume(&self) -> f32 {
        if self.state.muted {
            0.0
        } else {
            self.state.volume
        }
    }

    pub async fn view(&mut self) -> PlayerView {
        let paused = self.output.is_paused().await;
        self.state.playing = !paused;
        PlayerView {
            channel: self.state.channel.clone(),
            codec: self.codec(),
            indicator: if paused {
                PlayIndicator::Play
            } else {
                PlayIndicator::Pause
            },
            volume: self.state.volume,
            muted: self.state.muted,
            volume_icon: VolumeIcon::for_volume(self.effective_volume()),
        }
    }

    /// A rejected play leaves the output paused; the indicator reflects that.
    async fn start_playback(&mut self) {
        if let Err(e) = self.output.play().await {
            warn!("player: play rejected: {}", e);
        }
    }
}
