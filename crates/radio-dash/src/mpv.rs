//! Audio output backed by an mpv child process over its JSON IPC socket.
//!
//! ```text
//!   MpvOutput ── MpvDriver::spawn()
//!                    │
//!                    ├── writer_task  ← IpcRequest via mpsc → socket
//!                    └── reader_task  ← JSON lines from socket
//!                                        ├── reply (request_id) → oneshot
//!                                        └── event              → event_task
//! ```
//!
//! mpv is started lazily on the first `load` (the dashboard loads the default
//! channel paused at startup) and respawned on the next command if it died.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail};
use radio_core::player::AudioOutput;
use radio_core::{platform, Error, Result};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{debug, info, warn};

#[cfg(unix)]
use tokio::net::UnixStream;

#[cfg(windows)]
use tokio::net::windows::named_pipe::ClientOptions;

const REPLY_TIMEOUT: Duration = Duration::from_secs(5);

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<anyhow::Result<Value>>>>>;

struct IpcRequest {
    id: u64,
    line: String,
    reply: oneshot::Sender<anyhow::Result<Value>>,
}

// ── handle ───────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MpvHandle {
    tx: mpsc::Sender<IpcRequest>,
}

impl MpvHandle {
    pub async fn command(&self, command: Value) -> anyhow::Result<Value> {
        let id = NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed);
        let mut line = serde_json::to_string(&json!({ "command": command, "request_id": id }))?;
        line.push('\n');

        let (reply, reply_rx) = oneshot::channel();
        self.tx
            .send(IpcRequest { id, line, reply })
            .await
            .map_err(|_| anyhow!("mpv writer task gone"))?;

        tokio::time::timeout(REPLY_TIMEOUT, reply_rx)
            .await
            .map_err(|_| anyhow!("mpv IPC timeout for request {}", id))?
            .map_err(|_| anyhow!("mpv reply dropped for request {}", id))?
    }

    pub async fn set_property(&self, name: &str, value: Value) -> anyhow::Result<()> {
        self.command(json!(["set_property", name, value])).await?;
        Ok(())
    }

    pub async fn get_pause(&self) -> anyhow::Result<bool> {
        let resp = self.command(json!(["get_property", "pause"])).await?;
        Ok(resp["data"].as_bool().unwrap_or(true))
    }
}

// ── driver ───────────────────────────────────────────────────────────────────

/// Owns the mpv child process.  The process is killed when the driver drops.
pub struct MpvDriver {
    binary: PathBuf,
    socket_name: String,
    process: Option<tokio::process::Child>,
}

impl MpvDriver {
    pub fn new(binary: PathBuf) -> Self {
        Self {
            binary,
            socket_name: platform::mpv_socket_name(),
            process: None,
        }
    }

    pub fn alive(&mut self) -> bool {
        match self.process.as_mut().map(|child| child.try_wait()) {
            Some(Ok(None)) => true,
            Some(Ok(Some(status))) => {
                warn!("mpv: process exited ({})", status);
                false
            }
            Some(Err(e)) => {
                warn!("mpv: liveness check failed: {}", e);
                false
            }
            None => false,
        }
    }

    fn command(&self, volume: f32) -> anyhow::Result<tokio::process::Command> {
        let stderr_path = platform::data_dir().join("mpv-stderr.log");
        if let Some(parent) = stderr_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let stderr = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&stderr_path)?;

        let mut cmd = tokio::process::Command::new(&self.binary);
        cmd.arg("--no-video")
            .arg("--idle=yes")
            .arg("--quiet")
            .arg(platform::mpv_socket_arg(&self.socket_name))
            .arg(format!("--volume={}", volume_percent(volume)))
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(stderr)
            .kill_on_drop(true);
        Ok(cmd)
    }

    #[cfg(unix)]
    pub async fn spawn(&mut self, volume: f32) -> anyhow::Result<MpvHandle> {
        if let Some(mut old) = self.process.take() {
            let _ = old.kill().await;
        }
        let socket_path = PathBuf::from(&self.socket_name);
        let _ = tokio::fs::remove_file(&socket_path).await;

        let child = self.command(volume)?.spawn()?;
        info!("mpv: spawned {:?} pid={:?}", self.binary, child.id());
        self.process = Some(child);

        for _ in 0..50 {
            if socket_path.exists() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        if !socket_path.exists() {
            bail!("mpv IPC socket did not appear at {}", socket_path.display());
        }

        let stream = UnixStream::connect(&socket_path).await?;
        let (read_half, write_half) = stream.into_split();
        debug!("mpv: connected to {}", socket_path.display());
        Ok(start_io_tasks(read_half, write_half))
    }

    #[cfg(windows)]
    pub async fn spawn(&mut self, volume: f32) -> anyhow::Result<MpvHandle> {
        if let Some(mut old) = self.process.take() {
            let _ = old.kill().await;
        }

        let child = self.command(volume)?.spawn()?;
        info!("mpv: spawned {:?} pid={:?}", self.binary, child.id());
        self.process = Some(child);

        let pipe_path = format!(r"\\.\pipe\{}", self.socket_name);
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            if let Ok(pipe) = ClientOptions::new().open(&pipe_path) {
                debug!("mpv: connected to {}", pipe_path);
                let (read_half, write_half) = tokio::io::split(pipe);
                return Ok(start_io_tasks(read_half, write_half));
            }
        }
        bail!("mpv named pipe did not appear at {}", pipe_path)
    }
}

impl Drop for MpvDriver {
    fn drop(&mut self) {
        #[cfg(unix)]
        let _ = std::fs::remove_file(&self.socket_name);
    }
}

fn start_io_tasks<R, W>(read_half: R, write_half: W) -> MpvHandle
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
    W: tokio::io::AsyncWrite + Unpin + Send + 'static,
{
    let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
    let (tx, rx) = mpsc::channel(32);
    let (event_tx, event_rx) = mpsc::channel(64);

    tokio::spawn(writer_task(write_half, rx, pending.clone()));
    tokio::spawn(reader_task(BufReader::new(read_half), pending, event_tx));
    tokio::spawn(event_task(event_rx));

    MpvHandle { tx }
}

// ── io tasks ─────────────────────────────────────────────────────────────────

async fn reader_task<R>(
    mut reader: BufReader<R>,
    pending: PendingMap,
    event_tx: mpsc::Sender<Value>,
) where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut line = String::new();
    let reason = loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => break "connection closed".to_string(),
            Ok(_) => {}
            Err(e) => break format!("read error: {}", e),
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let val: Value = match serde_json::from_str(trimmed) {
            Ok(v) => v,
            Err(e) => {
                debug!("mpv reader: bad json {:?}: {}", trimmed, e);
                continue;
            }
        };

        match val.get("request_id").and_then(Value::as_u64) {
            Some(id) => {
                let Some(reply) = pending.lock().await.remove(&id) else {
                    debug!("mpv reader: reply for unknown request {}", id);
                    continue;
                };
                let status = val["error"].as_str().unwrap_or("unknown").to_string();
                let result = if status == "success" {
                    Ok(val)
                } else {
                    Err(anyhow!("mpv error: {}", status))
                };
                let _ = reply.send(result);
            }
            None => {
                let _ = event_tx.send(val).await;
            }
        }
    };

    debug!("mpv reader: {}", reason);
    for (_, reply) in pending.lock().await.drain() {
        let _ = reply.send(Err(anyhow!("mpv IPC {}", reason)));
    }
}

async fn writer_task<W>(mut writer: W, mut rx: mpsc::Receiver<IpcRequest>, pending: PendingMap)
where
    W: tokio::io::AsyncWrite + Unpin,
{
    while let Some(req) = rx.recv().await {
        pending.lock().await.insert(req.id, req.reply);
        debug!("mpv writer: {}", req.line.trim());
        if let Err(e) = writer.write_all(req.line.as_bytes()).await {
            warn!("mpv writer: {}", e);
            if let Some(reply) = pending.lock().await.remove(&req.id) {
                let _ = reply.send(Err(anyhow!("mpv write error: {}", e)));
            }
            break;
        }
    }
    debug!("mpv writer: exiting");
}

/// Stream failures surface as `end-file` with reason `error`.
async fn event_task(mut rx: mpsc::Receiver<Value>) {
    while let Some(event) = rx.recv().await {
        match event.get("event").and_then(Value::as_str) {
            Some("end-file") if event["reason"].as_str() == Some("error") => {
                warn!(
                    "mpv: stream ended with error: {}",
                    event["file_error"].as_str().unwrap_or("unknown")
                );
            }
            Some(name) => debug!("mpv event: {}", name),
            None => {}
        }
    }
}

fn volume_percent(volume: f32) -> i64 {
    (volume * 100.0).clamp(0.0, 100.0).round() as i64
}

// ── AudioOutput ──────────────────────────────────────────────────────────────

pub struct MpvOutput {
    driver: MpvDriver,
    handle: Option<MpvHandle>,
    source: Option<String>,
    volume: f32,
    /// `stop` unloads the file in mpv; the next play reloads `source`.
    stopped: bool,
}

impl MpvOutput {
    pub fn new(binary: PathBuf) -> Self {
        Self {
            driver: MpvDriver::new(binary),
            handle: None,
            source: None,
            volume: 1.0,
            stopped: false,
        }
    }

    async fn connected(&mut self) -> Result<MpvHandle> {
        if let Some(handle) = &self.handle {
            if self.driver.alive() {
                return Ok(handle.clone());
            }
            self.handle = None;
        }
        let handle = self.driver.spawn(self.volume).await.map_err(audio_error)?;
        self.handle = Some(handle.clone());
        Ok(handle)
    }

    async fn load_source(&mut self, handle: &MpvHandle, url: &str) -> anyhow::Result<()> {
        handle.set_property("pause", json!(true)).await?;
        handle.command(json!(["loadfile", url, "replace"])).await?;
        self.stopped = false;
        Ok(())
    }
}

fn audio_error(e: anyhow::Error) -> Error {
    Error::audio(e.to_string())
}

impl AudioOutput for MpvOutput {
    async fn load(&mut self, url: &str) -> Result<()> {
        let handle = self.connected().await?;
        self.load_source(&handle, url).await.map_err(audio_error)?;
        self.source = Some(url.to_string());
        info!("mpv: loaded {}", url);
        Ok(())
    }

    async fn play(&mut self) -> Result<()> {
        let Some(url) = self.source.clone() else {
            return Err(Error::audio("nothing loaded"));
        };
        let handle = self.connected().await?;
        if self.stopped {
            self.load_source(&handle, &url).await.map_err(audio_error)?;
        }
        handle
            .set_property("pause", json!(false))
            .await
            .map_err(audio_error)
    }

    async fn pause(&mut self) -> Result<()> {
        match &self.handle {
            Some(handle) => handle
                .set_property("pause", json!(true))
                .await
                .map_err(audio_error),
            None => Ok(()),
        }
    }

    async fn stop(&mut self) -> Result<()> {
        if let Some(handle) = &self.handle {
            handle.command(json!(["stop"])).await.map_err(audio_error)?;
        }
        self.stopped = true;
        Ok(())
    }

    async fn set_volume(&mut self, volume: f32) -> Result<()> {
        self.volume = volume.clamp(0.0, 1.0);
        match &self.handle {
            Some(handle) => handle
                .set_property("volume", json!(volume_percent(self.volume)))
                .await
                .map_err(audio_error),
            None => Ok(()),
        }
    }

    async fn is_paused(&mut self) -> bool {
        if self.stopped {
            return true;
        }
        match &self.handle {
            Some(handle) => handle.get_pause().await.unwrap_or(true),
            None => true,
        }
    }

    fn current_source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

/// Either mpv or a silent stand-in when no mpv binary is installed.
pub enum Output {
    Mpv(MpvOutput),
    Null(radio_core::player::NullOutput),
}

impl Output {
    pub fn detect(explicit: Option<&std::path::Path>) -> Self {
        match platform::find_mpv_binary(explicit) {
            Some(binary) => {
                info!("audio: using mpv at {}", binary.display());
                Self::Mpv(MpvOutput::new(binary))
            }
            None => {
                warn!("audio: mpv not found, playback disabled");
                Self::Null(radio_core::player::NullOutput::new())
            }
        }
    }
}

impl AudioOutput for Output {
    async fn load(&mut self, url: &str) -> Result<()> {
        match self {
            Self::Mpv(o) => o.load(url).await,
            Self::Null(o) => o.load(url).await,
        }
    }

    async fn play(&mut self) -> Result<()> {
        match self {
            Self::Mpv(o) => o.play().await,
            Self::Null(o) => o.play().await,
        }
    }

    async fn pause(&mut self) -> Result<()> {
        match self {
            Self::Mpv(o) => o.pause().await,
            Self::Null(o) => o.pause().await,
        }
    }

    async fn stop(&mut self) -> Result<()> {
        match self {
            Self::Mpv(o) => o.stop().await,
            Self::Null(o) => o.stop().await,
        }
    }

    async fn set_volume(&mut self, volume: f32) -> Result<()> {
        match self {
            Self::Mpv(o) => o.set_volume(volume).await,
            Self::Null(o) => o.set_volume(volume).await,
        }
    }

    async fn is_paused(&mut self) -> bool {
        match self {
            Self::Mpv(o) => o.is_paused().await,
            Self::Null(o) => o.is_paused().await,
        }
    }

    fn current_source(&self) -> Option<&str> {
        match self {
            Self::Mpv(o) => o.current_source(),
            Self::Null(o) => o.current_source(),
        }
    }
}
