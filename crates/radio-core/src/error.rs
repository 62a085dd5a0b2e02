//! Error types for the station client and player.

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport failure or non-success HTTP status.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with something that is not the expected JSON.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    /// The audio output rejected a command (player not running, IPC error,
    /// autoplay refusal).
    #[error("audio output: {0}")]
    Audio(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn audio(msg: impl Into<String>) -> Self {
        Self::Audio(msg.into())
    }
}
