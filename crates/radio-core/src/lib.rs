pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod format;
pub mod model;
pub mod naming;
pub mod platform;
pub mod player;
pub mod playlist;
pub mod progress;

pub use error::{Error, Result};
