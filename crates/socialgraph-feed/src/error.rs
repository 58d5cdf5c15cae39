//! Error types for the socialgraph-feed crate.

use socialgraph_core::Interrupted;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FeedError>;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Source API error (status {status}): {body}")]
    Transport { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Profile not found: {lookup}")]
    NotFound { lookup: String },

    #[error("Failed to decode {what}: {reason}")]
    Decode { what: String, reason: String },

    #[error("Source API call interrupted: {0}")]
    Interrupted(#[from] Interrupted),

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

impl FeedError {
    /// Non-2xx replies and connection-level failures alike.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Network(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Interrupted(Interrupted::Cancelled))
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FeedError::Network(format!("request timed out: {err}"))
        } else {
            FeedError::Network(err.to_string())
        }
    }
}
