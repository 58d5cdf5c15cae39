use thiserror::Error;

/// Why an operation stopped before completing.
///
/// Produced by [`crate::Context`] whenever the caller cancels or the deadline
/// carried by the context elapses while an operation is in flight.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupted {
    #[error("operation cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,
}

/// Configuration loading and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Unknown source tag: {0}")]
    UnknownSource(String),

    #[error("Invalid configuration value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

/// Longest slice of a response body kept on an error.
pub const BODY_EXCERPT_LEN: usize = 256;

/// Trim a response body down to something fit for an error message.
pub fn excerpt(body: &str) -> String {
    match body.char_indices().nth(BODY_EXCERPT_LEN) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
