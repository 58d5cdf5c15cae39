//! socialgraph-feed: client for the external social-network API.
//!
//! One [`TwitterClient`] owns one pooled HTTP client for its whole lifetime;
//! build it once per process and share it across calls.

pub mod client;
pub mod error;
pub mod source;

pub use client::TwitterClient;
pub use error::{FeedError, Result};
pub use source::ProfileSource;
