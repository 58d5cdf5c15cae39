//! Error types for the socialgraph-crawl crate.

use socialgraph_core::Interrupted;
use socialgraph_feed::FeedError;
use socialgraph_store::{GraphError, ReadyError};
use thiserror::Error;

use crate::pipeline::CrawlStage;

#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("Graph store not ready: {0}")]
    NotReady(#[source] ReadyError),

    #[error("Failed to fetch seed profile {screen_name}: {source}")]
    SeedFetch {
        screen_name: String,
        #[source]
        source: FeedError,
    },

    #[error("Failed to persist seed {screen_name}: {source}")]
    SeedPersist {
        screen_name: String,
        #[source]
        source: GraphError,
    },

    #[error("Failed to list friends of {id}: {source}")]
    FriendIds {
        id: u64,
        #[source]
        source: FeedError,
    },

    #[error("Failed to fetch friend at position {position} (id {id}): {source}")]
    Friend {
        position: usize,
        id: u64,
        #[source]
        source: FeedError,
    },

    #[error("Failed to persist friend at position {position} ({screen_name}): {source}")]
    FriendPersist {
        position: usize,
        screen_name: String,
        #[source]
        source: GraphError,
    },

    #[error("Crawl interrupted: {0}")]
    Interrupted(#[from] Interrupted),
}

impl CrawlError {
    /// True when the caller aborted, at whatever stage it happened.
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::NotReady(e) => e.is_cancelled(),
            Self::SeedFetch { source, .. }
            | Self::FriendIds { source, .. }
            | Self::Friend { source, .. } => source.is_cancelled(),
            Self::SeedPersist { source, .. } | Self::FriendPersist { source, .. } => {
                source.is_cancelled()
            }
            Self::Interrupted(i) => *i == Interrupted::Cancelled,
        }
    }

    /// Where the crawl stopped: the probe-failed terminal state, or the
    /// last stage completed before the failure.
    pub fn stage(&self) -> CrawlStage {
        match self {
            Self::Interrupted(_) => CrawlStage::Start,
            Self::NotReady(_) => CrawlStage::ProbeFailed,
            Self::SeedFetch { .. } => CrawlStage::Ready,
            Self::SeedPersist { .. } => CrawlStage::SeedFetched,
            Self::FriendIds { .. } => CrawlStage::SeedPersisted,
            Self::Friend { .. } => CrawlStage::FriendsListed,
            Self::FriendPersist { .. } => CrawlStage::FriendsResolved,
        }
    }
}

pub type Result<T> = std::result::Result<T, CrawlError>;
