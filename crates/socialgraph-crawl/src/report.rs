//! Summary of a finished crawl.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use socialgraph_core::{Person, RemoteProfile};

/// Everything a successful crawl produced.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub crawl_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    /// The seed as stored, with its store identity.
    pub seed: Person,
    /// Friend ids in source API order.
    pub friend_ids: Vec<u64>,
    /// Friend profiles in the same order as `friend_ids`.
    pub friends: Vec<RemoteProfile>,
    /// Friend nodes as stored; empty when friend persistence is off.
    pub persisted_friends: Vec<Person>,
}
