//! The seam the crawl pipeline fetches profiles through.

use async_trait::async_trait;
use socialgraph_core::{Context, RemoteProfile};

use crate::error::Result;

/// Read access to the source social-network API.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn fetch_profile_by_screen_name(
        &self,
        ctx: &Context,
        screen_name: &str,
    ) -> Result<RemoteProfile>;

    async fn fetch_profile_by_id(&self, ctx: &Context, id: u64) -> Result<RemoteProfile>;

    /// Identifiers of the accounts `id` follows, in API order.
    async fn fetch_friend_ids(&self, ctx: &Context, id: u64) -> Result<Vec<u64>>;
}
