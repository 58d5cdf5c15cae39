//! The crawl pipeline.
//!
//! Linear, fail-fast: wait for the store → fetch seed → persist seed →
//! list friend ids → fetch every friend → (optionally) persist friends.
//! The first error ends the run; work already persisted stays in the store.

use std::fmt;
use std::time::Instant;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use uuid::Uuid;

use socialgraph_core::config::CrawlConfig;
use socialgraph_core::{Context, Person, RemoteProfile, Source};
use socialgraph_feed::ProfileSource;
use socialgraph_store::{wait_ready, PersonStore, Probe};

use crate::error::{CrawlError, Result};
use crate::report::CrawlReport;

/// Progress markers for a single crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlStage {
    Start,
    /// Terminal: the store never became ready.
    ProbeFailed,
    Ready,
    SeedFetched,
    SeedPersisted,
    FriendsListed,
    FriendsResolved,
    /// Terminal: every stage succeeded.
    Done,
}

impl fmt::Display for CrawlStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::ProbeFailed => "probe_failed",
            Self::Ready => "ready",
            Self::SeedFetched => "seed_fetched",
            Self::SeedPersisted => "seed_persisted",
            Self::FriendsListed => "friends_listed",
            Self::FriendsResolved => "friends_resolved",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Crawls one seed user at a time through a source API into a person store.
pub struct CrawlPipeline<S, G, P> {
    source: S,
    store: G,
    probe: P,
    config: CrawlConfig,
    origin: Source,
}

impl<S, G, P> CrawlPipeline<S, G, P>
where
    S: ProfileSource,
    G: PersonStore,
    P: Probe,
{
    pub fn new(source: S, store: G, probe: P, config: CrawlConfig, origin: Source) -> Self {
        Self {
            source,
            store,
            probe,
            config,
            origin,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn store(&self) -> &G {
        &self.store
    }

    /// Run one crawl for `screen_name`.
    ///
    /// The readiness wait is bounded by `ready_timeout` and by the deadline
    /// on `ctx`; every later call runs under `ctx` directly.
    pub async fn run(&self, ctx: &Context, screen_name: &str) -> Result<CrawlReport> {
        ctx.check()?;
        let crawl_id = Uuid::new_v4();
        let started_at = Utc::now();
        let start = Instant::now();
        let stage = |stage: CrawlStage| {
            tracing::info!(crawl_id = %crawl_id, stage = %stage, "Crawl stage reached");
        };
        stage(CrawlStage::Start);

        let ready_ctx = ctx.child_with_timeout(self.config.ready_timeout());
        if let Err(e) = wait_ready(&self.probe, self.config.retry_interval(), &ready_ctx).await {
            stage(CrawlStage::ProbeFailed);
            return Err(CrawlError::NotReady(e));
        }
        stage(CrawlStage::Ready);

        let seed_profile = self
            .source
            .fetch_profile_by_screen_name(ctx, screen_name)
            .await
            .map_err(|source| CrawlError::SeedFetch {
                screen_name: screen_name.to_string(),
                source,
            })?;
        stage(CrawlStage::SeedFetched);

        let seed = self
            .store
            .upsert(ctx, seed_profile.to_new_person(self.origin))
            .await
            .map_err(|source| CrawlError::SeedPersist {
                screen_name: screen_name.to_string(),
                source,
            })?;
        tracing::info!(crawl_id = %crawl_id, id = %seed.id, screen_name = %seed.screen_name, "Seed persisted");
        stage(CrawlStage::SeedPersisted);

        let friend_ids = self
            .source
            .fetch_friend_ids(ctx, seed_profile.id)
            .await
            .map_err(|source| CrawlError::FriendIds {
                id: seed_profile.id,
                source,
            })?;
        tracing::info!(crawl_id = %crawl_id, count = friend_ids.len(), "Friend ids listed");
        stage(CrawlStage::FriendsListed);

        let friends = self.resolve_friends(ctx, &friend_ids).await?;
        stage(CrawlStage::FriendsResolved);

        let persisted_friends = if self.config.persist_friends {
            self.persist_friends(ctx, &friends).await?
        } else {
            Vec::new()
        };
        stage(CrawlStage::Done);

        let duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            crawl_id = %crawl_id,
            screen_name = %screen_name,
            friends = friends.len(),
            persisted = persisted_friends.len(),
            duration_ms,
            "Crawl complete"
        );

        Ok(CrawlReport {
            crawl_id,
            started_at,
            duration_ms,
            seed,
            friend_ids,
            friends,
            persisted_friends,
        })
    }

    /// Fetch every friend profile, at most `friend_concurrency` at once.
    ///
    /// Results are consumed in list order and the first failure in that
    /// order aborts the rest. With a limit of one, a friend is not requested
    /// until the previous one has arrived.
    async fn resolve_friends(&self, ctx: &Context, ids: &[u64]) -> Result<Vec<RemoteProfile>> {
        let limit = self.config.friend_concurrency.max(1);
        let mut pending = stream::iter(ids.iter().copied().enumerate())
            .map(|(position, id)| async move {
                tracing::debug!(position, id, "Fetching friend profile");
                self.source
                    .fetch_profile_by_id(ctx, id)
                    .await
                    .map_err(|source| CrawlError::Friend {
                        position,
                        id,
                        source,
                    })
            })
            .buffered(limit);

        let mut friends = Vec::with_capacity(ids.len());
        while let Some(result) = pending.next().await {
            friends.push(result?);
        }
        Ok(friends)
    }

    /// Store resolved friends one by one, in list order. Nodes only: no
    /// friend edges are written.
    async fn persist_friends(
        &self,
        ctx: &Context,
        friends: &[RemoteProfile],
    ) -> Result<Vec<Person>> {
        let mut stored = Vec::with_capacity(friends.len());
        for (position, friend) in friends.iter().enumerate() {
            let person = self
                .store
                .upsert(ctx, friend.to_new_person(self.origin))
                .await
                .map_err(|source| CrawlError::FriendPersist {
                    position,
                    screen_name: friend.screen_name.clone(),
                    source,
                })?;
            stored.push(person);
        }
        Ok(stored)
    }
}
