//! Crawl pipeline tests with in-memory source, store, and probe doubles.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use socialgraph_core::config::CrawlConfig;
use socialgraph_core::{Context, Interrupted, NewPerson, Person, PersonId, RemoteProfile, Source};
use socialgraph_crawl::{CrawlError, CrawlPipeline, CrawlStage};
use socialgraph_feed::{FeedError, ProfileSource};
use socialgraph_store::{GraphError, PersonStore, Probe, ReadyError};

const SEED_ID: u64 = 123456;

// ── Doubles ──────────────────────────────────────────────────────

#[derive(Default)]
struct FakeSource {
    profiles: HashMap<u64, RemoteProfile>,
    friends: Vec<u64>,
    failing: HashSet<u64>,
    /// Ids whose fetch never completes on its own.
    stalled: HashSet<u64>,
    fetched: Mutex<Vec<u64>>,
}

impl FakeSource {
    fn with_friends(friends: &[u64]) -> Self {
        let mut profiles = HashMap::new();
        profiles.insert(SEED_ID, profile(SEED_ID, "goinggodotnet"));
        for &id in friends {
            profiles.insert(id, profile(id, &format!("friend{id}")));
        }
        Self {
            profiles,
            friends: friends.to_vec(),
            ..Default::default()
        }
    }

    fn fetched(&self) -> Vec<u64> {
        self.fetched.lock().unwrap().clone()
    }
}

fn profile(id: u64, screen_name: &str) -> RemoteProfile {
    RemoteProfile {
        id,
        screen_name: screen_name.to_string(),
        name: format!("Name of {screen_name}"),
        location: "Miami".to_string(),
        friends_count: 200,
    }
}

#[async_trait]
impl ProfileSource for FakeSource {
    async fn fetch_profile_by_screen_name(
        &self,
        _ctx: &Context,
        screen_name: &str,
    ) -> Result<RemoteProfile, FeedError> {
        self.profiles
            .values()
            .find(|p| p.screen_name == screen_name)
            .cloned()
            .ok_or_else(|| FeedError::NotFound {
                lookup: format!("screen_name={screen_name}"),
            })
    }

    async fn fetch_profile_by_id(&self, ctx: &Context, id: u64) -> Result<RemoteProfile, FeedError> {
        self.fetched.lock().unwrap().push(id);
        if self.stalled.contains(&id) {
            ctx.run(std::future::pending::<()>()).await?;
        }
        if self.failing.contains(&id) {
            return Err(FeedError::Transport {
                status: 503,
                body: "over capacity".to_string(),
            });
        }
        self.profiles
            .get(&id)
            .cloned()
            .ok_or_else(|| FeedError::NotFound {
                lookup: format!("user_id={id}"),
            })
    }

    async fn fetch_friend_ids(&self, _ctx: &Context, id: u64) -> Result<Vec<u64>, FeedError> {
        assert_eq!(id, SEED_ID);
        Ok(self.friends.clone())
    }
}

#[derive(Default)]
struct MemoryStore {
    people: Mutex<Vec<Person>>,
    next_id: AtomicUsize,
}

impl MemoryStore {
    fn len(&self) -> usize {
        self.people.lock().unwrap().len()
    }
}

#[async_trait]
impl PersonStore for MemoryStore {
    async fn add(&self, _ctx: &Context, person: NewPerson) -> Result<Person, GraphError> {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let stored = Person::from_new(PersonId(format!("0x{n:x}")), person);
        self.people.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn get_by_id(&self, _ctx: &Context, id: &PersonId) -> Result<Person, GraphError> {
        self.people
            .lock()
            .unwrap()
            .iter()
            .find(|p| &p.id == id)
            .cloned()
            .ok_or_else(|| GraphError::NotFound {
                entity: "Person".to_string(),
                key: format!("id={id}"),
            })
    }

    async fn get_by_screen_name(
        &self,
        _ctx: &Context,
        screen_name: &str,
    ) -> Result<Person, GraphError> {
        let people = self.people.lock().unwrap();
        let matches: Vec<&Person> = people
            .iter()
            .filter(|p| p.screen_name == screen_name)
            .collect();
        match matches.as_slice() {
            [] => Err(GraphError::NotFound {
                entity: "Person".to_string(),
                key: format!("screen_name={screen_name}"),
            }),
            [one] => Ok((*one).clone()),
            many => Err(GraphError::Ambiguous {
                entity: "Person".to_string(),
                key: format!("screen_name={screen_name}"),
                count: many.len(),
            }),
        }
    }
}

struct Up;

#[async_trait]
impl Probe for Up {
    fn target(&self) -> &str {
        "up"
    }

    async fn probe(&self) -> Result<(), String> {
        Ok(())
    }
}

struct Down;

#[async_trait]
impl Probe for Down {
    fn target(&self) -> &str {
        "down"
    }

    async fn probe(&self) -> Result<(), String> {
        Err("connection refused".to_string())
    }
}

fn config() -> CrawlConfig {
    CrawlConfig {
        ready_timeout_secs: 1,
        ..Default::default()
    }
}

fn pipeline<P: Probe>(
    source: FakeSource,
    probe: P,
    config: CrawlConfig,
) -> CrawlPipeline<FakeSource, MemoryStore, P> {
    CrawlPipeline::new(source, MemoryStore::default(), probe, config, Source::Twitter)
}

// ── Tests ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_crawl_persists_seed_and_friends() {
    let crawl = pipeline(FakeSource::with_friends(&[11, 22, 33]), Up, config());
    let report = crawl
        .run(&Context::background(), "goinggodotnet")
        .await
        .unwrap();

    assert!(!report.seed.id.as_str().is_empty());
    assert_eq!(report.seed.source_id, "123456");
    assert_eq!(report.seed.source, Source::Twitter);
    assert_eq!(report.friend_ids, vec![11, 22, 33]);
    let names: Vec<&str> = report.friends.iter().map(|f| f.screen_name.as_str()).collect();
    assert_eq!(names, vec!["friend11", "friend22", "friend33"]);
    assert_eq!(report.persisted_friends.len(), 3);
    assert_eq!(crawl.store().len(), 4);

    let stored = crawl
        .store()
        .get_by_id(&Context::background(), &report.seed.id)
        .await
        .unwrap();
    assert_eq!(stored, report.seed);
}

#[tokio::test]
async fn test_friend_failure_stops_crawl_at_that_friend() {
    let mut source = FakeSource::with_friends(&[11, 22, 33]);
    source.failing.insert(22);
    let crawl = pipeline(source, Up, config());

    let err = crawl
        .run(&Context::background(), "goinggodotnet")
        .await
        .unwrap_err();

    match &err {
        CrawlError::Friend { position, id, source } => {
            assert_eq!(*position, 1);
            assert_eq!(*id, 22);
            assert!(source.is_transport());
        }
        other => panic!("expected friend error, got {other:?}"),
    }
    assert_eq!(err.stage(), CrawlStage::FriendsListed);
    assert_eq!(crawl.source().fetched(), vec![11, 22]);
    // The seed stays persisted; no friend node is written.
    assert_eq!(crawl.store().len(), 1);
}

#[tokio::test]
async fn test_bounded_fan_out_keeps_order_and_fails_by_position() {
    let cfg = CrawlConfig {
        friend_concurrency: 3,
        ..config()
    };
    let crawl = pipeline(FakeSource::with_friends(&[5, 4, 3, 2, 1]), Up, cfg.clone());
    let report = crawl
        .run(&Context::background(), "goinggodotnet")
        .await
        .unwrap();
    let ids: Vec<u64> = report.friends.iter().map(|f| f.id).collect();
    assert_eq!(ids, vec![5, 4, 3, 2, 1]);

    let mut source = FakeSource::with_friends(&[5, 4, 3, 2, 1]);
    source.failing.insert(4);
    source.failing.insert(2);
    let crawl = pipeline(source, Up, cfg);
    let err = crawl
        .run(&Context::background(), "goinggodotnet")
        .await
        .unwrap_err();
    assert!(matches!(err, CrawlError::Friend { position: 1, id: 4, .. }));
    assert_eq!(crawl.store().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_store_never_ready_fails_before_any_fetch() {
    let crawl = pipeline(FakeSource::with_friends(&[11]), Down, config());
    let err = crawl
        .run(&Context::background(), "goinggodotnet")
        .await
        .unwrap_err();

    assert!(matches!(err, CrawlError::NotReady(ReadyError::Timeout { .. })));
    assert_eq!(err.stage(), CrawlStage::ProbeFailed);
    assert!(!err.is_cancelled());
    assert!(crawl.source().fetched().is_empty());
    assert_eq!(crawl.store().len(), 0);
}

#[tokio::test]
async fn test_unknown_seed_is_reported() {
    let crawl = pipeline(FakeSource::with_friends(&[11]), Up, config());
    let err = crawl
        .run(&Context::background(), "nobody")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CrawlError::SeedFetch { ref screen_name, source: FeedError::NotFound { .. } } if screen_name == "nobody"
    ));
    assert_eq!(crawl.store().len(), 0);
}

#[tokio::test]
async fn test_friend_persistence_can_be_disabled() {
    let cfg = CrawlConfig {
        persist_friends: false,
        ..config()
    };
    let crawl = pipeline(FakeSource::with_friends(&[11, 22]), Up, cfg);
    let report = crawl
        .run(&Context::background(), "goinggodotnet")
        .await
        .unwrap();
    assert_eq!(report.friends.len(), 2);
    assert!(report.persisted_friends.is_empty());
    assert_eq!(crawl.store().len(), 1);
}

#[tokio::test]
async fn test_repeat_crawl_reuses_stored_nodes() {
    let crawl = pipeline(FakeSource::with_friends(&[11, 22]), Up, config());
    let ctx = Context::background();
    let first = crawl.run(&ctx, "goinggodotnet").await.unwrap();
    let second = crawl.run(&ctx, "goinggodotnet").await.unwrap();

    assert_eq!(first.seed.id, second.seed.id);
    assert_ne!(first.crawl_id, second.crawl_id);
    assert_eq!(crawl.store().len(), 3);
}

#[tokio::test]
async fn test_duplicate_seed_nodes_abort_persistence() {
    let crawl = pipeline(FakeSource::with_friends(&[]), Up, config());
    let ctx = Context::background();
    let dup = profile(SEED_ID, "goinggodotnet").to_new_person(Source::Twitter);
    crawl.store().add(&ctx, dup.clone()).await.unwrap();
    crawl.store().add(&ctx, dup).await.unwrap();

    let err = crawl.run(&ctx, "goinggodotnet").await.unwrap_err();
    assert!(matches!(
        err,
        CrawlError::SeedPersist { source: GraphError::Ambiguous { count: 2, .. }, .. }
    ));
    assert_eq!(err.stage(), CrawlStage::SeedFetched);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_mid_crawl_surfaces_cancellation() {
    let mut source = FakeSource::with_friends(&[11, 22, 33]);
    source.stalled.insert(22);
    let crawl = pipeline(source, Up, config());

    let ctx = Context::background();
    let canceller = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let err = crawl.run(&ctx, "goinggodotnet").await.unwrap_err();
    assert!(err.is_cancelled());
    assert!(matches!(
        err,
        CrawlError::Friend { position: 1, source: FeedError::Interrupted(Interrupted::Cancelled), .. }
    ));
    assert_eq!(crawl.source().fetched(), vec![11, 22]);
}

#[tokio::test]
async fn test_already_cancelled_context_does_nothing() {
    let crawl = pipeline(FakeSource::with_friends(&[11]), Up, config());
    let ctx = Context::background();
    ctx.cancel();
    let err = crawl.run(&ctx, "goinggodotnet").await.unwrap_err();
    assert!(matches!(err, CrawlError::Interrupted(Interrupted::Cancelled)));
    assert!(err.is_cancelled());
    assert_eq!(crawl.store().len(), 0);
}
