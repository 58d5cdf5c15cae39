//! socialgraph-crawl: Load one user and their immediate friends into the graph store.
//!
//! Waits for the store to come up, pulls the seed profile and its friend list
//! from the source API, and upserts what it found as Person nodes. The first
//! error ends the crawl; nothing is retried apart from the readiness probe.

pub mod error;
pub mod pipeline;
pub mod report;

pub use error::CrawlError;
pub use pipeline::{CrawlPipeline, CrawlStage};
pub use report::CrawlReport;
