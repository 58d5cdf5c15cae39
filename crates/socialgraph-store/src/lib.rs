//! socialgraph-store — GraphQL gateway for the social graph store.
//!
//! This crate is the single mutation point for the graph store. All reads
//! and writes go through [`GraphClient`] as parameterized query/mutation
//! documents; nothing here touches storage directly. [`ready`] gates the
//! first call until the store answers its health endpoint.

pub mod client;
pub mod documents;
pub mod mutations;
pub mod queries;
pub mod ready;
pub mod schema;
pub mod store;

pub use client::{GraphClient, GraphError, Result};
pub use ready::{wait_ready, wait_ready_http, HttpProbe, Probe, ReadyError};
pub use schema::Schema;
pub use store::PersonStore;
