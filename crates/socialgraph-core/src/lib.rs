//! socialgraph-core: Shared types, execution context, configuration, and error
//! handling for the socialgraph crawler.
//!
//! This crate provides the foundational pieces used across all socialgraph crates:
//! - Person / NewPerson / RemoteProfile domain records
//! - A cancellable, deadline-bearing execution [`Context`]
//! - Layered configuration (defaults, config file, environment)
//! - Common error types

pub mod config;
pub mod context;
pub mod error;
pub mod types;

pub use context::Context;
pub use error::{ConfigError, Interrupted};
pub use types::{NewPerson, Person, PersonId, RemoteProfile, Source};
