//! The seam the crawl pipeline persists Person nodes through.

use async_trait::async_trait;
use socialgraph_core::{Context, NewPerson, Person, PersonId};

use crate::client::{GraphClient, Result};

/// Create and look up Person nodes.
#[async_trait]
pub trait PersonStore: Send + Sync {
    /// Plain create. The store does not enforce uniqueness, so calling this
    /// twice with the same payload yields two nodes.
    async fn add(&self, ctx: &Context, person: NewPerson) -> Result<Person>;

    async fn get_by_id(&self, ctx: &Context, id: &PersonId) -> Result<Person>;

    async fn get_by_screen_name(&self, ctx: &Context, screen_name: &str) -> Result<Person>;

    /// Reuse the node already stored under this screen name, or create one.
    ///
    /// An existing node is returned as stored; its fields are not updated.
    /// More than one existing match is an error rather than a pick.
    async fn upsert(&self, ctx: &Context, person: NewPerson) -> Result<Person> {
        match self.get_by_screen_name(ctx, &person.screen_name).await {
            Ok(existing) => {
                tracing::debug!(
                    id = %existing.id,
                    screen_name = %existing.screen_name,
                    "Person already stored"
                );
                Ok(existing)
            }
            Err(e) if e.is_not_found() => self.add(ctx, person).await,
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl PersonStore for GraphClient {
    async fn add(&self, ctx: &Context, person: NewPerson) -> Result<Person> {
        self.add_person(ctx, person).await
    }

    async fn get_by_id(&self, ctx: &Context, id: &PersonId) -> Result<Person> {
        self.get_person(ctx, id).await
    }

    async fn get_by_screen_name(&self, ctx: &Context, screen_name: &str) -> Result<Person> {
        self.get_person_by_screen_name(ctx, screen_name).await
    }
}
