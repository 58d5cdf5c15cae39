//! Write operations for the social graph.
//!
//! Creates are plain inserts: the store assigns the identity and does not
//! enforce uniqueness on `(source, source_id)` or `(source, screen_name)`.

use serde::Deserialize;

use socialgraph_core::{Context, NewPerson, Person, PersonId};

use crate::client::{GraphClient, GraphError, Result};
use crate::documents::{self, PERSON};

#[derive(Debug, Deserialize)]
struct AddPersonData {
    #[serde(rename = "addPerson")]
    add_person: Option<AddedNodes>,
}

#[derive(Debug, Deserialize)]
struct AddedNodes {
    #[serde(default)]
    person: Vec<CreatedId>,
}

#[derive(Debug, Deserialize)]
struct CreatedId {
    id: String,
}

impl GraphClient {
    /// Create a Person node and return it with its store-assigned id.
    ///
    /// Only scalar fields are written, so the returned Person carries no
    /// friends whatever the payload held.
    ///
    /// Anything other than exactly one returned identifier is
    /// [`GraphError::IdentityNotReturned`]; the create is not retried.
    pub async fn add_person(&self, ctx: &Context, person: NewPerson) -> Result<Person> {
        let mutation = documents::add_person(&person);
        let data: AddPersonData = self.execute(ctx, &mutation).await?;

        let mut created = data.add_person.map(|a| a.person).unwrap_or_default();
        if created.len() != 1 || created[0].id.is_empty() {
            return Err(GraphError::IdentityNotReturned {
                entity: PERSON.to_string(),
                returned: created.len(),
            });
        }
        let id = PersonId(created.remove(0).id);

        tracing::info!(
            id = %id,
            screen_name = %person.screen_name,
            source = %person.source,
            "Person added"
        );
        Ok(Person {
            friends: Vec::new(),
            ..Person::from_new(id, person)
        })
    }

    /// Create-if-absent keyed on screen name. See [`crate::PersonStore::upsert`].
    pub async fn upsert_person(&self, ctx: &Context, person: NewPerson) -> Result<Person> {
        crate::store::PersonStore::upsert(self, ctx, person).await
    }
}
