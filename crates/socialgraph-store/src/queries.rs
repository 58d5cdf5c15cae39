//! Read operations for the social graph.

use serde::Deserialize;

use socialgraph_core::{Context, Person, PersonId};

use crate::client::{GraphClient, GraphError, Result};
use crate::documents::{self, PERSON};

#[derive(Debug, Deserialize)]
struct GetPersonData {
    #[serde(rename = "getPerson")]
    get_person: Option<Person>,
}

#[derive(Debug, Deserialize)]
struct QueryPersonData {
    #[serde(rename = "queryPerson", default)]
    query_person: Option<Vec<Person>>,
}

impl GraphClient {
    /// Point lookup by store id.
    pub async fn get_person(&self, ctx: &Context, id: &PersonId) -> Result<Person> {
        let query = documents::get_person(id.as_str());
        let data: GetPersonData = self.execute(ctx, &query).await?;

        match data.get_person {
            Some(person) if !person.id.as_str().is_empty() => Ok(person),
            _ => Err(GraphError::NotFound {
                entity: PERSON.to_string(),
                key: format!("id={id}"),
            }),
        }
    }

    /// Filter lookup by screen name.
    ///
    /// Screen-name uniqueness is a convention the store does not enforce, so
    /// more than one match is reported as [`GraphError::Ambiguous`].
    pub async fn get_person_by_screen_name(
        &self,
        ctx: &Context,
        screen_name: &str,
    ) -> Result<Person> {
        let query = documents::person_by_screen_name(screen_name);
        let data: QueryPersonData = self.execute(ctx, &query).await?;
        single_match(data.query_person.unwrap_or_default(), screen_name)
    }
}

fn single_match(mut matches: Vec<Person>, screen_name: &str) -> Result<Person> {
    let key = format!("screen_name={screen_name}");
    match matches.len() {
        0 => Err(GraphError::NotFound {
            entity: PERSON.to_string(),
            key,
        }),
        1 => Ok(matches.remove(0)),
        count => {
            tracing::warn!(screen_name, count, "Duplicate Person nodes for screen name");
            Err(GraphError::Ambiguous {
                entity: PERSON.to_string(),
                key,
                count,
            })
        }
    }
}
