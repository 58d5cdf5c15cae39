//! One-shot schema management for the graph store.
//!
//! Must run once, after the store is ready and before any gateway call.

use socialgraph_core::Context;

use crate::client::{Envelope, GraphClient, GraphError, Result};

/// GraphQL type definitions for the Person entity.
pub const PERSON_SCHEMA: &str = r#"
type Person {
	id: ID!
	source_id: String! @search(by: [exact])
	source: String! @search(by: [exact])
	screen_name: String! @search(by: [exact])
	name: String!
	location: String
	friends_count: Int
	friends: [Person]
}
"#;

/// Apply or wipe the store schema.
pub struct Schema {
    client: GraphClient,
}

impl Schema {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }

    /// Upload the type definitions to the admin endpoint.
    pub async fn apply(&self, ctx: &Context) -> Result<()> {
        let request = self
            .client
            .post(self.client.config().admin_schema_url())
            .body(PERSON_SCHEMA);
        let body = self.client.send(ctx, request).await?;
        check_reply(&body)?;

        tracing::info!(url = %self.client.config().url, "Schema applied");
        Ok(())
    }

    /// Delete every node while keeping the schema in place.
    pub async fn drop_data(&self, ctx: &Context) -> Result<()> {
        let request = self
            .client
            .post(self.client.config().alter_url())
            .json(&serde_json::json!({ "drop_op": "DATA" }));
        let body = self.client.send(ctx, request).await?;
        check_reply(&body)?;

        tracing::info!(url = %self.client.config().url, "Graph data dropped");
        Ok(())
    }
}

fn check_reply(body: &str) -> Result<()> {
    let envelope: Envelope<serde_json::Value> =
        serde_json::from_str(body).map_err(|e| GraphError::Decode(e.to_string()))?;
    envelope.into_data().map(|_| ())
}
