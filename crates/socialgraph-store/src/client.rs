//! HTTP connection management and shared graph client.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use socialgraph_core::config::StoreConfig;
use socialgraph_core::error::excerpt;
use socialgraph_core::{Context, Interrupted};

pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors from graph store operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Graph store connection error: {0}")]
    Network(String),

    #[error("Graph store returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Graph store rejected document: {}", messages.join("; "))]
    Protocol { messages: Vec<String> },

    #[error("Failed to decode graph store response: {0}")]
    Decode(String),

    #[error("{entity} not found: {key}")]
    NotFound { entity: String, key: String },

    #[error("{entity} lookup {key} matched {count} nodes, expected one")]
    Ambiguous {
        entity: String,
        key: String,
        count: usize,
    },

    #[error("Graph store created {entity} but returned {returned} identifiers, expected one")]
    IdentityNotReturned { entity: String, returned: usize },

    #[error("Graph store call interrupted: {0}")]
    Interrupted(#[from] Interrupted),

    #[error("Failed to build graph store client: {0}")]
    ClientBuild(String),
}

impl GraphError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Interrupted(Interrupted::Cancelled))
    }
}

impl From<reqwest::Error> for GraphError {
    fn from(err: reqwest::Error) -> Self {
        GraphError::Network(err.to_string())
    }
}

/// Standard GraphQL response envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
    message: String,
}

impl<T> Envelope<T> {
    /// Surface store-side errors first; a reply without data is undecodable.
    pub(crate) fn into_data(self) -> Result<T> {
        if !self.errors.is_empty() {
            return Err(GraphError::Protocol {
                messages: self.errors.into_iter().map(|e| e.message).collect(),
            });
        }
        self.data
            .ok_or_else(|| GraphError::Decode("response carried no data".to_string()))
    }
}

/// Pooled client for the graph store's query endpoint.
///
/// This is the single point of access for all graph operations.
/// Clone is cheap (inner Arc).
#[derive(Clone)]
pub struct GraphClient {
    http: reqwest::Client,
    config: StoreConfig,
}

impl GraphClient {
    /// Build a client for the store described by `config`.
    ///
    /// No request is made; gate the first call on [`crate::ready::wait_ready`].
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if !config.auth_token.is_empty() {
            let name = HeaderName::from_bytes(config.auth_header_name.as_bytes())
                .map_err(|e| GraphError::ClientBuild(format!("auth header name: {e}")))?;
            let mut value = HeaderValue::from_str(&config.auth_token)
                .map_err(|e| GraphError::ClientBuild(format!("auth token: {e}")))?;
            value.set_sensitive(true);
            headers.insert(name, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| GraphError::ClientBuild(e.to_string()))?;

        tracing::info!(url = %config.url, "Graph store client ready");
        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Send a query or mutation document and decode the `data` member.
    pub async fn execute<T: DeserializeOwned>(&self, ctx: &Context, document: &str) -> Result<T> {
        tracing::debug!(document = %document, "Executing graph document");
        let request = self
            .http
            .post(self.config.graphql_url())
            .json(&serde_json::json!({ "query": document }));

        let body = self.send(ctx, request).await?;
        let envelope: Envelope<T> =
            serde_json::from_str(&body).map_err(|e| GraphError::Decode(e.to_string()))?;
        envelope.into_data()
    }

    /// Send a prepared request under `ctx` and return the body of a 2xx reply.
    pub(crate) async fn send(
        &self,
        ctx: &Context,
        request: reqwest::RequestBuilder,
    ) -> Result<String> {
        let (status, body) = ctx
            .run(async {
                let resp = request.send().await?;
                let status = resp.status();
                let body = resp.text().await?;
                Ok::<_, GraphError>((status, body))
            })
            .await??;

        if !status.is_success() {
            return Err(GraphError::Status {
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }
        Ok(body)
    }

    pub(crate) fn post(&self, url: String) -> reqwest::RequestBuilder {
        self.http.post(url)
    }
}
