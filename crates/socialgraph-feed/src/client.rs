//! HTTP client for the Twitter v1.1 REST API.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CACHE_CONTROL};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use socialgraph_core::config::SourceConfig;
use socialgraph_core::error::excerpt;
use socialgraph_core::{Context, RemoteProfile};

use crate::error::{FeedError, Result};
use crate::source::ProfileSource;

const USERS_SHOW: &str = "users/show.json";
const FRIENDS_IDS: &str = "friends/ids.json";

#[derive(Debug, Deserialize)]
struct FriendIds {
    ids: Vec<u64>,
}

/// Pooled, authenticated client for the source API.
///
/// Clone is cheap and shares the connection pool.
#[derive(Clone)]
pub struct TwitterClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl TwitterClient {
    /// Build the client and its connection pool from configuration.
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .tcp_keepalive(config.connect_timeout())
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(config.pool_idle_timeout())
            .build()
            .map_err(|e| FeedError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// Profile for a screen name.
    pub async fn fetch_profile_by_screen_name(
        &self,
        ctx: &Context,
        screen_name: &str,
    ) -> Result<RemoteProfile> {
        self.get_json(
            ctx,
            USERS_SHOW,
            &[("screen_name", screen_name.to_string())],
            Some(format!("screen_name={screen_name}")),
        )
        .await
    }

    /// Profile for a source-assigned user id.
    pub async fn fetch_profile_by_id(&self, ctx: &Context, id: u64) -> Result<RemoteProfile> {
        self.get_json(
            ctx,
            USERS_SHOW,
            &[("user_id", id.to_string())],
            Some(format!("user_id={id}")),
        )
        .await
    }

    /// Ids of the accounts the user follows. Only the first page is read.
    pub async fn fetch_friend_ids(&self, ctx: &Context, id: u64) -> Result<Vec<u64>> {
        let friends: FriendIds = self
            .get_json(ctx, FRIENDS_IDS, &[("user_id", id.to_string())], None)
            .await?;
        Ok(friends.ids)
    }

    /// Issue an authenticated GET and decode the JSON body.
    ///
    /// `lookup` names the entity being fetched; when present a 404 maps to
    /// [`FeedError::NotFound`] instead of a transport error.
    async fn get_json<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        path: &str,
        query: &[(&str, String)],
        lookup: Option<String>,
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!(url = %url, query = ?query, "Calling source API");

        let request = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(query)
            .send();

        let (status, body) = ctx
            .run(async {
                let resp = request.await?;
                let status = resp.status();
                let body = resp.text().await?;
                Ok::<_, FeedError>((status, body))
            })
            .await??;

        if status == StatusCode::NOT_FOUND {
            if let Some(lookup) = lookup {
                return Err(FeedError::NotFound { lookup });
            }
        }
        if !status.is_success() {
            tracing::warn!(url = %url, status = status.as_u16(), "Source API returned an error");
            return Err(FeedError::Transport {
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| FeedError::Decode {
            what: path.to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl ProfileSource for TwitterClient {
    async fn fetch_profile_by_screen_name(
        &self,
        ctx: &Context,
        screen_name: &str,
    ) -> Result<RemoteProfile> {
        TwitterClient::fetch_profile_by_screen_name(self, ctx, screen_name).await
    }

    async fn fetch_profile_by_id(&self, ctx: &Context, id: u64) -> Result<RemoteProfile> {
        TwitterClient::fetch_profile_by_id(self, ctx, id).await
    }

    async fn fetch_friend_ids(&self, ctx: &Context, id: u64) -> Result<Vec<u64>> {
        TwitterClient::fetch_friend_ids(self, ctx, id).await
    }
}
