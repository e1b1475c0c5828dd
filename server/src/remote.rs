use async_trait::async_trait;
use ordering_core::{Lookup, LookupError, Post};
use reqwest::{Client, Url};
use std::time::Duration;

pub const DEFAULT_PREVIEW_PATH: &str = "/elasticpress/v1/pointer_preview";
pub const DEFAULT_SEARCH_PATH: &str = "/elasticpress/v1/pointer_search";

pub fn http_client(user_agent: &str, timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(user_agent.to_string())
        .redirect(reqwest::redirect::Policy::limited(5))
        .timeout(timeout)
        .build()
}

/// One of the site's read endpoints, queried as `GET {root}{path}?s={query}`.
#[derive(Clone)]
pub struct RemoteLookup {
    client: Client,
    endpoint: Url,
}

impl RemoteLookup {
    pub fn new(client: Client, root: &str, path: &str) -> anyhow::Result<Self> {
        let endpoint = Url::parse(&format!("{}{}", root.trim_end_matches('/'), path))?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url { &self.endpoint }
}

#[async_trait]
impl Lookup for RemoteLookup {
    async fn fetch(&self, query: &str) -> Result<Vec<Post>, LookupError> {
        let resp = self
            .client
            .get(self.endpoint.clone())
            .query(&[("s", query)])
            .send()
            .await
            .map_err(|e| LookupError::Transport { message: e.to_string() })?;
        if !resp.status().is_success() {
            return Err(LookupError::Status { status: resp.status().as_u16() });
        }
        let posts: Vec<Post> = resp.json().await.map_err(|e| LookupError::Decode { message: e.to_string() })?;
        tracing::debug!(endpoint = %self.endpoint, query, hits = posts.len(), "remote lookup");
        Ok(posts)
    }
}
