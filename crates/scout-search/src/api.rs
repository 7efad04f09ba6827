//! Search endpoint abstraction.

use std::time::Duration;

use async_trait::async_trait;
use scout_data::{DependencyTag, FetchClient, FetchPolicy};

use crate::error::SearchError;
use crate::model::{ResultSet, SuggestionResponse};
use crate::request::SearchRequest;

/// The remote search endpoint.
///
/// The same endpoint serves filtered searches, suggestion lookups (only
/// `query`) and the unfiltered catalog snapshot (no parameters).
#[async_trait]
pub trait SearchApi: Send + Sync {
    /// Run a filtered search.
    async fn search(&self, request: &SearchRequest) -> Result<ResultSet, SearchError>;

    /// Look up suggestions for a partial query.
    async fn suggest(&self, query: &str) -> Result<SuggestionResponse, SearchError>;

    /// Fetch the unfiltered catalog.
    async fn catalog(&self) -> Result<ResultSet, SearchError> {
        self.search(&SearchRequest::catalog()).await
    }
}

/// [`SearchApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSearchApi {
    client: FetchClient,
    endpoint: String,
    timeout: Option<Duration>,
}

impl HttpSearchApi {
    /// Create an API bound to `endpoint` (e.g. `/api/search`), resolved
    /// against the client's base URL.
    pub fn new(client: FetchClient, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            timeout: None,
        }
    }

    /// Use `timeout` per attempt instead of the dependency defaults.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn policy(&self, tag: DependencyTag) -> FetchPolicy {
        let policy = FetchPolicy::from_tag(tag);
        match self.timeout {
            Some(timeout) => policy.with_timeout(timeout),
            None => policy,
        }
    }
}

#[async_trait]
impl SearchApi for HttpSearchApi {
    async fn search(&self, request: &SearchRequest) -> Result<ResultSet, SearchError> {
        let pairs = request.to_query_pairs();
        tracing::debug!(endpoint = %self.endpoint, params = ?pairs, "search request");
        let results = self
            .client
            .get(self.endpoint.as_str())
            .tag(DependencyTag::Search)
            .policy(self.policy(DependencyTag::Search))
            .query_pairs(pairs)
            .json::<ResultSet>()
            .await?;
        Ok(results)
    }

    async fn suggest(&self, query: &str) -> Result<SuggestionResponse, SearchError> {
        let body = self
            .client
            .get(self.endpoint.as_str())
            .tag(DependencyTag::Suggestions)
            .policy(self.policy(DependencyTag::Suggestions))
            .query("query", query)
            .json::<SuggestionResponse>()
            .await?;
        Ok(body)
    }

    async fn catalog(&self) -> Result<ResultSet, SearchError> {
        let results = self
            .client
            .get(self.endpoint.as_str())
            .tag(DependencyTag::Catalog)
            .policy(self.policy(DependencyTag::Catalog))
            .json::<ResultSet>()
            .await?;
        Ok(results)
    }
}
