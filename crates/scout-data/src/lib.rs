//! HTTP fetch client for the Scout storefront.
//!
//! Provides a small builder API over `reqwest` with:
//! - `DependencyTag` - semantic call categories with default budgets
//! - `FetchPolicy` - per-attempt timeout plus a `RetryPolicy`
//! - `FetchError` - failures split into connectivity, HTTP status and parse
//!
//! # Example
//!
//! ```rust,ignore
//! use scout_data::{DependencyTag, FetchClient};
//!
//! let client = FetchClient::new()?.with_base_url("https://shop.example.com");
//! let body: serde_json::Value = client
//!     .get("/api/search")
//!     .tag(DependencyTag::Search)
//!     .query("query", "mouse")
//!     .json()
//!     .await?;
//! ```

mod dependency;
mod error;
mod policy;
mod request;
mod response;

use serde::de::DeserializeOwned;

pub use dependency::DependencyTag;
pub use error::FetchError;
pub use policy::{BackoffStrategy, FetchPolicy, RetryCondition, RetryPolicy};
pub use request::RequestBuilder;
pub use response::Response;

/// HTTP client for outbound requests.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct FetchClient {
    http: reqwest::Client,
    base_url: Option<String>,
}

impl FetchClient {
    /// Create a new HTTP client.
    pub fn new() -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| FetchError::Connection(e.to_string()))?;
        Ok(Self {
            http,
            base_url: None,
        })
    }

    /// Prepend `base_url` to every relative request path.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    /// The configured base URL, if any.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Create a GET request expecting JSON.
    pub fn get(&self, url: impl Into<String>) -> ClientRequestBuilder<'_> {
        let url = self.resolve(url.into());
        let builder = RequestBuilder::new(url).accept("application/json");
        ClientRequestBuilder {
            client: self,
            builder,
            tag: DependencyTag::Search,
            policy: FetchPolicy::from_tag(DependencyTag::Search),
        }
    }

    fn resolve(&self, url: String) -> String {
        match &self.base_url {
            Some(base) if !url.contains("://") => {
                if url.starts_with('/') {
                    format!("{}{}", base, url)
                } else {
                    format!("{}/{}", base, url)
                }
            }
            _ => url,
        }
    }
}

/// Request builder bound to a client, carrying its fetch policy.
#[derive(Debug)]
pub struct ClientRequestBuilder<'a> {
    client: &'a FetchClient,
    builder: RequestBuilder,
    tag: DependencyTag,
    policy: FetchPolicy,
}

impl<'a> ClientRequestBuilder<'a> {
    /// Tag the request; also resets the policy to the tag's defaults.
    pub fn tag(mut self, tag: DependencyTag) -> Self {
        self.tag = tag;
        self.policy = FetchPolicy::from_tag(tag);
        self
    }

    /// Override the fetch policy.
    pub fn policy(mut self, policy: FetchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.builder = self.builder.query(key, value);
        self
    }

    /// Append several query parameters.
    pub fn query_pairs<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.builder = self.builder.query_pairs(pairs);
        self
    }

    /// Send the request, applying the timeout and retry policy.
    ///
    /// Non-2xx responses are returned as [`FetchError::HttpError`]. Dropping
    /// the returned future aborts the in-flight request.
    pub async fn send(self) -> Result<Response, FetchError> {
        let url = self.builder.build_url()?;
        let mut attempt = 0;

        loop {
            let result = self.send_once(&url).await;
            match result {
                Ok(resp) => return Ok(resp),
                Err(e) if self.policy.retry.should_retry(&e, attempt) => {
                    let delay = self.policy.retry.backoff.delay_for_attempt(attempt);
                    tracing::debug!(
                        dependency = %self.tag,
                        attempt,
                        error = %e,
                        delay_ms = delay.as_millis() as u64,
                        "retrying fetch"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Send the request and parse the body as JSON.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T, FetchError> {
        self.send().await?.json()
    }

    async fn send_once(&self, url: &url::Url) -> Result<Response, FetchError> {
        let mut request = self.client.http.get(url.clone());
        for (key, value) in &self.builder.headers {
            request = request.header(key.as_str(), value.as_str());
        }

        let started = std::time::Instant::now();
        let resp = tokio::time::timeout(self.policy.timeout, async {
            let resp = request.send().await?;
            Response::from_reqwest(resp).await
        })
        .await
        .map_err(|_| FetchError::Timeout(self.policy.timeout))??;

        tracing::debug!(
            dependency = %self.tag,
            url = %url,
            status = resp.status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "fetch completed"
        );
        resp.error_for_status()
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{DependencyTag, FetchClient, FetchError, FetchPolicy, Response, RetryPolicy};
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response per accepted connection.
    async fn serve(responses: Vec<(u16, &'static str)>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            for (status, body) in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut buf = vec![0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let reply = format!(
                    "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                socket.write_all(reply.as_bytes()).await.unwrap();
                let _ = socket.shutdown().await;
            }
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_resolve_relative_paths() {
        let client = FetchClient::new().unwrap().with_base_url("https://shop.test/");
        assert_eq!(client.resolve("/api/search".into()), "https://shop.test/api/search");
        assert_eq!(client.resolve("api/search".into()), "https://shop.test/api/search");
        assert_eq!(client.resolve("http://other.test/x".into()), "http://other.test/x");
        assert_eq!(client.base_url(), Some("https://shop.test"));
    }

    #[tokio::test]
    async fn test_get_json() {
        let base = serve(vec![(200, r#"{"total": 2}"#)]).await;
        let client = FetchClient::new().unwrap().with_base_url(base);

        let body: serde_json::Value = client.get("/api/search").json().await.unwrap();
        assert_eq!(body["total"], 2);
    }

    #[tokio::test]
    async fn test_client_error_not_retried() {
        let base = serve(vec![(404, "{}")]).await;
        let client = FetchClient::new().unwrap().with_base_url(base);

        let err = client.get("/missing").send().await.unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn test_server_error_retried_once() {
        let base = serve(vec![(503, "{}"), (200, r#"{"ok": true}"#)]).await;
        let client = FetchClient::new().unwrap().with_base_url(base);

        let policy = FetchPolicy::new(
            Duration::from_secs(5),
            RetryPolicy::new(1).with_backoff(BackoffStrategy::None),
        );
        let body: serde_json::Value = client.get("/api/search").policy(policy).json().await.unwrap();
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn test_connection_refused_is_connectivity_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = FetchClient::new().unwrap();
        let err = client
            .get(format!("http://{}/api/search", addr))
            .policy(FetchPolicy::new(Duration::from_secs(5), RetryPolicy::none()))
            .send()
            .await
            .unwrap_err();
        assert!(err.is_connectivity(), "unexpected error: {err:?}");
    }
}
