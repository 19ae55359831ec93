//! HTTP client for the Vivino JSON API
//!
//! Thin reqwest wrapper implementing `WineApi`. Every call is a single
//! attempt: failures are reported to the caller, which logs and moves on.

use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, error};
use url::Url;

use crate::domain::json_path::{lookup, lookup_u64};
use crate::domain::services::{RawMatch, SearchPage, SearchQuery, WineApi};
use crate::domain::api_error::{ApiError, ApiResult};
use crate::infrastructure::config::{vivino, CrawlerConfig};

/// Configuration for HTTP client behavior
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// API root
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Pause after each request in milliseconds
    pub request_delay_ms: u64,
    /// User agent string
    pub user_agent: String,
}

impl HttpClientConfig {
    /// Create HttpClientConfig from CrawlerConfig
    pub fn from_crawler_config(crawler: &CrawlerConfig) -> Self {
        Self {
            base_url: crawler.base_url.clone(),
            timeout_seconds: crawler.request_timeout_seconds,
            request_delay_ms: crawler.request_delay_ms,
            user_agent: crawler.user_agent.clone(),
        }
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self::from_crawler_config(&CrawlerConfig::default())
    }
}

/// Vivino API client
#[derive(Clone)]
pub struct VivinoClient {
    client: Client,
    base_url: Url,
    config: HttpClientConfig,
}

impl VivinoClient {
    /// Create a client from the crawler section of the app config
    pub fn from_crawler_config(crawler: &CrawlerConfig) -> Result<Self> {
        Self::with_config(HttpClientConfig::from_crawler_config(crawler))
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        // Url::join drops the last path segment unless the base ends with '/'
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base).map_err(|e| anyhow!("Invalid base URL '{}': {}", base, e))?;

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .cookie_store(true)
            .gzip(true)
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> ApiResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::malformed(self.base_url.as_str(), format!("invalid endpoint '{path}': {e}")))
    }

    /// GET `path` with `query` and decode the body as JSON
    async fn get_json(&self, path: &str, query: &[(String, String)]) -> ApiResult<Value> {
        let url = self.endpoint(path)?;
        debug!("🌐 HTTP GET {} {:?}", url, query);

        let result = self.send(&url, query).await;

        if self.config.request_delay_ms > 0 {
            sleep(Duration::from_millis(self.config.request_delay_ms)).await;
        }

        result
    }

    async fn send(&self, url: &Url, query: &[(String, String)]) -> ApiResult<Value> {
        let response = self
            .client
            .get(url.clone())
            .query(query)
            .send()
            .await
            .map_err(|e| ApiError::transport(url.as_str(), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            error!("❌ HTTP error {}: {}", status, url);
            return Err(ApiError::http_status(url.as_str(), status.as_u16()));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ApiError::malformed(url.as_str(), format!("body is not JSON: {e}")))
    }
}

/// Extract `explore_vintage.records_matched` and `explore_vintage.matches`.
///
/// A missing `matches` list is an empty page; a missing `explore_vintage` or
/// `records_matched` is a malformed response.
pub fn parse_search_page(url: &str, body: &Value) -> ApiResult<SearchPage> {
    let explore = lookup(body, &["explore_vintage"])
        .filter(|v| v.is_object())
        .ok_or_else(|| ApiError::malformed(url, "missing explore_vintage"))?;

    let records_matched = lookup_u64(explore, &["records_matched"])
        .ok_or_else(|| ApiError::malformed(url, "missing records_matched"))?;

    let matches = match lookup(explore, &["matches"]) {
        None => Vec::new(),
        Some(Value::Array(items)) => items.iter().cloned().map(RawMatch).collect(),
        Some(_) => return Err(ApiError::malformed(url, "matches is not a list")),
    };

    Ok(SearchPage {
        records_matched,
        matches,
    })
}

#[async_trait]
impl WineApi for VivinoClient {
    async fn search(&self, query: &SearchQuery) -> ApiResult<SearchPage> {
        let body = self.get_json(vivino::EXPLORE_PATH, &query.to_query_pairs()).await?;
        let url = self.endpoint(vivino::EXPLORE_PATH)?;
        parse_search_page(url.as_str(), &body)
    }

    async fn tastes(&self, wine_id: u64) -> ApiResult<Value> {
        self.get_json(&vivino::tastes_path(wine_id), &[]).await
    }

    async fn reviews(&self, wine_id: u64) -> ApiResult<Value> {
        self.get_json(&vivino::reviews_path(wine_id), &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::search_range::SearchRange;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Helper to create a client pointed at the mock server.
    fn create_test_client(server: &MockServer) -> VivinoClient {
        VivinoClient::with_config(HttpClientConfig {
            base_url: format!("{}/api", server.uri()),
            timeout_seconds: 5,
            request_delay_ms: 0,
            user_agent: "vivino-harvest-test".to_string(),
        })
        .unwrap()
    }

    fn base_query() -> SearchQuery {
        SearchQuery::new(vec![], vec![1], 25)
    }

    #[tokio::test]
    async fn test_search_sends_range_filters_and_parses_matches() {
        let server = MockServer::start().await;
        let client = create_test_client(&server);

        Mock::given(method("GET"))
            .and(path("/api/explore/explore"))
            .and(query_param("wine_type_ids[]", "1"))
            .and(query_param("price_range_min", "10"))
            .and(query_param("price_range_max", "20"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "explore_vintage": {
                    "records_matched": 31,
                    "matches": [
                        {"vintage": {"year": 2019, "wine": {"id": 1}}},
                        {"vintage": {"year": 2020, "wine": {"id": 2}}}
                    ]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let query = base_query().for_range(SearchRange::new(10.0, 20.0).unwrap()).with_page(2);
        let page = client.search(&query).await.unwrap();

        assert_eq!(page.records_matched, 31);
        assert_eq!(page.matches.len(), 2);
        assert_eq!(page.matches[1].wine_id(), Some(2));
    }

    #[tokio::test]
    async fn test_non_success_status_is_transport_failure() {
        let server = MockServer::start().await;
        let client = create_test_client(&server);

        Mock::given(method("GET"))
            .and(path("/api/explore/explore"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client.search(&base_query()).await.unwrap_err();
        assert!(err.is_transport());
        assert!(matches!(err, ApiError::HttpStatus { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_missing_explore_vintage_is_malformed() {
        let server = MockServer::start().await;
        let client = create_test_client(&server);

        Mock::given(method("GET"))
            .and(path("/api/explore/explore"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "nope"})))
            .mount(&server)
            .await;

        let err = client.search(&base_query()).await.unwrap_err();
        assert!(err.is_malformed());
    }

    #[tokio::test]
    async fn test_detail_endpoints_return_raw_json() {
        let server = MockServer::start().await;
        let client = create_test_client(&server);

        Mock::given(method("GET"))
            .and(path("/api/wines/77/tastes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"tastes": {"structure": {"acidity": 3.1}}})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/wines/77/reviews"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"reviews": [{}, {}]})))
            .mount(&server)
            .await;

        let tastes = client.tastes(77).await.unwrap();
        assert_eq!(tastes["tastes"]["structure"]["acidity"], json!(3.1));

        let reviews = client.reviews(77).await.unwrap();
        assert_eq!(reviews["reviews"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_parse_search_page_treats_missing_matches_as_empty() {
        let body = json!({"explore_vintage": {"records_matched": 0}});
        let page = parse_search_page("u", &body).unwrap();
        assert!(page.matches.is_empty());

        let bad = json!({"explore_vintage": {"records_matched": 3, "matches": "x"}});
        assert!(parse_search_page("u", &bad).unwrap_err().is_malformed());
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = VivinoClient::with_config(HttpClientConfig {
            base_url: "https://www.vivino.com/api".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(client.endpoint("explore/explore").unwrap().as_str(), "https://www.vivino.com/api/explore/explore");
    }
}
