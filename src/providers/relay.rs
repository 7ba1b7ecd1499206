//! HTTP fetching with a single relay fallback.
//!
//! A request is first sent directly. If that fails to connect or returns a
//! non-success status, it is sent once more through the relay, which takes
//! the original URL in its `url` query parameter. There are no other retries.

use crate::core::error::{DashboardError, Result};
use anyhow::Context;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

#[derive(Clone)]
pub struct FallbackClient {
    client: Client,
    relay: Option<Url>,
}

impl FallbackClient {
    pub fn new(relay_base_url: Option<&str>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent("ipsatrack/1.0")
            .build()
            .context("Failed to build HTTP client")?;
        let relay = relay_base_url
            .map(|base| {
                Url::parse(base).with_context(|| format!("Invalid relay URL: {base}"))
            })
            .transpose()?;
        Ok(FallbackClient { client, relay })
    }

    /// URL the relay is asked to fetch on behalf of `target`.
    pub fn relay_url(&self, target: &str) -> Option<Url> {
        self.relay.as_ref().map(|relay| {
            let mut url = relay.clone();
            url.query_pairs_mut().append_pair("url", target);
            url
        })
    }

    #[instrument(name = "FallbackFetch", skip(self))]
    pub async fn get(&self, url: &str) -> Result<Response> {
        let direct_error = match self.attempt(url).await {
            Ok(response) => return Ok(response),
            Err(e) => e,
        };

        let Some(relay_url) = self.relay_url(url) else {
            warn!(error = %direct_error, "Direct request failed and no relay is configured");
            return Err(DashboardError::FetchUnavailable {
                url: url.to_string(),
                reason: direct_error,
            });
        };

        debug!(error = %direct_error, "Direct request failed, retrying through relay");
        match self.attempt(relay_url.as_str()).await {
            Ok(response) => Ok(response),
            Err(relay_error) => {
                warn!(%direct_error, %relay_error, "Direct and relay requests failed");
                Err(DashboardError::FetchUnavailable {
                    url: url.to_string(),
                    reason: format!("direct: {direct_error}; relay: {relay_error}"),
                })
            }
        }
    }

    /// Fetches `url` and decodes the body as JSON. A body that does not decode
    /// is a parse error and is not retried through the relay.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.get(url).await?;
        let text = response
            .text()
            .await
            .map_err(|e| DashboardError::FetchUnavailable {
                url: url.to_string(),
                reason: format!("failed to read response body: {e}"),
            })?;

        serde_json::from_str(&text).map_err(|e| {
            DashboardError::Parse(format!("Failed to parse JSON response from {url}: {e}"))
        })
    }

    async fn attempt(&self, url: &str) -> std::result::Result<Response, String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("request error: {e}"))?;

        if !response.status().is_success() {
            return Err(format!("HTTP error: {}", response.status()));
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Payload {
        value: f64,
    }

    async fn mount(server: &MockServer, at: &str, status: u16, body: &str, calls: u64) {
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .expect(calls)
            .mount(server)
            .await;
    }

    #[test]
    fn test_relay_url_encodes_target() {
        let client = FallbackClient::new(Some("https://relay.example.com/")).unwrap();
        let url = client
            .relay_url("https://api.example.com/chart/^IPSA?interval=1d&range=5d")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://relay.example.com/?url=https%3A%2F%2Fapi.example.com%2Fchart%2F%5EIPSA%3Finterval%3D1d%26range%3D5d"
        );

        let no_relay = FallbackClient::new(None).unwrap();
        assert!(no_relay.relay_url("https://api.example.com").is_none());
    }

    #[test]
    fn test_invalid_relay_url_is_rejected() {
        assert!(FallbackClient::new(Some("not a url")).is_err());
    }

    #[tokio::test]
    async fn test_direct_success_skips_relay() {
        let server = MockServer::start().await;
        mount(&server, "/direct", 200, r#"{"value": 1.5}"#, 1).await;
        mount(&server, "/relay", 200, r#"{"value": 2.5}"#, 0).await;

        let client = FallbackClient::new(Some(&format!("{}/relay", server.uri()))).unwrap();
        let payload: Payload = client
            .get_json(&format!("{}/direct", server.uri()))
            .await
            .unwrap();
        assert_eq!(payload, Payload { value: 1.5 });
    }

    #[tokio::test]
    async fn test_error_status_falls_back_to_relay_once() {
        let server = MockServer::start().await;
        let target = format!("{}/direct", server.uri());
        mount(&server, "/direct", 500, "", 1).await;
        Mock::given(method("GET"))
            .and(path("/relay"))
            .and(query_param("url", target.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"value": 2.5}"#))
            .expect(1)
            .mount(&server)
            .await;

        let client = FallbackClient::new(Some(&format!("{}/relay", server.uri()))).unwrap();
        let payload: Payload = client.get_json(&target).await.unwrap();
        assert_eq!(payload, Payload { value: 2.5 });
    }

    #[tokio::test]
    async fn test_network_failure_falls_back_to_relay() {
        let server = MockServer::start().await;
        mount(&server, "/relay", 200, r#"{"value": 3.0}"#, 1).await;

        let client = FallbackClient::new(Some(&format!("{}/relay", server.uri()))).unwrap();
        // Nothing listens on port 1.
        let payload: Payload = client.get_json("http://127.0.0.1:1/quote").await.unwrap();
        assert_eq!(payload, Payload { value: 3.0 });
    }

    #[tokio::test]
    async fn test_both_attempts_failing_is_unavailable() {
        let server = MockServer::start().await;
        mount(&server, "/direct", 503, "", 1).await;
        mount(&server, "/relay", 502, "", 1).await;

        let client = FallbackClient::new(Some(&format!("{}/relay", server.uri()))).unwrap();
        let target = format!("{}/direct", server.uri());
        let result = client.get_json::<Payload>(&target).await;

        match result {
            Err(DashboardError::FetchUnavailable { url, reason }) => {
                assert_eq!(url, target);
                assert!(reason.contains("503"), "reason: {reason}");
                assert!(reason.contains("502"), "reason: {reason}");
            }
            other => panic!("expected FetchUnavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_without_relay_fails_after_direct_attempt() {
        let server = MockServer::start().await;
        mount(&server, "/direct", 500, "", 1).await;

        let client = FallbackClient::new(None).unwrap();
        let result = client
            .get_json::<Payload>(&format!("{}/direct", server.uri()))
            .await;
        assert!(matches!(
            result,
            Err(DashboardError::FetchUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error_without_relay_attempt() {
        let server = MockServer::start().await;
        mount(&server, "/direct", 200, "<html>blocked</html>", 1).await;
        mount(&server, "/relay", 200, r#"{"value": 2.5}"#, 0).await;

        let client = FallbackClient::new(Some(&format!("{}/relay", server.uri()))).unwrap();
        let result = client
            .get_json::<Payload>(&format!("{}/direct", server.uri()))
            .await;
        assert!(matches!(result, Err(DashboardError::Parse(_))));
    }
}
