//! apiprobe's HTTP client is a thin wrapper for `reqwest::Client` that
//! times every call and classifies the outcome into the [`ApiResponse`]
//! envelope by status-code range.
//!
//! Classification is independent of the caller's expected status: a
//! mismatch is logged as a warning but the envelope always reflects the
//! true HTTP category. `expected_status` drives reporting, never shape.

use http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use std::time::{Duration, Instant};
use tracing::*;

use crate::{
    check,
    config::{get_config, Config},
    model::{ApiResponse, Payload},
    Error, Result,
};

/// Per-call options for [`Client::get`].
#[derive(Debug, Clone)]
pub struct GetOptions {
    /// Status the caller expects. A mismatch is logged, nothing more.
    pub expected_status: StatusCode,
    /// Per-request timeout; falls back to the client's configured timeout.
    pub timeout: Option<Duration>,
    /// Extra headers, merged over the default `Accept: application/json`.
    pub headers: HeaderMap,
}

impl Default for GetOptions {
    fn default() -> Self {
        GetOptions {
            expected_status: StatusCode::OK,
            timeout: None,
            headers: HeaderMap::new(),
        }
    }
}

impl GetOptions {
    pub fn new() -> GetOptions {
        GetOptions::default()
    }

    pub fn expected_status(mut self, status: StatusCode) -> GetOptions {
        self.expected_status = status;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> GetOptions {
        self.timeout = Some(timeout);
        self
    }

    pub fn header(mut self, key: HeaderName, value: HeaderValue) -> GetOptions {
        self.headers.insert(key, value);
        self
    }
}

/// HTTP client bound to a base URL.
#[derive(Debug, Clone)]
pub struct Client {
    inner: reqwest::Client,
    base_url: String,
    timeout: Duration,
    health_path: String,
}

impl Default for Client {
    fn default() -> Self {
        Client::from_config(get_config())
    }
}

impl Client {
    /// Construct a client against an explicit base URL; timeouts and the
    /// health path come from the loaded configuration.
    pub fn new(base_url: impl Into<String>) -> Client {
        let cfg = get_config();
        Client {
            inner: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: cfg.timeout,
            health_path: cfg.health_path.clone(),
        }
    }

    pub fn from_config(cfg: &Config) -> Client {
        Client {
            inner: reqwest::Client::new(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            timeout: cfg.timeout,
            health_path: cfg.health_path.clone(),
        }
    }

    /// Issue a GET against `endpoint` (a path appended to the base URL)
    /// and classify the response.
    ///
    /// A status in [200, 300) lands the parsed body in `Payload::Data`,
    /// anything else in `Payload::Error`. A non-JSON body is a hard
    /// [`Error::Parse`] in both cases. Transport failures carry the
    /// endpoint and elapsed time; nothing is retried.
    pub async fn get(&self, endpoint: &str, options: GetOptions) -> Result<ApiResponse> {
        let url = format!("{}{endpoint}", self.base_url);
        debug!("GET {url}");

        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        // caller-supplied headers win on conflict
        headers.extend(options.headers.clone());

        let timeout = options.timeout.unwrap_or(self.timeout);
        let start = Instant::now();

        let res = self
            .inner
            .get(&url)
            .headers(headers)
            .timeout(timeout)
            .send()
            .await
            .map_err(|source| Error::Transport {
                endpoint: endpoint.to_string(),
                elapsed: start.elapsed(),
                source,
            })?;

        let status = res.status();
        let headers = res.headers().clone();
        let text = res.text().await.map_err(|source| Error::Transport {
            endpoint: endpoint.to_string(),
            elapsed: start.elapsed(),
            source,
        })?;
        let elapsed = start.elapsed();

        if status != options.expected_status {
            warn!(
                "status mismatch on \"{endpoint}\": expected {}, got {status}",
                options.expected_status
            );
        }

        let payload = if status.is_success() {
            Payload::Data(serde_json::from_str(&text).map_err(|source| Error::Parse {
                endpoint: endpoint.to_string(),
                source,
            })?)
        } else {
            Payload::Error(serde_json::from_str(&text).map_err(|source| Error::Parse {
                endpoint: endpoint.to_string(),
                source,
            })?)
        };

        Ok(ApiResponse {
            payload,
            status,
            headers,
            elapsed,
        })
    }

    /// One GET, then a hard assertion that it finished within `ceiling`.
    /// Returns the elapsed time; an underlying transport or parse failure
    /// propagates untouched.
    pub async fn validate_response_time(
        &self,
        endpoint: &str,
        ceiling: Duration,
    ) -> eyre::Result<Duration> {
        let res = self.get(endpoint, GetOptions::default()).await?;
        let elapsed = res.elapsed;
        check!(
            elapsed <= ceiling,
            "\"{endpoint}\" answered in {elapsed:?}, ceiling is {ceiling:?}"
        );
        Ok(elapsed)
    }

    /// Fire `count` GETs at `endpoint` simultaneously and join on all of
    /// them. Any single failure rejects the whole batch; there is no
    /// partial-result policy and no throttling. Aggregate timing and the
    /// success rate are logged, not returned.
    pub async fn concurrent(&self, endpoint: &str, count: usize) -> Result<Vec<ApiResponse>> {
        debug!("firing {count} concurrent GETs at \"{endpoint}\"");
        let start = Instant::now();

        let responses = futures::future::try_join_all(
            (0..count).map(|_| self.get(endpoint, GetOptions::default())),
        )
        .await?;

        let elapsed = start.elapsed();
        let successes = responses.iter().filter(|res| res.is_success()).count();
        info!(
            "{count} concurrent GETs to \"{endpoint}\" joined in {elapsed:?}, \
             success rate {successes}/{count}"
        );

        Ok(responses)
    }

    /// GET the configured health path and collapse the outcome to a
    /// boolean. This is the one place a failure is deliberately absorbed
    /// rather than propagated.
    pub async fn health_check(&self) -> bool {
        match self.get(&self.health_path, GetOptions::default()).await {
            Ok(res) => res.is_success(),
            Err(e) => {
                debug!("health check failed: {e:#}");
                false
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    /// An address nothing is listening on.
    fn refused_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{port}")
    }

    #[tokio::test]
    async fn success_status_lands_in_data() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/posts")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id":1,"userId":1,"title":"t","body":"b"}]"#)
            .create_async()
            .await;

        let client = Client::new(server.url());
        let res = client.get("/posts", GetOptions::default()).await.unwrap();

        assert_eq!(res.status, StatusCode::OK);
        assert!(res.is_success());
        assert_eq!(res.data().unwrap()[0]["id"], json!(1));
        assert!(res.error().is_none());
    }

    #[tokio::test]
    async fn error_status_lands_in_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/posts/999")
            .with_status(404)
            .with_body(r#"{"error":"post not found"}"#)
            .create_async()
            .await;

        let client = Client::new(server.url());
        let res = client
            .get("/posts/999", GetOptions::new().expected_status(StatusCode::NOT_FOUND))
            .await
            .unwrap();

        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert!(res.data().is_none());
        assert_eq!(res.error().unwrap().error.as_deref(), Some("post not found"));
    }

    #[tokio::test]
    async fn expected_status_never_changes_classification() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/posts")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let client = Client::new(server.url());
        // caller expected a 404; the body must still land in Data
        let res = client
            .get("/posts", GetOptions::new().expected_status(StatusCode::NOT_FOUND))
            .await
            .unwrap();

        assert_eq!(res.status, StatusCode::OK);
        assert!(res.is_success());
    }

    #[tokio::test]
    async fn non_json_success_body_is_a_parse_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/posts")
            .with_status(200)
            .with_body("<html>oops</html>")
            .create_async()
            .await;

        let client = Client::new(server.url());
        let err = client.get("/posts", GetOptions::default()).await.unwrap_err();
        assert!(matches!(err, Error::Parse { .. }), "got: {err}");
    }

    #[tokio::test]
    async fn non_json_error_body_is_a_parse_error_too() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/posts")
            .with_status(500)
            .with_body("internal server error")
            .create_async()
            .await;

        let client = Client::new(server.url());
        let err = client.get("/posts", GetOptions::default()).await.unwrap_err();
        assert!(matches!(err, Error::Parse { .. }), "got: {err}");
    }

    #[tokio::test]
    async fn accept_json_header_is_sent_by_default() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("GET", "/posts")
            .match_header("accept", "application/json")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let client = Client::new(server.url());
        client.get("/posts", GetOptions::default()).await.unwrap();
        m.assert_async().await;
    }

    #[tokio::test]
    async fn caller_headers_override_the_default_accept() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("GET", "/posts")
            .match_header("accept", "application/vnd.probe+json")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let client = Client::new(server.url());
        let options = GetOptions::new().header(
            header::ACCEPT,
            HeaderValue::from_static("application/vnd.probe+json"),
        );
        client.get("/posts", options).await.unwrap();
        m.assert_async().await;
    }

    #[tokio::test]
    async fn transport_failure_carries_endpoint_context() {
        let client = Client::new(refused_url());
        let err = client.get("/posts", GetOptions::default()).await.unwrap_err();
        match err {
            Error::Transport { endpoint, .. } => assert_eq!(endpoint, "/posts"),
            other => panic!("expected transport error, got: {other}"),
        }
    }

    #[tokio::test]
    async fn concurrent_returns_every_envelope() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("GET", "/todos")
            .with_status(200)
            .with_body("[]")
            .expect(10)
            .create_async()
            .await;

        let client = Client::new(server.url());
        let responses = client.concurrent("/todos", 10).await.unwrap();
        m.assert_async().await;

        assert_eq!(responses.len(), 10);
        assert!(responses.iter().all(|res| res.status == StatusCode::OK));
    }

    #[tokio::test]
    async fn concurrent_rejects_the_whole_batch_on_failure() {
        let client = Client::new(refused_url());
        assert!(client.concurrent("/todos", 3).await.is_err());
    }

    #[tokio::test]
    async fn validate_response_time_returns_elapsed() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/posts")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let client = Client::new(server.url());
        let elapsed = client
            .validate_response_time("/posts", Duration::from_secs(30))
            .await
            .unwrap();
        assert!(elapsed > Duration::ZERO);
    }

    #[tokio::test]
    async fn validate_response_time_fails_over_the_ceiling() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/posts")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let client = Client::new(server.url());
        let result = client.validate_response_time("/posts", Duration::ZERO).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn validate_response_time_propagates_the_underlying_failure() {
        let client = Client::new(refused_url());
        let result = client
            .validate_response_time("/posts", Duration::from_secs(30))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn health_check_true_on_success() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/health")
            .with_status(200)
            .with_body(r#"{"status":"ok"}"#)
            .create_async()
            .await;

        let client = Client::new(server.url());
        assert!(client.health_check().await);
    }

    #[tokio::test]
    async fn health_check_swallows_transport_failures() {
        let client = Client::new(refused_url());
        assert!(!client.health_check().await);
    }

    #[tokio::test]
    async fn health_check_false_on_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/health")
            .with_status(503)
            .with_body(r#"{"error":"unhealthy"}"#)
            .create_async()
            .await;

        let client = Client::new(server.url());
        assert!(!client.health_check().await);
    }
}
