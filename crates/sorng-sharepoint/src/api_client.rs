//! HTTP client for the Microsoft Graph API.
//!
//! Wraps `reqwest::Client` with Bearer-token injection, a per-request
//! `client-request-id`, and JSON body parsing. Each call is a single
//! attempt; failures are reported, never retried.

use crate::error::{SharePointError, SharePointResult};
use crate::types::SharePointConfig;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::Method;
use std::time::Duration;

/// Correlation header Graph echoes back in its logs.
pub const CLIENT_REQUEST_ID_HEADER: &str = "client-request-id";

/// Low-level Graph API HTTP client.
#[derive(Debug, Clone)]
pub struct GraphApiClient {
    inner: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl GraphApiClient {
    /// Create a client around an already-acquired access token.
    pub fn new(config: &SharePointConfig, access_token: &str) -> SharePointResult<Self> {
        url::Url::parse(&config.graph_base_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Ok(ua) = HeaderValue::from_str(&config.user_agent) {
            headers.insert(USER_AGENT, ua);
        }

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(secs) = config.timeout_sec {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let inner = builder.build().map_err(|e| {
            SharePointError::internal(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self {
            inner,
            base_url: config.graph_base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        })
    }

    /// Full URL for a Graph endpoint path. Absolute URLs (e.g.
    /// `@odata.nextLink`) pass through untouched.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("https://") || path.starts_with("http://") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    /// Issue one request and parse the JSON body. `204 No Content` and
    /// empty bodies yield `Value::Null`.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&serde_json::Value>,
        headers: &[(&str, &str)],
    ) -> SharePointResult<serde_json::Value> {
        let url = self.url(path);
        let request_id = uuid::Uuid::new_v4().to_string();
        debug!("{} {} [{}={}]", method, url, CLIENT_REQUEST_ID_HEADER, request_id);

        let mut req = self
            .inner
            .request(method, &url)
            .bearer_auth(&self.access_token)
            .header(CLIENT_REQUEST_ID_HEADER, &request_id);
        if !query.is_empty() {
            req = req.query(query);
        }
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        req = match body {
            Some(b) => req.json(b),
            None => req,
        };

        let resp = req
            .send()
            .await
            .map_err(|e| SharePointError::from(e).with_request_id(&request_id))?;

        self.handle_response(resp)
            .await
            .map_err(|e| e.with_request_id(&request_id))
    }

    /// POST JSON body.
    pub async fn post(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> SharePointResult<serde_json::Value> {
        self.send(Method::POST, path, &[], Some(body), &[]).await
    }

    // ─── Internal ────────────────────────────────────────────────────

    async fn handle_response(
        &self,
        resp: reqwest::Response,
    ) -> SharePointResult<serde_json::Value> {
        let status = resp.status().as_u16();
        let is_json = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("json"))
            .unwrap_or(true);
        let body = resp.text().await?;

        debug!("Response status={} body_len={}", status, body.len());

        if status >= 400 {
            return Err(SharePointError::from_graph_response(status, &body));
        }

        if body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }

        if !is_json {
            return Ok(serde_json::Value::String(body));
        }

        serde_json::from_str(&body).map_err(SharePointError::from)
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::SharePointErrorCode;
    use serde_json::json;
    use wiremock::matchers::{header, header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GraphApiClient {
        let config = SharePointConfig {
            graph_base_url: server.uri(),
            ..SharePointConfig::default()
        };
        GraphApiClient::new(&config, "tok").unwrap()
    }

    #[test]
    fn test_url_building() {
        let config = SharePointConfig::default();
        let client = GraphApiClient::new(&config, "tok").unwrap();
        assert_eq!(
            client.url("/sites/root"),
            "https://graph.microsoft.com/v1.0/sites/root"
        );
        assert_eq!(
            client.url("sites/root"),
            "https://graph.microsoft.com/v1.0/sites/root"
        );
        assert_eq!(
            client.url("https://graph.microsoft.com/v1.0/sites?$skiptoken=abc"),
            "https://graph.microsoft.com/v1.0/sites?$skiptoken=abc"
        );
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let config = SharePointConfig {
            graph_base_url: "not a url".into(),
            ..SharePointConfig::default()
        };
        let err = GraphApiClient::new(&config, "tok").unwrap_err();
        assert_eq!(err.code, SharePointErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn test_get_sends_auth_query_and_request_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sites/root"))
            .and(header("authorization", "Bearer tok"))
            .and(header_exists(CLIENT_REQUEST_ID_HEADER))
            .and(query_param("$select", "id,webUrl"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "root"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let v = client
            .send(
                Method::GET,
                "sites/root",
                &[("$select".into(), "id,webUrl".into())],
                None,
                &[],
            )
            .await
            .unwrap();
        assert_eq!(v["id"], "root");
    }

    #[tokio::test]
    async fn test_error_status_is_parsed_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sites/missing"))
            .respond_with(ResponseTemplate::new(503).set_body_json(json!({
                "error": {"code": "serviceNotAvailable", "message": "Try later"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .send(Method::GET, "sites/missing", &[], None, &[])
            .await
            .unwrap_err();
        assert_eq!(err.code, SharePointErrorCode::InternalError);
        assert_eq!(err.best_message(), "Try later");
        assert!(err.request_id.is_some());
    }

    #[tokio::test]
    async fn test_no_content_is_null() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/sites/s1/lists/l1"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let v = client
            .send(Method::DELETE, "sites/s1/lists/l1", &[], None, &[])
            .await
            .unwrap();
        assert!(v.is_null());
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sites/s1/lists"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "new-list"})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let v = client
            .post("sites/s1/lists", &json!({"displayName": "Tasks"}))
            .await
            .unwrap();
        assert_eq!(v["id"], "new-list");
    }

    #[tokio::test]
    async fn test_connection_failure_is_network_error() {
        let config = SharePointConfig {
            graph_base_url: "http://127.0.0.1:1".into(),
            ..SharePointConfig::default()
        };
        let client = GraphApiClient::new(&config, "tok").unwrap();
        let err = client
            .send(Method::GET, "sites/root", &[], None, &[])
            .await
            .unwrap_err();
        assert!(matches!(
            err.code,
            SharePointErrorCode::NetworkError | SharePointErrorCode::InternalError
        ));
        assert!(err.request_id.is_some());
    }

    #[tokio::test]
    async fn test_truncated_body_is_transport_error() {
        let config = SharePointConfig {
            graph_base_url: truncating_server().await,
            ..SharePointConfig::default()
        };
        let client = GraphApiClient::new(&config, "tok").unwrap();
        let err = client
            .send(Method::GET, "sites/root", &[], None, &[])
            .await
            .unwrap_err();
        assert_eq!(err.code, SharePointErrorCode::InternalError);
        assert!(err.message.starts_with("HTTP error"));
        assert!(err.request_id.is_some());
    }

    /// One-shot server that promises a longer body than it sends.
    pub(crate) async fn truncating_server() -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 100\r\n\r\n{\"value\": [",
                )
                .await;
            let _ = socket.shutdown().await;
        });
        format!("http://{}", addr)
    }
}
