//! API client for communicating with the gatehouse backend.
//!
//! This module provides the `ApiClient` struct for making JSON requests,
//! attaching the stored bearer token and normalizing error responses.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use super::ApiError;
use crate::auth::TokenStore;

/// API client for the gatehouse backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    store: Arc<dyn TokenStore>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// No timeout is applied unless one is given; the transport's own limits
    /// govern worst-case latency otherwise.
    pub fn new(
        base_url: &str,
        store: Arc<dyn TokenStore>,
        timeout: Option<Duration>,
    ) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            store,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The token store this client reads its bearer credential from.
    pub fn token_store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Build request headers, reading the token fresh from the store.
    fn auth_headers(&self) -> Result<(header::HeaderMap, bool), ApiError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        let token = self.store.read();
        if let Some(ref token) = token {
            let value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ApiError::InvalidRequest(format!("unusable bearer token: {}", e)))?;
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok((headers, token.is_some()))
    }

    /// Parse a response body, turning non-success statuses into `ApiError::Request`.
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
        path: &str,
    ) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            debug!(
                path = path,
                status = status.as_u16(),
                body = %ApiError::truncate_body(&body),
                "Request failed"
            );
            return Err(ApiError::from_status(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            warn!(path = path, status = status.as_u16(), error = %e, "Failed to parse JSON response");
            ApiError::fallback(status.as_u16())
        })
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        request: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<T, ApiError> {
        let (headers, has_token) = self.auth_headers()?;
        debug!(method = %method, path = path, has_token = has_token, "API request");

        let builder = self
            .client
            .request(method, self.url(path))
            .headers(headers);
        let response = request(builder).send().await?;

        Self::parse_response(response, path).await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(Method::GET, path, |b| b).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send(Method::POST, path, |b| b.json(body)).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send(Method::PUT, path, |b| b.json(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(Method::DELETE, path, |b| b).await
    }

    /// POST with query-string parameters and no body.
    pub async fn post_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T, ApiError> {
        self.send(Method::POST, path, |b| b.query(query)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryTokenStore;
    use serde_json::{json, Value};
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, store: Arc<MemoryTokenStore>) -> ApiClient {
        ApiClient::new(&server.uri(), store, None).expect("client builds")
    }

    #[tokio::test]
    async fn test_attaches_bearer_token_when_present() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .and(header("authorization", "Bearer T"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryTokenStore::with_token("T"));
        let client = client_for(&server, store);
        let body: Value = client.get("/auth/me").await.expect("request succeeds");
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn test_omits_authorization_without_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(json!({"email": "a@b.com", "password": "secret123"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(MemoryTokenStore::new()));
        let _: Value = client
            .post("/auth/login", &json!({"email": "a@b.com", "password": "secret123"}))
            .await
            .expect("request succeeds");

        let requests = server.received_requests().await.expect("recording enabled");
        assert_eq!(requests.len(), 1);
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_reads_token_fresh_for_each_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryTokenStore::new());
        let client = client_for(&server, store.clone());

        let _: Value = client.get("/auth/me").await.expect("first call");
        store.save("fresh").expect("memory save");
        let _: Value = client.get("/auth/me").await.expect("second call");
        store.clear().expect("memory clear");
        let _: Value = client.get("/auth/me").await.expect("third call");

        let requests = server.received_requests().await.expect("recording enabled");
        let auth: Vec<Option<String>> = requests
            .iter()
            .map(|r| {
                r.headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string)
            })
            .collect();
        assert_eq!(auth, vec![None, Some("Bearer fresh".to_string()), None]);
    }

    #[tokio::test]
    async fn test_error_status_carries_parsed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "success": false,
                "message": "Email already registered",
                "errors": [{"message": "duplicate", "code": "conflict"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(MemoryTokenStore::new()));
        let err = client
            .post::<Value, _>("/user", &json!({"email": "a@b.com"}))
            .await
            .expect_err("409 is an error");

        match err {
            ApiError::Request { status, message, body } => {
                assert_eq!(status, 409);
                assert_eq!(message, "Email already registered");
                assert_eq!(body["errors"][0]["code"], "conflict");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unparseable_error_body_uses_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/user/1"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(MemoryTokenStore::new()));
        let err = client.delete::<Value>("/user/1").await.expect_err("500 is an error");
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.to_string(), "Request failed (status 500)");
    }

    #[tokio::test]
    async fn test_unparseable_success_body_is_request_error() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/user/1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(MemoryTokenStore::new()));
        let err = client
            .put::<Value, _>("/user/1", &json!({"name": "Ada"}))
            .await
            .expect_err("unparseable body");
        assert!(matches!(err, ApiError::Request { status: 200, .. }));
    }

    #[tokio::test]
    async fn test_post_query_sends_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/nextauth-callback"))
            .and(query_param("email", "a@b.com"))
            .and(query_param("provider", "github"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(MemoryTokenStore::new()));
        let _: Value = client
            .post_query(
                "/auth/nextauth-callback",
                &[("email", "a@b.com"), ("provider", "github")],
            )
            .await
            .expect("request succeeds");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new(
            "https://api.example.com/",
            Arc::new(MemoryTokenStore::new()),
            Some(Duration::from_secs(5)),
        )
        .expect("client builds");
        assert_eq!(client.base_url(), "https://api.example.com");
        assert_eq!(client.url("/auth/me"), "https://api.example.com/auth/me");
    }
}
