use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use super::error::ApiError;

pub const DEFAULT_BASE_URL: &str = "https://api.flagsmith.com/api/v1";

/// Flagsmith Admin API client
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: String,
    auth_header: String,
    retry_config: RetryConfig,
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub timeout_seconds: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 10000,
            timeout_seconds: 30,
        }
    }
}

impl RetryConfig {
    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2_u64.saturating_pow(attempt.saturating_sub(1));
        let backoff = self
            .initial_backoff_ms
            .saturating_mul(factor)
            .min(self.max_backoff_ms);
        Duration::from_millis(backoff)
    }
}

impl Client {
    /// Create a new API client with default configuration
    pub fn new(base_url: &str, master_api_key: &str) -> Result<Self, ApiError> {
        Self::with_config(base_url, master_api_key, RetryConfig::default())
    }

    /// Create a new API client with custom retry configuration
    pub fn with_config(
        base_url: &str,
        master_api_key: &str,
        retry_config: RetryConfig,
    ) -> Result<Self, ApiError> {
        let parsed = url::Url::parse(base_url).map_err(|e| ApiError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(retry_config.timeout_seconds))
            .user_agent(concat!("terraform-provider-flagsmith/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url: base_url.trim_end_matches('/').to_string(),
                auth_header: format!("Api-Key {}", master_api_key),
                retry_config,
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Feature operations
    pub fn features(&self) -> crate::api::features::FeaturesApi<'_> {
        crate::api::features::FeaturesApi::new(self)
    }

    /// Feature state operations
    pub fn feature_states(&self) -> crate::api::feature_states::FeatureStatesApi<'_> {
        crate::api::feature_states::FeatureStatesApi::new(self)
    }

    /// Project lookups
    pub fn projects(&self) -> crate::api::projects::ProjectsApi<'_> {
        crate::api::projects::ProjectsApi::new(self)
    }

    /// Execute a GET request with retry logic
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .execute_with_retry(|| self.request(Method::GET, path), path, true)
            .await?;
        self.parse_success_response(response).await
    }

    /// Execute a POST request. POST is never retried.
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .execute_with_retry(|| self.request(Method::POST, path).json(body), path, false)
            .await?;
        self.parse_success_response(response).await
    }

    /// Execute a PUT request with retry logic
    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .execute_with_retry(|| self.request(Method::PUT, path).json(body), path, true)
            .await?;
        self.parse_success_response(response).await
    }

    /// Execute a DELETE request with retry logic, the response body is ignored
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute_with_retry(|| self.request(Method::DELETE, path), path, true)
            .await
            .map(|_| ())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.inner.base_url, path);
        tracing::debug!("{} request to: {}", method, url);

        self.inner
            .http_client
            .request(method, url)
            .header(AUTHORIZATION, &self.inner.auth_header)
    }

    /// Send the request built by `request_fn`, retrying transient failures when `retry` is set
    async fn execute_with_retry<F>(
        &self,
        request_fn: F,
        path: &str,
        retry: bool,
    ) -> Result<reqwest::Response, ApiError>
    where
        F: Fn() -> RequestBuilder,
    {
        let config = &self.inner.retry_config;
        let max_retries = if retry { config.max_retries } else { 0 };
        let mut attempt = 0;
        let mut last_error = None;

        while attempt <= max_retries {
            if attempt > 0 {
                let backoff = config.backoff(attempt);
                tracing::debug!(
                    "Retrying request to {} after {:?} (attempt {})",
                    path,
                    backoff,
                    attempt
                );
                tokio::time::sleep(backoff).await;
            }

            match request_fn().send().await {
                Ok(response) => {
                    let status = response.status();
                    tracing::debug!("Response status for {}: {}", path, status);

                    if status.is_success() {
                        return Ok(response);
                    }

                    match status {
                        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                            return Err(ApiError::AuthError(status.as_u16()));
                        }
                        StatusCode::NOT_FOUND => {
                            return Err(ApiError::NotFound(path.to_string()));
                        }
                        StatusCode::TOO_MANY_REQUESTS => {
                            last_error = Some(ApiError::RateLimited);
                        }
                        s if s.is_server_error() => {
                            last_error = Some(ApiError::ServiceUnavailable);
                        }
                        _ => return Err(self.handle_error_response(response).await),
                    }
                }
                Err(e) => {
                    if e.is_timeout() {
                        last_error = Some(ApiError::Timeout(config.timeout_seconds));
                    } else if e.is_connect() {
                        last_error = Some(ApiError::ServiceUnavailable);
                    } else {
                        return Err(ApiError::RequestError(e));
                    }
                }
            }

            attempt += 1;
        }

        Err(last_error.unwrap_or(ApiError::ServiceUnavailable))
    }

    /// Parse successful response
    async fn parse_success_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let text = response.text().await?;
        tracing::debug!("API response body: {}", text);

        serde_json::from_str::<T>(&text).map_err(|e| {
            tracing::error!("Failed to deserialize response: {}, body: {}", e, text);
            ApiError::ParseError(e.to_string())
        })
    }

    /// Handle error response
    async fn handle_error_response(&self, response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        tracing::error!("API error response ({}): {}", status, message);

        ApiError::ApiError { status, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Project {
        id: i64,
    }

    fn fast_retries(max_retries: u32) -> RetryConfig {
        RetryConfig {
            max_retries,
            initial_backoff_ms: 1,
            max_backoff_ms: 5,
            timeout_seconds: 5,
        }
    }

    #[tokio::test]
    async fn client_sends_api_key_header() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/projects/1/")
            .match_header("authorization", "Api-Key secret")
            .with_body(r#"{"id": 1}"#)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "secret").unwrap();
        let project: Project = client.get("/projects/1/").await.unwrap();

        assert_eq!(project.id, 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn client_strips_trailing_slash_from_base_url() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/projects/1/")
            .with_body(r#"{"id": 1}"#)
            .create_async()
            .await;

        let client = Client::new(&format!("{}/", server.url()), "secret").unwrap();
        let _: Project = client.get("/projects/1/").await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn client_rejects_invalid_base_url() {
        assert!(matches!(
            Client::new("not a url", "secret"),
            Err(ApiError::InvalidUrl { .. })
        ));
        assert!(matches!(
            Client::new("ftp://api.flagsmith.com", "secret"),
            Err(ApiError::InvalidUrl { .. })
        ));
    }

    #[tokio::test]
    async fn client_maps_auth_failure() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/projects/1/")
            .with_status(401)
            .with_body(r#"{"detail": "Invalid API key"}"#)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "wrong").unwrap();
        let result: Result<Project, _> = client.get("/projects/1/").await;

        assert!(matches!(result, Err(ApiError::AuthError(401))));
    }

    #[tokio::test]
    async fn client_maps_not_found() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/projects/404/")
            .with_status(404)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "secret").unwrap();
        let result: Result<Project, _> = client.get("/projects/404/").await;

        let err = result.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn client_reports_bad_request_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("PUT", "/projects/1/")
            .with_status(400)
            .with_body(r#"{"name": ["This field is required."]}"#)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "secret").unwrap();
        let result: Result<Project, _> = client
            .put("/projects/1/", &serde_json::json!({}))
            .await;

        match result {
            Err(ApiError::ApiError { status, message }) => {
                assert_eq!(status, 400);
                assert!(message.contains("This field is required."));
            }
            other => panic!("Expected ApiError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn client_retries_server_errors() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/projects/1/")
            .with_status(503)
            .expect(3)
            .create_async()
            .await;

        let client = Client::with_config(&server.url(), "secret", fast_retries(2)).unwrap();
        let result: Result<Project, _> = client.get("/projects/1/").await;

        assert!(matches!(result, Err(ApiError::ServiceUnavailable)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn client_does_not_retry_post() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/projects/1/features/")
            .match_body(Matcher::Json(serde_json::json!({"name": "flag"})))
            .with_status(429)
            .expect(1)
            .create_async()
            .await;

        let client = Client::with_config(&server.url(), "secret", fast_retries(3)).unwrap();
        let result: Result<Project, _> = client
            .post("/projects/1/features/", &serde_json::json!({"name": "flag"}))
            .await;

        assert!(matches!(result, Err(ApiError::RateLimited)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn client_reports_unparseable_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/projects/1/")
            .with_body("not json")
            .create_async()
            .await;

        let client = Client::new(&server.url(), "secret").unwrap();
        let result: Result<Project, _> = client.get("/projects/1/").await;

        assert!(matches!(result, Err(ApiError::ParseError(_))));
    }

    #[tokio::test]
    async fn client_delete_ignores_empty_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("DELETE", "/projects/1/features/2/")
            .with_status(204)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "secret").unwrap();
        client.delete("/projects/1/features/2/").await.unwrap();

        mock.assert_async().await;
    }

    #[test]
    fn retry_backoff_is_capped() {
        let config = RetryConfig::default();
        assert_eq!(config.backoff(1), Duration::from_millis(100));
        assert_eq!(config.backoff(2), Duration::from_millis(200));
        assert_eq!(config.backoff(20), Duration::from_millis(10000));
    }
}
