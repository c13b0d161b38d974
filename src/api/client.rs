use std::sync::Arc;
use std::time::Duration;

use reqwest::{RequestBuilder, Response};
use tracing::debug;

use super::error::ApiError;
use super::types::{Post, UserIdentity};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
// The recommender endpoints compute on request and can be slow.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the MastoRadar backend. Cheap to clone.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Arc<str>,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::HttpStatus(
                status.as_u16(),
                status.canonical_reason().unwrap_or("").into(),
            ));
        }
        Ok(response)
    }

    /// Asks the backend for the OAuth authorization URL.
    ///
    /// The backend serializes the URL as a JSON string, so surrounding quotes
    /// are stripped; a plain-text body is accepted as well.
    pub async fn login_url(&self) -> Result<String, ApiError> {
        let body = Self::send(self.http.get(self.url("/login")))
            .await?
            .text()
            .await?;
        let url = body.trim().trim_matches('"').to_string();
        if url.is_empty() {
            return Err(ApiError::Parse("empty authorization URL".into()));
        }
        Ok(url)
    }

    /// Resolves the identity behind `token`.
    pub async fn fetch_user(&self, token: &str) -> Result<UserIdentity, ApiError> {
        let request = self
            .http
            .get(self.url("/getuser"))
            .query(&[("access_token", token)])
            .bearer_auth(token);
        let user = Self::send(request).await?.json().await?;
        Ok(user)
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        Self::send(self.http.post(self.url("/logout"))).await?;
        Ok(())
    }

    /// Fetches one timeline. `credential` is attached as a bearer header when given.
    pub async fn fetch_timeline(
        &self,
        endpoint: &str,
        limit: usize,
        credential: Option<&str>,
    ) -> Result<Vec<Post>, ApiError> {
        debug!(endpoint, limit, auth = credential.is_some(), "fetching timeline");
        let mut request = self
            .http
            .get(self.url(endpoint))
            .query(&[("limit", limit)]);
        if let Some(token) = credential {
            request = request.bearer_auth(token);
        }
        let posts = Self::send(request).await?.json().await?;
        Ok(posts)
    }
}

impl Default for BackendClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
