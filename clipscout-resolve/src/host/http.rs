//! HTTP client with tracing and per-request timeouts.
//!
//! Thin wrapper over reqwest used by the token cache and the API-backed
//! strategies. Dropping the returned future cancels the in-flight request,
//! which is how caller-level cancellation propagates to the network layer.

use reqwest::{Client, Response, header, header::HeaderMap};
use std::time::Duration;
use tracing::{debug, instrument};

use clipscout_core::ResolveError;

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// User agent string for outbound API calls.
const USER_AGENT: &str = concat!("clipscout/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// HTTP Client
// ============================================================================

/// HTTP client wrapper with tracing and explicit timeouts.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    timeout: Duration,
}

impl HttpClient {
    /// Creates a new HTTP client with the default 10s timeout.
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a new HTTP client with a custom default timeout.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built, which only happens when the
    /// system TLS configuration is fundamentally broken and no network
    /// operation could succeed anyway.
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|e| panic!("failed to create HTTP client: {e}"));

        Self {
            inner: client,
            timeout,
        }
    }

    /// The client's default timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Performs a GET request.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Transport`] on connection or timeout failure.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn get(&self, url: &str) -> Result<Response, ResolveError> {
        debug!("GET request");
        let response = self.inner.get(url).send().await?;
        debug!(status = %response.status(), "response received");
        Ok(response)
    }

    /// Performs a GET request with an explicit per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Transport`] on connection or timeout failure.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn get_with_timeout(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<Response, ResolveError> {
        debug!(?timeout, "GET request");
        let response = self.inner.get(url).timeout(timeout).send().await?;
        debug!(status = %response.status(), "response received");
        Ok(response)
    }

    /// Performs a GET request with custom headers.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Transport`] on connection or timeout failure.
    #[instrument(skip(self, headers), fields(url = %url))]
    pub async fn get_with_headers(
        &self,
        url: &str,
        headers: HeaderMap,
    ) -> Result<Response, ResolveError> {
        debug!("GET request with headers");
        let response = self.inner.get(url).headers(headers).send().await?;
        debug!(status = %response.status(), "response received");
        Ok(response)
    }

    /// Performs a POST request with an authorization header and no body.
    ///
    /// Used by the guest-token activation call.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Transport`] on connection or timeout failure.
    #[instrument(skip(self, auth_header), fields(url = %url))]
    pub async fn post_empty_with_auth(
        &self,
        url: &str,
        auth_header: &str,
    ) -> Result<Response, ResolveError> {
        debug!("POST request with auth");
        let response = self
            .inner
            .post(url)
            .header(header::AUTHORIZATION, auth_header)
            .header(header::CONTENT_LENGTH, 0)
            .send()
            .await?;
        debug!(status = %response.status(), "response received");
        Ok(response)
    }

    /// Returns the inner reqwest client for advanced request building.
    pub fn inner(&self) -> &Client {
        &self.inner
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
