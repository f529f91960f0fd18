//! Resolve context providing shared collaborators to strategies.
//!
//! The context bundles the long-lived pieces every strategy may need: the
//! HTTP client, the credential cache, the browser instance pool, and the
//! settings values. All configuration enters here as values; nothing in
//! the resolution core reads environment variables.

use std::sync::Arc;
use std::time::Duration;

use clipscout_core::DEFAULT_ALLOWED_HOSTS;

use crate::host::chromium::ChromiumFactory;
use crate::host::http::HttpClient;
use crate::host::pool::InstancePool;
use crate::token::{DEFAULT_TOKEN_TTL, GuestTokenSource, TokenCache};

/// The browser pool used by the default context.
pub type BrowserPool = InstancePool<ChromiumFactory>;

// ============================================================================
// Resolve Settings
// ============================================================================

/// Settings for resolution requests.
#[derive(Debug, Clone)]
pub struct ResolveSettings {
    /// Maximum number of live browser instances.
    pub pool_size: usize,
    /// TTL for cached guest tokens.
    pub token_ttl: Duration,
    /// Timeout for the token-API metadata request.
    pub api_timeout: Duration,
    /// Timeout for the mirror-API request.
    pub mirror_timeout: Duration,
    /// Timeout for the browser page navigation.
    pub page_load_timeout: Duration,
    /// Overall bound on one browser-strategy attempt.
    pub browser_timeout: Duration,
    /// Delay after navigation before the player click and DOM scan.
    pub settle_delay: Duration,
    /// Hosts accepted for input post URLs.
    pub allowed_hosts: Vec<String>,
}

impl Default for ResolveSettings {
    fn default() -> Self {
        Self {
            pool_size: 2,
            token_ttl: DEFAULT_TOKEN_TTL,
            api_timeout: Duration::from_secs(10),
            mirror_timeout: Duration::from_secs(10),
            page_load_timeout: Duration::from_secs(15),
            browser_timeout: Duration::from_secs(45),
            settle_delay: Duration::from_secs(3),
            allowed_hosts: DEFAULT_ALLOWED_HOSTS
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

impl ResolveSettings {
    /// Sets the browser pool size.
    pub fn with_pool_size(mut self, size: usize) -> Self {
        self.pool_size = size.max(1);
        self
    }

    /// Sets a uniform timeout for both API strategies.
    pub fn with_api_timeouts(mut self, timeout: Duration) -> Self {
        self.api_timeout = timeout;
        self.mirror_timeout = timeout;
        self
    }

    /// Replaces the host allow-list.
    pub fn with_allowed_hosts(mut self, hosts: Vec<String>) -> Self {
        self.allowed_hosts = hosts;
        self
    }
}

// ============================================================================
// Resolve Context
// ============================================================================

/// Shared collaborators injected into every strategy.
///
/// The credential cache and the instance pool are the only shared mutable
/// state in the pipeline; both are safe under concurrent resolution
/// requests.
pub struct ResolveContext {
    /// HTTP client for the API strategies and the token cache.
    pub http: Arc<HttpClient>,
    /// Anonymous credential cache (Strategy A).
    pub tokens: Arc<TokenCache>,
    /// Bounded browser instance pool (Strategy C).
    pub pool: Arc<BrowserPool>,
    /// Settings values.
    pub settings: ResolveSettings,
}

impl ResolveContext {
    /// Creates a context with default settings.
    pub fn new() -> Self {
        Self::with_settings(ResolveSettings::default())
    }

    /// Creates a context from settings, wiring up default collaborators.
    pub fn with_settings(settings: ResolveSettings) -> Self {
        let http = Arc::new(HttpClient::with_timeout(settings.api_timeout));
        let tokens = Arc::new(TokenCache::with_ttl(
            Arc::new(GuestTokenSource::new(http.clone())),
            settings.token_ttl,
        ));
        let pool = InstancePool::new(ChromiumFactory::new(), settings.pool_size);

        Self {
            http,
            tokens,
            pool,
            settings,
        }
    }

    /// Creates a builder for customizing collaborators.
    pub fn builder() -> ResolveContextBuilder {
        ResolveContextBuilder::new()
    }

    /// Tears down the browser pool. Called once at process exit.
    pub async fn shutdown(&self) {
        self.pool.shutdown().await;
    }
}

impl Default for ResolveContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ResolveContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolveContext")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Resolve Context Builder
// ============================================================================

/// Builder for constructing a [`ResolveContext`] with custom collaborators.
pub struct ResolveContextBuilder {
    http: Option<Arc<HttpClient>>,
    tokens: Option<Arc<TokenCache>>,
    pool: Option<Arc<BrowserPool>>,
    settings: ResolveSettings,
}

impl ResolveContextBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            http: None,
            tokens: None,
            pool: None,
            settings: ResolveSettings::default(),
        }
    }

    /// Sets the HTTP client.
    pub fn http(mut self, http: Arc<HttpClient>) -> Self {
        self.http = Some(http);
        self
    }

    /// Sets the credential cache.
    pub fn tokens(mut self, tokens: Arc<TokenCache>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Sets the browser pool.
    pub fn pool(mut self, pool: Arc<BrowserPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Sets the settings values.
    pub fn settings(mut self, settings: ResolveSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Builds the context, defaulting any collaborator not set.
    pub fn build(self) -> ResolveContext {
        let http = self
            .http
            .unwrap_or_else(|| Arc::new(HttpClient::with_timeout(self.settings.api_timeout)));
        let tokens = self.tokens.unwrap_or_else(|| {
            Arc::new(TokenCache::with_ttl(
                Arc::new(GuestTokenSource::new(http.clone())),
                self.settings.token_ttl,
            ))
        });
        let pool = self
            .pool
            .unwrap_or_else(|| InstancePool::new(ChromiumFactory::new(), self.settings.pool_size));

        ResolveContext {
            http,
            tokens,
            pool,
            settings: self.settings,
        }
    }
}

impl Default for ResolveContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
