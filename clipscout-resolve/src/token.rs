//! Anonymous credential cache.
//!
//! Strategy A authenticates with a short-lived guest token obtained from an
//! activation endpoint. The cache owns that token exclusively: strategies
//! read through [`TokenCache::token`] and report rejection through
//! [`TokenCache::invalidate`], never holding a token across requests.
//!
//! The refresh path is single-flighted: the token state sits behind an async
//! mutex that is held across the activation call, so concurrent cold readers
//! queue behind one in-flight refresh and then observe its result instead of
//! issuing their own.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use clipscout_core::ResolveError;

use crate::host::http::HttpClient;

/// Activation endpoint for anonymous guest sessions.
const ACTIVATION_URL: &str = "https://api.x.com/1.1/guest/activate.json";

/// Public application bearer used to authorize the activation call and the
/// guest metadata requests. This is the provider's published anonymous
/// credential, not a secret.
pub const ANONYMOUS_BEARER: &str = "AAAAAAAAAAAAAAAAAAAAANRILgAAAAAAnNwIzUejRCOuH5E6I8xnZz4puTs%3D1Zv7ttfk8LF81IUq16cHjhLTvJu4FA33AGWWjCpTnA";

/// Default time-to-live for cached tokens. Two hours, deliberately shorter
/// than the provider's own ~3h validity window.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(2 * 60 * 60);

// ============================================================================
// Access Token
// ============================================================================

/// A guest access token with its local expiry.
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// The token value.
    pub value: String,
    /// When the cache stops trusting this token.
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Returns true if the token is still within its TTL.
    pub fn is_fresh(&self) -> bool {
        Utc::now() < self.expires_at
    }
}

// ============================================================================
// Token Source
// ============================================================================

/// Backend that performs the actual activation call.
///
/// Injected into [`TokenCache`] so the refresh transport can be swapped in
/// tests.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Obtains a fresh guest token from the provider.
    async fn activate(&self) -> Result<String, ResolveError>;
}

/// Production token source: one POST to the guest activation endpoint.
pub struct GuestTokenSource {
    http: Arc<HttpClient>,
    activation_url: String,
}

impl GuestTokenSource {
    /// Creates a source against the default activation endpoint.
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self {
            http,
            activation_url: ACTIVATION_URL.to_string(),
        }
    }

    /// Overrides the activation endpoint (tests, regional mirrors).
    pub fn with_activation_url(mut self, url: impl Into<String>) -> Self {
        self.activation_url = url.into();
        self
    }
}

#[async_trait]
impl TokenSource for GuestTokenSource {
    #[instrument(skip(self))]
    async fn activate(&self) -> Result<String, ResolveError> {
        #[derive(serde::Deserialize)]
        struct Activation {
            guest_token: String,
        }

        let auth = format!("Bearer {ANONYMOUS_BEARER}");
        let response = self
            .http
            .post_empty_with_auth(&self.activation_url, &auth)
            .await?;

        if !response.status().is_success() {
            return Err(ResolveError::Transport(format!(
                "activation endpoint returned {}",
                response.status()
            )));
        }

        let activation: Activation = response.json().await?;
        if activation.guest_token.is_empty() {
            return Err(ResolveError::Transport(
                "activation endpoint returned an empty token".to_string(),
            ));
        }

        Ok(activation.guest_token)
    }
}

// ============================================================================
// Token Cache
// ============================================================================

/// Caches the anonymous access token with TTL, invalidation, and a
/// single-flighted refresh path.
pub struct TokenCache {
    source: Arc<dyn TokenSource>,
    ttl: Duration,
    state: Mutex<Option<AccessToken>>,
}

impl TokenCache {
    /// Creates a cache over the given source with the default 2h TTL.
    pub fn new(source: Arc<dyn TokenSource>) -> Self {
        Self::with_ttl(source, DEFAULT_TOKEN_TTL)
    }

    /// Creates a cache with a custom TTL.
    pub fn with_ttl(source: Arc<dyn TokenSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            state: Mutex::new(None),
        }
    }

    /// Returns a fresh token, refreshing through the source on miss or
    /// expiry.
    ///
    /// The state lock is held across the refresh, which is what makes the
    /// refresh single-flighted: every concurrent caller either sees the
    /// fresh token the first caller stored, or performs the one refresh
    /// itself.
    ///
    /// # Errors
    ///
    /// Propagates the source's failure (classified as transport) when a
    /// refresh is needed and fails.
    #[instrument(skip(self))]
    pub async fn token(&self) -> Result<AccessToken, ResolveError> {
        let mut state = self.state.lock().await;

        if let Some(token) = state.as_ref() {
            if token.is_fresh() {
                return Ok(token.clone());
            }
            debug!("cached guest token expired");
        }

        debug!("refreshing guest token");
        let value = self.source.activate().await?;
        let ttl = ChronoDuration::from_std(self.ttl)
            .unwrap_or_else(|_| ChronoDuration::hours(2));
        let token = AccessToken {
            value,
            expires_at: Utc::now() + ttl,
        };

        *state = Some(token.clone());
        Ok(token)
    }

    /// Drops the cached token so the next [`TokenCache::token`] call
    /// refreshes. Called by Strategy A when the provider rejects the
    /// credential; never fails.
    #[instrument(skip(self))]
    pub async fn invalidate(&self) {
        let mut state = self.state.lock().await;
        if state.take().is_some() {
            warn!("guest token invalidated after authorization failure");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
        delay: Duration,
    }

    impl CountingSource {
        fn new(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                delay,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TokenSource for CountingSource {
        async fn activate(&self) -> Result<String, ResolveError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(format!("token-{n}"))
        }
    }

    struct FailingSource;

    #[async_trait]
    impl TokenSource for FailingSource {
        async fn activate(&self) -> Result<String, ResolveError> {
            Err(ResolveError::Transport("activation down".into()))
        }
    }

    #[tokio::test]
    async fn test_token_is_cached() {
        let source = CountingSource::new(Duration::ZERO);
        let cache = TokenCache::new(source.clone());

        let first = cache.token().await.unwrap();
        let second = cache.token().await.unwrap();

        assert_eq!(first.value, second.value);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_cold_cache_refresh_is_single_flighted() {
        let source = CountingSource::new(Duration::from_millis(50));
        let cache = Arc::new(TokenCache::new(source.clone()));

        let a = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.token().await })
        };
        let b = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.token().await })
        };

        let ta = a.await.unwrap().unwrap();
        let tb = b.await.unwrap().unwrap();

        assert_eq!(ta.value, tb.value);
        assert_eq!(source.calls(), 1, "concurrent cold readers must share one refresh");
    }

    #[tokio::test]
    async fn test_invalidate_forces_refresh() {
        let source = CountingSource::new(Duration::ZERO);
        let cache = TokenCache::new(source.clone());

        let first = cache.token().await.unwrap();
        cache.invalidate().await;
        let second = cache.token().await.unwrap();

        assert_ne!(first.value, second.value);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_expired_token_refreshes() {
        let source = CountingSource::new(Duration::ZERO);
        let cache = TokenCache::with_ttl(source.clone(), Duration::ZERO);

        cache.token().await.unwrap();
        cache.token().await.unwrap();

        assert_eq!(source.calls(), 2, "zero TTL means every read refreshes");
    }

    #[tokio::test]
    async fn test_refresh_failure_propagates_without_poisoning() {
        let cache = TokenCache::new(Arc::new(FailingSource));

        let err = cache.token().await.unwrap_err();
        assert!(matches!(err, ResolveError::Transport(_)));

        // A later call is still able to attempt a refresh.
        let err = cache.token().await.unwrap_err();
        assert!(matches!(err, ResolveError::Transport(_)));
    }
}
