//! Strategy A: token-authenticated metadata API.

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use tracing::{debug, instrument, warn};

use clipscout_core::{ContentReference, ResolveError, StrategyKind};
use clipscout_resolve::{ANONYMOUS_BEARER, ResolveContext, ResolveStrategy, StrategyYield};

use super::parser;

/// Status metadata endpoint.
const STATUS_URL: &str = "https://api.x.com/1.1/statuses/show.json";

/// Header carrying the guest token alongside the application bearer.
const GUEST_TOKEN_HEADER: &str = "x-guest-token";

/// Resolves media through the provider's own status endpoint using an
/// anonymous guest session.
///
/// Cheapest and most reliable strategy: one metadata request returns every
/// rendition with exact bitrates. Its weakness is the credential: a
/// rejected token invalidates the shared cache and yields to the next
/// strategy rather than retrying in place.
#[derive(Debug, Clone, Default)]
pub struct TokenApiStrategy {
    endpoint: String,
}

impl TokenApiStrategy {
    /// Creates the strategy against the default endpoint.
    pub fn new() -> Self {
        Self {
            endpoint: STATUS_URL.to_string(),
        }
    }

    /// Overrides the metadata endpoint (tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn request_url(&self, reference: &ContentReference) -> String {
        format!(
            "{}?id={}&tweet_mode=extended&include_entities=true",
            self.endpoint, reference.content_id
        )
    }

    fn auth_headers(token: &str) -> Result<HeaderMap, ResolveError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {ANONYMOUS_BEARER}"))
                .map_err(|e| ResolveError::transport(format!("invalid bearer header: {e}")))?,
        );
        headers.insert(
            GUEST_TOKEN_HEADER,
            HeaderValue::from_str(token)
                .map_err(|e| ResolveError::transport(format!("invalid guest token header: {e}")))?,
        );
        Ok(headers)
    }
}

#[async_trait]
impl ResolveStrategy for TokenApiStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::TokenApi
    }

    #[instrument(skip(self, ctx), fields(content_id = %reference.content_id))]
    async fn resolve(
        &self,
        ctx: &ResolveContext,
        reference: &ContentReference,
    ) -> Result<StrategyYield, ResolveError> {
        let token = ctx.tokens.token().await?;
        let headers = Self::auth_headers(&token.value)?;

        let response = ctx
            .http
            .get_with_headers(&self.request_url(reference), headers)
            .await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            warn!(%status, "guest token rejected");
            ctx.tokens.invalidate().await;
            return Err(ResolveError::AuthExpired(format!(
                "metadata endpoint returned {status}"
            )));
        }

        let body = response.text().await?;

        if !status.is_success() {
            let codes = parser::error_codes(&body);
            if let Some(code) = codes.iter().find(|c| parser::is_unavailable_code(**c)) {
                return Err(ResolveError::ContentUnavailable(format!(
                    "provider error code {code}"
                )));
            }
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(ResolveError::ContentUnavailable(
                    "status does not exist".to_string(),
                ));
            }
            return Err(ResolveError::NoMediaFound(format!(
                "metadata endpoint returned {status}"
            )));
        }

        let parsed = serde_json::from_str(&body)?;
        let out = parser::yield_from_status(parsed);
        debug!(variants = out.variants.len(), "metadata endpoint parsed");
        Ok(out)
    }
}

// ============================================================================
// Tests
// ============================================================================
