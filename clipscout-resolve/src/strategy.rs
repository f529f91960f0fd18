//! Resolve strategy trait and types.
//!
//! A strategy is one self-contained extraction technique in the fallback
//! chain. Strategies are tried in fixed cost order: the token API is
//! cheapest, the mirror API is an independent second opinion, and browser
//! automation is the expensive last resort.

use async_trait::async_trait;
use clipscout_core::{ContentReference, RawVariant, ResolveError, StrategyKind};

use crate::context::ResolveContext;

// ============================================================================
// Strategy Yield
// ============================================================================

/// What a successful strategy hands to the normalizer.
///
/// `variants` may still be empty here; the orchestrator is the single place
/// that rejects empty output, so strategies don't each re-implement the
/// non-empty invariant.
#[derive(Debug, Clone, Default)]
pub struct StrategyYield {
    /// Raw variant records found by the strategy.
    pub variants: Vec<RawVariant>,
    /// Thumbnail URL, best-effort.
    pub thumbnail: Option<String>,
    /// Duration in milliseconds, best-effort.
    pub duration_ms: Option<u64>,
    /// Post text, best-effort.
    pub text: Option<String>,
    /// Author handle as reported by the provider, when it differs from
    /// the parsed reference (e.g. after a handle change).
    pub author: Option<String>,
}

impl StrategyYield {
    /// Creates a yield carrying only variants.
    pub fn with_variants(variants: Vec<RawVariant>) -> Self {
        Self {
            variants,
            ..Self::default()
        }
    }
}

// ============================================================================
// Resolve Strategy Trait
// ============================================================================

/// One extraction technique in the fallback chain.
///
/// ## Implementing a Strategy
///
/// ```ignore
/// struct MirrorStrategy;
///
/// #[async_trait]
/// impl ResolveStrategy for MirrorStrategy {
///     fn kind(&self) -> StrategyKind {
///         StrategyKind::MirrorApi
///     }
///
///     async fn resolve(
///         &self,
///         ctx: &ResolveContext,
///         reference: &ContentReference,
///     ) -> Result<StrategyYield, ResolveError> {
///         let response = ctx
///             .http
///             .get_with_timeout(&self.endpoint(reference), ctx.settings.mirror_timeout)
///             .await?;
///         // Parse the body and return a StrategyYield
///     }
/// }
/// ```
#[async_trait]
pub trait ResolveStrategy: Send + Sync {
    /// Which strategy this is. Also supplies the stable id used in
    /// attempt records and exhaustion reports.
    fn kind(&self) -> StrategyKind;

    /// Stable identifier for this strategy.
    fn id(&self) -> &'static str {
        self.kind().id()
    }

    /// Attempts to resolve media for the given reference.
    ///
    /// Implementations classify every failure into [`ResolveError`] before
    /// returning; nothing unclassified may escape.
    async fn resolve(
        &self,
        ctx: &ResolveContext,
        reference: &ContentReference,
    ) -> Result<StrategyYield, ResolveError>;

    /// Whether the orchestrator should try the next strategy after this
    /// error. Only a provider-confirmed unavailable state halts the chain;
    /// auth failures, missing media, and transport errors all fall through.
    fn should_fallback(&self, error: &ResolveError) -> bool {
        !error.is_terminal()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopStrategy;

    #[async_trait]
    impl ResolveStrategy for NoopStrategy {
        fn kind(&self) -> StrategyKind {
            StrategyKind::MirrorApi
        }

        async fn resolve(
            &self,
            _ctx: &ResolveContext,
            _reference: &ContentReference,
        ) -> Result<StrategyYield, ResolveError> {
            Ok(StrategyYield::default())
        }
    }

    #[test]
    fn test_default_id_comes_from_kind() {
        let s = NoopStrategy;
        assert_eq!(s.id(), "mirror_api");
    }

    #[test]
    fn test_default_fallback_policy() {
        let s = NoopStrategy;
        assert!(s.should_fallback(&ResolveError::NoMediaFound("x".into())));
        assert!(s.should_fallback(&ResolveError::AuthExpired("401".into())));
        assert!(s.should_fallback(&ResolveError::Transport("down".into())));
        assert!(!s.should_fallback(&ResolveError::ContentUnavailable("deleted".into())));
    }
}
