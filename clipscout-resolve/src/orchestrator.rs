//! Resolution orchestrator.
//!
//! The orchestrator owns the top-level control flow: parse the reference,
//! try strategies in fixed cost order, record every failure, and return the
//! first success or an aggregate error naming each strategy's failure.

use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use clipscout_core::{
    ContentReference, ExtractionResult, ResolveError, StrategyFailure, error::ExhaustionReport,
    normalize_variants,
};

use crate::context::ResolveContext;
use crate::strategy::{ResolveStrategy, StrategyYield};

// ============================================================================
// Strategy Attempt
// ============================================================================

/// Record of a single strategy attempt.
#[derive(Debug, Clone)]
pub struct StrategyAttempt {
    /// The strategy id that was attempted.
    pub strategy: String,
    /// Whether the attempt succeeded.
    pub success: bool,
    /// Error if the attempt failed.
    pub error: Option<String>,
    /// How long the attempt took.
    pub duration: Duration,
}

impl StrategyAttempt {
    fn success(strategy: &str, duration: Duration) -> Self {
        Self {
            strategy: strategy.to_string(),
            success: true,
            error: None,
            duration,
        }
    }

    fn failure(strategy: &str, error: &ResolveError, duration: Duration) -> Self {
        Self {
            strategy: strategy.to_string(),
            success: false,
            error: Some(error.to_string()),
            duration,
        }
    }
}

// ============================================================================
// Resolve Outcome
// ============================================================================

/// The outcome of one resolution request, including diagnostics.
#[derive(Debug)]
pub struct ResolveOutcome {
    /// The result (success or final error).
    pub result: Result<ExtractionResult, ResolveError>,
    /// All strategy attempts made, in order.
    pub attempts: Vec<StrategyAttempt>,
    /// Total duration of the request.
    pub duration: Duration,
}

impl ResolveOutcome {
    /// Returns true if resolution succeeded.
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// The strategy that produced the result, if any.
    pub fn successful_strategy(&self) -> Option<&str> {
        self.attempts
            .iter()
            .find(|a| a.success)
            .map(|a| a.strategy.as_str())
    }
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Executes the strategy chain for resolution requests.
///
/// Strategies run in the order given (cheapest first). Only two errors end
/// the chain early: an invalid reference (nothing is attempted) and a
/// provider-confirmed unavailable state (later strategies would fail
/// identically). Everything else falls through to the next strategy.
pub struct Orchestrator {
    ctx: ResolveContext,
    strategies: Vec<Box<dyn ResolveStrategy>>,
}

impl Orchestrator {
    /// Creates an orchestrator over the given context and strategy chain.
    pub fn with_strategies(ctx: ResolveContext, strategies: Vec<Box<dyn ResolveStrategy>>) -> Self {
        Self { ctx, strategies }
    }

    /// The shared context.
    pub fn context(&self) -> &ResolveContext {
        &self.ctx
    }

    /// Resolves a post URL to its ranked media variants.
    ///
    /// # Errors
    ///
    /// One clearly-typed [`ResolveError`]; see the crate error taxonomy.
    pub async fn resolve(&self, url: &str) -> Result<ExtractionResult, ResolveError> {
        self.resolve_outcome(url).await.result
    }

    /// Resolves with full attempt diagnostics.
    #[instrument(skip(self), fields(strategies = self.strategies.len()))]
    pub async fn resolve_outcome(&self, url: &str) -> ResolveOutcome {
        let start = Instant::now();
        let mut attempts = Vec::new();

        let reference = match ContentReference::parse(url, &self.ctx.settings.allowed_hosts) {
            Ok(reference) => reference,
            Err(error) => {
                debug!(error = %error, "reference rejected");
                return ResolveOutcome {
                    result: Err(error),
                    attempts,
                    duration: start.elapsed(),
                };
            }
        };

        info!(reference = %reference, "resolving");

        let mut failures = Vec::new();

        for strategy in &self.strategies {
            let id = strategy.id();
            let attempt_start = Instant::now();
            debug!(strategy = id, "executing strategy");

            match strategy.resolve(&self.ctx, &reference).await {
                Ok(yield_) => {
                    let duration = attempt_start.elapsed();
                    match Self::finish(&reference, yield_) {
                        Ok(result) => {
                            info!(
                                strategy = id,
                                variants = result.variants.len(),
                                ?duration,
                                "strategy succeeded"
                            );
                            attempts.push(StrategyAttempt::success(id, duration));
                            return ResolveOutcome {
                                result: Ok(result),
                                attempts,
                                duration: start.elapsed(),
                            };
                        }
                        Err(error) => {
                            // Completed but empty: treated like any other
                            // no-media failure so the next strategy runs.
                            warn!(strategy = id, error = %error, "strategy produced no variants");
                            attempts.push(StrategyAttempt::failure(id, &error, duration));
                            failures.push(StrategyFailure::new(id, error.to_string()));
                        }
                    }
                }
                Err(error) => {
                    let duration = attempt_start.elapsed();
                    warn!(strategy = id, error = %error, ?duration, "strategy failed");
                    attempts.push(StrategyAttempt::failure(id, &error, duration));

                    if !strategy.should_fallback(&error) {
                        debug!(strategy = id, "terminal error, skipping remaining strategies");
                        return ResolveOutcome {
                            result: Err(error),
                            attempts,
                            duration: start.elapsed(),
                        };
                    }
                    failures.push(StrategyFailure::new(id, error.to_string()));
                }
            }
        }

        warn!(reference = %reference, "all strategies failed");
        ResolveOutcome {
            result: Err(ResolveError::StrategyExhausted(ExhaustionReport::new(
                failures,
            ))),
            attempts,
            duration: start.elapsed(),
        }
    }

    /// Normalizes a yield into the public result, rejecting empty output.
    fn finish(
        reference: &ContentReference,
        yield_: StrategyYield,
    ) -> Result<ExtractionResult, ResolveError> {
        let variants = normalize_variants(yield_.variants);
        if variants.is_empty() {
            return Err(ResolveError::NoMediaFound(
                "strategy completed without usable media".to_string(),
            ));
        }

        Ok(ExtractionResult {
            variants,
            thumbnail: yield_.thumbnail,
            duration_ms: yield_.duration_ms,
            author: yield_.author.unwrap_or_else(|| reference.handle.clone()),
            content_id: reference.content_id.clone(),
            text: yield_.text,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
