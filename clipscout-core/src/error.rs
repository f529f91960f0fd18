//! Error taxonomy for clipscout resolution.
//!
//! Every strategy classifies its own failures into [`ResolveError`] before
//! returning; the orchestrator never sees an unclassified error. Only
//! [`ResolveError::InvalidReference`] and [`ResolveError::ContentUnavailable`]
//! bypass the fallback chain; everything else is recoverable by trying the
//! next strategy.

use std::fmt;
use thiserror::Error;

// ============================================================================
// Resolve Error
// ============================================================================

/// Typed failure taxonomy for a resolution request.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The input URL does not name a supported post. Terminal; no
    /// strategies are attempted.
    #[error("invalid content reference: {0}")]
    InvalidReference(String),

    /// The provider confirmed the content is deleted or restricted.
    /// Terminal; remaining strategies are skipped since they would fail
    /// identically.
    #[error("content unavailable: {0}")]
    ContentUnavailable(String),

    /// The cached credential was rejected. The token cache has already
    /// been invalidated; the orchestrator proceeds to the next strategy.
    #[error("access token rejected: {0}")]
    AuthExpired(String),

    /// The strategy completed but found no usable media.
    #[error("no media found: {0}")]
    NoMediaFound(String),

    /// Network or timeout failure reaching a dependency, or any
    /// otherwise-unclassified failure inside a strategy.
    #[error("transport error: {0}")]
    Transport(String),

    /// Every strategy failed. Carries the ordered list of per-strategy
    /// failures so operators can tell a provider shape change apart from
    /// a network outage or pool exhaustion.
    #[error("all strategies failed: {0}")]
    StrategyExhausted(ExhaustionReport),
}

impl ResolveError {
    /// Returns true if this error ends the resolution immediately, with
    /// no further strategies attempted.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::InvalidReference(_) | Self::ContentUnavailable(_)
        )
    }

    /// Wraps an arbitrary failure as a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }
}

impl From<reqwest::Error> for ResolveError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Transport(format!("request timed out: {err}"))
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ResolveError {
    fn from(err: serde_json::Error) -> Self {
        Self::Transport(format!("malformed response body: {err}"))
    }
}

// ============================================================================
// Strategy Failure Report
// ============================================================================

/// One strategy's failure, recorded in order of attempt.
#[derive(Debug, Clone)]
pub struct StrategyFailure {
    /// Strategy identifier (e.g. `"token_api"`).
    pub strategy: String,
    /// The failure message produced by that strategy.
    pub message: String,
}

impl StrategyFailure {
    /// Creates a failure record.
    pub fn new(strategy: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            strategy: strategy.into(),
            message: message.into(),
        }
    }
}

/// Ordered collection of per-strategy failures carried by
/// [`ResolveError::StrategyExhausted`].
#[derive(Debug, Clone, Default)]
pub struct ExhaustionReport {
    /// Failures in the order the strategies were attempted.
    pub failures: Vec<StrategyFailure>,
}

impl ExhaustionReport {
    /// Creates a report from recorded failures.
    pub fn new(failures: Vec<StrategyFailure>) -> Self {
        Self { failures }
    }
}

impl fmt::Display for ExhaustionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.failures.is_empty() {
            return write!(f, "no strategies attempted");
        }
        for (i, failure) in self.failures.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", failure.strategy, failure.message)?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_classification() {
        assert!(ResolveError::InvalidReference("x".into()).is_terminal());
        assert!(ResolveError::ContentUnavailable("gone".into()).is_terminal());
        assert!(!ResolveError::AuthExpired("401".into()).is_terminal());
        assert!(!ResolveError::NoMediaFound("none".into()).is_terminal());
        assert!(!ResolveError::Transport("down".into()).is_terminal());
    }

    #[test]
    fn test_exhaustion_report_enumerates_all_failures() {
        let report = ExhaustionReport::new(vec![
            StrategyFailure::new("token_api", "no media found: no video entries"),
            StrategyFailure::new("mirror_api", "transport error: request timed out"),
            StrategyFailure::new("browser", "no media found: no signals"),
        ]);
        let err = ResolveError::StrategyExhausted(report);
        let msg = err.to_string();

        assert!(msg.contains("token_api: no media found"));
        assert!(msg.contains("mirror_api: transport error"));
        assert!(msg.contains("browser: no media found"));
    }

    #[test]
    fn test_empty_report_display() {
        let report = ExhaustionReport::default();
        assert_eq!(report.to_string(), "no strategies attempted");
    }
}
