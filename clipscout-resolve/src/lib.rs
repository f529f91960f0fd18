// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # clipscout Resolve
//!
//! The resolution machinery for clipscout: strategy trait, orchestrator,
//! shared context, and host APIs.
//!
//! ## Host APIs
//!
//! The [`host`] module provides abstractions for external resources:
//!
//! - [`host::http`] - HTTP client with tracing and per-request timeouts
//! - [`host::pool`] - Bounded pool of reusable browser instances
//! - [`host::chromium`] - Headless chromium launch and lifecycle
//!
//! ## Resolution Pipeline
//!
//! The orchestrator executes strategies in fixed cost order until one
//! succeeds:
//!
//! - [`strategy::ResolveStrategy`] - Trait for extraction strategies
//! - [`orchestrator::Orchestrator`] - Tries strategies, aggregates failures
//! - [`context::ResolveContext`] - Shared collaborators (HTTP, tokens, pool)
//! - [`token::TokenCache`] - Single-flighted anonymous credential cache
//!
//! ## Example
//!
//! ```ignore
//! use clipscout_resolve::{Orchestrator, ResolveContext};
//!
//! let ctx = ResolveContext::new();
//! let orchestrator = Orchestrator::with_strategies(ctx, strategies);
//! let result = orchestrator.resolve("https://x.com/user/status/123").await?;
//! ```

// Core modules
pub mod context;
pub mod host;
pub mod orchestrator;
pub mod strategy;
pub mod token;

// Re-export key types at crate root

// Strategy & Orchestrator
pub use context::{BrowserPool, ResolveContext, ResolveContextBuilder, ResolveSettings};
pub use orchestrator::{Orchestrator, ResolveOutcome, StrategyAttempt};
pub use strategy::{ResolveStrategy, StrategyYield};

// Host APIs
pub use host::{
    chromium::{ChromiumFactory, ChromiumInstance},
    http::HttpClient,
    pool::{InstanceFactory, InstanceLease, InstancePool, PoolError, PooledInstance},
};

// Credential cache
pub use token::{ANONYMOUS_BEARER, AccessToken, GuestTokenSource, TokenCache, TokenSource};
