// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # clipscout Strategies
//!
//! The three concrete extraction strategies, in fallback order:
//!
//! - [`TokenApiStrategy`] - the provider's status metadata API with an
//!   anonymous guest token (cheap, exact bitrates)
//! - [`MirrorStrategy`] - an unauthenticated read-only mirror API
//!   (independent of the provider's credential policy)
//! - [`BrowserStrategy`] - a pooled headless browser watching the page's
//!   own traffic (expensive last resort)
//!
//! [`default_strategies`] assembles the standard chain for the
//! orchestrator.

pub mod browser;
pub mod mirror;
pub mod token_api;

pub(crate) mod util;

pub use browser::BrowserStrategy;
pub use mirror::MirrorStrategy;
pub use token_api::TokenApiStrategy;

use clipscout_resolve::ResolveStrategy;

/// The standard strategy chain in fixed cost order: token API, then
/// mirror API, then browser automation.
pub fn default_strategies() -> Vec<Box<dyn ResolveStrategy>> {
    vec![
        Box::new(TokenApiStrategy::new()),
        Box::new(MirrorStrategy::new()),
        Box::new(BrowserStrategy::new()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_chain_order() {
        let chain = default_strategies();
        let ids: Vec<&str> = chain.iter().map(|s| s.id()).collect();
        assert_eq!(ids, ["token_api", "mirror_api", "browser"]);
    }
}
