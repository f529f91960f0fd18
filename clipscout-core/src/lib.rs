// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # clipscout Core
//!
//! Core types, models, and errors for the clipscout resolver.
//!
//! This crate provides the foundational abstractions used across all other
//! clipscout crates, including:
//!
//! - Domain models (content references, media variants, extraction results)
//! - The public error taxonomy
//! - The variant normalizer (deduplication, quality labeling, ranking)
//!
//! ## Key Types
//!
//! ### Reference Types
//! - [`ContentReference`] - Canonical identifier parsed from a post URL
//!
//! ### Variant Types
//! - [`RawVariant`] - Unprocessed variant record produced by a strategy
//! - [`MediaVariant`] - Normalized, quality-labeled variant (public result element)
//! - [`StrategyKind`] - Which strategy produced a variant
//!
//! ### Results
//! - [`ExtractionResult`] - The resolver's public return value
//!
//! ### Errors
//! - [`ResolveError`] - Typed failure taxonomy shared by all strategies

pub mod error;
pub mod models;

// Re-export error types
pub use error::{ExhaustionReport, ResolveError, StrategyFailure};

// Re-export all model types
pub use models::{
    // Reference types
    ContentReference,
    DEFAULT_ALLOWED_HOSTS,
    // Variant types
    MediaVariant,
    RawVariant,
    StrategyKind,
    normalize_variants,
    quality_label,
    // Results
    ExtractionResult,
};
