//! Domain models for clipscout.

pub mod reference;
pub mod result;
pub mod variant;

pub use reference::{ContentReference, DEFAULT_ALLOWED_HOSTS};
pub use result::ExtractionResult;
pub use variant::{MediaVariant, RawVariant, StrategyKind, normalize_variants, quality_label};
