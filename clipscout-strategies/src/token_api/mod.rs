//! Strategy A: the provider's own status metadata API, authenticated with
//! an anonymous guest token.

pub mod models;
pub mod parser;
pub mod strategy;

pub use strategy::TokenApiStrategy;
