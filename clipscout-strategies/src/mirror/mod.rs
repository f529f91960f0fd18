//! Strategy B: unauthenticated read-only mirror API.

pub mod models;
pub mod strategy;

pub use strategy::MirrorStrategy;
