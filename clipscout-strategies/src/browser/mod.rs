//! Strategy C: headless-browser automation over the pooled chromium
//! instances.

pub mod dom;
pub mod events;
pub mod strategy;

pub use strategy::BrowserStrategy;
