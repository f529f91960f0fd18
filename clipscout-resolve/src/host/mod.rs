//! Host APIs: external resources the strategies depend on.

pub mod chromium;
pub mod http;
pub mod pool;
