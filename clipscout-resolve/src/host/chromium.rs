//! Headless chromium launch and lifecycle.
//!
//! Wraps `chromiumoxide` so the pool can treat a running browser as an
//! opaque, replaceable instance. Each launch gets a randomized viewport and
//! client identity so pooled instances don't present identical fingerprints.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::handler::viewport::Viewport;
use futures::StreamExt;
use rand::Rng;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use super::pool::{InstanceFactory, PoolError, PooledInstance};

/// Realistic client identity strings, one picked per launch.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
];

// ============================================================================
// Chromium Instance
// ============================================================================

/// One live headless browser plus its CDP event-handler task.
pub struct ChromiumInstance {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl ChromiumInstance {
    /// The underlying browser, for opening pages.
    pub fn browser(&self) -> &Browser {
        &self.browser
    }
}

#[async_trait]
impl PooledInstance for ChromiumInstance {
    fn is_connected(&self) -> bool {
        // The handler task runs for as long as the CDP connection lives;
        // its completion means the browser process went away.
        !self.handler.is_finished()
    }

    async fn close(&mut self) {
        if let Err(e) = self.browser.close().await {
            debug!(error = %e, "browser close failed, relying on process kill");
        }
        let _ = self.browser.wait().await;
        self.handler.abort();
    }
}

impl Drop for ChromiumInstance {
    fn drop(&mut self) {
        // Browser's own drop kills the child process if close() never ran.
        self.handler.abort();
    }
}

// ============================================================================
// Chromium Factory
// ============================================================================

/// Launches headless chromium instances for the pool.
#[derive(Debug, Clone, Default)]
pub struct ChromiumFactory;

impl ChromiumFactory {
    /// Creates a factory with default launch settings.
    pub fn new() -> Self {
        Self
    }

    fn build_config() -> Result<BrowserConfig, PoolError> {
        let mut rng = rand::rng();
        let width = rng.random_range(1180..=1920u32);
        let height = rng.random_range(720..=1080u32);
        let user_agent = USER_AGENTS[rng.random_range(0..USER_AGENTS.len())];

        let mut args: Vec<String> = [
            "--disable-blink-features=AutomationControlled",
            "--disable-dev-shm-usage",
            "--disable-gpu",
            "--disable-extensions",
            "--disable-background-networking",
            "--mute-audio",
            "--no-first-run",
        ]
        .iter()
        .map(ToString::to_string)
        .collect();
        args.push(format!("--window-size={width},{height}"));
        args.push(format!("--user-agent={user_agent}"));

        BrowserConfig::builder()
            .no_sandbox()
            .viewport(Some(Viewport {
                width,
                height,
                device_scale_factor: Some(1.0),
                ..Viewport::default()
            }))
            .args(args)
            .build()
            .map_err(PoolError::Launch)
    }
}

#[async_trait]
impl InstanceFactory for ChromiumFactory {
    type Instance = ChromiumInstance;

    #[instrument(skip(self))]
    async fn create(&self) -> Result<ChromiumInstance, PoolError> {
        let config = Self::build_config()?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| PoolError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!(error = %e, "browser handler stopped");
                    break;
                }
            }
        });

        debug!("headless browser launched");
        Ok(ChromiumInstance { browser, handler })
    }
}

// ============================================================================
// Tests
// ============================================================================
