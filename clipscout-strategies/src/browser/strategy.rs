//! Strategy C: headless-browser automation.

use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::cdp::browser_protocol::network::{
    EventRequestWillBeSent, EventResponseReceived, GetResponseBodyParams, RequestId,
};
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, instrument};

use clipscout_core::{ContentReference, ResolveError, StrategyKind};
use clipscout_resolve::{ResolveContext, ResolveStrategy, StrategyYield};

use super::{dom, events};

/// Bound on buffered network signals per extraction. A media page produces
/// a handful of interesting requests; overflow means the page is doing
/// something else entirely and extra signals are safe to drop.
const SIGNAL_BUFFER: usize = 256;

/// Pause after the play-button click, long enough for the triggered
/// rendition fetch to appear in the intercepted traffic.
const POST_CLICK_DELAY: Duration = Duration::from_millis(750);

/// One interesting network observation.
enum NetworkSignal {
    /// A direct media file request; the URL itself is the extraction.
    Media(String),
    /// A metadata response whose body must be fetched over CDP.
    Metadata(RequestId),
}

/// A page handle that can be torn down asynchronously.
#[async_trait]
trait ClosablePage: Send + 'static {
    async fn close_page(self);
}

#[async_trait]
impl ClosablePage for Page {
    async fn close_page(self) {
        if let Err(e) = self.close().await {
            debug!(error = %e, "page close failed");
        }
    }
}

/// Guarantees tab teardown for the extraction's page.
///
/// The pool lease returns the browser on drop, but a dropped `Page` handle
/// alone leaves its target open inside the reused instance, so a cancelled
/// extraction would accumulate tabs. The guard closes the page inline on
/// the normal path and spawns the close when the owning future is dropped
/// mid-flight.
struct PageGuard<P: ClosablePage> {
    page: Option<P>,
}

impl<P: ClosablePage> PageGuard<P> {
    fn new(page: P) -> Self {
        Self { page: Some(page) }
    }

    fn page(&self) -> &P {
        self.page.as_ref().expect("page present until close")
    }

    async fn close(mut self) {
        if let Some(page) = self.page.take() {
            page.close_page().await;
        }
    }
}

impl<P: ClosablePage> Drop for PageGuard<P> {
    fn drop(&mut self) {
        if let Some(page) = self.page.take() {
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                handle.spawn(async move { page.close_page().await });
            }
        }
    }
}

fn deadline_error(limit: Duration) -> ResolveError {
    ResolveError::Transport(format!(
        "browser extraction exceeded {}s",
        limit.as_secs()
    ))
}

/// Resolves media by loading the post in a pooled headless browser and
/// watching what the page itself fetches.
///
/// Last resort: slow and resource-hungry, but immune to API-side
/// credential policy since it looks like an ordinary visitor. Extraction
/// merges intercepted media requests, intercepted metadata response
/// bodies, and a post-settle DOM scan, letting the normalizer collapse
/// the overlap.
#[derive(Debug, Clone, Default)]
pub struct BrowserStrategy;

impl BrowserStrategy {
    /// Creates the strategy.
    pub fn new() -> Self {
        Self
    }

    async fn extract(
        &self,
        ctx: &ResolveContext,
        reference: &ContentReference,
    ) -> Result<StrategyYield, ResolveError> {
        let limit = ctx.settings.browser_timeout;
        let deadline = Instant::now() + limit;

        // The lease is RAII: any early return or cancellation below hands
        // the instance back to the pool. The wait for capacity counts
        // against the same deadline as the extraction itself.
        let lease = match timeout_at(deadline, ctx.pool.acquire()).await {
            Ok(lease) => lease?,
            Err(_) => return Err(deadline_error(limit)),
        };
        let page = lease
            .instance()
            .browser()
            .new_page("about:blank")
            .await
            .map_err(|e| ResolveError::transport(format!("failed to open page: {e}")))?;
        let guard = PageGuard::new(page);

        // The deadline wraps only the page work: on expiry the guard and
        // the lease survive it, so the tab is closed and the instance
        // released before the error propagates.
        let result = match timeout_at(deadline, self.drive(ctx, reference, guard.page())).await {
            Ok(result) => result,
            Err(_) => Err(deadline_error(limit)),
        };
        guard.close().await;
        result
    }

    async fn drive(
        &self,
        ctx: &ResolveContext,
        reference: &ContentReference,
        page: &Page,
    ) -> Result<StrategyYield, ResolveError> {
        let (tx, mut rx) = mpsc::channel::<NetworkSignal>(SIGNAL_BUFFER);

        // Listeners attach before navigation so the page's very first
        // metadata call is already observed.
        let mut responses = page
            .event_listener::<EventResponseReceived>()
            .await
            .map_err(|e| ResolveError::transport(format!("failed to attach listener: {e}")))?;
        let mut requests = page
            .event_listener::<EventRequestWillBeSent>()
            .await
            .map_err(|e| ResolveError::transport(format!("failed to attach listener: {e}")))?;

        let response_tap = {
            let tx = tx.clone();
            tokio::spawn(async move {
                while let Some(event) = responses.next().await {
                    let url = &event.response.url;
                    let signal = if events::is_media_url(url) {
                        NetworkSignal::Media(url.clone())
                    } else if events::is_metadata_url(url) {
                        NetworkSignal::Metadata(event.request_id.clone())
                    } else {
                        continue;
                    };
                    if tx.try_send(signal).is_err() {
                        break;
                    }
                }
            })
        };
        let request_tap = tokio::spawn(async move {
            while let Some(event) = requests.next().await {
                let url = &event.request.url;
                if !events::is_media_url(url) {
                    continue;
                }
                if tx.try_send(NetworkSignal::Media(url.clone())).is_err() {
                    break;
                }
            }
        });

        // A slow navigation is not fatal: the metadata calls usually land
        // well before the load event, so whatever traffic was captured is
        // still worth draining.
        let navigation =
            tokio::time::timeout(ctx.settings.page_load_timeout, page.goto(reference.canonical_url()))
                .await;
        match navigation {
            Err(_) => debug!("navigation timed out, continuing with captured traffic"),
            Ok(Err(e)) => debug!(error = %e, "navigation failed, continuing with captured traffic"),
            Ok(Ok(_)) => {}
        }

        tokio::time::sleep(ctx.settings.settle_delay).await;
        if let Ok(outcome) = page.evaluate(dom::CLICK_PLAY_JS).await {
            if outcome.value().and_then(serde_json::Value::as_bool) == Some(true) {
                debug!("player click dispatched");
                tokio::time::sleep(POST_CLICK_DELAY).await;
            }
        }

        response_tap.abort();
        request_tap.abort();

        let mut variants = Vec::new();
        let mut metadata_ids = Vec::new();
        while let Ok(signal) = rx.try_recv() {
            match signal {
                NetworkSignal::Media(url) => variants.push(events::variant_from_media_url(&url)),
                NetworkSignal::Metadata(id) => metadata_ids.push(id),
            }
        }

        for request_id in metadata_ids {
            match page.execute(GetResponseBodyParams::new(request_id)).await {
                Ok(response) if !response.result.base64_encoded => {
                    variants.extend(events::variants_from_metadata(&response.result.body));
                }
                Ok(_) => {}
                Err(e) => debug!(error = %e, "metadata body unavailable"),
            }
        }

        if let Ok(html) = page.content().await {
            variants.extend(dom::variants_from_html(&html));
        }
        if let Ok(outcome) = page.evaluate(dom::COLLECT_VIDEO_SOURCES_JS).await {
            if let Ok(sources) = outcome.into_value::<Vec<String>>() {
                variants.extend(dom::variants_from_sources(sources));
            }
        }

        debug!(signals = variants.len(), "browser extraction drained");
        Ok(StrategyYield::with_variants(variants))
    }
}

#[async_trait]
impl ResolveStrategy for BrowserStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Browser
    }

    #[instrument(skip(self, ctx), fields(content_id = %reference.content_id))]
    async fn resolve(
        &self,
        ctx: &ResolveContext,
        reference: &ContentReference,
    ) -> Result<StrategyYield, ResolveError> {
        self.extract(ctx, reference).await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct StubPage {
        closed: Arc<AtomicBool>,
    }

    #[async_trait]
    impl ClosablePage for StubPage {
        async fn close_page(self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    async fn wait_closed(closed: &Arc<AtomicBool>) {
        tokio::time::timeout(Duration::from_secs(1), async {
            while !closed.load(Ordering::SeqCst) {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("page must be closed");
    }

    #[test]
    fn test_kind_and_id() {
        let s = BrowserStrategy::new();
        assert_eq!(s.kind(), StrategyKind::Browser);
        assert_eq!(s.id(), "browser");
    }

    #[test]
    fn test_fallback_policy_is_default() {
        let s = BrowserStrategy::new();
        assert!(s.should_fallback(&ResolveError::Transport("pool shut down".into())));
        assert!(!s.should_fallback(&ResolveError::ContentUnavailable("gone".into())));
    }

    #[tokio::test]
    async fn test_guard_closes_page_inline() {
        let closed = Arc::new(AtomicBool::new(false));
        let guard = PageGuard::new(StubPage {
            closed: closed.clone(),
        });

        guard.close().await;
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_guard_closes_page_when_dropped() {
        let closed = Arc::new(AtomicBool::new(false));
        let guard = PageGuard::new(StubPage {
            closed: closed.clone(),
        });

        drop(guard);
        wait_closed(&closed).await;
    }

    #[tokio::test]
    async fn test_timed_out_extraction_still_closes_page() {
        let closed = Arc::new(AtomicBool::new(false));

        // Mirrors the extract flow: the deadline cancels the page work
        // mid-flight and the guard must still tear the tab down.
        let stuck_extraction = {
            let closed = closed.clone();
            async move {
                let guard = PageGuard::new(StubPage { closed });
                tokio::time::sleep(Duration::from_secs(60)).await;
                guard.close().await;
            }
        };

        let expired = tokio::time::timeout(Duration::from_millis(20), stuck_extraction)
            .await
            .is_err();
        assert!(expired, "extraction must hit the deadline");
        wait_closed(&closed).await;
    }
}
