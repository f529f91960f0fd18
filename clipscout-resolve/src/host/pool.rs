//! Bounded pool of reusable browser instances.
//!
//! Browser instances are expensive to create and the scarcest resource in
//! the pipeline, so the pool enforces a hard capacity: at most N live
//! instances exist at any moment. Waiting is semaphore-based: an acquirer
//! blocked on a full pool is woken the moment a lease is released, never on
//! a polling tick.
//!
//! Releases are RAII: [`InstanceLease`] returns its instance on drop, so a
//! crashed or timed-out extraction can never leak pool capacity.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, instrument, warn};

use clipscout_core::ResolveError;

// ============================================================================
// Pool Error
// ============================================================================

/// Error type for pool operations.
#[derive(Debug, Error)]
pub enum PoolError {
    /// Creating a new instance failed.
    #[error("failed to launch instance: {0}")]
    Launch(String),

    /// The pool has been shut down.
    #[error("instance pool is shut down")]
    ShutDown,
}

impl From<PoolError> for ResolveError {
    fn from(err: PoolError) -> Self {
        ResolveError::Transport(err.to_string())
    }
}

// ============================================================================
// Instance Traits
// ============================================================================

/// A poolable instance.
#[async_trait]
pub trait PooledInstance: Send + Sync + 'static {
    /// Whether the underlying instance is still usable. A disconnected
    /// instance is torn down and replaced at acquisition time, so callers
    /// never observe a dead handle.
    fn is_connected(&self) -> bool;

    /// Gracefully tears the instance down.
    async fn close(&mut self);
}

/// Creates pool instances on demand.
#[async_trait]
pub trait InstanceFactory: Send + Sync + 'static {
    /// The instance type this factory produces.
    type Instance: PooledInstance;

    /// Launches a new instance.
    async fn create(&self) -> Result<Self::Instance, PoolError>;
}

// ============================================================================
// Instance Pool
// ============================================================================

/// Bounded pool of reusable instances.
///
/// Instances are created lazily up to `capacity`, reused across requests,
/// and replaced transparently when found disconnected.
pub struct InstancePool<F: InstanceFactory> {
    factory: F,
    capacity: usize,
    permits: Arc<Semaphore>,
    idle: Mutex<Vec<F::Instance>>,
    live: AtomicUsize,
    shut_down: AtomicBool,
}

impl<F: InstanceFactory> InstancePool<F> {
    /// Creates a pool with the given capacity. No instances are launched
    /// until the first acquisition.
    pub fn new(factory: F, capacity: usize) -> Arc<Self> {
        let capacity = capacity.max(1);
        Arc::new(Self {
            factory,
            capacity,
            permits: Arc::new(Semaphore::new(capacity)),
            idle: Mutex::new(Vec::with_capacity(capacity)),
            live: AtomicUsize::new(0),
            shut_down: AtomicBool::new(false),
        })
    }

    /// The maximum number of live instances.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of currently live instances (leased + idle).
    pub fn live_count(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Acquires an instance, blocking until capacity is available.
    ///
    /// Callers wanting a bound on the wait wrap this in
    /// `tokio::time::timeout`; dropping the future before completion
    /// consumes no capacity.
    ///
    /// # Errors
    ///
    /// [`PoolError::ShutDown`] after [`InstancePool::shutdown`], or
    /// [`PoolError::Launch`] when a replacement instance cannot be created.
    #[instrument(skip(self))]
    pub async fn acquire(self: &Arc<Self>) -> Result<InstanceLease<F>, PoolError> {
        if self.shut_down.load(Ordering::SeqCst) {
            return Err(PoolError::ShutDown);
        }

        // Closing the semaphore on shutdown wakes every blocked waiter.
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| PoolError::ShutDown)?;

        // Reuse an idle instance, discarding any found disconnected.
        loop {
            let candidate = self.idle.lock().expect("pool idle list poisoned").pop();
            let Some(mut instance) = candidate else { break };

            if instance.is_connected() {
                debug!(live = self.live_count(), "reusing idle instance");
                return Ok(InstanceLease::new(self.clone(), instance, permit));
            }

            warn!("idle instance disconnected, replacing");
            instance.close().await;
            self.live.fetch_sub(1, Ordering::SeqCst);
        }

        // Below capacity (we hold a permit and found nothing idle): launch.
        debug!(live = self.live_count(), "launching new instance");
        let instance = self.factory.create().await?;
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(InstanceLease::new(self.clone(), instance, permit))
    }

    /// Tears down every instance and fails all current and future
    /// acquisitions. Idempotent; used once at process exit.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }
        self.permits.close();

        let drained: Vec<F::Instance> = {
            let mut idle = self.idle.lock().expect("pool idle list poisoned");
            idle.drain(..).collect()
        };
        for mut instance in drained {
            instance.close().await;
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
        debug!("instance pool shut down");
    }

    /// Returns an instance at lease drop. After shutdown the instance is
    /// discarded instead of re-idled, relying on its own drop cleanup.
    fn release(&self, instance: F::Instance) {
        if self.shut_down.load(Ordering::SeqCst) || !instance.is_connected() {
            self.live.fetch_sub(1, Ordering::SeqCst);
            drop(instance);
            return;
        }
        self.idle
            .lock()
            .expect("pool idle list poisoned")
            .push(instance);
    }
}

// ============================================================================
// Instance Lease
// ============================================================================

/// RAII handle to a pooled instance.
///
/// Dropping the lease marks the instance idle again and releases the
/// capacity permit, the guaranteed-cleanup path the browser strategy
/// relies on when a page load times out or an extraction fails.
pub struct InstanceLease<F: InstanceFactory> {
    pool: Arc<InstancePool<F>>,
    instance: Option<F::Instance>,
    _permit: OwnedSemaphorePermit,
}

impl<F: InstanceFactory> InstanceLease<F> {
    fn new(pool: Arc<InstancePool<F>>, instance: F::Instance, permit: OwnedSemaphorePermit) -> Self {
        Self {
            pool,
            instance: Some(instance),
            _permit: permit,
        }
    }

    /// The leased instance.
    pub fn instance(&self) -> &F::Instance {
        self.instance
            .as_ref()
            .expect("instance present until drop")
    }

    /// The leased instance, mutably.
    pub fn instance_mut(&mut self) -> &mut F::Instance {
        self.instance
            .as_mut()
            .expect("instance present until drop")
    }
}

impl<F: InstanceFactory> Drop for InstanceLease<F> {
    fn drop(&mut self) {
        if let Some(instance) = self.instance.take() {
            self.pool.release(instance);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
