/*!
 * Future Manager
 *
 * Factory and destructor for futures. Futures live in a sharded table
 * keyed by never-reused ids, so null, unknown and freed handles are
 * rejected instead of dereferenced.
 */

use super::config::FutureConfig;
use super::state::FutureObject;
use super::types::{FutureHandle, FutureStats, ValueView};
use crate::core::errors::FutureError;
use crate::core::id::{AtomicGenerator, IdGenerator};
use crate::core::limits::{FIRST_FUTURE_ID, TABLE_SHARDS};
use crate::core::types::{ContextId, FutureResult};
use crate::scheduler::Scheduler;
use ahash::RandomState;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, instrument, trace, warn};

/// Future table bound to one scheduler
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use ult_future::{FutureManager, ParkingScheduler};
///
/// let manager = FutureManager::new(Arc::new(ParkingScheduler::new()));
/// let fut = manager.create(5).unwrap();
/// manager.set(fut, b"hello").unwrap();
/// assert_eq!(manager.wait(fut).unwrap().as_bytes(), b"hello");
/// manager.free(fut).unwrap();
/// ```
pub struct FutureManager<S: Scheduler> {
    futures: DashMap<u64, Arc<FutureObject>, RandomState>,
    ids: AtomicGenerator,
    scheduler: Arc<S>,
    config: FutureConfig,
    bytes_in_use: AtomicUsize,
    total_created: AtomicU64,
    total_freed: AtomicU64,
    total_wakeups: AtomicU64,
}

impl<S: Scheduler> FutureManager<S> {
    pub fn new(scheduler: Arc<S>) -> Self {
        Self::with_config(scheduler, FutureConfig::default())
    }

    pub fn with_config(scheduler: Arc<S>, config: FutureConfig) -> Self {
        debug!(?config, "Future manager initialized");
        Self {
            futures: DashMap::with_capacity_and_hasher_and_shard_amount(
                0,
                RandomState::new(),
                TABLE_SHARDS,
            ),
            ids: AtomicGenerator::new(FIRST_FUTURE_ID),
            scheduler,
            config,
            bytes_in_use: AtomicUsize::new(0),
            total_created: AtomicU64::new(0),
            total_freed: AtomicU64::new(0),
            total_wakeups: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn scheduler(&self) -> &Arc<S> {
        &self.scheduler
    }

    #[inline]
    pub fn config(&self) -> &FutureConfig {
        &self.config
    }

    /// Create a future with a `capacity`-byte value buffer
    pub fn create(&self, capacity: usize) -> FutureResult<FutureHandle> {
        self.create_in(capacity, ContextId::default())
    }

    /// Create a future, recording the execution context that owns it
    pub fn create_in(&self, capacity: usize, owner: ContextId) -> FutureResult<FutureHandle> {
        if capacity > self.config.max_capacity {
            warn!(
                capacity,
                max = self.config.max_capacity,
                "Rejected future creation"
            );
            return Err(FutureError::AllocationFailure {
                requested: capacity,
                reason: format!(
                    "exceeds maximum future capacity of {} bytes",
                    self.config.max_capacity
                ),
            });
        }

        let id = self.ids.next();
        let object = FutureObject::new(id, capacity, owner, self.config.waiter_capacity_hint)?;
        self.futures.insert(id, Arc::new(object));

        self.bytes_in_use.fetch_add(capacity, Ordering::Relaxed);
        self.total_created.fetch_add(1, Ordering::Relaxed);
        debug!(future = id, capacity, owner = %owner, "Created future");
        Ok(FutureHandle(id))
    }

    /// Block the calling logical thread until the future is set
    ///
    /// Returns immediately when the value is already there.
    #[instrument(level = "trace", skip(self), fields(future = handle.0))]
    pub fn wait(&self, handle: FutureHandle) -> FutureResult<ValueView> {
        // The table guard must not be held across the suspension
        let object = self.lookup(handle)?;
        object.wait(self.scheduler.as_ref())
    }

    /// Store `data` and wake every waiter
    ///
    /// Returns the number of logical threads marked ready.
    pub fn set(&self, handle: FutureHandle, data: &[u8]) -> FutureResult<usize> {
        let object = self.lookup(handle)?;
        let woken = object
            .set(data, &self.config, self.scheduler.as_ref())
            .inspect_err(|e| warn!(future = handle.0, error = %e, "Set rejected"))?;

        self.total_wakeups.fetch_add(woken as u64, Ordering::Relaxed);
        trace!(future = handle.0, len = data.len(), woken, "Set future");
        Ok(woken)
    }

    /// Release the future's buffer and table entry
    ///
    /// Freeing the null handle is a no-op. A future that still has
    /// suspended waiters is left untouched and `WaitersPending` is returned.
    pub fn free(&self, handle: FutureHandle) -> FutureResult<()> {
        if handle.is_null() {
            return Ok(());
        }

        let mut pending = 0;
        let removed = self.futures.remove_if(&handle.0, |_, object| match object.retire() {
            Ok(()) => true,
            Err(waiters) => {
                pending = waiters;
                false
            }
        });

        match removed {
            Some((_, object)) => {
                self.bytes_in_use
                    .fetch_sub(object.capacity(), Ordering::Relaxed);
                self.total_freed.fetch_add(1, Ordering::Relaxed);
                debug!(future = handle.0, "Freed future");
                Ok(())
            }
            None if pending > 0 => {
                warn!(
                    future = handle.0,
                    waiters = pending,
                    "Refusing to free future with suspended waiters"
                );
                Err(FutureError::WaitersPending {
                    handle: handle.0,
                    waiters: pending,
                })
            }
            None => Err(FutureError::InvalidHandle(handle.0)),
        }
    }

    pub fn is_ready(&self, handle: FutureHandle) -> FutureResult<bool> {
        Ok(self.lookup(handle)?.is_ready())
    }

    /// Value if already set, without blocking
    pub fn try_get(&self, handle: FutureHandle) -> FutureResult<Option<ValueView>> {
        Ok(self.lookup(handle)?.try_get())
    }

    pub fn capacity(&self, handle: FutureHandle) -> FutureResult<usize> {
        Ok(self.lookup(handle)?.capacity())
    }

    /// Number of logical threads currently queued on the future
    pub fn waiter_count(&self, handle: FutureHandle) -> FutureResult<usize> {
        Ok(self.lookup(handle)?.waiter_count())
    }

    pub fn owner_context(&self, handle: FutureHandle) -> FutureResult<ContextId> {
        Ok(self.lookup(handle)?.owner())
    }

    pub fn stats(&self) -> FutureStats {
        FutureStats {
            live_futures: self.futures.len(),
            bytes_in_use: self.bytes_in_use.load(Ordering::Relaxed),
            total_created: self.total_created.load(Ordering::Relaxed),
            total_freed: self.total_freed.load(Ordering::Relaxed),
            total_wakeups: self.total_wakeups.load(Ordering::Relaxed),
        }
    }

    fn lookup(&self, handle: FutureHandle) -> FutureResult<Arc<FutureObject>> {
        if handle.is_null() {
            return Err(FutureError::InvalidHandle(handle.0));
        }
        self.futures
            .get(&handle.0)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(FutureError::InvalidHandle(handle.0))
    }
}

impl<S: Scheduler> Drop for FutureManager<S> {
    fn drop(&mut self) {
        let leaked = self.futures.len();
        if leaked > 0 {
            debug!(leaked, "Future manager dropped with live futures");
        }
    }
}
