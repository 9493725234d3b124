/*!
 * Future Object
 *
 * One value buffer, a one-way readiness transition and the FIFO queue of
 * suspended waiters, all behind a single short-held mutex.
 *
 * # Protocol
 *
 * - `wait`: if ready, return the value. Otherwise enqueue the caller,
 *   drop the lock and suspend through the scheduler. This is the only
 *   place anything blocks.
 * - `set`: under the lock, write the value, flip to ready and take the
 *   queue. After unlocking, mark every taken waiter ready in FIFO order.
 *
 * The buffer is written and the state is ready before any waiter is
 * marked ready, so a resumed waiter always observes the full value.
 */

use super::config::{FutureConfig, LengthPolicy, SetPolicy};
use super::types::ValueView;
use crate::core::errors::FutureError;
use crate::core::types::{ContextId, FutureResult, ThreadHandle};
use crate::scheduler::Scheduler;
use bytes::Bytes;
use parking_lot::Mutex;
use std::mem;
use tracing::trace;

/// Lifecycle of a future's storage
///
/// `Pending -> Ready` happens once. `Freed` is terminal.
enum Slot {
    Pending {
        buffer: Vec<u8>,
        waiters: Vec<ThreadHandle>,
    },
    Ready(Bytes),
    Freed,
}

pub(crate) struct FutureObject {
    id: u64,
    capacity: usize,
    owner: ContextId,
    slot: Mutex<Slot>,
}

impl FutureObject {
    /// Allocate a zero-filled buffer of `capacity` bytes and an empty queue
    pub(crate) fn new(
        id: u64,
        capacity: usize,
        owner: ContextId,
        waiter_hint: usize,
    ) -> FutureResult<Self> {
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(capacity)
            .map_err(|e| FutureError::allocation(capacity, e))?;
        buffer.resize(capacity, 0);

        let mut waiters = Vec::new();
        waiters
            .try_reserve_exact(waiter_hint)
            .map_err(|e| {
                FutureError::allocation(waiter_hint.saturating_mul(mem::size_of::<ThreadHandle>()), e)
            })?;

        Ok(Self {
            id,
            capacity,
            owner,
            slot: Mutex::new(Slot::Pending { buffer, waiters }),
        })
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub(crate) fn owner(&self) -> ContextId {
        self.owner
    }

    /// Block the calling logical thread until the value is set
    pub(crate) fn wait<S: Scheduler + ?Sized>(&self, scheduler: &S) -> FutureResult<ValueView> {
        {
            let mut slot = self.slot.lock();
            match &mut *slot {
                Slot::Ready(value) => return Ok(ValueView(value.clone())),
                Slot::Freed => return Err(FutureError::InvalidHandle(self.id)),
                Slot::Pending { waiters, .. } => {
                    let me = scheduler.current_thread();
                    debug_assert!(
                        !waiters.contains(&me),
                        "{} is already waiting on future {}",
                        me,
                        self.id
                    );
                    waiters
                        .try_reserve(1)
                        .map_err(|e| FutureError::allocation(mem::size_of::<ThreadHandle>(), e))?;
                    waiters.push(me);
                    trace!(future = self.id, thread = %me, queued = waiters.len(), "Blocking on future");
                }
            }
        }

        loop {
            scheduler.suspend_current();

            match &*self.slot.lock() {
                Slot::Ready(value) => return Ok(ValueView(value.clone())),
                Slot::Freed => return Err(FutureError::InvalidHandle(self.id)),
                // Still queued: only a drain removes us, and a drain makes the slot ready
                Slot::Pending { .. } => {
                    trace!(future = self.id, "Resumed before set, suspending again");
                }
            }
        }
    }

    /// Store the value and wake every waiter
    ///
    /// Returns the number of waiters marked ready.
    pub(crate) fn set<S: Scheduler + ?Sized>(
        &self,
        data: &[u8],
        config: &FutureConfig,
        scheduler: &S,
    ) -> FutureResult<usize> {
        let woken = {
            let mut slot = self.slot.lock();
            match &mut *slot {
                Slot::Freed => return Err(FutureError::InvalidHandle(self.id)),
                Slot::Ready(value) => {
                    if config.set_policy == SetPolicy::RejectSecond {
                        return Err(FutureError::AlreadySet(self.id));
                    }
                    let len = self.accepted_len(data.len(), config.length_policy)?;

                    let mut next = Vec::new();
                    next.try_reserve_exact(self.capacity)
                        .map_err(|e| FutureError::allocation(self.capacity, e))?;
                    next.extend_from_slice(value);
                    next[..len].copy_from_slice(&data[..len]);
                    *value = Bytes::from(next);

                    trace!(future = self.id, len, "Overwrote ready future");
                    Vec::new()
                }
                Slot::Pending { buffer, waiters } => {
                    let len = self.accepted_len(data.len(), config.length_policy)?;
                    buffer[..len].copy_from_slice(&data[..len]);

                    let value = Bytes::from(mem::take(buffer));
                    let woken = mem::take(waiters);
                    *slot = Slot::Ready(value);
                    woken
                }
            }
        };

        for &thread in &woken {
            scheduler.mark_ready(thread);
        }
        if !woken.is_empty() {
            trace!(future = self.id, woken = woken.len(), "Signalled waiters");
        }
        Ok(woken.len())
    }

    /// Number of bytes of a `length`-byte value that `set` writes
    fn accepted_len(&self, length: usize, policy: LengthPolicy) -> FutureResult<usize> {
        let mismatch = FutureError::SizeMismatch {
            length,
            capacity: self.capacity,
        };
        match policy {
            LengthPolicy::Reject if length > self.capacity => Err(mismatch),
            LengthPolicy::ExactOnly if length != self.capacity => Err(mismatch),
            LengthPolicy::Truncate => Ok(length.min(self.capacity)),
            _ => Ok(length),
        }
    }

    /// Detach the future from its table unless threads are still waiting
    ///
    /// A never-set buffer is released at once. A ready value stays in
    /// place: threads marked ready by `set` may not have resumed yet, and
    /// it is dropped with the last reference to the object.
    ///
    /// Returns the number of pending waiters on refusal.
    pub(crate) fn retire(&self) -> Result<(), usize> {
        let mut slot = self.slot.lock();
        let pending = match &*slot {
            Slot::Pending { waiters, .. } => waiters.len(),
            Slot::Ready(_) | Slot::Freed => return Ok(()),
        };
        if pending > 0 {
            return Err(pending);
        }
        *slot = Slot::Freed;
        Ok(())
    }

    pub(crate) fn is_ready(&self) -> bool {
        matches!(&*self.slot.lock(), Slot::Ready(_))
    }

    /// Value if ready, without blocking
    pub(crate) fn try_get(&self) -> Option<ValueView> {
        match &*self.slot.lock() {
            Slot::Ready(value) => Some(ValueView(value.clone())),
            _ => None,
        }
    }

    pub(crate) fn waiter_count(&self) -> usize {
        match &*self.slot.lock() {
            Slot::Pending { waiters, .. } => waiters.len(),
            _ => 0,
        }
    }
}
