/*!
 * Parking Scheduler
 *
 * Reference scheduler that backs every logical thread with an OS thread
 * and a condvar parking slot. Suspension parks the OS thread; marking a
 * thread ready hands it a permit and notifies its slot.
 *
 * # Design: Permit Slots
 *
 * Each logical thread owns one slot holding a single permit flag. A
 * `mark_ready` that arrives before the target suspends leaves the permit
 * set, so the following `suspend_current` consumes it and returns at once.
 * Wake-ups are therefore never lost, whichever worker delivers them.
 *
 * Slots exist only for registered threads. `spawn` registers the new
 * thread before it starts and drops the slot when it exits. Any other OS
 * thread is registered by its first `current_thread` call and keeps its
 * slot until it calls `release_current`. `mark_ready` never creates a
 * slot, so wake-ups addressed to exited threads are dropped.
 */

use crate::core::id::{AtomicGenerator, IdGenerator};
use crate::core::limits::{FIRST_THREAD_ID, TABLE_SHARDS};
use crate::core::types::ThreadHandle;
use crate::scheduler::traits::Scheduler;
use ahash::RandomState;
use dashmap::DashMap;
use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::{self, JoinHandle};
use tracing::trace;

thread_local! {
    static CURRENT: Cell<Option<ThreadHandle>> = const { Cell::new(None) };
}

/// Process-wide source of logical thread ids
fn thread_ids() -> &'static AtomicGenerator {
    static IDS: OnceLock<AtomicGenerator> = OnceLock::new();
    IDS.get_or_init(|| AtomicGenerator::new(FIRST_THREAD_ID))
}

/// Handle of the calling OS thread, assigned on first use
fn current_handle() -> ThreadHandle {
    CURRENT.with(|current| match current.get() {
        Some(handle) => handle,
        None => {
            let handle = ThreadHandle(thread_ids().next());
            current.set(Some(handle));
            handle
        }
    })
}

/// Parking slot for one logical thread
#[repr(C, align(64))] // Cache-line aligned to prevent false sharing
struct ParkingSlot {
    permit: Mutex<bool>,
    condvar: Condvar,
}

impl ParkingSlot {
    const fn new() -> Self {
        Self {
            permit: Mutex::new(false),
            condvar: Condvar::new(),
        }
    }
}

/// Scheduler statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStats {
    pub suspensions: u64,
    pub wakeups: u64,
    pub tracked_threads: usize,
}

/// OS-thread-backed scheduler
pub struct ParkingScheduler {
    slots: DashMap<ThreadHandle, Arc<ParkingSlot>, RandomState>,
    suspensions: AtomicU64,
    wakeups: AtomicU64,
}

impl ParkingScheduler {
    pub fn new() -> Self {
        Self {
            slots: DashMap::with_capacity_and_hasher_and_shard_amount(
                0,
                RandomState::new(),
                TABLE_SHARDS,
            ),
            suspensions: AtomicU64::new(0),
            wakeups: AtomicU64::new(0),
        }
    }

    /// Start a new logical thread running `f`
    ///
    /// The handle is known before the thread starts, so producers can
    /// address it immediately.
    pub fn spawn<F, T>(self: &Arc<Self>, f: F) -> std::io::Result<LogicalThread<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let handle = ThreadHandle(thread_ids().next());
        self.register(handle);
        let scheduler = Arc::clone(self);

        let join = thread::Builder::new()
            .name(handle.to_string())
            .spawn(move || {
                CURRENT.with(|current| current.set(Some(handle)));
                let result = f();
                scheduler.slots.remove(&handle);
                result
            })
            .inspect_err(|_| {
                self.slots.remove(&handle);
            })?;

        trace!(thread = %handle, "Spawned logical thread");
        Ok(LogicalThread { handle, join })
    }

    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            suspensions: self.suspensions.load(Ordering::Relaxed),
            wakeups: self.wakeups.load(Ordering::Relaxed),
            tracked_threads: self.slots.len(),
        }
    }

    /// Drop the calling thread's slot
    ///
    /// For threads not started by `spawn`, once they no longer wait on
    /// anything scheduled here.
    pub fn release_current(&self) {
        let me = current_handle();
        if self.slots.remove(&me).is_some() {
            trace!(thread = %me, "Released parking slot");
        }
    }

    /// Slot of `thread`, created if missing
    fn register(&self, thread: ThreadHandle) -> Arc<ParkingSlot> {
        Arc::clone(
            self.slots
                .entry(thread)
                .or_insert_with(|| Arc::new(ParkingSlot::new()))
                .value(),
        )
    }
}

impl Default for ParkingScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for ParkingScheduler {
    #[inline]
    fn current_thread(&self) -> ThreadHandle {
        let me = current_handle();
        // Registered before the caller publishes its handle to a producer
        self.register(me);
        me
    }

    fn suspend_current(&self) {
        let me = current_handle();
        let slot = self.register(me);
        self.suspensions.fetch_add(1, Ordering::Relaxed);

        let mut permit = slot.permit.lock();
        while !*permit {
            slot.condvar.wait(&mut permit);
        }
        *permit = false;
        trace!(thread = %me, "Resumed");
    }

    fn mark_ready(&self, thread: ThreadHandle) {
        let Some(slot) = self.slots.get(&thread).map(|entry| Arc::clone(entry.value())) else {
            trace!(thread = %thread, "Dropped wake-up for unregistered thread");
            return;
        };
        self.wakeups.fetch_add(1, Ordering::Relaxed);

        *slot.permit.lock() = true;
        slot.condvar.notify_one();
        trace!(thread = %thread, "Marked ready");
    }
}

/// Running logical thread spawned by [`ParkingScheduler::spawn`]
pub struct LogicalThread<T> {
    handle: ThreadHandle,
    join: JoinHandle<T>,
}

impl<T> LogicalThread<T> {
    #[inline]
    pub fn handle(&self) -> ThreadHandle {
        self.handle
    }

    /// Wait for the logical thread to finish
    pub fn join(self) -> thread::Result<T> {
        self.join.join()
    }
}
