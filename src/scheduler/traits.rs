/*!
 * Scheduler Traits
 * Interface the future consumes from the logical-thread runtime
 */

use crate::core::types::ThreadHandle;

/// Cooperative scheduler primitives
///
/// The future never runs threads itself. It only asks who is calling,
/// parks the caller, and later hands registered threads back to the
/// scheduler.
///
/// # Contract
///
/// `mark_ready` must never be lost: if it reaches a thread before that
/// thread calls `suspend_current`, the next `suspend_current` returns
/// immediately. `mark_ready` may be called from any worker.
#[cfg_attr(test, mockall::automock)]
pub trait Scheduler: Send + Sync {
    /// Identify the calling logical thread
    fn current_thread(&self) -> ThreadHandle;

    /// Park the calling logical thread until it is marked ready
    fn suspend_current(&self);

    /// Make a suspended logical thread runnable again
    fn mark_ready(&self, thread: ThreadHandle);
}
