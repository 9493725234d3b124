/*!
 * ID Generation
 * Monotonic id sources for future handles and logical threads
 */

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Generic ID generator interface
pub trait IdGenerator<T> {
    /// Generate next ID
    fn next(&self) -> T;

    /// Get the next value that would be handed out (for debugging)
    fn current(&self) -> T;
}

/// Atomic counter generator
///
/// # Performance
/// - Cache-line aligned to prevent false sharing
/// - Lock-free atomic operations
///
/// Ids are never recycled, so a stale id can never alias a newer object.
#[repr(C, align(64))]
pub struct AtomicGenerator {
    counter: Arc<AtomicU64>,
}

impl AtomicGenerator {
    /// Create new generator starting at given value
    #[inline]
    pub fn new(start: u64) -> Self {
        Self {
            counter: Arc::new(AtomicU64::new(start)),
        }
    }
}

impl Clone for AtomicGenerator {
    fn clone(&self) -> Self {
        Self {
            counter: Arc::clone(&self.counter),
        }
    }
}

impl IdGenerator<u64> for AtomicGenerator {
    #[inline]
    fn next(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    fn current(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }
}
