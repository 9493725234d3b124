/*!
 * System Limits and Constants
 *
 * Centralized location for limits, thresholds, and sentinel values used
 * by the future table and the reference scheduler.
 */

// =============================================================================
// FUTURE LIMITS
// =============================================================================

/// Largest value buffer a single future may own (64MB)
/// Requests above this fail with an allocation failure instead of reaching the allocator
pub const MAX_FUTURE_CAPACITY: usize = 64 * 1024 * 1024;

/// Waiter slots reserved up front for every new future
/// Most futures are awaited by a single consumer
pub const DEFAULT_WAITER_CAPACITY: usize = 1;

// =============================================================================
// HANDLE SENTINELS
// =============================================================================

/// Raw id of the null future handle
pub const NULL_FUTURE_ID: u64 = 0;

/// First id handed out by the future table
/// Ids are never recycled so freed handles stay detectable
pub const FIRST_FUTURE_ID: u64 = 1;

/// First id handed out to logical threads
pub const FIRST_THREAD_ID: u64 = 1;

// =============================================================================
// TABLE SHARDING
// =============================================================================

/// Shard count for the future table and parking slots (power of 2)
/// [PERF] Keeps contention low when many workers create and free futures
pub const TABLE_SHARDS: usize = 64;
