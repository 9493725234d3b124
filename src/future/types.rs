/*!
 * Future Types
 * Handles, value views and accounting snapshots
 */

use crate::core::limits::NULL_FUTURE_ID;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// Typed handle into a [`FutureManager`](super::FutureManager) table
///
/// Ids are never reused, so a freed handle is rejected rather than
/// resolving to a newer future.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FutureHandle(pub u64);

impl FutureHandle {
    /// The null future
    pub const NULL: FutureHandle = FutureHandle(NULL_FUTURE_ID);

    #[inline]
    pub fn is_null(&self) -> bool {
        self.0 == NULL_FUTURE_ID
    }
}

impl Default for FutureHandle {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for FutureHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Read-only view of a future's value buffer
///
/// Always `capacity` bytes long. A view taken before an overwriting
/// `set` keeps the bytes it was taken with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValueView(pub(crate) Bytes);

impl ValueView {
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[inline]
    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl Deref for ValueView {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for ValueView {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Allocation accounting for a future manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FutureStats {
    pub live_futures: usize,
    /// Sum of the capacities of all live futures
    pub bytes_in_use: usize,
    pub total_created: u64,
    pub total_freed: u64,
    /// Waiters marked ready across all `set` calls
    pub total_wakeups: u64,
}
