/*!
 * Core Types
 * Common types shared by the future table and the scheduler interface
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical thread handle
///
/// Reference (never ownership) to an application-scheduled thread. Only the
/// scheduler gives these meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadHandle(pub u64);

/// Execution context (worker) that created a future
///
/// Stored for caller bookkeeping only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextId(pub u32);

impl fmt::Display for ThreadHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ult-{}", self.0)
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx-{}", self.0)
    }
}

/// Common result type for future operations
pub type FutureResult<T> = Result<T, super::errors::FutureError>;
