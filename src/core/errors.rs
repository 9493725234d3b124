/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Future-related errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum FutureError {
    #[error("Allocation of {requested} bytes failed: {reason}")]
    #[diagnostic(
        code(future::allocation_failure),
        help("The value buffer or waiter queue could not be allocated. Lower the capacity or free unused futures.")
    )]
    AllocationFailure { requested: usize, reason: String },

    #[error("Future handle {0} is invalid")]
    #[diagnostic(
        code(future::invalid_handle),
        help("The handle is null, was never created by this manager, or has already been freed.")
    )]
    InvalidHandle(u64),

    #[error("Value of {length} bytes does not fit future capacity of {capacity} bytes")]
    #[diagnostic(
        code(future::size_mismatch),
        help("Pass at most `capacity` bytes, or configure LengthPolicy::Truncate.")
    )]
    SizeMismatch { length: usize, capacity: usize },

    #[error("Future {0} has already been set")]
    #[diagnostic(
        code(future::already_set),
        help("Futures are single-shot. Configure SetPolicy::Overwrite to allow replacing the value.")
    )]
    AlreadySet(u64),

    #[error("Future {handle} still has {waiters} suspended waiter(s)")]
    #[diagnostic(
        code(future::waiters_pending),
        help("Set the future so every waiter resumes before freeing it.")
    )]
    WaitersPending { handle: u64, waiters: usize },
}

impl FutureError {
    /// Build an allocation failure from a `try_reserve` error
    pub(crate) fn allocation(requested: usize, err: std::collections::TryReserveError) -> Self {
        FutureError::AllocationFailure {
            requested,
            reason: err.to_string(),
        }
    }
}
