/*!
 * ULT Future Library
 * Single-shot futures for cooperative user-level threads
 */

pub mod core;
pub mod future;
pub mod monitoring;
pub mod scheduler;

// Re-exports
pub use crate::core::errors::FutureError;
pub use crate::core::types::{ContextId, FutureResult, ThreadHandle};
pub use future::{
    FutureConfig, FutureHandle, FutureManager, FutureStats, LengthPolicy, SetPolicy, ValueView,
};
pub use monitoring::init_tracing;
pub use scheduler::{LogicalThread, ParkingScheduler, Scheduler, SchedulerStats};
