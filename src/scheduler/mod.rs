/*!
 * Scheduler Module
 * Logical-thread scheduling interface and a reference implementation
 */

pub mod parking;
pub mod traits;

// Re-export public API
pub use parking::{LogicalThread, ParkingScheduler, SchedulerStats};
pub use traits::Scheduler;

#[cfg(test)]
pub use traits::MockScheduler;
