/*!
 * Future Module
 *
 * Single-shot futures for cooperative logical threads: any number of
 * threads wait for one value, a single `set` wakes them all exactly once.
 *
 * # Architecture
 *
 * - `FutureManager`: handle table, creation and release, accounting
 * - `FutureObject`: value buffer, readiness and waiter queue behind one mutex
 * - `FutureConfig`: length and repeated-set policies
 */

mod config;
mod manager;
mod state;
mod types;

// Re-export public API
pub use config::{FutureConfig, LengthPolicy, SetPolicy};
pub use manager::FutureManager;
pub use types::{FutureHandle, FutureStats, ValueView};
