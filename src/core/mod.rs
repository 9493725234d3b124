/*!
 * Core Module
 * Fundamental types, ids, limits and error handling
 */

pub mod errors;
pub mod id;
pub mod limits;
pub mod types;

// Re-export for convenience
pub use errors::*;
pub use id::{AtomicGenerator, IdGenerator};
pub use types::*;
