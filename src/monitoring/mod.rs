/*!
 * Monitoring Module
 * Tracing setup for binaries embedding the future runtime
 */

mod tracer;

pub use tracer::init_tracing;
