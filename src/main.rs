/*!
 * Future Demo - Main Entry Point
 *
 * Spawns a group of logical threads that block on one future, sets the
 * value from a producer thread, and reports the resulting accounting.
 */

use miette::{miette, IntoDiagnostic, Result};
use std::sync::Arc;
use tracing::info;

use ult_future::{init_tracing, FutureConfig, FutureManager, ParkingScheduler};

const DEFAULT_WAITERS: usize = 8;
const PAYLOAD: &[u8] = b"computed elsewhere";

fn main() -> Result<()> {
    init_tracing();

    let waiters = std::env::var("FUTURE_DEMO_WAITERS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_WAITERS);

    let scheduler = Arc::new(ParkingScheduler::new());
    let config = FutureConfig::from_env();
    info!(?config, waiters, "Starting future demo");

    let manager = Arc::new(FutureManager::with_config(Arc::clone(&scheduler), config));
    let fut = manager.create(PAYLOAD.len())?;

    let consumers = (0..waiters)
        .map(|_| {
            let manager = Arc::clone(&manager);
            scheduler.spawn(move || manager.wait(fut).map(|value| value.len()))
        })
        .collect::<std::io::Result<Vec<_>>>()
        .into_diagnostic()?;

    let producer = {
        let manager = Arc::clone(&manager);
        scheduler
            .spawn(move || manager.set(fut, PAYLOAD))
            .into_diagnostic()?
    };

    let woken = producer
        .join()
        .map_err(|_| miette!("producer thread panicked"))??;
    info!(woken, "Value set");

    for consumer in consumers {
        let handle = consumer.handle();
        let len = consumer
            .join()
            .map_err(|_| miette!("logical thread {} panicked", handle))??;
        info!(thread = %handle, len, "Waiter resumed");
    }

    manager.free(fut)?;

    let stats = serde_json::to_string(&manager.stats()).into_diagnostic()?;
    let scheduler_stats = serde_json::to_string(&scheduler.stats()).into_diagnostic()?;
    info!(stats = %stats, scheduler = %scheduler_stats, "Future demo finished");
    Ok(())
}
