/*!
 * Future Integration Tests
 *
 * Blocking wait/set behavior with real logical threads on the parking scheduler
 */

use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use ult_future::{
    FutureConfig, FutureError, FutureHandle, FutureManager, ParkingScheduler, SetPolicy,
};

fn setup() -> (Arc<ParkingScheduler>, Arc<FutureManager<ParkingScheduler>>) {
    let scheduler = Arc::new(ParkingScheduler::new());
    let manager = Arc::new(FutureManager::new(Arc::clone(&scheduler)));
    (scheduler, manager)
}

/// Spin until `n` threads are queued on the future
fn await_waiters(manager: &FutureManager<ParkingScheduler>, fut: FutureHandle, n: usize) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while manager.waiter_count(fut).unwrap() < n {
        assert!(Instant::now() < deadline, "waiters never queued");
        thread::yield_now();
    }
}

fn broadcast(waiters: usize) {
    let (scheduler, manager) = setup();
    let fut = manager.create(8).unwrap();

    let threads: Vec<_> = (0..waiters)
        .map(|_| {
            let manager = Arc::clone(&manager);
            scheduler
                .spawn(move || manager.wait(fut).map(|v| v.into_bytes()))
                .unwrap()
        })
        .collect();

    await_waiters(&manager, fut, waiters);
    assert_eq!(manager.set(fut, b"12345678").unwrap(), waiters);
    assert_eq!(manager.waiter_count(fut).unwrap(), 0);

    for thread in threads {
        let value = thread.join().unwrap().unwrap();
        assert_eq!(&value[..], b"12345678");
    }

    manager.free(fut).unwrap();
    let stats = manager.stats();
    assert_eq!(stats.total_wakeups, waiters as u64);
    assert_eq!(stats.live_futures, 0);
    assert_eq!(stats.bytes_in_use, 0);
}

#[test]
fn test_broadcast_no_waiters() {
    broadcast(0);
}

#[test]
fn test_broadcast_single_waiter() {
    broadcast(1);
}

#[test]
fn test_broadcast_five_waiters() {
    broadcast(5);
}

#[test]
fn test_broadcast_hundred_waiters() {
    broadcast(100);
}

#[test]
fn test_wait_blocks_until_set() {
    let (scheduler, manager) = setup();
    let fut = manager.create(2).unwrap();

    let waiter = {
        let manager = Arc::clone(&manager);
        scheduler.spawn(move || manager.wait(fut)).unwrap()
    };

    await_waiters(&manager, fut, 1);
    // Still queued: nothing has been set
    thread::sleep(Duration::from_millis(20));
    assert_eq!(manager.waiter_count(fut).unwrap(), 1);
    assert!(!manager.is_ready(fut).unwrap());

    let producer = {
        let manager = Arc::clone(&manager);
        scheduler.spawn(move || manager.set(fut, b"ok")).unwrap()
    };

    assert_eq!(producer.join().unwrap(), Ok(1));
    assert_eq!(waiter.join().unwrap().unwrap().as_bytes(), b"ok");
}

#[test]
fn test_wait_after_set_does_not_suspend() {
    let (scheduler, manager) = setup();
    let fut = manager.create(3).unwrap();
    manager.set(fut, b"now").unwrap();

    assert_eq!(manager.wait(fut).unwrap().as_bytes(), b"now");
    assert_eq!(scheduler.stats().suspensions, 0);
}

#[test]
fn test_second_set_wakes_nobody() {
    let (scheduler, manager) = setup();
    let fut = manager.create(1).unwrap();

    let waiter = {
        let manager = Arc::clone(&manager);
        scheduler.spawn(move || manager.wait(fut)).unwrap()
    };
    await_waiters(&manager, fut, 1);

    assert_eq!(manager.set(fut, &[1]).unwrap(), 1);
    assert_eq!(manager.set(fut, &[2]).unwrap(), 0);

    // Depending on when it resumed the waiter saw either value; later readers see the second
    let seen = waiter.join().unwrap().unwrap();
    assert!(seen.as_bytes() == [1u8] || seen.as_bytes() == [2u8]);
    assert_eq!(manager.wait(fut).unwrap().as_bytes(), &[2u8]);
    assert_eq!(scheduler.stats().wakeups, 1);
}

#[test]
fn test_reject_second_set() {
    let scheduler = Arc::new(ParkingScheduler::new());
    let config = FutureConfig {
        set_policy: SetPolicy::RejectSecond,
        ..FutureConfig::default()
    };
    let manager = FutureManager::with_config(scheduler, config);
    let fut = manager.create(1).unwrap();

    manager.set(fut, &[1]).unwrap();
    assert_eq!(manager.set(fut, &[2]), Err(FutureError::AlreadySet(fut.0)));
    assert_eq!(manager.wait(fut).unwrap().as_bytes(), &[1u8]);
}

#[test]
fn test_free_with_pending_waiters_is_refused() {
    let (scheduler, manager) = setup();
    let fut = manager.create(4).unwrap();

    let waiter = {
        let manager = Arc::clone(&manager);
        scheduler.spawn(move || manager.wait(fut)).unwrap()
    };
    await_waiters(&manager, fut, 1);

    assert_eq!(
        manager.free(fut),
        Err(FutureError::WaitersPending {
            handle: fut.0,
            waiters: 1
        })
    );
    assert_eq!(manager.stats().live_futures, 1);

    manager.set(fut, b"done").unwrap();
    assert_eq!(waiter.join().unwrap().unwrap().as_bytes(), b"done");
    manager.free(fut).unwrap();
    assert_eq!(manager.stats().bytes_in_use, 0);
}

#[test]
fn test_zero_capacity_future() {
    let (_, manager) = setup();
    let fut = manager.create(0).unwrap();
    manager.set(fut, &[]).unwrap();
    assert!(manager.wait(fut).unwrap().is_empty());
    manager.free(fut).unwrap();
}

#[test]
fn test_oversized_set_is_rejected() {
    let (_, manager) = setup();
    let fut = manager.create(2).unwrap();
    assert_eq!(
        manager.set(fut, b"too long"),
        Err(FutureError::SizeMismatch {
            length: 8,
            capacity: 2
        })
    );
    assert!(manager.try_get(fut).unwrap().is_none());
}

#[test]
fn test_independent_futures() {
    let (scheduler, manager) = setup();
    let a = manager.create(1).unwrap();
    let b = manager.create(1).unwrap();

    let waiter = {
        let manager = Arc::clone(&manager);
        scheduler
            .spawn(move || {
                let first = manager.wait(a).unwrap();
                let second = manager.wait(b).unwrap();
                [first[0], second[0]]
            })
            .unwrap()
    };

    await_waiters(&manager, a, 1);
    manager.set(a, &[10]).unwrap();
    await_waiters(&manager, b, 1);
    manager.set(b, &[20]).unwrap();

    assert_eq!(waiter.join().unwrap(), [10, 20]);
}
