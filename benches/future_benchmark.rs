/*!
 * Future Benchmarks
 *
 * Cost of the immediate path and of broadcast wake-ups on the parking scheduler
 */

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use std::thread;
use ult_future::{FutureManager, ParkingScheduler};

fn bench_immediate(c: &mut Criterion) {
    let manager = FutureManager::new(Arc::new(ParkingScheduler::new()));

    c.bench_function("create_set_wait_free", |b| {
        b.iter(|| {
            let fut = manager.create(64).unwrap();
            manager.set(fut, black_box(&[7u8; 64])).unwrap();
            black_box(manager.wait(fut).unwrap());
            manager.free(fut).unwrap();
        });
    });
}

fn bench_broadcast(c: &mut Criterion) {
    let mut group = c.benchmark_group("broadcast");

    for waiters in [1usize, 8, 32] {
        group.bench_with_input(BenchmarkId::from_parameter(waiters), &waiters, |b, &n| {
            let scheduler = Arc::new(ParkingScheduler::new());
            let manager = Arc::new(FutureManager::new(Arc::clone(&scheduler)));

            b.iter(|| {
                let fut = manager.create(8).unwrap();
                let threads: Vec<_> = (0..n)
                    .map(|_| {
                        let manager = Arc::clone(&manager);
                        scheduler.spawn(move || manager.wait(fut).is_ok()).unwrap()
                    })
                    .collect();

                while manager.waiter_count(fut).unwrap() < n {
                    thread::yield_now();
                }
                manager.set(fut, &[1; 8]).unwrap();

                for t in threads {
                    assert!(t.join().unwrap());
                }
                manager.free(fut).unwrap();
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_immediate, bench_broadcast);
criterion_main!(benches);
