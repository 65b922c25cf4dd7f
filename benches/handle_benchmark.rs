/*!
 * Handle Benchmarks
 *
 * Per-call cost of the hot paths a reactor drives: counter signal/wait,
 * timer re-arming and memfd resizing
 */

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use kernfd::{EventFd, MemFd, TimerFd};

fn bench_eventfd_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("eventfd_round_trip");

    for semaphore in [false, true] {
        let efd = if semaphore {
            EventFd::semaphore(0).unwrap()
        } else {
            EventFd::new(0).unwrap()
        };
        let label = if semaphore { "semaphore" } else { "counter" };

        group.bench_with_input(BenchmarkId::from_parameter(label), &efd, |b, efd| {
            b.iter(|| {
                efd.signal(black_box(1)).unwrap();
                black_box(efd.wait().unwrap());
            });
        });
    }

    group.finish();
}

fn bench_eventfd_empty_wait(c: &mut Criterion) {
    let efd = EventFd::new(0).unwrap();
    c.bench_function("eventfd_empty_wait", |b| {
        b.iter(|| black_box(efd.wait().is_err()));
    });
}

fn bench_timer_rearm(c: &mut Criterion) {
    let timer = TimerFd::new().unwrap();
    c.bench_function("timerfd_arm_disarm", |b| {
        b.iter(|| {
            timer.arm(black_box(1_000_000_000), 0).unwrap();
            timer.disarm().unwrap();
        });
    });
}

fn bench_memfd_resize(c: &mut Criterion) {
    let mut group = c.benchmark_group("memfd_resize");

    for size in [4096u64, 1 << 20] {
        let mfd = MemFd::new("bench").unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                mfd.resize(size).unwrap();
                mfd.resize(0).unwrap();
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_eventfd_round_trip,
    bench_eventfd_empty_wait,
    bench_timer_rearm,
    bench_memfd_resize
);
criterion_main!(benches);
