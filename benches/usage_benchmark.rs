use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use locker_admin::models::{Reservation, UsageStats};

const STATUSES: [Option<&str>; 4] = [Some("active"), Some("completed"), Some("cancelled"), None];

/// Deterministic synthetic snapshot spread over lockers, hours and days.
fn synthetic_reservations(count: usize) -> Vec<Reservation> {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    (0..count)
        .map(|i| {
            let created = base + Duration::minutes((i * 37) as i64);
            let start = created + Duration::minutes(30);
            // Every 13th record has no end time (excluded from the average)
            let end = (i % 13 != 0).then(|| start + Duration::minutes(25 + (i % 90) as i64));

            Reservation {
                id: format!("res-{}", i),
                locker_id: format!("L-{}", i % 40),
                user_id: format!("user-{}", i % 100),
                created_at: Some(created),
                start_at: Some(start),
                end_at: end,
                status: STATUSES[i % STATUSES.len()].map(String::from),
            }
        })
        .collect()
}

fn benchmark_compute(c: &mut Criterion) {
    let small = synthetic_reservations(100);
    let large = synthetic_reservations(10_000);

    let mut group = c.benchmark_group("usage_stats");

    group.bench_function("compute_100", |b| {
        b.iter(|| UsageStats::compute(black_box(&small)))
    });

    group.bench_function("compute_10000", |b| {
        b.iter(|| UsageStats::compute(black_box(&large)))
    });

    group.finish();
}

criterion_group!(benches, benchmark_compute);
criterion_main!(benches);
