use criterion::{criterion_group, criterion_main, Criterion};
use gotogym::config::LimiterConfig;
use gotogym::services::RateLimiter;
use std::hint::black_box;
use std::time::Duration;
use tokio::time::Instant;

fn limiter() -> RateLimiter {
    RateLimiter::new(&LimiterConfig {
        rps: 1_000_000.0,
        burst: 1_000,
        enabled: true,
        cleanup_interval: Duration::from_secs(60),
    })
}

fn benchmark_admit(c: &mut Criterion) {
    let mut group = c.benchmark_group("rate_limiter_admit");

    // One hot client: every call refills and spends the same bucket
    let hot = limiter();
    group.bench_function("single_client", |b| {
        b.iter(|| hot.admit(black_box("203.0.113.7")))
    });

    // Many clients spread over the map shards
    let spread = limiter();
    let clients: Vec<String> = (0..10_000)
        .map(|i| format!("10.{}.{}.{}", i / 65_536, (i / 256) % 256, i % 256))
        .collect();
    let mut next = 0;
    group.bench_function("10k_clients", |b| {
        b.iter(|| {
            next = (next + 1) % clients.len();
            spread.admit(black_box(&clients[next]))
        })
    });

    group.finish();
}

fn benchmark_sweep(c: &mut Criterion) {
    c.bench_function("rate_limiter_sweep_10k_live", |b| {
        let limiter = limiter();
        let now = Instant::now();
        for i in 0..10_000 {
            limiter.admit_at(&format!("client-{i}"), now);
        }
        b.iter(|| limiter.sweep_at(black_box(now)))
    });
}

criterion_group!(benches, benchmark_admit, benchmark_sweep);
criterion_main!(benches);
