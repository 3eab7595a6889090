//! # Membership Gate Benchmarks
//!
//! | Operation | Expectation |
//! |-----------|-------------|
//! | `compute_dimensions` | constant time |
//! | `probably_contains` | k bit probes under a shared lock |
//! | `record_insertion` | k bit writes under the exclusive lock |
//! | rebuild | linear in the number of enumerated keys |
//! | `try_insert` | one store insert on the fast path |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

use membership_gate::{
    compute_dimensions, GateConfig, InMemoryUserStore, MembershipGate, NewUser, NormalizedKey,
    RegistrationService,
};

fn random_emails(count: usize) -> Vec<String> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| format!("user{:016x}@example.com", rng.gen::<u64>()))
        .collect()
}

fn bench_sizing(c: &mut Criterion) {
    let mut group = c.benchmark_group("sizing");

    for capacity in [1_000usize, 100_000, 10_000_000] {
        group.bench_with_input(
            BenchmarkId::new("compute_dimensions", capacity),
            &capacity,
            |b, &capacity| b.iter(|| compute_dimensions(black_box(capacity), black_box(0.01))),
        );
    }

    group.finish();
}

fn bench_gate_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("gate");

    let existing = random_emails(10_000);
    let gate = MembershipGate::build(&existing, existing.len(), GateConfig::default())
        .expect("gate builds");
    let present = NormalizedKey::new(&existing[0]);
    let absent = NormalizedKey::new("nobody-here@example.com");

    group.bench_function("probably_contains_present", |b| {
        b.iter(|| gate.probably_contains(black_box(&present)))
    });
    group.bench_function("probably_contains_absent", |b| {
        b.iter(|| gate.probably_contains(black_box(&absent)))
    });

    let fresh: Vec<NormalizedKey> = random_emails(1_000)
        .iter()
        .map(|raw| NormalizedKey::new(raw))
        .collect();
    group.throughput(Throughput::Elements(fresh.len() as u64));
    group.bench_function("record_insertion_batch", |b| {
        b.iter(|| {
            for key in &fresh {
                gate.record_insertion(key);
            }
        })
    });

    group.finish();
}

fn bench_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("rebuild");
    group.measurement_time(Duration::from_secs(10));

    for size in [1_000usize, 10_000, 100_000] {
        let keys = random_emails(size);
        let gate = MembershipGate::build(Vec::<String>::new(), 0, GateConfig::default())
            .expect("gate builds");

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("rebuild", size), &keys, |b, keys| {
            b.iter(|| gate.rebuild(keys, keys.len(), 0.01).expect("rebuild succeeds"))
        });
    }

    group.finish();
}

fn bench_reconciled_insert(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
    let mut group = c.benchmark_group("reconciled_insert");

    let store = Arc::new(InMemoryUserStore::new());
    store.seed_if_empty();
    let service = runtime
        .block_on(RegistrationService::initialize(store, GateConfig::default()))
        .expect("service initializes");

    let mut counter = 0u64;
    group.bench_function("try_insert_new_key", |b| {
        b.iter(|| {
            counter += 1;
            let raw = format!("bench{counter}@example.com");
            runtime
                .block_on(service.try_insert(&raw, NewUser::new("Bench")))
                .expect("store is healthy")
        })
    });

    group.bench_function("try_insert_existing_key", |b| {
        b.iter(|| {
            runtime
                .block_on(service.try_insert("ada@example.com", NewUser::new("Ada")))
                .expect("store is healthy")
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_sizing,
    bench_gate_operations,
    bench_rebuild,
    bench_reconciled_insert
);
criterion_main!(benches);
