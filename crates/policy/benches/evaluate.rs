use std::collections::HashSet;

use chrono::Utc;
use criterion::{Criterion, black_box, criterion_group, criterion_main};

use warden_core::{Policy, TenantId, User};
use warden_policy::{PolicyEngine, PolicySnapshot};
use warden_scanner::seed_policies;

fn test_user() -> User {
    User {
        id: "bench-user".into(),
        email: "bench@example.com".into(),
        role: "analyst".into(),
        tenant_id: TenantId::new("tenant-bench"),
        permissions: HashSet::new(),
    }
}

/// Replicate the built-in library out to ~200 policies with distinct ids,
/// matching the engine's target working set.
fn large_snapshot() -> PolicySnapshot {
    let base = seed_policies();
    let mut rows: Vec<(Policy, Option<warden_core::PolicyOverride>)> = Vec::new();
    let mut n = 0;
    while rows.len() < 200 {
        for p in &base {
            if rows.len() >= 200 {
                break;
            }
            let mut clone = p.clone();
            clone.policy_id = format!("{}-{n}", p.policy_id).into();
            rows.push((clone, None));
        }
        n += 1;
    }
    PolicySnapshot::build(rows, Utc::now()).unwrap()
}

/// A ~10 KB clean input: worst case, since nothing short-circuits.
fn large_clean_input() -> String {
    "SELECT order_id, customer_name, total FROM orders WHERE region = 'emea' "
        .repeat(140)
}

fn bench_clean_input(c: &mut Criterion) {
    let snapshot = large_snapshot();
    let engine = PolicyEngine::new();
    let user = test_user();
    let input = large_clean_input();

    c.bench_function("evaluate_200_policies_10kb_clean", |b| {
        b.iter(|| {
            black_box(engine.evaluate(
                black_box(&user),
                black_box(&input),
                "sql",
                black_box(&snapshot),
            ))
        });
    });
}

fn bench_early_block(c: &mut Criterion) {
    let snapshot = large_snapshot();
    let engine = PolicyEngine::new();
    let user = test_user();
    let input = "SELECT * FROM users WHERE id='1' OR '1'='1'";

    c.bench_function("evaluate_200_policies_sqli_block", |b| {
        b.iter(|| {
            black_box(engine.evaluate(
                black_box(&user),
                black_box(input),
                "sql",
                black_box(&snapshot),
            ))
        });
    });
}

fn bench_builtin_snapshot(c: &mut Criterion) {
    let rows = seed_policies().into_iter().map(|p| (p, None)).collect();
    let snapshot = PolicySnapshot::build(rows, Utc::now()).unwrap();
    let engine = PolicyEngine::new();
    let user = test_user();
    let input = "My SSN is 123-45-6789 and my card is 4111 1111 1111 1111";

    c.bench_function("evaluate_builtin_snapshot_pii", |b| {
        b.iter(|| {
            black_box(engine.evaluate(
                black_box(&user),
                black_box(input),
                "llm_chat",
                black_box(&snapshot),
            ))
        });
    });
}

criterion_group!(
    benches,
    bench_clean_input,
    bench_early_block,
    bench_builtin_snapshot
);
criterion_main!(benches);
