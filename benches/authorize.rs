use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, SamplingMode};
use std::sync::Arc;

use cce_access::identity::{AccessControl, AccessContext, Authenticator, Claims, Role};
use cce_access::storage::MemoryStore;
use cce_access::AccessConfig;

fn bench_authorize(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().expect("runtime");
    let kv = MemoryStore::default();
    let ctx = AccessContext::init(&AccessConfig::with_secret("bench-secret"), Arc::new(kv.clone())).expect("context");
    let auth = Authenticator::new(ctx);
    let token = auth.seal(&Claims::new("bench@cce.org", Role::User)).expect("seal");

    let mut group = c.benchmark_group("authorize");
    group.sampling_mode(SamplingMode::Flat);

    // Warm cache: one lookup per request
    rt.block_on(auth.authorize(&token));
    group.bench_with_input(BenchmarkId::new("cache_hit", "memory"), &token, |b, t| {
        b.iter(|| criterion::black_box(rt.block_on(auth.authorize(t))));
    });

    // Cold cache: AEAD open + whitelist + write-back each time
    group.bench_with_input(BenchmarkId::new("cache_miss", "memory"), &token, |b, t| {
        b.iter(|| {
            kv.clear();
            criterion::black_box(rt.block_on(auth.authorize(t)))
        });
    });

    group.bench_function("seal", |b| {
        let claims = Claims::new("bench@cce.org", Role::Analyst);
        b.iter(|| criterion::black_box(auth.seal(&claims).expect("seal")));
    });

    group.finish();
}

criterion_group!(benches, bench_authorize);
criterion_main!(benches);
