use chained_hashmap::ChainedHashMap;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

fn filled(seed: u64, n: usize) -> (ChainedHashMap<String, u64>, Vec<String>) {
    let mut m = ChainedHashMap::new();
    let keys: Vec<_> = lcg(seed).take(n).map(key).collect();
    for (i, k) in keys.iter().enumerate() {
        m.put(k.clone(), i as u64);
    }
    (m, keys)
}

// Inserts from the default 16 buckets, paying for every doubling.
fn bench_put_growing(c: &mut Criterion) {
    c.bench_function("chained_put_10k_growing", |b| {
        b.iter_batched(
            || lcg(1).take(10_000).map(key).collect::<Vec<_>>(),
            |keys| {
                let mut m = ChainedHashMap::new();
                for (i, k) in keys.into_iter().enumerate() {
                    m.put(k, i as u64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

// Same inserts into a table sized so no resize happens.
fn bench_put_presized(c: &mut Criterion) {
    c.bench_function("chained_put_10k_presized", |b| {
        b.iter_batched(
            || lcg(1).take(10_000).map(key).collect::<Vec<_>>(),
            |keys| {
                let mut m = ChainedHashMap::with_capacity(16_384).unwrap();
                for (i, k) in keys.into_iter().enumerate() {
                    m.put(k, i as u64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit(c: &mut Criterion) {
    c.bench_function("chained_get_hit", |b| {
        let (m, keys) = filled(7, 20_000);
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(m.get(k));
        })
    });
}

fn bench_get_miss(c: &mut Criterion) {
    c.bench_function("chained_get_miss", |b| {
        let (m, _) = filled(11, 10_000);
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            let k = key(miss.next().unwrap());
            black_box(m.get(&k));
        })
    });
}

// Full scan; compare against get_hit to see the cost of unindexed values.
fn bench_contains_value(c: &mut Criterion) {
    c.bench_function("chained_contains_value_1k", |b| {
        let (m, _) = filled(13, 1_000);
        let mut v = 0u64;
        b.iter(|| {
            v = (v + 1) % 1_000;
            black_box(m.contains_value(&v));
        })
    });
}

fn bench_remove_put_cycle(c: &mut Criterion) {
    c.bench_function("chained_remove_put_cycle", |b| {
        let (mut m, keys) = filled(17, 10_000);
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            let v = m.take(k).unwrap();
            m.put(k.clone(), v);
        })
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(8))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_put_growing, bench_put_presized, bench_get_hit, bench_get_miss,
        bench_contains_value, bench_remove_put_cycle
}
criterion_main!(benches);
