#![allow(
    clippy::unwrap_used,
    clippy::default_numeric_fallback,
    reason = "benchmark"
)]

use {
    criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main},
    encblock_protocol::{Cid, Codec},
    encblock_sdk::{EncBlockstore, backend::MemoryBlockstore},
};

fn open_store() -> EncBlockstore<MemoryBlockstore> {
    let mut store = EncBlockstore::new(MemoryBlockstore::new());
    store
        .init_from_bytes(b"strong-password-is-strong1", b"salty-salt-is-salty1")
        .unwrap();
    store.open().unwrap();
    store
}

fn criterion_benchmark(c: &mut Criterion) {
    let store = open_store();

    let mut group = c.benchmark_group("put");
    for size in [1024, 256 * 1024, 1024 * 1024] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter_batched(
                || {
                    let input = (0..size).map(|_| rand::random::<u8>()).collect::<Vec<u8>>();
                    (Cid::for_block(Codec::Raw, &input), input)
                },
                |(cid, input)| store.put(&cid, &input).unwrap(),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();

    let mut group = c.benchmark_group("get");
    for size in [1024, 256 * 1024, 1024 * 1024] {
        let input = (0..size).map(|_| rand::random::<u8>()).collect::<Vec<u8>>();
        let cid = Cid::for_block(Codec::Raw, &input);
        store.put(&cid, &input).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &cid, |b, cid| {
            b.iter(|| store.get(cid).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
