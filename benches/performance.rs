//! Performance benchmarks for the cart store.

use cartstore::{
    decode_snapshot, encode_snapshot, CartEntry, CartStore, CartStoreConfig, MemoryStorage,
    Product,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;

fn filled_cart(size: usize) -> Vec<CartEntry> {
    (0..size)
        .map(|i| {
            let mut entry = CartEntry::from_product(Product::new(
                format!("product-{}", i),
                format!("Product number {}", i),
                format!("https://cdn.example.com/img/{}.png", i),
                (i % 100) as f64 + 0.99,
            ));
            entry.quantity = (i % 5) as u32 + 1;
            entry
        })
        .collect()
}

/// Benchmark a mutation including snapshot encoding and queueing.
fn bench_mutations(c: &mut Criterion) {
    let mut group = c.benchmark_group("mutations");

    for cart_size in [1, 10, 100] {
        group.bench_with_input(
            BenchmarkId::new("increment", cart_size),
            &cart_size,
            |b, &size| {
                let store =
                    CartStore::new(Arc::new(MemoryStorage::new()), CartStoreConfig::default())
                        .unwrap();
                for i in 0..size {
                    store.add_to_cart(Product::new(format!("p{}", i), "Item", "u", 1.0));
                }
                let last = format!("p{}", size - 1);

                b.iter(|| {
                    black_box(store.increment(last.as_str()));
                });
                store.flush().unwrap();
            },
        );
    }

    group.finish();
}

/// Benchmark encoding and decoding the durable record.
fn bench_snapshots(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshots");

    for cart_size in [10, 100, 1000] {
        let entries = filled_cart(cart_size);
        let raw = encode_snapshot(&entries).unwrap();

        group.bench_with_input(BenchmarkId::new("encode", cart_size), &entries, |b, entries| {
            b.iter(|| black_box(encode_snapshot(entries).unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("decode", cart_size), &raw, |b, raw| {
            b.iter(|| black_box(decode_snapshot(raw).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark reads while the cart is large.
fn bench_reads(c: &mut Criterion) {
    let storage = Arc::new(MemoryStorage::with_value(
        "@GoMarketplace:products",
        encode_snapshot(&filled_cart(500)).unwrap(),
    ));
    let store = CartStore::open(storage, CartStoreConfig::default()).unwrap();

    c.bench_function("entries_snapshot", |b| {
        b.iter(|| black_box(store.entries()));
    });

    c.bench_function("item_count", |b| {
        b.iter(|| black_box(store.item_count()));
    });
}

criterion_group!(benches, bench_mutations, bench_snapshots, bench_reads);
criterion_main!(benches);
