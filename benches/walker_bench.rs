//! Benchmarks for catalog-walker
//!
//! Run with: cargo bench

use catalog_walker::{Category, Product};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

fn sample_products(n: i64) -> Vec<Product> {
    (0..n)
        .map(|i| {
            let origin = match i % 4 {
                0 => Some("SE"),
                1 => Some("DK"),
                2 => Some("NO"),
                _ => None,
            };
            Product::new(i, (i * 7919) % 10_000, origin)
        })
        .collect()
}

fn sample_tree(width: usize) -> Category {
    let children = (0..width)
        .map(|i| {
            let leaves = (0..width)
                .map(|j| Category::new((i * width + j) as i64, 3, vec![]))
                .collect::<Vec<_>>();
            Category::new(i as i64, 3 * width as i64 + 1, leaves)
        })
        .collect::<Vec<_>>();
    let total = children.iter().map(|c| c.count).sum();
    Category::new(-1, total, children)
}

fn benchmark_stats(c: &mut Criterion) {
    use catalog_walker::walker::stats::{compute, origin_percentage, StatsOptions};

    let options = StatsOptions::default();
    let products = sample_products(500);

    c.bench_function("stats_compute_500", |b| {
        b.iter_batched(
            || products.clone(),
            |products| black_box(compute(2000, 1500, products, &options)),
            BatchSize::SmallInput,
        )
    });

    c.bench_function("origin_percentage_500", |b| {
        b.iter(|| black_box(origin_percentage(&products, "SE")))
    });
}

fn benchmark_queue_operations(c: &mut Criterion) {
    use catalog_walker::walker::queue::{work_queue, Tasks};
    use catalog_walker::walker::CancelToken;

    let tree = sample_tree(30);
    let cancel = CancelToken::new();

    c.bench_function("queue_send_recv_931_nodes", |b| {
        b.iter_batched(
            || tree.clone(),
            |mut tree| {
                let (tx, rx) = work_queue(1);
                let mut received = 0usize;
                for task in Tasks::new(&mut tree) {
                    tx.send(task, &cancel);
                    if let Some(task) = rx.recv(&cancel) {
                        received += black_box(task.index);
                    }
                }
                received
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, benchmark_stats, benchmark_queue_operations);
criterion_main!(benches);
