use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use pixdither::{Numa, SortOrder};
use std::hint::black_box;

fn bench_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("numa_append");

    for size in [100usize, 10_000, 1_000_000] {
        group.bench_with_input(
            BenchmarkId::new("add_number", size),
            &size,
            |b, &size| {
                b.iter(|| {
                    let na = Numa::create(0).unwrap();
                    for i in 0..size {
                        na.add_number(black_box(i as f32)).unwrap();
                    }
                    na
                })
            },
        );
    }

    group.finish();
}

fn bench_sort(c: &mut Criterion) {
    let na = Numa::make_sequence(0.0, 1.0, 100_000).unwrap();

    c.bench_function("numa_sort_decreasing", |b| {
        b.iter(|| na.sort(black_box(SortOrder::Decreasing)).unwrap())
    });
}

criterion_group!(benches, bench_append, bench_sort);
criterion_main!(benches);
