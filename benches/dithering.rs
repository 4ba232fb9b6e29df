use criterion::{
    BenchmarkId, Criterion, Throughput, criterion_group, criterion_main,
};
use pixdither::{
    ClipParams, Pix, dither_to_2bpp, dither_to_binary_lut,
    dither_to_binary_with_clip, threshold_to_binary,
};
use rand::{Rng, SeedableRng, rngs::SmallRng};
use std::hint::black_box;

fn random_pix(size: u32) -> Pix {
    let mut rng = SmallRng::seed_from_u64(42);
    let bytes: Vec<u8> = (0..size * size).map(|_| rng.random()).collect();
    Pix::from_gray_bytes(size, size, &bytes).unwrap()
}

fn bench_direct_vs_lut(c: &mut Criterion) {
    let mut group = c.benchmark_group("dither_to_binary");
    let clip = ClipParams::default();

    for size in [64u32, 256, 1024] {
        let pix = random_pix(size);
        group.throughput(Throughput::Elements((size * size) as u64));

        group.bench_with_input(
            BenchmarkId::new("direct", size),
            &pix,
            |b, pix| {
                b.iter(|| {
                    dither_to_binary_with_clip(black_box(pix), clip).unwrap()
                })
            },
        );

        group.bench_with_input(BenchmarkId::new("lut", size), &pix, |b, pix| {
            b.iter(|| dither_to_binary_lut(black_box(pix), clip).unwrap())
        });
    }

    group.finish();
}

fn bench_other_quantizers(c: &mut Criterion) {
    let pix = random_pix(512);

    c.bench_function("dither_to_2bpp_512", |b| {
        b.iter(|| dither_to_2bpp(black_box(&pix)).unwrap())
    });

    c.bench_function("threshold_to_binary_512", |b| {
        b.iter(|| threshold_to_binary(black_box(&pix), 128).unwrap())
    });
}

criterion_group!(benches, bench_direct_vs_lut, bench_other_quantizers);
criterion_main!(benches);
