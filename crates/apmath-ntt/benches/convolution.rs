//! Convolution hot path benchmark.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use apmath_ntt::{Context, DataStorage, LongLimb, NttBuilder, NttLimb, ThreeNttConvolution};

fn storage(n: usize, base: u64) -> DataStorage<LongLimb> {
    let digits: Vec<u64> = (0..n as u64).map(|i| (i * 2_654_435_761 + 17) % base).collect();
    let mut s = DataStorage::<LongLimb>::cached(n);
    s.write_block(0, &digits).unwrap();
    s
}

fn bench_convolute(c: &mut Criterion) {
    let ctx = Context::default();
    let (_, base) = LongLimb::base_digits(10);

    let mut group = c.benchmark_group("three_ntt_convolute");
    for &n in &[1 << 10, 1 << 14, 3 << 14, 1 << 17] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let x = storage(n, base);
            let y = storage(n, base);
            let strategy = NttBuilder::new(&ctx).create::<LongLimb>(2 * n as u64).unwrap();
            let conv = ThreeNttConvolution::<LongLimb>::new(&ctx, 10, strategy);
            b.iter(|| conv.convolute(&x, &y, 2 * n).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_convolute);
criterion_main!(benches);
