//! Criterion benchmarks for the mixed-radix coordinate codec.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use et_math::RadixCodec;

fn bench_decode(c: &mut Criterion) {
    // Typical Eurostat cube: freq, unit, sex, age, geo, time.
    let sizes = [1usize, 3, 3, 12, 41, 40];
    let codec = RadixCodec::new(&sizes).expect("shape fits in u64");
    let total = codec.cardinality();

    let mut group = c.benchmark_group("radix");
    group.bench_function("decode_full_cube", |b| {
        let mut coords = vec![0usize; sizes.len()];
        b.iter(|| {
            for id in 0..total {
                codec
                    .decode_into(black_box(id), &mut coords)
                    .expect("id in range");
            }
            black_box(coords[0]);
        })
    });
    group.bench_function("encode_full_cube", |b| {
        let coords: Vec<Vec<usize>> = (0..total)
            .step_by(97)
            .map(|id| codec.decode(id).expect("id in range"))
            .collect();
        b.iter(|| {
            let mut acc = 0u64;
            for c in &coords {
                acc ^= codec.encode(black_box(c)).expect("coords in range");
            }
            black_box(acc);
        })
    });
    group.finish();
}

criterion_group!(benches, bench_decode);
criterion_main!(benches);
