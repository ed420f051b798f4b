use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use distmap::{DistanceTransform, Execution, TransformOptions};
use ndarray::Array3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const SIZES: &[usize] = &[32, 64, 128];

fn random_mask(size: usize) -> Array3<bool> {
    let mut rng = ChaCha8Rng::seed_from_u64(size as u64);
    Array3::from_shape_fn((size, size, size), |_| rng.random_bool(0.9))
}

fn bench_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("transform");
    group.sample_size(20);

    for &size in SIZES {
        let mask = random_mask(size);
        group.throughput(Throughput::Elements((size * size * size) as u64));

        for (name, options) in [
            ("edt", TransformOptions::unsigned()),
            ("sedt", TransformOptions::signed()),
            (
                "edt_sequential",
                TransformOptions::unsigned().with_execution(Execution::Sequential),
            ),
        ] {
            let transform = DistanceTransform::new(options);
            let mut output = Array3::zeros(mask.raw_dim());

            group.bench_with_input(BenchmarkId::new(name, size), &mask, |b, mask| {
                b.iter(|| {
                    transform
                        .compute_into(black_box(mask.view()), &mut output)
                        .unwrap()
                });
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_transform);
criterion_main!(benches);
