use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;

use pydnet_eval::{evaluate_sample, Dataset};
use pydnet_image::Image;

fn bench_evaluate_sample(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate_sample");
    let mut rng = rand::rng();

    for (width, height) in [(512, 384), (640, 480), (1242, 375)].iter() {
        group.throughput(criterion::Throughput::Elements((*width * *height) as u64));

        let parameter_string = format!("{}x{}", width, height);

        let size = [*width, *height].into();
        let target = Image::from_fn(size, |_, _| {
            if rng.random_bool(0.3) {
                rng.random_range(1.0f32..80.0)
            } else {
                0.0
            }
        });
        let prediction = Image::from_fn(size, |_, _| rng.random_range(0.0f32..255.0));
        let bounds = Dataset::Kitti.bounds(80.0);

        group.bench_with_input(
            BenchmarkId::new("kitti", &parameter_string),
            &(target, prediction),
            |b, (t, p)| b.iter(|| evaluate_sample(black_box(t), black_box(p), bounds)),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_evaluate_sample);
criterion_main!(benches);
