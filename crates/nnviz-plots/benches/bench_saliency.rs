use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use nnviz_image::Image;
use nnviz_nn::{
    activation::{Relu, Softmax},
    conv::Conv2d,
    linear::Linear,
    network::Sequential,
    reshape::Reshape,
};
use nnviz_plots::{compute_saliency_with_config, SaliencyConfig, SaliencyMode};

fn network(size: usize) -> Sequential {
    let features = (size - 2) * (size - 2) * 8;
    Sequential::new([size, size, 3])
        .push(Conv2d::new(vec![0.01; 3 * 3 * 3 * 8], vec![0.0; 8], (3, 3), 3, 8).unwrap())
        .unwrap()
        .push(Relu::new())
        .unwrap()
        .push(Reshape::flatten())
        .unwrap()
        .push(Linear::new(vec![0.001; features * 10], vec![0.0; 10], features, 10).unwrap())
        .unwrap()
        .push(Softmax::new())
        .unwrap()
}

fn bench_saliency(c: &mut Criterion) {
    let mut group = c.benchmark_group("Saliency Map");

    for size in [28, 64].iter() {
        group.throughput(criterion::Throughput::Elements((*size * *size) as u64));

        let model = network(*size);
        let image_data = (0..size * size * 3).map(|i| (i % 255) as f32 / 255.0).collect();
        let image = Image::<f32, 3>::new([*size, *size].into(), image_data).unwrap();

        for mode in [SaliencyMode::Heatmap, SaliencyMode::Raw] {
            let config = SaliencyConfig {
                mode,
                ..Default::default()
            };
            group.bench_with_input(
                BenchmarkId::new(format!("saliency_{mode}"), size),
                &(&model, &image),
                |b, i| b.iter(|| black_box(compute_saliency_with_config(i.0, i.1, &config))),
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_saliency);
criterion_main!(benches);
