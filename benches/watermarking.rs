use criterion::{black_box, criterion_group, criterion_main, Criterion};

use aquamark::{WatermarkConfig, Watermarker};
use std::f64::consts::TAU;

fn sine_host(len: usize) -> Vec<f32> {
    (0..len)
        .map(|n| 0.5 * (TAU * 440.0 * n as f64 / 44_100.0).sin() as f32)
        .collect()
}

fn benchmark_embed(c: &mut Criterion) {
    let watermarker = Watermarker::new(WatermarkConfig::default()).unwrap();
    let host = sine_host(60_000);

    c.bench_function("embed_frame_chip256", |b| {
        b.iter(|| watermarker.embed(black_box(&host), black_box(123_456)).unwrap())
    });

    let robust = Watermarker::new(WatermarkConfig {
        chip_rate: 512,
        telecom_mode: true,
        ..Default::default()
    })
    .unwrap();
    c.bench_function("embed_frame_chip512_telecom", |b| {
        b.iter(|| robust.embed(black_box(&host), black_box(123_456)).unwrap())
    });
}

fn benchmark_extract(c: &mut Criterion) {
    let watermarker = Watermarker::new(WatermarkConfig::default()).unwrap();
    let marked = watermarker.embed(&sine_host(60_000), 123_456).unwrap();

    c.bench_function("extract_frame_chip256", |b| {
        b.iter(|| watermarker.extract(black_box(&marked)).unwrap())
    });
}

fn benchmark_pn_generation(c: &mut Criterion) {
    let watermarker = Watermarker::new(WatermarkConfig::default()).unwrap();
    c.bench_function("generate_pn_frame", |b| {
        b.iter(|| watermarker.generate_pn(black_box(102 * 256)))
    });
}

criterion_group!(
    benches,
    benchmark_embed,
    benchmark_extract,
    benchmark_pn_generation
);
criterion_main!(benches);
