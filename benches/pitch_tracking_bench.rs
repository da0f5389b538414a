//! Performance benchmarks for pitch tracking

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use stratum_pitch::features::pitch::amdf::estimate_frame_f0;
use stratum_pitch::{analyze_pitch, AnalysisConfig, RawSignal};

fn speech_like(seconds: usize, sample_rate: u32) -> Vec<f32> {
    // 150 Hz with two harmonics and a slow 3 Hz pitch movement
    let mut phase = 0.0f32;
    (0..seconds * sample_rate as usize)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            let f0 = 150.0 + 20.0 * (2.0 * std::f32::consts::PI * 3.0 * t).sin();
            phase += 2.0 * std::f32::consts::PI * f0 / sample_rate as f32;
            phase.sin() + 0.5 * (2.0 * phase).sin() + 0.25 * (3.0 * phase).sin()
        })
        .collect()
}

fn bench_analyze_pitch(c: &mut Criterion) {
    let signal = RawSignal::new(speech_like(10, 16000), 16000).unwrap();
    let parallel = AnalysisConfig::default();
    let sequential = AnalysisConfig {
        parallel: false,
        ..AnalysisConfig::default()
    };

    c.bench_function("analyze_pitch_10s_parallel", |b| {
        b.iter(|| {
            let _ = analyze_pitch(black_box(&signal), black_box(&parallel));
        });
    });

    c.bench_function("analyze_pitch_10s_sequential", |b| {
        b.iter(|| {
            let _ = analyze_pitch(black_box(&signal), black_box(&sequential));
        });
    });
}

fn bench_single_frame(c: &mut Criterion) {
    let samples = speech_like(1, 16000);

    c.bench_function("amdf_frame_mid_16k", |b| {
        b.iter(|| estimate_frame_f0(black_box(&samples), black_box(1000), 147, 27, 16000));
    });
}

criterion_group!(benches, bench_analyze_pitch, bench_single_frame);
criterion_main!(benches);
