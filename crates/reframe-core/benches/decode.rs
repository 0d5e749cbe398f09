//! Detection and Planning Benchmarks
//!
//! # Running Benchmarks
//! ```bash
//! cargo bench --package reframe-core --bench decode
//! ```
//!
//! # Metrics Measured
//! - Decode + NMS latency per frame for the default three-level head
//! - Batch decode throughput
//! - Scene planning throughput over long detection streams

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ndarray::ArrayD;
use reframe_core::{DecoderConfig, DetectionPipeline, NmsConfig, RawFrame, ReframeConfig, ScenePlanner};
use reframe_models::{Detection, DetectionSet};
use std::time::Duration;

/// Synthetic raw outputs for the default 640px YOLOv5 head with 2 classes.
fn synthetic_frame(frame_index: u64) -> RawFrame {
    let config = DecoderConfig::default();
    let channels = 3 * (5 + config.num_classes);
    let outputs = config
        .levels
        .iter()
        .map(|level| {
            let grid = (config.input_size / level.stride) as usize;
            ArrayD::from_shape_fn(vec![1, grid, grid, channels], |idx| {
                let (y, x, c) = (idx[1], idx[2], idx[3]);
                // mostly background, a few confident cells
                if c % 7 == 4 {
                    if (x * 31 + y * 17 + frame_index as usize) % 97 == 0 {
                        6.0
                    } else {
                        -8.0
                    }
                } else {
                    ((x * 7 + y * 13 + c) % 11) as f32 / 5.0 - 1.0
                }
            })
        })
        .collect();
    RawFrame::new(frame_index, outputs)
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    group.warm_up_time(Duration::from_secs(2));
    group.measurement_time(Duration::from_secs(5));

    let pipeline = DetectionPipeline::new(DecoderConfig::default(), NmsConfig::default());
    let frame = synthetic_frame(0);
    group.throughput(Throughput::Elements(1));
    group.bench_function("single_frame", |b| {
        b.iter(|| black_box(pipeline.detect_or_empty(black_box(&frame))))
    });

    for batch in [8usize, 32] {
        let frames: Vec<RawFrame> = (0..batch as u64).map(synthetic_frame).collect();
        group.throughput(Throughput::Elements(batch as u64));
        group.bench_with_input(BenchmarkId::new("batch", batch), &frames, |b, frames| {
            b.iter(|| black_box(pipeline.detect_batch(frames)))
        });
    }

    group.finish();
}

fn bench_scene_planning(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene_planning");

    for frames in [1_000u64, 10_000] {
        let sets: Vec<DetectionSet> = (0..frames)
            .map(|i| {
                let detections = if i % 50 < 40 {
                    vec![Detection::from_center(0.5, 0.5, 0.1, 0.2, 0, 0.9)]
                } else {
                    Vec::new()
                };
                DetectionSet::new(i, detections)
            })
            .collect();
        let planner = ScenePlanner::new(ReframeConfig::default(), 1920, 1080).expect("valid config");

        group.throughput(Throughput::Elements(frames));
        group.bench_with_input(BenchmarkId::from_parameter(frames), &sets, |b, sets| {
            b.iter(|| black_box(planner.plan(sets, frames).expect("plan")))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_decode, bench_scene_planning);
criterion_main!(benches);
