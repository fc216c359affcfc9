use criterion::{black_box, criterion_group, criterion_main, Criterion};
use keyline_animation_core::{
    interp::{self, EASE_IN_OUT},
    AnimatorConfig, Config, Engine, PropertyMap, TargetId, Timeline, Value,
};

const OWNER: TargetId = TargetId(1);

/// 50 targets x 3 channels, a key frame every 100 ms for 10 s.
fn mk_timeline() -> Timeline {
    let mut tl = Timeline::new(OWNER);
    let ease = interp::get(EASE_IN_OUT);
    for target in 2..52u64 {
        let target = TargetId(target);
        tl.add_target(target);
        for step in 0..=100u64 {
            let t = step * 100;
            let phase = (step as f64 * 0.1 + target.0 as f64).sin();
            tl.set_key_frame_key_value(t, target, "x", Value::n(phase * 100.0), Some(ease.clone()))
                .unwrap();
            tl.set_key_frame_key_value(t, target, "pos", Value::vec2(phase, -phase), None)
                .unwrap();
            let fill = Value::rgba(phase.abs(), 0.5, 0.5, 1.0);
            tl.set_key_frame_key_value(t, target, "fill", fill, None)
                .unwrap();
        }
    }
    tl
}

fn bench_evaluate(c: &mut Criterion) {
    let tl = mk_timeline();
    let mut group = c.benchmark_group("timeline_evaluate");
    group.bench_function("evaluate_150_channels", |b| {
        let mut t = 0u64;
        b.iter(|| {
            t = (t + 17) % 10_000;
            black_box(tl.evaluate(black_box(t)))
        })
    });
    group.bench_function("value_at_single_channel", |b| {
        b.iter(|| black_box(tl.value_at(black_box(4_321), TargetId(20), "x")))
    });
    group.finish();
}

fn bench_engine_advance(c: &mut Criterion) {
    let mut engine = Engine::new(Config {
        animator: AnimatorConfig {
            max_time_ms: 10_000,
            loops: true,
            ..AnimatorConfig::default()
        },
        ..Config::default()
    });
    engine.shape_added(OWNER, None);
    for target in 2..52u64 {
        engine.shape_added(TargetId(target), Some(OWNER));
    }
    let id = engine.load_timeline(mk_timeline());
    let mut props = PropertyMap::new();
    engine.play(id, &mut props).unwrap();

    c.bench_function("engine_advance_16ms", |b| {
        b.iter(|| black_box(engine.advance(id, 16, &mut props)))
    });
}

fn bench_structural(c: &mut Criterion) {
    let base = mk_timeline();
    c.bench_function("shift_then_scale", |b| {
        b.iter(|| {
            let mut tl = base.clone();
            tl.shift_frames(2_000, 500);
            tl.scale_frames(1_000, 10_500, 8_000);
            black_box(tl.frame_count())
        })
    });
}

criterion_group!(benches, bench_evaluate, bench_engine_advance, bench_structural);
criterion_main!(benches);
