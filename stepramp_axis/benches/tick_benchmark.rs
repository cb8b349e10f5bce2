//! Tick benchmark: cost of one `VelocityRamp::tick` in each regime.
//!
//! The tick must stay well below the tick interval (100 µs reference) and
//! take the same time regardless of state.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use stepramp_axis::{NullOutput, PulseRecorder, RampParams, StepOutput, VelocityRamp};

/// Ticks per measured iteration (1 s of axis time at 100 µs).
const BATCH: u32 = 10_000;

fn idle_ramp() -> VelocityRamp<NullOutput> {
    VelocityRamp::new(RampParams::REFERENCE, NullOutput)
}

/// Axis already stepping at a steady 2000 steps/s.
fn cruising_ramp<O: StepOutput>(output: O) -> VelocityRamp<O> {
    let mut ramp = VelocityRamp::new(RampParams::REFERENCE, output);
    ramp.set_acceleration(10_000_000);
    ramp.set_target_speed(4_000_000);
    for _ in 0..1_000 {
        ramp.tick();
    }
    ramp
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");

    group.bench_function("idle", |b| {
        let mut ramp = idle_ramp();
        b.iter(|| {
            for _ in 0..BATCH {
                black_box(&mut ramp).tick();
            }
        });
    });

    group.bench_function("cruising", |b| {
        let mut ramp = cruising_ramp(NullOutput);
        b.iter(|| {
            for _ in 0..BATCH {
                black_box(&mut ramp).tick();
            }
        });
    });

    group.bench_function("cruising_recorded", |b| {
        let mut ramp = cruising_ramp(PulseRecorder::new());
        b.iter(|| {
            for _ in 0..BATCH {
                black_box(&mut ramp).tick();
            }
        });
    });

    group.finish();
}

/// Continuous back-and-forth ramping so every refresh changes speed.
fn bench_ramping(c: &mut Criterion) {
    let mut group = c.benchmark_group("ramping");

    for accel in [100_000, 10_000_000, i32::MAX] {
        group.bench_with_input(BenchmarkId::from_parameter(accel), &accel, |b, &accel| {
            let mut ramp = idle_ramp();
            ramp.set_acceleration(accel);
            let mut forward = true;
            b.iter(|| {
                let target = if forward { i32::MAX } else { i32::MIN };
                ramp.set_target_speed(target);
                for _ in 0..BATCH {
                    black_box(&mut ramp).tick();
                }
                forward = !forward;
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_tick, bench_ramping);
criterion_main!(benches);
