use criterion::{Criterion, black_box, criterion_group, criterion_main};
use kiln_core::Profile;
use kiln_core::setpoint::setpoint;

fn bench_setpoint(c: &mut Criterion) {
    c.bench_function("setpoint_single", |b| {
        b.iter(|| {
            setpoint(
                black_box(25.0),
                black_box(1260.0),
                black_box(14_400.0),
                black_box(3_600.0),
            )
        });
    });

    // Full sweep of a ten-phase profile at 1 Hz, the per-firing workload.
    let profile = Profile::from_pairs((0..10u32).map(|i| (1800, 100.0 * f64::from(i + 1)))).unwrap();
    c.bench_function("profile_sweep_1hz", |b| {
        b.iter(|| {
            let mut acc = 0.0;
            for (i, phase) in profile.phases().iter().enumerate() {
                for t in 1..=phase.duration_s() {
                    acc += profile
                        .setpoint_at(i, t as f64, kiln_core::DEFAULT_AMBIENT_C)
                        .unwrap_or_default();
                }
            }
            black_box(acc)
        });
    });
}

criterion_group!(benches, bench_setpoint);
criterion_main!(benches);
