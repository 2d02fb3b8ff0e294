use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use effcurve_core::{EfficiencyComputer, MeasurementSample, ParameterEstimator, SampleLog};

// Synthetic run: load climbs linearly, rpm sags, voltage follows the model plus noise
fn synth_log(n: usize, noise_amp: f64, seed: u32) -> SampleLog {
    // tiny PRNG
    let mut state = seed.max(1);
    let mut next_f64 = || {
        let mut x = state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        state = x;
        f64::from(x) / (f64::from(u32::MAX) + 1.0)
    };
    (0..n)
        .map(|i| {
            let current = 2.0 + 0.05 * i as f64;
            let rpm = 7000.0 - 1.5 * i as f64;
            let v = 0.05 * current + 0.0005 * std::f64::consts::TAU * rpm;
            let noise = (next_f64() * 2.0 - 1.0) * noise_amp;
            MeasurementSample::new(current, rpm, v + noise)
        })
        .collect()
}

pub fn bench_fit_and_curve(c: &mut Criterion) {
    let mut g = c.benchmark_group("fit_and_curve");
    //   BENCH_SAMPLE_SIZE=10 BENCH_MEAS_MS=50 cargo bench -p effcurve_core --bench estimator
    if let Ok(ss) = std::env::var("BENCH_SAMPLE_SIZE") {
        if let Ok(n) = ss.parse::<usize>() {
            g.sample_size(n.max(10));
        }
    } else {
        g.sample_size(50);
    }
    if let Ok(ms) = std::env::var("BENCH_MEAS_MS")
        && let Ok(ms_u64) = ms.parse::<u64>()
    {
        g.measurement_time(std::time::Duration::from_millis(ms_u64));
    }

    let log = synth_log(2_000, 0.01, 0xC0FFEE);

    for &window in &[10usize, 100, 1_000] {
        g.bench_function(format!("estimate_window_{window}"), |b| {
            let est = ParameterEstimator::with_window(window);
            b.iter(|| black_box(est.estimate(black_box(&log))))
        });
    }

    if let Ok(model) = ParameterEstimator::default().estimate(&log) {
        let comp = EfficiencyComputer::new(model);
        g.bench_function("efficiency_2000", |b| {
            b.iter_batched(
                || log.clone(),
                |l| black_box(comp.compute(black_box(&l))),
                BatchSize::SmallInput,
            )
        });
    }
    g.finish();
}

criterion_group!(estimator, bench_fit_and_curve);
criterion_main!(estimator);
