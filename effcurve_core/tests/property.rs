use effcurve_core::mocks::{Reply, ScriptedTelemetry};
use effcurve_core::{
    EfficiencyComputer, MeasurementSample, MotorModel, PolePairs, SampleLog, SamplingCfg,
    SamplingEnd, SamplingLoop, StoppingPolicy,
};
use effcurve_traits::clock::test_clock::TestClock;
use proptest::prelude::*;

fn finite() -> impl Strategy<Value = f64> {
    -1.0e6..1.0e6f64
}

proptest! {
    #[test]
    fn rpm_is_exact_division(pp in 1i64..=64, erpm in -1.0e7..1.0e7f64) {
        let pole_pairs = PolePairs::new(pp).unwrap();
        prop_assert_eq!(pole_pairs.to_mechanical_rpm(erpm), erpm / pp as f64);
    }

    #[test]
    fn efficiency_always_within_bounds(
        r in finite(), c in finite(),
        current in finite(), rpm in finite(), voltage in finite(),
    ) {
        let comp = EfficiencyComputer::new(MotorModel { r_ohm: r, c });
        let eff = comp.efficiency_of(&MeasurementSample::new(current, rpm, voltage));
        prop_assert!((0.0..=100.0).contains(&eff), "eff = {}", eff);
    }

    #[test]
    fn one_point_per_sample_in_order(currents in prop::collection::vec(0.0..80.0f64, 0..40)) {
        let log: SampleLog = currents
            .iter()
            .map(|&i| MeasurementSample::new(i, 5000.0, 24.0))
            .collect();
        let pts = EfficiencyComputer::new(MotorModel { r_ohm: 0.05, c: 0.0005 }).compute(&log);
        prop_assert_eq!(pts.len(), log.len());
        for (p, s) in pts.iter().zip(log.iter()) {
            prop_assert_eq!(p.current, s.current());
        }
    }

    #[test]
    fn stop_iff_over_current_or_below_floor(
        pp in 1i64..=32, current in 0.0..120.0f64, rpm in -500.0..2000.0f64,
    ) {
        let pole_pairs = PolePairs::new(pp).unwrap();
        let policy = StoppingPolicy::for_pole_pairs(pole_pairs);
        let s = MeasurementSample::new(current, rpm, 24.0);
        let expected = current > 60.0 || rpm < 1000.0 / pp as f64;
        prop_assert_eq!(policy.should_halt(&s), expected);
    }

    #[test]
    fn loop_stops_exactly_at_first_halting_sample(
        currents in prop::collection::vec(0.0..59.0f64, 0..30),
        trip in 60.5..200.0f64,
    ) {
        let mut script: Vec<Reply> = currents.iter().map(|&i| Reply::frame(i, 35_000.0, 24.0)).collect();
        script.push(Reply::frame(trip, 35_000.0, 24.0));
        script.push(Reply::frame(1.0, 35_000.0, 24.0));
        let mut tel = ScriptedTelemetry::new(script);
        let pole_pairs = PolePairs::new(7).unwrap();
        let clock = TestClock::new();
        let (log, end) = SamplingLoop::new(&SamplingCfg::default(), pole_pairs)
            .run(&mut tel, &clock)
            .unwrap();
        prop_assert!(matches!(end, SamplingEnd::Stopped(_)));
        prop_assert_eq!(log.len(), currents.len() + 1);
        prop_assert_eq!(log.last().unwrap().current(), trip);
    }
}
