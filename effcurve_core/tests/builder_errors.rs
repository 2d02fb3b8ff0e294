use std::time::Duration;

use effcurve_core::mocks::{ScriptedTelemetry, SpyActuator};
use effcurve_core::{BackoffCfg, BuildError, PolePairs, RampCfg, Runner, SamplingCfg};
use rstest::rstest;

#[rstest]
fn missing_pole_pairs_is_reported() {
    let res = Runner::builder()
        .with_telemetry(ScriptedTelemetry::default())
        .with_actuator(SpyActuator::new())
        .build();
    assert!(matches!(res, Err(BuildError::MissingPolePairs)));
}

#[rstest]
#[case::target_above_one(RampCfg { target_duty: 1.2, ..RampCfg::default() })]
#[case::zero_step(RampCfg { step: 0.0, ..RampCfg::default() })]
#[case::zero_settle(RampCfg { settle: Duration::ZERO, ..RampCfg::default() })]
#[case::start_past_target(RampCfg { start_duty: 0.95, ..RampCfg::default() })]
fn invalid_ramp_is_rejected(#[case] ramp: RampCfg) {
    let res = Runner::builder()
        .with_telemetry(ScriptedTelemetry::default())
        .with_actuator(SpyActuator::new())
        .with_pole_pairs(PolePairs::new(7).unwrap())
        .with_ramp(ramp)
        .build();
    assert!(matches!(res, Err(BuildError::InvalidConfig(_))));
}

#[rstest]
fn zero_retry_attempts_are_rejected() {
    let res = Runner::builder()
        .with_telemetry(ScriptedTelemetry::default())
        .with_actuator(SpyActuator::new())
        .with_pole_pairs(PolePairs::new(7).unwrap())
        .with_sampling(SamplingCfg {
            cadence: Duration::from_millis(100),
            backoff: BackoffCfg::Fixed {
                attempts: 0,
                delay: Duration::from_millis(100),
            },
        })
        .build();
    let err = res.err().expect("must fail");
    assert!(err.to_string().contains("retry attempts"));
}

#[rstest]
fn params_from_config_file_reach_the_runner() {
    let cfg = effcurve_config::load_toml(
        r#"
        [motor]
        pole_pairs = 12
        [ramp]
        step = 0.1
        stabilize_ms = 50
        [sampling]
        backoff = "exponential"
        retry_attempts = 5
        "#,
    )
    .unwrap();
    let params = effcurve_core::RunParams::try_from(&cfg).unwrap();
    assert_eq!(params.pole_pairs.get(), 12);
    assert_eq!(params.stabilize, Duration::from_millis(50));
    assert!(matches!(
        params.sampling.backoff,
        BackoffCfg::Exponential { attempts: 5, .. }
    ));

    let runner = Runner::builder()
        .with_telemetry(ScriptedTelemetry::default())
        .with_actuator(SpyActuator::new())
        .with_params(params.clone())
        .build()
        .unwrap();
    assert_eq!(runner.params(), &params);
}

#[rstest]
fn config_without_pole_pairs_cannot_become_params() {
    let cfg = effcurve_config::Config::default();
    assert!(effcurve_core::RunParams::try_from(&cfg).is_err());
}
