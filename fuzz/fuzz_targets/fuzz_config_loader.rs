#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // TOML parse + validate must reject bad input with errors, never panics.
    if let Ok(cfg) = effcurve_config::load_toml(data) {
        if cfg.validate().is_ok() {
            // A validated config always maps to runtime parameters when pole pairs are set.
            if cfg.motor.pole_pairs.is_some() {
                let _ = effcurve_core::RunParams::try_from(&cfg);
            }
        }
    }
});
