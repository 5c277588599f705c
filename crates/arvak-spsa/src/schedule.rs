//! Gain and perturbation decay schedules.
//!
//! At iteration `k` (zero-based):
//!
//! ```text
//! c_k = c / (k + 1)^gamma
//! a_k = a / (k + 1 + A)^alpha
//! ```
//!
//! Both sequences are strictly decreasing for positive `alpha` and `gamma`.

use serde::Serialize;

use crate::config::{DEFAULT_INITIAL_GAIN, DEFAULT_STABILITY_FRACTION, SpsaConfig};
use crate::error::{SpsaError, SpsaResult};

/// Resolved and validated schedule constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Schedule {
    /// Number of steps the schedule is calibrated for.
    pub maxiter: usize,
    /// Gain base.
    pub a: f64,
    /// Perturbation magnitude base.
    pub c: f64,
    /// Stability constant.
    #[serde(rename = "A")]
    pub big_a: f64,
    /// Gain decay exponent.
    pub alpha: f64,
    /// Perturbation decay exponent.
    pub gamma: f64,
}

impl Schedule {
    /// Resolve defaults and validate a configuration.
    pub fn from_config(config: &SpsaConfig) -> SpsaResult<Self> {
        if config.maxiter == 0 {
            return Err(SpsaError::configuration("maxiter must be greater than 0"));
        }

        check_positive("c", config.c)?;
        check_positive("alpha", config.alpha)?;
        check_positive("gamma", config.gamma)?;

        let big_a = config
            .big_a
            .unwrap_or(DEFAULT_STABILITY_FRACTION * config.maxiter as f64);
        check_positive("A", big_a)?;

        let a = config
            .a
            .unwrap_or_else(|| DEFAULT_INITIAL_GAIN * (big_a + 1.0).powf(config.alpha));
        check_positive("a", a)?;

        Ok(Self {
            maxiter: config.maxiter,
            a,
            c: config.c,
            big_a,
            alpha: config.alpha,
            gamma: config.gamma,
        })
    }

    /// Perturbation magnitude `c_k` at iteration `k`.
    pub fn perturbation_magnitude(&self, k: usize) -> f64 {
        self.c / (k as f64 + 1.0).powf(self.gamma)
    }

    /// Gain `a_k` at iteration `k`.
    pub fn gain(&self, k: usize) -> f64 {
        self.a / (k as f64 + 1.0 + self.big_a).powf(self.alpha)
    }
}

fn check_positive(name: &str, value: f64) -> SpsaResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SpsaError::configuration(format!(
            "{name} must be a finite positive number, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_default_derivation() {
        let schedule = Schedule::from_config(&SpsaConfig::new(50)).unwrap();
        assert_relative_eq!(schedule.big_a, 5.0);
        assert_relative_eq!(schedule.a, 0.05 * 6.0_f64.powf(0.602));
        // a is chosen so the first gain equals the target.
        assert_relative_eq!(schedule.gain(0), 0.05, epsilon = 1e-12);
        assert_relative_eq!(schedule.perturbation_magnitude(0), 0.2);
    }

    #[test]
    fn test_explicit_constants() {
        let config = SpsaConfig::new(10)
            .with_a(1.0)
            .with_c(0.5)
            .with_stability(1.0)
            .with_alpha(1.0)
            .with_gamma(1.0);
        let schedule = Schedule::from_config(&config).unwrap();

        assert_relative_eq!(schedule.gain(0), 0.5);
        assert_relative_eq!(schedule.gain(2), 0.25);
        assert_relative_eq!(schedule.perturbation_magnitude(0), 0.5);
        assert_relative_eq!(schedule.perturbation_magnitude(4), 0.1);
    }

    #[test]
    fn test_zero_maxiter_rejected() {
        let err = Schedule::from_config(&SpsaConfig::new(0)).unwrap_err();
        assert!(matches!(err, SpsaError::Configuration { .. }));
    }

    #[test]
    fn test_non_positive_constants_rejected() {
        let bad = [
            SpsaConfig::new(10).with_c(0.0),
            SpsaConfig::new(10).with_a(-1.0),
            SpsaConfig::new(10).with_stability(0.0),
            SpsaConfig::new(10).with_alpha(-0.602),
            SpsaConfig::new(10).with_gamma(0.0),
            SpsaConfig::new(10).with_c(f64::NAN),
            SpsaConfig::new(10).with_a(f64::INFINITY),
        ];

        for config in bad {
            let err = Schedule::from_config(&config).unwrap_err();
            assert!(
                matches!(err, SpsaError::Configuration { .. }),
                "expected configuration error for {config:?}"
            );
        }
    }

    #[test]
    fn test_small_maxiter_keeps_positive_stability() {
        let schedule = Schedule::from_config(&SpsaConfig::new(1)).unwrap();
        assert!(schedule.big_a > 0.0);
    }

    proptest! {
        #[test]
        fn prop_schedules_strictly_decrease(
            k in 0usize..100_000,
            maxiter in 1usize..10_000,
            alpha in 0.05f64..2.0,
            gamma in 0.05f64..2.0,
        ) {
            let config = SpsaConfig::new(maxiter).with_alpha(alpha).with_gamma(gamma);
            let schedule = Schedule::from_config(&config).unwrap();

            let (c_k, c_next) = (
                schedule.perturbation_magnitude(k),
                schedule.perturbation_magnitude(k + 1),
            );
            prop_assert!(c_k > c_next);
            prop_assert!(schedule.gain(k) > schedule.gain(k + 1));
            prop_assert!(schedule.gain(k) > 0.0);
            prop_assert!(schedule.perturbation_magnitude(k) > 0.0);
        }
    }
}
