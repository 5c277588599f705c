//! SPSA optimizer configuration.
//!
//! [`SpsaConfig`] holds the user-facing knobs. Missing `a` and `A` are
//! derived from `maxiter` when the configuration is turned into a
//! [`Schedule`](crate::Schedule).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SpsaError, SpsaResult};

/// Spall's recommended gain decay exponent.
pub const DEFAULT_ALPHA: f64 = 0.602;

/// Spall's recommended perturbation decay exponent.
pub const DEFAULT_GAMMA: f64 = 0.101;

/// Default perturbation magnitude base.
pub const DEFAULT_C: f64 = 0.2;

/// Fraction of `maxiter` used for the stability constant when none is given.
pub const DEFAULT_STABILITY_FRACTION: f64 = 0.1;

/// Target first-step gain used to derive `a` when none is given.
pub const DEFAULT_INITIAL_GAIN: f64 = 0.05;

/// SPSA optimizer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpsaConfig {
    /// Number of steps the schedules are calibrated for.
    pub maxiter: usize,

    /// Perturbation magnitude base.
    #[serde(default = "default_c")]
    pub c: f64,

    /// Gain base. Derived as `0.05 * (A + 1)^alpha` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a: Option<f64>,

    /// Stability constant. Derived as `0.1 * maxiter` when absent.
    #[serde(default, rename = "A", skip_serializing_if = "Option::is_none")]
    pub big_a: Option<f64>,

    /// Gain decay exponent.
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    /// Perturbation decay exponent.
    #[serde(default = "default_gamma")]
    pub gamma: f64,

    /// Seed for the perturbation generator. `None` draws from OS entropy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_c() -> f64 {
    DEFAULT_C
}

fn default_alpha() -> f64 {
    DEFAULT_ALPHA
}

fn default_gamma() -> f64 {
    DEFAULT_GAMMA
}

impl SpsaConfig {
    /// Create a configuration with default constants for `maxiter` steps.
    pub fn new(maxiter: usize) -> Self {
        Self {
            maxiter,
            c: DEFAULT_C,
            a: None,
            big_a: None,
            alpha: DEFAULT_ALPHA,
            gamma: DEFAULT_GAMMA,
            seed: None,
        }
    }

    /// Set the perturbation magnitude base.
    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    /// Set the gain base.
    pub fn with_a(mut self, a: f64) -> Self {
        self.a = Some(a);
        self
    }

    /// Set the stability constant `A`.
    pub fn with_stability(mut self, big_a: f64) -> Self {
        self.big_a = Some(big_a);
        self
    }

    /// Set the gain decay exponent.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set the perturbation decay exponent.
    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    /// Seed the perturbation generator.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parse a YAML document.
    pub fn from_yaml_str(s: &str) -> SpsaResult<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Parse a JSON document.
    pub fn from_json_str(s: &str) -> SpsaResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load a configuration file, picking the format from its extension.
    pub fn from_file(path: impl AsRef<Path>) -> SpsaResult<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("yaml" | "yml") => Self::from_yaml_str(&std::fs::read_to_string(path)?),
            Some("json") => Self::from_json_str(&std::fs::read_to_string(path)?),
            _ => Err(SpsaError::configuration(format!(
                "unsupported config file extension: {}",
                path.display()
            ))),
        }
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> SpsaResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
