//! Arvak SPSA: gradient-free optimization for noisy variational cost functions.
//!
//! This crate implements Simultaneous Perturbation Stochastic Approximation
//! (SPSA), the usual classical optimizer for variational quantum algorithms
//! whose cost is estimated from a finite number of measurement shots.
//!
//! # Features
//!
//! - **Two evaluations per step**: the gradient is estimated along one random
//!   ±1 direction, independent of the number of parameters
//! - **Decay schedules**: gain and perturbation magnitude follow Spall's
//!   `a / (k + 1 + A)^alpha` and `c / (k + 1)^gamma`
//! - **Heterogeneous parameters**: any number of `ndarray` arrays of any
//!   shape, each trainable or frozen
//! - **Opaque objectives**: any `FnMut(&ParameterSet) -> Result<f64, E>`;
//!   objective errors are returned untouched
//! - **Reproducible**: the perturbation generator is injected or seeded
//!
//! # Example
//!
//! ```
//! use arvak_spsa::{ParameterSet, Spsa, SpsaConfig};
//! use std::convert::Infallible;
//!
//! let config = SpsaConfig::new(200).with_seed(7);
//! let mut spsa = Spsa::new(config).unwrap();
//!
//! let result = spsa
//!     .minimize(
//!         |p: &ParameterSet| {
//!             Ok::<_, Infallible>(p.to_flat_vec().iter().map(|x| x * x).sum::<f64>())
//!         },
//!         ParameterSet::from(vec![1.0, -1.0, 0.5]),
//!     )
//!     .unwrap();
//!
//! assert!(result.optimal_value < result.history[0]);
//! ```

pub mod config;
pub mod error;
pub mod optimizer;
pub mod params;
pub mod perturbation;
pub mod schedule;

// Re-exports
pub use config::SpsaConfig;
pub use error::{SpsaError, SpsaResult, StepError};
pub use optimizer::{OptimizationResult, OptimizerState, Spsa};
pub use params::{Parameter, ParameterSet};
pub use perturbation::Perturbation;
pub use schedule::Schedule;
