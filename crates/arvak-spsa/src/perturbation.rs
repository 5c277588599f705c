//! Simultaneous perturbation directions.
//!
//! Every trainable entry gets an independent fair ±1 (Rademacher) sign.
//! The gradient estimate divides by these entries, so the distribution
//! must never produce zero.

use ndarray::{ArrayD, IxDyn, Zip};
use rand::Rng;
use tracing::trace;

use crate::params::ParameterSet;

/// A perturbation direction matching the layout of a [`ParameterSet`].
///
/// Frozen arrays have no direction (`None`).
#[derive(Debug, Clone, PartialEq)]
pub struct Perturbation {
    directions: Vec<Option<ArrayD<f64>>>,
}

impl Perturbation {
    /// Draw a fresh direction for the trainable arrays of `params`.
    pub fn sample<R: Rng>(params: &ParameterSet, rng: &mut R) -> Self {
        let directions: Vec<Option<ArrayD<f64>>> = params
            .iter()
            .map(|p| {
                p.is_trainable().then(|| {
                    ArrayD::from_shape_fn(IxDyn(p.shape()), |_| {
                        if rng.r#gen::<bool>() { 1.0 } else { -1.0 }
                    })
                })
            })
            .collect();

        trace!(
            arrays = directions.len(),
            perturbed = directions.iter().flatten().count(),
            "Sampled perturbation"
        );

        Self { directions }
    }

    /// Direction for the array at `index`, `None` if it is frozen.
    pub fn direction(&self, index: usize) -> Option<&ArrayD<f64>> {
        self.directions.get(index).and_then(Option::as_ref)
    }

    /// Number of arrays covered, frozen ones included.
    pub fn len(&self) -> usize {
        self.directions.len()
    }

    /// Whether the perturbation covers no arrays.
    pub fn is_empty(&self) -> bool {
        self.directions.is_empty()
    }

    /// `params + scale * direction` on trainable arrays; frozen arrays are cloned.
    pub fn shifted(&self, params: &ParameterSet, scale: f64) -> ParameterSet {
        params
            .iter()
            .zip(&self.directions)
            .map(|(param, direction)| match direction {
                Some(delta) => {
                    let mut values = param.values().clone();
                    Zip::from(&mut values)
                        .and(delta)
                        .for_each(|v, &d| *v += scale * d);
                    param.with_values(values)
                }
                None => param.clone(),
            })
            .collect()
    }

    /// Apply the SPSA update `theta - gain * (diff / (2 c_k delta))`.
    ///
    /// `diff` is `cost_plus - cost_minus`.
    pub(crate) fn update(
        &self,
        params: &ParameterSet,
        diff: f64,
        magnitude: f64,
        gain: f64,
    ) -> ParameterSet {
        params
            .iter()
            .zip(&self.directions)
            .map(|(param, direction)| match direction {
                Some(delta) => {
                    let mut values = param.values().clone();
                    Zip::from(&mut values).and(delta).for_each(|v, &d| {
                        let grad = diff / (2.0 * magnitude * d);
                        *v -= gain * grad;
                    });
                    param.with_values(values)
                }
                None => param.clone(),
            })
            .collect()
    }
}
