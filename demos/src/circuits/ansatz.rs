//! Hardware-efficient two-local ansatz.
//!
//! An initial `Ry` layer followed by `reps` blocks of a linear `CX`
//! entangler and another `Ry` layer. Real amplitudes only, which is enough
//! for molecular ground states.
//!
//! Parameters are laid out as two arrays so the initial layer can be frozen
//! independently of the repeated blocks:
//!
//! - `[n_qubits]` initial rotations
//! - `[reps, n_qubits]` block rotations

use arvak_spsa::{Parameter, ParameterSet};
use ndarray::{Array1, Array2};
use rand::Rng;
use std::f64::consts::PI;

/// Gates the statevector backend understands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gate {
    Ry { qubit: usize, theta: f64 },
    Cx { control: usize, target: usize },
}

/// Two-local `Ry`/`CX` ansatz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TwoLocal {
    pub n_qubits: usize,
    pub reps: usize,
}

impl TwoLocal {
    pub fn new(n_qubits: usize, reps: usize) -> Self {
        Self { n_qubits, reps }
    }

    /// Total number of rotation angles.
    pub fn num_parameters(&self) -> usize {
        self.n_qubits * (self.reps + 1)
    }

    /// Random angles in `[-π/2, π/2)`.
    ///
    /// With `freeze_initial_layer` the first rotation layer is kept fixed
    /// by the optimizer.
    pub fn initial_parameters<R: Rng>(
        &self,
        rng: &mut R,
        freeze_initial_layer: bool,
    ) -> ParameterSet {
        let mut angle = || rng.gen_range(-PI / 2.0..PI / 2.0);

        let initial = Array1::from_shape_simple_fn(self.n_qubits, &mut angle).into_dyn();
        let blocks =
            Array2::from_shape_simple_fn((self.reps, self.n_qubits), &mut angle).into_dyn();

        let initial = if freeze_initial_layer {
            Parameter::frozen(initial)
        } else {
            Parameter::trainable(initial)
        };

        ParameterSet::new(vec![initial, Parameter::trainable(blocks)])
    }

    /// Expand a parameter set into a gate list.
    ///
    /// Angles are read in logical order, so the set must follow the layout
    /// produced by [`TwoLocal::initial_parameters`].
    pub fn gates(&self, params: &ParameterSet) -> Vec<Gate> {
        let angles = params.to_flat_vec();
        debug_assert_eq!(angles.len(), self.num_parameters());

        let mut gates = Vec::with_capacity(angles.len() + self.reps * self.n_qubits);
        let mut layers = angles.chunks(self.n_qubits);

        if let Some(layer) = layers.next() {
            push_rotations(&mut gates, layer);
        }
        for layer in layers {
            for q in 0..self.n_qubits.saturating_sub(1) {
                gates.push(Gate::Cx {
                    control: q,
                    target: q + 1,
                });
            }
            push_rotations(&mut gates, layer);
        }

        gates
    }
}

fn push_rotations(gates: &mut Vec<Gate>, layer: &[f64]) {
    gates.extend(
        layer
            .iter()
            .enumerate()
            .map(|(qubit, &theta)| Gate::Ry { qubit, theta }),
    );
}
