//! VQE (Variational Quantum Eigensolver) runner.
//!
//! The classical half of the loop is SPSA: every iteration costs two energy
//! estimates for the update plus one for the reported energy, no matter how
//! many angles the ansatz has.

use std::convert::Infallible;

use arvak_spsa::{ParameterSet, Spsa, SpsaConfig, SpsaResult};
use indicatif::ProgressBar;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{debug, info};

use crate::circuits::{Statevector, TwoLocal, ground_state_energy, sampled_expectation};
use crate::problems::PauliHamiltonian;

/// SPSA iterations used when no configuration is given.
pub const DEFAULT_MAXITER: usize = 1000;

/// Result of a VQE run.
#[derive(Debug, Clone, Serialize)]
pub struct VqeResult {
    /// Noiseless energy at the final parameters.
    pub optimal_energy: f64,
    /// Final parameters, flattened.
    pub optimal_params: Vec<f64>,
    /// Exact ground state energy of the Hamiltonian.
    pub reference_energy: f64,
    /// Number of SPSA iterations.
    pub iterations: usize,
    /// Number of energy estimates requested by the optimizer.
    pub circuit_evaluations: usize,
    /// Estimated energy before each iteration.
    pub energy_history: Vec<f64>,
}

impl VqeResult {
    /// Distance from the exact ground state energy.
    pub fn error(&self) -> f64 {
        (self.optimal_energy - self.reference_energy).abs()
    }
}

/// VQE runner configuration.
pub struct VqeRunner {
    /// The Hamiltonian to minimize.
    pub hamiltonian: PauliHamiltonian,
    /// Number of qubits.
    pub n_qubits: usize,
    /// Number of ansatz repetitions.
    pub reps: usize,
    /// Shots per Pauli term; `None` evaluates energies exactly.
    pub shots: Option<u32>,
    /// Keep the initial rotation layer fixed.
    pub freeze_initial_layer: bool,
    /// Optimizer settings.
    pub spsa: SpsaConfig,
}

impl VqeRunner {
    /// Create a new VQE runner.
    pub fn new(hamiltonian: PauliHamiltonian) -> Self {
        let n_qubits = hamiltonian.num_qubits();
        Self {
            hamiltonian,
            n_qubits,
            reps: 1,
            shots: Some(1024),
            freeze_initial_layer: false,
            spsa: SpsaConfig::new(DEFAULT_MAXITER).with_seed(42),
        }
    }

    /// Set the number of ansatz repetitions.
    pub fn with_reps(mut self, reps: usize) -> Self {
        self.reps = reps;
        self
    }

    /// Set the number of shots, `None` for exact energies.
    pub fn with_shots(mut self, shots: Option<u32>) -> Self {
        self.shots = shots;
        self
    }

    /// Freeze the initial rotation layer.
    pub fn with_frozen_initial_layer(mut self, freeze: bool) -> Self {
        self.freeze_initial_layer = freeze;
        self
    }

    /// Set the optimizer configuration.
    pub fn with_spsa(mut self, spsa: SpsaConfig) -> Self {
        self.spsa = spsa;
        self
    }

    /// Get the ansatz this runner optimizes.
    pub fn ansatz(&self) -> TwoLocal {
        TwoLocal::new(self.n_qubits, self.reps)
    }

    /// Run VQE from seeded random initial angles.
    pub fn run(&self) -> SpsaResult<VqeResult> {
        self.run_with_progress(None)
    }

    /// Run VQE, ticking `progress` once per iteration.
    pub fn run_with_progress(&self, progress: Option<&ProgressBar>) -> SpsaResult<VqeResult> {
        let seed = self.spsa.seed.unwrap_or(42);
        let mut init_rng = StdRng::seed_from_u64(seed);
        let initial = self
            .ansatz()
            .initial_parameters(&mut init_rng, self.freeze_initial_layer);

        self.run_with_params(initial, progress)
    }

    /// Run VQE from the given parameters.
    pub fn run_with_params(
        &self,
        initial: ParameterSet,
        progress: Option<&ProgressBar>,
    ) -> SpsaResult<VqeResult> {
        let mut spsa = Spsa::new(self.spsa.clone())?;
        let ansatz = self.ansatz();
        let maxiter = spsa.schedule().maxiter;

        // Shot noise is drawn from its own stream so the perturbation
        // sequence does not depend on the shot count.
        let mut shot_rng = StdRng::seed_from_u64(self.spsa.seed.unwrap_or(42) ^ 0x5eed);
        let mut circuit_evaluations = 0;

        info!(
            n_qubits = self.n_qubits,
            reps = self.reps,
            trainable = initial.num_trainable(),
            shots = ?self.shots,
            maxiter,
            "Starting VQE"
        );

        let mut params = initial;
        let mut energy_history = Vec::with_capacity(maxiter);

        for _ in 0..maxiter {
            let objective = |p: &ParameterSet| {
                circuit_evaluations += 1;
                let state = Statevector::from_gates(self.n_qubits, &ansatz.gates(p));
                let energy = match self.shots {
                    Some(shots) => {
                        sampled_expectation(&state, &self.hamiltonian, shots, &mut shot_rng)
                    }
                    None => state.expectation(&self.hamiltonian),
                };
                Ok::<_, Infallible>(energy)
            };

            let (next, energy) = spsa.step_and_cost(objective, &params)?;

            debug!(iteration = spsa.iteration(), energy, "VQE iteration");
            energy_history.push(energy);
            params = next;

            if let Some(pb) = progress {
                pb.set_message(format!("E = {energy:.6}"));
                pb.inc(1);
            }
        }

        let optimal_energy = Statevector::from_gates(self.n_qubits, &ansatz.gates(&params))
            .expectation(&self.hamiltonian);

        Ok(VqeResult {
            optimal_energy,
            optimal_params: params.to_flat_vec(),
            reference_energy: ground_state_energy(&self.hamiltonian, self.n_qubits),
            iterations: spsa.iteration(),
            circuit_evaluations,
            energy_history,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problems::h2_hamiltonian;

    #[test]
    fn test_vqe_runner_creation() {
        let runner = VqeRunner::new(h2_hamiltonian())
            .with_reps(2)
            .with_spsa(SpsaConfig::new(10));

        assert_eq!(runner.n_qubits, 2);
        assert_eq!(runner.reps, 2);
        assert_eq!(runner.spsa.maxiter, 10);
        assert_eq!(runner.ansatz().num_parameters(), 6);
    }

    #[test]
    fn test_exact_vqe_improves_energy() {
        let runner = VqeRunner::new(h2_hamiltonian())
            .with_shots(None)
            .with_spsa(SpsaConfig::new(150).with_seed(3));

        let result = runner.run().unwrap();

        assert_eq!(result.iterations, 150);
        assert_eq!(result.circuit_evaluations, 450);
        assert_eq!(result.energy_history.len(), 150);
        assert!(result.optimal_energy < result.energy_history[0]);
        assert!(result.optimal_energy >= result.reference_energy - 1e-9);
    }

    #[test]
    fn test_default_budget_reaches_chemical_accuracy() {
        let runner = VqeRunner::new(h2_hamiltonian()).with_shots(None);
        assert_eq!(runner.spsa.maxiter, DEFAULT_MAXITER);

        let result = runner.run().unwrap();
        assert!(result.error() < 1.6e-3, "error {:.3e}", result.error());
    }

    #[test]
    fn test_frozen_initial_layer_is_kept() {
        let runner = VqeRunner::new(h2_hamiltonian())
            .with_shots(Some(64))
            .with_frozen_initial_layer(true)
            .with_spsa(SpsaConfig::new(20).with_seed(9));

        let initial = runner
            .ansatz()
            .initial_parameters(&mut StdRng::seed_from_u64(9), true);
        let frozen = initial[0].values().clone();

        let result = runner.run_with_params(initial, None).unwrap();
        assert_eq!(&result.optimal_params[..2], frozen.as_slice().unwrap());
    }

    #[test]
    fn test_invalid_spsa_config() {
        let runner = VqeRunner::new(h2_hamiltonian()).with_spsa(SpsaConfig::new(0));
        assert!(runner.run().is_err());
    }
}
