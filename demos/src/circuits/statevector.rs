//! Dense statevector backend.
//!
//! Stands in for a device: exact amplitudes, with optional shot sampling of
//! each Pauli term to reproduce measurement noise.

use num_complex::Complex64;
use rand::Rng;

use super::ansatz::Gate;
use crate::problems::{Pauli, PauliHamiltonian, PauliTerm};

/// Amplitudes of an `n`-qubit register, qubit 0 in the lowest bit.
#[derive(Debug, Clone, PartialEq)]
pub struct Statevector {
    amplitudes: Vec<Complex64>,
}

impl Statevector {
    /// `|0...0⟩` on `n_qubits`.
    pub fn zero(n_qubits: usize) -> Self {
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); 1 << n_qubits];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self { amplitudes }
    }

    /// Run `gates` on `|0...0⟩`.
    pub fn from_gates(n_qubits: usize, gates: &[Gate]) -> Self {
        let mut state = Self::zero(n_qubits);
        for gate in gates {
            state.apply(gate);
        }
        state
    }

    /// Apply one gate in place.
    pub fn apply(&mut self, gate: &Gate) {
        match *gate {
            Gate::Ry { qubit, theta } => {
                let c = (theta / 2.0).cos();
                let s = (theta / 2.0).sin();
                for i in 0..self.amplitudes.len() {
                    if (i >> qubit) & 1 == 0 {
                        let j = i | (1 << qubit);
                        let a = self.amplitudes[i];
                        let b = self.amplitudes[j];
                        self.amplitudes[i] = a * c - b * s;
                        self.amplitudes[j] = a * s + b * c;
                    }
                }
            }
            Gate::Cx { control, target } => {
                for i in 0..self.amplitudes.len() {
                    if (i >> control) & 1 == 1 && (i >> target) & 1 == 0 {
                        self.amplitudes.swap(i, i | (1 << target));
                    }
                }
            }
        }
    }

    /// `⟨ψ|P|ψ⟩` for the Pauli string of `term`, without its coefficient.
    pub fn pauli_expectation(&self, term: &PauliTerm) -> f64 {
        let mut value = Complex64::new(0.0, 0.0);
        for (i, &amplitude) in self.amplitudes.iter().enumerate() {
            let (j, phase) = apply_pauli_string(i, &term.operators);
            value += self.amplitudes[j].conj() * phase * amplitude;
        }
        value.re
    }

    /// Exact energy `⟨ψ|H|ψ⟩`.
    pub fn expectation(&self, hamiltonian: &PauliHamiltonian) -> f64 {
        hamiltonian
            .terms
            .iter()
            .map(|term| term.coefficient * self.pauli_expectation(term))
            .sum()
    }
}

/// Energy estimated from `shots` measurements of every non-identity term.
pub fn sampled_expectation<R: Rng>(
    state: &Statevector,
    hamiltonian: &PauliHamiltonian,
    shots: u32,
    rng: &mut R,
) -> f64 {
    hamiltonian
        .terms
        .iter()
        .map(|term| {
            if term.is_identity() || shots == 0 {
                return term.coefficient * state.pauli_expectation(term);
            }
            // Each shot yields +1 with probability (1 + ⟨P⟩) / 2.
            let p_plus = ((1.0 + state.pauli_expectation(term)) / 2.0).clamp(0.0, 1.0);
            let plus = (0..shots).filter(|_| rng.gen_bool(p_plus)).count();
            let estimate = 2.0 * plus as f64 / shots as f64 - 1.0;
            term.coefficient * estimate
        })
        .sum()
}

/// Power iterations used by [`ground_state_energy`].
const POWER_ITERATIONS: usize = 2_000;

/// Lowest eigenvalue of `hamiltonian` on `n_qubits`.
///
/// Power iteration on `sI - H` with `s = Σ|c_i|`, which bounds the spectrum.
pub fn ground_state_energy(hamiltonian: &PauliHamiltonian, n_qubits: usize) -> f64 {
    let shift: f64 = hamiltonian.terms.iter().map(|t| t.coefficient.abs()).sum();

    let mut v: Vec<Complex64> = (0..1usize << n_qubits)
        .map(|i| Complex64::new(1.0 / (i as f64 + 1.0), 0.0))
        .collect();
    normalize(&mut v);

    for _ in 0..POWER_ITERATIONS {
        let hv = apply_hamiltonian(hamiltonian, &v);
        v = v.iter().zip(&hv).map(|(&a, &b)| a * shift - b).collect();
        normalize(&mut v);
    }

    let hv = apply_hamiltonian(hamiltonian, &v);
    v.iter().zip(&hv).map(|(a, b)| (a.conj() * b).re).sum()
}

fn apply_hamiltonian(hamiltonian: &PauliHamiltonian, v: &[Complex64]) -> Vec<Complex64> {
    let mut out = vec![Complex64::new(0.0, 0.0); v.len()];
    for term in &hamiltonian.terms {
        for (i, &amplitude) in v.iter().enumerate() {
            let (j, phase) = apply_pauli_string(i, &term.operators);
            out[j] += phase * amplitude * term.coefficient;
        }
    }
    out
}

fn normalize(v: &mut [Complex64]) {
    let norm = v.iter().map(|a| a.norm_sqr()).sum::<f64>().sqrt();
    if norm > 0.0 {
        v.iter_mut().for_each(|a| *a /= norm);
    }
}

/// Map a basis index through a Pauli string.
///
/// Returns the image index and the accumulated phase.
fn apply_pauli_string(index: usize, operators: &[(usize, Pauli)]) -> (usize, Complex64) {
    let mut image = index;
    let mut phase = Complex64::new(1.0, 0.0);

    for &(qubit, pauli) in operators {
        let bit = (index >> qubit) & 1;
        match pauli {
            Pauli::I => {}
            Pauli::X => image ^= 1 << qubit,
            Pauli::Y => {
                image ^= 1 << qubit;
                phase *= if bit == 0 {
                    Complex64::new(0.0, 1.0)
                } else {
                    Complex64::new(0.0, -1.0)
                };
            }
            Pauli::Z => {
                if bit == 1 {
                    phase = -phase;
                }
            }
        }
    }

    (image, phase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problems::h2_hamiltonian;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::f64::consts::PI;

    #[test]
    fn test_zero_state_z() {
        let state = Statevector::zero(2);
        assert_relative_eq!(state.pauli_expectation(&PauliTerm::z(1.0, 0)), 1.0);
        assert_relative_eq!(state.pauli_expectation(&PauliTerm::xx(1.0, 0, 1)), 0.0);
    }

    #[test]
    fn test_ry_pi_flips() {
        let state = Statevector::from_gates(
            1,
            &[Gate::Ry {
                qubit: 0,
                theta: PI,
            }],
        );
        assert_relative_eq!(state.pauli_expectation(&PauliTerm::z(1.0, 0)), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_bell_state_correlations() {
        let state = Statevector::from_gates(
            2,
            &[
                Gate::Ry {
                    qubit: 0,
                    theta: PI / 2.0,
                },
                Gate::Cx {
                    control: 0,
                    target: 1,
                },
            ],
        );
        let zz = state.pauli_expectation(&PauliTerm::zz(1.0, 0, 1));
        let xx = state.pauli_expectation(&PauliTerm::xx(1.0, 0, 1));
        let yy = state.pauli_expectation(&PauliTerm::yy(1.0, 0, 1));
        assert_relative_eq!(zz, 1.0, epsilon = 1e-12);
        assert_relative_eq!(xx, 1.0, epsilon = 1e-12);
        assert_relative_eq!(yy, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_h2_hartree_fock_energy() {
        // |01⟩ (qubit 0 set) is the Hartree-Fock reference for this encoding.
        let state = Statevector::from_gates(
            2,
            &[Gate::Ry {
                qubit: 0,
                theta: PI,
            }],
        );
        let energy = state.expectation(&h2_hamiltonian());
        assert_relative_eq!(energy, -1.0523 - 0.3979 - 0.3979 + 0.0112, epsilon = 1e-9);
    }

    #[test]
    fn test_h2_ground_state_energy() {
        // Ground state lives in span{|01⟩, |10⟩}; solve that 2x2 block by hand.
        let e01: f64 = -1.0523 - 0.3979 - 0.3979 + 0.0112;
        let e10 = -1.0523 + 0.3979 + 0.3979 + 0.0112;
        let off: f64 = 2.0 * 0.1809;
        let mean = (e01 + e10) / 2.0;
        let half = (e10 - e01) / 2.0;
        let expected = mean - (half * half + off * off).sqrt();

        let energy = ground_state_energy(&h2_hamiltonian(), 2);
        assert_relative_eq!(energy, expected, epsilon = 1e-8);
    }

    #[test]
    fn test_ground_state_bounds_ansatz_energies() {
        let h = h2_hamiltonian();
        let ground = ground_state_energy(&h, 2);
        for k in 0..20 {
            let theta = k as f64 * 0.3;
            let state = Statevector::from_gates(
                2,
                &[
                    Gate::Ry { qubit: 0, theta },
                    Gate::Cx {
                        control: 0,
                        target: 1,
                    },
                    Gate::Ry {
                        qubit: 1,
                        theta: -theta,
                    },
                ],
            );
            assert!(state.expectation(&h) >= ground - 1e-9);
        }
    }

    #[test]
    fn test_sampled_close_to_exact() {
        let state = Statevector::from_gates(
            2,
            &[Gate::Ry {
                qubit: 1,
                theta: 1.1,
            }],
        );
        let h = h2_hamiltonian();
        let exact = state.expectation(&h);
        let sampled = sampled_expectation(&state, &h, 20_000, &mut StdRng::seed_from_u64(4));
        assert!((sampled - exact).abs() < 0.05);
    }
}
