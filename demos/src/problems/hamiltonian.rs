//! Qubit Hamiltonians as weighted sums of Pauli strings.

use serde::Serialize;

/// Single-qubit Pauli operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Pauli {
    I,
    X,
    Y,
    Z,
}

/// A coefficient times a tensor product of Pauli operators.
///
/// Qubits not listed in `operators` carry the identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PauliTerm {
    /// Real coefficient.
    pub coefficient: f64,
    /// `(qubit, operator)` pairs.
    pub operators: Vec<(usize, Pauli)>,
}

impl PauliTerm {
    /// Create a term from explicit operators.
    pub fn new(coefficient: f64, operators: Vec<(usize, Pauli)>) -> Self {
        Self {
            coefficient,
            operators,
        }
    }

    /// Constant offset.
    pub fn identity(coefficient: f64) -> Self {
        Self::new(coefficient, Vec::new())
    }

    /// `coefficient * Z_q`.
    pub fn z(coefficient: f64, q: usize) -> Self {
        Self::new(coefficient, vec![(q, Pauli::Z)])
    }

    /// `coefficient * Z_q0 Z_q1`.
    pub fn zz(coefficient: f64, q0: usize, q1: usize) -> Self {
        Self::new(coefficient, vec![(q0, Pauli::Z), (q1, Pauli::Z)])
    }

    /// `coefficient * X_q0 X_q1`.
    pub fn xx(coefficient: f64, q0: usize, q1: usize) -> Self {
        Self::new(coefficient, vec![(q0, Pauli::X), (q1, Pauli::X)])
    }

    /// `coefficient * Y_q0 Y_q1`.
    pub fn yy(coefficient: f64, q0: usize, q1: usize) -> Self {
        Self::new(coefficient, vec![(q0, Pauli::Y), (q1, Pauli::Y)])
    }

    /// Whether the term acts trivially on every qubit.
    pub fn is_identity(&self) -> bool {
        self.operators.iter().all(|&(_, p)| p == Pauli::I)
    }
}

/// A Hamiltonian `H = Σ c_i P_i`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PauliHamiltonian {
    pub terms: Vec<PauliTerm>,
}

impl PauliHamiltonian {
    pub fn new(terms: Vec<PauliTerm>) -> Self {
        Self { terms }
    }

    /// Smallest register the Hamiltonian fits on.
    pub fn num_qubits(&self) -> usize {
        self.terms
            .iter()
            .flat_map(|t| t.operators.iter().map(|&(q, _)| q + 1))
            .max()
            .unwrap_or(0)
    }

    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    /// Sum of the coefficients of identity terms.
    pub fn identity_coefficient(&self) -> f64 {
        self.terms
            .iter()
            .filter(|t| t.is_identity())
            .map(|t| t.coefficient)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_num_qubits() {
        let h = PauliHamiltonian::new(vec![PauliTerm::identity(1.0), PauliTerm::zz(0.5, 0, 3)]);
        assert_eq!(h.num_qubits(), 4);
        assert_eq!(h.num_terms(), 2);
    }

    #[test]
    fn test_identity_coefficient() {
        let h = PauliHamiltonian::new(vec![
            PauliTerm::identity(-1.0),
            PauliTerm::new(0.25, vec![(0, Pauli::I)]),
            PauliTerm::z(3.0, 0),
        ]);
        assert!((h.identity_coefficient() - (-0.75)).abs() < 1e-12);
    }

    #[test]
    fn test_empty() {
        let h = PauliHamiltonian::new(Vec::new());
        assert_eq!(h.num_qubits(), 0);
    }
}
