//! Molecular Hamiltonians for VQE.
//!
//! Jordan-Wigner encoded, minimal STO-3G basis, equilibrium geometry.

use clap::ValueEnum;

use super::hamiltonian::{Pauli, PauliHamiltonian, PauliTerm};

/// Molecules available to the demos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Molecule {
    /// H2 reduced to two qubits.
    H2,
    /// H2 on all four spin-orbitals.
    H2FourQubit,
}

impl Molecule {
    pub fn hamiltonian(self) -> PauliHamiltonian {
        match self {
            Self::H2 => h2_hamiltonian(),
            Self::H2FourQubit => h2_hamiltonian_4q(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::H2 => "H2 (2 qubits)",
            Self::H2FourQubit => "H2 (4 qubits)",
        }
    }
}

/// H2 at 0.735 Å on two qubits.
///
/// H = g0 I + g1 Z0 + g2 Z1 + g3 Z0Z1 + g4 X0X1 + g5 Y0Y1
pub fn h2_hamiltonian() -> PauliHamiltonian {
    PauliHamiltonian::new(vec![
        PauliTerm::identity(-1.0523),
        PauliTerm::z(0.3979, 0),
        PauliTerm::z(-0.3979, 1),
        PauliTerm::zz(-0.0112, 0, 1),
        PauliTerm::xx(0.1809, 0, 1),
        PauliTerm::yy(0.1809, 0, 1),
    ])
}

/// H2 on four qubits, one per spin-orbital.
pub fn h2_hamiltonian_4q() -> PauliHamiltonian {
    use Pauli::{X, Y};

    PauliHamiltonian::new(vec![
        PauliTerm::identity(-0.8105),
        PauliTerm::z(0.1721, 0),
        PauliTerm::z(0.1721, 1),
        PauliTerm::z(-0.2234, 2),
        PauliTerm::z(-0.2234, 3),
        PauliTerm::zz(0.1209, 0, 1),
        PauliTerm::zz(0.1686, 0, 2),
        PauliTerm::zz(0.1205, 0, 3),
        PauliTerm::zz(0.1205, 1, 2),
        PauliTerm::zz(0.1686, 1, 3),
        PauliTerm::zz(0.1744, 2, 3),
        PauliTerm::new(0.0453, vec![(0, X), (1, X), (2, Y), (3, Y)]),
        PauliTerm::new(0.0453, vec![(0, Y), (1, Y), (2, X), (3, X)]),
        PauliTerm::new(-0.0453, vec![(0, X), (1, Y), (2, Y), (3, X)]),
        PauliTerm::new(-0.0453, vec![(0, Y), (1, X), (2, X), (3, Y)]),
    ])
}
