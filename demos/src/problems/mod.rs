//! Problem definitions for the variational demos.

pub mod hamiltonian;
pub mod molecules;

pub use hamiltonian::{Pauli, PauliHamiltonian, PauliTerm};
pub use molecules::{Molecule, h2_hamiltonian, h2_hamiltonian_4q};
