//! Circuits and the statevector backend used by the demos.

pub mod ansatz;
pub mod statevector;

pub use ansatz::{Gate, TwoLocal};
pub use statevector::{Statevector, ground_state_energy, sampled_expectation};
