//! Demo runners for executing variational algorithms.

pub mod vqe;

pub use vqe::{DEFAULT_MAXITER, VqeResult, VqeRunner};
