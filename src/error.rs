//! Error types for the simulation engine.
//!
//! Out-of-alphabet sequence symbols are not an error anywhere in the crate:
//! encoding skips them silently and downstream ensemble sizes shrink
//! accordingly. Everything that can actually fail does so through
//! [`SimError`], carrying enough context (step index, ensemble, deviation)
//! to reproduce the failure.

use thiserror::Error;

/// Errors surfaced by Hamiltonian construction, propagation and
/// density-matrix analysis.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    /// Entropy or a density matrix was requested over zero retained states
    /// (every symbol skipped, or every encoded vector had zero norm).
    #[error("empty ensemble in {context}: no states left after encoding")]
    EmptyEnsemble { context: String },

    /// Zero or near-zero norm at a forced renormalization point, or a
    /// non-finite value in a state vector or operator. Fatal for the run.
    #[error("numerical instability at step {step}: {detail}")]
    NumericalInstability { step: usize, detail: String },

    /// A Hamiltonian or density matrix failed the Hermiticity tolerance
    /// check before use.
    #[error("matrix not Hermitian: max |M - M^H| = {deviation:.3e} exceeds tolerance {tolerance:.3e}")]
    NonHermitian { deviation: f64, tolerance: f64 },

    /// A computed entropy fell outside [0, log2(dim)], indicating an
    /// upstream invariant break. Never clamped.
    #[error("entropy {value:.6e} outside [0, {bound:.6}]")]
    EntropyOutOfBounds { value: f64, bound: f64 },

    /// A configuration that cannot be simulated as requested.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, SimError>;
