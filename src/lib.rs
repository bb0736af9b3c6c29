//! # dna-quantum-sim
//!
//! Quantum-mechanical time evolution of states encoding DNA nucleotide
//! sequences, with comparative entropy statistics between two sequence
//! regions (conventionally coding vs non-coding).
//!
//! ```text
//! Sequence ──encode──▶ initial state(s)
//!                         │
//! HamiltonianBuilder ──▶ H (tight-binding lattice │ double-well continuum)
//!                         │
//! Propagator ──────────▶ Trajectory (spectral split-operator │ direct step)
//!                         │
//! DensityMatrixAnalyzer ▶ joint density → partial trace → entropy
//! ```
//!
//! ## Models
//!
//! * **Lattice**: each base is one site of a tight-binding chain with
//!   random on-site energies (eV) and fixed nearest-neighbor coupling,
//!   evolved by an exact matrix-exponential step or a first-order explicit
//!   step with forced per-step renormalization.
//! * **Continuum**: each base pair is a proton in a quartic double well
//!   V(x) = V0·((x/a)⁴ − 2(x/a)² + 1) on a 1-D grid, evolved by FFT
//!   split-operator (Strang) stepping, optionally driven by a chirped,
//!   noise-jittered cosine perturbation.
//!
//! This is a parameterized simulation sandbox, not an experimentally
//! validated biophysical solver.
//!
//! ## Usage
//!
//! ```no_run
//! use dna_quantum_sim::prelude::*;
//!
//! let coding = Sequence::new("ATCGGCTAAT");
//! let noncoding = Sequence::new("CGTACGTACG");
//! let report = run_region_pair(&coding, &noncoding, &RegionRunConfig::default()).unwrap();
//! println!(
//!     "S_A = {:.4}  S_B = {:.4}  S_AB = {:.4}",
//!     report.region_a.entropy, report.region_b.entropy, report.entanglement
//! );
//! ```
//!
//! ## References
//!
//! - Löwdin (1963), "Proton tunneling in DNA and its biological
//!   implications": the double-well proton transfer model
//! - Feit, Fleck, Steiger (1982), "Solution of the Schrödinger equation by
//!   a spectral method": split-operator propagation
//! - Endres et al. (2004), "The quest for high-conductance DNA":
//!   tight-binding charge transfer models

pub mod units;
pub mod error;
pub mod encoding;
pub mod hamiltonian;
pub mod perturbation;
pub mod trajectory;
pub mod propagator;
pub mod density;
pub mod simulation;

/// Complex scalar used throughout the engine.
pub type C64 = num_complex::Complex<f64>;

pub mod prelude {
    pub use crate::density::*;
    pub use crate::encoding::*;
    pub use crate::error::*;
    pub use crate::hamiltonian::*;
    pub use crate::perturbation::*;
    pub use crate::propagator::*;
    pub use crate::simulation::*;
    pub use crate::trajectory::*;
    pub use crate::units::*;
    pub use crate::C64;
}
