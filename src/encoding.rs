//! DNA sequence types and the two state encodings.
//!
//! Two distinct encodings feed the two models and are deliberately not
//! reconciled:
//!
//! * the **qubit table** ([`qubit_amplitudes`]) maps each base to a real
//!   2-vector consumed by the density-matrix analysis, with C as the
//!   normalized superposition (1,1)/√2;
//! * the **lattice table** ([`lattice_amplitude`]) maps each base to one
//!   complex site amplitude, with C as (1+i)/√2.
//!
//! Characters outside the alphabet are skipped, not defaulted and not an
//! error; downstream ensemble sizes depend on that policy. Lowercase input
//! maps like uppercase.

use nalgebra::{DVector, Vector2};
use std::f64::consts::FRAC_1_SQRT_2;
use std::fmt;

use crate::error::{Result, SimError};
use crate::C64;

/// One nucleotide of the {A, T, C, G} alphabet.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Nucleotide {
    A,
    T,
    C,
    G,
}

impl Nucleotide {
    /// Parse one character; `None` for anything outside the alphabet.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(Nucleotide::A),
            'T' => Some(Nucleotide::T),
            'C' => Some(Nucleotide::C),
            'G' => Some(Nucleotide::G),
            _ => None,
        }
    }

    /// Watson-Crick complement: A↔T, C↔G.
    pub fn complement(self) -> Self {
        match self {
            Nucleotide::A => Nucleotide::T,
            Nucleotide::T => Nucleotide::A,
            Nucleotide::C => Nucleotide::G,
            Nucleotide::G => Nucleotide::C,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Nucleotide::A => 'A',
            Nucleotide::T => 'T',
            Nucleotide::C => 'C',
            Nucleotide::G => 'G',
        }
    }
}

/// An immutable nucleotide sequence.
///
/// Construction records how many input characters were skipped so callers
/// can audit the policy, but the skipped characters themselves are gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    bases: Vec<Nucleotide>,
    skipped: usize,
}

impl Sequence {
    /// Build from raw text, silently dropping out-of-alphabet characters.
    pub fn new(input: &str) -> Self {
        let mut bases = Vec::with_capacity(input.len());
        let mut skipped = 0usize;
        for c in input.chars() {
            match Nucleotide::from_char(c) {
                Some(b) => bases.push(b),
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            log::debug!("sequence construction skipped {skipped} character(s)");
        }
        Sequence { bases, skipped }
    }

    pub fn from_bases(bases: Vec<Nucleotide>) -> Self {
        Sequence { bases, skipped: 0 }
    }

    /// The complementary-strand transform of this sequence.
    pub fn complement(&self) -> Sequence {
        Sequence {
            bases: self.bases.iter().map(|b| b.complement()).collect(),
            skipped: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    pub fn bases(&self) -> &[Nucleotide] {
        &self.bases
    }

    /// Input characters dropped by the skip policy during construction.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.bases {
            write!(f, "{}", b.to_char())?;
        }
        Ok(())
    }
}

/// Qubit-table encoding of one base.
///
/// A→(1,0), T→(0,1), C→(1,1)/√2, G→(0,0). The zero vector for G is a valid
/// table entry; it drops out later when density matrices discard
/// unnormalizable ensemble members.
pub fn qubit_amplitudes(base: Nucleotide) -> Vector2<C64> {
    let one = C64::new(1.0, 0.0);
    let zero = C64::new(0.0, 0.0);
    let half = C64::new(FRAC_1_SQRT_2, 0.0);
    match base {
        Nucleotide::A => Vector2::new(one, zero),
        Nucleotide::T => Vector2::new(zero, one),
        Nucleotide::C => Vector2::new(half, half),
        Nucleotide::G => Vector2::new(zero, zero),
    }
}

/// Complex-lattice encoding of one base: A→1, T→i, C→(1+i)/√2, G→0.
pub fn lattice_amplitude(base: Nucleotide) -> C64 {
    match base {
        Nucleotide::A => C64::new(1.0, 0.0),
        Nucleotide::T => C64::new(0.0, 1.0),
        Nucleotide::C => C64::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2),
        Nucleotide::G => C64::new(0.0, 0.0),
    }
}

/// Qubit ensemble for a whole sequence, one 2-vector per retained base.
pub fn encode_qubits(seq: &Sequence) -> Vec<Vector2<C64>> {
    seq.bases().iter().map(|&b| qubit_amplitudes(b)).collect()
}

/// Normalized lattice state for a whole sequence, one site per retained base.
///
/// Fails on an empty sequence, and on a zero-norm amplitude pattern (an
/// all-G sequence) since that cannot serve as an initial state.
pub fn lattice_state(seq: &Sequence) -> Result<DVector<C64>> {
    if seq.is_empty() {
        return Err(SimError::EmptyEnsemble {
            context: "lattice state initialization".into(),
        });
    }
    let amps: Vec<C64> = seq.bases().iter().map(|&b| lattice_amplitude(b)).collect();
    let state = DVector::from_vec(amps);
    let norm = state.norm();
    if !(norm.is_finite() && norm > 1e-12) {
        return Err(SimError::NumericalInstability {
            step: 0,
            detail: format!("zero-norm initial lattice state (norm = {norm:e})"),
        });
    }
    Ok(state.unscale(norm))
}
