//! Density matrices, partial trace and von Neumann entropy.
//!
//! Joint densities average |a⊗b⟩⟨a⊗b| over an ensemble of qubit pairs,
//! elementwise for sequence-aligned ensembles or over the full cross
//! product. Each pair's tensor product is normalized before the outer
//! product; a pair that cannot be normalized (any member is the zero-encoded
//! G vector) is dropped, and the average divides by the number of pairs
//! actually used, so the trace stays 1. Ensembles that lose every member
//! this way fail with [`SimError::EmptyEnsemble`].
//!
//! The tensor index convention is a-major: the joint vector component
//! ra·2+rb carries (row-of-A, row-of-B), matching the reshape used by
//! [`partial_trace`].

use nalgebra::{DMatrix, DVector, SymmetricEigen, Vector2};
use num_traits::Zero;

use crate::error::{Result, SimError};
use crate::hamiltonian::{hermiticity_deviation, HERMITICITY_TOL};
use crate::C64;

/// Eigenvalues at or below this floor are dropped before the entropy sum.
pub const EIGENVALUE_FLOOR: f64 = 1e-12;

/// Tolerance around the [0, log2(dim)] entropy bounds before a violation is
/// surfaced.
const ENTROPY_SLACK: f64 = 1e-9;

/// Ensemble members with a norm at or below this cannot be normalized and
/// drop out of the average.
const MEMBER_FLOOR: f64 = 1e-12;

/// How two qubit ensembles are combined into pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pairing {
    /// Elementwise by position; requires equal ensemble lengths.
    Aligned,
    /// Every member of A with every member of B.
    Cross,
}

/// The subsystem summed away by a partial trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subsystem {
    A,
    B,
}

/// Tensor (Kronecker) product of two qubit vectors, a-major.
pub fn kron_pair(a: &Vector2<C64>, b: &Vector2<C64>) -> DVector<C64> {
    DVector::from_vec(vec![a[0] * b[0], a[0] * b[1], a[1] * b[0], a[1] * b[1]])
}

/// 4×4 joint density matrix averaged over the paired ensembles.
pub fn joint_density(
    ensemble_a: &[Vector2<C64>],
    ensemble_b: &[Vector2<C64>],
    pairing: Pairing,
) -> Result<DMatrix<C64>> {
    let pairs: Vec<(usize, usize)> = match pairing {
        Pairing::Aligned => {
            if ensemble_a.len() != ensemble_b.len() {
                return Err(SimError::InvalidConfig {
                    reason: format!(
                        "aligned pairing needs equal ensemble lengths, got {} and {}",
                        ensemble_a.len(),
                        ensemble_b.len()
                    ),
                });
            }
            (0..ensemble_a.len()).map(|i| (i, i)).collect()
        }
        Pairing::Cross => (0..ensemble_a.len())
            .flat_map(|ia| (0..ensemble_b.len()).map(move |ib| (ia, ib)))
            .collect(),
    };

    let total = pairs.len();
    let mut acc: DMatrix<C64> = DMatrix::zeros(4, 4);
    let mut used = 0usize;
    for (ia, ib) in pairs {
        let joint = kron_pair(&ensemble_a[ia], &ensemble_b[ib]);
        let norm = joint.norm();
        if norm <= MEMBER_FLOOR {
            continue;
        }
        let joint = joint.unscale(norm);
        acc += &joint * joint.adjoint();
        used += 1;
    }
    if used == 0 {
        return Err(SimError::EmptyEnsemble {
            context: "joint density averaging".into(),
        });
    }
    if used < total {
        log::debug!("joint density dropped {} unnormalizable pair(s)", total - used);
    }
    Ok(acc.unscale(used as f64))
}

/// 2×2 density matrix averaged over a single qubit ensemble.
pub fn ensemble_density(ensemble: &[Vector2<C64>]) -> Result<DMatrix<C64>> {
    let mut acc: DMatrix<C64> = DMatrix::zeros(2, 2);
    let mut used = 0usize;
    for q in ensemble {
        let norm = q.norm();
        if norm <= MEMBER_FLOOR {
            continue;
        }
        let q = q.unscale(norm);
        for r in 0..2 {
            for c in 0..2 {
                acc[(r, c)] += q[r] * q[c].conj();
            }
        }
        used += 1;
    }
    if used == 0 {
        return Err(SimError::EmptyEnsemble {
            context: "single-ensemble density averaging".into(),
        });
    }
    Ok(acc.unscale(used as f64))
}

/// Partial trace of a 4×4 joint density, contracting the `traced` subsystem.
///
/// The joint matrix is read as the rank-4 tensor J[ra, rb, ca, cb] via row
/// index ra·2+rb and column index ca·2+cb, and the traced subsystem's
/// row/column pair is summed.
pub fn partial_trace(joint: &DMatrix<C64>, traced: Subsystem) -> Result<DMatrix<C64>> {
    if joint.nrows() != 4 || joint.ncols() != 4 {
        return Err(SimError::InvalidConfig {
            reason: format!(
                "partial trace expects a 4x4 joint density, got {}x{}",
                joint.nrows(),
                joint.ncols()
            ),
        });
    }
    let mut reduced: DMatrix<C64> = DMatrix::zeros(2, 2);
    match traced {
        Subsystem::B => {
            for ra in 0..2 {
                for ca in 0..2 {
                    let mut sum = C64::zero();
                    for b in 0..2 {
                        sum += joint[(ra * 2 + b, ca * 2 + b)];
                    }
                    reduced[(ra, ca)] = sum;
                }
            }
        }
        Subsystem::A => {
            for rb in 0..2 {
                for cb in 0..2 {
                    let mut sum = C64::zero();
                    for a in 0..2 {
                        sum += joint[(a * 2 + rb, a * 2 + cb)];
                    }
                    reduced[(rb, cb)] = sum;
                }
            }
        }
    }
    Ok(reduced)
}

/// Von Neumann entropy −Σ λ·log2(λ) over eigenvalues above the floor.
///
/// The input must pass a Hermiticity check first, and the result must land
/// in [0, log2(dim)] up to slack; violations are surfaced as errors, never
/// clamped.
pub fn entropy(rho: &DMatrix<C64>) -> Result<f64> {
    let dim = rho.nrows();
    if dim == 0 || rho.ncols() != dim {
        return Err(SimError::InvalidConfig {
            reason: format!("entropy expects a square matrix, got {}x{}", rho.nrows(), rho.ncols()),
        });
    }
    let deviation = hermiticity_deviation(rho);
    if deviation > HERMITICITY_TOL {
        return Err(SimError::NonHermitian {
            deviation,
            tolerance: HERMITICITY_TOL,
        });
    }

    let eig = SymmetricEigen::new(rho.clone());
    let mut s = 0.0;
    for &lambda in eig.eigenvalues.iter() {
        if lambda > EIGENVALUE_FLOOR {
            s -= lambda * lambda.log2();
        }
    }

    let bound = (dim as f64).log2();
    if s < -ENTROPY_SLACK || s > bound + ENTROPY_SLACK {
        return Err(SimError::EntropyOutOfBounds { value: s, bound });
    }
    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::{encode_qubits, Sequence};

    fn e0() -> Vector2<C64> {
        Vector2::new(C64::new(1.0, 0.0), C64::new(0.0, 0.0))
    }

    fn e1() -> Vector2<C64> {
        Vector2::new(C64::new(0.0, 0.0), C64::new(1.0, 0.0))
    }

    #[test]
    fn aligned_mixture_of_00_and_11_gives_a_maximally_mixed_reduction() {
        let a = vec![e0(), e1()];
        let b = vec![e0(), e1()];
        let rho = joint_density(&a, &b, Pairing::Aligned).unwrap();

        assert!((rho.trace() - C64::new(1.0, 0.0)).norm() < 1e-12);
        assert!(hermiticity_deviation(&rho) < 1e-14);
        // ½(|00⟩⟨00| + |11⟩⟨11|).
        assert!((rho[(0, 0)] - C64::new(0.5, 0.0)).norm() < 1e-12);
        assert!((rho[(3, 3)] - C64::new(0.5, 0.0)).norm() < 1e-12);

        let reduced = partial_trace(&rho, Subsystem::B).unwrap();
        assert!((reduced[(0, 0)] - C64::new(0.5, 0.0)).norm() < 1e-12);
        assert!((reduced[(1, 1)] - C64::new(0.5, 0.0)).norm() < 1e-12);
        let s = entropy(&reduced).unwrap();
        assert!(
            (s - 1.0).abs() < 1e-9,
            "maximally mixed qubit must give entropy 1, got {s}"
        );
    }

    #[test]
    fn pure_product_state_has_zero_entropy() {
        let rho = joint_density(&[e0()], &[e1()], Pairing::Aligned).unwrap();
        let s = entropy(&rho).unwrap();
        assert!(s.abs() < 1e-9, "pure state entropy should vanish, got {s}");

        let reduced = partial_trace(&rho, Subsystem::B).unwrap();
        let s = entropy(&reduced).unwrap();
        assert!(s.abs() < 1e-9);
    }

    #[test]
    fn partial_trace_keeps_the_right_subsystem() {
        // Pure |01⟩: A in |0⟩, B in |1⟩.
        let rho = joint_density(&[e0()], &[e1()], Pairing::Aligned).unwrap();

        let a_side = partial_trace(&rho, Subsystem::B).unwrap();
        assert!((a_side[(0, 0)] - C64::new(1.0, 0.0)).norm() < 1e-12);
        assert!(a_side[(1, 1)].norm() < 1e-12);

        let b_side = partial_trace(&rho, Subsystem::A).unwrap();
        assert!((b_side[(1, 1)] - C64::new(1.0, 0.0)).norm() < 1e-12);
        assert!(b_side[(0, 0)].norm() < 1e-12);
    }

    #[test]
    fn partial_trace_preserves_trace_for_both_subsystems() {
        let a = encode_qubits(&Sequence::new("ATCG"));
        let b = encode_qubits(&Sequence::new("CGAT"));
        let rho = joint_density(&a, &b, Pairing::Cross).unwrap();
        for traced in [Subsystem::A, Subsystem::B] {
            let reduced = partial_trace(&rho, traced).unwrap();
            let diff = (reduced.trace() - rho.trace()).norm();
            assert!(diff < 1e-12, "trace not preserved under {traced:?}: {diff:e}");
        }
    }

    #[test]
    fn unnormalizable_members_drop_but_trace_stays_one() {
        // G encodes to the zero vector; the cross product of "ATCG" and
        // "CGAT" loses every G pairing, and the divisor shrinks with it.
        let a = encode_qubits(&Sequence::new("ATCG"));
        let b = encode_qubits(&Sequence::new("CGAT"));
        let rho = joint_density(&a, &b, Pairing::Cross).unwrap();
        assert!((rho.trace() - C64::new(1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn all_zero_ensembles_report_empty() {
        let g = encode_qubits(&Sequence::new("GGG"));
        assert!(matches!(
            joint_density(&g, &g, Pairing::Cross),
            Err(SimError::EmptyEnsemble { .. })
        ));
        assert!(matches!(
            ensemble_density(&g),
            Err(SimError::EmptyEnsemble { .. })
        ));
    }

    #[test]
    fn aligned_pairing_rejects_unequal_lengths() {
        let a = vec![e0(), e1()];
        let b = vec![e0()];
        assert!(matches!(
            joint_density(&a, &b, Pairing::Aligned),
            Err(SimError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn ensemble_density_of_single_state_is_a_projector() {
        let rho = ensemble_density(&[e0()]).unwrap();
        assert!((rho[(0, 0)] - C64::new(1.0, 0.0)).norm() < 1e-12);
        assert!(rho[(1, 1)].norm() < 1e-12);
        assert!(entropy(&rho).unwrap().abs() < 1e-9);
    }

    #[test]
    fn entropy_hits_the_dimension_bound_for_maximal_mixing() {
        let mixed2 = DMatrix::from_diagonal(&DVector::from_vec(vec![
            C64::new(0.5, 0.0),
            C64::new(0.5, 0.0),
        ]));
        assert!((entropy(&mixed2).unwrap() - 1.0).abs() < 1e-12);

        let mixed4 = DMatrix::from_diagonal(&DVector::from_vec(vec![
            C64::new(0.25, 0.0);
            4
        ]));
        assert!((entropy(&mixed4).unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn entropy_floor_discards_numerical_dust() {
        let nearly_pure = DMatrix::from_diagonal(&DVector::from_vec(vec![
            C64::new(1.0 - 1e-15, 0.0),
            C64::new(1e-15, 0.0),
        ]));
        let s = entropy(&nearly_pure).unwrap();
        assert!(s.abs() < 1e-9, "dust eigenvalue must not explode the log, got {s}");
    }

    #[test]
    fn entropy_rejects_non_hermitian_input() {
        let mut rho: DMatrix<C64> = DMatrix::zeros(2, 2);
        rho[(0, 1)] = C64::new(1.0, 0.0);
        assert!(matches!(entropy(&rho), Err(SimError::NonHermitian { .. })));
    }

    #[test]
    fn entropy_rejects_non_square_input() {
        let rho: DMatrix<C64> = DMatrix::zeros(2, 3);
        assert!(matches!(entropy(&rho), Err(SimError::InvalidConfig { .. })));
    }
}
