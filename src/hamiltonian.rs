//! Hermitian operator construction for both models.
//!
//! Lattice model: a tight-binding chain over the encoded sequence, with
//! on-site energies drawn uniformly from a configured range (eV) and a fixed
//! real transfer integral on the nearest-neighbor off-diagonals.
//!
//! Continuum model: a single proton on a 1-D grid in a quartic double well
//! V(x) = V0·((x/a)⁴ − 2(x/a)² + 1), one (a, V0) pair per base-pair type,
//! plus the second-difference kinetic operator. V(0) = V0 and V(±a) = 0.
//!
//! Every constructor yields H = H† by construction; propagators still run
//! [`Hamiltonian::check_hermitian`] before use.

use nalgebra::{DMatrix, DVector};
use rand::Rng;

use crate::encoding::Nucleotide;
use crate::error::{Result, SimError};
use crate::units::{ev_to_joules, PhysicalConstants};
use crate::C64;

/// Tolerance for max |H[i,j] − conj(H[j,i])| Hermiticity checks.
pub const HERMITICITY_TOL: f64 = 1e-10;

/// Canonical Watson-Crick base pair, keyed by the base on the reference
/// strand.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BasePair {
    AT,
    TA,
    CG,
    GC,
}

impl BasePair {
    /// The pair a reference-strand base belongs to.
    pub fn from_base(base: Nucleotide) -> Self {
        match base {
            Nucleotide::A => BasePair::AT,
            Nucleotide::T => BasePair::TA,
            Nucleotide::C => BasePair::CG,
            Nucleotide::G => BasePair::GC,
        }
    }
}

/// Quartic symmetric double well for hydrogen-bond proton transfer.
///
/// `evaluate` works in the unit of `barrier_height` (eV in the built-in
/// tables); the grid builder converts to J when assembling the operator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoubleWell {
    /// Distance from the barrier top at x = 0 to each minimum (m).
    pub half_separation: f64,
    /// Barrier height V0 = V(0) (eV).
    pub barrier_height: f64,
}

impl DoubleWell {
    /// Model parameters per pair type. Triple-hydrogen-bonded C·G pairs get
    /// a narrower, taller barrier than double-bonded A·T pairs.
    pub fn for_pair(pair: BasePair) -> Self {
        let (a, v0) = match pair {
            BasePair::AT | BasePair::TA => (1.0e-10, 0.065),
            BasePair::CG | BasePair::GC => (0.9e-10, 0.085),
        };
        DoubleWell {
            half_separation: a,
            barrier_height: v0,
        }
    }

    /// Fallback parameters when no pair type applies.
    pub fn default_well() -> Self {
        DoubleWell {
            half_separation: 1.0e-10,
            barrier_height: 0.065,
        }
    }

    /// V(x) = V0·((x/a)⁴ − 2(x/a)² + 1).
    pub fn evaluate(&self, x: f64) -> f64 {
        let u = x / self.half_separation;
        let u2 = u * u;
        self.barrier_height * (u2 * u2 - 2.0 * u2 + 1.0)
    }
}

/// Uniform 1-D grid of `n` points centered on x = 0 with spacing `dx`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialGrid {
    pub n: usize,
    pub dx: f64,
}

impl SpatialGrid {
    pub fn centered(n: usize, dx: f64) -> Result<Self> {
        if n < 2 {
            return Err(SimError::InvalidConfig {
                reason: format!("spatial grid needs at least 2 points, got {n}"),
            });
        }
        if !(dx.is_finite() && dx > 0.0) {
            return Err(SimError::InvalidConfig {
                reason: format!("spatial step must be finite and positive, got {dx:e}"),
            });
        }
        Ok(SpatialGrid { n, dx })
    }

    /// Coordinate of grid point `i`; point (n−1)/2 sits at x = 0 for odd n.
    pub fn coordinate(&self, i: usize) -> f64 {
        (i as f64 - (self.n as f64 - 1.0) / 2.0) * self.dx
    }

    pub fn coordinates(&self) -> Vec<f64> {
        (0..self.n).map(|i| self.coordinate(i)).collect()
    }
}

/// Grid data a spectral propagator needs beyond the matrix itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ContinuumContext {
    pub grid: SpatialGrid,
    /// Time-independent potential diagonal in J, one entry per grid point.
    pub potential: DVector<f64>,
}

/// Parameters of the tight-binding lattice builder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatticeParams {
    /// On-site binding energy range (eV); each site is drawn uniformly.
    pub energy_range: (f64, f64),
    /// Nearest-neighbor transfer integral (eV).
    pub coupling: f64,
}

impl Default for LatticeParams {
    fn default() -> Self {
        LatticeParams {
            energy_range: (0.02, 0.03),
            coupling: 0.025,
        }
    }
}

/// A Hermitian operator plus the continuum context when one exists.
#[derive(Debug, Clone, PartialEq)]
pub struct Hamiltonian {
    pub matrix: DMatrix<C64>,
    /// Present only for continuum builds; block composites and lattice
    /// chains carry `None` and cannot be evolved spectrally.
    pub continuum: Option<ContinuumContext>,
}

impl Hamiltonian {
    pub fn dim(&self) -> usize {
        self.matrix.nrows()
    }

    /// Tight-binding chain with random on-site energies.
    ///
    /// Randomness comes only from `rng`; seeding it fixes the matrix
    /// bit-for-bit across calls.
    pub fn tight_binding<R: Rng>(n: usize, params: &LatticeParams, rng: &mut R) -> Result<Self> {
        let (lo, hi) = params.energy_range;
        if !(lo.is_finite() && hi.is_finite() && lo <= hi) {
            return Err(SimError::InvalidConfig {
                reason: format!("binding energy range ({lo:e}, {hi:e}) is not a valid interval"),
            });
        }
        let energies: Vec<f64> = (0..n)
            .map(|_| if lo < hi { rng.gen_range(lo..hi) } else { lo })
            .collect();
        Self::from_site_energies(&energies, params.coupling)
    }

    /// Tight-binding chain with explicitly given on-site energies (eV).
    pub fn from_site_energies(energies: &[f64], coupling: f64) -> Result<Self> {
        let n = energies.len();
        if n == 0 {
            return Err(SimError::InvalidConfig {
                reason: "tight-binding chain needs at least one site".into(),
            });
        }
        let mut matrix = DMatrix::zeros(n, n);
        for (i, &e) in energies.iter().enumerate() {
            matrix[(i, i)] = C64::new(e, 0.0);
        }
        for i in 0..n.saturating_sub(1) {
            matrix[(i, i + 1)] = C64::new(coupling, 0.0);
            matrix[(i + 1, i)] = C64::new(coupling, 0.0);
        }
        let h = Hamiltonian {
            matrix,
            continuum: None,
        };
        h.assert_finite()?;
        Ok(h)
    }

    /// Discretized single-particle Hamiltonian on `grid`: double-well
    /// potential diagonal (converted to J) plus the tridiagonal kinetic
    /// operator with diagonal 2·ħ²/(2mΔx²) and off-diagonal −ħ²/(2mΔx²).
    pub fn double_well_on_grid(
        grid: &SpatialGrid,
        well: &DoubleWell,
        constants: &PhysicalConstants,
    ) -> Result<Self> {
        let n = grid.n;
        if n < 2 {
            return Err(SimError::InvalidConfig {
                reason: format!("continuum discretization needs at least 2 grid points, got {n}"),
            });
        }
        let t = constants.hbar * constants.hbar / (2.0 * constants.mass * grid.dx * grid.dx);
        let potential = DVector::from_iterator(
            n,
            (0..n).map(|i| ev_to_joules(well.evaluate(grid.coordinate(i)))),
        );

        let mut matrix = DMatrix::zeros(n, n);
        for i in 0..n {
            matrix[(i, i)] = C64::new(potential[i] + 2.0 * t, 0.0);
        }
        for i in 0..n - 1 {
            matrix[(i, i + 1)] = C64::new(-t, 0.0);
            matrix[(i + 1, i)] = C64::new(-t, 0.0);
        }
        let h = Hamiltonian {
            matrix,
            continuum: Some(ContinuumContext {
                grid: *grid,
                potential,
            }),
        };
        h.assert_finite()?;
        Ok(h)
    }

    /// Block Hamiltonian for a two-region composite: `a` and `b` on the
    /// diagonal, plus a real scalar coupling linking the last site of `a`
    /// to the first site of `b`.
    pub fn block_composite(a: &Hamiltonian, b: &Hamiltonian, coupling: f64) -> Result<Self> {
        let (na, nb) = (a.dim(), b.dim());
        if na == 0 || nb == 0 {
            return Err(SimError::InvalidConfig {
                reason: "block composite needs two non-empty blocks".into(),
            });
        }
        let n = na + nb;
        let mut matrix = DMatrix::zeros(n, n);
        matrix.view_mut((0, 0), (na, na)).copy_from(&a.matrix);
        matrix.view_mut((na, na), (nb, nb)).copy_from(&b.matrix);
        matrix[(na - 1, na)] = C64::new(coupling, 0.0);
        matrix[(na, na - 1)] = C64::new(coupling, 0.0);
        let h = Hamiltonian {
            matrix,
            continuum: None,
        };
        h.assert_finite()?;
        Ok(h)
    }

    /// Max |H[i,j] − conj(H[j,i])| over all entries.
    pub fn hermiticity_deviation(&self) -> f64 {
        hermiticity_deviation(&self.matrix)
    }

    /// Fail with [`SimError::NonHermitian`] when the deviation exceeds
    /// `tolerance`.
    pub fn check_hermitian(&self, tolerance: f64) -> Result<()> {
        let deviation = self.hermiticity_deviation();
        if deviation > tolerance {
            return Err(SimError::NonHermitian {
                deviation,
                tolerance,
            });
        }
        Ok(())
    }

    /// Reject any non-finite entry before the operator reaches a propagator.
    pub fn assert_finite(&self) -> Result<()> {
        for (idx, v) in self.matrix.iter().enumerate() {
            if !(v.re.is_finite() && v.im.is_finite()) {
                let (i, j) = (idx % self.dim(), idx / self.dim());
                return Err(SimError::NumericalInstability {
                    step: 0,
                    detail: format!("non-finite Hamiltonian entry at ({i}, {j})"),
                });
            }
        }
        Ok(())
    }
}

/// Max |M[i,j] − conj(M[j,i])| for any square complex matrix.
pub fn hermiticity_deviation(m: &DMatrix<C64>) -> f64 {
    let n = m.nrows();
    let mut max = 0.0f64;
    for i in 0..n {
        for j in 0..n {
            let d = (m[(i, j)] - m[(j, i)].conj()).norm();
            if d > max {
                max = d;
            }
        }
    }
    max
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn double_well_closed_form_values() {
        let well = DoubleWell {
            half_separation: 1e-10,
            barrier_height: 0.065,
        };
        // (0/a)⁴ − 2(0/a)² + 1 = 1, so V(0) = V0 exactly.
        assert_eq!(well.evaluate(0.0), 0.065);
        // (±1)⁴ − 2(±1)² + 1 = 0, so the minima sit at zero energy.
        assert_eq!(well.evaluate(1e-10), 0.0);
        assert_eq!(well.evaluate(-1e-10), 0.0);
        // Outside the wells the quartic dominates and the potential rises.
        assert!(well.evaluate(2e-10) > well.barrier_height);
    }

    #[test]
    fn double_well_is_symmetric() {
        let well = DoubleWell::for_pair(BasePair::CG);
        for k in 1..20 {
            let x = k as f64 * 1.3e-11;
            assert!(
                (well.evaluate(x) - well.evaluate(-x)).abs() < 1e-18,
                "V({x:e}) != V({:e})",
                -x
            );
        }
    }

    #[test]
    fn pair_table_distinguishes_bond_counts() {
        let at = DoubleWell::for_pair(BasePair::AT);
        let cg = DoubleWell::for_pair(BasePair::GC);
        assert!(cg.barrier_height > at.barrier_height);
        assert_eq!(DoubleWell::for_pair(BasePair::TA), at);
        assert_eq!(DoubleWell::default_well(), at);
    }

    #[test]
    fn grid_coordinates_are_centered() {
        let grid = SpatialGrid::centered(5, 0.5).unwrap();
        assert_eq!(grid.coordinate(2), 0.0);
        assert_eq!(grid.coordinate(0), -1.0);
        assert_eq!(grid.coordinate(4), 1.0);

        // Even grids straddle zero with no point exactly on it.
        let grid = SpatialGrid::centered(4, 1.0).unwrap();
        let coords = grid.coordinates();
        assert_eq!(coords, vec![-1.5, -0.5, 0.5, 1.5]);
        assert!(coords.iter().all(|&x| x != 0.0));
    }

    #[test]
    fn grid_rejects_degenerate_input() {
        assert!(SpatialGrid::centered(1, 0.1).is_err());
        assert!(SpatialGrid::centered(8, 0.0).is_err());
        assert!(SpatialGrid::centered(8, f64::NAN).is_err());
    }

    #[test]
    fn tight_binding_is_deterministic_under_a_seed() {
        let params = LatticeParams::default();
        let h1 =
            Hamiltonian::tight_binding(4, &params, &mut StdRng::seed_from_u64(1234)).unwrap();
        let h2 =
            Hamiltonian::tight_binding(4, &params, &mut StdRng::seed_from_u64(1234)).unwrap();
        assert_eq!(h1.matrix, h2.matrix, "same seed must give identical matrices");

        let h3 =
            Hamiltonian::tight_binding(4, &params, &mut StdRng::seed_from_u64(1235)).unwrap();
        assert_ne!(h1.matrix, h3.matrix, "different seeds should differ");
    }

    #[test]
    fn tight_binding_structure_and_range() {
        let params = LatticeParams {
            energy_range: (0.02, 0.03),
            coupling: 0.025,
        };
        let mut rng = StdRng::seed_from_u64(7);
        let h = Hamiltonian::tight_binding(6, &params, &mut rng).unwrap();
        for i in 0..6 {
            let e = h.matrix[(i, i)];
            assert_eq!(e.im, 0.0, "on-site energies are real");
            assert!(
                (0.02..0.03).contains(&e.re),
                "site {i} energy {} outside configured range",
                e.re
            );
        }
        for i in 0..5 {
            assert_eq!(h.matrix[(i, i + 1)], C64::new(0.025, 0.0));
            assert_eq!(h.matrix[(i + 1, i)], C64::new(0.025, 0.0));
        }
        // Nothing beyond the first off-diagonals.
        for i in 0..6 {
            for j in 0..6 {
                if (i as i64 - j as i64).abs() > 1 {
                    assert_eq!(h.matrix[(i, j)], C64::new(0.0, 0.0));
                }
            }
        }
        assert!(h.hermiticity_deviation() < 1e-15);
    }

    #[test]
    fn tight_binding_accepts_degenerate_energy_range() {
        let params = LatticeParams {
            energy_range: (0.025, 0.025),
            coupling: 0.01,
        };
        let mut rng = StdRng::seed_from_u64(7);
        let h = Hamiltonian::tight_binding(3, &params, &mut rng).unwrap();
        for i in 0..3 {
            assert_eq!(h.matrix[(i, i)].re, 0.025);
        }
    }

    #[test]
    fn tight_binding_rejects_inverted_range() {
        let params = LatticeParams {
            energy_range: (0.03, 0.02),
            coupling: 0.025,
        };
        let mut rng = StdRng::seed_from_u64(7);
        assert!(matches!(
            Hamiltonian::tight_binding(3, &params, &mut rng),
            Err(SimError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn explicit_site_energies_land_on_the_diagonal() {
        let h = Hamiltonian::from_site_energies(&[0.02, 0.03], 0.025).unwrap();
        assert_eq!(h.dim(), 2);
        assert_eq!(h.matrix[(0, 0)], C64::new(0.02, 0.0));
        assert_eq!(h.matrix[(1, 1)], C64::new(0.03, 0.0));
        assert_eq!(h.matrix[(0, 1)], C64::new(0.025, 0.0));
        assert_eq!(h.matrix[(1, 0)], C64::new(0.025, 0.0));
    }

    #[test]
    fn continuum_hamiltonian_is_hermitian_with_expected_kinetic_terms() {
        let grid = SpatialGrid::centered(33, 2.0e-11).unwrap();
        let constants = PhysicalConstants::si_proton();
        let well = DoubleWell::default_well();
        let h = Hamiltonian::double_well_on_grid(&grid, &well, &constants).unwrap();

        assert_eq!(h.dim(), 33);
        h.check_hermitian(HERMITICITY_TOL).unwrap();

        let t = constants.hbar * constants.hbar / (2.0 * constants.mass * grid.dx * grid.dx);
        assert!((h.matrix[(0, 1)].re + t).abs() < t * 1e-12);

        // Center point: V(0) = V0 in J plus the kinetic diagonal.
        let center = 16;
        assert_eq!(grid.coordinate(center), 0.0);
        let expected = ev_to_joules(well.barrier_height) + 2.0 * t;
        let got = h.matrix[(center, center)].re;
        assert!(
            (got - expected).abs() < expected.abs() * 1e-12,
            "center diagonal {got:e} vs expected {expected:e}"
        );

        let ctx = h.continuum.as_ref().unwrap();
        assert_eq!(ctx.potential.len(), 33);
        assert!((ctx.potential[center] - ev_to_joules(well.barrier_height)).abs() < 1e-30);
    }

    #[test]
    fn block_composite_couples_adjacent_block_edges() {
        let a = Hamiltonian::from_site_energies(&[0.02, 0.021, 0.022], 0.01).unwrap();
        let b = Hamiltonian::from_site_energies(&[0.03, 0.031], 0.012).unwrap();
        let h = Hamiltonian::block_composite(&a, &b, 0.005).unwrap();

        assert_eq!(h.dim(), 5);
        assert!(h.continuum.is_none());
        h.check_hermitian(HERMITICITY_TOL).unwrap();

        // Blocks preserved on the diagonal.
        assert_eq!(h.matrix[(1, 1)], a.matrix[(1, 1)]);
        assert_eq!(h.matrix[(3, 3)], b.matrix[(0, 0)]);
        assert_eq!(h.matrix[(3, 4)], b.matrix[(0, 1)]);

        // Inter-block coupling only at the shared edge.
        assert_eq!(h.matrix[(2, 3)], C64::new(0.005, 0.0));
        assert_eq!(h.matrix[(3, 2)], C64::new(0.005, 0.0));
        assert_eq!(h.matrix[(0, 3)], C64::new(0.0, 0.0));
        assert_eq!(h.matrix[(2, 4)], C64::new(0.0, 0.0));
    }

    #[test]
    fn hermiticity_check_rejects_tampered_matrix() {
        let mut h = Hamiltonian::from_site_energies(&[0.02, 0.03], 0.025).unwrap();
        h.matrix[(0, 1)] = C64::new(0.025, 0.5);
        let err = h.check_hermitian(HERMITICITY_TOL).unwrap_err();
        match err {
            SimError::NonHermitian { deviation, .. } => {
                assert!(deviation > 0.9, "deviation {deviation} should be ~1.0")
            }
            other => panic!("expected NonHermitian, got {other:?}"),
        }
    }

    #[test]
    fn finite_check_rejects_nan_entries() {
        let mut h = Hamiltonian::from_site_energies(&[0.02, 0.03], 0.025).unwrap();
        h.matrix[(1, 0)] = C64::new(f64::NAN, 0.0);
        assert!(matches!(
            h.assert_finite(),
            Err(SimError::NumericalInstability { step: 0, .. })
        ));
    }
}
