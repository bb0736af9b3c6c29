//! Top-level runners tying encoding, operators, propagation and entropy
//! together.
//!
//! Each (sequence, base-pair-index) run is independent, so the per-base-pair
//! and per-region runners submit one task per item and join the results by
//! position index. With the default `parallel` feature the tasks run on the
//! rayon pool; without it they run sequentially with identical results,
//! since every task derives its own seed from the configured base seed.

use nalgebra::DVector;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::density::{ensemble_density, entropy, joint_density, partial_trace, Pairing, Subsystem};
use crate::encoding::{encode_qubits, lattice_state, Nucleotide, Sequence};
use crate::error::{Result, SimError};
use crate::hamiltonian::{BasePair, DoubleWell, Hamiltonian, LatticeParams, SpatialGrid};
use crate::perturbation::PerturbationTerm;
use crate::propagator::{evolve, EvolutionConfig, Integrator};
use crate::trajectory::{RecordMode, Trajectory};
use crate::units::PhysicalConstants;
use crate::C64;

/// Seed offset separating the two regions' random streams.
const REGION_B_SEED_OFFSET: u64 = 7919;

/// Von Neumann entropy of a sequence's averaged qubit ensemble.
pub fn von_neumann_entropy(seq: &Sequence) -> Result<f64> {
    let rho = ensemble_density(&encode_qubits(seq))?;
    entropy(&rho)
}

/// Entanglement entropy between two sequences: cross-paired joint density,
/// partial trace over the second subsystem, entropy of the reduction.
pub fn entanglement_entropy(seq_a: &Sequence, seq_b: &Sequence) -> Result<f64> {
    let qubits_a = encode_qubits(seq_a);
    let qubits_b = encode_qubits(seq_b);
    let joint = joint_density(&qubits_a, &qubits_b, Pairing::Cross)?;
    let reduced = partial_trace(&joint, Subsystem::B)?;
    entropy(&reduced)
}

/// Normalized Gaussian packet ψ(x) ∝ exp(−(x−center)²/4σ²) on `grid`.
pub fn gaussian_packet(grid: &SpatialGrid, center: f64, width: f64) -> Result<DVector<C64>> {
    if !(width.is_finite() && width > 0.0) {
        return Err(SimError::InvalidConfig {
            reason: format!("packet width must be finite and positive, got {width:e}"),
        });
    }
    let mut packet = DVector::from_iterator(
        grid.n,
        (0..grid.n).map(|i| {
            let x = grid.coordinate(i) - center;
            C64::new((-x * x / (4.0 * width * width)).exp(), 0.0)
        }),
    );
    let norm = packet.norm();
    if !(norm.is_finite() && norm > 1e-12) {
        return Err(SimError::NumericalInstability {
            step: 0,
            detail: format!("Gaussian packet norm {norm:e}; center {center:e} off the grid"),
        });
    }
    packet.unscale_mut(norm);
    Ok(packet)
}

/// Settings for per-base-pair double-well runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WellRunConfig {
    pub grid_points: usize,
    /// Grid spacing (m).
    pub dx: f64,
    /// Initial packet width σ (m); each run starts centered on the left
    /// minimum of its pair's well.
    pub packet_width: f64,
    /// Per-run evolution settings; task i runs with seed
    /// `evolution.seed + i·7919`.
    pub evolution: EvolutionConfig,
    pub perturbation: Option<PerturbationTerm>,
}

impl Default for WellRunConfig {
    fn default() -> Self {
        WellRunConfig {
            grid_points: 128,
            dx: 5.0e-12,
            packet_width: 3.0e-11,
            // Many trajectories at once: stream observables by default.
            evolution: EvolutionConfig {
                dt: 1.0e-17,
                num_steps: 500,
                renorm_interval: 10,
                record_mode: RecordMode::Observables,
                seed: 42,
                constants: PhysicalConstants::si_proton(),
            },
            perturbation: None,
        }
    }
}

/// Result of one base pair's double-well run.
#[derive(Debug, Clone, PartialEq)]
pub struct WellOutcome {
    /// Position of the base in the input sequence.
    pub index: usize,
    pub pair: BasePair,
    /// Time average of the right-well probability; 0 for a zero-step run.
    pub mean_right_well: f64,
    /// Right-well probability after the final step.
    pub final_right_well: f64,
    pub trajectory: Trajectory,
}

/// One spectral double-well run per base of `seq`, in parallel, joined by
/// position index.
pub fn run_base_pair_wells(seq: &Sequence, config: &WellRunConfig) -> Result<Vec<WellOutcome>> {
    if seq.is_empty() {
        return Err(SimError::EmptyEnsemble {
            context: "base-pair well run".into(),
        });
    }
    let grid = SpatialGrid::centered(config.grid_points, config.dx)?;
    log::debug!(
        "well run: {} base pairs, {} grid points, {} steps each",
        seq.len(),
        grid.n,
        config.evolution.num_steps
    );

    let run_one = |(index, base): (usize, Nucleotide)| -> Result<WellOutcome> {
        let pair = BasePair::from_base(base);
        let well = DoubleWell::for_pair(pair);
        let hamiltonian =
            Hamiltonian::double_well_on_grid(&grid, &well, &config.evolution.constants)?;
        let initial = gaussian_packet(&grid, -well.half_separation, config.packet_width)?;
        let mut evo = config.evolution;
        evo.seed = config.evolution.seed.wrapping_add(index as u64 * 7919);
        let trajectory = evolve(
            &initial,
            &hamiltonian,
            config.perturbation.as_ref(),
            Integrator::Spectral,
            &evo,
        )?;
        Ok(WellOutcome {
            index,
            pair,
            mean_right_well: trajectory.mean_right_well().unwrap_or(0.0),
            final_right_well: trajectory.right_well_series.last().copied().unwrap_or(0.0),
            trajectory,
        })
    };

    let tasks: Vec<(usize, Nucleotide)> = seq.bases().iter().copied().enumerate().collect();
    #[cfg(feature = "parallel")]
    let outcomes: Result<Vec<WellOutcome>> = tasks.into_par_iter().map(run_one).collect();
    #[cfg(not(feature = "parallel"))]
    let outcomes: Result<Vec<WellOutcome>> = tasks.into_iter().map(run_one).collect();
    outcomes
}

/// Settings for a two-region lattice comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionRunConfig {
    pub lattice: LatticeParams,
    /// Shared evolution settings; region A runs with `evolution.seed`,
    /// region B with `evolution.seed + 7919`.
    pub evolution: EvolutionConfig,
    /// `DirectEuler` or `DirectExact`; the spectral scheme has no lattice
    /// context here.
    pub integrator: Integrator,
    /// Applied identically to both regions when present.
    pub perturbation: Option<PerturbationTerm>,
}

impl Default for RegionRunConfig {
    fn default() -> Self {
        RegionRunConfig {
            lattice: LatticeParams::default(),
            evolution: EvolutionConfig {
                dt: 1.0e-16,
                num_steps: 1000,
                renorm_interval: 10,
                record_mode: RecordMode::FullTrajectory,
                seed: 42,
                constants: PhysicalConstants::ev_lattice(),
            },
            integrator: Integrator::DirectEuler,
            perturbation: None,
        }
    }
}

/// Scalar and vector metrics for one region's run.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionMetrics {
    /// Von Neumann entropy of the region's qubit ensemble.
    pub entropy: f64,
    /// Time-averaged complex amplitude per lattice site.
    pub mean_amplitude: DVector<C64>,
    /// Largest pre-renormalization norm drift seen during the run.
    pub max_norm_drift: f64,
    pub trajectory: Trajectory,
}

/// The bundle handed to external statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionComparison {
    pub region_a: RegionMetrics,
    pub region_b: RegionMetrics,
    /// Entanglement entropy between the two regions' ensembles.
    pub entanglement: f64,
}

/// Lattice runs plus entropies for a coding/non-coding region pair.
pub fn run_region_pair(
    seq_a: &Sequence,
    seq_b: &Sequence,
    config: &RegionRunConfig,
) -> Result<RegionComparison> {
    if config.integrator == Integrator::Spectral {
        return Err(SimError::InvalidConfig {
            reason: "region comparison runs on the lattice model; pick DirectEuler or DirectExact"
                .into(),
        });
    }
    log::debug!(
        "region pair run: |A| = {}, |B| = {}, {:?}",
        seq_a.len(),
        seq_b.len(),
        config.integrator
    );

    let run_region = |seq: &Sequence, seed_offset: u64| -> Result<RegionMetrics> {
        let initial = lattice_state(seq)?;
        let seed = config.evolution.seed.wrapping_add(seed_offset);
        let mut rng = StdRng::seed_from_u64(seed);
        let hamiltonian = Hamiltonian::tight_binding(seq.len(), &config.lattice, &mut rng)?;
        let mut evo = config.evolution;
        evo.seed = seed;
        let trajectory = evolve(
            &initial,
            &hamiltonian,
            config.perturbation.as_ref(),
            config.integrator,
            &evo,
        )?;
        Ok(RegionMetrics {
            entropy: von_neumann_entropy(seq)?,
            mean_amplitude: trajectory.mean_amplitude.clone(),
            max_norm_drift: trajectory.max_norm_drift(),
            trajectory,
        })
    };

    #[cfg(feature = "parallel")]
    let (result_a, result_b) = rayon::join(
        || run_region(seq_a, 0),
        || run_region(seq_b, REGION_B_SEED_OFFSET),
    );
    #[cfg(not(feature = "parallel"))]
    let (result_a, result_b) = (
        run_region(seq_a, 0),
        run_region(seq_b, REGION_B_SEED_OFFSET),
    );

    Ok(RegionComparison {
        region_a: result_a?,
        region_b: result_b?,
        entanglement: entanglement_entropy(seq_a, seq_b)?,
    })
}
