//! Time-stepping propagation under a Hamiltonian.
//!
//! Three interchangeable schemes sit behind one [`evolve`] call, selected by
//! [`Integrator`]:
//!
//! * `Spectral`: split-operator (Strang) stepping for the continuum model,
//!   half kinetic step in momentum space, full potential step in position
//!   space, half kinetic step. Unitary per step up to FFT round-trip error,
//!   so the state is renormalized only every `renorm_interval` steps.
//! * `DirectEuler`: first-order explicit step
//!   ψ' = normalize(ψ − (i·dt/ħ)·H(t)·ψ). Not unitary by construction; the
//!   renormalization after every step is mandatory and is a deliberate,
//!   physically lossy stabilization.
//! * `DirectExact`: U = exp(−i·H·dt/ħ) precomputed once from the Hermitian
//!   eigendecomposition, applied every step. Requires a time-independent H,
//!   so configuring a perturbation with it is rejected.
//!
//! A zero or near-zero norm at a forced renormalization, or any non-finite
//! value, aborts the run with the failing step index. A step count of 0
//! yields an empty trajectory without a single propagation call.

use nalgebra::{DMatrix, DVector, SymmetricEigen};
use num_traits::Zero;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rustfft::{Fft, FftPlanner};
use std::f64::consts::TAU;

use crate::error::{Result, SimError};
use crate::hamiltonian::{ContinuumContext, Hamiltonian, HERMITICITY_TOL};
use crate::perturbation::PerturbationTerm;
use crate::trajectory::{RecordMode, Trajectory, TrajectoryRecorder};
use crate::units::PhysicalConstants;
use crate::C64;

/// Norms at or below this are treated as numerically dead states.
pub(crate) const NORM_FLOOR: f64 = 1e-12;

/// Propagation scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Integrator {
    /// FFT split-operator stepping; needs a continuum Hamiltonian.
    Spectral,
    /// First-order explicit step with per-step renormalization.
    DirectEuler,
    /// Precomputed matrix-exponential unitary step; time-independent H only.
    DirectExact,
}

/// Knobs of one propagation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvolutionConfig {
    /// Time step (s).
    pub dt: f64,
    /// Number of steps; 0 is allowed and produces an empty trajectory.
    pub num_steps: usize,
    /// Steps between forced renormalizations in the spectral scheme.
    /// Direct schemes renormalize every step regardless.
    pub renorm_interval: usize,
    pub record_mode: RecordMode,
    /// Seeds the jitter stream of a noisy perturbation.
    pub seed: u64,
    /// Must be the same bundle the Hamiltonian was built with; `hbar` fixes
    /// the energy unit system, `mass` feeds the spectral kinetic factor.
    pub constants: PhysicalConstants,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        EvolutionConfig {
            dt: 1.0e-16,
            num_steps: 1000,
            renorm_interval: 10,
            record_mode: RecordMode::FullTrajectory,
            seed: 42,
            constants: PhysicalConstants::default(),
        }
    }
}

/// Advance `initial` for `config.num_steps` steps under `hamiltonian`,
/// optionally driven by `perturbation`.
///
/// The initial state is normalized before the first step; a zero-norm input
/// is already a step-0 instability.
pub fn evolve(
    initial: &DVector<C64>,
    hamiltonian: &Hamiltonian,
    perturbation: Option<&PerturbationTerm>,
    integrator: Integrator,
    config: &EvolutionConfig,
) -> Result<Trajectory> {
    if initial.len() != hamiltonian.dim() {
        return Err(SimError::InvalidConfig {
            reason: format!(
                "state dimension {} does not match Hamiltonian dimension {}",
                initial.len(),
                hamiltonian.dim()
            ),
        });
    }
    if !(config.dt.is_finite() && config.dt > 0.0) {
        return Err(SimError::InvalidConfig {
            reason: format!("time step must be finite and positive, got {:e}", config.dt),
        });
    }
    if config.renorm_interval == 0 {
        return Err(SimError::InvalidConfig {
            reason: "renormalization interval must be at least 1".into(),
        });
    }
    if integrator == Integrator::DirectExact && perturbation.is_some() {
        return Err(SimError::InvalidConfig {
            reason: "exact-exponential stepping assumes a time-independent Hamiltonian; \
                     use DirectEuler or Spectral with a perturbation"
                .into(),
        });
    }
    hamiltonian.assert_finite()?;
    hamiltonian.check_hermitian(HERMITICITY_TOL)?;

    let mut state = initial.clone();
    checked_renormalize(&mut state, 0)?;

    let mut recorder =
        TrajectoryRecorder::new(config.record_mode, state.len(), config.num_steps);
    if config.num_steps == 0 {
        return Ok(recorder.finish(state));
    }

    log::debug!(
        "evolve: {:?}, dim {}, {} steps, dt {:e}",
        integrator,
        state.len(),
        config.num_steps,
        config.dt
    );

    let mut rng = StdRng::seed_from_u64(config.seed);
    let final_state = match integrator {
        Integrator::Spectral => {
            let ctx = hamiltonian.continuum.as_ref().ok_or_else(|| SimError::InvalidConfig {
                reason: "spectral integrator requires a continuum Hamiltonian with grid context"
                    .into(),
            })?;
            spectral_run(state, ctx, perturbation, config, &mut rng, &mut recorder)?
        }
        Integrator::DirectEuler => euler_run(
            state,
            hamiltonian,
            perturbation,
            config,
            &mut rng,
            &mut recorder,
        )?,
        Integrator::DirectExact => exact_run(state, hamiltonian, config, &mut recorder)?,
    };
    Ok(recorder.finish(final_state))
}

/// U = exp(−i·H·dt/ħ) from the Hermitian eigendecomposition
/// U = W·diag(exp(−i·λ·dt/ħ))·W†.
pub fn matrix_exponential_unitary(matrix: &DMatrix<C64>, dt: f64, hbar: f64) -> DMatrix<C64> {
    let n = matrix.nrows();
    let eig = SymmetricEigen::new(matrix.clone());
    let phases = DVector::from_iterator(
        n,
        eig.eigenvalues
            .iter()
            .map(|&lambda| C64::from_polar(1.0, -lambda * dt / hbar)),
    );
    &eig.eigenvectors * DMatrix::from_diagonal(&phases) * eig.eigenvectors.adjoint()
}

/// Normalize in place, returning the norm found beforehand.
fn checked_renormalize(state: &mut DVector<C64>, step: usize) -> Result<f64> {
    let norm = state.norm();
    if !(norm.is_finite() && norm > NORM_FLOOR) {
        return Err(SimError::NumericalInstability {
            step,
            detail: format!("state norm {norm:e} at forced renormalization"),
        });
    }
    state.unscale_mut(norm);
    Ok(norm)
}

fn euler_run(
    mut state: DVector<C64>,
    hamiltonian: &Hamiltonian,
    perturbation: Option<&PerturbationTerm>,
    config: &EvolutionConfig,
    rng: &mut StdRng,
    recorder: &mut TrajectoryRecorder,
) -> Result<DVector<C64>> {
    let dim = state.len();
    let scale = C64::new(0.0, -config.dt / config.constants.hbar);
    for step in 0..config.num_steps {
        let t = step as f64 * config.dt;
        let mut hpsi = &hamiltonian.matrix * &state;
        if let Some(p) = perturbation {
            let drive = p.amplitude_at(t, rng);
            for i in 0..dim {
                if p.profile.covers(i) {
                    hpsi[i] += state[i] * drive;
                }
            }
        }
        // ψ ← ψ − (i·dt/ħ)·H(t)ψ, then the mandatory renormalization.
        state.axpy(scale, &hpsi, C64::new(1.0, 0.0));
        let norm = checked_renormalize(&mut state, step)?;
        recorder.record(&state, norm, None);
    }
    Ok(state)
}

fn exact_run(
    mut state: DVector<C64>,
    hamiltonian: &Hamiltonian,
    config: &EvolutionConfig,
    recorder: &mut TrajectoryRecorder,
) -> Result<DVector<C64>> {
    let u = matrix_exponential_unitary(&hamiltonian.matrix, config.dt, config.constants.hbar);
    for step in 0..config.num_steps {
        state = &u * &state;
        let norm = checked_renormalize(&mut state, step)?;
        recorder.record(&state, norm, None);
    }
    Ok(state)
}

fn spectral_run(
    mut state: DVector<C64>,
    ctx: &ContinuumContext,
    perturbation: Option<&PerturbationTerm>,
    config: &EvolutionConfig,
    rng: &mut StdRng,
    recorder: &mut TrajectoryRecorder,
) -> Result<DVector<C64>> {
    let n = ctx.grid.n;
    let dx = ctx.grid.dx;
    let hbar = config.constants.hbar;
    let dt = config.dt;

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);
    let ifft = planner.plan_fft_inverse(n);
    let scratch_len = fft
        .get_inplace_scratch_len()
        .max(ifft.get_inplace_scratch_len());
    let mut scratch = vec![C64::zero(); scratch_len];

    // exp(−i·T(k)·dt/2ħ) per momentum bin, FFT index wraparound included.
    let half_kinetic: Vec<C64> = (0..n)
        .map(|j| {
            let wrapped = if j <= n / 2 {
                j as f64
            } else {
                j as f64 - n as f64
            };
            let k = TAU * wrapped / (n as f64 * dx);
            let t_k = hbar * hbar * k * k / (2.0 * config.constants.mass);
            C64::from_polar(1.0, -t_k * dt / (2.0 * hbar))
        })
        .collect();
    let right_mask: Vec<bool> = (0..n).map(|i| ctx.grid.coordinate(i) > 0.0).collect();

    for step in 0..config.num_steps {
        let t = step as f64 * dt;
        let drive = perturbation.map(|p| p.amplitude_at(t, rng));

        half_kinetic_step(&mut state, fft.as_ref(), ifft.as_ref(), &half_kinetic, &mut scratch);
        for i in 0..n {
            let mut v = ctx.potential[i];
            if let (Some(d), Some(p)) = (drive, perturbation) {
                if p.profile.covers(i) {
                    v += d;
                }
            }
            state[i] *= C64::from_polar(1.0, -v * dt / hbar);
        }
        half_kinetic_step(&mut state, fft.as_ref(), ifft.as_ref(), &half_kinetic, &mut scratch);

        let pre_norm = state.norm();
        if !pre_norm.is_finite() {
            return Err(SimError::NumericalInstability {
                step,
                detail: format!("non-finite state norm {pre_norm} after split step"),
            });
        }
        let renorm_now = (step + 1) % config.renorm_interval == 0;
        if renorm_now {
            if pre_norm <= NORM_FLOOR {
                return Err(SimError::NumericalInstability {
                    step,
                    detail: format!("state norm {pre_norm:e} at forced renormalization"),
                });
            }
            state.unscale_mut(pre_norm);
        }

        let masked: f64 = state
            .iter()
            .zip(&right_mask)
            .filter(|(_, &m)| m)
            .map(|(a, _)| a.norm_sqr())
            .sum();
        let total = if renorm_now { 1.0 } else { pre_norm * pre_norm };
        recorder.record(&state, pre_norm, Some(masked / total));
    }
    Ok(state)
}

fn half_kinetic_step(
    state: &mut DVector<C64>,
    fft: &dyn Fft<f64>,
    ifft: &dyn Fft<f64>,
    phases: &[C64],
    scratch: &mut [C64],
) {
    fft.process_with_scratch(state.as_mut_slice(), scratch);
    for (a, &phase) in state.as_mut_slice().iter_mut().zip(phases) {
        *a *= phase;
    }
    ifft.process_with_scratch(state.as_mut_slice(), scratch);
    // rustfft leaves the inverse transform unscaled.
    state.unscale_mut(phases.len() as f64);
}
