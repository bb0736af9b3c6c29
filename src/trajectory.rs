//! Trajectory storage, streaming observables and spectral accumulation.
//!
//! A full trajectory of S steps over an N-dimensional state holds S·N
//! complex values; at 1e5 steps that dominates memory. `RecordMode` makes
//! the tradeoff explicit: `FullTrajectory` keeps every snapshot (the
//! default), `Observables` keeps only the running reducers (per-site mean
//! amplitude, per-step norm audit and right-well series), which cost
//! O(N + S) scalars instead of O(S·N).

use nalgebra::DVector;
use rustfft::FftPlanner;

use crate::C64;

/// What a propagation run retains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordMode {
    /// Keep every post-step state snapshot.
    #[default]
    FullTrajectory,
    /// Keep only streaming observables; `states` stays empty.
    Observables,
}

/// The product of one propagation run. Read-only once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    /// Post-step snapshots, one per step; empty in `Observables` mode.
    pub states: Vec<DVector<C64>>,
    /// State after the final step (the initial state when `steps` is 0).
    pub final_state: DVector<C64>,
    /// State norm measured each step before any forced renormalization.
    pub norm_series: Vec<f64>,
    /// Probability mass at positive coordinates, per step; empty for
    /// lattice runs where no spatial grid exists.
    pub right_well_series: Vec<f64>,
    /// Time-averaged complex amplitude per site; zeros when `steps` is 0.
    pub mean_amplitude: DVector<C64>,
    pub steps: usize,
    pub record_mode: RecordMode,
}

impl Trajectory {
    pub fn is_empty(&self) -> bool {
        self.steps == 0
    }

    /// Largest |‖ψ‖ − 1| seen across the run, before renormalization.
    pub fn max_norm_drift(&self) -> f64 {
        self.norm_series
            .iter()
            .map(|n| (n - 1.0).abs())
            .fold(0.0, f64::max)
    }

    /// Mean of the right-well series, when one was recorded.
    pub fn mean_right_well(&self) -> Option<f64> {
        if self.right_well_series.is_empty() {
            return None;
        }
        Some(self.right_well_series.iter().sum::<f64>() / self.right_well_series.len() as f64)
    }

    /// Power spectrum of the right-well series. The series is retained in
    /// both record modes, so this works after snapshot streaming too.
    pub fn right_well_spectrum(&self) -> Vec<f64> {
        power_spectrum(&self.right_well_series)
    }
}

/// Accumulates per-step records during propagation and builds the
/// [`Trajectory`] at the end.
pub struct TrajectoryRecorder {
    mode: RecordMode,
    states: Vec<DVector<C64>>,
    norms: Vec<f64>,
    right_well: Vec<f64>,
    amplitude_sum: DVector<C64>,
    steps: usize,
}

impl TrajectoryRecorder {
    pub fn new(mode: RecordMode, dim: usize, expected_steps: usize) -> Self {
        let snapshot_capacity = match mode {
            RecordMode::FullTrajectory => expected_steps,
            RecordMode::Observables => 0,
        };
        TrajectoryRecorder {
            mode,
            states: Vec::with_capacity(snapshot_capacity),
            norms: Vec::with_capacity(expected_steps),
            right_well: Vec::new(),
            amplitude_sum: DVector::zeros(dim),
            steps: 0,
        }
    }

    /// Record one completed step. `pre_renorm_norm` is the norm before the
    /// step's renormalization (if any); `state` is the state after it.
    pub fn record(&mut self, state: &DVector<C64>, pre_renorm_norm: f64, right_well: Option<f64>) {
        self.norms.push(pre_renorm_norm);
        if let Some(p) = right_well {
            self.right_well.push(p);
        }
        self.amplitude_sum += state;
        if self.mode == RecordMode::FullTrajectory {
            self.states.push(state.clone());
        }
        self.steps += 1;
    }

    pub fn finish(self, final_state: DVector<C64>) -> Trajectory {
        let mean_amplitude = if self.steps > 0 {
            self.amplitude_sum.unscale(self.steps as f64)
        } else {
            self.amplitude_sum
        };
        Trajectory {
            states: self.states,
            final_state,
            norm_series: self.norms,
            right_well_series: self.right_well,
            mean_amplitude,
            steps: self.steps,
            record_mode: self.mode,
        }
    }
}

/// Power spectrum |X_k|²/n of a real-valued step series, n bins.
///
/// Bin k corresponds to frequency k/(n·dt) for a series sampled every dt.
pub fn power_spectrum(series: &[f64]) -> Vec<f64> {
    let n = series.len();
    if n == 0 {
        return Vec::new();
    }
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);
    let mut buf: Vec<C64> = series.iter().map(|&x| C64::new(x, 0.0)).collect();
    fft.process(&mut buf);
    buf.iter().map(|c| c.norm_sqr() / n as f64).collect()
}
