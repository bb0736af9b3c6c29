//! Time-dependent diagonal drive applied during propagation.
//!
//! The perturbation adds amplitude·cos(2π·f(t)·t) to the on-site energies it
//! covers, with f(t) = f0 + k·t for a linear chirp. An optional Gaussian
//! jitter, drawn once per step from the propagator's seeded stream, models
//! stochastic resonance by shaking the amplitude. The amplitude is taken in
//! the same energy unit as the Hamiltonian it perturbs, with any external
//! gain factor already folded in via [`PerturbationTerm::with_gain`].

use rand::Rng;
use rand_distr::{Distribution, Normal};
use std::f64::consts::TAU;

/// Which sites of the state vector a perturbation drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteProfile {
    /// Every site.
    All,
    /// Half-open site range [start, end); targets one block of a composite
    /// Hamiltonian.
    Range { start: usize, end: usize },
}

impl SiteProfile {
    pub fn covers(&self, site: usize) -> bool {
        match *self {
            SiteProfile::All => true,
            SiteProfile::Range { start, end } => site >= start && site < end,
        }
    }
}

/// A diagonal cosine drive with optional chirp and amplitude jitter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerturbationTerm {
    /// Drive amplitude, Hamiltonian energy units, gain included.
    pub amplitude: f64,
    /// Base frequency f0 (Hz).
    pub frequency: f64,
    /// Linear chirp rate k (Hz/s); instantaneous frequency is f0 + k·t.
    pub chirp_rate: f64,
    /// Standard deviation of the per-step Gaussian amplitude jitter;
    /// 0 disables it.
    pub noise_amplitude: f64,
    pub profile: SiteProfile,
}

impl PerturbationTerm {
    /// Plain cosine drive over every site, no chirp, no jitter.
    pub fn sinusoidal(amplitude: f64, frequency: f64) -> Self {
        PerturbationTerm {
            amplitude,
            frequency,
            chirp_rate: 0.0,
            noise_amplitude: 0.0,
            profile: SiteProfile::All,
        }
    }

    pub fn with_chirp(mut self, chirp_rate: f64) -> Self {
        self.chirp_rate = chirp_rate;
        self
    }

    /// Negative values are treated as no jitter.
    pub fn with_noise(mut self, noise_amplitude: f64) -> Self {
        self.noise_amplitude = noise_amplitude.max(0.0);
        self
    }

    pub fn with_profile(mut self, profile: SiteProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Multiply the amplitude by an externally supplied gain factor.
    pub fn with_gain(mut self, gain: f64) -> Self {
        self.amplitude *= gain;
        self
    }

    /// Diagonal drive value at time `t` for one step. Jitter is drawn once
    /// per call, so propagators must call this exactly once per step.
    pub fn amplitude_at<R: Rng>(&self, t: f64, rng: &mut R) -> f64 {
        let f = self.frequency + self.chirp_rate * t;
        let mut amplitude = self.amplitude;
        if self.noise_amplitude > 0.0 {
            // Normal::new only fails for a negative std-dev, excluded above.
            if let Ok(jitter) = Normal::new(0.0, self.noise_amplitude) {
                amplitude += jitter.sample(rng);
            }
        }
        amplitude * (TAU * f * t).cos()
    }
}
