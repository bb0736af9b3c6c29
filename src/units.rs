//! Physical constants and unit bookkeeping.
//!
//! All values from CODATA 2018 / NIST. Two unit systems coexist in the
//! engine: SI (ħ in J·s, energies in J) for the continuum proton model, and
//! eV·s (energies in eV) for the lattice charge-transfer model. Nothing in
//! the engine reads a constant ambiently; builders and propagators take an
//! explicit [`PhysicalConstants`] bundle so the two systems never collide.

/// Reduced Planck constant (J·s)
pub const HBAR_JS: f64 = 1.054_571_817e-34;

/// Reduced Planck constant (eV·s)
pub const HBAR_EVS: f64 = 6.582_119_569e-16;

/// Proton mass (kg)
pub const PROTON_MASS: f64 = 1.672_621_923_69e-27;

/// One electronvolt (J)
pub const EV: f64 = 1.602_176_634e-19;

/// Convert energy in eV to J
pub fn ev_to_joules(e_ev: f64) -> f64 {
    e_ev * EV
}

/// Convert energy in J to eV
pub fn joules_to_ev(e_joules: f64) -> f64 {
    e_joules / EV
}

/// Immutable constants bundle handed to Hamiltonian builders and propagators.
///
/// The same bundle used to build an operator must be passed to the propagator
/// that evolves under it; `hbar` fixes the energy·time unit system for both.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalConstants {
    /// Reduced Planck constant in the unit system of the model it serves.
    pub hbar: f64,
    /// Particle mass (kg). Only continuum kinetic terms read it.
    pub mass: f64,
}

impl PhysicalConstants {
    /// SI bundle for the continuum proton model: ħ in J·s, proton mass in kg.
    pub fn si_proton() -> Self {
        PhysicalConstants {
            hbar: HBAR_JS,
            mass: PROTON_MASS,
        }
    }

    /// eV·s bundle for the lattice charge-transfer model. The mass field is
    /// carried for completeness; lattice Hamiltonians never read it.
    pub fn ev_lattice() -> Self {
        PhysicalConstants {
            hbar: HBAR_EVS,
            mass: PROTON_MASS,
        }
    }
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self::si_proton()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hbar_unit_systems_agree() {
        // HBAR_JS / HBAR_EVS must equal the J-per-eV conversion factor.
        let ratio = HBAR_JS / HBAR_EVS;
        assert!(
            (ratio - EV).abs() / EV < 1e-9,
            "ħ(J·s)/ħ(eV·s) = {ratio:e} does not match 1 eV = {EV:e} J"
        );
    }

    #[test]
    fn energy_conversion_round_trips() {
        let e = 0.065;
        let back = joules_to_ev(ev_to_joules(e));
        assert!((back - e).abs() < 1e-15, "eV→J→eV drifted: {back}");
    }

    #[test]
    fn bundles_pick_matching_hbar() {
        assert_eq!(PhysicalConstants::si_proton().hbar, HBAR_JS);
        assert_eq!(PhysicalConstants::ev_lattice().hbar, HBAR_EVS);
        assert_eq!(PhysicalConstants::default(), PhysicalConstants::si_proton());
    }
}
