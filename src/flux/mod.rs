//! Numerical interface fluxes.
//!
//! Provides the building blocks of the interface treatment:
//! - central averages of trace fluxes
//! - the Bernoulli flux with kinetic-energy-dissipating upwinding, scaled by
//!   a pluggable wave-speed bound ([`WaveSpeed`])
//! - upwinding of specific tracer values by the sign of the mass flux
//!
//! [`InterfaceFluxes`] evaluates all of them once per residual.

mod interface;
mod wave_speed;

pub use interface::{
    InterfaceFluxes, InterfaceSet, bernoulli_dissipation, central_flux,
    dissipative_bernoulli_flux, upwind_tracer,
};
pub use wave_speed::{AcousticWaveSpeed, FixedWaveSpeed, WaveSpeed, WaveSpeedModel};
