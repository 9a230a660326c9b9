//! Equation-of-state adapter.
//!
//! The residual only needs, per node, the internal energy density E and its
//! partial derivatives with respect to the conserved variables:
//!
//! - ∂E/∂hs = T (temperature)
//! - ∂E/∂hqw = μ (chemical potential of water relative to dry air)
//! - ∂E/∂h = enthalpy − T s − μ q
//!
//! plus pressure and a sound speed for the wave-speed bound. Any closure
//! implementing [`EquationOfState`] can be plugged in; phase-equilibrium
//! solvers live outside this crate.

mod ideal_gas;

pub use ideal_gas::{DryIdealGas, MoistIdealGas};

use crate::boundary::EdgeBuffers;
use crate::error::{NodeLocation, Result, SolverError, ThermoError};
use crate::solver::{MoistState, Tracer};

/// Thermodynamic quantities at one node.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Thermodynamics {
    /// Internal energy per unit volume E
    pub internal_energy: f64,
    pub pressure: f64,
    /// ∂E/∂hs
    pub temperature: f64,
    /// ∂E/∂hqw
    pub chemical_potential: f64,
    /// ∂E/∂h
    pub density_potential: f64,
    pub sound_speed: f64,
}

impl Thermodynamics {
    /// Potential conjugate to a tracer.
    #[inline]
    pub fn potential(&self, tracer: Tracer) -> f64 {
        match tracer {
            Tracer::Entropy => self.temperature,
            Tracer::Water => self.chemical_potential,
        }
    }

    /// Every field finite, else the name of the first offending quantity.
    pub fn check_finite(self) -> std::result::Result<Self, ThermoError> {
        let quantities = [
            ("internal energy", self.internal_energy),
            ("pressure", self.pressure),
            ("temperature", self.temperature),
            ("chemical potential", self.chemical_potential),
            ("density potential", self.density_potential),
            ("sound speed", self.sound_speed),
        ];
        for (quantity, value) in quantities {
            if !value.is_finite() {
                return Err(ThermoError::NonFinite { quantity });
            }
        }
        Ok(self)
    }
}

/// Pure, node-local thermodynamic closure.
pub trait EquationOfState: Send + Sync {
    /// Evaluate the closure at one node from its conserved variables.
    fn evaluate(
        &self,
        h: f64,
        hs: f64,
        hqw: f64,
    ) -> std::result::Result<Thermodynamics, ThermoError>;

    /// Potential temperature, if the closure defines a reference pressure.
    fn potential_temperature(&self, _thermo: &Thermodynamics) -> Option<f64> {
        None
    }

    /// Name for logging.
    fn name(&self) -> &'static str {
        "equation-of-state"
    }
}

/// Thermodynamic fields evaluated over a whole nodal array.
#[derive(Clone, Debug, Default)]
pub struct NodalThermo {
    pub internal_energy: Vec<f64>,
    pub pressure: Vec<f64>,
    pub temperature: Vec<f64>,
    pub chemical_potential: Vec<f64>,
    pub density_potential: Vec<f64>,
    pub sound_speed: Vec<f64>,
}

impl NodalThermo {
    pub fn new(len: usize) -> Self {
        Self {
            internal_energy: vec![0.0; len],
            pressure: vec![0.0; len],
            temperature: vec![0.0; len],
            chemical_potential: vec![0.0; len],
            density_potential: vec![0.0; len],
            sound_speed: vec![0.0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.pressure.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pressure.is_empty()
    }

    /// Evaluate `eos` at every node of `state`.
    ///
    /// Stops at the first infeasible node and reports it with `location`.
    pub fn evaluate<E: EquationOfState + ?Sized>(
        &mut self,
        eos: &E,
        state: &MoistState,
        location: NodeLocation,
    ) -> Result<()> {
        if self.len() != state.len() {
            *self = Self::new(state.len());
        }

        for p in 0..state.len() {
            let t = eos
                .evaluate(state.h[p], state.hs[p], state.hqw[p])
                .and_then(Thermodynamics::check_finite)
                .map_err(|reason| SolverError::ThermodynamicInfeasibility {
                    location,
                    node: p,
                    reason,
                })?;
            self.set(p, t);
        }
        Ok(())
    }

    /// Fresh cache evaluated over `state`.
    pub fn from_state<E: EquationOfState + ?Sized>(
        eos: &E,
        state: &MoistState,
        location: NodeLocation,
    ) -> Result<Self> {
        let mut thermo = Self::new(state.len());
        thermo.evaluate(eos, state, location)?;
        Ok(thermo)
    }

    #[inline]
    pub fn get(&self, p: usize) -> Thermodynamics {
        Thermodynamics {
            internal_energy: self.internal_energy[p],
            pressure: self.pressure[p],
            temperature: self.temperature[p],
            chemical_potential: self.chemical_potential[p],
            density_potential: self.density_potential[p],
            sound_speed: self.sound_speed[p],
        }
    }

    #[inline]
    fn set(&mut self, p: usize, t: Thermodynamics) {
        self.internal_energy[p] = t.internal_energy;
        self.pressure[p] = t.pressure;
        self.temperature[p] = t.temperature;
        self.chemical_potential[p] = t.chemical_potential;
        self.density_potential[p] = t.density_potential;
        self.sound_speed[p] = t.sound_speed;
    }

    /// Nodal potential conjugate to a tracer.
    pub fn potential(&self, tracer: Tracer) -> &[f64] {
        match tracer {
            Tracer::Entropy => &self.temperature,
            Tracer::Water => &self.chemical_potential,
        }
    }
}

/// Thermodynamics of the four interface trace buffers.
#[derive(Clone, Debug, Default)]
pub struct EdgeThermo {
    pub up: NodalThermo,
    pub down: NodalThermo,
    pub left: NodalThermo,
    pub right: NodalThermo,
}

impl EdgeThermo {
    /// Evaluate `eos` on every buffer node.
    pub fn evaluate<E: EquationOfState + ?Sized>(
        &mut self,
        eos: &E,
        buffers: &EdgeBuffers,
    ) -> Result<()> {
        self.up.evaluate(eos, &buffers.up, NodeLocation::Up)?;
        self.down.evaluate(eos, &buffers.down, NodeLocation::Down)?;
        self.left.evaluate(eos, &buffers.left, NodeLocation::Left)?;
        self.right.evaluate(eos, &buffers.right, NodeLocation::Right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_first_infeasible_node() {
        let eos = DryIdealGas::default();
        let mut state = MoistState::zeros(4);
        state.h = vec![1.0, 1.0, -0.5, 0.0];

        let err = NodalThermo::from_state(&eos, &state, NodeLocation::Left).unwrap_err();
        match err {
            SolverError::ThermodynamicInfeasibility {
                location,
                node,
                reason,
            } => {
                assert_eq!(location, NodeLocation::Left);
                assert_eq!(node, 2);
                assert_eq!(reason, ThermoError::NonPositiveDensity(-0.5));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_potential_selects_tracer_field() {
        let eos = MoistIdealGas::default();
        let mut state = MoistState::zeros(2);
        state.h = vec![1.0, 1.1];
        state.hqw = vec![0.01, 0.011];
        state.hs = vec![
            eos.entropy(1.0, 0.01, 290.0),
            1.1 * eos.entropy(1.1, 0.01, 290.0),
        ];

        let thermo = NodalThermo::from_state(&eos, &state, NodeLocation::Interior).unwrap();
        assert_eq!(thermo.potential(Tracer::Entropy), thermo.temperature.as_slice());
        assert_eq!(thermo.potential(Tracer::Water), thermo.chemical_potential.as_slice());
        assert!((thermo.temperature[1] - 290.0).abs() < 1e-9);
    }
}
