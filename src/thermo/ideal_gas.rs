//! Ideal-gas closures.

use super::{EquationOfState, Thermodynamics};
use crate::error::ThermoError;

/// Single-species ideal gas with constant heat capacities.
///
/// Specific entropy s = cv ln(p / h^γ), so p = exp(s/cv) h^γ.
/// The water field is carried passively: μ = 0.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DryIdealGas {
    pub cp: f64,
    pub cv: f64,
    /// Reference pressure for potential temperature
    pub p0: f64,
}

impl Default for DryIdealGas {
    fn default() -> Self {
        Self {
            cp: 1_005.0,
            cv: 718.0,
            p0: 100_000.0,
        }
    }
}

impl DryIdealGas {
    #[inline]
    pub fn gas_constant(&self) -> f64 {
        self.cp - self.cv
    }

    #[inline]
    pub fn gamma(&self) -> f64 {
        self.cp / self.cv
    }

    /// Specific entropy of a state with the given density and pressure.
    pub fn entropy(&self, density: f64, pressure: f64) -> f64 {
        self.cv * (pressure.ln() - self.gamma() * density.ln())
    }

    /// Specific entropy of a state with the given density and temperature.
    pub fn entropy_from_temperature(&self, density: f64, temperature: f64) -> f64 {
        self.entropy(density, density * self.gas_constant() * temperature)
    }
}

impl EquationOfState for DryIdealGas {
    fn evaluate(&self, h: f64, hs: f64, hqw: f64) -> Result<Thermodynamics, ThermoError> {
        if !(h > 0.0) || !h.is_finite() {
            return Err(ThermoError::NonPositiveDensity(h));
        }
        let gamma = self.gamma();
        let s = hs / h;

        let pressure = (s / self.cv).exp() * h.powf(gamma);
        let temperature = pressure / (self.gas_constant() * h);
        let specific_ie = pressure / (h * (gamma - 1.0));
        let enthalpy = specific_ie + pressure / h;
        let chemical_potential = 0.0;

        Ok(Thermodynamics {
            internal_energy: h * specific_ie,
            pressure,
            temperature,
            chemical_potential,
            density_potential: enthalpy - temperature * s - chemical_potential * hqw / h,
            sound_speed: (gamma * pressure / h).sqrt(),
        })
    }

    fn potential_temperature(&self, thermo: &Thermodynamics) -> Option<f64> {
        let kappa = self.gas_constant() / self.cp;
        Some(thermo.temperature * (self.p0 / thermo.pressure).powf(kappa))
    }

    fn name(&self) -> &'static str {
        "dry-ideal-gas"
    }
}

/// Mixture of dry air and water vapour, both ideal gases.
///
/// With partial densities ρd = h(1 - q) and ρv = h q, the specific entropy is
///
/// s = cv ln(T/T0) − qd Rd ln(ρd/ρ0) − qv Rv ln(ρv/ρ0),  cv = qd cvd + qv cvv
///
/// and E = h cv T. The chemical potential is the difference of the species
/// Gibbs functions g_i = cp_i T − T s_i.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoistIdealGas {
    pub cvd: f64,
    pub rd: f64,
    pub cvv: f64,
    pub rv: f64,
    /// Reference temperature of the entropy origin
    pub t0: f64,
    /// Reference density of the entropy origin
    pub rho0: f64,
    /// Reference pressure for potential temperature
    pub p0: f64,
}

impl Default for MoistIdealGas {
    fn default() -> Self {
        Self {
            cvd: 718.0,
            rd: 287.0,
            cvv: 1_410.8,
            rv: 461.5,
            t0: 273.15,
            rho0: 1.0,
            p0: 100_000.0,
        }
    }
}

impl MoistIdealGas {
    #[inline]
    pub fn cpd(&self) -> f64 {
        self.cvd + self.rd
    }

    #[inline]
    pub fn cpv(&self) -> f64 {
        self.cvv + self.rv
    }

    /// Mixture gas constant for water fraction `qw`.
    #[inline]
    pub fn gas_constant(&self, qw: f64) -> f64 {
        (1.0 - qw) * self.rd + qw * self.rv
    }

    /// Specific entropy of a state with density, water fraction and temperature.
    pub fn entropy(&self, density: f64, qw: f64, temperature: f64) -> f64 {
        let qd = 1.0 - qw;
        let cv = qd * self.cvd + qw * self.cvv;
        cv * (temperature / self.t0).ln()
            - qd * self.rd * (density * qd / self.rho0).ln()
            - qw * self.rv * (density * qw / self.rho0).ln()
    }

    /// Specific entropy of a state with density, water fraction and pressure.
    pub fn entropy_from_pressure(&self, density: f64, qw: f64, pressure: f64) -> f64 {
        let temperature = pressure / (density * self.gas_constant(qw));
        self.entropy(density, qw, temperature)
    }
}

impl EquationOfState for MoistIdealGas {
    fn evaluate(&self, h: f64, hs: f64, hqw: f64) -> Result<Thermodynamics, ThermoError> {
        if !(h > 0.0) || !h.is_finite() {
            return Err(ThermoError::NonPositiveDensity(h));
        }
        let qv = hqw / h;
        if !(qv > 0.0 && qv < 1.0) {
            return Err(ThermoError::WaterFractionOutOfRange {
                qw: qv,
                min: 0.0,
                max: 1.0,
            });
        }
        let qd = 1.0 - qv;
        let s = hs / h;

        let log_rho_d = (h * qd / self.rho0).ln();
        let log_rho_v = (h * qv / self.rho0).ln();

        let cv = qd * self.cvd + qv * self.cvv;
        let cp = qd * self.cpd() + qv * self.cpv();
        let r = self.gas_constant(qv);

        let log_t = (s + qd * self.rd * log_rho_d + qv * self.rv * log_rho_v) / cv;
        let temperature = self.t0 * log_t.exp();
        let pressure = h * r * temperature;

        // species entropies s_i = cv_i ln(T/T0) − R_i ln(ρ_i/ρ0)
        let sd = self.cvd * log_t - self.rd * log_rho_d;
        let sv = self.cvv * log_t - self.rv * log_rho_v;
        let gd = temperature * (self.cpd() - sd);
        let gv = temperature * (self.cpv() - sv);
        let chemical_potential = gv - gd;

        let enthalpy = cp * temperature;

        Ok(Thermodynamics {
            internal_energy: h * cv * temperature,
            pressure,
            temperature,
            chemical_potential,
            density_potential: enthalpy - temperature * s - chemical_potential * qv,
            sound_speed: (cp / cv * pressure / h).sqrt(),
        })
    }

    fn potential_temperature(&self, thermo: &Thermodynamics) -> Option<f64> {
        let kappa = self.rd / self.cpd();
        Some(thermo.temperature * (self.p0 / thermo.pressure).powf(kappa))
    }

    fn name(&self) -> &'static str {
        "moist-ideal-gas"
    }
}
