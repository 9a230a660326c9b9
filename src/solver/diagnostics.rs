//! Domain integrals and conservation tracking.
//!
//! Integrals use the collocation quadrature Σ q w J over every node. The
//! total energy is
//!
//! ```text
//! E_tot = ∫ ½ h |v|² + h g y + E(h, hs, hqw)
//! ```
//!
//! and its rate of change follows from the chain rule:
//!
//! ```text
//! dE_tot/dt = ∫ h v·v̇ + (½|v|² + g y + ∂E/∂h) ḣ + T ḣs + μ ḣqw
//! ```
//!
//! # Example
//!
//! ```ignore
//! let mut tracker = DiagnosticsTracker::new(solver.diagnostics()?);
//! // ... simulation loop ...
//! tracker.update(solver.time(), solver.diagnostics()?);
//! tracker.log_summary();
//! ```

use log::info;

use super::rhs::Discretization;
use super::state::MoistState;
use crate::flux::WaveSpeed;
use crate::thermo::{EquationOfState, NodalThermo};

impl Discretization {
    /// ∫ q dA by collocation quadrature.
    pub fn integrate(&self, field: &[f64]) -> f64 {
        let weights = &self.reference().weights;
        let jacobian = &self.geometry().jacobian;
        let nn = weights.len();
        field
            .iter()
            .zip(jacobian)
            .enumerate()
            .map(|(p, (&q, &j))| q * weights[p % nn] * j)
            .sum()
    }

    /// Rate of change of the total energy implied by `tendency`.
    ///
    /// `thermo` must be evaluated on `state`.
    pub fn energy_tendency(
        &self,
        state: &MoistState,
        thermo: &NodalThermo,
        tendency: &MoistState,
    ) -> f64 {
        let g = self.config().gravity;
        let y = &self.mesh().y;
        let density: Vec<f64> = (0..state.len())
            .map(|p| {
                let (u, w, h) = (state.u[p], state.w[p], state.h[p]);
                let kinetic = 0.5 * (u * u + w * w);
                h * (u * tendency.u[p] + w * tendency.w[p])
                    + (kinetic + g * y[p] + thermo.density_potential[p]) * tendency.h[p]
                    + thermo.temperature[p] * tendency.hs[p]
                    + thermo.chemical_potential[p] * tendency.hqw[p]
            })
            .collect();
        self.integrate(&density)
    }
}

/// Integral invariants and bounds of one state.
#[derive(Clone, Debug, PartialEq)]
pub struct MoistDiagnostics {
    /// ∫ h
    pub total_mass: f64,
    /// ∫ hs
    pub total_entropy: f64,
    /// ∫ hqw
    pub total_water: f64,
    /// ∫ ½ h |v|²
    pub kinetic_energy: f64,
    /// ∫ h g y
    pub potential_energy: f64,
    /// ∫ E
    pub internal_energy: f64,
    /// Largest wave-speed estimate
    pub max_wave_speed: f64,
    /// Largest |v|
    pub max_velocity: f64,
    /// Potential temperature range, if the equation of state defines one
    pub potential_temperature: Option<(f64, f64)>,
}

impl MoistDiagnostics {
    /// Compute all diagnostics; `thermo` must be evaluated on `state`.
    pub fn compute<E, W>(
        disc: &Discretization,
        state: &MoistState,
        thermo: &NodalThermo,
        eos: &E,
        wave_speed: &W,
    ) -> Self
    where
        E: EquationOfState + ?Sized,
        W: WaveSpeed + ?Sized,
    {
        let g = disc.config().gravity;
        let y = &disc.mesh().y;

        let mut kinetic = vec![0.0; state.len()];
        let mut potential = vec![0.0; state.len()];
        let mut max_velocity = 0.0_f64;
        for p in 0..state.len() {
            let speed_sq = state.u[p] * state.u[p] + state.w[p] * state.w[p];
            kinetic[p] = 0.5 * state.h[p] * speed_sq;
            potential[p] = state.h[p] * g * y[p];
            max_velocity = max_velocity.max(speed_sq.sqrt());
        }

        Self {
            total_mass: disc.integrate(&state.h),
            total_entropy: disc.integrate(&state.hs),
            total_water: disc.integrate(&state.hqw),
            kinetic_energy: disc.integrate(&kinetic),
            potential_energy: disc.integrate(&potential),
            internal_energy: disc.integrate(&thermo.internal_energy),
            max_wave_speed: disc.max_wave_speed(state, thermo, wave_speed),
            max_velocity,
            potential_temperature: potential_temperature_range(eos, thermo),
        }
    }

    pub fn total_energy(&self) -> f64 {
        self.kinetic_energy + self.potential_energy + self.internal_energy
    }

    /// Single-line summary.
    pub fn summary_line(&self) -> String {
        let theta = match self.potential_temperature {
            Some((lo, hi)) => format!(" θ=[{lo:.2},{hi:.2}]"),
            None => String::new(),
        };
        format!(
            "M={:.6e} S={:.6e} Q={:.6e} E={:.6e} (K={:.3e}) |v|_max={:.3} c_max={:.2}{}",
            self.total_mass,
            self.total_entropy,
            self.total_water,
            self.total_energy(),
            self.kinetic_energy,
            self.max_velocity,
            self.max_wave_speed,
            theta
        )
    }
}

/// Smallest and largest potential temperature, if `eos` defines it.
pub fn potential_temperature_range<E: EquationOfState + ?Sized>(
    eos: &E,
    thermo: &NodalThermo,
) -> Option<(f64, f64)> {
    let mut range: Option<(f64, f64)> = None;
    for p in 0..thermo.len() {
        let theta = eos.potential_temperature(&thermo.get(p))?;
        range = Some(match range {
            Some((lo, hi)) => (lo.min(theta), hi.max(theta)),
            None => (theta, theta),
        });
    }
    range
}

/// Relative change of `current` against `initial`; absolute when `initial` is zero.
fn relative_change(initial: f64, current: f64) -> f64 {
    if initial.abs() > 1e-14 {
        (current - initial) / initial.abs()
    } else {
        current - initial
    }
}

/// Track diagnostics over a run for monitoring conservation.
#[derive(Clone, Debug)]
pub struct DiagnosticsTracker {
    initial: MoistDiagnostics,
    current: MoistDiagnostics,
    current_time: f64,
    n_updates: usize,
    max_velocity_seen: f64,
}

impl DiagnosticsTracker {
    pub fn new(initial: MoistDiagnostics) -> Self {
        Self {
            max_velocity_seen: initial.max_velocity,
            current: initial.clone(),
            initial,
            current_time: 0.0,
            n_updates: 0,
        }
    }

    pub fn update(&mut self, time: f64, diag: MoistDiagnostics) {
        self.current_time = time;
        self.n_updates += 1;
        self.max_velocity_seen = self.max_velocity_seen.max(diag.max_velocity);
        self.current = diag;
    }

    pub fn mass_error(&self) -> f64 {
        relative_change(self.initial.total_mass, self.current.total_mass)
    }

    pub fn entropy_error(&self) -> f64 {
        relative_change(self.initial.total_entropy, self.current.total_entropy)
    }

    pub fn water_error(&self) -> f64 {
        relative_change(self.initial.total_water, self.current.total_water)
    }

    /// Relative energy change (negative under dissipation).
    pub fn energy_change(&self) -> f64 {
        relative_change(self.initial.total_energy(), self.current.total_energy())
    }

    pub fn current(&self) -> &MoistDiagnostics {
        &self.current
    }

    pub fn initial(&self) -> &MoistDiagnostics {
        &self.initial
    }

    pub fn max_velocity_seen(&self) -> f64 {
        self.max_velocity_seen
    }

    /// No NaN or infinity in the tracked invariants.
    pub fn is_finite(&self) -> bool {
        let d = &self.current;
        [
            d.total_mass,
            d.total_entropy,
            d.total_water,
            d.total_energy(),
            d.max_velocity,
        ]
        .iter()
        .all(|v| v.is_finite())
    }

    /// Log drift of every invariant at `info` level.
    pub fn log_summary(&self) {
        info!(
            "diagnostics at t = {:.4e} ({} updates): {}",
            self.current_time,
            self.n_updates,
            self.current.summary_line()
        );
        info!(
            "drift: mass {:.2e}, entropy {:.2e}, water {:.2e}, energy {:.2e}; max |v| seen {:.3}",
            self.mass_error(),
            self.entropy_error(),
            self.water_error(),
            self.energy_change(),
            self.max_velocity_seen
        );
    }
}
