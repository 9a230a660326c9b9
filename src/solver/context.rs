//! Solver context owning the discretization, state and clock.
//!
//! # Example
//!
//! ```
//! use moist_euler_dg::mesh::RectangularDomain;
//! use moist_euler_dg::solver::{MoistEulerSolver, PhysicsVariant, SolverConfig};
//! use moist_euler_dg::thermo::DryIdealGas;
//!
//! let config = SolverConfig::new(2, 4, 4).with_physics(PhysicsVariant::SingleSpecies);
//! let domain = RectangularDomain::new((0.0, 4000.0), (0.0, 4000.0));
//! let eos = DryIdealGas::default();
//! let s = eos.entropy_from_temperature(1.2, 300.0);
//!
//! let mut solver = MoistEulerSolver::new(config, &domain, eos).unwrap();
//! let n = solver.layout().n_total();
//! solver
//!     .set_initial_condition(vec![0.0; n], vec![0.0; n], vec![1.2; n], vec![s; n], vec![0.0; n])
//!     .unwrap();
//!
//! let dt = solver.time_step(None).unwrap();
//! assert!(dt > 0.0);
//! assert_eq!(solver.time(), dt);
//! ```

use std::time::Instant;

use log::{debug, info, warn};

use super::checkpoint::Checkpoint;
use super::config::SolverConfig;
use super::diagnostics::MoistDiagnostics;
use super::forcing::{Forcing, NoForcing};
use super::rhs::{Discretization, Workspace};
use super::state::MoistState;
use crate::error::{NodeLocation, Result};
use crate::mesh::{DomainMap, NodeLayout, StructuredMesh};
use crate::operators::{CurvilinearGeometry, ReferenceElement};
use crate::thermo::{EquationOfState, NodalThermo};
use crate::time::{
    IntegratorInfo, SSPRK3, TimeIntegrator, integrator_for_order, stable_dt, validate_dt,
};

/// Statistics of a [`MoistEulerSolver::run_until`] call.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    /// Clock at the end of the run
    pub final_time: f64,
    /// Steps taken by this call
    pub n_steps: usize,
    /// Smallest step used
    pub dt_min: f64,
    /// Largest step used
    pub dt_max: f64,
    /// Wall-clock duration in seconds
    pub wall_time: f64,
}

/// Moist compressible Euler solver.
///
/// The state is owned exclusively by the solver; the clock advances only
/// after all stages of a step succeed.
pub struct MoistEulerSolver<E: EquationOfState> {
    discretization: Discretization,
    eos: E,
    forcing: Box<dyn Forcing>,
    integrator: SSPRK3,
    workspace: Workspace,
    state: MoistState,
    time: f64,
    step: usize,
}

impl<E: EquationOfState> MoistEulerSolver<E> {
    /// Build the discretization for `config` on `map`.
    ///
    /// The state starts at zero and must be set before stepping.
    pub fn new<M: DomainMap + ?Sized>(config: SolverConfig, map: &M, eos: E) -> Result<Self> {
        let integrator = integrator_for_order(config.rk_order)?;
        let discretization = Discretization::new(config, map)?;
        let layout = discretization.layout();

        info!(
            "moist Euler solver: {} x {} elements, order {}, {} nodes, {} ({} stages{}) with {}",
            layout.nx,
            layout.ny,
            discretization.reference().order,
            layout.n_total(),
            integrator.name(),
            integrator.n_stages(),
            if integrator.is_ssp() { ", SSP" } else { "" },
            eos.name()
        );

        Ok(Self {
            workspace: discretization.workspace(),
            state: MoistState::zeros(layout.n_total()),
            discretization,
            eos,
            forcing: Box::new(NoForcing),
            integrator,
            time: 0.0,
            step: 0,
        })
    }

    /// Replace the forcing (default [`NoForcing`]).
    pub fn with_forcing<F: Forcing + 'static>(mut self, forcing: F) -> Self {
        self.forcing = Box::new(forcing);
        self
    }

    pub fn set_forcing(&mut self, forcing: Box<dyn Forcing>) {
        self.forcing = forcing;
    }

    /// Set the initial state from velocity, density and the specific
    /// entropy `s` and total water `qw`, and reset the clock.
    pub fn set_initial_condition(
        &mut self,
        u: Vec<f64>,
        w: Vec<f64>,
        h: Vec<f64>,
        s: Vec<f64>,
        qw: Vec<f64>,
    ) -> Result<()> {
        let mut state = MoistState::from_fields(u, w, h, s, qw)?;
        for p in 0..state.len() {
            state.hs[p] *= state.h[p];
            state.hqw[p] *= state.h[p];
        }
        self.set_state(state)?;
        self.time = 0.0;
        self.step = 0;
        Ok(())
    }

    /// Replace the conserved state, keeping the clock.
    ///
    /// The state must match the mesh and be admissible for the equation
    /// of state at every node.
    pub fn set_state(&mut self, state: MoistState) -> Result<()> {
        state.check_len(self.layout().n_total())?;
        self.workspace
            .thermo
            .evaluate(&self.eos, &state, NodeLocation::Interior)?;
        self.state = state;
        Ok(())
    }

    /// Courant-limited step for the current state.
    pub fn compute_dt(&mut self) -> Result<f64> {
        self.courant_bound().map(|(dt, _)| dt)
    }

    /// (dt, max wave speed) of the current state.
    fn courant_bound(&mut self) -> Result<(f64, f64)> {
        self.workspace
            .thermo
            .evaluate(&self.eos, &self.state, NodeLocation::Interior)?;
        let config = self.discretization.config();
        let max_speed =
            self.discretization
                .max_wave_speed(&self.state, &self.workspace.thermo, &config.wave_speed);
        let dt = stable_dt(
            config.courant,
            self.discretization.mesh().min_spacing(),
            config.order,
            max_speed,
            self.time,
        )?;
        Ok((dt, max_speed))
    }

    /// Step size to use: `requested`, else the configured fixed step, else
    /// the Courant bound.
    fn select_dt(&mut self, requested: Option<f64>) -> Result<f64> {
        let (bound, max_speed) = self.courant_bound()?;
        match requested.or(self.discretization.config().fixed_dt) {
            Some(dt) => {
                let dt = validate_dt(dt, max_speed, self.time)?;
                if dt > bound {
                    warn!(
                        "t = {:.6e}: requested dt {:.3e} exceeds Courant bound {:.3e} (c_max = {:.2})",
                        self.time, dt, bound, max_speed
                    );
                }
                Ok(dt)
            }
            None => Ok(bound),
        }
    }

    /// Advance one SSP-RK3 step of size `dt`.
    fn advance(&mut self, dt: f64) -> Result<()> {
        let Self {
            discretization,
            eos,
            forcing,
            integrator,
            workspace,
            state,
            time,
            ..
        } = self;
        let config = discretization.config();

        integrator.step(state, dt, *time, |s, t| {
            discretization.residual(s, t, workspace, &*eos, &config.wave_speed, forcing.as_ref())
        })?;

        self.time += dt;
        self.step += 1;
        debug!("step {}: t = {:.6e}, dt = {:.6e}", self.step, self.time, dt);
        Ok(())
    }

    /// Take one step and return the step size used.
    ///
    /// With `dt = None` the configured fixed step or the Courant bound of
    /// the current state is used.
    pub fn time_step(&mut self, dt: Option<f64>) -> Result<f64> {
        let dt = self.select_dt(dt)?;
        self.advance(dt)?;
        Ok(dt)
    }

    /// Step until the clock reaches `t_end`, shortening the last step to
    /// land on it exactly.
    pub fn run_until(&mut self, t_end: f64) -> Result<RunSummary> {
        self.run_until_with_callback(t_end, |_, _| {})
    }

    /// As [`run_until`](Self::run_until), calling `callback(state, time)`
    /// after every step.
    pub fn run_until_with_callback<F>(&mut self, t_end: f64, mut callback: F) -> Result<RunSummary>
    where
        F: FnMut(&MoistState, f64),
    {
        let start_wall = Instant::now();
        let start_time = self.time;
        let tolerance = 1e-12 * t_end.abs().max(1.0);

        let mut n_steps = 0;
        let mut dt_min = f64::INFINITY;
        let mut dt_max = 0.0_f64;

        while self.time < t_end - tolerance {
            let dt = self.select_dt(None)?.min(t_end - self.time);
            self.advance(dt)?;
            n_steps += 1;
            dt_min = dt_min.min(dt);
            dt_max = dt_max.max(dt);
            callback(&self.state, self.time);
        }

        let summary = RunSummary {
            final_time: self.time,
            n_steps,
            dt_min,
            dt_max,
            wall_time: start_wall.elapsed().as_secs_f64(),
        };
        info!(
            "run from t = {:.4e} to {:.4e}: {} steps, dt in [{:.3e}, {:.3e}], {:.2} s wall",
            start_time, summary.final_time, n_steps, dt_min, dt_max, summary.wall_time
        );
        Ok(summary)
    }

    /// Time derivative of the current state.
    pub fn residual(&mut self) -> Result<MoistState> {
        let config = self.discretization.config();
        self.discretization.residual(
            &self.state,
            self.time,
            &mut self.workspace,
            &self.eos,
            &config.wave_speed,
            self.forcing.as_ref(),
        )
    }

    /// Integral invariants of the current state.
    pub fn diagnostics(&mut self) -> Result<MoistDiagnostics> {
        self.workspace
            .thermo
            .evaluate(&self.eos, &self.state, NodeLocation::Interior)?;
        Ok(MoistDiagnostics::compute(
            &self.discretization,
            &self.state,
            &self.workspace.thermo,
            &self.eos,
            &self.discretization.config().wave_speed,
        ))
    }

    /// Rate of change of total energy under the full residual, forcing
    /// included.
    pub fn energy_tendency(&mut self) -> Result<f64> {
        let tendency = self.residual()?;
        Ok(self
            .discretization
            .energy_tendency(&self.state, &self.workspace.thermo, &tendency))
    }

    /// Snapshot of the state and clock.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint::new(self.time, self.step, self.layout(), self.state.clone())
    }

    /// Resume from a snapshot taken on the same mesh.
    pub fn restore(&mut self, checkpoint: Checkpoint) -> Result<()> {
        checkpoint.validate(self.layout())?;
        self.set_state(checkpoint.state)?;
        self.time = checkpoint.time;
        self.step = checkpoint.step;
        Ok(())
    }

    pub fn state(&self) -> &MoistState {
        &self.state
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// Steps taken since the initial condition.
    pub fn step_count(&self) -> usize {
        self.step
    }

    pub fn config(&self) -> &SolverConfig {
        self.discretization.config()
    }

    pub fn layout(&self) -> NodeLayout {
        self.discretization.layout()
    }

    pub fn mesh(&self) -> &StructuredMesh {
        self.discretization.mesh()
    }

    pub fn geometry(&self) -> &CurvilinearGeometry {
        self.discretization.geometry()
    }

    pub fn reference(&self) -> &ReferenceElement {
        self.discretization.reference()
    }

    pub fn discretization(&self) -> &Discretization {
        &self.discretization
    }

    pub fn eos(&self) -> &E {
        &self.eos
    }

    /// Interior thermodynamics from the most recent evaluation.
    pub fn thermo(&self) -> &NodalThermo {
        &self.workspace.thermo
    }
}
