//! Solver configuration.

use crate::boundary::{BoundaryConfig, HorizontalBoundary, VerticalBoundary};
use crate::error::{Result, SolverError};
use crate::flux::WaveSpeedModel;
use crate::time::integrator_for_order;

/// Which conserved tracers evolve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PhysicsVariant {
    /// Single gas: the water field is frozen (its tendency is zero).
    SingleSpecies,
    /// Dry air plus water: water is transported and its chemical
    /// potential enters the momentum equations.
    #[default]
    Moist,
}

impl PhysicsVariant {
    #[inline]
    pub fn transports_water(&self) -> bool {
        matches!(self, PhysicsVariant::Moist)
    }
}

/// Configuration of the discretization and time stepping.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverConfig {
    /// Polynomial order p (p + 1 GLL nodes per direction)
    pub order: usize,
    /// Elements in the horizontal direction
    pub nx: usize,
    /// Elements in the vertical direction
    pub ny: usize,
    /// Gravitational acceleration (m/s²)
    pub gravity: f64,
    /// Constant rotation added to the vorticity (1/s)
    pub coriolis: f64,
    /// Courant number for the adaptive step
    pub courant: f64,
    /// Kinetic-energy dissipation coefficient `a`; 0 is centred
    pub dissipation: f64,
    pub boundaries: BoundaryConfig,
    pub physics: PhysicsVariant,
    /// Fixed step; `None` recomputes the Courant bound every step
    pub fixed_dt: Option<f64>,
    /// Requested Runge-Kutta order
    pub rk_order: usize,
    pub wave_speed: WaveSpeedModel,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            order: 3,
            nx: 8,
            ny: 8,
            gravity: 9.81,
            coriolis: 0.0,
            courant: 0.5,
            dissipation: 0.5,
            boundaries: BoundaryConfig::default(),
            physics: PhysicsVariant::default(),
            fixed_dt: None,
            rk_order: 3,
            wave_speed: WaveSpeedModel::default(),
        }
    }
}

impl SolverConfig {
    /// Configuration for an `nx` × `ny` mesh of order `order`.
    pub fn new(order: usize, nx: usize, ny: usize) -> Self {
        Self {
            order,
            nx,
            ny,
            ..Default::default()
        }
    }

    pub fn with_gravity(mut self, gravity: f64) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_coriolis(mut self, f: f64) -> Self {
        self.coriolis = f;
        self
    }

    pub fn with_courant(mut self, courant: f64) -> Self {
        self.courant = courant;
        self
    }

    pub fn with_dissipation(mut self, a: f64) -> Self {
        self.dissipation = a;
        self
    }

    pub fn with_boundaries(mut self, boundaries: BoundaryConfig) -> Self {
        self.boundaries = boundaries;
        self
    }

    pub fn with_horizontal_boundary(mut self, boundary: HorizontalBoundary) -> Self {
        self.boundaries.horizontal = boundary;
        self
    }

    pub fn with_vertical_boundary(mut self, boundary: VerticalBoundary) -> Self {
        self.boundaries.vertical = boundary;
        self
    }

    pub fn with_physics(mut self, physics: PhysicsVariant) -> Self {
        self.physics = physics;
        self
    }

    pub fn with_fixed_dt(mut self, dt: f64) -> Self {
        self.fixed_dt = Some(dt);
        self
    }

    pub fn with_rk_order(mut self, order: usize) -> Self {
        self.rk_order = order;
        self
    }

    pub fn with_wave_speed(mut self, model: WaveSpeedModel) -> Self {
        self.wave_speed = model;
        self
    }

    /// Reject inconsistent settings before anything is allocated.
    pub fn validate(&self) -> Result<()> {
        integrator_for_order(self.rk_order)?;

        if self.order == 0 {
            return Err(SolverError::invalid_config("polynomial order must be at least 1"));
        }
        if self.nx == 0 || self.ny == 0 {
            return Err(SolverError::invalid_config(format!(
                "mesh needs at least one element per direction, got {} x {}",
                self.nx, self.ny
            )));
        }
        if !self.gravity.is_finite() || !self.coriolis.is_finite() {
            return Err(SolverError::invalid_config(
                "gravity and coriolis parameter must be finite",
            ));
        }
        if !(self.courant > 0.0) || !self.courant.is_finite() {
            return Err(SolverError::invalid_config(format!(
                "Courant number must be positive, got {}",
                self.courant
            )));
        }
        if !(self.dissipation >= 0.0) || !self.dissipation.is_finite() {
            return Err(SolverError::invalid_config(format!(
                "dissipation coefficient must be non-negative, got {}",
                self.dissipation
            )));
        }
        if let Some(dt) = self.fixed_dt {
            if !(dt > 0.0) || !dt.is_finite() {
                return Err(SolverError::invalid_config(format!(
                    "fixed time step must be positive, got {dt}"
                )));
            }
        }
        if let WaveSpeedModel::Fixed(c) = self.wave_speed {
            if !(c > 0.0) || !c.is_finite() {
                return Err(SolverError::invalid_config(format!(
                    "fixed wave speed must be positive, got {c}"
                )));
            }
        }
        Ok(())
    }
}
