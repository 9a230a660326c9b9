//! Error types for solver construction and time stepping.
//!
//! Every variant is fatal for a run: the solver reports the failing element,
//! node or step and never substitutes values.

use std::fmt;

use thiserror::Error;

/// Where a nodal array lives during a residual evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeLocation {
    /// Interior collocation nodes of the conserved state.
    Interior,
    /// Trace buffer above each vertical interface.
    Up,
    /// Trace buffer below each vertical interface.
    Down,
    /// Trace buffer left of each horizontal interface.
    Left,
    /// Trace buffer right of each horizontal interface.
    Right,
}

impl fmt::Display for NodeLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Interior => "interior",
            Self::Up => "up buffer",
            Self::Down => "down buffer",
            Self::Left => "left buffer",
            Self::Right => "right buffer",
        };
        f.write_str(name)
    }
}

/// Node-local failure of an equation of state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ThermoError {
    /// Density was zero, negative or not finite.
    #[error("non-positive density {0}")]
    NonPositiveDensity(f64),

    /// Water mass fraction outside the range the closure can represent.
    #[error("water fraction {qw} outside ({min}, {max})")]
    WaterFractionOutOfRange { qw: f64, min: f64, max: f64 },

    /// The closure produced a non-finite thermodynamic quantity.
    #[error("non-finite {quantity}")]
    NonFinite { quantity: &'static str },
}

/// Errors raised by the solver.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// The element mapping is degenerate or inverted.
    #[error("non-positive Jacobian {jacobian} in element ({row}, {col}) at node {node}")]
    Geometry {
        row: usize,
        col: usize,
        node: usize,
        jacobian: f64,
    },

    /// The equation of state rejected a node.
    #[error("thermodynamically infeasible state in {location} at node {node}: {reason}")]
    ThermodynamicInfeasibility {
        location: NodeLocation,
        node: usize,
        reason: ThermoError,
    },

    /// A time integration order other than the implemented one was requested.
    #[error("unsupported Runge-Kutta order {order}, only order 3 is implemented")]
    UnsupportedScheme { order: usize },

    /// The time step is zero, negative or not finite.
    #[error("invalid time step {dt} (max wave speed {max_wave_speed}) at t = {time}")]
    NonFiniteStep {
        dt: f64,
        max_wave_speed: f64,
        time: f64,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Nodal arrays whose layout does not match the mesh.
    #[error("shape mismatch for {what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl SolverError {
    /// Create an invalid configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a shape mismatch error.
    pub fn shape_mismatch(what: &'static str, expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch {
            what,
            expected,
            actual,
        }
    }
}

/// Result alias for solver operations.
pub type Result<T> = std::result::Result<T, SolverError>;
