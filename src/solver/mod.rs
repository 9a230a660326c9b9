//! Moist Euler solver components.
//!
//! # Submodules
//!
//! - [`state`]: conserved fields as struct-of-arrays
//! - [`config`]: validated solver configuration
//! - [`rhs`]: residual assembly over the element grid
//! - [`forcing`]: external source terms applied after assembly
//! - [`diagnostics`]: domain integrals and conservation tracking
//! - [`context`]: the solver object owning state and clock

pub mod checkpoint;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod forcing;
pub mod rhs;
pub mod state;

pub use checkpoint::Checkpoint;
pub use config::{PhysicsVariant, SolverConfig};
pub use context::{MoistEulerSolver, RunSummary};
pub use diagnostics::{DiagnosticsTracker, MoistDiagnostics, potential_temperature_range};
pub use forcing::{
    CombinedForcing, EnergyInjection, Forcing, ForcingContext, NoForcing, SurfaceRelaxation,
    UniformCooling,
};
pub use rhs::{Discretization, Workspace};
pub use state::{ElementBlockMut, Field, MoistState, Tracer};
