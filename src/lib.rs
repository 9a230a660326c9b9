//! # moist-euler-dg
//!
//! Nodal discontinuous Galerkin solver for the two-dimensional moist
//! compressible Euler equations on a structured curvilinear mesh.
//!
//! This crate provides:
//! - Gauss-Lobatto-Legendre collocation and the reference-element operators
//! - Curvilinear metric terms for mapped quadrilateral grids
//! - Periodic and wall boundary exchange of interface traces
//! - A pluggable equation of state (dry and moist ideal gas bundled)
//! - An energy-consistent residual with optional upwind dissipation
//! - SSP-RK3 time integration with a Courant-limited step
//! - Forcing hooks, conservation diagnostics and checkpoints

pub mod boundary;
pub mod error;
pub mod flux;
pub mod mesh;
pub mod operators;
pub mod polynomial;
pub mod solver;
pub mod thermo;
pub mod time;

// Re-export main types for convenience
pub use boundary::{BoundaryConfig, EdgeBuffers, HorizontalBoundary, VerticalBoundary};
pub use error::{NodeLocation, Result, SolverError, ThermoError};
pub use flux::{AcousticWaveSpeed, FixedWaveSpeed, WaveSpeed, WaveSpeedModel};
pub use mesh::{
    DomainMap, MappedDomain, NodeLayout, RectangularDomain, SkewedDomain, StructuredMesh,
};
pub use operators::{CurvilinearGeometry, ReferenceElement};
pub use solver::{
    Checkpoint, CombinedForcing, DiagnosticsTracker, Discretization, EnergyInjection, Field,
    Forcing, ForcingContext, MoistDiagnostics, MoistEulerSolver, MoistState, NoForcing,
    PhysicsVariant, RunSummary, SolverConfig, SurfaceRelaxation, Tracer, UniformCooling,
};
pub use thermo::{DryIdealGas, EquationOfState, MoistIdealGas, NodalThermo, Thermodynamics};
pub use time::{Integrable, SSPRK3, TimeIntegrator, stable_dt};
