//! Explicit time integration.

mod integrator;
mod step_size;

pub use integrator::{
    Integrable, IntegratorInfo, SSPRK3, TimeIntegrator, integrator_for_order,
};
pub use step_size::{stable_dt, validate_dt};
