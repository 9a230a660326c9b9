//! Trait-based time integrator abstraction.
//!
//! Residual evaluations can fail (for example when a stage state leaves the
//! domain of the equation of state), so the RHS closure returns a `Result`
//! and an integrator only commits the new state once every stage succeeded.
//!
//! # Example
//! ```
//! use moist_euler_dg::time::{Integrable, TimeIntegrator, SSPRK3};
//! use moist_euler_dg::MoistState;
//!
//! let mut u = MoistState::zeros(4);
//! u.h.fill(1.0);
//!
//! // dh/dt = -h (exponential decay)
//! SSPRK3
//!     .step(&mut u, 0.01, 0.0, |state, _time| {
//!         let mut rhs = state.clone();
//!         rhs.scale(-1.0);
//!         Ok(rhs)
//!     })
//!     .unwrap();
//! assert!((u.h[0] - (-0.01f64).exp()).abs() < 1e-8);
//! ```

use crate::error::{Result, SolverError};

// =============================================================================
// Integrable Trait
// =============================================================================

/// Trait for solution types that can be time-integrated.
///
/// This provides the vector space operations needed by explicit time integrators:
/// - `scale`: Multiply by scalar (x <- c * x)
/// - `axpy`: Add scaled vector (x <- x + c * y)
pub trait Integrable: Clone + Send + Sized {
    /// Scale the solution by a constant: self <- c * self
    fn scale(&mut self, c: f64);

    /// Add a scaled vector: self <- self + c * other
    fn axpy(&mut self, c: f64, other: &Self);

    /// Create a zero-initialized solution with the same shape.
    fn zeros_like(&self) -> Self {
        let mut result = self.clone();
        result.scale(0.0);
        result
    }
}

// =============================================================================
// IntegratorInfo Trait (non-generic, dyn-compatible)
// =============================================================================

/// Non-generic information about a time integrator.
pub trait IntegratorInfo: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &'static str;

    /// Order of accuracy of the integrator.
    fn order(&self) -> usize;

    /// Number of stages in the integrator.
    fn n_stages(&self) -> usize;

    /// Whether the integrator is strong stability preserving (SSP).
    fn is_ssp(&self) -> bool;

    /// Times at which RHS is evaluated relative to current time.
    fn stage_times(&self, dt: f64) -> Vec<f64>;
}

// =============================================================================
// TimeIntegrator Trait
// =============================================================================

/// Trait for explicit time integrators with fallible right-hand sides.
pub trait TimeIntegrator<S: Integrable>: IntegratorInfo {
    /// Advance the solution by one time step.
    ///
    /// # Arguments
    /// * `state` - Solution to advance, untouched if any stage fails
    /// * `dt` - Time step size
    /// * `t` - Current time
    /// * `rhs` - Function computing the RHS: f(state, time) -> time_derivative
    fn step<F>(&self, state: &mut S, dt: f64, t: f64, rhs: F) -> Result<()>
    where
        F: FnMut(&S, f64) -> Result<S>;
}

// =============================================================================
// SSP-RK3 Implementation
// =============================================================================

/// Strong Stability Preserving Runge-Kutta 3rd order integrator.
///
/// Stages (Shu-Osher form):
/// ```text
/// u1 = u + dt * L(u, t)
/// u2 = 3/4 * u + 1/4 * (u1 + dt * L(u1, t + dt))
/// u_new = 1/3 * u + 2/3 * (u2 + dt * L(u2, t + dt/2))
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct SSPRK3;

impl IntegratorInfo for SSPRK3 {
    fn name(&self) -> &'static str {
        "ssp-rk3"
    }

    fn order(&self) -> usize {
        3
    }

    fn n_stages(&self) -> usize {
        3
    }

    fn is_ssp(&self) -> bool {
        true
    }

    fn stage_times(&self, dt: f64) -> Vec<f64> {
        vec![0.0, dt, 0.5 * dt]
    }
}

impl<S: Integrable> TimeIntegrator<S> for SSPRK3 {
    fn step<F>(&self, state: &mut S, dt: f64, t: f64, mut rhs: F) -> Result<()>
    where
        F: FnMut(&S, f64) -> Result<S>,
    {
        // Stage 1: u1 = u + dt * L(u, t)
        let l_u = rhs(state, t)?;
        let mut u1 = state.clone();
        u1.axpy(dt, &l_u);

        // Stage 2: u2 = 3/4 * u + 1/4 * (u1 + dt * L(u1, t + dt))
        let l_u1 = rhs(&u1, t + dt)?;
        let mut u2 = state.clone();
        u2.scale(0.75);
        u2.axpy(0.25, &u1);
        u2.axpy(0.25 * dt, &l_u1);

        // Stage 3: u_new = 1/3 * u + 2/3 * (u2 + dt * L(u2, t + dt/2))
        let l_u2 = rhs(&u2, t + 0.5 * dt)?;
        state.scale(1.0 / 3.0);
        state.axpy(2.0 / 3.0, &u2);
        state.axpy(2.0 / 3.0 * dt, &l_u2);

        Ok(())
    }
}

/// Integrator for a requested order of accuracy.
///
/// Only the third-order SSP scheme exists; any other order is an
/// [`SolverError::UnsupportedScheme`].
pub fn integrator_for_order(order: usize) -> Result<SSPRK3> {
    match order {
        3 => Ok(SSPRK3),
        order => Err(SolverError::UnsupportedScheme { order }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::MoistState;

    fn decay(state: &MoistState, _t: f64) -> Result<MoistState> {
        let mut rhs = state.clone();
        rhs.scale(-1.0);
        Ok(rhs)
    }

    #[test]
    fn test_ssprk3_third_order_convergence() {
        let error_at = |dt: f64| {
            let mut u = MoistState::zeros(1);
            u.h[0] = 1.0;
            let steps = (1.0 / dt).round() as usize;
            let mut t = 0.0;
            for _ in 0..steps {
                SSPRK3.step(&mut u, dt, t, decay).unwrap();
                t += dt;
            }
            (u.h[0] - (-1.0f64).exp()).abs()
        };

        let ratio = error_at(0.1) / error_at(0.05);
        assert!(ratio > 7.0 && ratio < 9.0, "convergence ratio {ratio}");
    }

    #[test]
    fn test_stage_times() {
        let mut seen = Vec::new();
        let mut u = MoistState::zeros(2);
        SSPRK3
            .step(&mut u, 0.2, 1.0, |s, t| {
                seen.push(t);
                Ok(s.zeros_like())
            })
            .unwrap();
        assert_eq!(seen, vec![1.0, 1.2, 1.1]);
        assert_eq!(SSPRK3.stage_times(0.2), vec![0.0, 0.2, 0.1]);
        assert_eq!(seen.len(), SSPRK3.n_stages());
        assert!(SSPRK3.is_ssp());
    }

    #[test]
    fn test_failed_stage_leaves_state_untouched() {
        let mut u = MoistState::zeros(2);
        u.h.fill(1.0);
        let before = u.clone();
        let mut calls = 0;
        let result = SSPRK3.step(&mut u, 0.1, 0.0, |s, _| {
            calls += 1;
            if calls == 3 {
                Err(SolverError::invalid_config("stage failure"))
            } else {
                Ok(s.clone())
            }
        });
        assert!(result.is_err());
        assert_eq!(u, before);
    }

    #[test]
    fn test_only_third_order_supported() {
        assert!(integrator_for_order(3).is_ok());
        for order in [1, 2, 4] {
            assert_eq!(
                integrator_for_order(order).unwrap_err(),
                SolverError::UnsupportedScheme { order }
            );
        }
    }
}
