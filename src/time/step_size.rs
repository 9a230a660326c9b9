//! Courant-limited step size.

use crate::error::{Result, SolverError};

/// Largest stable step for a DG scheme of polynomial order `order`:
///
/// dt = courant · min_spacing / (2·order + 1) / max_speed
///
/// Fails with [`SolverError::NonFiniteStep`] if the wave speed is not a
/// positive finite number or the resulting step is not positive and finite.
/// `time` is only used for the error report.
pub fn stable_dt(
    courant: f64,
    min_spacing: f64,
    order: usize,
    max_speed: f64,
    time: f64,
) -> Result<f64> {
    let dt = courant * min_spacing / (2 * order + 1) as f64 / max_speed;
    if !(max_speed > 0.0) || !max_speed.is_finite() || !(dt > 0.0) || !dt.is_finite() {
        return Err(SolverError::NonFiniteStep {
            dt,
            max_wave_speed: max_speed,
            time,
        });
    }
    Ok(dt)
}

/// Check an externally fixed step.
pub fn validate_dt(dt: f64, max_speed: f64, time: f64) -> Result<f64> {
    if !(dt > 0.0) || !dt.is_finite() {
        return Err(SolverError::NonFiniteStep {
            dt,
            max_wave_speed: max_speed,
            time,
        });
    }
    Ok(dt)
}
