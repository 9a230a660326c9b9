//! Wave-speed bounds for upwind dissipation and the Courant limit.

use crate::thermo::Thermodynamics;

/// Bound on the fastest signal speed at a node.
pub trait WaveSpeed: Send + Sync {
    /// Estimated maximum signal speed for velocity (u, w) and local thermodynamics.
    fn estimate(&self, u: f64, w: f64, thermo: &Thermodynamics) -> f64;

    fn name(&self) -> &'static str;
}

/// Advective plus acoustic speed |v| + c.
#[derive(Clone, Copy, Debug, Default)]
pub struct AcousticWaveSpeed;

impl WaveSpeed for AcousticWaveSpeed {
    #[inline]
    fn estimate(&self, u: f64, w: f64, thermo: &Thermodynamics) -> f64 {
        u.hypot(w) + thermo.sound_speed
    }

    fn name(&self) -> &'static str {
        "acoustic"
    }
}

/// Constant speed regardless of state.
#[derive(Clone, Copy, Debug)]
pub struct FixedWaveSpeed(pub f64);

impl Default for FixedWaveSpeed {
    fn default() -> Self {
        Self(400.0)
    }
}

impl WaveSpeed for FixedWaveSpeed {
    #[inline]
    fn estimate(&self, _u: f64, _w: f64, _thermo: &Thermodynamics) -> f64 {
        self.0
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Enum over the built-in models for configuration-time selection.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WaveSpeedModel {
    #[default]
    Acoustic,
    Fixed(f64),
}

impl WaveSpeed for WaveSpeedModel {
    #[inline]
    fn estimate(&self, u: f64, w: f64, thermo: &Thermodynamics) -> f64 {
        match self {
            WaveSpeedModel::Acoustic => AcousticWaveSpeed.estimate(u, w, thermo),
            WaveSpeedModel::Fixed(c) => FixedWaveSpeed(*c).estimate(u, w, thermo),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            WaveSpeedModel::Acoustic => AcousticWaveSpeed.name(),
            WaveSpeedModel::Fixed(_) => "fixed",
        }
    }
}
