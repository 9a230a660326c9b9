//! External forcing applied after the unforced tendency is assembled.
//!
//! A forcing receives the stage state and adds source terms to the tendency
//! in place. Heating is expressed through the entropy tendency: a volumetric
//! power P changes hs at the rate P / T, since ∂E/∂hs = T.

use crate::mesh::StructuredMesh;
use crate::solver::MoistState;
use crate::thermo::NodalThermo;

/// Context handed to a forcing at every stage.
#[derive(Clone, Copy)]
pub struct ForcingContext<'a> {
    /// Stage time
    pub time: f64,
    /// Node positions and layout
    pub mesh: &'a StructuredMesh,
    /// Gravitational acceleration
    pub gravity: f64,
    /// Thermodynamics of the stage state
    pub thermo: &'a NodalThermo,
}

/// Source terms added to the tendency.
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait Forcing: Send + Sync {
    /// Add this forcing's contribution to `tendency`.
    fn apply(&self, ctx: &ForcingContext<'_>, state: &MoistState, tendency: &mut MoistState);

    /// Name for logging.
    fn name(&self) -> &'static str;
}

/// No forcing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoForcing;

impl Forcing for NoForcing {
    fn apply(&self, _ctx: &ForcingContext<'_>, _state: &MoistState, _tendency: &mut MoistState) {}

    fn name(&self) -> &'static str {
        "none"
    }
}

/// Uniform temperature tendency at constant density.
///
/// d(hs)/dt += h cv (dT/dt) / T
#[derive(Clone, Copy, Debug)]
pub struct UniformCooling {
    /// Temperature tendency (K/s); negative cools
    pub rate: f64,
    /// Specific heat at constant volume used for the conversion
    pub cv: f64,
}

impl UniformCooling {
    pub fn new(rate: f64, cv: f64) -> Self {
        Self { rate, cv }
    }

    /// Cooling by `kelvin` per day.
    pub fn per_day(kelvin: f64, cv: f64) -> Self {
        Self::new(-kelvin / 86_400.0, cv)
    }
}

impl Forcing for UniformCooling {
    fn apply(&self, ctx: &ForcingContext<'_>, state: &MoistState, tendency: &mut MoistState) {
        for ((ds, &h), &t) in tendency.hs.iter_mut().zip(&state.h).zip(&ctx.thermo.temperature) {
            *ds += h * self.cv * self.rate / t;
        }
    }

    fn name(&self) -> &'static str {
        "uniform_cooling"
    }
}

/// Newtonian relaxation of the lowest node layer toward a surface temperature.
///
/// On its own this adds to whatever else heats the bottom layer. Built with
/// [`SurfaceRelaxation::replacing`] it also removes a [`UniformCooling`]
/// there, so that combined with that cooling the surface layer only feels
/// the relaxation.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceRelaxation {
    /// Sea surface temperature (K)
    pub surface_temperature: f64,
    /// Relaxation timescale (s)
    pub timescale: f64,
    pub cv: f64,
    /// Temperature tendency (K/s) cancelled on the bottom layer
    pub replaced_rate: f64,
}

impl SurfaceRelaxation {
    pub fn new(surface_temperature: f64, timescale: f64, cv: f64) -> Self {
        Self {
            surface_temperature,
            timescale,
            cv,
            replaced_rate: 0.0,
        }
    }

    /// Relaxation that takes the place of `cooling` on the bottom layer.
    pub fn replacing(cooling: UniformCooling, surface_temperature: f64, timescale: f64) -> Self {
        Self {
            replaced_rate: cooling.rate,
            ..Self::new(surface_temperature, timescale, cooling.cv)
        }
    }
}

impl Forcing for SurfaceRelaxation {
    fn apply(&self, ctx: &ForcingContext<'_>, state: &MoistState, tendency: &mut MoistState) {
        let layout = ctx.mesh.layout;
        for col in 0..layout.nx {
            for j in 0..layout.n {
                let p = layout.node(0, col, 0, j);
                let t = ctx.thermo.temperature[p];
                let dt_dt = (self.surface_temperature - t) / self.timescale - self.replaced_rate;
                tendency.hs[p] += state.h[p] * self.cv * dt_dt / t;
            }
        }
    }

    fn name(&self) -> &'static str {
        "surface_relaxation"
    }
}

/// Prescribed volumetric power P(x, y) in W/m³.
pub struct EnergyInjection<F> {
    profile: F,
}

impl<F> EnergyInjection<F>
where
    F: Fn(f64, f64) -> f64 + Send + Sync,
{
    pub fn new(profile: F) -> Self {
        Self { profile }
    }
}

impl EnergyInjection<Box<dyn Fn(f64, f64) -> f64 + Send + Sync>> {
    /// Heating `max_power` at the bottom decreasing linearly to cooling of the
    /// same magnitude at `height`: P = -max_power (2 y / height - 1).
    pub fn linear_dipole(max_power: f64, height: f64) -> Self {
        Self::new(Box::new(move |_x: f64, y: f64| {
            -max_power * (2.0 * y / height - 1.0)
        }))
    }
}

impl<F> Forcing for EnergyInjection<F>
where
    F: Fn(f64, f64) -> f64 + Send + Sync,
{
    fn apply(&self, ctx: &ForcingContext<'_>, _state: &MoistState, tendency: &mut MoistState) {
        for (p, ds) in tendency.hs.iter_mut().enumerate() {
            let (x, y) = ctx.mesh.position(p);
            *ds += (self.profile)(x, y) / ctx.thermo.temperature[p];
        }
    }

    fn name(&self) -> &'static str {
        "energy_injection"
    }
}

/// Several forcings applied in sequence.
#[derive(Default)]
pub struct CombinedForcing {
    forcings: Vec<Box<dyn Forcing>>,
}

impl CombinedForcing {
    pub fn new(forcings: Vec<Box<dyn Forcing>>) -> Self {
        Self { forcings }
    }

    pub fn add(&mut self, forcing: Box<dyn Forcing>) {
        self.forcings.push(forcing);
    }

    pub fn len(&self) -> usize {
        self.forcings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forcings.is_empty()
    }
}

impl Forcing for CombinedForcing {
    fn apply(&self, ctx: &ForcingContext<'_>, state: &MoistState, tendency: &mut MoistState) {
        for forcing in &self.forcings {
            forcing.apply(ctx, state, tendency);
        }
    }

    fn name(&self) -> &'static str {
        "combined"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Integrable;
    use crate::mesh::RectangularDomain;
    use crate::operators::ReferenceElement;

    fn setup() -> (StructuredMesh, MoistState, NodalThermo) {
        let reference = ReferenceElement::new(1).unwrap();
        let domain = RectangularDomain::new((0.0, 2.0), (0.0, 1000.0));
        let mesh = StructuredMesh::new(&domain, 2, 2, &reference).unwrap();
        let len = mesh.layout.n_total();
        let mut state = MoistState::zeros(len);
        state.h.fill(1.2);
        let mut thermo = NodalThermo::new(len);
        thermo.temperature.fill(300.0);
        (mesh, state, thermo)
    }

    #[test]
    fn test_uniform_cooling_entropy_rate() {
        let (mesh, state, thermo) = setup();
        let ctx = ForcingContext {
            time: 0.0,
            mesh: &mesh,
            gravity: 9.81,
            thermo: &thermo,
        };
        let mut tendency = state.zeros_like();
        UniformCooling::new(-1.0, 718.0).apply(&ctx, &state, &mut tendency);
        for &ds in &tendency.hs {
            assert!((ds + 1.2 * 718.0 / 300.0).abs() < 1e-12);
        }
        assert!(tendency.h.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_surface_relaxation_touches_bottom_layer_only() {
        let (mesh, state, thermo) = setup();
        let ctx = ForcingContext {
            time: 0.0,
            mesh: &mesh,
            gravity: 9.81,
            thermo: &thermo,
        };
        let mut tendency = state.zeros_like();
        SurfaceRelaxation::new(310.0, 600.0, 718.0).apply(&ctx, &state, &mut tendency);

        let expected = 1.2 * 718.0 * (10.0 / 600.0) / 300.0;
        for (p, &ds) in tendency.hs.iter().enumerate() {
            if mesh.y[p] == 0.0 {
                assert!((ds - expected).abs() < 1e-12);
            } else {
                assert_eq!(ds, 0.0);
            }
        }
    }

    #[test]
    fn test_combined_energy_injection() {
        let (mesh, state, thermo) = setup();
        let ctx = ForcingContext {
            time: 0.0,
            mesh: &mesh,
            gravity: 9.81,
            thermo: &thermo,
        };
        let combined = CombinedForcing::new(vec![
            Box::new(EnergyInjection::linear_dipole(3.0, 1000.0)),
            Box::new(NoForcing),
        ]);
        assert_eq!(combined.len(), 2);

        let mut tendency = state.zeros_like();
        combined.apply(&ctx, &state, &mut tendency);
        for (p, &ds) in tendency.hs.iter().enumerate() {
            let power = -3.0 * (2.0 * mesh.y[p] / 1000.0 - 1.0);
            assert!((ds - power / 300.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_surface_relaxation_replaces_cooling_at_surface() {
        let (mesh, state, thermo) = setup();
        let ctx = ForcingContext {
            time: 0.0,
            mesh: &mesh,
            gravity: 9.81,
            thermo: &thermo,
        };
        let cooling = UniformCooling::per_day(1.0, 718.0);
        let combined = CombinedForcing::new(vec![
            Box::new(cooling),
            Box::new(SurfaceRelaxation::replacing(cooling, 290.0, 600.0)),
        ]);

        let mut tendency = state.zeros_like();
        combined.apply(&ctx, &state, &mut tendency);

        let relaxation = 1.2 * 718.0 * (-10.0 / 600.0) / 300.0;
        let cooled = 1.2 * 718.0 * cooling.rate / 300.0;
        for (p, &ds) in tendency.hs.iter().enumerate() {
            let expected = if mesh.y[p] == 0.0 { relaxation } else { cooled };
            assert!((ds - expected).abs() < 1e-12, "node {p}: {ds} vs {expected}");
        }
    }
}
