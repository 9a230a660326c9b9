//! Numerical fluxes at every interface node.
//!
//! Each interface has a "minus" side (the element below or to the left) and a
//! "plus" side (above or to the right). Normal mass fluxes F = h (u, w)·n are
//! taken along the interface normal of each side.

use super::wave_speed::WaveSpeed;
use crate::boundary::{BoundaryConfig, EdgeBuffers};
use crate::mesh::NodeLayout;
use crate::operators::InterfaceNormals;
use crate::solver::{MoistState, Tracer};
use crate::thermo::{EdgeThermo, NodalThermo};

/// Arithmetic mean of the two trace values.
#[inline]
pub fn central_flux(minus: f64, plus: f64) -> f64 {
    0.5 * (minus + plus)
}

/// Upwind penalty a (c / h) [F] subtracted from the Bernoulli flux.
#[inline]
pub fn bernoulli_dissipation(c: f64, h_avg: f64, jump: f64, a: f64) -> f64 {
    a * (c / h_avg) * jump
}

/// Central Bernoulli flux with upwind dissipation on the mass-flux jump.
#[inline]
pub fn dissipative_bernoulli_flux(
    b_minus: f64,
    b_plus: f64,
    c: f64,
    h_avg: f64,
    jump: f64,
    a: f64,
) -> f64 {
    central_flux(b_minus, b_plus) - bernoulli_dissipation(c, h_avg, jump, a)
}

/// Specific tracer value from the upwind side of the interface mass flux.
///
/// Positive flux runs from minus to plus. A zero flux takes the average.
#[inline]
pub fn upwind_tracer(q_minus: f64, q_plus: f64, mass_flux: f64) -> f64 {
    if mass_flux > 0.0 {
        q_minus
    } else if mass_flux < 0.0 {
        q_plus
    } else {
        central_flux(q_minus, q_plus)
    }
}

/// Side of a wall interface that belongs to the domain interior.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Interior {
    Minus,
    Plus,
}

/// Fluxes on one family of interfaces (vertical or horizontal).
#[derive(Clone, Debug, Default)]
pub struct InterfaceSet {
    /// Normal mass flux of the minus trace
    pub mass_minus: Vec<f64>,
    /// Normal mass flux of the plus trace
    pub mass_plus: Vec<f64>,
    /// Central mass flux, zero through walls
    pub mass_flux: Vec<f64>,
    /// Bernoulli function ½|v|² + ∂E/∂h of the minus trace
    pub bernoulli_minus: Vec<f64>,
    pub bernoulli_plus: Vec<f64>,
    /// Dissipative Bernoulli flux
    pub bernoulli_flux: Vec<f64>,
    /// Specific tracer values per [`Tracer`]
    pub tracer_minus: [Vec<f64>; 2],
    pub tracer_plus: [Vec<f64>; 2],
    /// Upwinded specific tracer values
    pub tracer_hat: [Vec<f64>; 2],
}

impl InterfaceSet {
    pub fn new(len: usize) -> Self {
        let zeros = || vec![0.0; len];
        Self {
            mass_minus: zeros(),
            mass_plus: zeros(),
            mass_flux: zeros(),
            bernoulli_minus: zeros(),
            bernoulli_plus: zeros(),
            bernoulli_flux: zeros(),
            tracer_minus: [zeros(), zeros()],
            tracer_plus: [zeros(), zeros()],
            tracer_hat: [zeros(), zeros()],
        }
    }

    pub fn len(&self) -> usize {
        self.mass_flux.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mass_flux.is_empty()
    }

    fn fill<W, F>(
        &mut self,
        minus: (&MoistState, &NodalThermo, &[[f64; 2]]),
        plus: (&MoistState, &NodalThermo, &[[f64; 2]]),
        dissipation: f64,
        wave_speed: &W,
        wall: F,
    ) where
        W: WaveSpeed + ?Sized,
        F: Fn(usize) -> Option<Interior>,
    {
        let (sm, tm, nm) = minus;
        let (sp, tp, np) = plus;

        for p in 0..self.len() {
            let f_minus = sm.h[p] * (sm.u[p] * nm[p][0] + sm.w[p] * nm[p][1]);
            let f_plus = sp.h[p] * (sp.u[p] * np[p][0] + sp.w[p] * np[p][1]);
            let b_minus = 0.5 * (sm.u[p] * sm.u[p] + sm.w[p] * sm.w[p]) + tm.density_potential[p];
            let b_plus = 0.5 * (sp.u[p] * sp.u[p] + sp.w[p] * sp.w[p]) + tp.density_potential[p];

            let c = central_flux(
                wave_speed.estimate(sm.u[p], sm.w[p], &tm.get(p)),
                wave_speed.estimate(sp.u[p], sp.w[p], &tp.get(p)),
            );
            let h_avg = central_flux(sm.h[p], sp.h[p]);
            let jump = f_plus - f_minus;

            let (mass_flux, bernoulli_flux) = match wall(p) {
                None => (
                    central_flux(f_minus, f_plus),
                    dissipative_bernoulli_flux(b_minus, b_plus, c, h_avg, jump, dissipation),
                ),
                Some(Interior::Minus) => {
                    (0.0, b_minus - bernoulli_dissipation(c, h_avg, jump, dissipation))
                }
                Some(Interior::Plus) => {
                    (0.0, b_plus - bernoulli_dissipation(c, h_avg, jump, dissipation))
                }
            };

            self.mass_minus[p] = f_minus;
            self.mass_plus[p] = f_plus;
            self.mass_flux[p] = mass_flux;
            self.bernoulli_minus[p] = b_minus;
            self.bernoulli_plus[p] = b_plus;
            self.bernoulli_flux[p] = bernoulli_flux;

            for tracer in Tracer::ALL {
                let t = tracer.index();
                let q_minus = sm.field(tracer.field())[p] / sm.h[p];
                let q_plus = sp.field(tracer.field())[p] / sp.h[p];
                self.tracer_minus[t][p] = q_minus;
                self.tracer_plus[t][p] = q_plus;
                self.tracer_hat[t][p] = upwind_tracer(q_minus, q_plus, mass_flux);
            }
        }
    }
}

/// Interface fluxes for the whole mesh, rebuilt every residual evaluation.
#[derive(Clone, Debug)]
pub struct InterfaceFluxes {
    layout: NodeLayout,
    /// Between element rows, (ny+1) × nx × n
    pub vertical: InterfaceSet,
    /// Between element columns, ny × (nx+1) × n
    pub horizontal: InterfaceSet,
}

impl InterfaceFluxes {
    pub fn new(layout: NodeLayout) -> Self {
        Self {
            layout,
            vertical: InterfaceSet::new(layout.vertical_interface_len()),
            horizontal: InterfaceSet::new(layout.horizontal_interface_len()),
        }
    }

    /// Evaluate every interface flux from freshly exchanged buffers.
    ///
    /// `dissipation` is the coefficient `a`; zero gives the centred scheme.
    pub fn compute<W: WaveSpeed + ?Sized>(
        &mut self,
        buffers: &EdgeBuffers,
        thermo: &EdgeThermo,
        normals: &InterfaceNormals,
        boundaries: &BoundaryConfig,
        dissipation: f64,
        wave_speed: &W,
    ) {
        let NodeLayout { ny, nx, n } = self.layout;

        let vertical_walls = boundaries.has_vertical_walls();
        self.vertical.fill(
            (&buffers.down, &thermo.down, normals.down.as_slice()),
            (&buffers.up, &thermo.up, normals.up.as_slice()),
            dissipation,
            wave_speed,
            |p| {
                let k = p / (nx * n);
                match (vertical_walls, k) {
                    (true, 0) => Some(Interior::Plus),
                    (true, k) if k == ny => Some(Interior::Minus),
                    _ => None,
                }
            },
        );

        let horizontal_walls = boundaries.has_horizontal_walls();
        self.horizontal.fill(
            (&buffers.left, &thermo.left, normals.left.as_slice()),
            (&buffers.right, &thermo.right, normals.right.as_slice()),
            dissipation,
            wave_speed,
            |p| {
                let m = (p / n) % (nx + 1);
                match (horizontal_walls, m) {
                    (true, 0) => Some(Interior::Plus),
                    (true, m) if m == nx => Some(Interior::Minus),
                    _ => None,
                }
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upwind_tracer_follows_flux_sign() {
        assert_eq!(upwind_tracer(1.0, 3.0, 0.5), 1.0);
        assert_eq!(upwind_tracer(1.0, 3.0, -0.5), 3.0);
        assert_eq!(upwind_tracer(1.0, 3.0, 0.0), 2.0);
    }

    #[test]
    fn test_dissipation_vanishes_without_coefficient_or_jump() {
        assert_eq!(dissipative_bernoulli_flux(1.0, 3.0, 300.0, 1.2, 0.7, 0.0), 2.0);
        assert_eq!(dissipative_bernoulli_flux(1.0, 3.0, 300.0, 1.2, 0.0, 0.5), 2.0);
        let f = dissipative_bernoulli_flux(1.0, 3.0, 300.0, 1.5, 0.01, 0.5);
        assert!((f - (2.0 - 0.5 * 200.0 * 0.01)).abs() < 1e-12);
    }
}
