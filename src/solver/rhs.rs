//! Residual assembly for the moist compressible Euler equations.
//!
//! The prognostic variables are velocity (u, w), density h and the
//! density-weighted tracers hs and hqw. Momentum is advanced in
//! vector-invariant form
//!
//! ```text
//! ∂v/∂t = -∇B + (ω + f) k × v - s ∇T - q ∇μ - g ŷ
//! B     = ½|v|² + ∂E/∂h
//! ```
//!
//! with the tracer terms written skew-symmetrically so that the discrete
//! energy budget closes. Each element's tendency is the strong-form volume
//! term plus a surface correction lifting (F* − F_own) with the 1D GLL
//! weights and the edge Jacobian, divided by the nodal mass J w.

use log::{Level, log_enabled, trace};

use super::config::SolverConfig;
use super::forcing::{Forcing, ForcingContext};
use super::state::{ElementBlockMut, Field, MoistState, Tracer};
use crate::boundary::EdgeBuffers;
use crate::error::{NodeLocation, Result};
use crate::flux::{InterfaceFluxes, InterfaceSet, WaveSpeed, central_flux};
use crate::mesh::{DomainMap, NodeLayout, StructuredMesh};
use crate::operators::{CurvilinearGeometry, GradientScratch, InterfaceNormals, ReferenceElement};
use crate::thermo::{EdgeThermo, EquationOfState, NodalThermo};

/// Interface family an edge node lies on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Family {
    /// Between element rows (top and bottom edges)
    Vertical,
    /// Between element columns (left and right edges)
    Horizontal,
}

/// One node on an element edge.
#[derive(Clone, Copy, Debug)]
struct EdgeNode {
    /// Offset within the element block
    local: usize,
    /// Index into the interface buffers of `family`
    interface: usize,
    family: Family,
    /// The element is the minus (lower/left) side of the interface
    own_minus: bool,
    /// 1D GLL weight times edge Jacobian
    weight: f64,
}

impl EdgeNode {
    /// +1 when the outward normal agrees with the interface normal.
    #[inline]
    fn sign(&self) -> f64 {
        if self.own_minus { 1.0 } else { -1.0 }
    }
}

/// Both traces of one interface family.
struct Sides<'w> {
    fluxes: &'w InterfaceSet,
    minus: &'w MoistState,
    plus: &'w MoistState,
    thermo_minus: &'w NodalThermo,
    thermo_plus: &'w NodalThermo,
    normal_minus: &'w [[f64; 2]],
    normal_plus: &'w [[f64; 2]],
}

/// Buffers rebuilt by every residual evaluation.
#[derive(Clone, Debug)]
pub struct Workspace {
    pub buffers: EdgeBuffers,
    /// Thermodynamics of the interior nodes
    pub thermo: NodalThermo,
    /// Thermodynamics of the four trace buffers
    pub edge_thermo: EdgeThermo,
    pub fluxes: InterfaceFluxes,
}

impl Workspace {
    pub fn new(layout: NodeLayout) -> Self {
        Self {
            buffers: EdgeBuffers::new(layout),
            thermo: NodalThermo::new(layout.n_total()),
            edge_thermo: EdgeThermo::default(),
            fluxes: InterfaceFluxes::new(layout),
        }
    }

    fn sides<'w>(&'w self, normals: &'w InterfaceNormals, family: Family) -> Sides<'w> {
        match family {
            Family::Vertical => Sides {
                fluxes: &self.fluxes.vertical,
                minus: &self.buffers.down,
                plus: &self.buffers.up,
                thermo_minus: &self.edge_thermo.down,
                thermo_plus: &self.edge_thermo.up,
                normal_minus: &normals.down,
                normal_plus: &normals.up,
            },
            Family::Horizontal => Sides {
                fluxes: &self.fluxes.horizontal,
                minus: &self.buffers.left,
                plus: &self.buffers.right,
                thermo_minus: &self.edge_thermo.left,
                thermo_plus: &self.edge_thermo.right,
                normal_minus: &normals.left,
                normal_plus: &normals.right,
            },
        }
    }
}

/// Per-element temporaries.
struct KernelScratch {
    grad: GradientScratch,
    spare: Vec<f64>,
    wj: Vec<f64>,
    fx: Vec<f64>,
    fy: Vec<f64>,
    div: Vec<f64>,
    b: Vec<f64>,
    db_dx: Vec<f64>,
    db_dy: Vec<f64>,
    du_dy: Vec<f64>,
    dw_dx: Vec<f64>,
    q: Vec<f64>,
    qfx: Vec<f64>,
    qfy: Vec<f64>,
    div_q: Vec<f64>,
    dq_dx: Vec<f64>,
    dq_dy: Vec<f64>,
    mq: Vec<f64>,
    dmq_dx: Vec<f64>,
    dmq_dy: Vec<f64>,
    dmu_dx: Vec<f64>,
    dmu_dy: Vec<f64>,
}

impl KernelScratch {
    fn new(nn: usize) -> Self {
        let z = || vec![0.0; nn];
        Self {
            grad: GradientScratch::new(nn),
            spare: z(),
            wj: z(),
            fx: z(),
            fy: z(),
            div: z(),
            b: z(),
            db_dx: z(),
            db_dy: z(),
            du_dy: z(),
            dw_dx: z(),
            q: z(),
            qfx: z(),
            qfy: z(),
            div_q: z(),
            dq_dx: z(),
            dq_dy: z(),
            mq: z(),
            dmq_dx: z(),
            dmq_dy: z(),
            dmu_dx: z(),
            dmu_dy: z(),
        }
    }
}

/// Spatial discretization: reference element, mesh and metric terms.
#[derive(Clone, Debug)]
pub struct Discretization {
    config: SolverConfig,
    reference: ReferenceElement,
    mesh: StructuredMesh,
    geometry: CurvilinearGeometry,
    /// Edge nodes of every element, 4n per element
    edges: Vec<EdgeNode>,
}

impl Discretization {
    /// Validate `config`, build the mesh from `map` and compute the metrics.
    pub fn new<M: DomainMap + ?Sized>(config: SolverConfig, map: &M) -> Result<Self> {
        config.validate()?;
        let reference = ReferenceElement::new(config.order)?;
        let mesh = StructuredMesh::new(map, config.nx, config.ny, &reference)?;
        let geometry = CurvilinearGeometry::compute(&mesh, &reference, &config.boundaries)?;
        let edges = edge_nodes(&mesh.layout, &reference, &geometry);

        Ok(Self {
            config,
            reference,
            mesh,
            geometry,
            edges,
        })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn reference(&self) -> &ReferenceElement {
        &self.reference
    }

    pub fn mesh(&self) -> &StructuredMesh {
        &self.mesh
    }

    pub fn geometry(&self) -> &CurvilinearGeometry {
        &self.geometry
    }

    pub fn layout(&self) -> NodeLayout {
        self.mesh.layout
    }

    /// Fresh workspace sized for this mesh.
    pub fn workspace(&self) -> Workspace {
        Workspace::new(self.layout())
    }

    /// Largest wave-speed estimate over the interior nodes.
    ///
    /// A NaN estimate anywhere makes the result NaN.
    pub fn max_wave_speed<W: WaveSpeed + ?Sized>(
        &self,
        state: &MoistState,
        thermo: &NodalThermo,
        wave_speed: &W,
    ) -> f64 {
        let mut max = 0.0_f64;
        for p in 0..state.len() {
            let c = wave_speed.estimate(state.u[p], state.w[p], &thermo.get(p));
            if c.is_nan() {
                return f64::NAN;
            }
            max = max.max(c);
        }
        max
    }

    /// Time derivative of `state` at `time`.
    ///
    /// Runs the boundary exchange, evaluates the equation of state on the
    /// interior and all four trace buffers, computes the interface fluxes,
    /// assembles every element and finally applies `forcing`.
    pub fn residual<E, W, F>(
        &self,
        state: &MoistState,
        time: f64,
        workspace: &mut Workspace,
        eos: &E,
        wave_speed: &W,
        forcing: &F,
    ) -> Result<MoistState>
    where
        E: EquationOfState + ?Sized,
        W: WaveSpeed + ?Sized,
        F: Forcing + ?Sized,
    {
        let layout = self.layout();
        state.check_len(layout.n_total())?;

        workspace
            .buffers
            .exchange(state, &self.config.boundaries, &self.geometry.normals)?;
        workspace.thermo.evaluate(eos, state, NodeLocation::Interior)?;
        workspace.edge_thermo.evaluate(eos, &workspace.buffers)?;
        workspace.fluxes.compute(
            &workspace.buffers,
            &workspace.edge_thermo,
            &self.geometry.normals,
            &self.config.boundaries,
            self.config.dissipation,
            wave_speed,
        );

        let nn = layout.nodes_per_element();
        let mut tendency = MoistState::zeros(layout.n_total());

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            let ws = &*workspace;
            tendency
                .par_element_blocks_mut(nn)
                .enumerate()
                .for_each_init(
                    || KernelScratch::new(nn),
                    |scratch, (e, block)| self.element_kernel(e, state, ws, scratch, block),
                );
        }

        #[cfg(not(feature = "parallel"))]
        {
            let mut scratch = KernelScratch::new(nn);
            for (e, block) in tendency.element_blocks_mut(nn).enumerate() {
                self.element_kernel(e, state, workspace, &mut scratch, block);
            }
        }

        let ctx = ForcingContext {
            time,
            mesh: &self.mesh,
            gravity: self.config.gravity,
            thermo: &workspace.thermo,
        };
        forcing.apply(&ctx, state, &mut tendency);

        if log_enabled!(Level::Trace) {
            for field in Field::ALL {
                trace!(
                    "t = {:.6e}: max |d{}/dt| = {:.3e}",
                    time,
                    field.name(),
                    tendency.max_abs(field)
                );
            }
        }

        Ok(tendency)
    }

    fn element_kernel(
        &self,
        e: usize,
        state: &MoistState,
        ws: &Workspace,
        s: &mut KernelScratch,
        block: ElementBlockMut<'_>,
    ) {
        let nn = self.layout().nodes_per_element();
        let r = e * nn..(e + 1) * nn;
        let reference = &self.reference;
        let metrics = self.geometry.element(e);
        let normals = &self.geometry.normals;
        let edges = &self.edges[e * 4 * reference.n_1d..(e + 1) * 4 * reference.n_1d];
        let gravity = self.config.gravity;
        let coriolis = self.config.coriolis;

        let u = &state.u[r.clone()];
        let w = &state.w[r.clone()];
        let h = &state.h[r.clone()];
        let density_potential = &ws.thermo.density_potential[r.clone()];

        let ElementBlockMut {
            u: du,
            w: dw,
            h: dh,
            hs: dhs,
            hqw: dhqw,
        } = block;

        for p in 0..nn {
            s.wj[p] = reference.weights[p] * metrics.jacobian[p];
            s.fx[p] = h[p] * u[p];
            s.fy[p] = h[p] * w[p];
            s.b[p] = 0.5 * (u[p] * u[p] + w[p] * w[p]) + density_potential[p];
        }

        metrics.divergence(reference, &s.fx, &s.fy, &mut s.grad, &mut s.div);
        metrics.gradient(reference, &s.b, &mut s.grad, &mut s.db_dx, &mut s.db_dy);
        metrics.gradient(reference, u, &mut s.grad, &mut s.spare, &mut s.du_dy);
        metrics.gradient(reference, w, &mut s.grad, &mut s.dw_dx, &mut s.spare);

        for p in 0..nn {
            let vorticity = s.dw_dx[p] - s.du_dy[p] + coriolis;
            dh[p] = -s.wj[p] * s.div[p];
            du[p] = s.wj[p] * (-s.db_dx[p] + vorticity * w[p]);
            dw[p] = s.wj[p] * (-s.db_dy[p] - vorticity * u[p]);
        }

        for node in edges {
            let sides = ws.sides(normals, node.family);
            let k = node.interface;
            let p = node.local;
            let sign = node.sign();
            let set = sides.fluxes;

            let (own, n_own, f_own, b_own) = if node.own_minus {
                (sides.minus, sides.normal_minus[k], set.mass_minus[k], set.bernoulli_minus[k])
            } else {
                (sides.plus, sides.normal_plus[k], set.mass_plus[k], set.bernoulli_plus[k])
            };
            let n_out = [sign * n_own[0], sign * n_own[1]];

            dh[p] -= sign * (set.mass_flux[k] - f_own) * node.weight;

            let db = (set.bernoulli_flux[k] - b_own) * node.weight;
            du[p] -= db * n_out[0];
            dw[p] -= db * n_out[1];

            let u_star = central_flux(sides.minus.u[k], sides.plus.u[k]);
            let w_star = central_flux(sides.minus.w[k], sides.plus.w[k]);
            let d_vorticity = ((w_star - own.w[k]) * n_out[0] - (u_star - own.u[k]) * n_out[1])
                * node.weight;
            du[p] += own.w[k] * d_vorticity;
            dw[p] -= own.u[k] * d_vorticity;
        }

        for tracer in Tracer::ALL {
            if tracer == Tracer::Water && !self.config.physics.transports_water() {
                continue;
            }
            let t = tracer.index();
            let hq = &state.field(tracer.field())[r.clone()];
            let mu = &ws.thermo.potential(tracer)[r.clone()];
            let dq: &mut [f64] = match tracer {
                Tracer::Entropy => &mut *dhs,
                Tracer::Water => &mut *dhqw,
            };

            for p in 0..nn {
                s.q[p] = hq[p] / h[p];
                s.qfx[p] = s.q[p] * s.fx[p];
                s.qfy[p] = s.q[p] * s.fy[p];
                s.mq[p] = mu[p] * s.q[p];
            }

            metrics.divergence(reference, &s.qfx, &s.qfy, &mut s.grad, &mut s.div_q);
            metrics.gradient(reference, &s.q, &mut s.grad, &mut s.dq_dx, &mut s.dq_dy);
            metrics.gradient(reference, mu, &mut s.grad, &mut s.dmu_dx, &mut s.dmu_dy);
            metrics.gradient(reference, &s.mq, &mut s.grad, &mut s.dmq_dx, &mut s.dmq_dy);

            for p in 0..nn {
                let half_wj = 0.5 * s.wj[p];
                dq[p] = -half_wj
                    * (s.div_q[p]
                        + s.q[p] * s.div[p]
                        + s.fx[p] * s.dq_dx[p]
                        + s.fy[p] * s.dq_dy[p]);
                du[p] -= half_wj * (s.q[p] * s.dmu_dx[p] + s.dmq_dx[p] - mu[p] * s.dq_dx[p]);
                dw[p] -= half_wj * (s.q[p] * s.dmu_dy[p] + s.dmq_dy[p] - mu[p] * s.dq_dy[p]);
            }

            for node in edges {
                let sides = ws.sides(normals, node.family);
                let k = node.interface;
                let p = node.local;
                let sign = node.sign();
                let set = sides.fluxes;

                let q_hat = set.tracer_hat[t][k];
                let mu_minus = sides.thermo_minus.potential(tracer)[k];
                let mu_plus = sides.thermo_plus.potential(tracer)[k];
                let (n_own, f_own, q_own, mu_own) = if node.own_minus {
                    (sides.normal_minus[k], set.mass_minus[k], set.tracer_minus[t][k], mu_minus)
                } else {
                    (sides.normal_plus[k], set.mass_plus[k], set.tracer_plus[t][k], mu_plus)
                };

                dq[p] -= sign * (q_hat * set.mass_flux[k] - q_own * f_own) * node.weight;

                let dmu = q_hat * (central_flux(mu_minus, mu_plus) - mu_own) * node.weight;
                du[p] -= dmu * sign * n_own[0];
                dw[p] -= dmu * sign * n_own[1];
            }
        }

        for p in 0..nn {
            let inv = 1.0 / s.wj[p];
            dh[p] *= inv;
            du[p] *= inv;
            dw[p] = dw[p] * inv - gravity;
            dhs[p] *= inv;
            dhqw[p] *= inv;
        }
    }
}

/// Edge nodes of every element in element order: top, bottom, right, left.
fn edge_nodes(
    layout: &NodeLayout,
    reference: &ReferenceElement,
    geometry: &CurvilinearGeometry,
) -> Vec<EdgeNode> {
    let n = layout.n;
    let nn = layout.nodes_per_element();
    let w1d = &reference.weights_1d;
    let mut edges = Vec::with_capacity(layout.n_elements() * 4 * n);

    for e in 0..layout.n_elements() {
        let (row, col) = layout.element_coords(e);
        let base = e * nn;

        for j in 0..n {
            let local = layout.local(n - 1, j);
            edges.push(EdgeNode {
                local,
                interface: layout.vertical(row + 1, col, j),
                family: Family::Vertical,
                own_minus: true,
                weight: w1d[j] * geometry.edge_xi[base + local],
            });
        }
        for j in 0..n {
            let local = layout.local(0, j);
            edges.push(EdgeNode {
                local,
                interface: layout.vertical(row, col, j),
                family: Family::Vertical,
                own_minus: false,
                weight: w1d[j] * geometry.edge_xi[base + local],
            });
        }
        for i in 0..n {
            let local = layout.local(i, n - 1);
            edges.push(EdgeNode {
                local,
                interface: layout.horizontal(row, col + 1, i),
                family: Family::Horizontal,
                own_minus: true,
                weight: w1d[i] * geometry.edge_eta[base + local],
            });
        }
        for i in 0..n {
            let local = layout.local(i, 0);
            edges.push(EdgeNode {
                local,
                interface: layout.horizontal(row, col, i),
                family: Family::Horizontal,
                own_minus: false,
                weight: w1d[i] * geometry.edge_eta[base + local],
            });
        }
    }

    edges
}
