//! Curvilinear geometric factors for the structured element grid.
//!
//! Each element is mapped from the reference square by the polynomial
//! interpolant of its node positions, so the metric terms vary per node:
//!
//! ∂u/∂x = ξ_x ∂u/∂ξ + η_x ∂u/∂η
//! ∂u/∂y = ξ_y ∂u/∂ξ + η_y ∂u/∂η
//!
//! with ξ_x = y_η / J, ξ_y = -x_η / J, η_x = -y_ξ / J, η_y = x_ξ / J and
//! J = x_ξ y_η - x_η y_ξ.
//!
//! Interface normals are unit vectors along ∇η (vertical interfaces) and ∇ξ
//! (horizontal interfaces), stored once per interface node for both sides.

use log::debug;

use super::reference::ReferenceElement;
use crate::boundary::{BoundaryConfig, HorizontalBoundary, VerticalBoundary};
use crate::error::{Result, SolverError};
use crate::mesh::{NodeLayout, StructuredMesh};

/// Unit normals on both sides of every interface node.
///
/// `up`/`down` live on the (ny+1) × nx × n vertical interfaces and point
/// along ∇η; `left`/`right` live on the ny × (nx+1) × n horizontal
/// interfaces and point along ∇ξ.
#[derive(Clone, Debug)]
pub struct InterfaceNormals {
    pub up: Vec<[f64; 2]>,
    pub down: Vec<[f64; 2]>,
    pub left: Vec<[f64; 2]>,
    pub right: Vec<[f64; 2]>,
}

/// Per-node metric terms of the whole mesh.
#[derive(Clone, Debug)]
pub struct CurvilinearGeometry {
    pub layout: NodeLayout,

    /// Covariant terms ∂x/∂ξ, ∂x/∂η, ∂y/∂ξ, ∂y/∂η
    pub dx_dxi: Vec<f64>,
    pub dx_deta: Vec<f64>,
    pub dy_dxi: Vec<f64>,
    pub dy_deta: Vec<f64>,

    /// Jacobian determinant, positive everywhere
    pub jacobian: Vec<f64>,

    /// Contravariant terms ∂ξ/∂x, ∂ξ/∂y, ∂η/∂x, ∂η/∂y
    pub dxi_dx: Vec<f64>,
    pub dxi_dy: Vec<f64>,
    pub deta_dx: Vec<f64>,
    pub deta_dy: Vec<f64>,

    /// |∂x/∂ξ|: length scale of η = const edges
    pub edge_xi: Vec<f64>,
    /// |∂x/∂η|: length scale of ξ = const edges
    pub edge_eta: Vec<f64>,

    pub normals: InterfaceNormals,
}

/// Borrowed metric terms of a single element block.
#[derive(Clone, Copy, Debug)]
pub struct ElementMetrics<'a> {
    pub jacobian: &'a [f64],
    pub dxi_dx: &'a [f64],
    pub dxi_dy: &'a [f64],
    pub deta_dx: &'a [f64],
    pub deta_dy: &'a [f64],
    pub edge_xi: &'a [f64],
    pub edge_eta: &'a [f64],
}

/// Reference-direction derivative buffers reused across gradient calls.
#[derive(Clone, Debug)]
pub struct GradientScratch {
    d_xi: Vec<f64>,
    d_eta: Vec<f64>,
}

impl GradientScratch {
    pub fn new(n_nodes: usize) -> Self {
        Self {
            d_xi: vec![0.0; n_nodes],
            d_eta: vec![0.0; n_nodes],
        }
    }
}

impl ElementMetrics<'_> {
    /// Physical gradient of a nodal block by the chain rule.
    pub fn gradient(
        &self,
        reference: &ReferenceElement,
        q: &[f64],
        scratch: &mut GradientScratch,
        dq_dx: &mut [f64],
        dq_dy: &mut [f64],
    ) {
        reference.apply_d_xi(q, &mut scratch.d_xi);
        reference.apply_d_eta(q, &mut scratch.d_eta);
        for p in 0..q.len() {
            let (a, b) = (scratch.d_xi[p], scratch.d_eta[p]);
            dq_dx[p] = a * self.dxi_dx[p] + b * self.deta_dx[p];
            dq_dy[p] = a * self.dxi_dy[p] + b * self.deta_dy[p];
        }
    }

    /// Physical divergence ∂fx/∂x + ∂fy/∂y of a nodal vector block.
    pub fn divergence(
        &self,
        reference: &ReferenceElement,
        fx: &[f64],
        fy: &[f64],
        scratch: &mut GradientScratch,
        out: &mut [f64],
    ) {
        reference.apply_d_xi(fx, &mut scratch.d_xi);
        reference.apply_d_eta(fx, &mut scratch.d_eta);
        for p in 0..fx.len() {
            out[p] = scratch.d_xi[p] * self.dxi_dx[p] + scratch.d_eta[p] * self.deta_dx[p];
        }
        reference.apply_d_xi(fy, &mut scratch.d_xi);
        reference.apply_d_eta(fy, &mut scratch.d_eta);
        for p in 0..fy.len() {
            out[p] += scratch.d_xi[p] * self.dxi_dy[p] + scratch.d_eta[p] * self.deta_dy[p];
        }
    }
}

impl CurvilinearGeometry {
    /// Compute metric terms and interface normals.
    ///
    /// Fails with [`SolverError::Geometry`] if the Jacobian is non-positive or
    /// non-finite at any node.
    pub fn compute(
        mesh: &StructuredMesh,
        reference: &ReferenceElement,
        boundaries: &BoundaryConfig,
    ) -> Result<Self> {
        let layout = mesh.layout;
        let nn = layout.nodes_per_element();
        let total = layout.n_total();

        let mut dx_dxi = vec![0.0; total];
        let mut dx_deta = vec![0.0; total];
        let mut dy_dxi = vec![0.0; total];
        let mut dy_deta = vec![0.0; total];

        for e in 0..layout.n_elements() {
            let block = e * nn..(e + 1) * nn;
            reference.apply_d_xi(&mesh.x[block.clone()], &mut dx_dxi[block.clone()]);
            reference.apply_d_eta(&mesh.x[block.clone()], &mut dx_deta[block.clone()]);
            reference.apply_d_xi(&mesh.y[block.clone()], &mut dy_dxi[block.clone()]);
            reference.apply_d_eta(&mesh.y[block.clone()], &mut dy_deta[block]);
        }

        let mut jacobian = vec![0.0; total];
        let mut dxi_dx = vec![0.0; total];
        let mut dxi_dy = vec![0.0; total];
        let mut deta_dx = vec![0.0; total];
        let mut deta_dy = vec![0.0; total];
        let mut edge_xi = vec![0.0; total];
        let mut edge_eta = vec![0.0; total];

        for p in 0..total {
            let det = dx_dxi[p] * dy_deta[p] - dx_deta[p] * dy_dxi[p];
            if !(det > 0.0) || !det.is_finite() {
                let (row, col) = layout.element_coords(p / nn);
                return Err(SolverError::Geometry {
                    row,
                    col,
                    node: p % nn,
                    jacobian: det,
                });
            }
            jacobian[p] = det;
            dxi_dx[p] = dy_deta[p] / det;
            dxi_dy[p] = -dx_deta[p] / det;
            deta_dx[p] = -dy_dxi[p] / det;
            deta_dy[p] = dx_dxi[p] / det;
            edge_xi[p] = dx_dxi[p].hypot(dy_dxi[p]);
            edge_eta[p] = dx_deta[p].hypot(dy_deta[p]);
        }

        let normals = interface_normals(&layout, boundaries, &dxi_dx, &dxi_dy, &deta_dx, &deta_dy);

        let (j_min, j_max) = jacobian
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &j| {
                (lo.min(j), hi.max(j))
            });
        debug!(
            "geometry: {} x {} elements, order {}, J in [{:.4e}, {:.4e}]",
            layout.nx, layout.ny, reference.order, j_min, j_max
        );

        Ok(Self {
            layout,
            dx_dxi,
            dx_deta,
            dy_dxi,
            dy_deta,
            jacobian,
            dxi_dx,
            dxi_dy,
            deta_dx,
            deta_dy,
            edge_xi,
            edge_eta,
            normals,
        })
    }

    /// Metric terms of element `e`.
    pub fn element(&self, e: usize) -> ElementMetrics<'_> {
        let nn = self.layout.nodes_per_element();
        let r = e * nn..(e + 1) * nn;
        ElementMetrics {
            jacobian: &self.jacobian[r.clone()],
            dxi_dx: &self.dxi_dx[r.clone()],
            dxi_dy: &self.dxi_dy[r.clone()],
            deta_dx: &self.deta_dx[r.clone()],
            deta_dy: &self.deta_dy[r.clone()],
            edge_xi: &self.edge_xi[r.clone()],
            edge_eta: &self.edge_eta[r],
        }
    }

    /// ∂q/∂x and ∂q/∂y of a full nodal field.
    pub fn physical_gradient(
        &self,
        reference: &ReferenceElement,
        q: &[f64],
    ) -> (Vec<f64>, Vec<f64>) {
        let nn = self.layout.nodes_per_element();
        let mut dq_dx = vec![0.0; q.len()];
        let mut dq_dy = vec![0.0; q.len()];
        let mut scratch = GradientScratch::new(nn);

        for (e, ((qb, gx), gy)) in q
            .chunks(nn)
            .zip(dq_dx.chunks_mut(nn))
            .zip(dq_dy.chunks_mut(nn))
            .enumerate()
        {
            self.element(e).gradient(reference, qb, &mut scratch, gx, gy);
        }

        (dq_dx, dq_dy)
    }
}

fn unit(x: f64, y: f64) -> [f64; 2] {
    let norm = x.hypot(y);
    [x / norm, y / norm]
}

fn interface_normals(
    layout: &NodeLayout,
    boundaries: &BoundaryConfig,
    dxi_dx: &[f64],
    dxi_dy: &[f64],
    deta_dx: &[f64],
    deta_dy: &[f64],
) -> InterfaceNormals {
    let NodeLayout { ny, nx, n } = *layout;
    let eta_normal = |p: usize| unit(deta_dx[p], deta_dy[p]);
    let xi_normal = |p: usize| unit(dxi_dx[p], dxi_dy[p]);

    let mut up = vec![[0.0; 2]; layout.vertical_interface_len()];
    let mut down = vec![[0.0; 2]; layout.vertical_interface_len()];
    for col in 0..nx {
        for j in 0..n {
            for k in 0..ny {
                up[layout.vertical(k, col, j)] = eta_normal(layout.node(k, col, 0, j));
                down[layout.vertical(k + 1, col, j)] = eta_normal(layout.node(k, col, n - 1, j));
            }
            let (top, bottom) = (layout.vertical(ny, col, j), layout.vertical(0, col, j));
            match boundaries.vertical {
                VerticalBoundary::Periodic => {
                    up[top] = up[bottom];
                    down[bottom] = down[top];
                }
                VerticalBoundary::Wall => {
                    up[top] = down[top];
                    down[bottom] = up[bottom];
                }
            }
        }
    }

    let mut left = vec![[0.0; 2]; layout.horizontal_interface_len()];
    let mut right = vec![[0.0; 2]; layout.horizontal_interface_len()];
    for row in 0..ny {
        for i in 0..n {
            for m in 0..nx {
                right[layout.horizontal(row, m, i)] = xi_normal(layout.node(row, m, i, 0));
                left[layout.horizontal(row, m + 1, i)] = xi_normal(layout.node(row, m, i, n - 1));
            }
            let (east, west) = (layout.horizontal(row, nx, i), layout.horizontal(row, 0, i));
            match boundaries.horizontal {
                HorizontalBoundary::Periodic => {
                    right[east] = right[west];
                    left[west] = left[east];
                }
                HorizontalBoundary::Wall => {
                    right[east] = left[east];
                    left[west] = right[west];
                }
            }
        }
    }

    InterfaceNormals {
        up,
        down,
        left,
        right,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{MappedDomain, RectangularDomain, SkewedDomain};

    fn build<M: crate::mesh::DomainMap>(
        map: &M,
        order: usize,
        nx: usize,
        ny: usize,
    ) -> Result<(ReferenceElement, StructuredMesh, CurvilinearGeometry)> {
        let reference = ReferenceElement::new(order)?;
        let mesh = StructuredMesh::new(map, nx, ny, &reference)?;
        let geometry =
            CurvilinearGeometry::compute(&mesh, &reference, &BoundaryConfig::default())?;
        Ok((reference, mesh, geometry))
    }

    #[test]
    fn test_rectangle_metrics_are_constant() {
        // 2 x 2 elements on [0, 4] x [0, 2]: each element 2 x 1
        let domain = RectangularDomain::new((0.0, 4.0), (0.0, 2.0));
        let (_, _, g) = build(&domain, 3, 2, 2).unwrap();

        for p in 0..g.layout.n_total() {
            assert!((g.dx_dxi[p] - 1.0).abs() < 1e-12);
            assert!((g.dy_deta[p] - 0.5).abs() < 1e-12);
            assert!(g.dx_deta[p].abs() < 1e-12);
            assert!(g.dy_dxi[p].abs() < 1e-12);
            assert!((g.jacobian[p] - 0.5).abs() < 1e-12);
            assert!((g.edge_xi[p] - 1.0).abs() < 1e-12);
            assert!((g.edge_eta[p] - 0.5).abs() < 1e-12);
        }
        for nrm in g.normals.up.iter().chain(&g.normals.down) {
            assert!(nrm[0].abs() < 1e-12 && (nrm[1] - 1.0).abs() < 1e-12);
        }
        for nrm in g.normals.left.iter().chain(&g.normals.right) {
            assert!((nrm[0] - 1.0).abs() < 1e-12 && nrm[1].abs() < 1e-12);
        }
    }

    #[test]
    fn test_skewed_normals_are_unit() {
        let domain = SkewedDomain::new(RectangularDomain::new((0.0, 1.0), (0.0, 1.0)), 0.3);
        let (_, _, g) = build(&domain, 2, 3, 2).unwrap();
        for nrm in g.normals.up.iter().chain(&g.normals.left) {
            assert!((nrm[0].hypot(nrm[1]) - 1.0).abs() < 1e-12);
        }
        // ∇ξ is perpendicular to the slanted ξ = const lines
        let nrm = g.normals.right[0];
        assert!((nrm[0] - 0.3f64.cos()).abs() < 1e-12);
        assert!((nrm[1] + 0.3f64.sin()).abs() < 1e-12);
    }

    #[test]
    fn test_inverted_map_fails() {
        let flipped = MappedDomain::new(|s: f64, _t: f64| 1.0 - s, |_s: f64, t: f64| t);
        let err = build(&flipped, 2, 2, 2).err().unwrap();
        assert!(matches!(err, SolverError::Geometry { jacobian, .. } if jacobian < 0.0));
    }

    #[test]
    fn test_physical_gradient_of_linear_field() {
        let domain = MappedDomain::new(
            |s: f64, t: f64| s + 0.1 * (std::f64::consts::PI * t).sin(),
            |s: f64, t: f64| t + 0.05 * s * s,
        );
        let (reference, mesh, g) = build(&domain, 4, 3, 3).unwrap();
        let q: Vec<f64> = mesh
            .x
            .iter()
            .zip(&mesh.y)
            .map(|(&x, &y)| 2.0 * x - 3.0 * y)
            .collect();
        let (dq_dx, dq_dy) = g.physical_gradient(&reference, &q);
        for p in 0..q.len() {
            assert!((dq_dx[p] - 2.0).abs() < 1e-10);
            assert!((dq_dy[p] + 3.0).abs() < 1e-10);
        }
    }
}
