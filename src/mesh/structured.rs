//! Structured element grid with mapped collocation nodes.

use super::domain::DomainMap;
use super::layout::NodeLayout;
use crate::error::{Result, SolverError};
use crate::operators::ReferenceElement;

/// Logical nx × ny quadrilateral grid and the physical position of every node.
#[derive(Clone, Debug)]
pub struct StructuredMesh {
    /// Array shapes
    pub layout: NodeLayout,
    /// Physical x of every collocation node
    pub x: Vec<f64>,
    /// Physical y of every collocation node
    pub y: Vec<f64>,
    /// Element corners, counter-clockwise from bottom-left
    pub corners: Vec<[(f64, f64); 4]>,
    min_spacing: f64,
}

impl StructuredMesh {
    /// Build the mesh by mapping the logical position of each GLL node.
    ///
    /// Node (i, j) of element (row, col) sits at logical coordinates
    /// ((col + (1+ξ_j)/2) / nx, (row + (1+η_i)/2) / ny).
    pub fn new<M: DomainMap + ?Sized>(
        map: &M,
        nx: usize,
        ny: usize,
        reference: &ReferenceElement,
    ) -> Result<Self> {
        if nx == 0 || ny == 0 {
            return Err(SolverError::invalid_config(format!(
                "mesh needs at least one element per direction, got {nx} x {ny}"
            )));
        }

        let n = reference.n_1d;
        let layout = NodeLayout::new(ny, nx, n);
        let mut x = vec![0.0; layout.n_total()];
        let mut y = vec![0.0; layout.n_total()];
        let mut corners = Vec::with_capacity(layout.n_elements());

        let ds = 1.0 / nx as f64;
        let dt = 1.0 / ny as f64;

        for row in 0..ny {
            for col in 0..nx {
                let s0 = col as f64 * ds;
                let t0 = row as f64 * dt;
                for i in 0..n {
                    let t = t0 + 0.5 * (1.0 + reference.nodes_1d[i]) * dt;
                    for j in 0..n {
                        let s = s0 + 0.5 * (1.0 + reference.nodes_1d[j]) * ds;
                        let (px, py) = map.map(s, t);
                        if !px.is_finite() || !py.is_finite() {
                            return Err(SolverError::invalid_config(format!(
                                "domain map is not finite at logical ({s}, {t})"
                            )));
                        }
                        let idx = layout.node(row, col, i, j);
                        x[idx] = px;
                        y[idx] = py;
                    }
                }
                corners.push([
                    map.map(s0, t0),
                    map.map(s0 + ds, t0),
                    map.map(s0 + ds, t0 + dt),
                    map.map(s0, t0 + dt),
                ]);
            }
        }

        let min_spacing = corners
            .iter()
            .flat_map(|c| (0..4).map(move |e| distance(c[e], c[(e + 1) % 4])))
            .fold(f64::INFINITY, f64::min);

        if !(min_spacing > 0.0) {
            return Err(SolverError::invalid_config(
                "domain map collapses an element edge to zero length",
            ));
        }

        Ok(Self {
            layout,
            x,
            y,
            corners,
            min_spacing,
        })
    }

    #[inline]
    pub fn nx(&self) -> usize {
        self.layout.nx
    }

    #[inline]
    pub fn ny(&self) -> usize {
        self.layout.ny
    }

    #[inline]
    pub fn element_index(&self, row: usize, col: usize) -> usize {
        self.layout.element(row, col)
    }

    /// Flat index of node (i, j) of element (row, col).
    #[inline]
    pub fn node_index(&self, row: usize, col: usize, i: usize, j: usize) -> usize {
        self.layout.node(row, col, i, j)
    }

    /// Corners of element (row, col), counter-clockwise from bottom-left.
    pub fn element_corners(&self, row: usize, col: usize) -> [(f64, f64); 4] {
        self.corners[self.layout.element(row, col)]
    }

    /// Shortest physical element edge in the mesh.
    pub fn min_spacing(&self) -> f64 {
        self.min_spacing
    }

    /// Highest node in the mesh.
    pub fn y_max(&self) -> f64 {
        self.y.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Node coordinates as (x, y).
    #[inline]
    pub fn position(&self, node: usize) -> (f64, f64) {
        (self.x[node], self.y[node])
    }
}

fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt()
}
