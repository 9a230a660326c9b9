//! Neighbor-facing trace buffers.
//!
//! For vertical interface `k` (0..=ny) the `up` buffer holds node row 0 of
//! element row `k` and the `down` buffer node row n-1 of element row `k-1`.
//! For horizontal interface `m` (0..=nx) `right` holds node column 0 of
//! element column `m` and `left` node column n-1 of column `m-1`. The
//! outermost entries (k = 0, ny and m = 0, nx) are filled from the boundary
//! treatment. A wall mirrors the interior trace and removes the wall-normal
//! velocity, v_ext = v - (v·n) n, so the exterior carries no flow through
//! the wall on sloped boundaries either.

use super::{BoundaryConfig, HorizontalBoundary, VerticalBoundary};
use crate::error::Result;
use crate::mesh::NodeLayout;
use crate::operators::InterfaceNormals;
use crate::solver::{Field, MoistState};

/// Trace values on both sides of every interface node, for every field.
#[derive(Clone, Debug)]
pub struct EdgeBuffers {
    layout: NodeLayout,
    /// Above each vertical interface
    pub up: MoistState,
    /// Below each vertical interface
    pub down: MoistState,
    /// Left of each horizontal interface
    pub left: MoistState,
    /// Right of each horizontal interface
    pub right: MoistState,
}

impl EdgeBuffers {
    /// Allocate buffers sized for `layout`.
    pub fn new(layout: NodeLayout) -> Self {
        let vertical = layout.vertical_interface_len();
        let horizontal = layout.horizontal_interface_len();
        Self {
            layout,
            up: MoistState::zeros(vertical),
            down: MoistState::zeros(vertical),
            left: MoistState::zeros(horizontal),
            right: MoistState::zeros(horizontal),
        }
    }

    pub fn layout(&self) -> NodeLayout {
        self.layout
    }

    /// Rebuild every buffer from `state`.
    ///
    /// `normals` are the interface normals of the same mesh; they are only
    /// read on wall interfaces. The only failure is a state whose length
    /// does not match the layout.
    pub fn exchange(
        &mut self,
        state: &MoistState,
        boundaries: &BoundaryConfig,
        normals: &InterfaceNormals,
    ) -> Result<()> {
        state.check_len(self.layout.n_total())?;

        for field in Field::ALL {
            let src = state.field(field);
            self.fill_vertical(field, src, boundaries.vertical);
            self.fill_horizontal(field, src, boundaries.horizontal);
        }

        let l = self.layout;
        if boundaries.has_vertical_walls() {
            for col in 0..l.nx {
                for j in 0..l.n {
                    let top = l.vertical(l.ny, col, j);
                    let bottom = l.vertical(0, col, j);
                    remove_normal_flow(&mut self.up, top, normals.up[top]);
                    remove_normal_flow(&mut self.down, bottom, normals.down[bottom]);
                }
            }
        }
        if boundaries.has_horizontal_walls() {
            for row in 0..l.ny {
                for i in 0..l.n {
                    let east = l.horizontal(row, l.nx, i);
                    let west = l.horizontal(row, 0, i);
                    remove_normal_flow(&mut self.right, east, normals.right[east]);
                    remove_normal_flow(&mut self.left, west, normals.left[west]);
                }
            }
        }
        Ok(())
    }

    fn fill_vertical(&mut self, field: Field, src: &[f64], boundary: VerticalBoundary) {
        let l = self.layout;
        let n = l.n;
        let up = self.up.field_mut(field);
        let down = self.down.field_mut(field);

        for col in 0..l.nx {
            for j in 0..n {
                for k in 0..l.ny {
                    up[l.vertical(k, col, j)] = src[l.node(k, col, 0, j)];
                    down[l.vertical(k + 1, col, j)] = src[l.node(k, col, n - 1, j)];
                }

                let top = l.vertical(l.ny, col, j);
                let bottom = l.vertical(0, col, j);
                match boundary {
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
    }

    fn fill_horizontal(&mut self, field: Field, src: &[f64], boundary: HorizontalBoundary) {
        let l = self.layout;
        let n = l.n;
        let left = self.left.field_mut(field);
        let right = self.right.field_mut(field);

        for row in 0..l.ny {
            for i in 0..n {
                for m in 0..l.nx {
                    right[l.horizontal(row, m, i)] = src[l.node(row, m, i, 0)];
                    left[l.horizontal(row, m + 1, i)] = src[l.node(row, m, i, n - 1)];
                }

                let east = l.horizontal(row, l.nx, i);
                let west = l.horizontal(row, 0, i);
                match boundary {
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
    }
}

/// Subtract the component of the velocity at `idx` along the unit normal `n`.
#[inline]
fn remove_normal_flow(exterior: &mut MoistState, idx: usize, n: [f64; 2]) {
    let vn = exterior.u[idx] * n[0] + exterior.w[idx] * n[1];
    exterior.u[idx] -= vn * n[0];
    exterior.w[idx] -= vn * n[1];
}
