//! Reference quadrilateral element [-1, 1]².
//!
//! Nodes are the tensor product of the 1D GLL nodes. Node (i, j) is stored at
//! offset `i * n + j`: `i` runs along η (upward), `j` along ξ (rightward).

use faer::Mat;

use super::differentiation::lagrange_derivative_matrix;
use crate::error::{Result, SolverError};
use crate::polynomial::GllRule;

/// Nodes, weights and the 1D derivative matrix of the reference element.
#[derive(Clone, Debug)]
pub struct ReferenceElement {
    /// Polynomial order p
    pub order: usize,
    /// Nodes per direction (p + 1)
    pub n_1d: usize,
    /// Nodes per element (p + 1)²
    pub n_nodes: usize,
    /// 1D GLL nodes
    pub nodes_1d: Vec<f64>,
    /// 1D GLL weights, also the edge quadrature weights
    pub weights_1d: Vec<f64>,
    /// Tensor weights w[i*n + j] = w_i w_j
    pub weights: Vec<f64>,
    /// 1D derivative matrix D[i,j] = ℓ'_j(x_i)
    pub d: Mat<f64>,
}

impl ReferenceElement {
    /// Build the reference element of polynomial order `order` (≥ 1).
    pub fn new(order: usize) -> Result<Self> {
        if order == 0 {
            return Err(SolverError::invalid_config(
                "polynomial order must be at least 1",
            ));
        }

        let rule = GllRule::new(order);
        let n_1d = rule.len();
        let d = lagrange_derivative_matrix(&rule.nodes);

        let mut weights = Vec::with_capacity(n_1d * n_1d);
        for &wi in &rule.weights {
            for &wj in &rule.weights {
                weights.push(wi * wj);
            }
        }

        Ok(Self {
            order,
            n_1d,
            n_nodes: n_1d * n_1d,
            nodes_1d: rule.nodes,
            weights_1d: rule.weights,
            weights,
            d,
        })
    }

    /// Offset of node (i, j) within an element block.
    #[inline]
    pub fn local(&self, i: usize, j: usize) -> usize {
        i * self.n_1d + j
    }

    /// ∂q/∂ξ on one element block: out[i,j] = Σ_l D[j,l] q[i,l].
    pub fn apply_d_xi(&self, q: &[f64], out: &mut [f64]) {
        let n = self.n_1d;
        debug_assert_eq!(q.len(), self.n_nodes);
        debug_assert_eq!(out.len(), self.n_nodes);

        for i in 0..n {
            let row = &q[i * n..(i + 1) * n];
            for j in 0..n {
                let mut sum = 0.0;
                for (l, &ql) in row.iter().enumerate() {
                    sum += self.d[(j, l)] * ql;
                }
                out[i * n + j] = sum;
            }
        }
    }

    /// ∂q/∂η on one element block: out[i,j] = Σ_k D[i,k] q[k,j].
    pub fn apply_d_eta(&self, q: &[f64], out: &mut [f64]) {
        let n = self.n_1d;
        debug_assert_eq!(q.len(), self.n_nodes);
        debug_assert_eq!(out.len(), self.n_nodes);

        for i in 0..n {
            for j in 0..n {
                let mut sum = 0.0;
                for k in 0..n {
                    sum += self.d[(i, k)] * q[k * n + j];
                }
                out[i * n + j] = sum;
            }
        }
    }
}
