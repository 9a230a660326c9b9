//! Gauss-Lobatto-Legendre nodes and weights.
//!
//! The N+1 GLL nodes are the roots of (1-x²)P'_N(x): both endpoints plus the
//! N-1 interior extrema of P_N.

use std::f64::consts::PI;

use super::legendre::{legendre, legendre_and_derivative};

/// GLL nodes for polynomial order N, ascending in [-1, 1].
///
/// Interior nodes are found by Newton iteration started from the
/// Chebyshev-Lobatto points. For L(x) = (1-x²)P'_N(x) the identity
/// L'(x) = -N(N+1)P_N(x) gives the update x += (1-x²)P'_N / (N(N+1)P_N).
pub fn gauss_lobatto_nodes(order: usize) -> Vec<f64> {
    match order {
        0 => return vec![0.0],
        1 => return vec![-1.0, 1.0],
        _ => {}
    }

    let n = order;
    let scale = (n * (n + 1)) as f64;
    let mut nodes: Vec<f64> = (0..=n).map(|j| -(PI * j as f64 / n as f64).cos()).collect();
    nodes[0] = -1.0;
    nodes[n] = 1.0;

    for x in nodes.iter_mut().take(n).skip(1) {
        for _ in 0..100 {
            let (p, dp) = legendre_and_derivative(n, *x);
            let update = (1.0 - *x * *x) * dp / (scale * p);
            *x += update;
            if update.abs() < 1e-15 {
                break;
            }
        }
    }

    // Exact symmetry about the origin.
    for j in 0..(n + 1) / 2 {
        let mirrored = 0.5 * (nodes[n - j] - nodes[j]);
        nodes[j] = -mirrored;
        nodes[n - j] = mirrored;
    }
    if n % 2 == 0 {
        nodes[n / 2] = 0.0;
    }

    nodes
}

/// GLL weights w_j = 2 / (N(N+1) P_N(x_j)²).
pub fn gauss_lobatto_weights(order: usize, nodes: &[f64]) -> Vec<f64> {
    if order == 0 {
        return vec![2.0];
    }
    let scale = (order * (order + 1)) as f64;
    nodes
        .iter()
        .map(|&x| {
            let p = legendre(order, x);
            2.0 / (scale * p * p)
        })
        .collect()
}

/// A GLL quadrature rule of a given polynomial order.
#[derive(Clone, Debug)]
pub struct GllRule {
    /// Polynomial order N
    pub order: usize,
    /// N+1 nodes in [-1, 1]
    pub nodes: Vec<f64>,
    /// N+1 positive weights summing to 2
    pub weights: Vec<f64>,
}

impl GllRule {
    /// Build the rule for polynomial order N.
    pub fn new(order: usize) -> Self {
        let nodes = gauss_lobatto_nodes(order);
        let weights = gauss_lobatto_weights(order, &nodes);
        Self {
            order,
            nodes,
            weights,
        }
    }

    /// Number of nodes (N+1).
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false; a rule has at least one node.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Apply the rule to f on [-1, 1].
    pub fn integrate<F: Fn(f64) -> f64>(&self, f: F) -> f64 {
        self.nodes
            .iter()
            .zip(&self.weights)
            .map(|(&x, &w)| w * f(x))
            .sum()
    }
}
