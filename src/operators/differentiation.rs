//! Lagrange differentiation matrix on an arbitrary node set.
//!
//! D[i,j] = ℓ'_j(x_i), the derivative of the j-th Lagrange basis polynomial
//! at node i, so that (du/dx)_i = Σ_j D[i,j] u_j for any polynomial u of
//! degree ≤ N sampled at the nodes.
//!
//! Off-diagonal entries use barycentric weights λ_j = 1 / Π_{k≠j}(x_j - x_k):
//!
//! D[i,j] = (λ_j / λ_i) / (x_i - x_j),  i ≠ j
//!
//! and the diagonal is the negative row sum, which makes D annihilate
//! constants to rounding.

use faer::Mat;

/// Barycentric weights λ_j = 1 / Π_{k≠j}(x_j - x_k).
pub fn barycentric_weights(nodes: &[f64]) -> Vec<f64> {
    nodes
        .iter()
        .enumerate()
        .map(|(j, &xj)| {
            let prod: f64 = nodes
                .iter()
                .enumerate()
                .filter(|&(k, _)| k != j)
                .map(|(_, &xk)| xj - xk)
                .product();
            1.0 / prod
        })
        .collect()
}

/// Compute the differentiation matrix D[i,j] = ℓ'_j(x_i).
pub fn lagrange_derivative_matrix(nodes: &[f64]) -> Mat<f64> {
    let n = nodes.len();
    let lambda = barycentric_weights(nodes);
    let mut d = Mat::zeros(n, n);

    for i in 0..n {
        let mut diag = 0.0;
        for j in 0..n {
            if i == j {
                continue;
            }
            let value = (lambda[j] / lambda[i]) / (nodes[i] - nodes[j]);
            d[(i, j)] = value;
            diag -= value;
        }
        d[(i, i)] = diag;
    }

    d
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polynomial::gauss_lobatto_nodes;

    fn apply(d: &Mat<f64>, u: &[f64]) -> Vec<f64> {
        (0..u.len())
            .map(|i| (0..u.len()).map(|j| d[(i, j)] * u[j]).sum())
            .collect()
    }

    #[test]
    fn test_differentiation_constant() {
        for order in 1..=6 {
            let nodes = gauss_lobatto_nodes(order);
            let d = lagrange_derivative_matrix(&nodes);
            let deriv = apply(&d, &vec![1.0; order + 1]);
            for (i, &v) in deriv.iter().enumerate() {
                assert!(v.abs() < 1e-12, "order {order}: d/dx 1 = {v} at node {i}");
            }
        }
    }

    #[test]
    fn test_differentiation_polynomial_exactness() {
        let order = 5;
        let nodes = gauss_lobatto_nodes(order);
        let d = lagrange_derivative_matrix(&nodes);

        for k in 1..=order {
            let u: Vec<f64> = nodes.iter().map(|&x| x.powi(k as i32)).collect();
            let du = apply(&d, &u);
            for (i, (&got, &x)) in du.iter().zip(&nodes).enumerate() {
                let exact = k as f64 * x.powi(k as i32 - 1);
                assert!(
                    (got - exact).abs() < 1e-11,
                    "degree {k}: node {i} expected {exact}, got {got}"
                );
            }
        }
    }

    #[test]
    fn test_known_order_one_matrix() {
        let d = lagrange_derivative_matrix(&[-1.0, 1.0]);
        assert!((d[(0, 0)] + 0.5).abs() < 1e-15);
        assert!((d[(0, 1)] - 0.5).abs() < 1e-15);
        assert!((d[(1, 0)] + 0.5).abs() < 1e-15);
        assert!((d[(1, 1)] - 0.5).abs() < 1e-15);
    }

    #[test]
    fn test_summation_by_parts() {
        // W D + (W D)^T = diag(-1, 0, ..., 0, 1) for GLL collocation
        let order = 4;
        let nodes = gauss_lobatto_nodes(order);
        let weights = crate::polynomial::gauss_lobatto_weights(order, &nodes);
        let d = lagrange_derivative_matrix(&nodes);
        let n = order + 1;

        for i in 0..n {
            for j in 0..n {
                let q = weights[i] * d[(i, j)] + weights[j] * d[(j, i)];
                let expected = match (i, j) {
                    (0, 0) => -1.0,
                    (a, b) if a == n - 1 && b == n - 1 => 1.0,
                    _ => 0.0,
                };
                assert!((q - expected).abs() < 1e-12, "({i}, {j}): {q}");
            }
        }
    }
}
