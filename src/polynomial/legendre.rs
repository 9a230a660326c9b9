//! Legendre polynomial evaluation.
//!
//! Bonnet recurrence: (k+1) P_{k+1}(x) = (2k+1) x P_k(x) - k P_{k-1}(x)

/// Returns (P_n(x), P_{n-1}(x)); P_{-1} is taken as zero.
fn legendre_pair(n: usize, x: f64) -> (f64, f64) {
    let mut prev = 0.0;
    let mut curr = 1.0;
    for k in 0..n {
        let next = ((2 * k + 1) as f64 * x * curr - k as f64 * prev) / (k + 1) as f64;
        prev = curr;
        curr = next;
    }
    (curr, prev)
}

/// Evaluate P_n(x).
pub fn legendre(n: usize, x: f64) -> f64 {
    legendre_pair(n, x).0
}

/// Evaluate P_n(x) and P'_n(x) with one pass of the recurrence.
///
/// At the endpoints the derivative uses the closed form
/// P'_n(±1) = (±1)^{n+1} n(n+1)/2.
pub fn legendre_and_derivative(n: usize, x: f64) -> (f64, f64) {
    if n == 0 {
        return (1.0, 0.0);
    }
    let (p_n, p_prev) = legendre_pair(n, x);
    let end = (n * (n + 1)) as f64 / 2.0;

    let dp_n = if (x - 1.0).abs() < 1e-14 {
        end
    } else if (x + 1.0).abs() < 1e-14 {
        if n % 2 == 0 { -end } else { end }
    } else {
        n as f64 * (x * p_n - p_prev) / (x * x - 1.0)
    };

    (p_n, dp_n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_order_closed_forms() {
        for &x in &[-0.7, -0.1, 0.0, 0.35, 0.9] {
            assert!((legendre(0, x) - 1.0).abs() < 1e-14);
            assert!((legendre(1, x) - x).abs() < 1e-14);
            assert!((legendre(2, x) - 0.5 * (3.0 * x * x - 1.0)).abs() < 1e-14);
            assert!((legendre(3, x) - 0.5 * (5.0 * x.powi(3) - 3.0 * x)).abs() < 1e-14);
        }
    }

    #[test]
    fn test_endpoint_values() {
        for n in 0..8 {
            assert!((legendre(n, 1.0) - 1.0).abs() < 1e-13);
            let sign = if n % 2 == 0 { 1.0 } else { -1.0 };
            assert!((legendre(n, -1.0) - sign).abs() < 1e-13);
        }
    }

    #[test]
    fn test_derivative_matches_finite_difference() {
        let eps = 1e-6;
        for n in 1..7 {
            for &x in &[-0.8, -0.3, 0.2, 0.6] {
                let (_, dp) = legendre_and_derivative(n, x);
                let fd = (legendre(n, x + eps) - legendre(n, x - eps)) / (2.0 * eps);
                assert!((dp - fd).abs() < 1e-7, "n={n}, x={x}: {dp} vs {fd}");
            }
        }
    }

    #[test]
    fn test_derivative_at_endpoints() {
        // P'_3(x) = (15x^2 - 3)/2
        assert!((legendre_and_derivative(3, 1.0).1 - 6.0).abs() < 1e-14);
        assert!((legendre_and_derivative(3, -1.0).1 - 6.0).abs() < 1e-14);
        // P'_2(x) = 3x
        assert!((legendre_and_derivative(2, -1.0).1 + 3.0).abs() < 1e-14);
    }
}
