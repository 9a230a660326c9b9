//! Legendre polynomials and Gauss-Lobatto-Legendre quadrature.
//!
//! The GLL rule supplies both the collocation nodes and the quadrature
//! weights of the reference element; with collocated quadrature the mass
//! matrix is diagonal and edge nodes coincide with volume nodes.

mod gll;
mod legendre;

pub use gll::{GllRule, gauss_lobatto_nodes, gauss_lobatto_weights};
pub use legendre::{legendre, legendre_and_derivative};
