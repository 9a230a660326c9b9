//! Reference-element operators and curvilinear metric terms.
//!
//! This module provides:
//! - the 1D Lagrange differentiation matrix on GLL nodes
//! - the tensor-product reference element (`ReferenceElement`)
//! - per-node geometric factors of the mapped mesh (`CurvilinearGeometry`)

mod differentiation;
mod geometric;
mod reference;

pub use differentiation::{barycentric_weights, lagrange_derivative_matrix};
pub use geometric::{CurvilinearGeometry, ElementMetrics, GradientScratch, InterfaceNormals};
pub use reference::ReferenceElement;
