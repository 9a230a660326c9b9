//! Structured curvilinear quadrilateral mesh.
//!
//! Elements are indexed by (row, col) on a logical nx × ny grid covering
//! [0, 1]². A [`DomainMap`] sends logical coordinates to physical space, so
//! the same grid describes rectangles, sheared boxes and terrain-following
//! domains.
//!
//! Edge convention used throughout the crate:
//! - bottom / top edges are η = ∓1 (node rows 0 and n-1)
//! - left / right edges are ξ = ∓1 (node columns 0 and n-1)

mod domain;
mod layout;
mod structured;

pub use domain::{DomainMap, MappedDomain, RectangularDomain, SkewedDomain};
pub use layout::NodeLayout;
pub use structured::StructuredMesh;
