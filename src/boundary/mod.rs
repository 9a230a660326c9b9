//! Domain boundary configuration and interface trace exchange.
//!
//! The structured mesh has two kinds of domain edges:
//!
//! | Direction | Default | Alternative |
//! |-----------|---------|-------------|
//! | horizontal (left/right ends) | `Periodic` | `Wall` |
//! | vertical (bottom/top) | `Wall` | `Periodic` |
//!
//! A wall mirrors the adjacent element's own edge value into the exterior
//! trace, except the velocity component along the wall normal, which is
//! removed. The normal follows the mapped mesh, so sloped floors and tilted
//! side walls are handled the same way as flat ones. Mass flux through a
//! wall is removed when the interface fluxes are formed.

mod exchange;

pub use exchange::EdgeBuffers;

/// Treatment of the left and right domain ends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HorizontalBoundary {
    /// Rightmost column feeds leftmost column and vice versa
    #[default]
    Periodic,
    /// No-flux wall, zero velocity normal to the wall
    Wall,
}

/// Treatment of the bottom and top domain edges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VerticalBoundary {
    /// No-flux wall, zero velocity normal to the wall
    #[default]
    Wall,
    /// Top row feeds bottom row and vice versa
    Periodic,
}

/// Boundary treatment for both directions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundaryConfig {
    pub horizontal: HorizontalBoundary,
    pub vertical: VerticalBoundary,
}

impl BoundaryConfig {
    pub fn new(horizontal: HorizontalBoundary, vertical: VerticalBoundary) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// Periodic in both directions (no walls).
    pub fn fully_periodic() -> Self {
        Self::new(HorizontalBoundary::Periodic, VerticalBoundary::Periodic)
    }

    /// Closed box: walls on all four sides.
    pub fn closed_box() -> Self {
        Self::new(HorizontalBoundary::Wall, VerticalBoundary::Wall)
    }

    #[inline]
    pub fn has_vertical_walls(&self) -> bool {
        self.vertical == VerticalBoundary::Wall
    }

    #[inline]
    pub fn has_horizontal_walls(&self) -> bool {
        self.horizontal == HorizontalBoundary::Wall
    }
}
