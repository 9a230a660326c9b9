//! Snapshot of the conserved state and clock.
//!
//! The format is left to the caller: with the `serde` feature the snapshot
//! derives `Serialize`/`Deserialize` and can be written with any serde
//! backend.

use super::state::MoistState;
use crate::error::{Result, SolverError};
use crate::mesh::NodeLayout;

/// Everything needed to resume a run on the same mesh.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Checkpoint {
    pub time: f64,
    pub step: usize,
    pub layout: NodeLayout,
    pub state: MoistState,
}

impl Checkpoint {
    pub fn new(time: f64, step: usize, layout: NodeLayout, state: MoistState) -> Self {
        Self {
            time,
            step,
            layout,
            state,
        }
    }

    /// Check that this snapshot fits `layout`.
    pub fn validate(&self, layout: NodeLayout) -> Result<()> {
        if self.layout != layout {
            return Err(SolverError::invalid_config(format!(
                "checkpoint layout {}x{} elements with {} nodes per edge does not match \
                 mesh {}x{} with {}",
                self.layout.nx, self.layout.ny, self.layout.n, layout.nx, layout.ny, layout.n
            )));
        }
        if !self.time.is_finite() {
            return Err(SolverError::invalid_config(format!(
                "checkpoint time {} is not finite",
                self.time
            )));
        }
        self.state.check_len(layout.n_total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_layout() {
        let layout = NodeLayout::new(2, 2, 3);
        let cp = Checkpoint::new(1.0, 4, layout, MoistState::zeros(layout.n_total()));
        assert!(cp.validate(layout).is_ok());
        assert!(matches!(
            cp.validate(NodeLayout::new(2, 3, 3)),
            Err(SolverError::InvalidConfig(_))
        ));

        let mut short = cp.clone();
        short.state.hs.pop();
        assert_eq!(
            short.validate(layout).unwrap_err(),
            SolverError::shape_mismatch("hs", 36, 35)
        );
    }
}
