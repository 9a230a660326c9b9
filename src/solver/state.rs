//! Conserved fields of the moist Euler system.
//!
//! The field set is fixed: horizontal velocity u, vertical velocity w,
//! density h, density-weighted entropy hs and density-weighted total water
//! hqw. Every field is a flat array in [`NodeLayout`](crate::mesh::NodeLayout)
//! order; the same struct holds interface trace buffers.

use crate::error::{Result, SolverError};
use crate::time::Integrable;

/// Names of the conserved fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    U,
    W,
    H,
    Hs,
    Hqw,
}

impl Field {
    pub const ALL: [Field; 5] = [Field::U, Field::W, Field::H, Field::Hs, Field::Hqw];

    pub fn name(&self) -> &'static str {
        match self {
            Field::U => "u",
            Field::W => "w",
            Field::H => "h",
            Field::Hs => "hs",
            Field::Hqw => "hqw",
        }
    }
}

/// Density-weighted tracers carried by the mass flux.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tracer {
    /// hs, conjugate to temperature
    Entropy,
    /// hqw, conjugate to the chemical potential
    Water,
}

impl Tracer {
    pub const ALL: [Tracer; 2] = [Tracer::Entropy, Tracer::Water];

    /// The conserved field holding this tracer.
    pub fn field(&self) -> Field {
        match self {
            Tracer::Entropy => Field::Hs,
            Tracer::Water => Field::Hqw,
        }
    }

    #[inline]
    pub fn index(&self) -> usize {
        match self {
            Tracer::Entropy => 0,
            Tracer::Water => 1,
        }
    }
}

/// Struct-of-arrays conserved state.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoistState {
    pub u: Vec<f64>,
    pub w: Vec<f64>,
    pub h: Vec<f64>,
    pub hs: Vec<f64>,
    pub hqw: Vec<f64>,
}

impl MoistState {
    /// All fields zero, each of length `len`.
    pub fn zeros(len: usize) -> Self {
        Self {
            u: vec![0.0; len],
            w: vec![0.0; len],
            h: vec![0.0; len],
            hs: vec![0.0; len],
            hqw: vec![0.0; len],
        }
    }

    /// Assemble from five arrays of equal length.
    pub fn from_fields(
        u: Vec<f64>,
        w: Vec<f64>,
        h: Vec<f64>,
        hs: Vec<f64>,
        hqw: Vec<f64>,
    ) -> Result<Self> {
        let state = Self { u, w, h, hs, hqw };
        state.check_len(state.u.len())?;
        Ok(state)
    }

    /// Number of nodes per field.
    #[inline]
    pub fn len(&self) -> usize {
        self.h.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.h.is_empty()
    }

    pub fn field(&self, field: Field) -> &[f64] {
        match field {
            Field::U => &self.u,
            Field::W => &self.w,
            Field::H => &self.h,
            Field::Hs => &self.hs,
            Field::Hqw => &self.hqw,
        }
    }

    pub fn field_mut(&mut self, field: Field) -> &mut [f64] {
        match field {
            Field::U => &mut self.u,
            Field::W => &mut self.w,
            Field::H => &mut self.h,
            Field::Hs => &mut self.hs,
            Field::Hqw => &mut self.hqw,
        }
    }

    /// Every field must have exactly `expected` entries.
    pub fn check_len(&self, expected: usize) -> Result<()> {
        for field in Field::ALL {
            let actual = self.field(field).len();
            if actual != expected {
                return Err(SolverError::shape_mismatch(field.name(), expected, actual));
            }
        }
        Ok(())
    }

    /// Largest absolute value of one field.
    pub fn max_abs(&self, field: Field) -> f64 {
        self.field(field).iter().fold(0.0_f64, |m, v| m.max(v.abs()))
    }

    /// True when every entry of every field is finite.
    pub fn is_finite(&self) -> bool {
        Field::ALL
            .iter()
            .all(|&f| self.field(f).iter().all(|v| v.is_finite()))
    }

    fn fields_mut(&mut self) -> [&mut Vec<f64>; 5] {
        [
            &mut self.u,
            &mut self.w,
            &mut self.h,
            &mut self.hs,
            &mut self.hqw,
        ]
    }

    fn fields(&self) -> [&Vec<f64>; 5] {
        [&self.u, &self.w, &self.h, &self.hs, &self.hqw]
    }
}

impl Integrable for MoistState {
    fn scale(&mut self, c: f64) {
        for field in self.fields_mut() {
            field.iter_mut().for_each(|v| *v *= c);
        }
    }

    fn axpy(&mut self, c: f64, other: &Self) {
        for (field, o) in self.fields_mut().into_iter().zip(other.fields()) {
            for (v, &x) in field.iter_mut().zip(o) {
                *v += c * x;
            }
        }
    }

    fn zeros_like(&self) -> Self {
        Self::zeros(self.len())
    }
}

/// Mutable view of one element's tendency blocks.
pub struct ElementBlockMut<'a> {
    pub u: &'a mut [f64],
    pub w: &'a mut [f64],
    pub h: &'a mut [f64],
    pub hs: &'a mut [f64],
    pub hqw: &'a mut [f64],
}

impl MoistState {
    /// Split every field into per-element blocks of `nodes_per_element`.
    pub fn element_blocks_mut(
        &mut self,
        nodes_per_element: usize,
    ) -> impl Iterator<Item = ElementBlockMut<'_>> {
        self.u
            .chunks_mut(nodes_per_element)
            .zip(self.w.chunks_mut(nodes_per_element))
            .zip(self.h.chunks_mut(nodes_per_element))
            .zip(self.hs.chunks_mut(nodes_per_element))
            .zip(self.hqw.chunks_mut(nodes_per_element))
            .map(|((((u, w), h), hs), hqw)| ElementBlockMut { u, w, h, hs, hqw })
    }

    /// Parallel version of [`element_blocks_mut`](Self::element_blocks_mut).
    #[cfg(feature = "parallel")]
    pub fn par_element_blocks_mut(
        &mut self,
        nodes_per_element: usize,
    ) -> impl rayon::iter::IndexedParallelIterator<Item = ElementBlockMut<'_>> {
        use rayon::prelude::*;
        self.u
            .par_chunks_mut(nodes_per_element)
            .zip(self.w.par_chunks_mut(nodes_per_element))
            .zip(self.h.par_chunks_mut(nodes_per_element))
            .zip(self.hs.par_chunks_mut(nodes_per_element))
            .zip(self.hqw.par_chunks_mut(nodes_per_element))
            .map(|((((u, w), h), hs), hqw)| ElementBlockMut { u, w, h, hs, hqw })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axpy_and_scale() {
        let mut a = MoistState::zeros(3);
        a.h.fill(1.0);
        let mut b = MoistState::zeros(3);
        b.h.fill(2.0);
        b.u.fill(-1.0);

        a.axpy(0.5, &b);
        a.scale(2.0);
        assert_eq!(a.h, vec![4.0; 3]);
        assert_eq!(a.u, vec![-1.0; 3]);
        assert_eq!(a.hqw, vec![0.0; 3]);
    }

    #[test]
    fn test_from_fields_checks_lengths() {
        let err = MoistState::from_fields(
            vec![0.0; 4],
            vec![0.0; 4],
            vec![1.0; 3],
            vec![0.0; 4],
            vec![0.0; 4],
        )
        .unwrap_err();
        assert_eq!(err, SolverError::shape_mismatch("h", 4, 3));
    }

    #[test]
    fn test_element_blocks_cover_state() {
        let mut s = MoistState::zeros(8);
        for (e, mut block) in s.element_blocks_mut(4).enumerate() {
            block.h.fill(e as f64 + 1.0);
        }
        assert_eq!(s.h, vec![1.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_tracer_fields() {
        assert_eq!(Tracer::Entropy.field(), Field::Hs);
        assert_eq!(Tracer::Water.field(), Field::Hqw);
        assert_eq!(Tracer::Water.index(), 1);
    }
}
