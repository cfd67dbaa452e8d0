/*
 * Copyright (C) 2026 Dominick Schroer
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use crate::axis::Axis;
use crate::basis::BasisFunction;
use crate::element::Element;
use crate::knot::{approx_eq, approx_ge, approx_gt, approx_le, multiplicity_at};
use crate::numeric::Numeric;

/// An axis-parallel interval at a fixed perpendicular parameter, carrying a
/// knot-insertion multiplicity (§3).
#[derive(Debug, Clone, Copy)]
pub struct MeshLine<T> {
    pub axis: Axis,
    pub const_par: T,
    pub start: T,
    pub stop: T,
    pub multiplicity: u32,
}

impl<T: Numeric> MeshLine<T> {
    pub fn new(axis: Axis, const_par: T, start: T, stop: T, multiplicity: u32) -> Self {
        debug_assert!(start < stop);
        Self {
            axis,
            const_par,
            start,
            stop,
            multiplicity,
        }
    }

    /// Whether this is the same perpendicular line as `other` (§3: "same
    /// axis and const_par within epsilon").
    pub fn same_line(&self, other: &MeshLine<T>) -> bool {
        self.axis == other.axis && approx_eq(self.const_par, other.const_par)
    }

    /// Whether `[self.start, self.stop]` and `[other.start, other.stop]`
    /// touch or overlap, i.e. must be merged per §3/§4.5 Phase 0.
    pub fn overlaps_or_touches(&self, other: &MeshLine<T>) -> bool {
        approx_le(self.start, other.stop) && approx_le(other.start, self.stop)
    }

    /// Extend this segment's interval to cover `other`'s as well.
    pub fn union_with(&mut self, other: &MeshLine<T>) {
        self.start = self.start.min(other.start);
        self.stop = self.stop.max(other.stop);
    }

    /// **splits(B)** (§4.2): `const_par` lies strictly inside `b`'s open
    /// support interval along `self.axis`, and `[start,stop]` covers `b`'s
    /// support interval along the other axis (closed, tolerant).
    pub fn splits_basis(&self, b: &BasisFunction<T>) -> bool {
        let (lo, hi) = b.support(self.axis);
        let (other_lo, other_hi) = b.support(self.axis.other());
        approx_gt(self.const_par, lo)
            && approx_gt(hi, self.const_par)
            && approx_le(self.start, other_lo)
            && approx_ge(self.stop, other_hi)
    }

    /// **containedIn(B)** (§4.2): the local knot vector along `self.axis`
    /// already contains `const_par` with multiplicity at least
    /// `self.multiplicity`, so inserting this line would produce no new
    /// function.
    pub fn contained_in_basis(&self, b: &BasisFunction<T>) -> bool {
        let knots = b.local_knots(self.axis);
        multiplicity_at(knots.as_slice(), self.const_par) >= self.multiplicity as usize
    }

    /// Whether this line splits element `e` (§4.2): `const_par` cuts `e`'s
    /// interior on `self.axis` and `e`'s extent on the other axis lies
    /// inside `[start,stop]`.
    pub fn splits_element(&self, e: &Element<T>) -> bool {
        e.is_split_by(self.axis, self.const_par, self.start, self.stop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DVector;
    use smallvec::SmallVec;

    fn basis(ku: &[f64], kv: &[f64]) -> BasisFunction<f64> {
        BasisFunction::new(
            ku.iter().copied().collect::<SmallVec<[f64; 8]>>(),
            kv.iter().copied().collect::<SmallVec<[f64; 8]>>(),
            DVector::from_element(1, 1.0),
            1.0,
        )
    }

    #[test]
    fn overlap_detects_touching_intervals() {
        let a = MeshLine::new(Axis::U, 1.0_f64, 0.0, 1.0, 1);
        let b = MeshLine::new(Axis::U, 1.0_f64, 1.0, 2.0, 1);
        assert!(a.overlaps_or_touches(&b));
    }

    #[test]
    fn splits_basis_requires_interior_crossing() {
        let b = basis(&[0.0, 0.0, 0.0, 1.0], &[0.0, 1.0]);
        let line = MeshLine::new(Axis::U, 0.5_f64, 0.0, 1.0, 1);
        assert!(line.splits_basis(&b));

        let boundary_line = MeshLine::new(Axis::U, 0.0_f64, 0.0, 1.0, 1);
        assert!(!boundary_line.splits_basis(&b));
    }

    #[test]
    fn contained_in_detects_existing_multiplicity() {
        let b = basis(&[0.0, 0.5, 0.5, 1.0], &[0.0, 1.0]);
        let line = MeshLine::new(Axis::U, 0.5_f64, 0.0, 1.0, 2);
        assert!(line.contained_in_basis(&b));

        let line3 = MeshLine::new(Axis::U, 0.5_f64, 0.0, 1.0, 3);
        assert!(!line3.contained_in_basis(&b));
    }
}
