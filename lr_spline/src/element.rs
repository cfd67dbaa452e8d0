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
use crate::ids::BasisId;
use crate::knot::{approx_ge, approx_gt, approx_le, approx_lt};
use crate::numeric::Numeric;
use alloc::collections::BTreeSet;

/// An axis-aligned rectangle of the parameter domain, plus the set of basis
/// functions whose support strictly contains its interior.
#[derive(Debug, Clone)]
pub struct Element<T> {
    pub u_min: T,
    pub u_max: T,
    pub v_min: T,
    pub v_max: T,
    pub support: BTreeSet<BasisId>,
}

impl<T: Numeric> Element<T> {
    pub fn new(u_min: T, u_max: T, v_min: T, v_max: T) -> Self {
        debug_assert!(u_min < u_max && v_min < v_max);
        Self {
            u_min,
            u_max,
            v_min,
            v_max,
            support: BTreeSet::new(),
        }
    }

    pub fn bounds(&self, axis: Axis) -> (T, T) {
        match axis {
            Axis::U => (self.u_min, self.u_max),
            Axis::V => (self.v_min, self.v_max),
        }
    }

    /// Whether this element's interior lies strictly inside the rectangle
    /// `(u0,u1) x (v0,v1)` - used by the support graph to re-test overlap
    /// against a basis function's support (§3, §4.3).
    pub fn interior_within(&self, u0: T, u1: T, v0: T, v1: T) -> bool {
        approx_le(u0, self.u_min)
            && approx_ge(u1, self.u_max)
            && approx_le(v0, self.v_min)
            && approx_ge(v1, self.v_max)
    }

    /// A mesh-line at `(axis, const_par)` spanning `[start, stop]` on the
    /// other axis splits this element (§4.2) iff `const_par` cuts the
    /// element's interior on `axis` and the line's span covers the element's
    /// extent on the other axis.
    pub fn is_split_by(&self, axis: Axis, const_par: T, start: T, stop: T) -> bool {
        let (lo, hi) = self.bounds(axis);
        let (other_lo, other_hi) = self.bounds(axis.other());
        approx_gt(const_par, lo)
            && approx_gt(hi, const_par)
            && approx_le(start, other_lo)
            && approx_ge(stop, other_hi)
    }

    /// Split this element at `(axis, c)` into the low and high halves
    /// (§4.3). `c` must already be known to lie strictly inside the
    /// element's extent on `axis`.
    pub fn split(&self, axis: Axis, c: T) -> (Element<T>, Element<T>) {
        match axis {
            Axis::U => (
                Element::new(self.u_min, c, self.v_min, self.v_max),
                Element::new(c, self.u_max, self.v_min, self.v_max),
            ),
            Axis::V => (
                Element::new(self.u_min, self.u_max, self.v_min, c),
                Element::new(self.u_min, self.u_max, c, self.v_max),
            ),
        }
    }

    /// Whether `(u,v)` lies in this element's closed rectangle, used by
    /// `elementContaining` (§6). The caller breaks ties on shared boundaries
    /// by taking the first matching element in iteration order.
    pub fn contains_point(&self, u: T, v: T, global_u_max: T, global_v_max: T) -> bool {
        let u_hi_ok = if approx_eq_tol(self.u_max, global_u_max) {
            approx_le(u, self.u_max)
        } else {
            approx_lt(u, self.u_max)
        };
        let v_hi_ok = if approx_eq_tol(self.v_max, global_v_max) {
            approx_le(v, self.v_max)
        } else {
            approx_lt(v, self.v_max)
        };
        approx_le(self.u_min, u) && u_hi_ok && approx_le(self.v_min, v) && v_hi_ok
    }
}

fn approx_eq_tol<T: Numeric>(a: T, b: T) -> bool {
    crate::knot::approx_eq(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_produces_two_halves_sharing_the_cut() {
        let e = Element::new(0.0_f64, 2.0, 0.0, 1.0);
        let (lo, hi) = e.split(Axis::U, 1.0);
        assert_eq!(lo.u_max, hi.u_min);
        assert_eq!(lo.u_min, 0.0);
        assert_eq!(hi.u_max, 2.0);
    }

    #[test]
    fn contains_point_right_boundary_only_at_global_end() {
        let e = Element::new(0.0_f64, 1.0, 0.0, 1.0);
        assert!(e.contains_point(1.0, 0.5, 1.0, 1.0));
        assert!(!e.contains_point(1.0, 0.5, 2.0, 2.0));
    }

    #[test]
    fn is_split_by_requires_full_coverage_on_other_axis() {
        let e = Element::new(0.0_f64, 2.0, 0.0, 2.0);
        assert!(e.is_split_by(Axis::U, 1.0, 0.0, 2.0));
        assert!(!e.is_split_by(Axis::U, 1.0, 0.0, 1.0));
        assert!(!e.is_split_by(Axis::U, 0.0, 0.0, 2.0));
    }
}
