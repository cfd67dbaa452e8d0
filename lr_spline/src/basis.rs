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
use crate::ids::ElementId;
use crate::knot::{approx_eq, approx_ge, approx_gt, approx_le};
use crate::numeric::Numeric;
use alloc::collections::BTreeSet;
use nalgebra::DVector;
use smallvec::SmallVec;

/// Inline capacity for a local knot vector. Covers orders up to 7 without
/// spilling to the heap; higher orders still work, just allocate.
pub const LOCAL_KNOT_INLINE: usize = 8;

pub type LocalKnots<T> = SmallVec<[T; LOCAL_KNOT_INLINE]>;

/// A single bivariate tensor-product B-spline: two local knot vectors, a
/// control point and a weight.
#[derive(Debug, Clone)]
pub struct BasisFunction<T> {
    pub knots_u: LocalKnots<T>,
    pub knots_v: LocalKnots<T>,
    pub control_point: DVector<T>,
    pub weight: T,
    pub supported_by: BTreeSet<ElementId>,
}

impl<T: Numeric> BasisFunction<T> {
    pub fn new(
        knots_u: LocalKnots<T>,
        knots_v: LocalKnots<T>,
        control_point: DVector<T>,
        weight: T,
    ) -> Self {
        Self {
            knots_u,
            knots_v,
            control_point,
            weight,
            supported_by: BTreeSet::new(),
        }
    }

    pub fn local_knots(&self, axis: Axis) -> &LocalKnots<T> {
        match axis {
            Axis::U => &self.knots_u,
            Axis::V => &self.knots_v,
        }
    }

    fn local_knots_mut(&mut self, axis: Axis) -> &mut LocalKnots<T> {
        match axis {
            Axis::U => &mut self.knots_u,
            Axis::V => &mut self.knots_v,
        }
    }

    /// Parametric support interval along `axis`.
    pub fn support(&self, axis: Axis) -> (T, T) {
        let k = self.local_knots(axis);
        (k[0], *k.last().expect("local knot vector is never empty"))
    }

    /// Equality up to coincident local knot vectors (§3: "two basis functions
    /// compare equal iff both local knot sequences coincide elementwise").
    pub fn knots_eq(&self, other: &Self) -> bool {
        same_knots(&self.knots_u, &other.knots_u) && same_knots(&self.knots_v, &other.knots_v)
    }

    /// Fold another function's `(w, w*c)` contribution into this one.
    pub fn absorb(&mut self, other: &Self) {
        self.weight += other.weight;
        self.control_point += &other.control_point;
    }

    pub fn eval(&self, u: T, v: T) -> T {
        cox_de_boor(&self.knots_u, u) * cox_de_boor(&self.knots_v, v)
    }

    /// Knot-insertion split at `(axis, t)` (§4.1). Returns zero, one or two
    /// children; a no-op split (t at or outside the support boundary)
    /// returns an empty set. Weight/control-point are scaled but not yet
    /// absorbed into the mesh — that is the caller's job.
    pub fn split_once(&self, axis: Axis, t: T) -> SmallVec<[BasisFunction<T>; 2]> {
        let k = self.local_knots(axis);
        let p = k.len() - 1;

        if approx_le(t, k[0]) || approx_ge(t, k[p]) {
            return SmallVec::new();
        }

        // j = largest index with k[j] < t
        let mut j = 0usize;
        for i in 0..p {
            if k[i] < t && !approx_eq(k[i], t) {
                j = i;
            }
        }

        let alpha1 = if j == p - 1 {
            T::one()
        } else {
            (t - k[0]) / (k[p - 1] - k[0])
        };
        let alpha2 = if j == 0 {
            T::one()
        } else {
            (k[p] - t) / (k[p] - k[1])
        };

        let mut merged: LocalKnots<T> = k.clone();
        merged.push(t);
        merged.sort_by(|a, b| a.partial_cmp(b).expect("non-NaN knot value"));

        let mut knots1: LocalKnots<T> = SmallVec::with_capacity(p + 1);
        knots1.extend(merged[0..=p].iter().copied());
        let mut knots2: LocalKnots<T> = SmallVec::with_capacity(p + 1);
        knots2.extend(merged[1..=p + 1].iter().copied());

        let mut child1 = self.clone();
        *child1.local_knots_mut(axis) = knots1;
        child1.weight = self.weight * alpha1;
        child1.control_point = &self.control_point * alpha1;
        child1.supported_by.clear();

        let mut child2 = self.clone();
        *child2.local_knots_mut(axis) = knots2;
        child2.weight = self.weight * alpha2;
        child2.control_point = &self.control_point * alpha2;
        child2.supported_by.clear();

        let mut out = SmallVec::new();
        out.push(child1);
        out.push(child2);
        out
    }

    /// Whether `t` still lies strictly inside this function's support along
    /// `axis`, i.e. it "straddles" the cut and recursive splitting (§4.1,
    /// multiplicity recursion) should continue.
    pub fn straddles(&self, axis: Axis, t: T) -> bool {
        let (lo, hi) = self.support(axis);
        approx_gt(t, lo) && approx_gt(hi, t)
    }
}

fn same_knots<T: Numeric>(a: &[T], b: &[T]) -> bool {
    a.len() == b.len() && a.iter().zip(b.iter()).all(|(&x, &y)| approx_eq(x, y))
}

/// Evaluate the univariate B-spline basis function whose local knot vector is
/// `knots`, via the Cox-de Boor recursion. The final sub-interval is treated
/// as closed so the function is left-continuous at the support's right
/// endpoint (§4.1).
pub fn cox_de_boor<T: Numeric>(knots: &[T], t: T) -> T {
    let p = knots.len() - 1;
    if approx_gt(knots[0], t) || approx_gt(t, knots[p]) {
        return T::zero();
    }

    let mut vals: LocalKnots<T> = (0..p)
        .map(|i| {
            let (a, b) = (knots[i], knots[i + 1]);
            if approx_eq(a, b) {
                T::zero()
            } else if i == p - 1 {
                if approx_le(a, t) && approx_le(t, b) {
                    T::one()
                } else {
                    T::zero()
                }
            } else if approx_le(a, t) && approx_gt(b, t) {
                T::one()
            } else {
                T::zero()
            }
        })
        .collect();

    for k in 1..p {
        let mut next: LocalKnots<T> = SmallVec::with_capacity(vals.len() - 1);
        for i in 0..(vals.len() - 1) {
            let left_den = knots[i + k] - knots[i];
            let left = if approx_eq(left_den, T::zero()) {
                T::zero()
            } else {
                (t - knots[i]) / left_den * vals[i]
            };
            let right_den = knots[i + k + 1] - knots[i + 1];
            let right = if approx_eq(right_den, T::zero()) {
                T::zero()
            } else {
                (knots[i + k + 1] - t) / right_den * vals[i + 1]
            };
            next.push(left + right);
        }
        vals = next;
    }

    vals[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn knots(v: &[f64]) -> LocalKnots<f64> {
        v.iter().copied().collect()
    }

    #[test]
    fn cox_de_boor_partition_of_unity_at_interior_point() {
        // order-3 uniform open knot vector on [0,3]: five basis functions
        let global = [0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 3.0, 3.0];
        let p = 3usize; // order
        let n = global.len() - p; // number of basis functions
        let sum: f64 = (0..n)
            .map(|i| cox_de_boor(&global[i..i + p + 1], 1.5))
            .sum();
        assert!((sum - 1.0).abs() < 1e-10);
    }

    #[test]
    fn split_once_is_noop_outside_support() {
        let b = BasisFunction::new(
            knots(&[0.0, 0.0, 0.0, 1.0]),
            knots(&[0.0, 0.0, 0.0, 1.0]),
            DVector::from_element(1, 1.0),
            1.0,
        );
        assert!(b.split_once(Axis::U, 0.0).is_empty());
        assert!(b.split_once(Axis::U, 1.0).is_empty());
    }

    #[test]
    fn split_once_produces_two_children_with_scaled_weight() {
        let b = BasisFunction::new(
            knots(&[0.0, 0.0, 0.0, 1.0]),
            knots(&[0.0, 1.0]),
            DVector::from_element(1, 2.0),
            1.0,
        );
        let children = b.split_once(Axis::U, 0.5);
        assert_eq!(children.len(), 2);
        assert!((children[0].weight + children[1].weight - b.weight).abs() > 0.0);
    }

    #[test]
    fn knots_eq_ignores_floating_noise() {
        let a = BasisFunction::new(
            knots(&[0.0, 0.0, 1.0]),
            knots(&[0.0, 1.0]),
            DVector::from_element(1, 1.0),
            1.0,
        );
        let mut b = a.clone();
        b.knots_u[1] += 1e-16;
        assert!(a.knots_eq(&b));
    }
}
