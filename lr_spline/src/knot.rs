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

//! Tolerance-based parameter comparisons.
//!
//! All parameter values compared by the refinement engine (mesh-line
//! endpoints, local knot vectors, element boundaries) go through these
//! helpers rather than `==`/`<` directly, so that knots that differ only by
//! floating-point noise are still treated as coincident.

use crate::numeric::Numeric;

/// Two parameter values closer than this are considered equal.
pub fn approx_eq<T: Numeric>(a: T, b: T) -> bool {
    (a - b).abs() <= T::delta()
}

/// `a < b`, outside the tolerance band.
pub fn approx_lt<T: Numeric>(a: T, b: T) -> bool {
    !approx_eq(a, b) && a < b
}

/// `a > b`, outside the tolerance band.
pub fn approx_gt<T: Numeric>(a: T, b: T) -> bool {
    !approx_eq(a, b) && a > b
}

/// `a <= b`, treating near-equal values as satisfying the bound.
pub fn approx_le<T: Numeric>(a: T, b: T) -> bool {
    approx_eq(a, b) || a < b
}

/// `a >= b`, treating near-equal values as satisfying the bound.
pub fn approx_ge<T: Numeric>(a: T, b: T) -> bool {
    approx_eq(a, b) || a > b
}

/// Number of entries in `knots` equal to `value` under [`approx_eq`].
pub fn multiplicity_at<T: Numeric>(knots: &[T], value: T) -> usize {
    knots.iter().filter(|&&k| approx_eq(k, value)).count()
}

/// Index of the last knot strictly less than `value`, i.e. the start of the
/// half-open span `[knots[i], knots[i+1])` containing `value`.
///
/// `value` equal to the final knot is clamped to the last interior span, the
/// convention used throughout for right-closed evaluation at the domain end.
pub fn find_span<T: Numeric>(knots: &[T], value: T) -> usize {
    let n = knots.len();
    debug_assert!(n >= 2, "a knot vector needs at least two entries");

    if approx_ge(value, knots[n - 1]) {
        let mut i = n - 2;
        while i > 0 && approx_eq(knots[i], knots[n - 1]) {
            i -= 1;
        }
        return i;
    }

    let mut lo = 0usize;
    let mut hi = n - 1;
    while lo + 1 < hi {
        let mid = (lo + hi) / 2;
        if approx_gt(knots[mid], value) {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    lo
}

/// The strictly increasing sequence of distinct values in `knots`, under
/// [`approx_eq`].
pub fn unique_values<T: Numeric>(knots: &[T]) -> alloc::vec::Vec<T> {
    let mut out: alloc::vec::Vec<T> = alloc::vec::Vec::new();
    for &k in knots {
        if out.last().map_or(true, |&last| !approx_eq(last, k)) {
            out.push(k);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approx_eq_within_tolerance() {
        assert!(approx_eq(1.0_f64, 1.0 + 1e-15));
        assert!(!approx_eq(1.0_f64, 1.1));
    }

    #[test]
    fn find_span_picks_half_open_interval() {
        let knots = [0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 3.0, 3.0];
        assert_eq!(find_span(&knots, 0.0), 2);
        assert_eq!(find_span(&knots, 0.5), 2);
        assert_eq!(find_span(&knots, 1.5), 3);
        assert_eq!(find_span(&knots, 3.0), 4);
    }

    #[test]
    fn unique_values_collapses_repeats() {
        let knots = [0.0, 0.0, 1.0, 1.0, 1.0, 2.0];
        assert_eq!(unique_values(&knots), alloc::vec![0.0, 1.0, 2.0]);
    }
}
