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

use core::fmt::{Debug, Display};
use num_traits::{Bounded, FromPrimitive, Num, NumAssign, Signed, ToPrimitive};

/// Scalar type usable for parameter values, knots and control point
/// coordinates throughout the LR-spline engine.
///
/// `'static` is required so that `T` satisfies `nalgebra::Scalar` (and the
/// `ClosedAdd`/`ClosedMul`/`ClosedNeg` arithmetic marker traits it composes
/// with) for any generic `T: Numeric`, not just the concrete types used in
/// practice.
pub trait Numeric:
    'static
    + Num
    + Copy
    + PartialOrd
    + Signed
    + NumAssign
    + Debug
    + Display
    + Bounded
    + FromPrimitive
    + ToPrimitive
{
    fn max(self, other: Self) -> Self {
        if self > other { self } else { other }
    }

    fn min(self, other: Self) -> Self {
        if self < other { self } else { other }
    }

    /// A tolerance small relative to this type's precision, used for the
    /// absolute comparisons in [`crate::knot`].
    fn delta() -> Self;
}

/// Absolute tolerance for coincident parameter values (§3), matching the
/// original's `DOUBLE_TOL`. Coarser than `f64::EPSILON` on purpose: knots
/// meant to be coincident can differ by more than a few ULPs after repeated
/// refinement arithmetic.
const EPS: f64 = 1e-14;

macro_rules! impl_numeric_float {
    ($($t:ty),*) => {
        $(
            impl Numeric for $t {
                fn delta() -> Self { EPS as $t }
            }
        )*
    }
}

impl_numeric_float!(f32, f64);

#[cfg(feature = "fixed")]
mod fixed_impl {
    use super::*;

    macro_rules! impl_numeric_fixed {
        ($($t:ident),*) => {
            $(
                impl<Frac: fixed::types::extra::LeEqU32> Numeric for fixed::$t<Frac>
                where
                    fixed::$t<Frac>: fixed::traits::FixedSigned
                        + Num
                        + Signed
                        + NumAssign
                        + FromPrimitive
                        + ToPrimitive
                        + Bounded
                {
                    fn delta() -> Self { Self::DELTA }
                }
            )*
        }
    }

    impl_numeric_fixed!(FixedI8, FixedI16, FixedI32, FixedI64, FixedI128);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::hint::black_box;

    #[test]
    fn it_supports_floats() {
        needs_numeric(1f64);
        needs_numeric(1f32);
    }

    #[cfg(feature = "fixed")]
    #[test]
    fn it_supports_fixed() {
        use num_traits::One;

        needs_numeric(fixed::types::I10F22::one());
    }

    fn needs_numeric(value: impl Numeric) {
        black_box(value);
    }
}
