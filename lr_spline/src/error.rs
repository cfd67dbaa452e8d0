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

use thiserror::Error;

/// Failures that can occur while building an [`crate::mesh::LrMesh`] from raw
/// tensor-product data.
#[derive(Error, Debug, Eq, PartialEq)]
pub enum ConstructionError {
    #[error("knot vector for u has {found} entries, expected at least {expected}")]
    UKnotVectorTooShort { found: usize, expected: usize },

    #[error("knot vector for v has {found} entries, expected at least {expected}")]
    VKnotVectorTooShort { found: usize, expected: usize },

    #[error(
        "control point grid has {found} entries, expected {expected} (= (nu - pu - 1) * (nv - pv - 1))"
    )]
    ControlPointCountMismatch { found: usize, expected: usize },

    #[error("control points have mismatched dimensions: {a} and {b}")]
    ControlPointDimensionMismatch { a: usize, b: usize },

    #[error("knot vector for u is not non-decreasing at index {index}")]
    UKnotVectorNotSorted { index: usize },

    #[error("knot vector for v is not non-decreasing at index {index}")]
    VKnotVectorNotSorted { index: usize },
}
