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

use lr_spline::refine::RefineStrategy;

/// The refinement knobs of §6, consumed by [`crate::refine_ops`]'s commands.
#[derive(Debug, Clone, Copy)]
pub struct RefineConfig<T> {
    pub ref_strategy: RefineStrategy,
    pub ref_multiplicity: u32,
    /// When true, a multiplicity conflict at an existing mesh line is a hard
    /// error instead of the default silent-overwrite merge policy.
    pub strict_multiplicity: bool,
    /// Cap on T-junction count per element; exceeding it extends the
    /// offending line fully across the element's other-axis extent.
    pub max_t_joints: Option<usize>,
    /// Extend mesh-line endpoints to the nearest enclosing segment instead
    /// of stopping at the requested interval.
    pub close_gaps: bool,
    /// Reject (when `None` line requests are only ever additive - see
    /// `enforce_aspect_ratio`) or post-fix elements whose extent ratio
    /// exceeds this bound.
    pub max_aspect_ratio: Option<T>,
    /// Replicate each line request at its mirrored parametric location.
    pub symmetry: bool,
}

impl<T: lr_spline::Numeric> RefineConfig<T> {
    pub fn new(ref_strategy: RefineStrategy, ref_multiplicity: u32) -> Self {
        Self {
            ref_strategy,
            ref_multiplicity,
            strict_multiplicity: false,
            max_t_joints: None,
            close_gaps: false,
            max_aspect_ratio: None,
            symmetry: false,
        }
    }
}
