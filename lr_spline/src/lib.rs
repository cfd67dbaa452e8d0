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

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod axis;
pub mod basis;
mod commands;
pub mod element;
pub mod error;
pub mod ids;
pub mod independence;
pub mod knot;
pub mod mesh;
mod numeric;
pub mod meshline;
pub mod refine;

pub use crate::commands::{Command, CommandMut};
pub use crate::numeric::Numeric;
pub use nalgebra::DVector;

use crate::mesh::LrMesh;

/// A locally refined B-spline surface: the mesh plus read/mutate access
/// through [`Command`]/[`CommandMut`].
#[derive(Debug, Clone)]
pub struct LrSurface<T> {
    mesh: LrMesh<T>,
}

impl<T> From<LrMesh<T>> for LrSurface<T> {
    fn from(value: LrMesh<T>) -> Self {
        LrSurface::new(value)
    }
}

impl<T> From<LrSurface<T>> for LrMesh<T> {
    fn from(value: LrSurface<T>) -> Self {
        value.into_mesh()
    }
}

impl<T> LrSurface<T> {
    pub fn new(mesh: LrMesh<T>) -> Self {
        Self { mesh }
    }

    /// Perform a read-only operation on the underlying mesh.
    ///
    /// ```
    /// # use lr_spline::*;
    /// # use lr_spline::mesh::LrMesh;
    /// # let mesh: LrMesh<f64> = LrMesh::from_raw(
    /// #     3, 3,
    /// #     &[0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 3.0, 3.0],
    /// #     &[0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 3.0, 3.0],
    /// #     &(0..25).map(|_| (1.0, DVector::from_element(1, 1.0))).collect::<Vec<_>>(),
    /// #     1, false,
    /// # ).unwrap();
    /// let surface = LrSurface::new(mesh);
    /// let count = surface.apply(&mut |m: &LrMesh<f64>| m.basis_count());
    /// assert_eq!(count, 25);
    /// ```
    pub fn apply<C: Command<T> + ?Sized>(&self, op: &mut C) -> C::Result {
        op.execute(&self.mesh)
    }

    /// Perform a mutating operation on the underlying mesh. `apply_mut`
    /// takes `&mut self`, so the borrow checker (not a runtime lock)
    /// guarantees no refinement overlaps a concurrent read (§5).
    pub fn apply_mut<C: CommandMut<T> + ?Sized>(&mut self, op: &mut C) -> C::Result {
        op.execute(&mut self.mesh)
    }

    pub fn mesh(&self) -> &LrMesh<T> {
        &self.mesh
    }

    pub fn into_mesh(self) -> LrMesh<T> {
        self.mesh
    }
}
