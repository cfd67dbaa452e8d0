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

//! Construction from an initial tensor-product spline or raw arrays (§6
//! "Construction inputs"). Both adapters are thin - they just shape their
//! respective inputs into [`LrMesh::from_raw`]'s arguments, which does the
//! actual arena population.

use lr_spline::DVector;
use lr_spline::Numeric;
use lr_spline::error::ConstructionError;
use lr_spline::mesh::LrMesh;

/// A tensor-product spline surface as handed over by an external provider:
/// two orders, two global knot vectors and an `n1 * n2` coefficient grid in
/// row-major (v-major) order, each entry a `(weight, point)` pair.
pub struct TensorProductSurface<T> {
    pub order_u: usize,
    pub order_v: usize,
    pub knots_u: Vec<T>,
    pub knots_v: Vec<T>,
    pub control_points: Vec<(T, Vec<T>)>,
    pub dimension: usize,
    pub rational: bool,
}

/// Build the initial LR mesh from an external tensor-product surface.
pub fn from_tensor_product_surface<T: Numeric>(
    surface: &TensorProductSurface<T>,
) -> Result<LrMesh<T>, ConstructionError> {
    from_raw_arrays(
        surface.order_u,
        surface.order_v,
        &surface.knots_u,
        &surface.knots_v,
        &surface.control_points,
        surface.dimension,
        surface.rational,
    )
}

/// Build the initial LR mesh from raw arrays: `n1`/`n2` are implied by
/// `knots_u.len() - order_u` / `knots_v.len() - order_v`.
pub fn from_raw_arrays<T: Numeric>(
    order_u: usize,
    order_v: usize,
    knots_u: &[T],
    knots_v: &[T],
    coefficients: &[(T, Vec<T>)],
    dimension: usize,
    rational: bool,
) -> Result<LrMesh<T>, ConstructionError> {
    let control_points: Vec<(T, DVector<T>)> = coefficients
        .iter()
        .map(|(w, c)| (*w, DVector::from_row_slice(c)))
        .collect();
    LrMesh::from_raw(
        order_u,
        order_v,
        knots_u,
        knots_v,
        &control_points,
        dimension,
        rational,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_arrays_builds_a_mesh_matching_from_raw() {
        let ku = vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 3.0, 3.0];
        let kv = ku.clone();
        let cps: Vec<(f64, Vec<f64>)> = (0..25).map(|_| (1.0, vec![1.0])).collect();
        let mesh = from_raw_arrays(3, 3, &ku, &kv, &cps, 1, false).unwrap();
        assert_eq!(mesh.basis_count(), 25);
        assert_eq!(mesh.element_count(), 9);
    }

    #[test]
    fn tensor_product_surface_delegates_to_raw_arrays() {
        let ku = vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 3.0, 3.0];
        let surface = TensorProductSurface {
            order_u: 3,
            order_v: 3,
            knots_u: ku.clone(),
            knots_v: ku,
            control_points: (0..25).map(|_| (1.0, vec![1.0])).collect(),
            dimension: 1,
            rational: false,
        };
        let mesh = from_tensor_product_surface(&surface).unwrap();
        assert_eq!(mesh.basis_count(), 25);
    }
}
