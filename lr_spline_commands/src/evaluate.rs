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

//! `point` and `computeBasisAndDerivs` (§6): read-only [`Command`]s built on
//! top of `lr_spline::basis::cox_de_boor`, following
//! `t_spline_commands::tessellate::Tessellate`'s use of `rayon` for
//! batch evaluation over a sample grid.

use lr_spline::Command;
use lr_spline::basis::cox_de_boor;
use lr_spline::ids::BasisId;
use lr_spline::mesh::LrMesh;
use lr_spline::Numeric;
use nalgebra::DVector;
use rayon::prelude::*;

/// `point(u,v) -> R^d`. Returns `None` when `(u,v)` falls outside every
/// element (out of domain).
pub struct Point<T> {
    pub u: T,
    pub v: T,
}

impl<T: Numeric + Send + Sync> Command<T> for Point<T> {
    type Result = Option<DVector<T>>;

    fn execute(&mut self, mesh: &LrMesh<T>) -> Self::Result {
        evaluate_point(mesh, self.u, self.v)
    }
}

fn evaluate_point<T: Numeric>(mesh: &LrMesh<T>, u: T, v: T) -> Option<DVector<T>> {
    let eid = mesh.element_containing(u, v)?;
    let support = &mesh.element(eid).support;

    let mut numer: Option<DVector<T>> = None;
    let mut denom = T::zero();
    for &bid in support {
        let b = mesh.basis(bid);
        let n = b.eval(u, v);
        if n == T::zero() {
            continue;
        }
        let contribution = &b.control_point * n;
        numer = Some(match numer {
            None => contribution,
            Some(acc) => acc + contribution,
        });
        denom += b.weight * n;
    }
    let numer = numer?;
    if mesh.rational {
        Some(numer / denom)
    } else {
        Some(numer)
    }
}

/// Tessellate a regular `resolution x resolution` grid over the surface's
/// parametric domain, mirroring `Tessellate`'s `rayon`-parallel sample loop.
/// Out-of-domain samples (possible only from floating point noise at the
/// exact upper corner) are dropped.
pub struct Tessellate {
    pub resolution: usize,
}

impl<T: Numeric + Send + Sync> Command<T> for Tessellate {
    type Result = Vec<DVector<T>>;

    fn execute(&mut self, mesh: &LrMesh<T>) -> Self::Result {
        let resolution = self.resolution.max(1);
        let n = T::from_usize(resolution - 1).unwrap_or_else(T::one);
        (0..resolution * resolution)
            .into_par_iter()
            .filter_map(|i| {
                let iu = i % resolution;
                let iv = i / resolution;
                let tu = T::from_usize(iu).unwrap_or_else(T::zero) / n.max(T::one());
                let tv = T::from_usize(iv).unwrap_or_else(T::zero) / n.max(T::one());
                let u = mesh.u_min + tu * (mesh.u_max - mesh.u_min);
                let v = mesh.v_min + tv * (mesh.v_max - mesh.v_min);
                evaluate_point(mesh, u, v)
            })
            .collect()
    }
}

/// One locally-supported basis function's value and partial derivatives at
/// an evaluation point, up to `computeBasisAndDerivs`'s `maxDeriv`.
#[derive(Debug, Clone)]
pub struct LocalBasisDerivs<T> {
    pub basis_id: BasisId,
    /// `derivs[a][b]` is `d^(a+b)/du^a dv^b` of this basis function, for `a,
    /// b` in `0..=max_deriv`.
    pub derivs: Vec<Vec<T>>,
}

/// `computeBasisAndDerivs(u, v, maxDeriv)`: the locally supported basis
/// functions at `(u,v)`, each with its full tensor-product derivative table.
/// Separability of the bivariate basis (§4.1: "tensor product of two
/// univariate B-splines") means every partial derivative is itself a
/// product of univariate derivatives.
pub struct ComputeBasisAndDerivs<T> {
    pub u: T,
    pub v: T,
    pub max_deriv: usize,
}

impl<T: Numeric> Command<T> for ComputeBasisAndDerivs<T> {
    type Result = Vec<LocalBasisDerivs<T>>;

    fn execute(&mut self, mesh: &LrMesh<T>) -> Self::Result {
        let Some(eid) = mesh.element_containing(self.u, self.v) else {
            return Vec::new();
        };

        mesh.element(eid)
            .support
            .iter()
            .map(|&bid| {
                let b = mesh.basis(bid);
                let mut derivs = Vec::with_capacity(self.max_deriv + 1);
                for a in 0..=self.max_deriv {
                    let mut row = Vec::with_capacity(self.max_deriv + 1);
                    for bb in 0..=self.max_deriv {
                        let du = basis_derivative(&b.knots_u, self.u, a);
                        let dv = basis_derivative(&b.knots_v, self.v, bb);
                        row.push(du * dv);
                    }
                    derivs.push(row);
                }
                LocalBasisDerivs { basis_id: bid, derivs }
            })
            .collect()
    }
}

/// The `deriv`-th derivative of the univariate B-spline whose local knot
/// vector is `knots`, computed via the standard knot-insertion derivative
/// recurrence `N'_{i,p} = p * (N_{i,p-1}/(u_{i+p}-u_i) - N_{i+1,p-1}/(u_{i+p+1}-u_{i+1}))`.
/// Both reduced-degree terms are themselves prefix/suffix windows of the
/// same local array, so no neighboring basis function's knots are needed.
fn basis_derivative<T: Numeric>(knots: &[T], t: T, deriv: usize) -> T {
    if deriv == 0 {
        return cox_de_boor(knots, t);
    }
    let l = knots.len() - 1;
    if l <= 1 {
        return T::zero();
    }
    let degree = T::from_usize(l - 1).expect("degree fits T");
    let left = &knots[..l];
    let right = &knots[1..];
    let left_den = knots[l - 1] - knots[0];
    let right_den = knots[l] - knots[1];
    let left_term = if left_den == T::zero() {
        T::zero()
    } else {
        basis_derivative(left, t, deriv - 1) / left_den
    };
    let right_term = if right_den == T::zero() {
        T::zero()
    } else {
        basis_derivative(right, t, deriv - 1) / right_den
    };
    degree * (left_term - right_term)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_biquadratic() -> LrMesh<f64> {
        let ku = vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 3.0, 3.0];
        let kv = ku.clone();
        let cps: Vec<(f64, DVector<f64>)> = (0..25)
            .map(|_| (1.0, DVector::from_element(1, 1.0)))
            .collect();
        LrMesh::from_raw(3, 3, &ku, &kv, &cps, 1, false).unwrap()
    }

    #[test]
    fn point_evaluates_to_partition_of_unity_constant() {
        let mesh = uniform_biquadratic();
        let mut op = Point { u: 1.5, v: 1.5 };
        let p = op.execute(&mesh).unwrap();
        assert!((p[0] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn point_outside_domain_is_none() {
        let mesh = uniform_biquadratic();
        let mut op = Point { u: -1.0, v: 1.0 };
        assert!(op.execute(&mesh).is_none());
    }

    #[test]
    fn tessellate_fills_resolution_squared_points() {
        let mesh = uniform_biquadratic();
        let points = Tessellate { resolution: 5 }.execute(&mesh);
        assert_eq!(points.len(), 25);
    }

    #[test]
    fn basis_and_derivs_local_functions_sum_derivative_to_zero() {
        let mesh = uniform_biquadratic();
        let results = ComputeBasisAndDerivs {
            u: 1.5,
            v: 1.5,
            max_deriv: 1,
        }
        .execute(&mesh);
        assert!(!results.is_empty());
        let sum_du: f64 = results.iter().map(|r| r.derivs[1][0]).sum();
        assert!(sum_du.abs() < 1e-9, "partition of unity derivative should vanish: {sum_du}");
    }
}
