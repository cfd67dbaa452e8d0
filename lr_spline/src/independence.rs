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

//! The exact-arithmetic linear-independence oracle (§4.6): build the
//! projection matrix from the LR basis to the underlying global
//! tensor-product space by iterated exact-rational knot insertion, then
//! determine its rank via partial-pivoted Gauss-Jordan elimination.
//!
//! Floating point is unusable here - near-coincident alpha values in deeply
//! refined meshes produce spurious rank deficiencies, so every step of this
//! module works in [`BigRational`].

use crate::axis::Axis;
use crate::knot::approx_eq;
use crate::mesh::LrMesh;
use crate::numeric::Numeric;
use alloc::collections::BTreeSet;
use alloc::vec;
use alloc::vec::Vec;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};

/// Whether the mesh's current basis functions are linearly independent,
/// i.e. the LR space is in fact a basis (§4.6).
pub fn is_linearly_independent<T: Numeric>(mesh: &LrMesh<T>) -> bool {
    let global_u = global_knot_vector(mesh, Axis::U);
    let global_v = global_knot_vector(mesh, Axis::V);

    let span = smallest_nonzero_span(mesh);
    let gu: Vec<BigRational> = global_u
        .iter()
        .map(|&v| BigRational::from(to_integer_index(v, span)))
        .collect();
    let gv: Vec<BigRational> = global_v
        .iter()
        .map(|&v| BigRational::from(to_integer_index(v, span)))
        .collect();

    let n1 = gu.len() - mesh.order_u;
    let n2 = gv.len() - mesh.order_v;
    let total_cols = n1 * n2;

    let basis_ids: Vec<_> = mesh.basis_ids().collect();
    let mut rows: Vec<Vec<BigRational>> = Vec::with_capacity(basis_ids.len());

    for &bid in &basis_ids {
        let b = mesh.basis(bid);
        let ku: Vec<BigRational> = b
            .knots_u
            .iter()
            .map(|&v| BigRational::from(to_integer_index(v, span)))
            .collect();
        let kv: Vec<BigRational> = b
            .knots_v
            .iter()
            .map(|&v| BigRational::from(to_integer_index(v, span)))
            .collect();

        let (start_u, row_u) = axis_row(&ku, &gu, mesh.order_u);
        let (start_v, row_v) = axis_row(&kv, &gv, mesh.order_v);

        let mut row = vec![BigRational::zero(); total_cols];
        for (iu, cu) in row_u.iter().enumerate() {
            for (iv, cv) in row_v.iter().enumerate() {
                let col = (start_v + iv) * n1 + (start_u + iu);
                row[col] = cu * cv;
            }
        }
        rows.push(row);
    }

    let rank = gauss_jordan_rank(&mut rows);
    log::debug!(
        "linear independence oracle: rank={} |basis|={}",
        rank,
        basis_ids.len()
    );
    rank == basis_ids.len()
}

fn global_knot_vector<T: Numeric>(mesh: &LrMesh<T>, axis: Axis) -> Vec<T> {
    let mut knots: Vec<T> = Vec::new();
    for line in &mesh.mesh_lines {
        if line.axis == axis {
            for _ in 0..line.multiplicity {
                knots.push(line.const_par);
            }
        }
    }
    knots.sort_by(|a, b| a.partial_cmp(b).expect("non-NaN knot"));
    knots
}

fn smallest_nonzero_span<T: Numeric>(mesh: &LrMesh<T>) -> T {
    let mut values: Vec<T> = mesh.mesh_lines.iter().map(|m| m.const_par).collect();
    values.sort_by(|a, b| a.partial_cmp(b).expect("non-NaN knot"));
    values.dedup_by(|a, b| approx_eq(*a, *b));

    let mut min_span: Option<T> = None;
    for w in values.windows(2) {
        let d = w[1] - w[0];
        if d > T::zero() {
            min_span = Some(match min_span {
                None => d,
                Some(m) => m.min(d),
            });
        }
    }
    min_span.unwrap_or_else(T::one)
}

fn to_integer_index<T: Numeric>(value: T, span: T) -> BigInt {
    let ratio = value.to_f64().expect("numeric value converts to f64")
        / span.to_f64().expect("numeric value converts to f64");
    BigInt::from((ratio + 1e-6).round() as i64)
}

/// Express a basis function's local knot vector `local` (a subsequence of
/// `global`, possibly with gaps) as a coefficient row over a contiguous
/// window of `global`'s tensor-product basis, via repeated Boehm knot
/// insertion of every global knot missing from `local`. Returns the window's
/// starting column and the row itself.
fn axis_row(local: &[BigRational], global: &[BigRational], order: usize) -> (usize, Vec<BigRational>) {
    let mut gi = 0usize;
    let mut positions = Vec::with_capacity(local.len());
    for k in local {
        while gi < global.len() && &global[gi] != k {
            gi += 1;
        }
        positions.push(gi);
        gi += 1;
    }
    let start = positions[0];
    let end = *positions.last().expect("local knot vector is never empty");
    let embedded: BTreeSet<usize> = positions.iter().copied().collect();

    let mut knots: Vec<BigRational> = local.to_vec();
    let mut coeffs: Vec<BigRational> = vec![BigRational::one()];

    for g in start..=end {
        if embedded.contains(&g) {
            continue;
        }
        let z = global[g].clone();
        let (new_knots, new_coeffs) = boehm_insert(&knots, &coeffs, order, &z);
        knots = new_knots;
        coeffs = new_coeffs;
    }

    (start, coeffs)
}

/// Classical Boehm single-knot insertion: grow `coeffs` (defined over
/// `knots`, a vector of `coeffs.len() + order` knots) by inserting `z`,
/// producing one additional coefficient.
fn boehm_insert(
    knots: &[BigRational],
    coeffs: &[BigRational],
    order: usize,
    z: &BigRational,
) -> (Vec<BigRational>, Vec<BigRational>) {
    let l = knots.len();
    let mut k = 0usize;
    for (i, kn) in knots.iter().enumerate() {
        if kn <= z {
            k = i;
        }
    }

    let mut new_knots = Vec::with_capacity(l + 1);
    new_knots.extend_from_slice(&knots[..=k]);
    new_knots.push(z.clone());
    new_knots.extend_from_slice(&knots[k + 1..]);

    let n_old = coeffs.len();
    let n_new = n_old + 1;
    let order_i = order as isize;
    let k_i = k as isize;

    let mut new_coeffs = Vec::with_capacity(n_new);
    for i in 0..n_new {
        let i_i = i as isize;
        if i_i <= k_i - order_i {
            new_coeffs.push(coeffs[i].clone());
        } else if i_i > k_i {
            new_coeffs.push(coeffs[i - 1].clone());
        } else {
            let denom = &knots[i + order] - &knots[i];
            let a = if denom.is_zero() {
                BigRational::one()
            } else {
                (z - &knots[i]) / denom
            };
            let left = if i == 0 {
                BigRational::zero()
            } else {
                coeffs[i - 1].clone()
            };
            let right = if i < n_old {
                coeffs[i].clone()
            } else {
                BigRational::zero()
            };
            new_coeffs.push(&a * &right + (BigRational::one() - &a) * &left);
        }
    }

    (new_knots, new_coeffs)
}

/// Partial-pivoted Gauss-Jordan elimination over exact rationals, tolerating
/// leading all-zero columns. Returns the rank of `rows`.
fn gauss_jordan_rank(rows: &mut [Vec<BigRational>]) -> usize {
    let nrows = rows.len();
    if nrows == 0 {
        return 0;
    }
    let ncols = rows[0].len();
    let mut rank = 0usize;
    let mut col = 0usize;

    while rank < nrows && col < ncols {
        let pivot = (rank..nrows).find(|&r| !rows[r][col].is_zero());
        let Some(p) = pivot else {
            col += 1;
            continue;
        };
        rows.swap(rank, p);

        let pivot_val = rows[rank][col].clone();
        for c in col..ncols {
            rows[rank][c] = &rows[rank][c] / &pivot_val;
        }

        for r in 0..nrows {
            if r == rank {
                continue;
            }
            let factor = rows[r][col].clone();
            if factor.is_zero() {
                continue;
            }
            for c in col..ncols {
                let sub = &factor * &rows[rank][c];
                rows[r][c] = &rows[r][c] - &sub;
            }
        }

        rank += 1;
        col += 1;
    }

    rank
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DVector;

    fn uniform_biquadratic() -> LrMesh<f64> {
        let ku = vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 3.0, 3.0];
        let kv = ku.clone();
        let cps: Vec<(f64, DVector<f64>)> = (0..25)
            .map(|_| (1.0, DVector::from_element(1, 1.0)))
            .collect();
        LrMesh::from_raw(3, 3, &ku, &kv, &cps, 1, false).unwrap()
    }

    #[test]
    fn initial_tensor_product_mesh_is_independent() {
        let mesh = uniform_biquadratic();
        assert!(is_linearly_independent(&mesh));
    }

    #[test]
    fn single_refinement_preserves_independence() {
        let mut mesh = uniform_biquadratic();
        mesh.insert_line(Axis::U, 1.5, 0.0, 3.0, 1, false).unwrap();
        assert!(is_linearly_independent(&mesh));
    }

    #[test]
    fn gauss_jordan_rank_detects_linear_dependence() {
        let mut rows = vec![
            vec![BigRational::from_integer(1.into()), BigRational::from_integer(0.into())],
            vec![BigRational::from_integer(2.into()), BigRational::from_integer(0.into())],
        ];
        assert_eq!(gauss_jordan_rank(&mut rows), 1);
    }

    #[test]
    fn gauss_jordan_rank_tolerates_leading_zero_column() {
        let mut rows = vec![
            vec![
                BigRational::zero(),
                BigRational::from_integer(1.into()),
            ],
            vec![
                BigRational::zero(),
                BigRational::from_integer(2.into()),
            ],
        ];
        assert_eq!(gauss_jordan_rank(&mut rows), 1);
    }
}
