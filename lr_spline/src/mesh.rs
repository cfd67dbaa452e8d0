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
use crate::basis::{BasisFunction, LocalKnots};
use crate::element::Element;
use crate::error::ConstructionError;
use crate::ids::{BasisId, ElementId};
use crate::knot::unique_values;
use crate::meshline::MeshLine;
use crate::numeric::Numeric;
use alloc::vec::Vec;
use nalgebra::DVector;

/// The surface's mutable state: the active basis functions, the mesh-line
/// segments and the elements, together with the bidirectional support graph
/// relating the first and the third (§3 "Global state").
///
/// Basis functions and elements live in arenas indexed by stable
/// [`BasisId`]/[`ElementId`]; a removed entry becomes a tombstone `None`
/// rather than shifting later indices, so ids handed out before a mutation
/// stay valid afterwards.
#[derive(Debug, Clone)]
pub struct LrMesh<T> {
    pub order_u: usize,
    pub order_v: usize,
    pub dimension: usize,
    pub rational: bool,
    pub u_min: T,
    pub u_max: T,
    pub v_min: T,
    pub v_max: T,

    basis: Vec<Option<BasisFunction<T>>>,
    elements: Vec<Option<Element<T>>>,
    pub mesh_lines: Vec<MeshLine<T>>,
}

impl<T: Numeric> LrMesh<T> {
    /// Build the initial mesh from raw tensor-product arrays (§6
    /// "Construction inputs"). `knots_u`/`knots_v` are the global knot
    /// vectors of length `n1 + order_u` / `n2 + order_v`; `control_points`
    /// is the `n1 * n2` coefficient grid in row-major (v-major) order, each
    /// entry a `(weight, point)` pair.
    pub fn from_raw(
        order_u: usize,
        order_v: usize,
        knots_u: &[T],
        knots_v: &[T],
        control_points: &[(T, DVector<T>)],
        dimension: usize,
        rational: bool,
    ) -> Result<Self, ConstructionError> {
        if knots_u.len() < order_u + 1 {
            return Err(ConstructionError::UKnotVectorTooShort {
                found: knots_u.len(),
                expected: order_u + 1,
            });
        }
        if knots_v.len() < order_v + 1 {
            return Err(ConstructionError::VKnotVectorTooShort {
                found: knots_v.len(),
                expected: order_v + 1,
            });
        }
        for w in knots_u.windows(2) {
            if w[1] < w[0] {
                return Err(ConstructionError::UKnotVectorNotSorted {
                    index: 1,
                });
            }
        }
        for w in knots_v.windows(2) {
            if w[1] < w[0] {
                return Err(ConstructionError::VKnotVectorNotSorted {
                    index: 1,
                });
            }
        }

        let n1 = knots_u.len() - order_u;
        let n2 = knots_v.len() - order_v;
        let expected = n1 * n2;
        if control_points.len() != expected {
            return Err(ConstructionError::ControlPointCountMismatch {
                found: control_points.len(),
                expected,
            });
        }
        for pair in control_points.windows(2) {
            if pair[0].1.len() != pair[1].1.len() {
                return Err(ConstructionError::ControlPointDimensionMismatch {
                    a: pair[0].1.len(),
                    b: pair[1].1.len(),
                });
            }
        }

        let mut mesh = LrMesh {
            order_u,
            order_v,
            dimension,
            rational,
            u_min: knots_u[0],
            u_max: knots_u[knots_u.len() - 1],
            v_min: knots_v[0],
            v_max: knots_v[knots_v.len() - 1],
            basis: Vec::new(),
            elements: Vec::new(),
            mesh_lines: Vec::new(),
        };

        let mut basis_ids = Vec::with_capacity(n1 * n2);
        for j in 0..n2 {
            for i in 0..n1 {
                let ku: LocalKnots<T> = knots_u[i..=i + order_u].iter().copied().collect();
                let kv: LocalKnots<T> = knots_v[j..=j + order_v].iter().copied().collect();
                let (w, c) = &control_points[j * n1 + i];
                let b = BasisFunction::new(ku, kv, c.clone(), *w);
                basis_ids.push(mesh.insert_basis(b));
            }
        }

        // Initial mesh-line set: every unique knot value on each axis,
        // spanning the full other-axis extent, with multiplicity equal to
        // its count in the global knot vector (§6 "Initial mesh-line set").
        // Boundary knots are included too, so the global knot vector the
        // independence oracle reconstructs from `mesh_lines` (§4.6) matches
        // the one the basis functions were actually built from.
        let uniq_u = unique_values(knots_u);
        let uniq_v = unique_values(knots_v);
        for &value in uniq_u.iter() {
            let mult = knots_u.iter().filter(|&&k| k == value).count() as u32;
            mesh.mesh_lines
                .push(MeshLine::new(Axis::U, value, mesh.v_min, mesh.v_max, mult));
        }
        for &value in uniq_v.iter() {
            let mult = knots_v.iter().filter(|&&k| k == value).count() as u32;
            mesh.mesh_lines
                .push(MeshLine::new(Axis::V, value, mesh.u_min, mesh.u_max, mult));
        }

        let elem_u_breaks = unique_values(knots_u);
        let elem_v_breaks = unique_values(knots_v);
        for vb in elem_v_breaks.windows(2) {
            for ub in elem_u_breaks.windows(2) {
                let e = Element::new(ub[0], ub[1], vb[0], vb[1]);
                let eid = mesh.insert_element(e);
                for &bid in &basis_ids {
                    if mesh.element_overlaps_basis(bid, eid) {
                        mesh.connect(bid, eid);
                    }
                }
            }
        }

        Ok(mesh)
    }

    /// An empty mesh with no basis functions, mesh lines or elements yet -
    /// the bootstrap a raw-format reader (`lr-spline-io::text`) populates via
    /// [`Self::insert_basis`]/[`Self::insert_element`]/`mesh_lines.push`,
    /// since those are the only way to reach the private arenas from outside
    /// this crate.
    pub fn empty(
        order_u: usize,
        order_v: usize,
        u_min: T,
        u_max: T,
        v_min: T,
        v_max: T,
        dimension: usize,
        rational: bool,
    ) -> Self {
        LrMesh {
            order_u,
            order_v,
            dimension,
            rational,
            u_min,
            u_max,
            v_min,
            v_max,
            basis: Vec::new(),
            elements: Vec::new(),
            mesh_lines: Vec::new(),
        }
    }

    /// Whether `element_id`'s interior still lies strictly inside
    /// `basis_id`'s support, i.e. whether the pair belongs in the support
    /// graph (§3).
    pub fn element_overlaps_basis(&self, basis_id: BasisId, element_id: ElementId) -> bool {
        let b = self.basis(basis_id);
        let e = self.element(element_id);
        let (bu0, bu1) = b.support(Axis::U);
        let (bv0, bv1) = b.support(Axis::V);
        e.interior_within(bu0, bu1, bv0, bv1)
    }

    pub fn insert_basis(&mut self, b: BasisFunction<T>) -> BasisId {
        self.basis.push(Some(b));
        BasisId(self.basis.len() - 1)
    }

    pub fn remove_basis(&mut self, id: BasisId) -> BasisFunction<T> {
        let removed = self.basis[id.0].take().expect("basis id already removed");
        for &eid in &removed.supported_by {
            if let Some(e) = self.elements[eid.0].as_mut() {
                e.support.remove(&id);
            }
        }
        removed
    }

    pub fn insert_element(&mut self, e: Element<T>) -> ElementId {
        self.elements.push(Some(e));
        ElementId(self.elements.len() - 1)
    }

    pub fn remove_element(&mut self, id: ElementId) -> Element<T> {
        let removed = self.elements[id.0].take().expect("element id already removed");
        for &bid in &removed.support {
            if let Some(b) = self.basis[bid.0].as_mut() {
                b.supported_by.remove(&id);
            }
        }
        removed
    }

    pub fn connect(&mut self, basis_id: BasisId, element_id: ElementId) {
        self.basis[basis_id.0]
            .as_mut()
            .expect("basis id is live")
            .supported_by
            .insert(element_id);
        self.elements[element_id.0]
            .as_mut()
            .expect("element id is live")
            .support
            .insert(basis_id);
    }

    pub fn basis_exists(&self, id: BasisId) -> bool {
        self.basis.get(id.0).is_some_and(|b| b.is_some())
    }

    pub fn element_exists(&self, id: ElementId) -> bool {
        self.elements.get(id.0).is_some_and(|e| e.is_some())
    }

    pub fn basis(&self, id: BasisId) -> &BasisFunction<T> {
        self.basis[id.0].as_ref().expect("basis id is live")
    }

    pub fn basis_mut(&mut self, id: BasisId) -> &mut BasisFunction<T> {
        self.basis[id.0].as_mut().expect("basis id is live")
    }

    pub fn element(&self, id: ElementId) -> &Element<T> {
        self.elements[id.0].as_ref().expect("element id is live")
    }

    pub fn element_mut(&mut self, id: ElementId) -> &mut Element<T> {
        self.elements[id.0].as_mut().expect("element id is live")
    }

    pub fn basis_ids(&self) -> impl Iterator<Item = BasisId> + '_ {
        self.basis
            .iter()
            .enumerate()
            .filter_map(|(i, b)| b.as_ref().map(|_| BasisId(i)))
    }

    pub fn element_ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.elements
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().map(|_| ElementId(i)))
    }

    pub fn basis_count(&self) -> usize {
        self.basis.iter().filter(|b| b.is_some()).count()
    }

    pub fn element_count(&self) -> usize {
        self.elements.iter().filter(|e| e.is_some()).count()
    }

    /// Linear scan over the element list; the element's closed rectangle
    /// must contain `(u,v)`, with right/top boundaries attaching only to
    /// the element whose max equals the global domain end (§6).
    pub fn element_containing(&self, u: T, v: T) -> Option<ElementId> {
        self.element_ids()
            .find(|&id| self.element(id).contains_point(u, v, self.u_max, self.v_max))
    }

    /// Insert a mesh-line segment request, running the three-phase fixpoint
    /// of §4.5. Returns the number of genuinely new basis functions created
    /// (absorbed children don't count).
    pub fn insert_line(
        &mut self,
        axis: Axis,
        const_par: T,
        start: T,
        stop: T,
        multiplicity: u32,
        strict_multiplicity: bool,
    ) -> Result<usize, crate::refine::RefineError> {
        crate::refine::insert_line(self, axis, const_par, start, stop, multiplicity, strict_multiplicity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_biquadratic() -> LrMesh<f64> {
        let ku = vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 3.0, 3.0];
        let kv = ku.clone();
        let mut cps = Vec::new();
        for _ in 0..25 {
            cps.push((1.0, DVector::from_element(1, 1.0)));
        }
        LrMesh::from_raw(3, 3, &ku, &kv, &cps, 1, false).unwrap()
    }

    #[test]
    fn from_raw_builds_expected_counts() {
        let mesh = uniform_biquadratic();
        assert_eq!(mesh.basis_count(), 25);
        assert_eq!(mesh.element_count(), 9);
    }

    #[test]
    fn element_containing_finds_top_right_and_rejects_outside() {
        let mesh = uniform_biquadratic();
        assert!(mesh.element_containing(3.0, 3.0).is_some());
        assert!(mesh.element_containing(3.0 + 1e-6, 1.0).is_none());
    }

    #[test]
    fn construction_rejects_mismatched_control_point_count() {
        let ku = vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 3.0, 3.0];
        let kv = ku.clone();
        let cps = alloc::vec![(1.0, DVector::from_element(1, 1.0))];
        let result = LrMesh::from_raw(3, 3, &ku, &kv, &cps, 1, false);
        assert!(result.is_err());
    }
}
