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
use crate::basis::BasisFunction;
use crate::ids::{BasisId, ElementId};
use crate::knot::approx_eq;
use crate::mesh::LrMesh;
use crate::meshline::MeshLine;
use crate::numeric::Numeric;
use alloc::collections::VecDeque;
use alloc::vec::Vec;
use thiserror::Error;

/// The four per-element refinement strategies of §4.4.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RefineStrategy {
    Safe,
    MinSpan,
    IsotropicElem,
    IsotropicFunc,
}

/// A line insertion request produced by a refinement strategy: an axis, a
/// constant parameter, and the interval it spans on the other axis.
#[derive(Debug, Clone, Copy)]
pub struct LineRequest<T> {
    pub axis: Axis,
    pub const_par: T,
    pub start: T,
    pub stop: T,
}

#[derive(Error, Debug, Eq, PartialEq)]
pub enum RefineError {
    #[error("mesh line merge at {axis:?} const_par={const_par:?}: existing multiplicity {existing} conflicts with requested {requested}")]
    MultiplicityMismatch {
        axis: Axis,
        const_par: alloc::string::String,
        existing: u32,
        requested: u32,
    },
}

/// `insertConstULine`/`insertConstVLine` and the bottom of every other
/// mutating entry point (§6): insert one mesh-line segment, running the
/// three-phase fixpoint of §4.5. Returns the net number of basis functions
/// added to the mesh by the whole operation.
pub fn insert_line<T: Numeric>(
    mesh: &mut LrMesh<T>,
    axis: Axis,
    const_par: T,
    start: T,
    stop: T,
    multiplicity: u32,
    strict_multiplicity: bool,
) -> Result<usize, RefineError> {
    if multiplicity == 0 || !(start < stop) {
        return Ok(0);
    }

    let (dom_lo, dom_hi) = match axis {
        Axis::U => (mesh.u_min, mesh.u_max),
        Axis::V => (mesh.v_min, mesh.v_max),
    };
    if const_par <= dom_lo || const_par >= dom_hi {
        log::debug!("insert_line: {:?}={:?} outside domain, ignored", axis, const_par);
        return Ok(0);
    }
    let (other_lo, other_hi) = match axis {
        Axis::U => (mesh.v_min, mesh.v_max),
        Axis::V => (mesh.u_min, mesh.u_max),
    };
    let start = start.max(other_lo);
    let stop = stop.min(other_hi);
    if !(start < stop) {
        return Ok(0);
    }

    let mut newline = MeshLine::new(axis, const_par, start, stop, multiplicity);

    // Phase 0 - merge
    let mut i = 0;
    while i < mesh.mesh_lines.len() {
        let should_merge =
            mesh.mesh_lines[i].same_line(&newline) && mesh.mesh_lines[i].overlaps_or_touches(&newline);
        if should_merge {
            let existing = mesh.mesh_lines.remove(i);
            newline.union_with(&existing);
            if existing.multiplicity != newline.multiplicity {
                if strict_multiplicity {
                    return Err(RefineError::MultiplicityMismatch {
                        axis,
                        const_par: alloc::format!("{}", const_par),
                        existing: existing.multiplicity,
                        requested: multiplicity,
                    });
                }
                log::debug!(
                    "merge at {:?}={:?}: overwriting requested multiplicity {} with existing {}",
                    axis,
                    const_par,
                    newline.multiplicity,
                    existing.multiplicity
                );
                newline.multiplicity = existing.multiplicity;
            }
        } else {
            i += 1;
        }
    }

    let before = mesh.basis_count();

    // Phase 1 - split against existing entities
    let mut new_from_phase1: Vec<BasisId> = Vec::new();
    let basis_snapshot: Vec<BasisId> = mesh.basis_ids().collect();
    for bid in basis_snapshot {
        if !mesh.basis_exists(bid) {
            continue;
        }
        let should_split = {
            let b = mesh.basis(bid);
            newline.splits_basis(b) && !newline.contained_in_basis(b)
        };
        if should_split {
            split_recursive(mesh, bid, axis, const_par, newline.multiplicity, &mut new_from_phase1);
        }
    }

    let element_snapshot: Vec<ElementId> = mesh.element_ids().collect();
    for eid in element_snapshot {
        if !mesh.element_exists(eid) {
            continue;
        }
        if newline.splits_element(mesh.element(eid)) {
            split_element(mesh, eid, axis, const_par);
        }
    }

    // Phase 2 - propagate
    mesh.mesh_lines.push(newline);

    let mut queue: VecDeque<BasisId> = new_from_phase1.into_iter().collect();
    while let Some(bid) = queue.pop_front() {
        if !mesh.basis_exists(bid) {
            continue;
        }
        let violating = mesh.mesh_lines.iter().copied().find(|line| {
            let b = mesh.basis(bid);
            line.splits_basis(b) && !line.contained_in_basis(b)
        });
        if let Some(line) = violating {
            let mut new_ids = Vec::new();
            split_recursive(mesh, bid, line.axis, line.const_par, line.multiplicity, &mut new_ids);
            for id in new_ids.into_iter().rev() {
                queue.push_front(id);
            }
        }
    }

    let after = mesh.basis_count();
    Ok(after.saturating_sub(before))
}

/// Perform a single knot-insertion split of `id` at `(axis, t)`, absorbing
/// each child into a knot-equal survivor when one exists among the elements
/// that supported the parent, otherwise inserting it and reconnecting the
/// support graph; recurses while a surviving child still straddles `t` and
/// `multiplicity` has not been exhausted (§4.1).
fn split_recursive<T: Numeric>(
    mesh: &mut LrMesh<T>,
    id: BasisId,
    axis: Axis,
    t: T,
    multiplicity: u32,
    new_ids: &mut Vec<BasisId>,
) {
    let parent: BasisFunction<T> = mesh.basis(id).clone();
    let children = parent.split_once(axis, t);
    if children.is_empty() {
        return;
    }

    let parent_support: Vec<ElementId> = parent.supported_by.iter().copied().collect();
    mesh.remove_basis(id);

    for child in children {
        let mut absorbed_into: Option<BasisId> = None;
        'search: for &eid in &parent_support {
            let candidates: Vec<BasisId> = mesh.element(eid).support.iter().copied().collect();
            for cid in candidates {
                if mesh.basis(cid).knots_eq(&child) {
                    absorbed_into = Some(cid);
                    break 'search;
                }
            }
        }

        if let Some(cid) = absorbed_into {
            mesh.basis_mut(cid).absorb(&child);
            log::trace!("absorbed split child into existing basis function");
            continue;
        }

        let new_id = mesh.insert_basis(child);
        for &eid in &parent_support {
            if mesh.element_overlaps_basis(new_id, eid) {
                mesh.connect(new_id, eid);
            }
        }
        new_ids.push(new_id);

        if multiplicity > 1 && mesh.basis(new_id).straddles(axis, t) {
            split_recursive(mesh, new_id, axis, t, multiplicity - 1, new_ids);
        }
    }
}

fn split_element<T: Numeric>(mesh: &mut LrMesh<T>, id: ElementId, axis: Axis, c: T) {
    let e = mesh.element(id).clone();
    let (lo, hi) = e.split(axis, c);
    let old_support: Vec<BasisId> = e.support.iter().copied().collect();
    mesh.remove_element(id);
    let lo_id = mesh.insert_element(lo);
    let hi_id = mesh.insert_element(hi);
    for bid in old_support {
        if mesh.element_overlaps_basis(bid, lo_id) {
            mesh.connect(bid, lo_id);
        }
        if mesh.element_overlaps_basis(bid, hi_id) {
            mesh.connect(bid, hi_id);
        }
    }
}

/// `refineBasisFunction` (§6): a central const-u and const-v line across the
/// function's support.
pub fn central_lines<T: Numeric>(b: &BasisFunction<T>) -> [LineRequest<T>; 2] {
    let two = T::from_usize(2).expect("T represents 2");
    let (u0, u1) = b.support(Axis::U);
    let (v0, v1) = b.support(Axis::V);
    [
        LineRequest {
            axis: Axis::U,
            const_par: (u0 + u1) / two,
            start: v0,
            stop: v1,
        },
        LineRequest {
            axis: Axis::V,
            const_par: (v0 + v1) / two,
            start: u0,
            stop: u1,
        },
    ]
}

/// `refineElement` (§4.4): zero or more line requests for one element under
/// the given strategy.
pub fn refine_element_lines<T: Numeric>(
    mesh: &LrMesh<T>,
    element_id: ElementId,
    strategy: RefineStrategy,
) -> Vec<LineRequest<T>> {
    match strategy {
        RefineStrategy::Safe => safe_or_minspan_lines(mesh, element_id, false),
        RefineStrategy::MinSpan => safe_or_minspan_lines(mesh, element_id, true),
        RefineStrategy::IsotropicElem | RefineStrategy::IsotropicFunc => {
            isotropic_lines(mesh, element_id)
        }
    }
}

fn safe_or_minspan_lines<T: Numeric>(
    mesh: &LrMesh<T>,
    element_id: ElementId,
    min_span: bool,
) -> Vec<LineRequest<T>> {
    let e = mesh.element(element_id);
    let mut out = Vec::new();

    for axis in [Axis::U, Axis::V] {
        let mut chosen: Option<(T, T)> = None;
        for &bid in &e.support {
            let b = mesh.basis(bid);
            let span = b.support(axis);
            let width = span.1 - span.0;
            chosen = Some(match chosen {
                None => span,
                Some(cur) => {
                    let cur_width = cur.1 - cur.0;
                    let take = if min_span { width < cur_width } else { width > cur_width };
                    if take { span } else { cur }
                }
            });
        }
        let Some((lo, hi)) = chosen else { continue };
        let const_par = (lo + hi) / T::from_usize(2).expect("T represents 2");
        let (other_lo, other_hi) = if min_span {
            // span exactly the chosen function's own extent on the other axis
            let mut narrowest: Option<(T, T)> = None;
            for &bid in &e.support {
                let b = mesh.basis(bid);
                let span = b.support(axis);
                if approx_eq(span.0, lo) && approx_eq(span.1, hi) {
                    narrowest = Some(b.support(axis.other()));
                    break;
                }
            }
            narrowest.unwrap_or_else(|| e.bounds(axis.other()))
        } else {
            e.bounds(axis.other())
        };

        let (start, stop) = match axis {
            Axis::U => (other_lo, other_hi),
            Axis::V => (other_lo, other_hi),
        };
        out.push(LineRequest {
            axis,
            const_par,
            start,
            stop,
        });
    }

    out
}

fn isotropic_lines<T: Numeric>(mesh: &LrMesh<T>, element_id: ElementId) -> Vec<LineRequest<T>> {
    let e = mesh.element(element_id);
    let mut out = Vec::new();

    for axis in [Axis::U, Axis::V] {
        let mut spans: Vec<T> = Vec::new();
        for &bid in &e.support {
            let b = mesh.basis(bid);
            let k = b.local_knots(axis);
            for w in k.windows(2) {
                let d = w[1] - w[0];
                if d > T::zero() {
                    spans.push(d);
                }
            }
        }
        if spans.is_empty() {
            continue;
        }
        let min_span = spans
            .iter()
            .copied()
            .fold(spans[0], |a, b| if b < a { b } else { a });
        let all_equal = spans.iter().all(|&s| approx_eq(s, min_span));
        let step = if all_equal {
            min_span / T::from_usize(2).expect("T represents 2")
        } else {
            min_span
        };

        let (lo, hi) = e.bounds(axis);
        let (other_lo, other_hi) = e.bounds(axis.other());
        let mut k = 1usize;
        loop {
            let kf = T::from_usize(k).expect("T represents small integers");
            let c = lo + kf * step;
            if !(c < hi) {
                break;
            }
            out.push(LineRequest {
                axis,
                const_par: c,
                start: other_lo,
                stop: other_hi,
            });
            k += 1;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DVector;

    fn uniform_biquadratic() -> LrMesh<f64> {
        let ku = alloc::vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 3.0, 3.0];
        let kv = ku.clone();
        let cps: Vec<(f64, DVector<f64>)> = (0..25)
            .map(|_| (1.0, DVector::from_element(1, 1.0)))
            .collect();
        LrMesh::from_raw(3, 3, &ku, &kv, &cps, 1, false).unwrap()
    }

    #[test]
    fn central_refinement_creates_five_new_basis_functions() {
        let mut mesh = uniform_biquadratic();
        let before = mesh.basis_count();
        let new_count = mesh
            .insert_line(Axis::U, 1.5, 0.0, 3.0, 1, false)
            .unwrap();
        assert_eq!(new_count, 5);
        assert_eq!(mesh.basis_count(), before + 5);
        assert_eq!(mesh.element_count(), 12);
    }

    #[test]
    fn repeated_insertion_is_idempotent() {
        let mut mesh = uniform_biquadratic();
        mesh.insert_line(Axis::U, 1.5, 0.0, 3.0, 1, false).unwrap();
        let after_first = mesh.basis_count();
        let added = mesh.insert_line(Axis::U, 1.5, 0.0, 3.0, 1, false).unwrap();
        assert_eq!(added, 0);
        assert_eq!(mesh.basis_count(), after_first);
    }

    #[test]
    fn multiplicity_merge_widens_and_upgrades() {
        let mut mesh = uniform_biquadratic();
        mesh.insert_line(Axis::U, 1.5, 0.0, 1.5, 1, false).unwrap();
        mesh.insert_line(Axis::U, 1.5, 1.0, 3.0, 2, false).unwrap();

        let merged: Vec<_> = mesh
            .mesh_lines
            .iter()
            .filter(|m| m.axis == Axis::U && approx_eq(m.const_par, 1.5))
            .collect();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].start, 0.0);
        assert_eq!(merged[0].stop, 3.0);
        assert_eq!(merged[0].multiplicity, 2);
    }

    #[test]
    fn out_of_domain_request_is_a_no_op() {
        let mut mesh = uniform_biquadratic();
        let added = mesh.insert_line(Axis::U, 0.0, 0.0, 3.0, 1, false).unwrap();
        assert_eq!(added, 0);
    }
}
