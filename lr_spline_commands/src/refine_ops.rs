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

//! `refineBasisFunction`, `refineElement`, `insertConstULine` and
//! `insertConstVLine` (§6): `CommandMut` wrappers over
//! [`lr_spline::mesh::LrMesh::insert_line`] that additionally honor the
//! [`RefineConfig`] knobs (close-gaps, max-T-joints, max-aspect-ratio,
//! mirrored symmetry).

use crate::config::RefineConfig;
use lr_spline::CommandMut;
use lr_spline::axis::Axis;
use lr_spline::ids::{BasisId, ElementId};
use lr_spline::mesh::LrMesh;
use lr_spline::refine::{LineRequest, RefineError, central_lines, refine_element_lines};
use lr_spline::Numeric;

/// `refineBasisFunction(ids, m)`: a central const-u and const-v line across
/// each listed function's support.
pub struct RefineBasisFunction<T> {
    pub ids: Vec<BasisId>,
    pub config: RefineConfig<T>,
}

impl<T: Numeric> CommandMut<T> for RefineBasisFunction<T> {
    type Result = Result<usize, RefineError>;

    fn execute(&mut self, mesh: &mut LrMesh<T>) -> Self::Result {
        let mut total = 0;
        for &id in &self.ids {
            if !mesh.basis_exists(id) {
                continue;
            }
            for req in central_lines(mesh.basis(id)) {
                total += apply_request(mesh, req, &self.config)?;
            }
        }
        total += enforce_aspect_ratio(mesh, &self.config)?;
        Ok(total)
    }
}

/// `refineElement(ids, m, strategy)` (§4.4).
pub struct RefineElement<T> {
    pub ids: Vec<ElementId>,
    pub config: RefineConfig<T>,
}

impl<T: Numeric> CommandMut<T> for RefineElement<T> {
    type Result = Result<usize, RefineError>;

    fn execute(&mut self, mesh: &mut LrMesh<T>) -> Self::Result {
        let mut total = 0;
        for &id in &self.ids {
            if !mesh.element_exists(id) {
                continue;
            }
            let requests = refine_element_lines(mesh, id, self.config.ref_strategy);
            for req in requests {
                total += apply_request(mesh, req, &self.config)?;
            }
        }
        total += enforce_aspect_ratio(mesh, &self.config)?;
        Ok(total)
    }
}

/// `insertConstULine(u, vstart, vstop, m)`.
pub struct InsertConstULine<T> {
    pub u: T,
    pub v_start: T,
    pub v_stop: T,
    pub config: RefineConfig<T>,
}

impl<T: Numeric> CommandMut<T> for InsertConstULine<T> {
    type Result = Result<usize, RefineError>;

    fn execute(&mut self, mesh: &mut LrMesh<T>) -> Self::Result {
        let req = LineRequest {
            axis: Axis::U,
            const_par: self.u,
            start: self.v_start,
            stop: self.v_stop,
        };
        let mut total = apply_request(mesh, req, &self.config)?;
        total += enforce_aspect_ratio(mesh, &self.config)?;
        Ok(total)
    }
}

/// `insertConstVLine(v, ustart, ustop, m)`.
pub struct InsertConstVLine<T> {
    pub v: T,
    pub u_start: T,
    pub u_stop: T,
    pub config: RefineConfig<T>,
}

impl<T: Numeric> CommandMut<T> for InsertConstVLine<T> {
    type Result = Result<usize, RefineError>;

    fn execute(&mut self, mesh: &mut LrMesh<T>) -> Self::Result {
        let req = LineRequest {
            axis: Axis::V,
            const_par: self.v,
            start: self.u_start,
            stop: self.u_stop,
        };
        let mut total = apply_request(mesh, req, &self.config)?;
        total += enforce_aspect_ratio(mesh, &self.config)?;
        Ok(total)
    }
}

/// Insert one line request, honoring `close_gaps`, `max_t_joints` and
/// `symmetry`, and report the number of new basis functions it produced.
fn apply_request<T: Numeric>(
    mesh: &mut LrMesh<T>,
    req: LineRequest<T>,
    config: &RefineConfig<T>,
) -> Result<usize, RefineError> {
    let (start, stop) = if config.close_gaps {
        close_gap_bounds(mesh, req.axis, req.start, req.stop)
    } else {
        (req.start, req.stop)
    };

    let mut total = mesh.insert_line(
        req.axis,
        req.const_par,
        start,
        stop,
        config.ref_multiplicity.max(1),
        config.strict_multiplicity,
    )?;

    if let Some(cap) = config.max_t_joints {
        total += enforce_max_t_joints(mesh, req.axis, req.const_par, cap, config)?;
    }

    if config.symmetry {
        let (dom_lo, dom_hi) = match req.axis {
            Axis::U => (mesh.u_min, mesh.u_max),
            Axis::V => (mesh.v_min, mesh.v_max),
        };
        let mirrored = dom_lo + dom_hi - req.const_par;
        if !lr_spline::knot::approx_eq(mirrored, req.const_par) {
            total += mesh.insert_line(
                req.axis,
                mirrored,
                start,
                stop,
                config.ref_multiplicity.max(1),
                config.strict_multiplicity,
            )?;
        }
    }

    Ok(total)
}

/// Extend the just-inserted line fully across the other axis wherever it
/// would otherwise leave an element with more than `cap` T-junctions.
fn enforce_max_t_joints<T: Numeric>(
    mesh: &mut LrMesh<T>,
    axis: Axis,
    const_par: T,
    cap: usize,
    config: &RefineConfig<T>,
) -> Result<usize, RefineError> {
    let offending: Vec<ElementId> = mesh
        .element_ids()
        .filter(|&eid| {
            let (lo, hi) = mesh.element(eid).bounds(axis);
            lo < const_par && const_par < hi && count_t_joints(mesh, eid) > cap
        })
        .collect();

    let mut total = 0;
    for eid in offending {
        let (other_lo, other_hi) = mesh.element(eid).bounds(axis.other());
        total += mesh.insert_line(
            axis,
            const_par,
            other_lo,
            other_hi,
            config.ref_multiplicity.max(1),
            false,
        )?;
    }
    Ok(total)
}

fn count_t_joints<T: Numeric>(mesh: &LrMesh<T>, eid: ElementId) -> usize {
    let e = mesh.element(eid);
    let mut count = 0;
    for line in &mesh.mesh_lines {
        let (lo, hi) = e.bounds(line.axis);
        if !(line.const_par > lo && line.const_par < hi) {
            continue;
        }
        let (other_lo, other_hi) = e.bounds(line.axis.other());
        let starts_inside = line.start > other_lo && line.start < other_hi;
        let stops_inside = line.stop > other_lo && line.stop < other_hi;
        if starts_inside || stops_inside {
            count += 1;
        }
    }
    count
}

/// Snap a line request's endpoints outward to the nearest existing mesh
/// line (or the domain boundary) on the perpendicular axis.
fn close_gap_bounds<T: Numeric>(mesh: &LrMesh<T>, axis: Axis, start: T, stop: T) -> (T, T) {
    let other = axis.other();
    let (dom_lo, dom_hi) = match other {
        Axis::U => (mesh.u_min, mesh.u_max),
        Axis::V => (mesh.v_min, mesh.v_max),
    };

    let mut best_lo = dom_lo;
    let mut best_hi = dom_hi;
    for line in &mesh.mesh_lines {
        if line.axis != other {
            continue;
        }
        if line.const_par <= start && line.const_par > best_lo {
            best_lo = line.const_par;
        }
        if line.const_par >= stop && line.const_par < best_hi {
            best_hi = line.const_par;
        }
    }
    (best_lo, best_hi)
}

/// Single post-fix pass: for every element whose extent ratio exceeds
/// `max_aspect_ratio`, insert a centered line across its longer axis.
fn enforce_aspect_ratio<T: Numeric>(
    mesh: &mut LrMesh<T>,
    config: &RefineConfig<T>,
) -> Result<usize, RefineError> {
    let Some(bound) = config.max_aspect_ratio else {
        return Ok(0);
    };
    let two = T::from_usize(2).expect("T represents 2");

    let offenders: Vec<(ElementId, Axis)> = mesh
        .element_ids()
        .filter_map(|eid| {
            let e = mesh.element(eid);
            let du = e.u_max - e.u_min;
            let dv = e.v_max - e.v_min;
            if dv > T::zero() && du / dv > bound {
                Some((eid, Axis::U))
            } else if du > T::zero() && dv / du > bound {
                Some((eid, Axis::V))
            } else {
                None
            }
        })
        .collect();

    let mut total = 0;
    for (eid, axis) in offenders {
        if !mesh.element_exists(eid) {
            continue;
        }
        let (lo, hi) = mesh.element(eid).bounds(axis);
        let (other_lo, other_hi) = mesh.element(eid).bounds(axis.other());
        let const_par = (lo + hi) / two;
        total += mesh.insert_line(axis, const_par, other_lo, other_hi, 1, false)?;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lr_spline::refine::RefineStrategy;
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
    fn insert_const_u_line_grows_basis_count() {
        let mut mesh = uniform_biquadratic();
        let mut op = InsertConstULine {
            u: 1.5,
            v_start: 0.0,
            v_stop: 3.0,
            config: RefineConfig::new(RefineStrategy::Safe, 1),
        };
        let added = op.execute(&mut mesh).unwrap();
        assert_eq!(added, 5);
    }

    #[test]
    fn refine_basis_function_splits_both_axes() {
        let mut mesh = uniform_biquadratic();
        let bid = mesh.basis_ids().nth(12).unwrap();
        let mut op = RefineBasisFunction {
            ids: vec![bid],
            config: RefineConfig::new(RefineStrategy::Safe, 1),
        };
        let added = op.execute(&mut mesh).unwrap();
        assert!(added > 0);
    }

    #[test]
    fn refine_element_dispatches_by_strategy() {
        let mut mesh = uniform_biquadratic();
        let eid = mesh.element_ids().next().unwrap();
        let mut op = RefineElement {
            ids: vec![eid],
            config: RefineConfig::new(RefineStrategy::MinSpan, 1),
        };
        let added = op.execute(&mut mesh).unwrap();
        assert!(added > 0);
    }

    #[test]
    fn symmetry_mirrors_the_request() {
        let mut mesh = uniform_biquadratic();
        let mut config = RefineConfig::new(RefineStrategy::Safe, 1);
        config.symmetry = true;
        let mut op = InsertConstULine {
            u: 1.0,
            v_start: 0.0,
            v_stop: 3.0,
            config,
        };
        op.execute(&mut mesh).unwrap();
        let u_lines: Vec<_> = mesh
            .mesh_lines
            .iter()
            .filter(|l| l.axis == Axis::U)
            .map(|l| l.const_par)
            .collect();
        assert!(u_lines.iter().any(|&c| (c - 1.0).abs() < 1e-9));
        assert!(u_lines.iter().any(|&c| (c - 2.0).abs() < 1e-9));
    }

    #[test]
    fn close_gaps_snaps_to_nearest_existing_line() {
        let mut mesh = uniform_biquadratic();
        mesh.insert_line(Axis::V, 1.0, 0.0, 3.0, 1, false).unwrap();
        mesh.insert_line(Axis::V, 2.0, 0.0, 3.0, 1, false).unwrap();

        let mut config = RefineConfig::new(RefineStrategy::Safe, 1);
        config.close_gaps = true;
        let mut op = InsertConstULine {
            u: 1.5,
            v_start: 1.2,
            v_stop: 1.8,
            config,
        };
        op.execute(&mut mesh).unwrap();
        let line = mesh
            .mesh_lines
            .iter()
            .find(|l| l.axis == Axis::U && (l.const_par - 1.5).abs() < 1e-9)
            .unwrap();
        assert_eq!(line.start, 1.0);
        assert_eq!(line.stop, 2.0);
    }
}
