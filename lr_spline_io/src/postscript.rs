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

//! PostScript mesh rendering: an encapsulated-PostScript drawing of the
//! mesh-line arrangement, following the original's `writePostscriptMesh`
//! (scaled bounding box, duplicate-knot-line offset for multiplicity > 1).

use lr_spline::Numeric;
use lr_spline::axis::Axis;
use lr_spline::mesh::LrMesh;
use std::fmt::Write;

/// Render `mesh`'s mesh-line arrangement as an encapsulated PostScript
/// document.
pub fn write_postscript_mesh<T: Numeric>(mesh: &LrMesh<T>) -> String {
    let min_span_u = smallest_span(mesh, Axis::U);
    let min_span_v = smallest_span(mesh, Axis::V);

    let dx = (mesh.u_max - mesh.u_min).to_f64().unwrap_or(1.0);
    let dy = (mesh.v_max - mesh.v_min).to_f64().unwrap_or(1.0);
    let scale = if dx > dy { 1000.0 / dx } else { 1000.0 / dy };
    let dkl_range = if min_span_u > min_span_v {
        min_span_v * scale / 6.0
    } else {
        min_span_u * scale / 6.0
    };

    let u_min = mesh.u_min.to_f64().unwrap_or(0.0);
    let u_max = mesh.u_max.to_f64().unwrap_or(0.0);
    let v_min = mesh.v_min.to_f64().unwrap_or(0.0);
    let v_max = mesh.v_max.to_f64().unwrap_or(0.0);

    let xmin = ((u_min - dx / 100.0) * scale) as i64;
    let ymin = ((v_min - dy / 100.0) * scale) as i64;
    let xmax = ((u_max + dx / 100.0) * scale + dkl_range) as i64;
    let ymax = ((v_max + dy / 100.0) * scale + dkl_range) as i64;

    let mut out = String::new();
    let _ = writeln!(out, "%!PS-Adobe-3.0 EPSF-3.0");
    let _ = writeln!(out, "%%Creator: lr-spline-io");
    let _ = writeln!(out, "%%Title: LR-spline index domain");
    let _ = writeln!(out, "%%Origin: 0 0");
    let _ = writeln!(out, "%%BoundingBox: {xmin} {ymin} {xmax} {ymax}");

    let _ = writeln!(out, "0 setgray");
    let _ = writeln!(out, "1 setlinewidth");
    for line in &mesh.mesh_lines {
        let _ = writeln!(out, "newpath");
        let dm = if line.multiplicity == 1 {
            0.0
        } else {
            dkl_range / (line.multiplicity - 1) as f64
        };
        let const_par = line.const_par.to_f64().unwrap_or(0.0);
        let start = line.start.to_f64().unwrap_or(0.0);
        let stop = line.stop.to_f64().unwrap_or(0.0);

        for m in 0..line.multiplicity {
            let offset = dm * m as f64;
            if line.axis == Axis::U {
                let _ = writeln!(out, "{} {} moveto", start * scale, const_par * scale + offset);
                if approx_eq_f64(stop, v_max) {
                    let _ = writeln!(out, "{} {} lineto", stop * scale + dkl_range, const_par * scale + offset);
                } else {
                    let _ = writeln!(out, "{} {} lineto", stop * scale, const_par * scale + offset);
                }
            } else {
                let _ = writeln!(out, "{} {} moveto", const_par * scale + offset, start * scale);
                if approx_eq_f64(stop, u_max) {
                    let _ = writeln!(out, "{} {} lineto", const_par * scale + offset, stop * scale + dkl_range);
                } else {
                    let _ = writeln!(out, "{} {} lineto", const_par * scale + offset, stop * scale);
                }
            }
        }
        let _ = writeln!(out, "stroke");
    }
    let _ = writeln!(out, "%%EOF");

    out
}

fn smallest_span<T: Numeric>(mesh: &LrMesh<T>, axis: Axis) -> f64 {
    let mut values: Vec<f64> = mesh
        .mesh_lines
        .iter()
        .filter(|l| l.axis == axis)
        .map(|l| l.const_par.to_f64().unwrap_or(0.0))
        .collect();
    values.sort_by(|a, b| a.partial_cmp(b).expect("non-NaN knot"));
    values.dedup();
    values
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold(f64::INFINITY, f64::min)
}

fn approx_eq_f64(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_a_valid_eps_header_and_footer() {
        let ku = vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 3.0, 3.0];
        let kv = ku.clone();
        let cps: Vec<(f64, lr_spline::DVector<f64>)> = (0..25)
            .map(|_| (1.0, lr_spline::DVector::from_element(1, 1.0)))
            .collect();
        let mesh = LrMesh::from_raw(3, 3, &ku, &kv, &cps, 1, false).unwrap();
        let eps = write_postscript_mesh(&mesh);
        assert!(eps.starts_with("%!PS-Adobe-3.0 EPSF-3.0\n"));
        assert!(eps.trim_end().ends_with("%%EOF"));
        assert!(eps.contains("%%BoundingBox:"));
    }
}
