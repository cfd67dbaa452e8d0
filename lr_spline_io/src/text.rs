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

//! The text format of §6: a header line, then one record per basis
//! function, mesh-line segment and element. Comment lines start with `#`
//! and are skipped on read, following the original's `write`/read stream
//! (`# LRSPLINE`, `# p1 p2 Nbasis Nline Nel dim rat`, ...).

use lr_spline::DVector;
use lr_spline::Numeric;
use lr_spline::axis::Axis;
use lr_spline::ids::BasisId;
use lr_spline::mesh::LrMesh;
use lr_spline::meshline::MeshLine;
use thiserror::Error;

#[derive(Error, Debug, Eq, PartialEq)]
pub enum TextFormatError {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("invalid header")]
    InvalidHeader,
    #[error("invalid number: {0}")]
    InvalidNumber(String),
}

/// Serialize `mesh` to the text format.
pub fn write_surface<T: Numeric + core::fmt::Display>(mesh: &LrMesh<T>) -> String {
    let mut out = String::new();
    out.push_str("# LRSPLINE\n");
    out.push_str("#\tp1\tp2\tNbasis\tNline\tNel\tdim\trat\n");
    out.push_str(&format!(
        "\t{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
        mesh.order_u,
        mesh.order_v,
        mesh.basis_count(),
        mesh.mesh_lines.len(),
        mesh.element_count(),
        mesh.dimension,
        if mesh.rational { 1 } else { 0 },
    ));

    out.push_str("# Basis functions:\n");
    for bid in mesh.basis_ids() {
        let b = mesh.basis(bid);
        let knots_u: Vec<String> = b.knots_u.iter().map(|v| v.to_string()).collect();
        let knots_v: Vec<String> = b.knots_v.iter().map(|v| v.to_string()).collect();
        let cp: Vec<String> = b.control_point.iter().map(|v| v.to_string()).collect();
        out.push_str(&format!(
            "{} | {} | {} {}\n",
            knots_u.join(" "),
            knots_v.join(" "),
            cp.join(" "),
            b.weight,
        ));
    }

    out.push_str("# Mesh lines:\n");
    for line in &mesh.mesh_lines {
        let axis_flag = if line.axis == Axis::U { 0 } else { 1 };
        out.push_str(&format!(
            "{} {} {} {} {}\n",
            axis_flag, line.const_par, line.start, line.stop, line.multiplicity
        ));
    }

    out.push_str("# Elements:\n");
    for eid in mesh.element_ids() {
        let e = mesh.element(eid);
        let ids: Vec<String> = e.support.iter().map(|b| b.0.to_string()).collect();
        out.push_str(&format!(
            "{} {} {} {} {} {}\n",
            e.u_min,
            e.u_max,
            e.v_min,
            e.v_max,
            ids.len(),
            ids.join(" "),
        ));
    }

    out
}

/// Parse the text format back into a mesh. Basis functions and elements are
/// read in file order, so their freshly assigned [`BasisId`]/[`ElementId`]s
/// match the indices the element records reference.
pub fn read_surface<T>(input: &str) -> Result<LrMesh<T>, TextFormatError>
where
    T: Numeric + core::str::FromStr,
{
    let mut lines = input.lines().filter(|l| !l.trim_start().starts_with('#') && !l.trim().is_empty());

    let header = lines.next().ok_or(TextFormatError::UnexpectedEof)?;
    let mut fields = header.split_whitespace();
    let order_u = parse_usize(fields.next())?;
    let order_v = parse_usize(fields.next())?;
    let n_basis = parse_usize(fields.next())?;
    let n_lines = parse_usize(fields.next())?;
    let n_elements = parse_usize(fields.next())?;
    let dimension = parse_usize(fields.next())?;
    let rational = parse_usize(fields.next())? != 0;
    if fields.next().is_some() {
        return Err(TextFormatError::InvalidHeader);
    }

    let mut basis_rows = Vec::with_capacity(n_basis);
    for _ in 0..n_basis {
        let row = lines.next().ok_or(TextFormatError::UnexpectedEof)?;
        basis_rows.push(parse_basis_row::<T>(row, order_u, order_v, dimension)?);
    }

    let mut line_rows = Vec::with_capacity(n_lines);
    for _ in 0..n_lines {
        let row = lines.next().ok_or(TextFormatError::UnexpectedEof)?;
        line_rows.push(parse_line_row::<T>(row)?);
    }

    let mut element_rows = Vec::with_capacity(n_elements);
    for _ in 0..n_elements {
        let row = lines.next().ok_or(TextFormatError::UnexpectedEof)?;
        element_rows.push(parse_element_row::<T>(row)?);
    }

    let (u_min, u_max, v_min, v_max) = domain_bounds(&element_rows)?;
    let mut mesh = LrMesh::empty(order_u, order_v, u_min, u_max, v_min, v_max, dimension, rational);

    for (ku, kv, cp, w) in basis_rows {
        let basis = lr_spline::basis::BasisFunction::new(ku, kv, cp, w);
        mesh.insert_basis(basis);
    }
    for line in line_rows {
        mesh.mesh_lines.push(line);
    }
    for (u0, u1, v0, v1, support) in element_rows {
        let element = lr_spline::element::Element::new(u0, u1, v0, v1);
        let eid = mesh.insert_element(element);
        for idx in support {
            mesh.connect(BasisId(idx), eid);
        }
    }

    Ok(mesh)
}

type BasisRow<T> = (lr_spline::basis::LocalKnots<T>, lr_spline::basis::LocalKnots<T>, DVector<T>, T);
type ElementRow<T> = (T, T, T, T, Vec<usize>);

fn parse_basis_row<T>(row: &str, order_u: usize, order_v: usize, dimension: usize) -> Result<BasisRow<T>, TextFormatError>
where
    T: Numeric + core::str::FromStr,
{
    let (ku_str, rest) = row.split_once('|').ok_or(TextFormatError::InvalidHeader)?;
    let (kv_str, rest) = rest.split_once('|').ok_or(TextFormatError::InvalidHeader)?;
    let ku: lr_spline::basis::LocalKnots<T> = parse_many(ku_str, order_u + 1)?.into_iter().collect();
    let kv: lr_spline::basis::LocalKnots<T> = parse_many(kv_str, order_v + 1)?.into_iter().collect();
    let rest_vals = parse_many::<T>(rest, dimension + 1)?;
    let weight = rest_vals[dimension];
    let cp = DVector::from_row_slice(&rest_vals[..dimension]);
    Ok((ku, kv, cp, weight))
}

fn parse_line_row<T>(row: &str) -> Result<MeshLine<T>, TextFormatError>
where
    T: Numeric + core::str::FromStr,
{
    let mut it = row.split_whitespace();
    let axis_flag = parse_usize(it.next())?;
    let axis = if axis_flag == 0 { Axis::U } else { Axis::V };
    let const_par = parse_one::<T>(it.next())?;
    let start = parse_one::<T>(it.next())?;
    let stop = parse_one::<T>(it.next())?;
    let multiplicity = parse_usize(it.next())? as u32;
    Ok(MeshLine::new(axis, const_par, start, stop, multiplicity))
}

fn parse_element_row<T>(row: &str) -> Result<ElementRow<T>, TextFormatError>
where
    T: Numeric + core::str::FromStr,
{
    let mut it = row.split_whitespace();
    let u_min = parse_one::<T>(it.next())?;
    let u_max = parse_one::<T>(it.next())?;
    let v_min = parse_one::<T>(it.next())?;
    let v_max = parse_one::<T>(it.next())?;
    let count = parse_usize(it.next())?;
    let mut support = Vec::with_capacity(count);
    for _ in 0..count {
        support.push(parse_usize(it.next())?);
    }
    Ok((u_min, u_max, v_min, v_max, support))
}

fn domain_bounds<T: Numeric>(elements: &[ElementRow<T>]) -> Result<(T, T, T, T), TextFormatError> {
    let mut u_min = None;
    let mut u_max = None;
    let mut v_min = None;
    let mut v_max = None;
    for (a, b, c, d, _) in elements {
        u_min = Some(u_min.map_or(*a, |m: T| if *a < m { *a } else { m }));
        u_max = Some(u_max.map_or(*b, |m: T| if *b > m { *b } else { m }));
        v_min = Some(v_min.map_or(*c, |m: T| if *c < m { *c } else { m }));
        v_max = Some(v_max.map_or(*d, |m: T| if *d > m { *d } else { m }));
    }
    match (u_min, u_max, v_min, v_max) {
        (Some(a), Some(b), Some(c), Some(d)) => Ok((a, b, c, d)),
        _ => Err(TextFormatError::UnexpectedEof),
    }
}

fn parse_usize(field: Option<&str>) -> Result<usize, TextFormatError> {
    field
        .ok_or(TextFormatError::UnexpectedEof)?
        .parse()
        .map_err(|_| TextFormatError::InvalidNumber(field.unwrap_or("").to_string()))
}

fn parse_one<T: core::str::FromStr>(field: Option<&str>) -> Result<T, TextFormatError> {
    field
        .ok_or(TextFormatError::UnexpectedEof)?
        .parse()
        .map_err(|_| TextFormatError::InvalidNumber(field.unwrap_or("").to_string()))
}

fn parse_many<T: core::str::FromStr>(s: &str, expected: usize) -> Result<Vec<T>, TextFormatError> {
    let values: Result<Vec<T>, _> = s
        .split_whitespace()
        .map(|tok| tok.parse::<T>().map_err(|_| TextFormatError::InvalidNumber(tok.to_string())))
        .collect();
    let values = values?;
    if values.len() != expected {
        return Err(TextFormatError::InvalidHeader);
    }
    Ok(values)
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
    fn round_trips_basis_and_element_counts() {
        let mesh = uniform_biquadratic();
        let text = write_surface(&mesh);
        let parsed: LrMesh<f64> = read_surface(&text).unwrap();
        assert_eq!(parsed.basis_count(), mesh.basis_count());
        assert_eq!(parsed.element_count(), mesh.element_count());
        assert_eq!(parsed.mesh_lines.len(), mesh.mesh_lines.len());
    }

    #[test]
    fn comment_lines_are_skipped() {
        let mesh = uniform_biquadratic();
        let mut text = write_surface(&mesh);
        text.push_str("# trailing comment, not a record\n");
        assert!(read_surface::<f64>(&text).is_ok());
    }

    #[test]
    fn truncated_input_is_an_error() {
        let mesh = uniform_biquadratic();
        let text = write_surface(&mesh);
        let truncated = &text[..text.len() / 2];
        assert!(read_surface::<f64>(truncated).is_err());
    }
}
