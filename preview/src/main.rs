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

use anyhow::Result;
use bevy::{
    camera_controller::free_camera::{FreeCamera, FreeCameraPlugin},
    color::palettes::tailwind,
    prelude::*,
};
use lr_spline::mesh::LrMesh;
use lr_spline::{Command, DVector, LrSurface};
use lr_spline_commands::evaluate::Tessellate;

fn main() -> Result<()> {
    let surface: LrSurface<f64> = LrSurface::new(demo_mesh());
    let points = surface.apply(&mut Tessellate { resolution: 40 });

    App::new()
        .insert_resource(ClearColor(tailwind::BLUE_50.into()))
        .insert_resource(Render { points, surface })
        .add_plugins(DefaultPlugins)
        .add_plugins(FreeCameraPlugin)
        .add_systems(Startup, (setup, draw_points, draw_control))
        .add_systems(Update, draw_mesh_lines)
        .run();

    Ok(())
}

/// A 3x3 bi-quadratic patch with a lifted center, refined once down the
/// middle so the preview always has at least one T-junction to draw.
fn demo_mesh() -> LrMesh<f64> {
    let ku = vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 3.0, 3.0];
    let kv = ku.clone();

    let mut cps: Vec<(f64, DVector<f64>)> = Vec::with_capacity(25);
    for j in 0..5 {
        for i in 0..5 {
            let x = i as f64 * 0.75;
            let y = j as f64 * 0.75;
            let z = if i == 2 && j == 2 { 1.0 } else { 0.0 };
            cps.push((1.0, DVector::from_row_slice(&[x, y, z])));
        }
    }

    let mut mesh = LrMesh::from_raw(3, 3, &ku, &kv, &cps, 3, false).unwrap();
    mesh.insert_line(lr_spline::axis::Axis::U, 1.5, 0.0, 3.0, 1, false)
        .unwrap();
    mesh
}

fn setup(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(5.0, 6.0, 8.0).looking_at(Vec3::new(1.5, 1.5, 0.0), Vec3::Y),
        DirectionalLight { ..default() },
        FreeCamera {
            sensitivity: 0.2,
            friction: 25.0,
            walk_speed: 3.0,
            run_speed: 9.0,
            ..default()
        },
    ));
}

#[derive(Resource)]
struct Render {
    points: Vec<DVector<f64>>,
    surface: LrSurface<f64>,
}

fn draw_points(
    render: Res<Render>,
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let point_mesh = meshes.add(Sphere::new(0.02));
    let point_mat = materials.add(StandardMaterial {
        base_color: tailwind::GREEN_500.into(),
        unlit: true,
        ..default()
    });

    for p in &render.points {
        commands.spawn((
            Mesh3d(point_mesh.clone()),
            MeshMaterial3d(point_mat.clone()),
            Transform::from_xyz(p[0] as f32, p[1] as f32, p[2] as f32),
        ));
    }
}

fn draw_control(
    render: Res<Render>,
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let control_mesh = meshes.add(Sphere::new(0.05));
    let control_mat = materials.add(StandardMaterial {
        base_color: tailwind::AMBER_500.into(),
        unlit: true,
        ..default()
    });

    render.surface.apply(&mut |mesh: &LrMesh<f64>| {
        for bid in mesh.basis_ids() {
            let c = &mesh.basis(bid).control_point;
            commands.spawn((
                Mesh3d(control_mesh.clone()),
                MeshMaterial3d(control_mat.clone()),
                Transform::from_xyz(c[0] as f32, c[1] as f32, c[2] as f32),
            ));
        }
    });
}

/// Draw every mesh-line segment in the parametric (x, y) plane, the LR
/// analogue of the teacher's half-edge cage.
fn draw_mesh_lines(render: Res<Render>, mut gizmos: Gizmos) {
    render.surface.apply(&mut |mesh: &LrMesh<f64>| {
        for line in &mesh.mesh_lines {
            let (from, to) = match line.axis {
                lr_spline::axis::Axis::U => (
                    Vec3::new(line.const_par as f32, line.start as f32, 0.0),
                    Vec3::new(line.const_par as f32, line.stop as f32, 0.0),
                ),
                lr_spline::axis::Axis::V => (
                    Vec3::new(line.start as f32, line.const_par as f32, 0.0),
                    Vec3::new(line.stop as f32, line.const_par as f32, 0.0),
                ),
            };
            gizmos.line(from, to, tailwind::GREEN_500);
        }
    });
}
