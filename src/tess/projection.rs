// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Projection of 3D input onto the sweep plane.

use crate::geom::{Real, SweepPoint};
use crate::mesh::Mesh;

fn dot(u: [Real; 3], v: [Real; 3]) -> Real {
    u[0] * v[0] + u[1] * v[1] + u[2] * v[2]
}

fn cross(u: [Real; 3], v: [Real; 3]) -> [Real; 3] {
    [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ]
}

fn sub(u: [Real; 3], v: [Real; 3]) -> [Real; 3] {
    [u[0] - v[0], u[1] - v[1], u[2] - v[2]]
}

pub(crate) fn long_axis(v: [Real; 3]) -> usize {
    let mut i = 0;
    if v[1].abs() > v[0].abs() {
        i = 1;
    }
    if v[2].abs() > v[i].abs() {
        i = 2;
    }
    i
}

pub(crate) fn short_axis(v: [Real; 3]) -> usize {
    let mut i = 0;
    if v[1].abs() < v[0].abs() {
        i = 1;
    }
    if v[2].abs() < v[i].abs() {
        i = 2;
    }
    i
}

/// Estimates the plane normal of the input: the largest triangle through
/// the two extreme vertices along the axis of greatest extent. Falls back
/// to +z for empty or single-point input, and to an axis perpendicular to
/// the input when it is collinear.
pub(crate) fn compute_normal<V>(mesh: &Mesh<V>) -> [Real; 3] {
    let verts: Vec<_> = mesh.vertices().collect();
    let first = match verts.first() {
        Some(&v) => v,
        None => return [0.0, 0.0, 1.0],
    };

    let mut min_val = mesh.coords(first);
    let mut max_val = min_val;
    let mut min_vert = [first; 3];
    let mut max_vert = [first; 3];
    for &v in &verts {
        let c = mesh.coords(v);
        for i in 0..3 {
            if c[i] < min_val[i] {
                min_val[i] = c[i];
                min_vert[i] = v;
            }
            if c[i] > max_val[i] {
                max_val[i] = c[i];
                max_vert[i] = v;
            }
        }
    }

    let mut i = 0;
    if max_val[1] - min_val[1] > max_val[0] - min_val[0] {
        i = 1;
    }
    if max_val[2] - min_val[2] > max_val[i] - min_val[i] {
        i = 2;
    }
    if min_val[i] >= max_val[i] {
        // All vertices coincide.
        return [0.0, 0.0, 1.0];
    }

    let v2 = mesh.coords(max_vert[i]);
    let d1 = sub(mesh.coords(min_vert[i]), v2);
    let mut norm = [0.0; 3];
    let mut max_len2 = 0.0;
    for &v in &verts {
        let n = cross(d1, sub(mesh.coords(v), v2));
        let len2 = dot(n, n);
        if len2 > max_len2 {
            max_len2 = len2;
            norm = n;
        }
    }

    if max_len2 <= 0.0 {
        // Collinear input: any normal perpendicular to the line will do.
        norm = [0.0; 3];
        norm[short_axis(d1)] = 1.0;
    }
    norm
}

/// Flips the `t` axis if the contours wind clockwise overall, so that a
/// computed normal always sees the input as counter-clockwise.
fn check_orientation<V>(mesh: &mut Mesh<V>) -> bool {
    let mut area = 0.0;
    for f in mesh.faces() {
        let start = mesh.face_edge(f);
        if mesh.winding(start) <= 0 {
            continue;
        }
        for e in mesh.face_loop(start) {
            let (o, d) = (mesh.org_pos(e), mesh.dst_pos(e));
            area += (o.s - d.s) * (o.t + d.t);
        }
    }
    if area >= 0.0 {
        return false;
    }
    let verts: Vec<_> = mesh.vertices().collect();
    for v in verts {
        let pos = &mut mesh.vert_mut(v).pos;
        pos.t = -pos.t;
    }
    true
}

/// Sets the sweep position of every vertex by projecting onto the
/// coordinate plane most nearly perpendicular to `normal`. A zero normal is
/// computed from the input first. Returns the normal used.
pub(crate) fn project_polygon<V>(mesh: &mut Mesh<V>, normal: [Real; 3]) -> [Real; 3] {
    let computed = normal == [0.0; 3];
    let norm = if computed { compute_normal(mesh) } else { normal };

    let i = long_axis(norm);
    let mut s_unit = [0.0; 3];
    let mut t_unit = [0.0; 3];
    s_unit[(i + 1) % 3] = 1.0;
    t_unit[(i + 2) % 3] = if norm[i] > 0.0 { 1.0 } else { -1.0 };

    let verts: Vec<_> = mesh.vertices().collect();
    for v in verts {
        let c = mesh.coords(v);
        mesh.vert_mut(v).pos = SweepPoint::new(dot(c, s_unit), dot(c, t_unit));
    }
    if computed && check_orientation(mesh) {
        log::debug!("computed normal {:?}; contours reversed to counter-clockwise", norm);
    }
    norm
}
