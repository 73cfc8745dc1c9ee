// Copyright 2025 Lars Brubaker
// Tests for 3D coordinate input and custom normal vectors.

use approx::assert_relative_eq;
use glu_tess::{tessellate, Real, TessOptions, TessOutput, WindingRule};

fn options_3d(rule: WindingRule, normal: [Real; 3]) -> TessOptions {
    TessOptions {
        winding_rule: rule,
        normal,
        vertex_size: 3,
        ..TessOptions::default()
    }
}

fn sub(a: &[Real], b: &[Real]) -> [Real; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn cross(u: [Real; 3], v: [Real; 3]) -> [Real; 3] {
    [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ]
}

fn triangle_normals(out: &TessOutput) -> Vec<[Real; 3]> {
    out.triangles()
        .map(|[a, b, c]| {
            let (a, b, c) = (out.vertex(a), out.vertex(b), out.vertex(c));
            cross(sub(b, a), sub(c, a))
        })
        .collect()
}

fn area_3d(out: &TessOutput) -> Real {
    triangle_normals(out)
        .iter()
        .map(|n| 0.5 * (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt())
        .sum()
}

/// Lifts flat 2D coordinates onto the plane `z = x + y`.
fn lift(flat: &[Real]) -> Vec<Real> {
    flat.chunks_exact(2)
        .flat_map(|p| [p[0], p[1], p[0] + p[1]])
        .collect()
}

/// A U shape whose fan from the first corner folds over, forcing the sweep.
fn u_shape() -> Vec<Real> {
    vec![0.0, 0.0, 3.0, 0.0, 3.0, 3.0, 2.0, 3.0, 2.0, 1.0, 1.0, 1.0, 1.0, 3.0, 0.0, 3.0]
}

fn reversed(flat: &[Real], size: usize) -> Vec<Real> {
    flat.chunks_exact(size).rev().flatten().copied().collect()
}

#[test]
fn xy_plane_at_constant_height() {
    let quad = [0.0, 0.0, 5.0, 1.0, 0.0, 5.0, 1.0, 1.0, 5.0, 0.0, 1.0, 5.0];
    let out = tessellate(&[&quad[..]], &options_3d(WindingRule::Positive, [0.0, 0.0, 1.0])).unwrap();
    assert_eq!(out.triangle_count(), 2);
    assert_eq!(out.vertices.len(), out.vertex_count() * 3);
    for v in out.vertices.chunks_exact(3) {
        assert_eq!(v[2], 5.0);
    }
}

#[test]
fn explicit_normal_decides_orientation() {
    // A quad in the XZ plane, counter-clockwise seen from -y.
    let quad = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 1.0];
    let up = tessellate(&[&quad[..]], &options_3d(WindingRule::Positive, [0.0, 1.0, 0.0])).unwrap();
    assert_eq!(up.triangle_count(), 0);
    let down = tessellate(&[&quad[..]], &options_3d(WindingRule::Positive, [0.0, -1.0, 0.0])).unwrap();
    assert_eq!(down.triangle_count(), 2);
    let negative = tessellate(&[&quad[..]], &options_3d(WindingRule::Negative, [0.0, 1.0, 0.0])).unwrap();
    assert_eq!(negative.triangle_count(), 2);
}

#[test]
fn computed_normal_accepts_either_orientation() {
    let ccw = lift(&u_shape());
    let cw = reversed(&ccw, 3);
    for contour in [ccw, cw] {
        let out = tessellate(&[&contour[..]], &options_3d(WindingRule::Positive, [0.0; 3])).unwrap();
        assert_eq!(out.triangle_count(), 6);
        assert_relative_eq!(area_3d(&out), 7.0 * (3.0 as Real).sqrt(), epsilon = 1e-9);
    }
}

#[test]
fn triangles_share_the_plane_orientation() {
    let contour = lift(&u_shape());
    let out = tessellate(&[&contour[..]], &options_3d(WindingRule::NonZero, [0.0; 3])).unwrap();
    let normals = triangle_normals(&out);
    let first = normals[0];
    for n in &normals {
        let dot = n[0] * first[0] + n[1] * first[1] + n[2] * first[2];
        assert!(dot > 0.0, "triangle normal {:?} opposes {:?}", n, first);
        // Parallel to (-1, -1, 1), the normal of z = x + y.
        assert_relative_eq!(n[0], n[1], epsilon = 1e-9);
        assert_relative_eq!(n[0], -n[2], epsilon = 1e-9);
    }
}

#[test]
fn vertical_plane_with_computed_normal() {
    // A holed square in the YZ plane at x = 2.
    let outer = [2.0, 0.0, 0.0, 2.0, 4.0, 0.0, 2.0, 4.0, 4.0, 2.0, 0.0, 4.0];
    let hole = [2.0, 1.0, 1.0, 2.0, 1.0, 3.0, 2.0, 3.0, 3.0, 2.0, 3.0, 1.0];
    let out = tessellate(&[&outer[..], &hole[..]], &options_3d(WindingRule::Odd, [0.0; 3])).unwrap();
    assert_eq!(out.triangle_count(), 8);
    assert_relative_eq!(area_3d(&out), 12.0, epsilon = 1e-9);
    assert!(out.vertices.chunks_exact(3).all(|v| v[0] == 2.0));
}

#[test]
fn tilted_plane_with_crossing_edges() {
    let bowtie = lift(&[0.0, 0.0, 2.0, 2.0, 2.0, 0.0, 0.0, 2.0]);
    let out = tessellate(&[&bowtie[..]], &options_3d(WindingRule::Odd, [0.0; 3])).unwrap();
    assert_eq!(out.triangle_count(), 2);
    assert_eq!(out.vertex_count(), 5);
    // The crossing lies on the plane too.
    let v = out.vertex(4);
    assert_relative_eq!(v[0], 1.0, epsilon = 1e-12);
    assert_relative_eq!(v[1], 1.0, epsilon = 1e-12);
    assert_relative_eq!(v[2], 2.0, epsilon = 1e-12);
}
