// Copyright 2025 Lars Brubaker
// Shared test utilities for glu-tess tests.

#![allow(dead_code)]

use glu_tess::{tessellate, PrimitiveKind, Real, TessError, TessHandler, TessOptions, TessOutput, WindingRule};

/// Parse whitespace or comma separated `x y` lines. Blank lines separate
/// contours. Returns one flat coordinate array per contour.
pub fn parse_contours(data: &str) -> Vec<Vec<Real>> {
    let mut contours: Vec<Vec<Real>> = Vec::new();
    let mut current: Vec<Real> = Vec::new();

    for line in data.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if !current.is_empty() {
                contours.push(std::mem::take(&mut current));
            }
            continue;
        }
        current.extend(
            trimmed
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|s| !s.is_empty())
                .filter_map(|s| s.parse::<Real>().ok()),
        );
    }
    if !current.is_empty() {
        contours.push(current);
    }
    contours
}

/// Signed area of a 2D triangle.
pub fn triangle_area(a: &[Real], b: &[Real], c: &[Real]) -> Real {
    0.5 * ((b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1]))
}

pub fn total_signed_area(out: &TessOutput) -> Real {
    out.triangles()
        .map(|[a, b, c]| triangle_area(out.vertex(a), out.vertex(b), out.vertex(c)))
        .sum()
}

pub fn total_area(out: &TessOutput) -> Real {
    out.triangles()
        .map(|[a, b, c]| triangle_area(out.vertex(a), out.vertex(b), out.vertex(c)).abs())
        .sum()
}

/// Shoelace area of a flat `[x0, y0, x1, y1, ..]` polygon.
pub fn polygon_signed_area(verts: &[Real]) -> Real {
    let n = verts.len() / 2;
    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += verts[i * 2] * verts[j * 2 + 1] - verts[j * 2] * verts[i * 2 + 1];
    }
    area * 0.5
}

/// Indices in range, coordinates finite, every triangle counter-clockwise.
pub fn verify_valid_output(out: &TessOutput) {
    for (i, v) in out.vertices.iter().enumerate() {
        assert!(v.is_finite(), "vertex component [{}] = {} is not finite", i, v);
    }
    let count = out.vertex_count();
    for (i, &idx) in out.triangles.iter().enumerate() {
        assert!((idx as usize) < count, "index[{}] = {} out of range ({})", i, idx, count);
    }
    for (i, [a, b, c]) in out.triangles().enumerate() {
        let area = triangle_area(out.vertex(a), out.vertex(b), out.vertex(c));
        assert!(area >= 0.0, "triangle {} is clockwise (area {})", i, area);
    }
}

pub fn verify_no_degenerate_triangles(out: &TessOutput, epsilon: Real) {
    for (i, [a, b, c]) in out.triangles().enumerate() {
        let area = triangle_area(out.vertex(a), out.vertex(b), out.vertex(c)).abs();
        assert!(area > epsilon, "triangle {} is degenerate (area {})", i, area);
    }
}

/// How many output triangles strictly contain `p`.
pub fn covering_triangles(out: &TessOutput, p: [Real; 2]) -> usize {
    out.triangles()
        .filter(|&[a, b, c]| {
            let (a, b, c) = (out.vertex(a), out.vertex(b), out.vertex(c));
            let d1 = triangle_area(a, b, &p);
            let d2 = triangle_area(b, c, &p);
            let d3 = triangle_area(c, a, &p);
            (d1 > 0.0 && d2 > 0.0 && d3 > 0.0) || (d1 < 0.0 && d2 < 0.0 && d3 < 0.0)
        })
        .count()
}

pub fn tessellate_contours(contours: &[Vec<Real>], winding_rule: WindingRule) -> TessOutput {
    let options = TessOptions {
        winding_rule,
        ..TessOptions::default()
    };
    match tessellate(contours, &options) {
        Ok(out) => out,
        Err(e) => panic!("tessellation failed for {:?}: {}", winding_rule, e),
    }
}

/// Flat coordinates of an axis-aligned square, counter-clockwise unless
/// `clockwise`.
pub fn square(x0: Real, y0: Real, size: Real, clockwise: bool) -> Vec<Real> {
    let (x1, y1) = (x0 + size, y0 + size);
    if clockwise {
        vec![x0, y0, x0, y1, x1, y1, x1, y0]
    } else {
        vec![x0, y0, x1, y0, x1, y1, x0, y1]
    }
}

/// A regular star polygon `{n/step}` drawn as one self-intersecting contour.
pub fn star(n: usize, step: usize, radius: Real) -> Vec<Real> {
    (0..n)
        .flat_map(|i| {
            let a = std::f64::consts::TAU * ((i * step) % n) as Real / n as Real;
            [radius * a.cos(), radius * a.sin()]
        })
        .collect()
}

/// A handler that records every primitive and callback.
#[derive(Default)]
pub struct Recorder {
    pub prims: Vec<(PrimitiveKind, Vec<usize>)>,
    pub flags: Vec<(usize, bool)>,
    pub errors: Vec<TessError>,
    pub combined: Vec<([Real; 3], [Option<usize>; 4], [Real; 4])>,
    pub positions: Vec<[Real; 3]>,
    pub edge_flags: bool,
    pub combine: bool,
}

impl Recorder {
    pub fn triangles(&self) -> Vec<[usize; 3]> {
        let mut tris = Vec::new();
        for (kind, v) in &self.prims {
            match kind {
                PrimitiveKind::Triangles => tris.extend(v.chunks_exact(3).map(|t| [t[0], t[1], t[2]])),
                PrimitiveKind::TriangleFan => tris.extend((2..v.len()).map(|i| [v[0], v[i - 1], v[i]])),
                PrimitiveKind::TriangleStrip => tris.extend((2..v.len()).map(|i| {
                    if i % 2 == 0 {
                        [v[i - 2], v[i - 1], v[i]]
                    } else {
                        [v[i - 1], v[i - 2], v[i]]
                    }
                })),
                PrimitiveKind::LineLoop => {}
            }
        }
        tris
    }
}

impl TessHandler<usize> for Recorder {
    fn begin(&mut self, kind: PrimitiveKind) {
        self.prims.push((kind, Vec::new()));
    }

    fn vertex(&mut self, data: &usize) {
        let prim = self.prims.last_mut().expect("vertex outside begin/end");
        prim.1.push(*data);
    }

    fn end(&mut self) {}

    fn edge_flag(&mut self, boundary: bool) {
        let at = self.prims.last().map_or(0, |p| p.1.len());
        self.flags.push((at, boundary));
    }

    fn wants_edge_flags(&self) -> bool {
        self.edge_flags
    }

    fn combine(
        &mut self,
        coords: [Real; 3],
        data: [Option<&usize>; 4],
        weights: [Real; 4],
    ) -> Option<usize> {
        if !self.combine {
            return None;
        }
        self.combined.push((coords, data.map(|d| d.copied()), weights));
        self.positions.push(coords);
        Some(self.positions.len() - 1)
    }

    fn error(&mut self, err: TessError) {
        self.errors.push(err);
    }
}
