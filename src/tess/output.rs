// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Indexed output: a handler that collects primitives into a vertex table
// and triangle or contour index lists.

use super::{Tessellator, WindingRule};
use crate::callbacks::{PrimitiveKind, TessHandler};
use crate::error::{Result, TessError};
use crate::geom::Real;

/// Options for [`tessellate`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct TessOptions {
    pub winding_rule: WindingRule,
    /// Produce boundary loops instead of triangles.
    pub boundary_only: bool,
    /// Plane normal; zero means computed from the input.
    pub normal: [Real; 3],
    pub tolerance: Real,
    /// Components per input vertex, 2 or 3. Also the stride of
    /// [`TessOutput::vertices`].
    pub vertex_size: usize,
}

impl Default for TessOptions {
    fn default() -> Self {
        TessOptions {
            winding_rule: WindingRule::Odd,
            boundary_only: false,
            normal: [0.0, 0.0, 1.0],
            tolerance: 0.0,
            vertex_size: 2,
        }
    }
}

/// Indexed result of [`tessellate`].
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct TessOutput {
    /// Flat vertex table, `vertex_size` components per vertex. The input
    /// vertices come first, in input order, followed by vertices created at
    /// intersections.
    pub vertices: Vec<Real>,
    pub vertex_size: usize,
    /// Three indices per triangle, counter-clockwise.
    pub triangles: Vec<u32>,
    /// Boundary loops, filled instead of `triangles` in boundary-only mode.
    pub contours: Vec<Vec<u32>>,
}

impl TessOutput {
    pub fn vertex_count(&self) -> usize {
        if self.vertex_size == 0 {
            return 0;
        }
        self.vertices.len() / self.vertex_size
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    pub fn vertex(&self, index: u32) -> &[Real] {
        let start = index as usize * self.vertex_size;
        &self.vertices[start..start + self.vertex_size]
    }

    /// Triangles as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.triangles.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }
}

/// Handler that accumulates output as indices into its vertex table.
struct Collector {
    out: TessOutput,
    kind: PrimitiveKind,
    current: Vec<u32>,
}

impl Collector {
    fn new(vertex_size: usize) -> Self {
        Collector {
            out: TessOutput {
                vertex_size,
                ..TessOutput::default()
            },
            kind: PrimitiveKind::Triangles,
            current: Vec::new(),
        }
    }

    fn push_vertex(&mut self, coords: &[Real]) -> u32 {
        let index = self.out.vertex_count() as u32;
        self.out.vertices.extend_from_slice(coords);
        index
    }
}

impl TessHandler<u32> for Collector {
    fn begin(&mut self, kind: PrimitiveKind) {
        self.kind = kind;
        self.current.clear();
    }

    fn vertex(&mut self, data: &u32) {
        self.current.push(*data);
    }

    fn end(&mut self) {
        let v = &self.current;
        let tris = &mut self.out.triangles;
        match self.kind {
            PrimitiveKind::Triangles => tris.extend_from_slice(&v[..v.len() / 3 * 3]),
            PrimitiveKind::TriangleFan => {
                for i in 2..v.len() {
                    tris.extend_from_slice(&[v[0], v[i - 1], v[i]]);
                }
            }
            PrimitiveKind::TriangleStrip => {
                for i in 2..v.len() {
                    if i % 2 == 0 {
                        tris.extend_from_slice(&[v[i - 2], v[i - 1], v[i]]);
                    } else {
                        tris.extend_from_slice(&[v[i - 1], v[i - 2], v[i]]);
                    }
                }
            }
            PrimitiveKind::LineLoop => self.out.contours.push(v.clone()),
        }
    }

    fn combine(
        &mut self,
        coords: [Real; 3],
        data: [Option<&u32>; 4],
        _weights: [Real; 4],
    ) -> Option<u32> {
        let size = self.out.vertex_size;
        let pos = &coords[..size];
        // Coincident input vertices collapse onto the first of them.
        for i in data.into_iter().flatten().copied() {
            if self.out.vertex(i) == pos {
                return Some(i);
            }
        }
        Some(self.push_vertex(pos))
    }
}

/// Tessellates `contours` in one call.
///
/// Each contour is a flat slice of `options.vertex_size` coordinates per
/// vertex. Intersections create new vertices in the output table.
///
/// ```
/// use glu_tess::{tessellate, TessOptions};
///
/// let square = [0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0];
/// let out = tessellate(&[&square[..]], &TessOptions::default()).unwrap();
/// assert_eq!(out.triangle_count(), 2);
/// assert_eq!(out.vertex_count(), 4);
/// ```
///
/// `options.vertex_size` other than 2 or 3 is rejected with
/// [`TessError::InvalidVertexSize`].
pub fn tessellate<C: AsRef<[Real]>>(contours: &[C], options: &TessOptions) -> Result<TessOutput> {
    let size = options.vertex_size;
    if size != 2 && size != 3 {
        return Err(TessError::InvalidVertexSize(size));
    }

    let mut tess = Tessellator::new(Collector::new(size));
    tess.set_winding_rule(options.winding_rule)?;
    tess.set_boundary_only(options.boundary_only)?;
    tess.set_tolerance(options.tolerance)?;
    tess.set_normal(options.normal);

    tess.begin_polygon()?;
    for contour in contours {
        tess.begin_contour()?;
        for p in contour.as_ref().chunks_exact(size) {
            let index = tess.handler_mut().push_vertex(p);
            let z = if size == 3 { p[2] } else { 0.0 };
            tess.add_vertex([p[0], p[1], z], index)?;
        }
        tess.end_contour()?;
    }
    tess.end_polygon()?;
    Ok(tess.into_handler().out)
}
