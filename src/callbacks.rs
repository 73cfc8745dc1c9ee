// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// The client side of the tessellator: where primitives, combined vertices,
// errors and the finished mesh are delivered.

use crate::error::TessError;
use crate::geom::Real;
use crate::mesh::Mesh;

/// The kind of primitive opened by [`TessHandler::begin`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum PrimitiveKind {
    /// Independent triangles, three vertices each.
    Triangles,
    /// A fan around the first vertex.
    TriangleFan,
    /// A strip; triangle `i` uses vertices `i`, `i + 1` and `i + 2`.
    TriangleStrip,
    /// One closed boundary contour.
    LineLoop,
}

/// Receives the output of a tessellation.
///
/// `V` is the client data attached to each input vertex. Output vertices are
/// reported by reference to that data, or to data produced by
/// [`combine`](TessHandler::combine).
///
/// Only `begin`, `vertex` and `end` are required. The handler doubles as the
/// per-polygon client state: it is reachable through
/// [`Tessellator::handler`](crate::Tessellator::handler) between polygons.
pub trait TessHandler<V> {
    /// Opens a primitive.
    fn begin(&mut self, kind: PrimitiveKind);

    /// One vertex of the open primitive.
    fn vertex(&mut self, data: &V);

    /// Closes the open primitive.
    fn end(&mut self);

    /// Called before a vertex whose following edge has a different boundary
    /// status than the previous one. `true` means the edge lies on the
    /// polygon boundary. Only called when
    /// [`wants_edge_flags`](TessHandler::wants_edge_flags) returns true.
    fn edge_flag(&mut self, _boundary: bool) {}

    /// When true, output is restricted to independent triangles so that
    /// every edge can carry a boundary flag.
    fn wants_edge_flags(&self) -> bool {
        false
    }

    /// Produces data for a vertex created where edges cross or where
    /// vertices coincide. `coords` is the new position; `data` and
    /// `weights` describe the up to four contributing vertices, with weights
    /// summing to one.
    ///
    /// Returning `None` at an intersection makes the polygon fail with
    /// [`TessError::NeedCombineCallback`]. At a merge of coincident vertices
    /// the first vertex's data is kept.
    fn combine(
        &mut self,
        _coords: [Real; 3],
        _data: [Option<&V>; 4],
        _weights: [Real; 4],
    ) -> Option<V> {
        None
    }

    /// Notified of every error, in addition to the `Err` returned.
    fn error(&mut self, _err: TessError) {}

    /// Receives the mesh of interior faces after each polygon. Only called
    /// when [`wants_mesh`](TessHandler::wants_mesh) returns true.
    fn mesh(&mut self, _mesh: Mesh<V>) {}

    fn wants_mesh(&self) -> bool {
        false
    }
}

type BeginFn<'a> = Box<dyn FnMut(PrimitiveKind) + 'a>;
type VertexFn<'a, V> = Box<dyn FnMut(&V) + 'a>;
type EndFn<'a> = Box<dyn FnMut() + 'a>;
type EdgeFlagFn<'a> = Box<dyn FnMut(bool) + 'a>;
type CombineFn<'a, V> = Box<dyn FnMut([Real; 3], [Option<&V>; 4], [Real; 4]) -> Option<V> + 'a>;
type ErrorFn<'a> = Box<dyn FnMut(TessError) + 'a>;
type MeshFn<'a, V> = Box<dyn FnMut(Mesh<V>) + 'a>;

/// One slot of a [`Callbacks`] registry. `None` clears the slot.
pub enum CallbackFn<'a, V> {
    Begin(Option<BeginFn<'a>>),
    Vertex(Option<VertexFn<'a, V>>),
    End(Option<EndFn<'a>>),
    EdgeFlag(Option<EdgeFlagFn<'a>>),
    Combine(Option<CombineFn<'a, V>>),
    Error(Option<ErrorFn<'a>>),
    Mesh(Option<MeshFn<'a, V>>),
}

/// A [`TessHandler`] assembled from individually registered closures.
///
/// Unset slots behave like the trait's defaults. Registering an edge-flag
/// or mesh closure is what switches those outputs on.
///
/// ```
/// use glu_tess::{CallbackFn, Callbacks, Tessellator};
///
/// let mut count = 0;
/// let mut cb = Callbacks::new();
/// cb.set(CallbackFn::Vertex(Some(Box::new(|_: &usize| count += 1))));
///
/// let mut tess = Tessellator::new(cb);
/// tess.begin_polygon().unwrap();
/// tess.begin_contour().unwrap();
/// for (i, p) in [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]].iter().enumerate() {
///     tess.add_vertex([p[0], p[1], 0.0], i).unwrap();
/// }
/// tess.end_contour().unwrap();
/// tess.end_polygon().unwrap();
/// drop(tess);
/// assert_eq!(count, 3);
/// ```
pub struct Callbacks<'a, V> {
    begin: Option<BeginFn<'a>>,
    vertex: Option<VertexFn<'a, V>>,
    end: Option<EndFn<'a>>,
    edge_flag: Option<EdgeFlagFn<'a>>,
    combine: Option<CombineFn<'a, V>>,
    error: Option<ErrorFn<'a>>,
    mesh: Option<MeshFn<'a, V>>,
}

impl<'a, V> Callbacks<'a, V> {
    pub fn new() -> Self {
        Callbacks {
            begin: None,
            vertex: None,
            end: None,
            edge_flag: None,
            combine: None,
            error: None,
            mesh: None,
        }
    }

    /// Installs or clears one callback.
    pub fn set(&mut self, callback: CallbackFn<'a, V>) {
        match callback {
            CallbackFn::Begin(f) => self.begin = f,
            CallbackFn::Vertex(f) => self.vertex = f,
            CallbackFn::End(f) => self.end = f,
            CallbackFn::EdgeFlag(f) => self.edge_flag = f,
            CallbackFn::Combine(f) => self.combine = f,
            CallbackFn::Error(f) => self.error = f,
            CallbackFn::Mesh(f) => self.mesh = f,
        }
    }
}

impl<'a, V> Default for Callbacks<'a, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, V> TessHandler<V> for Callbacks<'a, V> {
    fn begin(&mut self, kind: PrimitiveKind) {
        if let Some(f) = self.begin.as_mut() {
            f(kind);
        }
    }

    fn vertex(&mut self, data: &V) {
        if let Some(f) = self.vertex.as_mut() {
            f(data);
        }
    }

    fn end(&mut self) {
        if let Some(f) = self.end.as_mut() {
            f();
        }
    }

    fn edge_flag(&mut self, boundary: bool) {
        if let Some(f) = self.edge_flag.as_mut() {
            f(boundary);
        }
    }

    fn wants_edge_flags(&self) -> bool {
        self.edge_flag.is_some()
    }

    fn combine(
        &mut self,
        coords: [Real; 3],
        data: [Option<&V>; 4],
        weights: [Real; 4],
    ) -> Option<V> {
        self.combine.as_mut().and_then(|f| f(coords, data, weights))
    }

    fn error(&mut self, err: TessError) {
        if let Some(f) = self.error.as_mut() {
            f(err);
        }
    }

    fn mesh(&mut self, mesh: Mesh<V>) {
        if let Some(f) = self.mesh.as_mut() {
            f(mesh);
        }
    }

    fn wants_mesh(&self) -> bool {
        self.mesh.is_some()
    }
}
