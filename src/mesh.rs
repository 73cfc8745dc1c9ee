// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Half-edge mesh.
//
// Edges come in pairs stored at adjacent indices, so the twin of `e` is
// `e ^ 1`. Vertices, faces and edge pairs are each threaded on a circular
// list through a head element at index 0. Elements are never reused: the mesh
// lives for exactly one tessellation pass and is dropped as a whole.
//
// Orientation conventions:
// - `onext` is the next edge counter-clockwise around the origin.
// - `lnext` is the next edge counter-clockwise around the left face.
// - The edge list stores `next` on the even half of a pair and the previous
//   pair on the odd half.

use crate::geom::{Real, SweepPoint};
use crate::priorityq::PqHandle;
use crate::sweep::RegionId;

macro_rules! element_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) u32);

        impl $name {
            /// No element.
            pub const NONE: $name = $name(u32::MAX);

            #[inline]
            pub fn is_none(self) -> bool {
                self == Self::NONE
            }

            #[inline]
            pub fn is_some(self) -> bool {
                self != Self::NONE
            }

            #[inline]
            pub(crate) fn idx(self) -> usize {
                self.0 as usize
            }
        }
    };
}

element_id!(
    /// Handle to a mesh vertex.
    VertId
);
element_id!(
    /// Handle to a mesh face.
    FaceId
);
element_id!(
    /// Handle to a half-edge.
    EdgeId
);

impl EdgeId {
    /// The same edge pointing the other way.
    #[inline]
    pub fn sym(self) -> EdgeId {
        EdgeId(self.0 ^ 1)
    }

    #[inline]
    fn even(self) -> EdgeId {
        EdgeId(self.0 & !1)
    }
}

pub(crate) const V_HEAD: VertId = VertId(0);
pub(crate) const F_HEAD: FaceId = FaceId(0);
pub(crate) const E_HEAD: EdgeId = EdgeId(0);

pub struct Vertex<V> {
    pub(crate) next: VertId,
    pub(crate) prev: VertId,
    pub(crate) an_edge: EdgeId,
    pub(crate) coords: [Real; 3],
    pub(crate) pos: SweepPoint,
    pub(crate) pq_handle: Option<PqHandle>,
    pub(crate) data: Option<V>,
}

pub struct Face {
    pub(crate) next: FaceId,
    pub(crate) prev: FaceId,
    pub(crate) an_edge: EdgeId,
    pub(crate) marked: bool,
    pub(crate) inside: bool,
}

pub struct HalfEdge {
    pub(crate) next: EdgeId,
    pub(crate) onext: EdgeId,
    pub(crate) lnext: EdgeId,
    pub(crate) org: VertId,
    pub(crate) lface: FaceId,
    pub(crate) active_region: RegionId,
    /// Change in winding number when crossing from the right face to the
    /// left face.
    pub(crate) winding: i32,
}

impl HalfEdge {
    fn detached(next: EdgeId, onext: EdgeId, lnext: EdgeId) -> Self {
        HalfEdge {
            next,
            onext,
            lnext,
            org: VertId::NONE,
            lface: FaceId::NONE,
            active_region: RegionId::NONE,
            winding: 0,
        }
    }
}

/// The planar subdivision built from the input contours.
///
/// Handed to [`TessHandler::mesh`](crate::TessHandler::mesh) after
/// tessellation, at which point it holds only the interior faces.
pub struct Mesh<V> {
    pub(crate) verts: Vec<Vertex<V>>,
    pub(crate) faces: Vec<Face>,
    pub(crate) edges: Vec<HalfEdge>,
}

impl<V> Default for Mesh<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Mesh<V> {
    pub fn new() -> Self {
        let v_head = Vertex {
            next: V_HEAD,
            prev: V_HEAD,
            an_edge: EdgeId::NONE,
            coords: [0.0; 3],
            pos: SweepPoint::default(),
            pq_handle: None,
            data: None,
        };
        let f_head = Face {
            next: F_HEAD,
            prev: F_HEAD,
            an_edge: EdgeId::NONE,
            marked: false,
            inside: false,
        };
        let e_head = HalfEdge::detached(E_HEAD, EdgeId::NONE, EdgeId::NONE);
        let e_head_sym = HalfEdge::detached(E_HEAD.sym(), EdgeId::NONE, EdgeId::NONE);
        Mesh {
            verts: vec![v_head],
            faces: vec![f_head],
            edges: vec![e_head, e_head_sym],
        }
    }

    // ───────────────────────────── Navigation ──────────────────────────────

    #[inline]
    pub fn org(&self, e: EdgeId) -> VertId {
        self.edges[e.idx()].org
    }

    #[inline]
    pub fn dst(&self, e: EdgeId) -> VertId {
        self.edges[e.sym().idx()].org
    }

    #[inline]
    pub fn lface(&self, e: EdgeId) -> FaceId {
        self.edges[e.idx()].lface
    }

    #[inline]
    pub fn rface(&self, e: EdgeId) -> FaceId {
        self.edges[e.sym().idx()].lface
    }

    #[inline]
    pub fn onext(&self, e: EdgeId) -> EdgeId {
        self.edges[e.idx()].onext
    }

    #[inline]
    pub fn lnext(&self, e: EdgeId) -> EdgeId {
        self.edges[e.idx()].lnext
    }

    #[inline]
    pub(crate) fn oprev(&self, e: EdgeId) -> EdgeId {
        self.lnext(e.sym())
    }

    #[inline]
    pub(crate) fn lprev(&self, e: EdgeId) -> EdgeId {
        self.onext(e).sym()
    }

    #[inline]
    pub(crate) fn dprev(&self, e: EdgeId) -> EdgeId {
        self.lnext(e).sym()
    }

    #[inline]
    pub(crate) fn rprev(&self, e: EdgeId) -> EdgeId {
        self.onext(e.sym())
    }

    #[inline]
    pub(crate) fn dnext(&self, e: EdgeId) -> EdgeId {
        self.rprev(e).sym()
    }

    #[inline]
    pub(crate) fn winding(&self, e: EdgeId) -> i32 {
        self.edges[e.idx()].winding
    }

    #[inline]
    pub(crate) fn edge(&self, e: EdgeId) -> &HalfEdge {
        &self.edges[e.idx()]
    }

    #[inline]
    pub(crate) fn edge_mut(&mut self, e: EdgeId) -> &mut HalfEdge {
        &mut self.edges[e.idx()]
    }

    #[inline]
    pub(crate) fn vert(&self, v: VertId) -> &Vertex<V> {
        &self.verts[v.idx()]
    }

    #[inline]
    pub(crate) fn vert_mut(&mut self, v: VertId) -> &mut Vertex<V> {
        &mut self.verts[v.idx()]
    }

    #[inline]
    pub(crate) fn face(&self, f: FaceId) -> &Face {
        &self.faces[f.idx()]
    }

    #[inline]
    pub(crate) fn face_mut(&mut self, f: FaceId) -> &mut Face {
        &mut self.faces[f.idx()]
    }

    /// Sweep-plane position of a vertex.
    #[inline]
    pub fn position(&self, v: VertId) -> SweepPoint {
        self.verts[v.idx()].pos
    }

    #[inline]
    pub(crate) fn org_pos(&self, e: EdgeId) -> SweepPoint {
        self.position(self.org(e))
    }

    #[inline]
    pub(crate) fn dst_pos(&self, e: EdgeId) -> SweepPoint {
        self.position(self.dst(e))
    }

    /// True when `e` points towards decreasing sweep order.
    #[inline]
    pub(crate) fn edge_goes_left(&self, e: EdgeId) -> bool {
        crate::geom::vert_leq(self.dst_pos(e), self.org_pos(e))
    }

    #[inline]
    pub(crate) fn edge_goes_right(&self, e: EdgeId) -> bool {
        crate::geom::vert_leq(self.org_pos(e), self.dst_pos(e))
    }

    // ─────────────────────────── Client queries ────────────────────────────

    /// Input coordinates of a vertex.
    pub fn coords(&self, v: VertId) -> [Real; 3] {
        self.verts[v.idx()].coords
    }

    /// User data attached to a vertex.
    pub fn data(&self, v: VertId) -> Option<&V> {
        self.verts[v.idx()].data.as_ref()
    }

    pub fn is_inside(&self, f: FaceId) -> bool {
        self.faces[f.idx()].inside
    }

    /// Some half-edge whose left face is `f`.
    pub fn face_edge(&self, f: FaceId) -> EdgeId {
        self.faces[f.idx()].an_edge
    }

    pub fn vertices(&self) -> impl Iterator<Item = VertId> + '_ {
        let mut v = self.verts[V_HEAD.idx()].next;
        std::iter::from_fn(move || {
            if v == V_HEAD {
                return None;
            }
            let cur = v;
            v = self.verts[v.idx()].next;
            Some(cur)
        })
    }

    pub fn faces(&self) -> impl Iterator<Item = FaceId> + '_ {
        let mut f = self.faces[F_HEAD.idx()].next;
        std::iter::from_fn(move || {
            if f == F_HEAD {
                return None;
            }
            let cur = f;
            f = self.faces[f.idx()].next;
            Some(cur)
        })
    }

    /// One half-edge per edge pair.
    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        let mut e = self.edges[E_HEAD.idx()].next;
        std::iter::from_fn(move || {
            if e == E_HEAD {
                return None;
            }
            let cur = e;
            e = self.edges[e.idx()].next;
            Some(cur)
        })
    }

    /// Half-edges around the left face of `start`, beginning with `start`.
    pub fn face_loop(&self, start: EdgeId) -> impl Iterator<Item = EdgeId> + '_ {
        let mut e = Some(start);
        std::iter::from_fn(move || {
            let cur = e?;
            let next = self.lnext(cur);
            e = if next == start { None } else { Some(next) };
            Some(cur)
        })
    }

    /// Vertices of face `f` in counter-clockwise order.
    pub fn face_vertices(&self, f: FaceId) -> impl Iterator<Item = VertId> + '_ {
        self.face_loop(self.face_edge(f)).map(move |e| self.org(e))
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices().count()
    }

    pub fn face_count(&self) -> usize {
        self.faces().count()
    }

    pub fn edge_count(&self) -> usize {
        self.edges().count()
    }

    // ───────────────────────────── Primitives ──────────────────────────────

    /// Allocates an edge pair and links it into the edge list before
    /// `e_next`. The pair forms its own origin rings and face loop.
    fn make_edge_pair(&mut self, e_next: EdgeId) -> EdgeId {
        let e = EdgeId(self.edges.len() as u32);
        let e_sym = e.sym();
        let e_next = e_next.even();
        let e_prev = self.edge(e_next.sym()).next;

        self.edges.push(HalfEdge::detached(e_next, e, e_sym));
        self.edges.push(HalfEdge::detached(e_prev, e_sym, e));
        self.edge_mut(e_prev.sym()).next = e;
        self.edge_mut(e_next.sym()).next = e_sym;
        e
    }

    /// Exchanges `a.onext` and `b.onext`. This joins two origin rings into
    /// one, or splits one in two, and does the opposite to the face loops.
    fn splice_rings(&mut self, a: EdgeId, b: EdgeId) {
        let a_onext = self.onext(a);
        let b_onext = self.onext(b);
        self.edge_mut(a_onext.sym()).lnext = b;
        self.edge_mut(b_onext.sym()).lnext = a;
        self.edge_mut(a).onext = b_onext;
        self.edge_mut(b).onext = a_onext;
    }

    /// Creates a vertex for the origin ring of `e_orig`, listed before
    /// `v_next`.
    fn make_vertex(&mut self, e_orig: EdgeId, v_next: VertId) -> VertId {
        let v = VertId(self.verts.len() as u32);
        let v_prev = self.vert(v_next).prev;
        self.verts.push(Vertex {
            next: v_next,
            prev: v_prev,
            an_edge: e_orig,
            coords: [0.0; 3],
            pos: SweepPoint::default(),
            pq_handle: None,
            data: None,
        });
        self.vert_mut(v_prev).next = v;
        self.vert_mut(v_next).prev = v;

        let mut e = e_orig;
        loop {
            self.edge_mut(e).org = v;
            e = self.onext(e);
            if e == e_orig {
                break;
            }
        }
        v
    }

    /// Creates a face for the loop of `e_orig`, listed before `f_next` and
    /// inheriting its `inside` flag.
    fn make_face(&mut self, e_orig: EdgeId, f_next: FaceId) -> FaceId {
        let f = FaceId(self.faces.len() as u32);
        let f_prev = self.face(f_next).prev;
        let inside = self.face(f_next).inside;
        self.faces.push(Face {
            next: f_next,
            prev: f_prev,
            an_edge: e_orig,
            marked: false,
            inside,
        });
        self.face_mut(f_prev).next = f;
        self.face_mut(f_next).prev = f;

        let mut e = e_orig;
        loop {
            self.edge_mut(e).lface = f;
            e = self.lnext(e);
            if e == e_orig {
                break;
            }
        }
        f
    }

    fn kill_edge(&mut self, e_del: EdgeId) {
        let e_del = e_del.even();
        let e_next = self.edge(e_del).next;
        let e_prev = self.edge(e_del.sym()).next;
        self.edge_mut(e_next.sym()).next = e_prev;
        self.edge_mut(e_prev.sym()).next = e_next;
    }

    /// Unlinks `v_del`, pointing its origin ring at `new_org`.
    fn kill_vertex(&mut self, v_del: VertId, new_org: VertId) {
        let start = self.vert(v_del).an_edge;
        let mut e = start;
        loop {
            self.edge_mut(e).org = new_org;
            e = self.onext(e);
            if e == start {
                break;
            }
        }
        let (prev, next) = (self.vert(v_del).prev, self.vert(v_del).next);
        self.vert_mut(next).prev = prev;
        self.vert_mut(prev).next = next;
    }

    /// Unlinks `f_del`, pointing its loop at `new_lface`.
    fn kill_face(&mut self, f_del: FaceId, new_lface: FaceId) {
        let start = self.face(f_del).an_edge;
        let mut e = start;
        loop {
            self.edge_mut(e).lface = new_lface;
            e = self.lnext(e);
            if e == start {
                break;
            }
        }
        let (prev, next) = (self.face(f_del).prev, self.face(f_del).next);
        self.face_mut(next).prev = prev;
        self.face_mut(prev).next = next;
    }

    // ───────────────────────────── Operations ──────────────────────────────

    /// A new edge with two new vertices and one new face: a loop of two
    /// half-edges.
    pub fn make_edge(&mut self) -> EdgeId {
        let e = self.make_edge_pair(E_HEAD);
        self.make_vertex(e, V_HEAD);
        self.make_vertex(e.sym(), V_HEAD);
        self.make_face(e, F_HEAD);
        e
    }

    /// The basic topological edit. If `e_org` and `e_dst` have different
    /// origins the two vertices are merged (keeping `e_org`'s); otherwise the
    /// shared vertex is split in two. Independently, if their left faces
    /// differ the faces are merged, otherwise the face is split. Splicing an
    /// edge with itself does nothing.
    pub fn splice(&mut self, e_org: EdgeId, e_dst: EdgeId) {
        if e_org == e_dst {
            return;
        }

        let joining_vertices = self.org(e_dst) != self.org(e_org);
        if joining_vertices {
            self.kill_vertex(self.org(e_dst), self.org(e_org));
        }
        let joining_loops = self.lface(e_dst) != self.lface(e_org);
        if joining_loops {
            self.kill_face(self.lface(e_dst), self.lface(e_org));
        }

        self.splice_rings(e_dst, e_org);

        if !joining_vertices {
            self.make_vertex(e_dst, self.org(e_org));
            let v = self.org(e_org);
            self.vert_mut(v).an_edge = e_org;
        }
        if !joining_loops {
            self.make_face(e_dst, self.lface(e_org));
            let f = self.lface(e_org);
            self.face_mut(f).an_edge = e_org;
        }
    }

    /// Removes `e_del`. Its two faces merge if distinct, otherwise the face
    /// splits; vertices left without edges are removed.
    pub fn delete_edge(&mut self, e_del: EdgeId) {
        let e_del_sym = e_del.sym();

        let joining_loops = self.lface(e_del) != self.rface(e_del);
        if joining_loops {
            self.kill_face(self.lface(e_del), self.rface(e_del));
        }

        if self.onext(e_del) == e_del {
            self.kill_vertex(self.org(e_del), VertId::NONE);
        } else {
            let (rface, oprev) = (self.rface(e_del), self.oprev(e_del));
            self.face_mut(rface).an_edge = oprev;
            let (org, onext) = (self.org(e_del), self.onext(e_del));
            self.vert_mut(org).an_edge = onext;
            self.splice_rings(e_del, self.oprev(e_del));
            if !joining_loops {
                self.make_face(e_del, self.lface(e_del));
            }
        }

        if self.onext(e_del_sym) == e_del_sym {
            self.kill_vertex(self.org(e_del_sym), VertId::NONE);
            self.kill_face(self.lface(e_del_sym), FaceId::NONE);
        } else {
            let (lface, oprev) = (self.lface(e_del), self.oprev(e_del_sym));
            self.face_mut(lface).an_edge = oprev;
            let (org, onext) = (self.org(e_del_sym), self.onext(e_del_sym));
            self.vert_mut(org).an_edge = onext;
            self.splice_rings(e_del_sym, self.oprev(e_del_sym));
        }
        self.kill_edge(e_del);
    }

    /// Adds an edge `e_new` such that `e_new == e_org.lnext` and
    /// `e_new.dst` is a new vertex. Both face loops stay as they were.
    pub fn add_edge_vertex(&mut self, e_org: EdgeId) -> EdgeId {
        let e_new = self.make_edge_pair(e_org);
        let e_new_sym = e_new.sym();

        self.splice_rings(e_new, self.lnext(e_org));
        let dst = self.dst(e_org);
        self.edge_mut(e_new).org = dst;
        self.make_vertex(e_new_sym, dst);
        let lface = self.lface(e_org);
        self.edge_mut(e_new).lface = lface;
        self.edge_mut(e_new_sym).lface = lface;
        e_new
    }

    /// Splits `e_org` in two at a new vertex. Returns the second half,
    /// `e_new == e_org.lnext`, which inherits the winding of `e_org`.
    pub fn split_edge(&mut self, e_org: EdgeId) -> EdgeId {
        let e_new = self.add_edge_vertex(e_org).sym();

        // Move e_org's destination to the new vertex.
        let e_org_sym = e_org.sym();
        self.splice_rings(e_org_sym, self.oprev(e_org_sym));
        self.splice_rings(e_org_sym, e_new);

        let new_org = self.org(e_new);
        self.edge_mut(e_org_sym).org = new_org;
        let dst = self.dst(e_new);
        self.vert_mut(dst).an_edge = e_new.sym();
        let rface = self.rface(e_org);
        self.edge_mut(e_new.sym()).lface = rface;
        let (w, w_sym) = (self.winding(e_org), self.winding(e_org_sym));
        self.edge_mut(e_new).winding = w;
        self.edge_mut(e_new.sym()).winding = w_sym;
        e_new
    }

    /// Adds an edge from `e_org.dst` to `e_dst.org` and returns it. If the two
    /// edges share a left face it is split, with the new face on the left of
    /// the returned edge; otherwise the two loops are joined.
    pub fn connect(&mut self, e_org: EdgeId, e_dst: EdgeId) -> EdgeId {
        let e_new = self.make_edge_pair(e_org);
        let e_new_sym = e_new.sym();

        let joining_loops = self.lface(e_dst) != self.lface(e_org);
        if joining_loops {
            self.kill_face(self.lface(e_dst), self.lface(e_org));
        }

        self.splice_rings(e_new, self.lnext(e_org));
        self.splice_rings(e_new_sym, e_dst);

        let org = self.dst(e_org);
        self.edge_mut(e_new).org = org;
        let sym_org = self.org(e_dst);
        self.edge_mut(e_new_sym).org = sym_org;
        let lface = self.lface(e_org);
        self.edge_mut(e_new).lface = lface;
        self.edge_mut(e_new_sym).lface = lface;
        self.face_mut(lface).an_edge = e_new_sym;

        if !joining_loops {
            self.make_face(e_new, lface);
        }
        e_new
    }

    /// Removes face `f_zap`, leaving a hole. Edges whose other side is
    /// already a hole are deleted along with any vertices they isolate.
    pub fn zap_face(&mut self, f_zap: FaceId) {
        let start = self.face(f_zap).an_edge;
        let mut e_next = self.lnext(start);
        loop {
            let e = e_next;
            e_next = self.lnext(e);

            self.edge_mut(e).lface = FaceId::NONE;
            if self.rface(e).is_none() {
                if self.onext(e) == e {
                    self.kill_vertex(self.org(e), VertId::NONE);
                } else {
                    let (org, onext) = (self.org(e), self.onext(e));
                    self.vert_mut(org).an_edge = onext;
                    self.splice_rings(e, self.oprev(e));
                }
                let e_sym = e.sym();
                if self.onext(e_sym) == e_sym {
                    self.kill_vertex(self.org(e_sym), VertId::NONE);
                } else {
                    let (org, onext) = (self.org(e_sym), self.onext(e_sym));
                    self.vert_mut(org).an_edge = onext;
                    self.splice_rings(e_sym, self.oprev(e_sym));
                }
                self.kill_edge(e);
            }
            if e == start {
                break;
            }
        }

        let (prev, next) = (self.face(f_zap).prev, self.face(f_zap).next);
        self.face_mut(next).prev = prev;
        self.face_mut(prev).next = next;
    }

    /// Appends a vertex to the contour whose last edge is `last`, or starts
    /// a new contour with a one-edge self-loop. Returns the new last edge.
    ///
    /// Edges are oriented so that a counter-clockwise contour adds +1 to the
    /// winding number of the region it encloses.
    pub(crate) fn append_contour_vertex(
        &mut self,
        last: Option<EdgeId>,
        coords: [Real; 3],
        data: V,
    ) -> EdgeId {
        let e = match last {
            None => {
                let e = self.make_edge();
                self.splice(e, e.sym());
                e
            }
            Some(last) => {
                self.split_edge(last);
                self.lnext(last)
            }
        };
        let v = self.org(e);
        let vert = self.vert_mut(v);
        vert.coords = coords;
        vert.data = Some(data);
        self.edge_mut(e).winding = 1;
        self.edge_mut(e.sym()).winding = -1;
        e
    }

    /// Walks every list and ring, asserting the half-edge invariants.
    /// Faces with no left face (after `zap_face`) are not expected.
    pub fn check(&self) {
        let mut f_prev = F_HEAD;
        let mut f = self.face(F_HEAD).next;
        while f != F_HEAD {
            assert_eq!(self.face(f).prev, f_prev);
            let start = self.face(f).an_edge;
            let mut e = start;
            loop {
                assert_ne!(e.sym(), e);
                assert_eq!(self.onext(self.lnext(e)).sym(), e);
                assert_eq!(self.lnext(self.onext(e).sym()), e);
                assert_eq!(self.lface(e), f);
                e = self.lnext(e);
                if e == start {
                    break;
                }
            }
            f_prev = f;
            f = self.face(f).next;
        }
        assert_eq!(self.face(f).prev, f_prev);

        let mut v_prev = V_HEAD;
        let mut v = self.vert(V_HEAD).next;
        while v != V_HEAD {
            assert_eq!(self.vert(v).prev, v_prev);
            let start = self.vert(v).an_edge;
            let mut e = start;
            loop {
                assert_eq!(self.onext(self.lnext(e)).sym(), e);
                assert_eq!(self.lnext(self.onext(e).sym()), e);
                assert_eq!(self.org(e), v);
                e = self.onext(e);
                if e == start {
                    break;
                }
            }
            v_prev = v;
            v = self.vert(v).next;
        }
        assert_eq!(self.vert(v).prev, v_prev);

        let mut e_prev = E_HEAD;
        let mut e = self.edge(E_HEAD).next;
        while e != E_HEAD {
            assert_eq!(self.edge(e.sym()).next, e_prev.sym());
            assert!(self.org(e).is_some());
            assert!(self.dst(e).is_some());
            assert_eq!(self.onext(self.lnext(e)).sym(), e);
            assert_eq!(self.lnext(self.onext(e).sym()), e);
            e_prev = e;
            e = self.edge(e).next;
        }
        assert_eq!(self.edge(e.sym()).next, e_prev.sym());
    }
}
