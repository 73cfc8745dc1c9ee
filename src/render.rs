// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Emitting primitives to the handler.
//
// A triangulated mesh is covered greedily with the largest fan or strip
// that can be grown from each unrendered triangle. Triangles that join no
// larger group are collected and sent as one batch of independent
// triangles at the end. When the client wants edge flags everything is sent
// that way, since fans and strips cannot carry a flag per edge.

use log::debug;

use crate::callbacks::{PrimitiveKind, TessHandler};
use crate::geom::Real;
use crate::mesh::{EdgeId, FaceId, Mesh, VertId, F_HEAD};
use crate::tess::WindingRule;

/// A vertex of a single-contour polygon awaiting the fast path.
pub(crate) struct CachedVertex<V> {
    pub(crate) coords: [Real; 3],
    pub(crate) data: V,
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum GroupKind {
    Fan,
    Strip,
    Triangle,
}

/// A candidate group of `size` triangles starting at `start`.
#[derive(Copy, Clone, Debug)]
struct FaceGroup {
    size: usize,
    start: EdgeId,
    kind: GroupKind,
}

struct MeshRenderer<'a, V, H> {
    mesh: &'a mut Mesh<V>,
    handler: &'a mut H,
    flag_boundary: bool,
    lonely: Vec<FaceId>,
    fans: usize,
    strips: usize,
}

impl<'a, V, H: TessHandler<V>> MeshRenderer<'a, V, H> {
    /// Outside faces count as already rendered.
    fn is_marked(&self, f: FaceId) -> bool {
        let face = self.mesh.face(f);
        !face.inside || face.marked
    }

    fn add_to_trail(&mut self, f: FaceId, trail: &mut Vec<FaceId>) {
        self.mesh.face_mut(f).marked = true;
        trail.push(f);
    }

    fn free_trail(&mut self, trail: Vec<FaceId>) {
        for f in trail {
            self.mesh.face_mut(f).marked = false;
        }
    }

    fn emit(&mut self, v: VertId) {
        if let Some(data) = self.mesh.data(v) {
            self.handler.vertex(data);
        }
    }

    /// The largest fan around `e_orig.org`, walking both ways from
    /// `e_orig`.
    fn maximum_fan(&mut self, e_orig: EdgeId) -> FaceGroup {
        let mut trail = Vec::new();
        let mut size = 0;

        let mut e = e_orig;
        while !self.is_marked(self.mesh.lface(e)) {
            self.add_to_trail(self.mesh.lface(e), &mut trail);
            size += 1;
            e = self.mesh.onext(e);
        }
        let mut e = e_orig;
        while !self.is_marked(self.mesh.rface(e)) {
            self.add_to_trail(self.mesh.rface(e), &mut trail);
            size += 1;
            e = self.mesh.oprev(e);
        }

        self.free_trail(trail);
        FaceGroup {
            size,
            start: e,
            kind: GroupKind::Fan,
        }
    }

    /// The largest strip through `e_orig`. Strips must start on a
    /// consistent parity, so one end may be trimmed by a triangle.
    fn maximum_strip(&mut self, e_orig: EdgeId) -> FaceGroup {
        let mut trail = Vec::new();

        let mut tail_size = 0;
        let mut e = e_orig;
        loop {
            if self.is_marked(self.mesh.lface(e)) {
                break;
            }
            self.add_to_trail(self.mesh.lface(e), &mut trail);
            tail_size += 1;
            e = self.mesh.dprev(e);
            if self.is_marked(self.mesh.lface(e)) {
                break;
            }
            self.add_to_trail(self.mesh.lface(e), &mut trail);
            tail_size += 1;
            e = self.mesh.onext(e);
        }
        let e_tail = e;

        let mut head_size = 0;
        let mut e = e_orig;
        loop {
            if self.is_marked(self.mesh.rface(e)) {
                break;
            }
            self.add_to_trail(self.mesh.rface(e), &mut trail);
            head_size += 1;
            e = self.mesh.oprev(e);
            if self.is_marked(self.mesh.rface(e)) {
                break;
            }
            self.add_to_trail(self.mesh.rface(e), &mut trail);
            head_size += 1;
            e = self.mesh.dnext(e);
        }
        let e_head = e;

        self.free_trail(trail);
        let mut size = tail_size + head_size;
        let start = if tail_size % 2 == 0 {
            e_tail.sym()
        } else if head_size % 2 == 0 {
            e_head
        } else {
            // Both ends odd: drop one triangle, keeping e_orig's face.
            size -= 1;
            self.mesh.onext(e_head)
        };
        FaceGroup {
            size,
            start,
            kind: GroupKind::Strip,
        }
    }

    fn render_fan(&mut self, mut e: EdgeId, size: usize) {
        self.handler.begin(PrimitiveKind::TriangleFan);
        self.emit(self.mesh.org(e));
        self.emit(self.mesh.dst(e));
        let mut rendered = 0;
        while !self.is_marked(self.mesh.lface(e)) {
            let f = self.mesh.lface(e);
            self.mesh.face_mut(f).marked = true;
            rendered += 1;
            e = self.mesh.onext(e);
            self.emit(self.mesh.dst(e));
        }
        debug_assert_eq!(rendered, size);
        self.handler.end();
        self.fans += 1;
    }

    fn render_strip(&mut self, mut e: EdgeId, size: usize) {
        self.handler.begin(PrimitiveKind::TriangleStrip);
        self.emit(self.mesh.org(e));
        self.emit(self.mesh.dst(e));
        let mut rendered = 0;
        while !self.is_marked(self.mesh.lface(e)) {
            let f = self.mesh.lface(e);
            self.mesh.face_mut(f).marked = true;
            rendered += 1;
            e = self.mesh.dprev(e);
            self.emit(self.mesh.org(e));
            if self.is_marked(self.mesh.lface(e)) {
                break;
            }

            let f = self.mesh.lface(e);
            self.mesh.face_mut(f).marked = true;
            rendered += 1;
            e = self.mesh.onext(e);
            self.emit(self.mesh.dst(e));
        }
        debug_assert_eq!(rendered, size);
        self.handler.end();
        self.strips += 1;
    }

    fn render_maximum_face_group(&mut self, f_orig: FaceId) {
        let e = self.mesh.face(f_orig).an_edge;
        let mut best = FaceGroup {
            size: 1,
            start: e,
            kind: GroupKind::Triangle,
        };

        if !self.flag_boundary {
            let candidates = [e, self.mesh.lnext(e), self.mesh.lprev(e)];
            for &c in &candidates {
                let group = self.maximum_fan(c);
                if group.size > best.size {
                    best = group;
                }
            }
            for &c in &candidates {
                let group = self.maximum_strip(c);
                if group.size > best.size {
                    best = group;
                }
            }
        }

        match best.kind {
            GroupKind::Fan => self.render_fan(best.start, best.size),
            GroupKind::Strip => self.render_strip(best.start, best.size),
            GroupKind::Triangle => {
                let f = self.mesh.lface(best.start);
                self.mesh.face_mut(f).marked = true;
                self.lonely.push(f);
            }
        }
    }

    fn render_lonely_triangles(&mut self) {
        let lonely = std::mem::take(&mut self.lonely);
        self.handler.begin(PrimitiveKind::Triangles);
        // None forces a flag before the first vertex.
        let mut edge_state = None;
        for f in lonely {
            let start = self.mesh.face(f).an_edge;
            let mut e = start;
            loop {
                if self.flag_boundary {
                    let boundary = !self.mesh.face(self.mesh.rface(e)).inside;
                    if edge_state != Some(boundary) {
                        edge_state = Some(boundary);
                        self.handler.edge_flag(boundary);
                    }
                }
                self.emit(self.mesh.org(e));
                e = self.mesh.lnext(e);
                if e == start {
                    break;
                }
            }
        }
        self.handler.end();
    }
}

/// Emits the inside faces of a triangulated mesh as fans, strips and
/// independent triangles, or only as flagged triangles when the handler
/// wants edge flags.
pub(crate) fn render_mesh<V, H: TessHandler<V>>(mesh: &mut Mesh<V>, handler: &mut H) {
    let flag_boundary = handler.wants_edge_flags();
    let mut renderer = MeshRenderer {
        mesh,
        handler,
        flag_boundary,
        lonely: Vec::new(),
        fans: 0,
        strips: 0,
    };

    let mut f = renderer.mesh.face(F_HEAD).next;
    while f != F_HEAD {
        renderer.mesh.face_mut(f).marked = false;
        f = renderer.mesh.face(f).next;
    }

    let mut f = renderer.mesh.face(F_HEAD).next;
    while f != F_HEAD {
        let face = renderer.mesh.face(f);
        if face.inside && !face.marked {
            renderer.render_maximum_face_group(f);
            debug_assert!(renderer.mesh.face(f).marked);
        }
        f = renderer.mesh.face(f).next;
    }

    let lonely = renderer.lonely.len();
    if lonely > 0 {
        renderer.render_lonely_triangles();
    }
    debug!(
        "rendered {} fans, {} strips, {} separate triangles",
        renderer.fans, renderer.strips, lonely
    );
}

/// Emits one line loop per inside face.
pub(crate) fn render_boundary<V, H: TessHandler<V>>(mesh: &Mesh<V>, handler: &mut H) {
    let mut loops = 0;
    for f in mesh.faces() {
        if !mesh.is_inside(f) {
            continue;
        }
        handler.begin(PrimitiveKind::LineLoop);
        for v in mesh.face_vertices(f) {
            if let Some(data) = mesh.data(v) {
                handler.vertex(data);
            }
        }
        handler.end();
        loops += 1;
    }
    debug!("rendered {} boundary contours", loops);
}

/// Orientation of a fan around the first vertex.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FanSign {
    Positive,
    Negative,
    /// Every triangle is degenerate.
    Degenerate,
    Inconsistent,
}

/// Sums the fan triangles' normals, flipping back-facing ones, to get a
/// usable normal even for self-intersecting contours.
fn fan_normal<V>(verts: &[CachedVertex<V>]) -> [Real; 3] {
    let mut norm = [0.0; 3];
    for_each_fan_normal(verts, |n, _| {
        let dot = n[0] * norm[0] + n[1] * norm[1] + n[2] * norm[2];
        let s = if dot >= 0.0 { 1.0 } else { -1.0 };
        for i in 0..3 {
            norm[i] += s * n[i];
        }
        true
    });
    norm
}

/// A fan whose triangles all face the same way still overlaps itself once it
/// turns a full circle around the first vertex.
const FULL_TURN: Real = std::f64::consts::TAU - 1.0e-9;

fn fan_sign<V>(verts: &[CachedVertex<V>], norm: [Real; 3]) -> FanSign {
    let mut sign = FanSign::Degenerate;
    let mut turned = 0.0;
    for_each_fan_normal(verts, |n, angle| {
        turned += angle;
        if turned >= FULL_TURN {
            sign = FanSign::Inconsistent;
            return false;
        }
        let dot = n[0] * norm[0] + n[1] * norm[1] + n[2] * norm[2];
        if dot == 0.0 {
            return true;
        }
        let s = if dot > 0.0 {
            FanSign::Positive
        } else {
            FanSign::Negative
        };
        if sign != FanSign::Degenerate && sign != s {
            sign = FanSign::Inconsistent;
            return false;
        }
        sign = s;
        true
    });
    sign
}

/// Calls `f` with `(v[i-1] - v0) x (v[i] - v0)` and the triangle's angle at
/// `v0` for each fan triangle until it returns false.
fn for_each_fan_normal<V, F>(verts: &[CachedVertex<V>], mut f: F)
where
    F: FnMut([Real; 3], Real) -> bool,
{
    let v0 = verts[0].coords;
    let rel = |c: [Real; 3]| [c[0] - v0[0], c[1] - v0[1], c[2] - v0[2]];
    let mut c = rel(verts[1].coords);
    for v in &verts[2..] {
        let p = c;
        c = rel(v.coords);
        let n = [
            p[1] * c[2] - p[2] * c[1],
            p[2] * c[0] - p[0] * c[2],
            p[0] * c[1] - p[1] * c[0],
        ];
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        let angle = len.atan2(p[0] * c[0] + p[1] * c[1] + p[2] * c[2]);
        if !f(n, angle) {
            return;
        }
    }
}

/// Fast path for a polygon made of one contour that is a fan around its
/// first vertex. Returns false when the contour needs the full sweep.
pub(crate) fn render_cache<V, H: TessHandler<V>>(
    verts: &[CachedVertex<V>],
    normal: [Real; 3],
    rule: WindingRule,
    boundary_only: bool,
    handler: &mut H,
) -> bool {
    if verts.len() < 3 {
        // Degenerate contour: no output.
        return true;
    }

    let norm = if normal == [0.0; 3] {
        fan_normal(verts)
    } else {
        normal
    };

    let positive = match fan_sign(verts, norm) {
        FanSign::Inconsistent => return false,
        FanSign::Degenerate => return true,
        FanSign::Positive => true,
        FanSign::Negative => false,
    };

    let drawn = match rule {
        WindingRule::Odd | WindingRule::NonZero => true,
        WindingRule::Positive => positive,
        WindingRule::Negative => !positive,
        WindingRule::AbsGeqTwo => false,
    };
    if !drawn {
        return true;
    }

    let kind = if boundary_only {
        PrimitiveKind::LineLoop
    } else if verts.len() > 3 {
        PrimitiveKind::TriangleFan
    } else {
        PrimitiveKind::Triangles
    };
    handler.begin(kind);
    handler.vertex(&verts[0].data);
    if positive {
        for v in &verts[1..] {
            handler.vertex(&v.data);
        }
    } else {
        for v in verts[1..].iter().rev() {
            handler.vertex(&v.data);
        }
    }
    handler.end();
    debug!("single contour of {} vertices sent as {:?}", verts.len(), kind);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        prims: Vec<(PrimitiveKind, Vec<u32>)>,
    }

    impl TessHandler<u32> for Recorder {
        fn begin(&mut self, kind: PrimitiveKind) {
            self.prims.push((kind, Vec::new()));
        }
        fn vertex(&mut self, data: &u32) {
            if let Some(p) = self.prims.last_mut() {
                p.1.push(*data);
            }
        }
        fn end(&mut self) {}
    }

    fn cached(points: &[[Real; 2]]) -> Vec<CachedVertex<u32>> {
        points
            .iter()
            .enumerate()
            .map(|(i, p)| CachedVertex {
                coords: [p[0], p[1], 0.0],
                data: i as u32,
            })
            .collect()
    }

    const SQUARE: [[Real; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

    #[test]
    fn convex_contour_is_one_fan() {
        let mut rec = Recorder::default();
        let verts = cached(&SQUARE);
        assert!(render_cache(&verts, [0.0; 3], WindingRule::Odd, false, &mut rec));
        assert_eq!(rec.prims, vec![(PrimitiveKind::TriangleFan, vec![0, 1, 2, 3])]);
    }

    #[test]
    fn triangle_is_sent_as_triangles() {
        let mut rec = Recorder::default();
        let verts = cached(&SQUARE[..3]);
        assert!(render_cache(&verts, [0.0, 0.0, 1.0], WindingRule::NonZero, false, &mut rec));
        assert_eq!(rec.prims, vec![(PrimitiveKind::Triangles, vec![0, 1, 2])]);
    }

    #[test]
    fn clockwise_fan_is_reversed() {
        let mut rec = Recorder::default();
        let mut verts = cached(&SQUARE);
        verts.reverse();
        // Data is now 3, 2, 1, 0 around a clockwise square.
        assert!(render_cache(&verts, [0.0, 0.0, 1.0], WindingRule::Odd, false, &mut rec));
        assert_eq!(rec.prims, vec![(PrimitiveKind::TriangleFan, vec![3, 0, 1, 2])]);
    }

    #[test]
    fn winding_rules_filter_by_orientation() {
        let verts = cached(&SQUARE);
        let up = [0.0, 0.0, 1.0];
        for (rule, expect_output) in [
            (WindingRule::Positive, true),
            (WindingRule::Negative, false),
            (WindingRule::AbsGeqTwo, false),
        ] {
            let mut rec = Recorder::default();
            assert!(render_cache(&verts, up, rule, false, &mut rec));
            assert_eq!(!rec.prims.is_empty(), expect_output, "rule {:?}", rule);
        }
    }

    #[test]
    fn boundary_only_emits_line_loop() {
        let mut rec = Recorder::default();
        let verts = cached(&SQUARE);
        assert!(render_cache(&verts, [0.0; 3], WindingRule::Odd, true, &mut rec));
        assert_eq!(rec.prims, vec![(PrimitiveKind::LineLoop, vec![0, 1, 2, 3])]);
    }

    #[test]
    fn concave_contour_falls_back() {
        // Vertex 3 is hidden from vertex 0, so the fan folds over itself.
        let verts = cached(&[[0.0, 0.0], [4.0, 0.0], [4.0, 2.0], [3.0, 1.0], [0.0, 3.0]]);
        let mut rec = Recorder::default();
        assert!(!render_cache(&verts, [0.0, 0.0, 1.0], WindingRule::Odd, false, &mut rec));
        assert!(rec.prims.is_empty());
    }

    #[test]
    fn contour_winding_twice_falls_back() {
        // A dodecagon walked twice around its centre. Every fan triangle
        // faces the same way, but they cover the disk twice.
        let mut points = vec![[0.0, 0.0]];
        for k in 0..24 {
            let a = k as Real * std::f64::consts::PI / 6.0;
            points.push([a.cos(), a.sin()]);
        }
        let verts = cached(&points);
        for rule in [WindingRule::Odd, WindingRule::NonZero, WindingRule::AbsGeqTwo] {
            let mut rec = Recorder::default();
            assert!(!render_cache(&verts, [0.0, 0.0, 1.0], rule, false, &mut rec));
            assert!(rec.prims.is_empty());
        }
        // Once around is still a fan.
        let mut rec = Recorder::default();
        assert!(render_cache(&verts[..13], [0.0, 0.0, 1.0], WindingRule::Odd, false, &mut rec));
        assert_eq!(rec.prims.len(), 1);
        assert_eq!(rec.prims[0].0, PrimitiveKind::TriangleFan);
    }

    #[test]
    fn degenerate_contours_emit_nothing() {
        let mut rec = Recorder::default();
        assert!(render_cache(&cached(&SQUARE[..2]), [0.0; 3], WindingRule::Odd, false, &mut rec));
        let collinear = cached(&[[0.0, 0.0], [1.0, 0.0], [2.0, 0.0]]);
        assert!(render_cache(&collinear, [0.0, 0.0, 1.0], WindingRule::Odd, false, &mut rec));
        assert!(rec.prims.is_empty());
    }
}
