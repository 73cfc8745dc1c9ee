// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Sweep-line computation of the planar arrangement.
//
// The sweep line moves in increasing `s`. Events are vertices, taken from the
// priority queue in sweep order. The edge dictionary holds one active region
// per edge crossing the sweep line, ordered bottom to top; each region is the
// strip between its upper edge and the upper edge of the region below.
//
// When the sweep finishes, every face of the mesh is marked inside or outside
// according to the winding rule, and every inside face is monotone.

mod intersect;
mod monotone;

use log::{debug, trace};

use crate::bucketalloc::BucketAlloc;
use crate::callbacks::TessHandler;
use crate::dict::{Dict, NodeId};
use crate::error::TessError;
use crate::geom::{edge_eval, edge_sign, vert_eq, vert_leq, Real, SweepPoint};
use crate::mesh::{EdgeId, Mesh, VertId, E_HEAD, F_HEAD};
use crate::priorityq::{PriorityQ, QueueKey};
use crate::tess::{WindingRule, MAX_COORD};

/// Sentinel edges lie beyond any valid input coordinate.
const SENTINEL_COORD: Real = 4.0 * MAX_COORD;

/// Handle to an active region. Slot 0 of the region arena is a permanent
/// placeholder, so `NONE` is safe to read and is never dirty.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct RegionId(u32);

impl RegionId {
    pub(crate) const NONE: RegionId = RegionId(0);

    #[inline]
    pub(crate) fn is_none(self) -> bool {
        self == Self::NONE
    }
}

pub(crate) struct ActiveRegion {
    /// Upper edge, directed right to left.
    e_up: EdgeId,
    node_up: NodeId,
    /// Winding number inside the region.
    winding_number: i32,
    inside: bool,
    /// One of the two edges at t = +/- infinity.
    sentinel: bool,
    /// The upper or lower edge changed; check ordering and intersections.
    dirty: bool,
    /// The upper edge is a temporary edge added by `connect_right_vertex`,
    /// to be replaced once a real edge for its origin shows up. A region's
    /// lower edge is the upper edge of the region below, so one flag covers
    /// both sides.
    fix_upper_edge: bool,
}

impl ActiveRegion {
    fn new(e_up: EdgeId) -> Self {
        ActiveRegion {
            e_up,
            node_up: NodeId::HEAD,
            winding_number: 0,
            inside: false,
            sentinel: false,
            dirty: false,
            fix_upper_edge: false,
        }
    }
}

/// Priority queue key: sweep position, then vertex identity.
#[derive(Copy, Clone, Debug)]
pub(crate) struct EventKey {
    pos: SweepPoint,
    vertex: VertId,
}

impl QueueKey for EventKey {
    fn leq(&self, other: &Self) -> bool {
        if vert_eq(self.pos, other.pos) {
            self.vertex <= other.vertex
        } else {
            vert_leq(self.pos, other.pos)
        }
    }
}

/// Orders two upper edges at the current event: true when `e1` is at or
/// below `e2` on the sweep line.
///
/// Edges ending exactly at the event are compared by slope, and the test is
/// made against the vertex itself rather than its coordinates.
fn edge_leq<V>(mesh: &Mesh<V>, event: VertId, e1: EdgeId, e2: EdgeId) -> bool {
    let ev = mesh.position(event);
    let (o1, d1) = (mesh.org_pos(e1), mesh.dst_pos(e1));
    let (o2, d2) = (mesh.org_pos(e2), mesh.dst_pos(e2));

    if mesh.dst(e1) == event {
        if mesh.dst(e2) == event {
            // Both edges leave the event to the right: sort by slope.
            if vert_leq(o1, o2) {
                return edge_sign(d2, o1, o2) <= 0.0;
            }
            return edge_sign(d1, o2, o1) >= 0.0;
        }
        return edge_sign(d2, ev, o2) <= 0.0;
    }
    if mesh.dst(e2) == event {
        return edge_sign(d1, ev, o1) >= 0.0;
    }

    let t1 = edge_eval(d1, ev, o1);
    let t2 = edge_eval(d2, ev, o2);
    t1 >= t2
}

pub(crate) fn add_winding<V>(mesh: &mut Mesh<V>, e_dst: EdgeId, e_src: EdgeId) {
    let (w, w_sym) = (mesh.winding(e_src), mesh.winding(e_src.sym()));
    mesh.edge_mut(e_dst).winding += w;
    mesh.edge_mut(e_dst.sym()).winding += w_sym;
}

/// State of one sweep over one mesh.
pub(crate) struct Sweep<'a, V, H> {
    mesh: &'a mut Mesh<V>,
    handler: &'a mut H,
    rule: WindingRule,
    dict: Dict<RegionId>,
    pq: PriorityQ<EventKey>,
    regions: BucketAlloc<ActiveRegion>,
    event: VertId,
    error: Option<TessError>,
    intersections: usize,
    merges: usize,
}

/// Computes the planar arrangement of the contours in `mesh`, marks each
/// face inside or outside under `rule`, and leaves every inside face
/// monotone.
///
/// Vertex positions must already be projected. Intersections call the
/// handler's combine callback; when it declines, the error is reported
/// through the handler and returned.
pub(crate) fn compute_interior<V, H: TessHandler<V>>(
    mesh: &mut Mesh<V>,
    handler: &mut H,
    rule: WindingRule,
) -> Result<(), TessError> {
    let mut sweep = Sweep::new(mesh, handler, rule);

    sweep.remove_degenerate_edges();
    sweep.init_priority_queue();
    sweep.init_edge_dict();

    let mut events = 0usize;
    while let Some(key) = sweep.pq.extract_min() {
        let v = key.vertex;
        sweep.mesh.vert_mut(v).pq_handle = None;
        // Vertices at exactly the same place are merged up front.
        while let Some(next) = sweep.pq.minimum() {
            if !vert_eq(next.pos, key.pos) {
                break;
            }
            sweep.pq.extract_min();
            sweep.mesh.vert_mut(next.vertex).pq_handle = None;
            let e1 = sweep.mesh.vert(v).an_edge;
            let e2 = sweep.mesh.vert(next.vertex).an_edge;
            sweep.merge_vertices(e1, e2);
        }
        sweep.sweep_event(v);
        events += 1;
    }

    sweep.done_edge_dict();
    debug!(
        "sweep finished: {} events, {} intersections, {} merges",
        events, sweep.intersections, sweep.merges
    );
    let error = sweep.error;

    remove_degenerate_faces(mesh);
    #[cfg(debug_assertions)]
    mesh.check();

    match error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Removes faces bounded by only two edges, folding their winding into the
/// neighbouring edge.
fn remove_degenerate_faces<V>(mesh: &mut Mesh<V>) {
    let mut f = mesh.face(F_HEAD).next;
    while f != F_HEAD {
        let f_next = mesh.face(f).next;
        let e = mesh.face(f).an_edge;
        debug_assert_ne!(mesh.lnext(e), e);
        if mesh.lnext(mesh.lnext(e)) == e {
            let onext = mesh.onext(e);
            add_winding(mesh, onext, e);
            mesh.delete_edge(e);
        }
        f = f_next;
    }
}

impl<'a, V, H: TessHandler<V>> Sweep<'a, V, H> {
    fn new(mesh: &'a mut Mesh<V>, handler: &'a mut H, rule: WindingRule) -> Self {
        let mut regions = BucketAlloc::new();
        let placeholder = regions.alloc(ActiveRegion::new(EdgeId::NONE));
        debug_assert_eq!(placeholder, RegionId::NONE.0);
        Sweep {
            mesh,
            handler,
            rule,
            dict: Dict::new(),
            pq: PriorityQ::new(),
            regions,
            event: VertId::NONE,
            error: None,
            intersections: 0,
            merges: 0,
        }
    }

    // ─────────────────────────── Region helpers ────────────────────────────

    #[inline]
    fn reg(&self, r: RegionId) -> &ActiveRegion {
        &self.regions[r.0]
    }

    #[inline]
    fn reg_mut(&mut self, r: RegionId) -> &mut ActiveRegion {
        &mut self.regions[r.0]
    }

    #[inline]
    fn e_up(&self, r: RegionId) -> EdgeId {
        self.regions[r.0].e_up
    }

    fn region_above(&self, r: RegionId) -> RegionId {
        let node = self.dict.succ(self.reg(r).node_up);
        self.dict.key(node).unwrap_or(RegionId::NONE)
    }

    fn region_below(&self, r: RegionId) -> RegionId {
        let node = self.dict.pred(self.reg(r).node_up);
        self.dict.key(node).unwrap_or(RegionId::NONE)
    }

    fn set_dirty(&mut self, regions: &[RegionId]) {
        for &r in regions {
            if !r.is_none() {
                self.reg_mut(r).dirty = true;
            }
        }
    }

    /// Inserts a region for `e_new_up` in the dictionary, searching
    /// downward from `reg_above`.
    fn add_region_below(&mut self, reg_above: RegionId, e_new_up: EdgeId) -> RegionId {
        let reg = RegionId(self.regions.alloc(ActiveRegion::new(e_new_up)));
        let hint = self.reg(reg_above).node_up;
        let Sweep {
            mesh,
            dict,
            regions,
            event,
            ..
        } = self;
        let (mesh, regions, event) = (&**mesh, &*regions, *event);
        let node = dict.insert_before(hint, reg, |a, b| {
            edge_leq(mesh, event, regions[a.0].e_up, regions[b.0].e_up)
        });
        self.reg_mut(reg).node_up = node;
        self.mesh.edge_mut(e_new_up).active_region = reg;
        reg
    }

    fn delete_region(&mut self, reg: RegionId) {
        let e_up = self.e_up(reg);
        if self.reg(reg).fix_upper_edge {
            // Created with zero winding, so it must not have been merged
            // with a real edge.
            debug_assert_eq!(self.mesh.winding(e_up), 0);
        }
        self.mesh.edge_mut(e_up).active_region = RegionId::NONE;
        self.dict.remove(self.reg(reg).node_up);
        self.regions.free(reg.0);
    }

    /// Replaces the temporary upper edge of `reg` with `new_edge`.
    fn fix_upper_edge(&mut self, reg: RegionId, new_edge: EdgeId) {
        debug_assert!(self.reg(reg).fix_upper_edge);
        self.mesh.delete_edge(self.e_up(reg));
        let r = self.reg_mut(reg);
        r.fix_upper_edge = false;
        r.e_up = new_edge;
        self.mesh.edge_mut(new_edge).active_region = reg;
    }

    fn compute_winding(&mut self, reg: RegionId) {
        let above = self.region_above(reg);
        let n = self.reg(above).winding_number + self.mesh.winding(self.e_up(reg));
        let inside = self.rule.is_inside(n);
        let r = self.reg_mut(reg);
        r.winding_number = n;
        r.inside = inside;
    }

    /// Retires a region whose upper and lower edges both end at the event,
    /// stamping its inside flag on the face it bounds.
    fn finish_region(&mut self, reg: RegionId) {
        let e = self.e_up(reg);
        let f = self.mesh.lface(e);
        let inside = self.reg(reg).inside;
        let face = self.mesh.face_mut(f);
        face.inside = inside;
        face.an_edge = e;
        self.delete_region(reg);
    }

    /// Merges the vertex of `e2` into the vertex of `e1`, offering the client
    /// a chance to combine their data.
    fn merge_vertices(&mut self, e1: EdgeId, e2: EdgeId) {
        let (keep, gone) = (self.mesh.org(e1), self.mesh.org(e2));
        let coords = self.mesh.coords(keep);
        let combined = self.handler.combine(
            coords,
            [self.mesh.data(keep), self.mesh.data(gone), None, None],
            [0.5, 0.5, 0.0, 0.0],
        );
        if let Some(data) = combined {
            self.mesh.vert_mut(keep).data = Some(data);
        }
        trace!("merging coincident vertices at {:?}", self.mesh.position(keep));
        self.merges += 1;
        self.mesh.splice(e1, e2);
    }

    // ───────────────────────────── Set-up ──────────────────────────────────

    /// Removes zero-length edges and contours with fewer than three edges.
    fn remove_degenerate_edges(&mut self) {
        let mut e = self.mesh.edge(E_HEAD).next;
        while e != E_HEAD {
            let mut e_next = self.mesh.edge(e).next;
            let mut e_lnext = self.mesh.lnext(e);

            if vert_eq(self.mesh.org_pos(e), self.mesh.dst_pos(e))
                && self.mesh.lnext(e_lnext) != e
            {
                // Zero-length edge in a contour of at least three edges.
                self.merge_vertices(e_lnext, e);
                self.mesh.delete_edge(e);
                e = e_lnext;
                e_lnext = self.mesh.lnext(e);
            }
            if self.mesh.lnext(e_lnext) == e {
                // A contour of one or two edges.
                if e_lnext != e {
                    if e_lnext == e_next || e_lnext == e_next.sym() {
                        e_next = self.mesh.edge(e_next).next;
                    }
                    self.mesh.delete_edge(e_lnext);
                }
                if e == e_next || e == e_next.sym() {
                    e_next = self.mesh.edge(e_next).next;
                }
                self.mesh.delete_edge(e);
            }
            e = e_next;
        }
    }

    fn init_priority_queue(&mut self) {
        let verts: Vec<VertId> = self.mesh.vertices().collect();
        self.pq = PriorityQ::with_capacity(verts.len());
        for v in verts {
            let handle = self.pq.insert(EventKey {
                pos: self.mesh.position(v),
                vertex: v,
            });
            self.mesh.vert_mut(v).pq_handle = Some(handle);
        }
        self.pq.init();
    }

    fn add_sentinel(&mut self, t: Real) {
        let e = self.mesh.make_edge();
        let (org, dst) = (self.mesh.org(e), self.mesh.dst(e));
        self.mesh.vert_mut(org).pos = SweepPoint::new(SENTINEL_COORD, t);
        self.mesh.vert_mut(dst).pos = SweepPoint::new(-SENTINEL_COORD, t);
        self.event = dst;

        let mut region = ActiveRegion::new(e);
        region.sentinel = true;
        let reg = RegionId(self.regions.alloc(region));
        let Sweep {
            mesh,
            dict,
            regions,
            event,
            ..
        } = self;
        let (mesh, regions, event) = (&**mesh, &*regions, *event);
        let node = dict.insert(reg, |a, b| {
            edge_leq(mesh, event, regions[a.0].e_up, regions[b.0].e_up)
        });
        self.reg_mut(reg).node_up = node;
    }

    fn init_edge_dict(&mut self) {
        self.add_sentinel(-SENTINEL_COORD);
        self.add_sentinel(SENTINEL_COORD);
    }

    fn done_edge_dict(&mut self) {
        let mut fixed_edges = 0;
        while let Some(reg) = self.dict.key(self.dict.min()) {
            // Only the sentinels and at most one temporary edge remain.
            if !self.reg(reg).sentinel {
                debug_assert!(self.reg(reg).fix_upper_edge);
                fixed_edges += 1;
                debug_assert_eq!(fixed_edges, 1);
            }
            debug_assert_eq!(self.reg(reg).winding_number, 0);
            self.delete_region(reg);
        }
    }

    // ───────────────────────────── Events ──────────────────────────────────

    /// Processes one vertex event.
    fn sweep_event(&mut self, v_event: VertId) {
        self.event = v_event;

        // If the vertex ends an edge already in the dictionary, that edge
        // locates the event without a search.
        let start = self.mesh.vert(v_event).an_edge;
        let mut e = start;
        while self.mesh.edge(e).active_region.is_none() {
            e = self.mesh.onext(e);
            if e == start {
                // Every edge goes right: a start vertex.
                self.connect_left_vertex(v_event);
                return;
            }
        }

        // Close off the regions whose upper and lower edges both end here.
        let reg_up = self.top_left_region(self.mesh.edge(e).active_region);
        let reg = self.region_below(reg_up);
        let e_top_left = self.e_up(reg);
        let e_bottom_left = self.finish_left_regions(reg, RegionId::NONE);

        // Then open regions for the edges leaving to the right.
        if self.mesh.onext(e_bottom_left) == e_top_left {
            self.connect_right_vertex(reg_up, e_bottom_left);
        } else {
            let e_first = self.mesh.onext(e_bottom_left);
            self.add_right_edges(reg_up, e_first, e_top_left, Some(e_top_left), true);
        }
    }
}
