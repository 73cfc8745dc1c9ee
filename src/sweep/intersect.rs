// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Ordering repairs and intersection handling between adjacent regions.
//
// After any change to the dictionary the affected regions are marked dirty.
// `walk_dirty_regions` then visits them bottom-up, splicing vertices that
// lie on the wrong side of a neighbouring edge and splitting edges that
// cross. Intersections create new vertices which are queued as events.

use log::trace;

use super::{add_winding, EventKey, RegionId, Sweep};
use crate::callbacks::TessHandler;
use crate::error::TessError;
use crate::geom::{edge_intersect, edge_sign, vert_eq, vert_leq, Real, SweepPoint};
use crate::mesh::VertId;

/// L1 weights of `isect` relative to the endpoints of one edge. Each pair
/// sums to one half.
fn vertex_weights(isect: SweepPoint, org: SweepPoint, dst: SweepPoint) -> [Real; 2] {
    let t1 = org.l1_dist(isect);
    let t2 = dst.l1_dist(isect);
    if t1 + t2 > 0.0 {
        [0.5 * t2 / (t1 + t2), 0.5 * t1 / (t1 + t2)]
    } else {
        [0.25, 0.25]
    }
}

impl<'a, V, H: TessHandler<V>> Sweep<'a, V, H> {
    /// Checks the right endpoints of the edges bounding `reg_up` against the
    /// dictionary order and splices one into the other edge when they
    /// disagree. Returns true if the mesh changed.
    pub(super) fn check_for_right_splice(&mut self, reg_up: RegionId) -> bool {
        let reg_lo = self.region_below(reg_up);
        let e_up = self.e_up(reg_up);
        let e_lo = self.e_up(reg_lo);
        let (org_up, org_lo) = (self.mesh.org_pos(e_up), self.mesh.org_pos(e_lo));

        if vert_leq(org_up, org_lo) {
            if edge_sign(self.mesh.dst_pos(e_lo), org_up, org_lo) > 0.0 {
                return false;
            }
            // e_up.org appears to be below e_lo.
            if !vert_eq(org_up, org_lo) {
                self.mesh.split_edge(e_lo.sym());
                let oprev = self.mesh.oprev(e_lo);
                self.mesh.splice(e_up, oprev);
                self.set_dirty(&[reg_up, reg_lo]);
            } else if self.mesh.org(e_up) != self.mesh.org(e_lo) {
                // Same place, different vertices: keep e_lo's.
                let gone = self.mesh.org(e_up);
                if let Some(handle) = self.mesh.vert_mut(gone).pq_handle.take() {
                    self.pq.delete(handle);
                }
                let oprev = self.mesh.oprev(e_lo);
                self.merge_vertices(oprev, e_up);
            }
        } else {
            if edge_sign(self.mesh.dst_pos(e_up), org_lo, org_up) < 0.0 {
                return false;
            }
            // e_lo.org appears to be above e_up.
            let above = self.region_above(reg_up);
            self.set_dirty(&[above, reg_up]);
            self.mesh.split_edge(e_up.sym());
            let oprev = self.mesh.oprev(e_lo);
            self.mesh.splice(oprev, e_up);
        }
        true
    }

    /// Like `check_for_right_splice`, for the left endpoints. The two
    /// destinations must be distinct points.
    pub(super) fn check_for_left_splice(&mut self, reg_up: RegionId) -> bool {
        let reg_lo = self.region_below(reg_up);
        let e_up = self.e_up(reg_up);
        let e_lo = self.e_up(reg_lo);
        let (dst_up, dst_lo) = (self.mesh.dst_pos(e_up), self.mesh.dst_pos(e_lo));
        debug_assert!(!vert_eq(dst_up, dst_lo));

        let inside = self.reg(reg_up).inside;
        if vert_leq(dst_up, dst_lo) {
            if edge_sign(dst_up, dst_lo, self.mesh.org_pos(e_up)) < 0.0 {
                return false;
            }
            // e_lo.dst is above e_up: splice it into e_up.
            let above = self.region_above(reg_up);
            self.set_dirty(&[above, reg_up]);
            let e = self.mesh.split_edge(e_up);
            self.mesh.splice(e_lo.sym(), e);
            let f = self.mesh.lface(e);
            self.mesh.face_mut(f).inside = inside;
        } else {
            if edge_sign(dst_lo, dst_up, self.mesh.org_pos(e_lo)) > 0.0 {
                return false;
            }
            // e_up.dst is below e_lo: splice it into e_lo.
            self.set_dirty(&[reg_up, reg_lo]);
            let e = self.mesh.split_edge(e_lo);
            let lnext = self.mesh.lnext(e_up);
            self.mesh.splice(lnext, e_lo.sym());
            let f = self.mesh.rface(e);
            self.mesh.face_mut(f).inside = inside;
        }
        true
    }

    /// Tests the upper and lower edges of `reg_up` for an intersection to the
    /// right of the event and splits both at it. Returns true only when it
    /// had to finish the regions itself, in which case the caller's view of
    /// the dictionary is stale.
    pub(super) fn check_for_intersect(&mut self, mut reg_up: RegionId) -> bool {
        let mut reg_lo = self.region_below(reg_up);
        let e_up = self.e_up(reg_up);
        let e_lo = self.e_up(reg_lo);
        let (org_up, org_lo) = (self.mesh.org(e_up), self.mesh.org(e_lo));
        let (dst_up, dst_lo) = (self.mesh.dst(e_up), self.mesh.dst(e_lo));
        let event = self.event;
        let ev = self.mesh.position(event);

        let (p_org_up, p_org_lo) = (self.mesh.position(org_up), self.mesh.position(org_lo));
        let (p_dst_up, p_dst_lo) = (self.mesh.position(dst_up), self.mesh.position(dst_lo));

        debug_assert!(!vert_eq(p_dst_lo, p_dst_up));
        debug_assert!(org_up != event && org_lo != event);
        debug_assert!(!self.reg(reg_up).fix_upper_edge && !self.reg(reg_lo).fix_upper_edge);

        if org_up == org_lo {
            // Right endpoints are the same vertex.
            return false;
        }

        let t_min_up = p_org_up.t.min(p_dst_up.t);
        let t_max_lo = p_org_lo.t.max(p_dst_lo.t);
        if t_min_up > t_max_lo {
            return false;
        }

        if vert_leq(p_org_up, p_org_lo) {
            if edge_sign(p_dst_lo, p_org_up, p_org_lo) > 0.0 {
                return false;
            }
        } else if edge_sign(p_dst_up, p_org_lo, p_org_up) < 0.0 {
            return false;
        }

        // The edges intersect, at least marginally.
        let mut isect = edge_intersect(p_dst_up, p_org_up, p_dst_lo, p_org_lo);

        // Rounding can put the intersection just left of the sweep line.
        if vert_leq(isect, ev) {
            isect = ev;
        }
        // Nor may it lie right of the nearer right endpoint.
        let org_min = if vert_leq(p_org_up, p_org_lo) {
            p_org_up
        } else {
            p_org_lo
        };
        if vert_leq(org_min, isect) {
            isect = org_min;
        }

        if vert_eq(isect, p_org_up) || vert_eq(isect, p_org_lo) {
            // At one of the right endpoints.
            self.check_for_right_splice(reg_up);
            return false;
        }

        if (!vert_eq(p_dst_up, ev) && edge_sign(p_dst_up, ev, isect) >= 0.0)
            || (!vert_eq(p_dst_lo, ev) && edge_sign(p_dst_lo, ev, isect) <= 0.0)
        {
            // The new upper or lower edge would pass on the wrong side of the
            // event, or through it.
            if dst_lo == event {
                // Splice dst_lo into e_up and process the new regions.
                self.mesh.split_edge(e_up.sym());
                self.mesh.splice(e_lo.sym(), e_up);
                reg_up = self.top_left_region(reg_up);
                let below = self.region_below(reg_up);
                let e_up = self.e_up(below);
                self.finish_left_regions(below, reg_lo);
                let oprev = self.mesh.oprev(e_up);
                self.add_right_edges(reg_up, oprev, e_up, Some(e_up), true);
                return true;
            }
            if dst_up == event {
                // Splice dst_up into e_lo and process the new regions.
                self.mesh.split_edge(e_lo.sym());
                let (lnext, oprev) = (self.mesh.lnext(e_up), self.mesh.oprev(e_lo));
                self.mesh.splice(lnext, oprev);
                reg_lo = reg_up;
                reg_up = self.top_right_region(reg_up);
                let e = self.mesh.rprev(self.e_up(self.region_below(reg_up)));
                let new_lo = self.mesh.oprev(e_lo);
                self.reg_mut(reg_lo).e_up = new_lo;
                let e_lo = self.finish_left_regions(reg_lo, RegionId::NONE);
                let (e_first, e_last) = (self.mesh.onext(e_lo), self.mesh.rprev(e_up));
                self.add_right_edges(reg_up, e_first, e_last, Some(e), true);
                return true;
            }
            // Called from connect_right_vertex: split whichever edge passes
            // on the wrong side and leave the splicing to the caller.
            if edge_sign(p_dst_up, ev, isect) >= 0.0 {
                let above = self.region_above(reg_up);
                self.set_dirty(&[above, reg_up]);
                self.mesh.split_edge(e_up.sym());
                let v = self.mesh.org(e_up);
                self.mesh.vert_mut(v).pos = ev;
            }
            if edge_sign(p_dst_lo, ev, isect) <= 0.0 {
                self.set_dirty(&[reg_up, reg_lo]);
                self.mesh.split_edge(e_lo.sym());
                let v = self.mesh.org(e_lo);
                self.mesh.vert_mut(v).pos = ev;
            }
            return false;
        }

        // General case: split both edges and join them at a new vertex.
        self.mesh.split_edge(e_up.sym());
        self.mesh.split_edge(e_lo.sym());
        let oprev = self.mesh.oprev(e_lo);
        self.mesh.splice(oprev, e_up);
        let v = self.mesh.org(e_up);
        self.mesh.vert_mut(v).pos = isect;
        let handle = self.pq.insert(EventKey {
            pos: isect,
            vertex: v,
        });
        self.mesh.vert_mut(v).pq_handle = Some(handle);
        self.intersect_data(v, [org_up, dst_up, org_lo, dst_lo]);
        trace!("edges cross at ({}, {})", isect.s, isect.t);
        self.intersections += 1;

        let above = self.region_above(reg_up);
        self.set_dirty(&[above, reg_up, reg_lo]);
        false
    }

    /// Gives the new intersection vertex `isect` coordinates interpolated
    /// from the four edge endpoints and asks the client to combine their
    /// data. A declined combine is a fatal error for this polygon.
    fn intersect_data(&mut self, isect: VertId, ends: [VertId; 4]) {
        let pos = self.mesh.position(isect);
        let mut weights = [0.0; 4];
        let mut coords = [0.0; 3];
        for (pair, edge) in ends.chunks(2).enumerate() {
            let (org, dst) = (edge[0], edge[1]);
            let w = vertex_weights(pos, self.mesh.position(org), self.mesh.position(dst));
            let (co, cd) = (self.mesh.coords(org), self.mesh.coords(dst));
            for i in 0..3 {
                coords[i] += w[0] * co[i] + w[1] * cd[i];
            }
            weights[pair * 2] = w[0];
            weights[pair * 2 + 1] = w[1];
        }
        self.mesh.vert_mut(isect).coords = coords;

        let data = [
            self.mesh.data(ends[0]),
            self.mesh.data(ends[1]),
            self.mesh.data(ends[2]),
            self.mesh.data(ends[3]),
        ];
        match self.handler.combine(coords, data, weights) {
            Some(combined) => self.mesh.vert_mut(isect).data = Some(combined),
            None => {
                if self.error.is_none() {
                    self.handler.error(TessError::NeedCombineCallback);
                    self.error = Some(TessError::NeedCombineCallback);
                }
            }
        }
    }

    /// Visits dirty regions from the bottom up, repairing ordering and
    /// handling intersections until no region is dirty.
    pub(super) fn walk_dirty_regions(&mut self, mut reg_up: RegionId) {
        let mut reg_lo = self.region_below(reg_up);

        loop {
            // Find the lowest dirty region.
            while self.reg(reg_lo).dirty {
                reg_up = reg_lo;
                reg_lo = self.region_below(reg_lo);
            }
            if !self.reg(reg_up).dirty {
                reg_lo = reg_up;
                reg_up = self.region_above(reg_up);
                if reg_up.is_none() || !self.reg(reg_up).dirty {
                    return;
                }
            }
            self.reg_mut(reg_up).dirty = false;
            let mut e_up = self.e_up(reg_up);
            let mut e_lo = self.e_up(reg_lo);

            if self.mesh.dst(e_up) != self.mesh.dst(e_lo) && self.check_for_left_splice(reg_up) {
                // A temporary edge is no longer needed once another edge
                // leaves its vertex to the right.
                if self.reg(reg_lo).fix_upper_edge {
                    self.delete_region(reg_lo);
                    self.mesh.delete_edge(e_lo);
                    reg_lo = self.region_below(reg_up);
                    e_lo = self.e_up(reg_lo);
                } else if self.reg(reg_up).fix_upper_edge {
                    self.delete_region(reg_up);
                    self.mesh.delete_edge(e_up);
                    reg_up = self.region_above(reg_lo);
                    e_up = self.e_up(reg_up);
                }
            }

            if self.mesh.org(e_up) != self.mesh.org(e_lo) {
                let event = self.event;
                if self.mesh.dst(e_up) != self.mesh.dst(e_lo)
                    && !self.reg(reg_up).fix_upper_edge
                    && !self.reg(reg_lo).fix_upper_edge
                    && (self.mesh.dst(e_up) == event || self.mesh.dst(e_lo) == event)
                {
                    // The event lies between the two edges, so it can serve
                    // as a fallback intersection point.
                    if self.check_for_intersect(reg_up) {
                        return;
                    }
                } else {
                    self.check_for_right_splice(reg_up);
                }
            }

            if self.mesh.org(e_up) == self.mesh.org(e_lo)
                && self.mesh.dst(e_up) == self.mesh.dst(e_lo)
            {
                // Two edges forming a degenerate loop.
                add_winding(&mut *self.mesh, e_lo, e_up);
                self.delete_region(reg_up);
                self.mesh.delete_edge(e_up);
                reg_up = self.region_above(reg_lo);
            }
        }
    }
}
