// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Region bookkeeping at an event: closing the regions that end at the event
// vertex, opening regions for its right-going edges, and adding the
// diagonals that keep every inside face monotone.

use super::{add_winding, edge_leq, RegionId, Sweep};
use crate::callbacks::TessHandler;
use crate::geom::{edge_sign, vert_eq, vert_leq};
use crate::mesh::{EdgeId, VertId};

impl<'a, V, H: TessHandler<V>> Sweep<'a, V, H> {
    /// The region above the uppermost edge with the same origin as
    /// `reg.e_up`. A temporary edge found there is replaced with a real one.
    pub(super) fn top_left_region(&mut self, mut reg: RegionId) -> RegionId {
        let org = self.mesh.org(self.e_up(reg));
        loop {
            reg = self.region_above(reg);
            if self.mesh.org(self.e_up(reg)) != org {
                break;
            }
        }

        if self.reg(reg).fix_upper_edge {
            let below = self.e_up(self.region_below(reg));
            let lnext = self.mesh.lnext(self.e_up(reg));
            let e = self.mesh.connect(below.sym(), lnext);
            self.fix_upper_edge(reg, e);
            reg = self.region_above(reg);
        }
        reg
    }

    /// The region above the uppermost edge with the same destination as
    /// `reg.e_up`.
    pub(super) fn top_right_region(&self, mut reg: RegionId) -> RegionId {
        let dst = self.mesh.dst(self.e_up(reg));
        loop {
            reg = self.region_above(reg);
            if self.mesh.dst(self.e_up(reg)) != dst {
                return reg;
            }
        }
    }

    /// Finishes the regions from `reg_first` down to, not including,
    /// `reg_last` (the whole run of regions ending at the event when
    /// `reg_last` is none). Mesh edges are relinked to match the dictionary
    /// order. Returns the lowest left-going edge at the event.
    pub(super) fn finish_left_regions(
        &mut self,
        reg_first: RegionId,
        reg_last: RegionId,
    ) -> EdgeId {
        let mut reg_prev = reg_first;
        let mut e_prev = self.e_up(reg_first);
        while reg_prev != reg_last {
            self.reg_mut(reg_prev).fix_upper_edge = false;
            let reg = self.region_below(reg_prev);
            let mut e = self.e_up(reg);
            if self.mesh.org(e) != self.mesh.org(e_prev) {
                if !self.reg(reg).fix_upper_edge {
                    // The last left-going edge. Its face may still have
                    // edges in the mesh, so finish rather than delete.
                    self.finish_region(reg_prev);
                    break;
                }
                // The edge below was temporary: replace it with a real one.
                let lprev = self.mesh.lprev(e_prev);
                e = self.mesh.connect(lprev, e.sym());
                self.fix_upper_edge(reg, e);
            }

            // Relink so that e_prev.onext == e.
            if self.mesh.onext(e_prev) != e {
                let oprev = self.mesh.oprev(e);
                self.mesh.splice(oprev, e);
                self.mesh.splice(e_prev, e);
            }
            // May change reg.e_up.
            self.finish_region(reg_prev);
            e_prev = self.e_up(reg);
            reg_prev = reg;
        }
        e_prev
    }

    /// Adds regions below `reg_up` for the right-going edges from `e_first`
    /// up to, not including, `e_last`, in counter-clockwise order around
    /// their shared origin. Then computes the winding of every region at
    /// that origin and relinks the mesh to match the dictionary.
    ///
    /// `e_top_left` is the edge just above the new ones in the origin ring,
    /// or none to take it from the dictionary. With `clean_up` the newly
    /// adjacent edges are checked for intersections.
    pub(super) fn add_right_edges(
        &mut self,
        reg_up: RegionId,
        e_first: EdgeId,
        e_last: EdgeId,
        e_top_left: Option<EdgeId>,
        clean_up: bool,
    ) {
        let mut e = e_first;
        loop {
            debug_assert!(vert_leq(self.mesh.org_pos(e), self.mesh.dst_pos(e)));
            self.add_region_below(reg_up, e.sym());
            e = self.mesh.onext(e);
            if e == e_last {
                break;
            }
        }

        let e_top_left = match e_top_left {
            Some(e) => e,
            None => self.mesh.rprev(self.e_up(self.region_below(reg_up))),
        };
        let mut reg_prev = reg_up;
        let mut e_prev = e_top_left;
        let mut first_time = true;
        loop {
            let reg = self.region_below(reg_prev);
            let e = self.e_up(reg).sym();
            if self.mesh.org(e) != self.mesh.org(e_prev) {
                break;
            }

            if self.mesh.onext(e) != e_prev {
                // Move e to just below e_prev in the origin ring.
                let oprev = self.mesh.oprev(e);
                self.mesh.splice(oprev, e);
                let oprev = self.mesh.oprev(e_prev);
                self.mesh.splice(oprev, e);
            }
            let winding = self.reg(reg_prev).winding_number - self.mesh.winding(e);
            let inside = self.rule.is_inside(winding);
            let r = self.reg_mut(reg);
            r.winding_number = winding;
            r.inside = inside;

            // Two edges with the same slope must be merged before any
            // intersection test.
            self.reg_mut(reg_prev).dirty = true;
            if !first_time && self.check_for_right_splice(reg_prev) {
                add_winding(&mut *self.mesh, e, e_prev);
                self.delete_region(reg_prev);
                self.mesh.delete_edge(e_prev);
            }
            first_time = false;
            reg_prev = reg;
            e_prev = e;
        }
        self.reg_mut(reg_prev).dirty = true;

        if clean_up {
            self.walk_dirty_regions(reg_prev);
        }
    }

    /// The event has no right-going edges. Adds a temporary edge to the
    /// nearer right endpoint of the edges above and below so the region
    /// stays connected to the rest of the sweep.
    pub(super) fn connect_right_vertex(&mut self, mut reg_up: RegionId, mut e_bottom_left: EdgeId) {
        let mut e_top_left = self.mesh.onext(e_bottom_left);
        let reg_lo = self.region_below(reg_up);
        let e_up = self.e_up(reg_up);
        let e_lo = self.e_up(reg_lo);
        let mut degenerate = false;

        if self.mesh.dst(e_up) != self.mesh.dst(e_lo) {
            self.check_for_intersect(reg_up);
        }

        // The upper or lower edge may now pass through the event, or meet
        // the new intersection vertex.
        let event = self.mesh.position(self.event);
        if vert_eq(self.mesh.org_pos(e_up), event) {
            let oprev = self.mesh.oprev(e_top_left);
            self.mesh.splice(oprev, e_up);
            reg_up = self.top_left_region(reg_up);
            let below = self.region_below(reg_up);
            e_top_left = self.e_up(below);
            self.finish_left_regions(below, reg_lo);
            degenerate = true;
        }
        if vert_eq(self.mesh.org_pos(e_lo), event) {
            let oprev = self.mesh.oprev(e_lo);
            self.mesh.splice(e_bottom_left, oprev);
            e_bottom_left = self.finish_left_regions(reg_lo, RegionId::NONE);
            degenerate = true;
        }
        if degenerate {
            let e_first = self.mesh.onext(e_bottom_left);
            self.add_right_edges(reg_up, e_first, e_top_left, Some(e_top_left), true);
            return;
        }

        let target = if vert_leq(self.mesh.org_pos(e_lo), self.mesh.org_pos(e_up)) {
            self.mesh.oprev(e_lo)
        } else {
            e_up
        };
        let lprev = self.mesh.lprev(e_bottom_left);
        let e_new = self.mesh.connect(lprev, target);

        // No clean-up yet: e_new must be marked temporary first.
        let onext = self.mesh.onext(e_new);
        self.add_right_edges(reg_up, e_new, onext, Some(onext), false);
        let reg = self.mesh.edge(e_new.sym()).active_region;
        self.reg_mut(reg).fix_upper_edge = true;
        self.walk_dirty_regions(reg_up);
    }

    /// The event lies exactly on the upper edge of `reg_up`.
    fn connect_left_degenerate(&mut self, mut reg_up: RegionId, v_event: VertId) {
        let e = self.e_up(reg_up);
        let event = self.mesh.position(v_event);
        let an_edge = self.mesh.vert(v_event).an_edge;

        if vert_eq(self.mesh.org_pos(e), event) {
            // e.org has not been processed yet: merge and wait for it.
            self.merge_vertices(e, an_edge);
            return;
        }

        if !vert_eq(self.mesh.dst_pos(e), event) {
            // Splice the event into the edge passing through it.
            self.mesh.split_edge(e.sym());
            if self.reg(reg_up).fix_upper_edge {
                // Drop the unused part of the temporary edge.
                let onext = self.mesh.onext(e);
                self.mesh.delete_edge(onext);
                self.reg_mut(reg_up).fix_upper_edge = false;
            }
            self.mesh.splice(an_edge, e);
            self.sweep_event(v_event);
            return;
        }

        // The event coincides with e.dst, which is already processed:
        // splice in the additional right-going edges.
        reg_up = self.top_right_region(reg_up);
        let reg = self.region_below(reg_up);
        let mut e_top_right = self.e_up(reg).sym();
        let e_last = self.mesh.onext(e_top_right);
        let mut e_top_left = Some(e_last);
        if self.reg(reg).fix_upper_edge {
            // e.dst's only right-going edge was temporary.
            debug_assert_ne!(e_last, e_top_right);
            self.delete_region(reg);
            self.mesh.delete_edge(e_top_right);
            e_top_right = self.mesh.oprev(e_last);
        }
        self.mesh.splice(an_edge, e_top_right);
        if !self.mesh.edge_goes_left(e_last) {
            // e.dst had no left-going edges.
            e_top_left = None;
        }
        let e_first = self.mesh.onext(e_top_right);
        self.add_right_edges(reg_up, e_first, e_last, e_top_left, true);
    }

    /// The event has only right-going edges. Finds its region by search and
    /// connects it to the processed part of the mesh if that region is
    /// inside or bounded by a temporary edge.
    pub(super) fn connect_left_vertex(&mut self, v_event: VertId) {
        let an_edge = self.mesh.vert(v_event).an_edge;
        let search_edge = an_edge.sym();

        let reg_up = {
            let Sweep {
                mesh,
                dict,
                regions,
                event,
                ..
            } = self;
            let (mesh, regions, event) = (&**mesh, &*regions, *event);
            let e_of = |r: RegionId| if r.is_none() { search_edge } else { regions[r.0].e_up };
            let node = dict.search(RegionId::NONE, |a, b| {
                edge_leq(mesh, event, e_of(a), e_of(b))
            });
            dict.key(node).unwrap_or(RegionId::NONE)
        };
        if reg_up.is_none() {
            return;
        }
        let reg_lo = self.region_below(reg_up);
        if reg_lo.is_none() {
            return;
        }
        let e_up = self.e_up(reg_up);
        let e_lo = self.e_up(reg_lo);
        let event = self.mesh.position(v_event);

        // Merge with the upper edge if the event lies on it.
        if edge_sign(self.mesh.dst_pos(e_up), event, self.mesh.org_pos(e_up)) == 0.0 {
            self.connect_left_degenerate(reg_up, v_event);
            return;
        }

        // Connect to the closer of the two left endpoints, unless that one
        // is not a valid target.
        let reg = if vert_leq(self.mesh.dst_pos(e_lo), self.mesh.dst_pos(e_up)) {
            reg_up
        } else {
            reg_lo
        };

        if self.reg(reg_up).inside || self.reg(reg).fix_upper_edge {
            let e_new = if reg == reg_up {
                let lnext = self.mesh.lnext(e_up);
                self.mesh.connect(an_edge.sym(), lnext)
            } else {
                let dnext = self.mesh.dnext(e_lo);
                self.mesh.connect(dnext, an_edge).sym()
            };
            if self.reg(reg).fix_upper_edge {
                self.fix_upper_edge(reg, e_new);
            } else {
                let new_reg = self.add_region_below(reg_up, e_new);
                self.compute_winding(new_reg);
            }
            self.sweep_event(v_event);
        } else {
            // Outside the polygon: no connection needed.
            self.add_right_edges(reg_up, an_edge, an_edge, None, true);
        }
    }
}
