// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Triangulation of monotone faces, and the post-sweep mesh clean-ups.

use crate::geom::{edge_sign, vert_leq};
use crate::mesh::{FaceId, Mesh, E_HEAD, F_HEAD};

impl<V> Mesh<V> {
    /// Triangulates a face that is monotone in the sweep direction.
    ///
    /// The face boundary splits into an upper and a lower chain between the
    /// leftmost and rightmost vertices. Walking both chains left to right,
    /// every vertex that makes a convex turn with its chain is cut off with
    /// a diagonal; the rest wait on the reflex chain until the other side
    /// catches up. The new faces inherit the `inside` flag of `face`.
    pub(crate) fn tessellate_mono_region(&mut self, face: FaceId) {
        let mut up = self.face(face).an_edge;
        debug_assert!(self.lnext(up) != up && self.lnext(self.lnext(up)) != up);

        // Find the rightmost vertex, then the edge leaving it leftward.
        while vert_leq(self.dst_pos(up), self.org_pos(up)) {
            up = self.lprev(up);
        }
        while vert_leq(self.org_pos(up), self.dst_pos(up)) {
            up = self.lnext(up);
        }
        let mut lo = self.lprev(up);

        while self.lnext(up) != lo {
            if vert_leq(self.dst_pos(up), self.org_pos(lo)) {
                // up.dst is on the left: connect lo.org to it while the
                // turn stays convex.
                while self.lnext(lo) != up
                    && (self.edge_goes_left(self.lnext(lo))
                        || edge_sign(
                            self.org_pos(lo),
                            self.dst_pos(lo),
                            self.dst_pos(self.lnext(lo)),
                        ) <= 0.0)
                {
                    let lnext = self.lnext(lo);
                    lo = self.connect(lnext, lo).sym();
                }
                lo = self.lprev(lo);
            } else {
                // lo.org is on the left.
                while self.lnext(lo) != up
                    && (self.edge_goes_right(self.lprev(up))
                        || edge_sign(
                            self.dst_pos(up),
                            self.org_pos(up),
                            self.org_pos(self.lprev(up)),
                        ) >= 0.0)
                {
                    let lprev = self.lprev(up);
                    up = self.connect(up, lprev).sym();
                }
                up = self.lnext(up);
            }
        }

        // The remaining fan around the leftmost vertex.
        debug_assert_ne!(self.lnext(lo), up);
        while self.lnext(self.lnext(lo)) != up {
            let lnext = self.lnext(lo);
            lo = self.connect(lnext, lo).sym();
        }
    }

    /// Triangulates every inside face. Each must be monotone.
    pub(crate) fn tessellate_interior(&mut self) {
        let mut f = self.face(F_HEAD).next;
        while f != F_HEAD {
            // New faces go before f in the list, so they are not revisited.
            let next = self.face(f).next;
            if self.face(f).inside {
                self.tessellate_mono_region(f);
            }
            f = next;
        }
    }

    /// Zaps every face not marked inside.
    pub(crate) fn discard_exterior(&mut self) {
        let mut f = self.face(F_HEAD).next;
        while f != F_HEAD {
            let next = self.face(f).next;
            if !self.face(f).inside {
                self.zap_face(f);
            }
            f = next;
        }
    }

    /// Sets the winding of every edge separating an inside face from an
    /// outside one to `value`, oriented so the inside face is on the left
    /// of a positive edge. Other edges get zero winding, or are deleted when
    /// `keep_only_boundary` is set.
    pub(crate) fn set_winding_number(&mut self, value: i32, keep_only_boundary: bool) {
        let mut e = self.edge(E_HEAD).next;
        while e != E_HEAD {
            let e_next = self.edge(e).next;
            let left_inside = self.face(self.lface(e)).inside;
            let right_inside = self.face(self.rface(e)).inside;
            if left_inside != right_inside {
                let w = if left_inside { value } else { -value };
                self.edge_mut(e).winding = w;
                self.edge_mut(e.sym()).winding = -w;
            } else if keep_only_boundary {
                self.delete_edge(e);
            } else {
                self.edge_mut(e).winding = 0;
                self.edge_mut(e.sym()).winding = 0;
            }
            e = e_next;
        }
    }
}
