// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Geometric predicates on projected sweep coordinates.
//
// Every predicate is written so that it interpolates from the endpoint nearer
// to the query point. That keeps the sweep comparator well behaved for
// near-vertical and near-coincident edges, where the naive slope formula
// loses all of its significant bits.

/// Scalar type used for every coordinate in the engine.
pub type Real = f64;

/// A vertex position on the sweep plane. `s` is the sweep axis and `t` the
/// axis along the sweep line.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SweepPoint {
    pub s: Real,
    pub t: Real,
}

impl SweepPoint {
    #[inline]
    pub const fn new(s: Real, t: Real) -> Self {
        SweepPoint { s, t }
    }

    /// The same point with the two axes exchanged.
    #[inline]
    pub fn transposed(self) -> Self {
        SweepPoint { s: self.t, t: self.s }
    }

    #[inline]
    pub fn l1_dist(self, other: SweepPoint) -> Real {
        (self.s - other.s).abs() + (self.t - other.t).abs()
    }
}

/// Sweep order: by `s`, then by `t`.
#[inline]
pub fn vert_leq(u: SweepPoint, v: SweepPoint) -> bool {
    u.s < v.s || (u.s == v.s && u.t <= v.t)
}

#[inline]
pub fn vert_eq(u: SweepPoint, v: SweepPoint) -> bool {
    u.s == v.s && u.t == v.t
}

/// Sweep order with the axes exchanged: by `t`, then by `s`.
#[inline]
pub fn trans_leq(u: SweepPoint, v: SweepPoint) -> bool {
    vert_leq(u.transposed(), v.transposed())
}

/// Given `u <= v <= w` in sweep order, evaluates the `t` coordinate of edge
/// `uw` at `v.s` and returns `v.t - uw(v.s)`, the signed distance from the
/// edge to `v`. Zero when `uw` is vertical.
pub fn edge_eval(u: SweepPoint, v: SweepPoint, w: SweepPoint) -> Real {
    let gap_l = v.s - u.s;
    let gap_r = w.s - v.s;
    if gap_l + gap_r > 0.0 {
        if gap_l < gap_r {
            (v.t - u.t) + (u.t - w.t) * (gap_l / (gap_l + gap_r))
        } else {
            (v.t - w.t) + (w.t - u.t) * (gap_r / (gap_l + gap_r))
        }
    } else {
        0.0
    }
}

/// Same sign as [`edge_eval`] without the division.
pub fn edge_sign(u: SweepPoint, v: SweepPoint, w: SweepPoint) -> Real {
    let gap_l = v.s - u.s;
    let gap_r = w.s - v.s;
    if gap_l + gap_r > 0.0 {
        (v.t - w.t) * gap_l + (v.t - u.t) * gap_r
    } else {
        0.0
    }
}

#[inline]
pub fn trans_eval(u: SweepPoint, v: SweepPoint, w: SweepPoint) -> Real {
    edge_eval(u.transposed(), v.transposed(), w.transposed())
}

#[inline]
pub fn trans_sign(u: SweepPoint, v: SweepPoint, w: SweepPoint) -> Real {
    edge_sign(u.transposed(), v.transposed(), w.transposed())
}

/// True if `u`, `v`, `w` turn counter-clockwise (or are collinear).
pub fn vert_ccw(u: SweepPoint, v: SweepPoint, w: SweepPoint) -> bool {
    u.s * (v.t - w.t) + v.s * (w.t - u.t) + w.s * (u.t - v.t) >= 0.0
}

/// Returns `(b*x + a*y) / (a + b)`, clamping negative weights to zero. The
/// result always lies between `x` and `y`.
fn interpolate(a: Real, x: Real, b: Real, y: Real) -> Real {
    let a = a.max(0.0);
    let b = b.max(0.0);
    if a <= b {
        if b == 0.0 {
            x / 2.0 + y / 2.0
        } else {
            x + (y - x) * (a / (a + b))
        }
    } else {
        y + (x - y) * (b / (a + b))
    }
}

/// Intersection of edges `o1-d1` and `o2-d2`.
///
/// The result is guaranteed to lie inside the bounding rectangle of both
/// edges, even when the edges do not actually cross.
pub fn edge_intersect(
    o1: SweepPoint,
    d1: SweepPoint,
    o2: SweepPoint,
    d2: SweepPoint,
) -> SweepPoint {
    SweepPoint {
        s: intersect_along_s(o1, d1, o2, d2),
        t: intersect_along_s(
            o1.transposed(),
            d1.transposed(),
            o2.transposed(),
            d2.transposed(),
        ),
    }
}

/// The `s` coordinate of the intersection. Called with transposed points it
/// yields the `t` coordinate.
fn intersect_along_s(
    mut a: SweepPoint,
    mut b: SweepPoint,
    mut c: SweepPoint,
    mut d: SweepPoint,
) -> Real {
    if !vert_leq(a, b) {
        std::mem::swap(&mut a, &mut b);
    }
    if !vert_leq(c, d) {
        std::mem::swap(&mut c, &mut d);
    }
    if !vert_leq(a, c) {
        std::mem::swap(&mut a, &mut c);
        std::mem::swap(&mut b, &mut d);
    }

    if !vert_leq(c, b) {
        // No overlap along s: pick the midpoint of the gap.
        return c.s / 2.0 + b.s / 2.0;
    }
    if vert_leq(b, d) {
        // Interpolate between c and b.
        let mut z1 = edge_eval(a, c, b);
        let mut z2 = edge_eval(c, b, d);
        if z1 + z2 < 0.0 {
            z1 = -z1;
            z2 = -z2;
        }
        interpolate(z1, c.s, z2, b.s)
    } else {
        // Interpolate between c and d.
        let mut z1 = edge_sign(a, c, b);
        let mut z2 = -edge_sign(a, d, b);
        if z1 + z2 < 0.0 {
            z1 = -z1;
            z2 = -z2;
        }
        interpolate(z1, c.s, z2, d.s)
    }
}
