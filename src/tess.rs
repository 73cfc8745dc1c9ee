// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// The tessellator facade: polygon/contour state machine, properties, and the
// pipeline run at end_polygon.

use log::{debug, warn};

use crate::callbacks::TessHandler;
use crate::error::{Result, TessError};
use crate::geom::Real;
use crate::mesh::Mesh;
use crate::render::{render_boundary, render_cache, render_mesh, CachedVertex};
use crate::sweep::compute_interior;

mod output;
mod projection;

pub use output::{tessellate, TessOptions, TessOutput};

/// Largest accepted coordinate magnitude.
pub const MAX_COORD: Real = 1.0e150;

/// Polygons of at most this many vertices in a single contour are tried on
/// the fan fast path before the sweep.
const MAX_CACHE: usize = 100;

// ─────────────────────────────── Public types ──────────────────────────────────

/// Which winding numbers count as inside.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum WindingRule {
    #[default]
    Odd,
    NonZero,
    Positive,
    Negative,
    AbsGeqTwo,
}

impl WindingRule {
    pub fn is_inside(self, n: i32) -> bool {
        match self {
            WindingRule::Odd => n & 1 != 0,
            WindingRule::NonZero => n != 0,
            WindingRule::Positive => n > 0,
            WindingRule::Negative => n < 0,
            WindingRule::AbsGeqTwo => n >= 2 || n <= -2,
        }
    }
}

/// A settable tessellator property.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum TessProperty {
    WindingRule(WindingRule),
    /// Emit only the boundary loops of the inside region.
    BoundaryOnly(bool),
    /// Merge tolerance in `[0, 1]`. Recorded only; merging is exact.
    Tolerance(Real),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum State {
    Idle,
    InPolygon,
    InContour,
}

// ─────────────────────────── Tessellator ──────────────────────────────────────

/// Decomposes polygons into triangles, reported through a [`TessHandler`].
///
/// A polygon is one or more contours, each a closed sequence of vertices
/// added between [`begin_contour`](Self::begin_contour) and
/// [`end_contour`](Self::end_contour). Contours may self-intersect, overlap,
/// and nest; the [`WindingRule`] decides which regions are inside.
///
/// Every method that can fail reports the error to the handler and returns
/// it. A failure discards the polygon in progress and leaves the
/// tessellator idle and ready for the next one.
pub struct Tessellator<V, H> {
    handler: H,
    state: State,
    winding_rule: WindingRule,
    boundary_only: bool,
    tolerance: Real,
    normal: [Real; 3],
    contours: Vec<Vec<CachedVertex<V>>>,
}

impl<V, H: TessHandler<V>> Tessellator<V, H> {
    pub fn new(handler: H) -> Self {
        Tessellator {
            handler,
            state: State::Idle,
            winding_rule: WindingRule::Odd,
            boundary_only: false,
            tolerance: 0.0,
            normal: [0.0; 3],
            contours: Vec::new(),
        }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn into_handler(self) -> H {
        self.handler
    }

    // ───── Properties ─────

    pub fn winding_rule(&self) -> WindingRule {
        self.winding_rule
    }

    pub fn boundary_only(&self) -> bool {
        self.boundary_only
    }

    pub fn tolerance(&self) -> Real {
        self.tolerance
    }

    pub fn normal(&self) -> [Real; 3] {
        self.normal
    }

    /// Sets the plane normal used to project the input. The zero vector
    /// asks for one to be computed per polygon. Takes effect at the next
    /// `end_polygon`.
    pub fn set_normal(&mut self, normal: [Real; 3]) {
        self.normal = normal;
    }

    /// Sets a property. Only valid between polygons: mid-polygon, the
    /// polygon is aborted with an error and the value is applied anyway.
    pub fn set_property(&mut self, property: TessProperty) -> Result<()> {
        let skipped = match self.state {
            State::Idle => None,
            State::InPolygon => Some(TessError::MissingEndPolygon),
            State::InContour => Some(TessError::MissingEndContour),
        };
        if let Some(err) = skipped {
            self.report(err);
        }

        match property {
            TessProperty::WindingRule(rule) => self.winding_rule = rule,
            TessProperty::BoundaryOnly(b) => self.boundary_only = b,
            TessProperty::Tolerance(t) if (0.0..=1.0).contains(&t) => self.tolerance = t,
            TessProperty::Tolerance(t) => warn!("tolerance {} outside [0, 1] ignored", t),
        }
        skipped.map_or(Ok(()), Err)
    }

    pub fn set_winding_rule(&mut self, rule: WindingRule) -> Result<()> {
        self.set_property(TessProperty::WindingRule(rule))
    }

    pub fn set_boundary_only(&mut self, boundary_only: bool) -> Result<()> {
        self.set_property(TessProperty::BoundaryOnly(boundary_only))
    }

    pub fn set_tolerance(&mut self, tolerance: Real) -> Result<()> {
        self.set_property(TessProperty::Tolerance(tolerance))
    }

    // ───── Polygon definition ─────

    pub fn begin_polygon(&mut self) -> Result<()> {
        match self.state {
            State::Idle => {
                self.state = State::InPolygon;
                Ok(())
            }
            State::InPolygon => self.fail(TessError::MissingEndPolygon),
            State::InContour => self.fail(TessError::MissingEndContour),
        }
    }

    pub fn begin_contour(&mut self) -> Result<()> {
        match self.state {
            State::InPolygon => {
                self.contours.push(Vec::new());
                self.state = State::InContour;
                Ok(())
            }
            State::Idle => self.fail(TessError::MissingBeginPolygon),
            State::InContour => self.fail(TessError::MissingEndContour),
        }
    }

    /// Appends a vertex to the open contour. `data` is handed back through
    /// the handler wherever this vertex appears in the output.
    pub fn add_vertex(&mut self, coords: [Real; 3], data: V) -> Result<()> {
        match self.state {
            State::InContour => {}
            State::Idle => return self.fail(TessError::MissingBeginPolygon),
            State::InPolygon => return self.fail(TessError::MissingBeginContour),
        }
        if coords.iter().any(|c| !(c.abs() <= MAX_COORD)) {
            return self.fail(TessError::CoordTooLarge);
        }
        if let Some(contour) = self.contours.last_mut() {
            contour.push(CachedVertex { coords, data });
        }
        Ok(())
    }

    pub fn end_contour(&mut self) -> Result<()> {
        match self.state {
            State::InContour => {
                self.state = State::InPolygon;
                Ok(())
            }
            State::Idle | State::InPolygon => self.fail(TessError::MissingBeginContour),
        }
    }

    /// Tessellates the polygon and delivers the output to the handler.
    pub fn end_polygon(&mut self) -> Result<()> {
        match self.state {
            State::InPolygon => {}
            State::Idle => return self.fail(TessError::MissingBeginPolygon),
            State::InContour => return self.fail(TessError::MissingEndContour),
        }
        self.state = State::Idle;
        let mut contours = std::mem::take(&mut self.contours);
        contours.retain(|c| !c.is_empty());
        self.tessellate_contours(contours)
    }

    // ───── Internals ─────

    fn report(&mut self, err: TessError) {
        if self.state != State::Idle {
            warn!("{}; discarding polygon of {} contours", err, self.contours.len());
        } else {
            warn!("{}", err);
        }
        self.state = State::Idle;
        self.contours.clear();
        self.handler.error(err);
    }

    fn fail(&mut self, err: TessError) -> Result<()> {
        self.report(err);
        Err(err)
    }

    fn tessellate_contours(&mut self, mut contours: Vec<Vec<CachedVertex<V>>>) -> Result<()> {
        if contours.is_empty() {
            return Ok(());
        }
        let wants_mesh = self.handler.wants_mesh();

        if contours.len() == 1
            && contours[0].len() <= MAX_CACHE
            && !wants_mesh
            && !self.handler.wants_edge_flags()
            && render_cache(
                &contours[0],
                self.normal,
                self.winding_rule,
                self.boundary_only,
                &mut self.handler,
            )
        {
            return Ok(());
        }

        let mut mesh = Mesh::new();
        let mut vertex_count = 0;
        for contour in &mut contours {
            let mut last = None;
            for v in contour.drain(..) {
                last = Some(mesh.append_contour_vertex(last, v.coords, v.data));
                vertex_count += 1;
            }
        }
        debug!(
            "sweeping {} contours, {} vertices, {:?} rule",
            contours.len(),
            vertex_count,
            self.winding_rule
        );

        projection::project_polygon(&mut mesh, self.normal);
        // The sweep has already reported its error to the handler.
        compute_interior(&mut mesh, &mut self.handler, self.winding_rule)?;

        if self.boundary_only {
            mesh.set_winding_number(1, true);
        } else {
            mesh.tessellate_interior();
        }
        #[cfg(debug_assertions)]
        mesh.check();

        if self.boundary_only {
            render_boundary(&mesh, &mut self.handler);
        } else {
            render_mesh(&mut mesh, &mut self.handler);
        }

        if wants_mesh {
            mesh.discard_exterior();
            self.handler.mesh(mesh);
        }
        Ok(())
    }
}
