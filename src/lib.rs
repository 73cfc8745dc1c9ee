// glu-tess: sweep-line polygon tessellator with the GLU callback interface
// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)

//! Decomposes arbitrary planar polygons into triangles.
//!
//! Contours may be concave, self-intersecting, overlapping or nested. A
//! [`WindingRule`] decides which regions are inside, and the result is
//! streamed to a [`TessHandler`] as triangle fans, strips and lists, or as
//! boundary loops.
//!
//! ```
//! use glu_tess::{tessellate, TessOptions, WindingRule};
//!
//! let outer = [0.0, 0.0, 3.0, 0.0, 3.0, 3.0, 0.0, 3.0];
//! let hole = [1.0, 1.0, 2.0, 1.0, 2.0, 2.0, 1.0, 2.0];
//! let options = TessOptions {
//!     winding_rule: WindingRule::Odd,
//!     ..TessOptions::default()
//! };
//! let out = tessellate(&[&outer[..], &hole[..]], &options).unwrap();
//! assert_eq!(out.triangle_count(), 8);
//! ```
//!
//! For streaming output and per-vertex client data, drive a [`Tessellator`]
//! directly with a handler of your own or a [`Callbacks`] registry.

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

pub mod bucketalloc;
pub mod callbacks;
pub mod dict;
pub mod error;
pub mod geom;
pub mod mesh;
pub mod priorityq;
mod render;
mod sweep;
pub mod tess;
mod triangulate;

pub use callbacks::{CallbackFn, Callbacks, PrimitiveKind, TessHandler};
pub use error::{Result, TessError};
pub use geom::Real;
pub use mesh::{EdgeId, FaceId, Mesh, VertId};
pub use tess::{
    tessellate, TessOptions, TessOutput, TessProperty, Tessellator, WindingRule, MAX_COORD,
};
