// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)

use thiserror::Error;

/// Result type for tessellator operations.
pub type Result<T> = std::result::Result<T, TessError>;

/// Errors reported by the tessellator.
///
/// Every error raised by a [`Tessellator`](crate::Tessellator) is also passed
/// to [`TessHandler::error`](crate::TessHandler::error) before the call that
/// detected it returns.
#[derive(Error, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TessError {
    #[error("begin_polygon must be called first")]
    MissingBeginPolygon,

    #[error("begin_contour must be called first")]
    MissingBeginContour,

    #[error("end_polygon must be called first")]
    MissingEndPolygon,

    #[error("end_contour must be called first")]
    MissingEndContour,

    #[error("coordinate is too large or not finite")]
    CoordTooLarge,

    #[error("edges intersect but no combine callback supplied a vertex")]
    NeedCombineCallback,

    /// Raised by [`tessellate`](crate::tessellate) before any work is done.
    #[error("vertex size must be 2 or 3, got {0}")]
    InvalidVertexSize(usize),
}
