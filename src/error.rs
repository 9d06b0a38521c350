//! Error types for measure projection.

use thiserror::Error;

/// Result type alias for measure projection operations.
pub type MeasureResult<T> = Result<T, MeasureError>;

/// Errors that can occur when building a centerline or projecting onto it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeasureError {
    /// A centerline, query point or query line is malformed.
    #[error("invalid geometry: {reason}")]
    InvalidGeometry {
        /// Description of what's wrong with the geometry.
        reason: String,
    },
}

impl MeasureError {
    /// Create an invalid geometry error.
    #[must_use]
    pub fn invalid_geometry(reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            reason: reason.into(),
        }
    }

    /// Create an error for a line with fewer than two vertices.
    #[must_use]
    pub fn too_few_vertices(actual: usize) -> Self {
        Self::invalid_geometry(format!("need at least 2 vertices, got {actual}"))
    }

    /// Create an error for a coordinate with an unsupported number of components.
    #[must_use]
    pub fn bad_arity(actual: usize) -> Self {
        Self::invalid_geometry(format!(
            "coordinates must have 2 or 3 components, got {actual}"
        ))
    }

    /// Check if this is an invalid geometry error.
    #[must_use]
    pub fn is_invalid_geometry(&self) -> bool {
        matches!(self, Self::InvalidGeometry { .. })
    }
}
