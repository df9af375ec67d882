//! Errors surfaced to the user from annotation operations.

use crate::geometry::MIN_POLYGON_POINTS;
use thiserror::Error;

/// Validation failures returned to the caller for user notification.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnnotationError {
    #[error("A polygon needs at least {min} points, got {found}", min = MIN_POLYGON_POINTS)]
    InsufficientPoints { found: usize },

    #[error("Coordinate ({longitude}, {latitude}) is not a finite number")]
    InvalidCoordinate { longitude: f64, latitude: f64 },
}

/// Result type for annotation operations.
pub type AnnotationResult<T> = Result<T, AnnotationError>;
