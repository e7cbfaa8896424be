//! Error types for the soil library.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while answering a soil query.
#[derive(Error, Debug)]
pub enum SoilError {
    /// Coordinates are outside the region of interest.
    #[error("Coordinates out of bounds: lat={lat}, lon={lon} (valid: lat ±90°, lon ±180°)")]
    OutOfBounds { lat: f64, lon: f64 },

    /// Bounding box corners are in the wrong order.
    #[error(
        "Invalid bbox: [{min_lon}, {min_lat}, {max_lon}, {max_lat}]. The first two values must be \
         the lower left corner and the last two values must be the upper right corner"
    )]
    InvalidBoundingBox {
        min_lon: f64,
        min_lat: f64,
        max_lon: f64,
        max_lat: f64,
    },

    /// Soil property code is not one of the known properties.
    #[error("Unknown soil property: {0}")]
    UnknownProperty(String),

    /// Depth label is not one of the known depth intervals.
    #[error("Unknown depth interval: {0}")]
    UnknownDepth(String),

    /// Statistic name is not one of the known statistics.
    #[error("Unknown statistic: {0}")]
    UnknownStatistic(String),

    /// Requested number of soil type probabilities is out of range.
    #[error("Invalid top_k: {top_k} (valid: 0 to {max})")]
    InvalidTopK { top_k: usize, max: usize },

    /// A query list (properties, depths or statistics) was empty.
    #[error("At least one {0} must be given")]
    EmptySelection(&'static str),

    /// The backing raster is missing or unreadable.
    #[error("Raster unavailable: {path}: {reason}")]
    RasterUnavailable { path: PathBuf, reason: String },

    /// A blocking raster read panicked or was cancelled.
    #[error("Raster read task failed: {0}")]
    Task(String),

    /// Required configuration is missing or malformed.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SoilError {
    /// Create a [`SoilError::RasterUnavailable`] for `path`.
    pub fn unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        SoilError::RasterUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error rejects the query itself, before any raster I/O.
    pub fn is_invalid_query(&self) -> bool {
        matches!(
            self,
            SoilError::OutOfBounds { .. }
                | SoilError::InvalidBoundingBox { .. }
                | SoilError::UnknownProperty(_)
                | SoilError::UnknownDepth(_)
                | SoilError::UnknownStatistic(_)
                | SoilError::InvalidTopK { .. }
                | SoilError::EmptySelection(_)
        )
    }
}

/// Result type alias using [`SoilError`].
pub type Result<T> = std::result::Result<T, SoilError>;
