//! Query validation.
//!
//! Everything here runs before any raster is touched; failures are
//! [`SoilError::is_invalid_query`] errors.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SoilError};

/// Highest accepted `top_k`: the number of WRB reference groups.
pub const MAX_TOP_K: usize = 30;

/// A validated WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    lat: f64,
    lon: f64,
}

impl GeoPoint {
    /// # Errors
    ///
    /// Returns [`SoilError::OutOfBounds`] unless lat is within ±90° and lon
    /// within ±180°.
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(SoilError::OutOfBounds { lat, lon });
        }
        Ok(Self { lat, lon })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }
}

/// A validated WGS84 bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    min_lon: f64,
    min_lat: f64,
    max_lon: f64,
    max_lat: f64,
}

impl BoundingBox {
    /// Build a bounding box from its lower left and upper right corners.
    ///
    /// Corners are never swapped: a box given in the wrong order is
    /// rejected.
    ///
    /// # Errors
    ///
    /// - [`SoilError::InvalidBoundingBox`] if `min_lon > max_lon` or `min_lat > max_lat`
    /// - [`SoilError::OutOfBounds`] if a corner is outside the valid range
    ///
    /// # Examples
    ///
    /// ```
    /// use soil::BoundingBox;
    ///
    /// assert!(BoundingBox::new(9.0, 60.0, 10.0, 61.0).is_ok());
    /// assert!(BoundingBox::new(10.0, 60.0, 9.0, 61.0).is_err());
    /// ```
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Result<Self> {
        if !(min_lon <= max_lon && min_lat <= max_lat) {
            return Err(SoilError::InvalidBoundingBox {
                min_lon,
                min_lat,
                max_lon,
                max_lat,
            });
        }
        GeoPoint::new(min_lat, min_lon)?;
        GeoPoint::new(max_lat, max_lon)?;
        Ok(Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        })
    }

    pub fn min_lon(&self) -> f64 {
        self.min_lon
    }

    pub fn min_lat(&self) -> f64 {
        self.min_lat
    }

    pub fn max_lon(&self) -> f64 {
        self.max_lon
    }

    pub fn max_lat(&self) -> f64 {
        self.max_lat
    }

    /// The four corners as `(lat, lon)`, counter-clockwise from lower left.
    pub fn corners(&self) -> [(f64, f64); 4] {
        [
            (self.min_lat, self.min_lon),
            (self.min_lat, self.max_lon),
            (self.max_lat, self.max_lon),
            (self.max_lat, self.min_lon),
        ]
    }
}

/// Check `top_k` against [`MAX_TOP_K`].
pub fn validate_top_k(top_k: usize) -> Result<usize> {
    if top_k > MAX_TOP_K {
        return Err(SoilError::InvalidTopK {
            top_k,
            max: MAX_TOP_K,
        });
    }
    Ok(top_k)
}

/// Collapse duplicates, keeping the first occurrence of each item.
///
/// # Errors
///
/// Returns [`SoilError::EmptySelection`] naming `what` if `items` is empty.
pub fn unique<T: PartialEq + Copy>(items: &[T], what: &'static str) -> Result<Vec<T>> {
    if items.is_empty() {
        return Err(SoilError::EmptySelection(what));
    }
    let mut seen = Vec::with_capacity(items.len());
    for item in items {
        if !seen.contains(item) {
            seen.push(*item);
        }
    }
    Ok(seen)
}
