//! Point sampling and bounding-box aggregation over the raster store.
//!
//! Every call opens its raster, reads and drops the handle. There is no
//! handle cache; repeated reads of hot rasters are served by the page cache.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::catalog::RasterId;
use crate::error::{Result, SoilError};
use crate::projection::reproject;
use crate::query::BoundingBox;
use crate::raster::RasterHandle;

/// SoilGrids no-data value for signed rasters.
pub const NO_DATA: i64 = -32768;

/// SoilGrids no-data value for unsigned 16-bit rasters.
pub const NO_DATA_UNSIGNED: i64 = 65535;

/// Returned for reads that have no raster behind them: incompatible
/// (property, depth) pairs and points outside the raster extent.
pub const NOT_APPLICABLE: i64 = -99999;

/// Default raster file extension.
pub const DEFAULT_EXTENSION: &str = "tif";

/// Whether a raw value is one of the no-data sentinels.
pub fn is_no_data(value: i64) -> bool {
    value == NO_DATA || value == NO_DATA_UNSIGNED || value == NOT_APPLICABLE
}

/// What a point read does when its raster cannot be opened or decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadMode {
    /// Return the error.
    #[default]
    Propagate,
    /// Log a warning and return [`NO_DATA`].
    Degrade,
}

/// Directory of rasters laid out as described in [`crate::catalog`].
#[derive(Debug, Clone)]
pub struct RasterStore {
    root: PathBuf,
    extension: String,
}

impl RasterStore {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// File backing `id`, or `None` for [`RasterId::NotApplicable`].
    pub fn path_for(&self, id: &RasterId) -> Option<PathBuf> {
        id.resolve(&self.root, &self.extension)
    }

    /// Open the raster behind `id`.
    ///
    /// # Errors
    ///
    /// Returns [`SoilError::RasterUnavailable`] if the raster cannot be
    /// opened, including for [`RasterId::NotApplicable`].
    pub fn open(&self, id: &RasterId) -> Result<RasterHandle> {
        match self.path_for(id) {
            Some(path) => RasterHandle::open(path),
            None => Err(SoilError::unavailable(
                self.root.clone(),
                format!("no raster for {}", id),
            )),
        }
    }

    /// Read the raw value at `(y, x)` in the raster's own coordinates.
    ///
    /// # Arguments
    ///
    /// * `id` - Raster to read
    /// * `y`, `x` - Latitude/longitude for WGS84 rasters, projected meters otherwise
    /// * `mode` - Failure handling, see [`ReadMode`]
    ///
    /// # Returns
    ///
    /// The raw cell value; [`NOT_APPLICABLE`] without any I/O for
    /// [`RasterId::NotApplicable`], and for points outside the raster.
    pub fn sample_point(&self, id: &RasterId, y: f64, x: f64, mode: ReadMode) -> Result<i64> {
        let Some(path) = self.path_for(id) else {
            return Ok(NOT_APPLICABLE);
        };

        let read = RasterHandle::open(&path).and_then(|mut raster| raster.sample(x, y));
        match (read, mode) {
            (Ok(value), _) => Ok(value.unwrap_or(NOT_APPLICABLE)),
            (Err(e), ReadMode::Propagate) => Err(e),
            (Err(e), ReadMode::Degrade) => {
                tracing::warn!(raster = %id, error = %e, "Raster read failed, returning no-data");
                Ok(NO_DATA)
            }
        }
    }

    /// Count raw values over every cell intersecting `bbox`.
    ///
    /// No-data values are counted like any other. Rasters of a projected
    /// family are windowed on the projected corners of the box.
    ///
    /// # Errors
    ///
    /// Returns [`SoilError::RasterUnavailable`] if the raster cannot be read.
    pub fn aggregate_bbox(&self, id: &RasterId, bbox: &BoundingBox) -> Result<HashMap<i64, u64>> {
        let mut raster = self.open(id)?;

        let projected = id.family().is_some_and(|f| f.needs_reprojection());
        let corners = bbox.corners().map(|(lat, lon)| {
            if projected {
                let (y, x) = reproject(lat, lon);
                (x, y)
            } else {
                (lon, lat)
            }
        });
        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for (x, y) in corners {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }

        let Some(window) = raster.window(min_x, min_y, max_x, max_y) else {
            return Err(SoilError::unavailable(raster.path(), "degenerate geotransform"));
        };
        tracing::debug!(raster = %id, cells = window.cells(), "Aggregating window");
        raster.count_window(&window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{most_probable_raster, property_raster};
    use crate::property::{DepthInterval, SoilProperty, Statistic};
    use crate::raster::tests::{write_i16, write_u8};
    use tempfile::TempDir;

    /// 4x4 classification raster covering lon 8..12, lat 59..63 in 1° cells.
    fn classification_store() -> (TempDir, RasterStore) {
        let dir = tempfile::tempdir().unwrap();
        #[rustfmt::skip]
        let data = [
            23, 23, 12, 255,
            23, 14, 12, 12,
            14, 14, 99, 12,
            0,  0,  0,  0,
        ];
        write_u8(
            &dir.path().join("wrb/MostProbable.tif"),
            4,
            4,
            (8.0, 63.0),
            1.0,
            &data,
        );
        let store = RasterStore::new(dir.path(), DEFAULT_EXTENSION);
        (dir, store)
    }

    #[test]
    fn test_not_applicable_skips_io() {
        let store = RasterStore::new("/nonexistent", "tif");
        let id = property_raster(SoilProperty::Ocs, DepthInterval::D0To5, Statistic::Mean);
        assert_eq!(
            store.sample_point(&id, 0.0, 0.0, ReadMode::Propagate).unwrap(),
            NOT_APPLICABLE
        );
    }

    #[test]
    fn test_sample_classification() {
        let (_dir, store) = classification_store();
        let id = most_probable_raster();
        assert_eq!(store.sample_point(&id, 62.5, 8.5, ReadMode::Propagate).unwrap(), 23);
        assert_eq!(store.sample_point(&id, 61.5, 9.5, ReadMode::Propagate).unwrap(), 14);
        assert_eq!(store.sample_point(&id, 62.5, 11.5, ReadMode::Propagate).unwrap(), 255);
    }

    #[test]
    fn test_sample_outside_extent() {
        let (_dir, store) = classification_store();
        let id = most_probable_raster();
        assert_eq!(
            store.sample_point(&id, 0.0, 0.0, ReadMode::Propagate).unwrap(),
            NOT_APPLICABLE
        );
    }

    #[test]
    fn test_missing_raster_modes() {
        let dir = tempfile::tempdir().unwrap();
        let store = RasterStore::new(dir.path(), "tif");
        let id = property_raster(SoilProperty::Bdod, DepthInterval::D0To5, Statistic::Mean);

        let err = store.sample_point(&id, 0.0, 0.0, ReadMode::Propagate).unwrap_err();
        assert!(matches!(err, SoilError::RasterUnavailable { .. }));

        assert_eq!(
            store.sample_point(&id, 0.0, 0.0, ReadMode::Degrade).unwrap(),
            NO_DATA
        );
    }

    #[test]
    fn test_extension_is_applied() {
        let dir = tempfile::tempdir().unwrap();
        write_i16(
            &dir.path().join("bdod/bdod_0-5cm_mean.tiff"),
            2,
            2,
            (0.0, 2.0),
            1.0,
            &[1, 2, 3, 4],
            None,
        );
        let id = property_raster(SoilProperty::Bdod, DepthInterval::D0To5, Statistic::Mean);

        let tif = RasterStore::new(dir.path(), "tif");
        assert!(tif.sample_point(&id, 1.5, 0.5, ReadMode::Propagate).is_err());

        let tiff = RasterStore::new(dir.path(), "tiff");
        assert_eq!(tiff.sample_point(&id, 1.5, 0.5, ReadMode::Propagate).unwrap(), 1);
    }

    #[test]
    fn test_aggregate_bbox() {
        let (_dir, store) = classification_store();
        let id = most_probable_raster();

        let bbox = BoundingBox::new(8.0, 61.0, 10.0, 63.0).unwrap();
        let counts = store.aggregate_bbox(&id, &bbox).unwrap();
        assert_eq!(counts, HashMap::from([(23, 3), (14, 1)]));

        let all = BoundingBox::new(8.0, 59.0, 12.0, 63.0).unwrap();
        let counts = store.aggregate_bbox(&id, &all).unwrap();
        assert_eq!(counts.values().sum::<u64>(), 16);
        assert_eq!(counts.get(&255), Some(&1));
        assert_eq!(counts.get(&99), Some(&1));
        assert_eq!(counts.get(&0), Some(&4));
    }

    #[test]
    fn test_aggregate_partial_cells() {
        let (_dir, store) = classification_store();
        let id = most_probable_raster();

        // Touches columns 0..=1 and rows 0..=1
        let bbox = BoundingBox::new(8.5, 61.5, 9.5, 62.5).unwrap();
        let counts = store.aggregate_bbox(&id, &bbox).unwrap();
        assert_eq!(counts, HashMap::from([(23, 3), (14, 1)]));
    }

    #[test]
    fn test_aggregate_projected_raster() {
        let dir = tempfile::tempdir().unwrap();
        // 9x9 Homolosine raster of 250 m cells centred on the point
        let (y, x) = reproject(60.1, 9.58);
        let mut data = [1i16; 81];
        data[40] = 7;
        write_i16(
            &dir.path().join("bdod/bdod_0-5cm_mean.tif"),
            9,
            9,
            (x - 4.5 * 250.0, y + 4.5 * 250.0),
            250.0,
            &data,
            None,
        );
        let store = RasterStore::new(dir.path(), DEFAULT_EXTENSION);
        let id = property_raster(SoilProperty::Bdod, DepthInterval::D0To5, Statistic::Mean);

        // A few meters around the point stay inside the centre cell
        let bbox = BoundingBox::new(9.5799, 60.0999, 9.5801, 60.1001).unwrap();
        let counts = store.aggregate_bbox(&id, &bbox).unwrap();
        assert_eq!(counts, HashMap::from([(7, 1)]));

        // About 300 m east-west and 190 m north-south: the 3x3 block around the centre
        let bbox = BoundingBox::new(9.576, 60.098, 9.584, 60.102).unwrap();
        let counts = store.aggregate_bbox(&id, &bbox).unwrap();
        assert_eq!(counts.get(&7), Some(&1));
        assert_eq!(counts.get(&1), Some(&8));
    }

    #[test]
    fn test_aggregate_missing_raster() {
        let dir = tempfile::tempdir().unwrap();
        let store = RasterStore::new(dir.path(), "tif");
        let bbox = BoundingBox::new(9.0, 60.0, 10.0, 61.0).unwrap();
        let err = store.aggregate_bbox(&most_probable_raster(), &bbox).unwrap_err();
        assert!(matches!(err, SoilError::RasterUnavailable { .. }));
    }

    #[test]
    fn test_is_no_data() {
        assert!(is_no_data(-32768));
        assert!(is_no_data(65535));
        assert!(is_no_data(-99999));
        assert!(!is_no_data(0));
        assert!(!is_no_data(255));
    }
}
