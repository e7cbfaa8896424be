//! Soil lookup service.
//!
//! This module provides [`SoilService`], a high-level interface that turns
//! coordinate queries into raster reads, fans them out over the blocking
//! pool and assembles the responses.
//!
//! ```ignore
//! use soil::{DepthInterval, SoilProperty, SoilServiceBuilder, Statistic};
//!
//! let service = SoilServiceBuilder::new("/data/soilgrids").build();
//!
//! let soil_type = service.get_soil_type(60.10, 9.58, 3).await?;
//! let layers = service
//!     .get_soil_property(
//!         60.10,
//!         9.58,
//!         &[DepthInterval::D0To5],
//!         &[SoilProperty::Bdod],
//!         &[Statistic::Mean],
//!     )
//!     .await?;
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::catalog::{most_probable_raster, property_raster, soil_type_raster};
use crate::classify::{
    rank_probabilities, summarize_counts, SoilType, SoilTypeInfo, SoilTypeSummaryInfo,
};
use crate::error::{Result, SoilError};
use crate::fanout::{run_blocking, run_concurrent};
use crate::layers::{assemble_layers, ExtractionResult, SoilLayerList};
use crate::projection::reproject;
use crate::property::{DepthInterval, SoilProperty, Statistic};
use crate::query::{unique, validate_top_k, BoundingBox, GeoPoint};
use crate::sampler::{RasterStore, ReadMode, DEFAULT_EXTENSION};

/// Answers soil type and soil property queries from a raster directory.
///
/// Cloning is cheap; clones share the same store.
///
/// # Example
///
/// ```ignore
/// use soil::SoilService;
///
/// let service = SoilService::new("/data/soilgrids");
/// let info = service.get_soil_type(60.10, 9.58, 0).await?;
/// println!("{}", info.most_probable_soil_type);
/// ```
#[derive(Debug, Clone)]
pub struct SoilService {
    store: Arc<RasterStore>,
}

impl SoilService {
    /// Create a service reading `.tif` rasters from `data_dir`.
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        SoilServiceBuilder::new(data_dir).build()
    }

    /// Create a builder for more configuration options.
    pub fn builder<P: AsRef<Path>>(data_dir: P) -> SoilServiceBuilder {
        SoilServiceBuilder::new(data_dir)
    }

    pub fn data_dir(&self) -> &Path {
        self.store.root()
    }

    pub fn store(&self) -> &RasterStore {
        &self.store
    }

    /// Classify the soil at a point.
    ///
    /// # Arguments
    ///
    /// * `lat` - Latitude in decimal degrees (-90 to 90)
    /// * `lon` - Longitude in decimal degrees (-180 to 180)
    /// * `top_k` - Number of soil type probabilities to return (0 to 30)
    ///
    /// # Returns
    ///
    /// The most probable soil type and, when `top_k > 0` and the location
    /// has a classification, the `top_k` most probable types with their
    /// probabilities in percent.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The coordinates or `top_k` are out of range
    /// - A classification raster cannot be read
    pub async fn get_soil_type(&self, lat: f64, lon: f64, top_k: usize) -> Result<SoilTypeInfo> {
        let top_k = validate_top_k(top_k)?;
        let point = GeoPoint::new(lat, lon)?;
        tracing::debug!(lat, lon, top_k, "Classifying soil type");

        let store = Arc::clone(&self.store);
        let code = run_blocking(move || {
            store.sample_point(
                &most_probable_raster(),
                point.lat(),
                point.lon(),
                ReadMode::Propagate,
            )
        })
        .await?;

        let most_probable = SoilType::from_code(code);
        if most_probable.is_no_information() || top_k == 0 {
            return Ok(SoilTypeInfo {
                most_probable_soil_type: most_probable,
                probabilities: None,
            });
        }

        // With a single slot only the winner's own probability is needed
        let candidates: Vec<SoilType> = if top_k == 1 {
            vec![most_probable]
        } else {
            SoilType::GROUPS.to_vec()
        };

        let ops: Vec<_> = candidates
            .iter()
            .map(|soil_type| {
                let store = Arc::clone(&self.store);
                let id = soil_type_raster(*soil_type);
                move || store.sample_point(&id, point.lat(), point.lon(), ReadMode::Propagate)
            })
            .collect();
        let probabilities = run_concurrent(ops).await?;

        Ok(SoilTypeInfo {
            most_probable_soil_type: most_probable,
            probabilities: rank_probabilities(
                candidates.into_iter().zip(probabilities).collect(),
                top_k,
            ),
        })
    }

    /// Read soil properties at a point.
    ///
    /// Every combination of the requested properties, depths and statistics
    /// is read concurrently. Duplicates in each list are ignored. A raster
    /// that cannot be read counts as no-data, so it never fails the query;
    /// properties without any value are left out of the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the coordinates are out of range or a list is
    /// empty.
    pub async fn get_soil_property(
        &self,
        lat: f64,
        lon: f64,
        depths: &[DepthInterval],
        properties: &[SoilProperty],
        statistics: &[Statistic],
    ) -> Result<SoilLayerList> {
        let point = GeoPoint::new(lat, lon)?;
        let properties = unique(properties, "property")?;
        let depths = unique(depths, "depth")?;
        let statistics = unique(statistics, "statistic")?;

        let (y, x) = reproject(point.lat(), point.lon());
        tracing::debug!(lat, lon, y, x, "Reading soil properties");

        let mut requests = Vec::with_capacity(properties.len() * depths.len() * statistics.len());
        for property in &properties {
            for depth in &depths {
                for statistic in &statistics {
                    requests.push((*property, *depth, *statistic));
                }
            }
        }

        let ops: Vec<_> = requests
            .iter()
            .map(|(property, depth, statistic)| {
                let store = Arc::clone(&self.store);
                let id = property_raster(*property, *depth, *statistic);
                move || store.sample_point(&id, y, x, ReadMode::Degrade)
            })
            .collect();
        let values = run_concurrent(ops).await?;

        let results: Vec<ExtractionResult> = requests
            .into_iter()
            .zip(values)
            .map(|((property, depth, statistic), value)| ExtractionResult {
                property,
                depth,
                statistic,
                value,
            })
            .collect();

        Ok(assemble_layers(&results))
    }

    /// Count the most probable soil types over a bounding box.
    ///
    /// # Errors
    ///
    /// Returns an error if the classification raster cannot be read.
    pub async fn get_soil_type_summary(&self, bbox: BoundingBox) -> Result<SoilTypeSummaryInfo> {
        tracing::debug!(?bbox, "Summarizing soil types");

        let store = Arc::clone(&self.store);
        let counts =
            run_blocking(move || store.aggregate_bbox(&most_probable_raster(), &bbox)).await?;
        Ok(summarize_counts(&counts))
    }

    /// Check that the classification raster can be opened.
    pub async fn check_ready(&self) -> Result<()> {
        let store = Arc::clone(&self.store);
        run_blocking(move || store.open(&most_probable_raster()).map(|_| ())).await
    }
}

/// Builder for configuring a [`SoilService`].
///
/// # Example
///
/// ```ignore
/// use soil::SoilServiceBuilder;
///
/// let service = SoilServiceBuilder::new("/data/soilgrids")
///     .raster_extension("vrt")
///     .build();
/// ```
pub struct SoilServiceBuilder {
    data_dir: PathBuf,
    raster_extension: String,
}

impl SoilServiceBuilder {
    /// Create a new builder with the specified data directory.
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            raster_extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Create a builder configured from environment variables.
    ///
    /// # Environment Variables
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `SOIL_DATA_DIR` | Directory containing the rasters | Required |
    /// | `SOIL_RASTER_EXTENSION` | Raster file extension | tif |
    ///
    /// # Errors
    ///
    /// Returns an error if `SOIL_DATA_DIR` is not set.
    pub fn from_env() -> Result<Self> {
        let data_dir = std::env::var("SOIL_DATA_DIR")
            .map_err(|_| SoilError::Config("SOIL_DATA_DIR environment variable not set".into()))?;

        let raster_extension = std::env::var("SOIL_RASTER_EXTENSION")
            .ok()
            .map(|ext| ext.trim_start_matches('.').to_string())
            .filter(|ext| !ext.is_empty())
            .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());

        Ok(Self {
            data_dir: PathBuf::from(data_dir),
            raster_extension,
        })
    }

    /// Set the data directory.
    ///
    /// Overrides the directory set in the constructor or from environment.
    pub fn data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_dir = path.as_ref().to_path_buf();
        self
    }

    /// Set the raster file extension. Default is `tif`.
    pub fn raster_extension(mut self, extension: impl Into<String>) -> Self {
        self.raster_extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    /// Build the [`SoilService`].
    pub fn build(self) -> SoilService {
        SoilService {
            store: Arc::new(RasterStore::new(self.data_dir, self.raster_extension)),
        }
    }
}
