//! # Soil - SoilGrids Lookup Library
//!
//! Soil classification and soil property lookups from local SoilGrids
//! rasters.
//!
//! ## Features
//!
//! - **Point queries**: most probable WRB soil type with ranked probabilities,
//!   and soil property statistics per depth interval
//! - **Bounding-box summaries**: soil type counts over a region
//! - **Concurrent reads**: every raster read of a query runs on the tokio
//!   blocking pool at once
//! - **Memory-mapped I/O**: only the strips or tiles a read touches are decoded
//!
//! ## Quick Start
//!
//! ```ignore
//! use soil::{DepthInterval, SoilProperty, SoilService, Statistic};
//!
//! let service = SoilService::new("/data/soilgrids");
//!
//! let soil_type = service.get_soil_type(60.10, 9.58, 3).await?;
//! println!("Most probable: {}", soil_type.most_probable_soil_type);
//!
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
//!
//! ## Raster Layout
//!
//! ```text
//! <data dir>/bdod/bdod_0-5cm_mean.tif      soil properties (Homolosine)
//! <data dir>/wrb/MostProbable.tif          soil type codes (WGS84)
//! <data dir>/wrb/Podzols.tif               soil type probabilities (WGS84)
//! ```
//!
//! Raw values keep SoilGrids' mapped units. No-data cells read as -32768 or
//! 65535; reads without a raster behind them return -99999.
//!
//! ## Data Sources
//!
//! Download SoilGrids data from:
//! - <https://files.isric.org/soilgrids/latest/data/>

pub mod catalog;
pub mod classify;
pub mod error;
pub mod fanout;
pub mod layers;
pub mod projection;
pub mod property;
pub mod query;
pub mod raster;
pub mod sampler;
pub mod service;

#[cfg(feature = "geojson")]
pub mod feature;

// Re-export main types at crate root for convenience
pub use classify::{
    SoilType, SoilTypeInfo, SoilTypeProbability, SoilTypeSummary, SoilTypeSummaryInfo,
};
pub use error::{Result, SoilError};
pub use layers::{SoilDepth, SoilLayer, SoilLayerList, SoilPropertyValues};
pub use property::{DepthInterval, SoilProperty, Statistic};
pub use query::{BoundingBox, GeoPoint, MAX_TOP_K};
pub use sampler::{ReadMode, NOT_APPLICABLE, NO_DATA};
pub use service::{SoilService, SoilServiceBuilder};
