//! Raster naming.
//!
//! This module maps queries onto raster identifiers relative to the data
//! directory. Identifiers carry no extension; the store appends it.
//!
//! # Layout
//!
//! - Properties: `{property}/{property}_{depth}_{statistic}` (e.g. `bdod/bdod_0-5cm_mean`)
//! - Classification: `wrb/MostProbable`
//! - Soil type probabilities: `wrb/{TypeName}` (e.g. `wrb/Podzols`)
//!
//! Property rasters are in Homolosine meters, the `wrb` rasters in WGS84
//! degrees.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::classify::SoilType;
use crate::property::{DepthInterval, SoilProperty, Statistic};

/// File stem of the most-probable soil type raster.
const MOST_PROBABLE: &str = "MostProbable";

/// Directory holding the classification rasters.
const WRB_DIR: &str = "wrb";

/// Coordinate reference system a raster family is stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RasterFamily {
    /// Soil property rasters (Interrupted Goode Homolosine).
    Property,
    /// WRB classification and probability rasters (WGS84).
    Classification,
}

impl RasterFamily {
    /// Whether lat/lon must go through [`crate::projection::reproject`]
    /// before reading a raster of this family.
    pub fn needs_reprojection(&self) -> bool {
        matches!(self, RasterFamily::Property)
    }
}

/// Location of one raster, relative to the data directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RasterId {
    /// A raster that exists in the store.
    Path {
        family: RasterFamily,
        name: String,
    },
    /// A (property, depth) combination that is never published.
    NotApplicable,
}

impl RasterId {
    /// Resolve to a file path under `root` with the given extension.
    ///
    /// Returns `None` for [`RasterId::NotApplicable`].
    pub fn resolve(&self, root: &Path, extension: &str) -> Option<PathBuf> {
        match self {
            RasterId::Path { name, .. } => Some(root.join(format!("{}.{}", name, extension))),
            RasterId::NotApplicable => None,
        }
    }

    pub fn family(&self) -> Option<RasterFamily> {
        match self {
            RasterId::Path { family, .. } => Some(*family),
            RasterId::NotApplicable => None,
        }
    }
}

impl fmt::Display for RasterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RasterId::Path { name, .. } => f.write_str(name),
            RasterId::NotApplicable => f.write_str("not applicable"),
        }
    }
}

/// Raster holding one statistic of a property at one depth.
///
/// # Examples
///
/// ```
/// use soil::catalog::{property_raster, RasterId};
/// use soil::{DepthInterval, SoilProperty, Statistic};
///
/// let id = property_raster(SoilProperty::Bdod, DepthInterval::D0To5, Statistic::Mean);
/// assert_eq!(id.to_string(), "bdod/bdod_0-5cm_mean");
///
/// let id = property_raster(SoilProperty::Clay, DepthInterval::D0To30, Statistic::Mean);
/// assert_eq!(id, RasterId::NotApplicable);
/// ```
pub fn property_raster(
    property: SoilProperty,
    depth: DepthInterval,
    statistic: Statistic,
) -> RasterId {
    if !property.supports_depth(depth) {
        return RasterId::NotApplicable;
    }
    RasterId::Path {
        family: RasterFamily::Property,
        name: format!(
            "{code}/{code}_{depth}_{statistic}",
            code = property.code(),
            depth = depth.label(),
            statistic = statistic.as_str()
        ),
    }
}

/// Raster holding the most probable soil type code.
pub fn most_probable_raster() -> RasterId {
    RasterId::Path {
        family: RasterFamily::Classification,
        name: format!("{}/{}", WRB_DIR, MOST_PROBABLE),
    }
}

/// Raster holding the probability of one soil type.
///
/// Returns [`RasterId::NotApplicable`] for [`SoilType::NoInformation`],
/// which has no probability layer.
pub fn soil_type_raster(soil_type: SoilType) -> RasterId {
    if soil_type.is_no_information() {
        return RasterId::NotApplicable;
    }
    RasterId::Path {
        family: RasterFamily::Classification,
        name: format!("{}/{}", WRB_DIR, soil_type.name()),
    }
}
