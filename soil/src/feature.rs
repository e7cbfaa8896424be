//! GeoJSON `Feature` envelopes for query responses.
//!
//! Enable the `geojson` feature to use this module. Point queries are wrapped
//! with a `Point` geometry at `[lon, lat]`, bounding-box queries with the
//! closed `Polygon` ring of the box.
//!
//! # Example
//!
//! ```ignore
//! use soil::feature::SoilTypeFeature;
//!
//! let info = service.get_soil_type(60.10, 9.58, 3).await?;
//! let feature = SoilTypeFeature::new(60.10, 9.58, info);
//! println!("{}", serde_json::to_string(&feature)?);
//! // {"type":"Feature","geometry":{"type":"Point","coordinates":[9.58,60.1]},"properties":{...}}
//! ```

use geojson::{Geometry, Value as GeoJsonValue};
use serde::{Deserialize, Serialize};

use crate::classify::{SoilTypeInfo, SoilTypeSummaryInfo};
use crate::layers::SoilLayerList;
use crate::query::BoundingBox;

/// GeoJSON object type of every envelope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum FeatureType {
    #[default]
    Feature,
}

/// Point geometry in GeoJSON axis order.
pub fn point_geometry(lat: f64, lon: f64) -> Geometry {
    Geometry::new(GeoJsonValue::Point(vec![lon, lat]))
}

/// Closed polygon ring of a bounding box, counter-clockwise from the lower
/// left corner.
pub fn bbox_geometry(bbox: &BoundingBox) -> Geometry {
    let corners = bbox.corners();
    let ring: Vec<Vec<f64>> = corners
        .iter()
        .chain(corners.first())
        .map(|(lat, lon)| vec![*lon, *lat])
        .collect();
    Geometry::new(GeoJsonValue::Polygon(vec![ring]))
}

/// Soil type at a point.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SoilTypeFeature {
    #[serde(rename = "type")]
    pub kind: FeatureType,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub geometry: Geometry,
    pub properties: SoilTypeInfo,
}

impl SoilTypeFeature {
    pub fn new(lat: f64, lon: f64, properties: SoilTypeInfo) -> Self {
        Self {
            kind: FeatureType::Feature,
            geometry: point_geometry(lat, lon),
            properties,
        }
    }
}

/// Soil properties at a point.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SoilPropertyFeature {
    #[serde(rename = "type")]
    pub kind: FeatureType,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub geometry: Geometry,
    pub properties: SoilLayerList,
}

impl SoilPropertyFeature {
    pub fn new(lat: f64, lon: f64, properties: SoilLayerList) -> Self {
        Self {
            kind: FeatureType::Feature,
            geometry: point_geometry(lat, lon),
            properties,
        }
    }
}

/// Soil type distribution over a bounding box.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SoilTypeSummaryFeature {
    #[serde(rename = "type")]
    pub kind: FeatureType,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub geometry: Geometry,
    pub properties: SoilTypeSummaryInfo,
}

impl SoilTypeSummaryFeature {
    pub fn new(bbox: &BoundingBox, properties: SoilTypeSummaryInfo) -> Self {
        Self {
            kind: FeatureType::Feature,
            geometry: bbox_geometry(bbox),
            properties,
        }
    }
}
