//! Soil property response assembly.
//!
//! Raw extraction results are grouped per property and depth, no-data values
//! are dropped and the remaining values are annotated with the property's
//! unit metadata. Values are kept in their mapped units; see
//! [`SoilLayer::converted`] for the conventional units.

use serde::{Deserialize, Serialize};

use crate::property::{DepthInterval, SoilProperty, Statistic};
use crate::sampler::is_no_data;

/// One raw value read for a (property, depth, statistic) triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionResult {
    pub property: SoilProperty,
    pub depth: DepthInterval,
    pub statistic: Statistic,
    pub value: i64,
}

/// Statistic values grouped per depth, in request order.
pub type DepthValues = Vec<(DepthInterval, Vec<(Statistic, i64)>)>;

/// Unit metadata of a property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UnitMeasure {
    /// Divisor from mapped to target units.
    pub d_factor: u32,
    pub mapped_units: String,
    pub target_units: String,
    pub uncertainty_unit: String,
}

impl UnitMeasure {
    pub fn for_property(property: SoilProperty) -> Self {
        Self {
            d_factor: property.conversion_factor(),
            mapped_units: property.mapped_unit().to_string(),
            target_units: property.target_unit().to_string(),
            uncertainty_unit: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DepthRange {
    pub top_depth: u32,
    pub bottom_depth: u32,
    pub unit_depth: String,
}

impl From<DepthInterval> for DepthRange {
    fn from(depth: DepthInterval) -> Self {
        let (top_depth, bottom_depth) = depth.bounds();
        Self {
            top_depth,
            bottom_depth,
            unit_depth: depth.unit().to_string(),
        }
    }
}

/// Values of the requested statistics at one depth. Statistics that were
/// not requested, or read as no-data, are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SoilPropertyValues {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean: Option<i64>,
    #[serde(rename = "Q0.05", default, skip_serializing_if = "Option::is_none")]
    pub q05: Option<i64>,
    #[serde(rename = "Q0.5", default, skip_serializing_if = "Option::is_none")]
    pub q50: Option<i64>,
    #[serde(rename = "Q0.95", default, skip_serializing_if = "Option::is_none")]
    pub q95: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uncertainty: Option<i64>,
}

impl SoilPropertyValues {
    fn slot(&mut self, statistic: Statistic) -> &mut Option<i64> {
        match statistic {
            Statistic::Mean => &mut self.mean,
            Statistic::Q05 => &mut self.q05,
            Statistic::Q50 => &mut self.q50,
            Statistic::Q95 => &mut self.q95,
            Statistic::Uncertainty => &mut self.uncertainty,
        }
    }

    pub fn set(&mut self, statistic: Statistic, value: i64) {
        *self.slot(statistic) = Some(value);
    }

    pub fn get(&self, statistic: Statistic) -> Option<i64> {
        match statistic {
            Statistic::Mean => self.mean,
            Statistic::Q05 => self.q05,
            Statistic::Q50 => self.q50,
            Statistic::Q95 => self.q95,
            Statistic::Uncertainty => self.uncertainty,
        }
    }

    pub fn is_empty(&self) -> bool {
        Statistic::ALL.iter().all(|s| self.get(*s).is_none())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SoilDepth {
    pub range: DepthRange,
    pub label: DepthInterval,
    pub values: SoilPropertyValues,
}

/// All surviving depths of one property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SoilLayer {
    pub code: SoilProperty,
    pub name: String,
    pub unit_measure: UnitMeasure,
    pub depths: Vec<SoilDepth>,
}

impl SoilLayer {
    /// Convert a raw value of this layer to its target units.
    ///
    /// Uncertainty values have no unit and are not meant to go through this.
    pub fn converted(&self, value: i64) -> f64 {
        value as f64 / f64::from(self.unit_measure.d_factor)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SoilLayerList {
    pub layers: Vec<SoilLayer>,
}

/// Group flat results by property, then depth, then statistic.
///
/// Every level keeps the order in which its keys first appear.
pub fn group_results(results: &[ExtractionResult]) -> Vec<(SoilProperty, DepthValues)> {
    let mut grouped: Vec<(SoilProperty, DepthValues)> = Vec::new();

    for result in results {
        let property_idx = match grouped.iter().position(|(p, _)| *p == result.property) {
            Some(idx) => idx,
            None => {
                grouped.push((result.property, Vec::new()));
                grouped.len() - 1
            }
        };
        let depths = &mut grouped[property_idx].1;

        let depth_idx = match depths.iter().position(|(d, _)| *d == result.depth) {
            Some(idx) => idx,
            None => {
                depths.push((result.depth, Vec::new()));
                depths.len() - 1
            }
        };
        depths[depth_idx].1.push((result.statistic, result.value));
    }

    grouped
}

/// Build the layer of one property.
///
/// No-data values are dropped per statistic, depths left without any value
/// are dropped, and a property left without any depth yields `None`.
pub fn assemble(
    property: SoilProperty,
    grouped: &[(DepthInterval, Vec<(Statistic, i64)>)],
) -> Option<SoilLayer> {
    let depths: Vec<SoilDepth> = grouped
        .iter()
        .filter_map(|(depth, statistics)| {
            let mut values = SoilPropertyValues::default();
            for (statistic, value) in statistics {
                if !is_no_data(*value) {
                    values.set(*statistic, *value);
                }
            }
            (!values.is_empty()).then(|| SoilDepth {
                range: DepthRange::from(*depth),
                label: *depth,
                values,
            })
        })
        .collect();

    if depths.is_empty() {
        return None;
    }

    Some(SoilLayer {
        code: property,
        name: property.name().to_string(),
        unit_measure: UnitMeasure::for_property(property),
        depths,
    })
}

/// Group and assemble every property, leaving out empty layers.
pub fn assemble_layers(results: &[ExtractionResult]) -> SoilLayerList {
    let layers = group_results(results)
        .into_iter()
        .filter_map(|(property, depths)| assemble(property, &depths))
        .collect();
    SoilLayerList { layers }
}
