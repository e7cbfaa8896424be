//! Soil properties, depth intervals and statistics.
//!
//! SoilGrids publishes one raster per (property, depth, statistic) triple.
//! All three axes are closed sets; their display metadata (names, units,
//! conversion factors, depth ranges) lives in the `match` arms below.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SoilError;

/// A soil property published by SoilGrids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum SoilProperty {
    Bdod,
    Cec,
    Cfvo,
    Clay,
    Nitrogen,
    Ocd,
    Ocs,
    Phh2o,
    Sand,
    Silt,
    Soc,
}

impl SoilProperty {
    /// All properties in publication order.
    pub const ALL: [SoilProperty; 11] = [
        SoilProperty::Bdod,
        SoilProperty::Cec,
        SoilProperty::Cfvo,
        SoilProperty::Clay,
        SoilProperty::Nitrogen,
        SoilProperty::Ocd,
        SoilProperty::Ocs,
        SoilProperty::Phh2o,
        SoilProperty::Sand,
        SoilProperty::Silt,
        SoilProperty::Soc,
    ];

    /// Short code, also the raster directory name (e.g. "bdod").
    pub fn code(&self) -> &'static str {
        match self {
            SoilProperty::Bdod => "bdod",
            SoilProperty::Cec => "cec",
            SoilProperty::Cfvo => "cfvo",
            SoilProperty::Clay => "clay",
            SoilProperty::Nitrogen => "nitrogen",
            SoilProperty::Ocd => "ocd",
            SoilProperty::Ocs => "ocs",
            SoilProperty::Phh2o => "phh2o",
            SoilProperty::Sand => "sand",
            SoilProperty::Silt => "silt",
            SoilProperty::Soc => "soc",
        }
    }

    /// Human readable property name.
    pub fn name(&self) -> &'static str {
        match self {
            SoilProperty::Bdod => "Bulk density",
            SoilProperty::Cec => "Cation exchange capacity (CEC pH 7)",
            SoilProperty::Cfvo => "Coarse fragments",
            SoilProperty::Clay => "Clay",
            SoilProperty::Nitrogen => "Nitrogen",
            SoilProperty::Ocd => "Organic carbon density",
            SoilProperty::Ocs => "Organic carbon stocks",
            SoilProperty::Phh2o => "pH water",
            SoilProperty::Sand => "Sand",
            SoilProperty::Silt => "Silt",
            SoilProperty::Soc => "Soil organic carbon",
        }
    }

    /// Unit of the raw values stored in the rasters.
    pub fn mapped_unit(&self) -> &'static str {
        match self {
            SoilProperty::Bdod => "cg/cm³",
            SoilProperty::Cec => "mmol(c)/kg",
            SoilProperty::Cfvo => "cm³/dm³",
            SoilProperty::Clay => "g/kg",
            SoilProperty::Nitrogen => "cg/kg",
            SoilProperty::Ocd => "hg/m³",
            SoilProperty::Ocs => "t/ha",
            SoilProperty::Phh2o => "pH*10",
            SoilProperty::Sand => "g/kg",
            SoilProperty::Silt => "g/kg",
            SoilProperty::Soc => "dg/kg",
        }
    }

    /// Conventional unit, reached by dividing raw values by [`Self::conversion_factor`].
    pub fn target_unit(&self) -> &'static str {
        match self {
            SoilProperty::Bdod => "kg/dm³",
            SoilProperty::Cec => "cmol(c)/kg",
            SoilProperty::Cfvo => "cm³/100cm³",
            SoilProperty::Clay => "%",
            SoilProperty::Nitrogen => "g/kg",
            SoilProperty::Ocd => "hg/m³",
            SoilProperty::Ocs => "kg/m²",
            SoilProperty::Phh2o => "pH",
            SoilProperty::Sand => "%",
            SoilProperty::Silt => "%",
            SoilProperty::Soc => "g/kg",
        }
    }

    /// Divisor from the mapped unit to the target unit.
    pub fn conversion_factor(&self) -> u32 {
        match self {
            SoilProperty::Bdod | SoilProperty::Nitrogen => 100,
            _ => 10,
        }
    }

    /// Whether rasters exist for this property at `depth`.
    ///
    /// Organic carbon stocks are only published for 0-30cm, and 0-30cm is
    /// only published for organic carbon stocks.
    pub fn supports_depth(&self, depth: DepthInterval) -> bool {
        (*self == SoilProperty::Ocs) == (depth == DepthInterval::D0To30)
    }
}

impl fmt::Display for SoilProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for SoilProperty {
    type Err = SoilError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SoilProperty::ALL
            .into_iter()
            .find(|p| p.code() == s)
            .ok_or_else(|| SoilError::UnknownProperty(s.to_string()))
    }
}

/// A standard depth interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum DepthInterval {
    #[serde(rename = "0-5cm")]
    D0To5,
    #[serde(rename = "5-15cm")]
    D5To15,
    #[serde(rename = "15-30cm")]
    D15To30,
    #[serde(rename = "30-60cm")]
    D30To60,
    #[serde(rename = "60-100cm")]
    D60To100,
    #[serde(rename = "100-200cm")]
    D100To200,
    #[serde(rename = "0-30cm")]
    D0To30,
}

impl DepthInterval {
    /// All depth intervals; the six standard layers first, then 0-30cm.
    pub const ALL: [DepthInterval; 7] = [
        DepthInterval::D0To5,
        DepthInterval::D5To15,
        DepthInterval::D15To30,
        DepthInterval::D30To60,
        DepthInterval::D60To100,
        DepthInterval::D100To200,
        DepthInterval::D0To30,
    ];

    /// Label used in raster names and responses (e.g. "0-5cm").
    pub fn label(&self) -> &'static str {
        match self {
            DepthInterval::D0To5 => "0-5cm",
            DepthInterval::D5To15 => "5-15cm",
            DepthInterval::D15To30 => "15-30cm",
            DepthInterval::D30To60 => "30-60cm",
            DepthInterval::D60To100 => "60-100cm",
            DepthInterval::D100To200 => "100-200cm",
            DepthInterval::D0To30 => "0-30cm",
        }
    }

    /// Top and bottom of the interval, in [`Self::unit`].
    pub fn bounds(&self) -> (u32, u32) {
        match self {
            DepthInterval::D0To5 => (0, 5),
            DepthInterval::D5To15 => (5, 15),
            DepthInterval::D15To30 => (15, 30),
            DepthInterval::D30To60 => (30, 60),
            DepthInterval::D60To100 => (60, 100),
            DepthInterval::D100To200 => (100, 200),
            DepthInterval::D0To30 => (0, 30),
        }
    }

    /// Unit of the depth bounds.
    pub fn unit(&self) -> &'static str {
        "cm"
    }
}

impl fmt::Display for DepthInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DepthInterval {
    type Err = SoilError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DepthInterval::ALL
            .into_iter()
            .find(|d| d.label() == s)
            .ok_or_else(|| SoilError::UnknownDepth(s.to_string()))
    }
}

/// Per-cell statistic of the SoilGrids prediction distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum Statistic {
    #[serde(rename = "mean")]
    Mean,
    #[serde(rename = "Q0.05")]
    Q05,
    #[serde(rename = "Q0.5")]
    Q50,
    #[serde(rename = "Q0.95")]
    Q95,
    #[serde(rename = "uncertainty")]
    Uncertainty,
}

impl Statistic {
    pub const ALL: [Statistic; 5] = [
        Statistic::Mean,
        Statistic::Q05,
        Statistic::Q50,
        Statistic::Q95,
        Statistic::Uncertainty,
    ];

    /// Name used in raster file names and responses (e.g. "Q0.05").
    pub fn as_str(&self) -> &'static str {
        match self {
            Statistic::Mean => "mean",
            Statistic::Q05 => "Q0.05",
            Statistic::Q50 => "Q0.5",
            Statistic::Q95 => "Q0.95",
            Statistic::Uncertainty => "uncertainty",
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Statistic {
    type Err = SoilError;

    /// Accepts both "Q0.05" and the query-string friendly "Q0_05".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.replace('_', ".");
        Statistic::ALL
            .into_iter()
            .find(|v| v.as_str() == normalized)
            .ok_or_else(|| SoilError::UnknownStatistic(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_parse() {
        assert_eq!("bdod".parse::<SoilProperty>().unwrap(), SoilProperty::Bdod);
        assert_eq!("phh2o".parse::<SoilProperty>().unwrap(), SoilProperty::Phh2o);
        assert!(matches!(
            "BDOD".parse::<SoilProperty>(),
            Err(SoilError::UnknownProperty(_))
        ));
    }

    #[test]
    fn test_property_metadata() {
        assert_eq!(SoilProperty::Bdod.name(), "Bulk density");
        assert_eq!(SoilProperty::Bdod.mapped_unit(), "cg/cm³");
        assert_eq!(SoilProperty::Bdod.target_unit(), "kg/dm³");
        assert_eq!(SoilProperty::Bdod.conversion_factor(), 100);
        assert_eq!(SoilProperty::Nitrogen.conversion_factor(), 100);
        assert_eq!(SoilProperty::Phh2o.conversion_factor(), 10);
        assert_eq!(SoilProperty::Soc.mapped_unit(), "dg/kg");
    }

    #[test]
    fn test_depth_compatibility() {
        assert!(SoilProperty::Ocs.supports_depth(DepthInterval::D0To30));
        assert!(!SoilProperty::Ocs.supports_depth(DepthInterval::D0To5));
        assert!(!SoilProperty::Clay.supports_depth(DepthInterval::D0To30));
        for depth in &DepthInterval::ALL[..6] {
            assert!(SoilProperty::Clay.supports_depth(*depth));
        }
    }

    #[test]
    fn test_depth_parse_and_bounds() {
        let depth: DepthInterval = "100-200cm".parse().unwrap();
        assert_eq!(depth, DepthInterval::D100To200);
        assert_eq!(depth.bounds(), (100, 200));
        assert_eq!(depth.unit(), "cm");
        assert!("0-5".parse::<DepthInterval>().is_err());
    }

    #[test]
    fn test_statistic_parse() {
        assert_eq!("Q0.05".parse::<Statistic>().unwrap(), Statistic::Q05);
        assert_eq!("Q0_95".parse::<Statistic>().unwrap(), Statistic::Q95);
        assert_eq!("mean".parse::<Statistic>().unwrap(), Statistic::Mean);
        assert!("median".parse::<Statistic>().is_err());
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&SoilProperty::Phh2o).unwrap(), "\"phh2o\"");
        assert_eq!(serde_json::to_string(&DepthInterval::D0To30).unwrap(), "\"0-30cm\"");
        assert_eq!(serde_json::to_string(&Statistic::Q50).unwrap(), "\"Q0.5\"");
    }
}
