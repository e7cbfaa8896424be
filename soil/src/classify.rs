//! WRB soil type classification.
//!
//! The classification raster stores the code of the most probable WRB
//! reference soil group per cell. One probability raster per group holds the
//! probability (in percent) of that group.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sampler::{NOT_APPLICABLE, NO_DATA, NO_DATA_UNSIGNED};

/// Classification value meaning "no information available".
pub const NO_INFORMATION_CODE: i64 = 255;

/// WRB reference soil group, or the "no information" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum SoilType {
    Acrisols,
    Albeluvisols,
    Alisols,
    Andosols,
    Arenosols,
    Calcisols,
    Cambisols,
    Chernozems,
    Cryosols,
    Durisols,
    Ferralsols,
    Fluvisols,
    Gleysols,
    Gypsisols,
    Histosols,
    Kastanozems,
    Leptosols,
    Lixisols,
    Luvisols,
    Nitisols,
    Phaeozems,
    Planosols,
    Plinthosols,
    Podzols,
    Regosols,
    Solonchaks,
    Solonetz,
    Stagnosols,
    Umbrisols,
    Vertisols,
    #[serde(rename = "No information available")]
    NoInformation,
}

impl SoilType {
    /// The 30 reference groups, indexed by their raster code.
    pub const GROUPS: [SoilType; 30] = [
        SoilType::Acrisols,
        SoilType::Albeluvisols,
        SoilType::Alisols,
        SoilType::Andosols,
        SoilType::Arenosols,
        SoilType::Calcisols,
        SoilType::Cambisols,
        SoilType::Chernozems,
        SoilType::Cryosols,
        SoilType::Durisols,
        SoilType::Ferralsols,
        SoilType::Fluvisols,
        SoilType::Gleysols,
        SoilType::Gypsisols,
        SoilType::Histosols,
        SoilType::Kastanozems,
        SoilType::Leptosols,
        SoilType::Lixisols,
        SoilType::Luvisols,
        SoilType::Nitisols,
        SoilType::Phaeozems,
        SoilType::Planosols,
        SoilType::Plinthosols,
        SoilType::Podzols,
        SoilType::Regosols,
        SoilType::Solonchaks,
        SoilType::Solonetz,
        SoilType::Stagnosols,
        SoilType::Umbrisols,
        SoilType::Vertisols,
    ];

    /// Map a classification raster value to a soil type.
    ///
    /// Total: 255 and every value without a group map to
    /// [`SoilType::NoInformation`].
    pub fn from_code(code: i64) -> Self {
        usize::try_from(code)
            .ok()
            .and_then(|idx| Self::GROUPS.get(idx).copied())
            .unwrap_or(SoilType::NoInformation)
    }

    /// Raster code of this soil type.
    pub fn code(&self) -> i64 {
        Self::GROUPS
            .iter()
            .position(|group| group == self)
            .map(|idx| idx as i64)
            .unwrap_or(NO_INFORMATION_CODE)
    }

    /// Display name; also the file stem of the group's probability raster.
    pub fn name(&self) -> &'static str {
        match self {
            SoilType::Acrisols => "Acrisols",
            SoilType::Albeluvisols => "Albeluvisols",
            SoilType::Alisols => "Alisols",
            SoilType::Andosols => "Andosols",
            SoilType::Arenosols => "Arenosols",
            SoilType::Calcisols => "Calcisols",
            SoilType::Cambisols => "Cambisols",
            SoilType::Chernozems => "Chernozems",
            SoilType::Cryosols => "Cryosols",
            SoilType::Durisols => "Durisols",
            SoilType::Ferralsols => "Ferralsols",
            SoilType::Fluvisols => "Fluvisols",
            SoilType::Gleysols => "Gleysols",
            SoilType::Gypsisols => "Gypsisols",
            SoilType::Histosols => "Histosols",
            SoilType::Kastanozems => "Kastanozems",
            SoilType::Leptosols => "Leptosols",
            SoilType::Lixisols => "Lixisols",
            SoilType::Luvisols => "Luvisols",
            SoilType::Nitisols => "Nitisols",
            SoilType::Phaeozems => "Phaeozems",
            SoilType::Planosols => "Planosols",
            SoilType::Plinthosols => "Plinthosols",
            SoilType::Podzols => "Podzols",
            SoilType::Regosols => "Regosols",
            SoilType::Solonchaks => "Solonchaks",
            SoilType::Solonetz => "Solonetz",
            SoilType::Stagnosols => "Stagnosols",
            SoilType::Umbrisols => "Umbrisols",
            SoilType::Vertisols => "Vertisols",
            SoilType::NoInformation => "No information available",
        }
    }

    pub fn is_no_information(&self) -> bool {
        *self == SoilType::NoInformation
    }
}

impl fmt::Display for SoilType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Probability of one soil type at a point, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SoilTypeProbability {
    pub soil_type: SoilType,
    pub probability: i64,
}

/// Soil type classification of a single point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SoilTypeInfo {
    pub most_probable_soil_type: SoilType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probabilities: Option<Vec<SoilTypeProbability>>,
}

/// Number of cells of one soil type inside a bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SoilTypeSummary {
    pub soil_type: SoilType,
    pub count: u64,
}

/// Soil type distribution over a bounding box, most frequent first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SoilTypeSummaryInfo {
    pub summaries: Vec<SoilTypeSummary>,
}

/// Whether a probability raster value is a real, non-zero probability.
fn is_probability(value: i64) -> bool {
    value != 0 && value != NO_DATA && value != NO_DATA_UNSIGNED && value != NOT_APPLICABLE
}

/// Rank sampled probabilities and keep the `top_k` highest.
///
/// Zero probabilities and no-data values are dropped. The sort is stable, so
/// ties keep the order of `candidates`. Returns `None` when nothing is left.
///
/// # Example
///
/// ```
/// use soil::classify::{rank_probabilities, SoilType};
///
/// let ranked = rank_probabilities(
///     vec![
///         (SoilType::Acrisols, 70),
///         (SoilType::Albeluvisols, 0),
///         (SoilType::Alisols, 45),
///         (SoilType::Andosols, 30),
///     ],
///     2,
/// )
/// .unwrap();
/// assert_eq!(ranked[0].soil_type, SoilType::Acrisols);
/// assert_eq!(ranked[1].soil_type, SoilType::Alisols);
/// ```
pub fn rank_probabilities(
    candidates: Vec<(SoilType, i64)>,
    top_k: usize,
) -> Option<Vec<SoilTypeProbability>> {
    let mut ranked: Vec<SoilTypeProbability> = candidates
        .into_iter()
        .filter(|(_, probability)| is_probability(*probability))
        .map(|(soil_type, probability)| SoilTypeProbability {
            soil_type,
            probability,
        })
        .collect();

    ranked.sort_by(|a, b| b.probability.cmp(&a.probability));
    ranked.truncate(top_k);

    (!ranked.is_empty()).then_some(ranked)
}

/// Turn raw classification value counts into a per-type summary.
///
/// Values are mapped with [`SoilType::from_code`] and counts of values that
/// map to the same type are merged. Sorted by count descending; ties follow
/// the enumeration order.
pub fn summarize_counts(counts: &HashMap<i64, u64>) -> SoilTypeSummaryInfo {
    let mut merged: HashMap<SoilType, u64> = HashMap::new();
    for (code, count) in counts {
        *merged.entry(SoilType::from_code(*code)).or_default() += count;
    }

    let mut summaries: Vec<SoilTypeSummary> = merged
        .into_iter()
        .map(|(soil_type, count)| SoilTypeSummary { soil_type, count })
        .collect();
    summaries.sort_by(|a, b| b.count.cmp(&a.count).then(a.soil_type.cmp(&b.soil_type)));

    SoilTypeSummaryInfo { summaries }
}
