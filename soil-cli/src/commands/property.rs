use anyhow::{Context, Result};
use soil::feature::SoilPropertyFeature;
use soil::{DepthInterval, SoilProperty, SoilService, Statistic};

use super::print_json;

pub async fn run(
    service: &SoilService,
    lat: f64,
    lon: f64,
    depths: &[DepthInterval],
    properties: &[SoilProperty],
    statistics: &[Statistic],
    pretty: bool,
) -> Result<()> {
    let layers = service
        .get_soil_property(lat, lon, depths, properties, statistics)
        .await
        .context("Failed to get soil properties")?;

    if layers.layers.is_empty() {
        eprintln!("No data for the requested properties at {}, {}", lat, lon);
    }

    print_json(&SoilPropertyFeature::new(lat, lon, layers), pretty)
}
