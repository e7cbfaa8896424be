use anyhow::{Context, Result};
use soil::feature::SoilTypeFeature;
use soil::SoilService;

use super::print_json;

pub async fn run(
    service: &SoilService,
    lat: f64,
    lon: f64,
    top_k: usize,
    pretty: bool,
) -> Result<()> {
    let info = service
        .get_soil_type(lat, lon, top_k)
        .await
        .context("Failed to get soil type")?;

    print_json(&SoilTypeFeature::new(lat, lon, info), pretty)
}
