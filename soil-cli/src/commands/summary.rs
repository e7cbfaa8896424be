use anyhow::{bail, Context, Result};
use soil::feature::SoilTypeSummaryFeature;
use soil::{BoundingBox, SoilService};

use super::print_json;

pub async fn run(service: &SoilService, bbox: &str, pretty: bool) -> Result<()> {
    let bbox = parse_bbox(bbox)?;

    let summary = service
        .get_soil_type_summary(bbox)
        .await
        .context("Failed to summarize soil types")?;

    print_json(&SoilTypeSummaryFeature::new(&bbox, summary), pretty)
}

/// Parse `min_lon,min_lat,max_lon,max_lat`.
fn parse_bbox(text: &str) -> Result<BoundingBox> {
    let values = text
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .with_context(|| format!("Invalid bounding box coordinate: {}", part.trim()))
        })
        .collect::<Result<Vec<_>>>()?;

    let [min_lon, min_lat, max_lon, max_lat] = values[..] else {
        bail!(
            "Bounding box needs 4 values (min_lon,min_lat,max_lon,max_lat), got {}",
            values.len()
        );
    };

    Ok(BoundingBox::new(min_lon, min_lat, max_lon, max_lat)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bbox() {
        let bbox = parse_bbox("9.0, 60.0, 10.5, 61.0").unwrap();
        assert_eq!(bbox.min_lon(), 9.0);
        assert_eq!(bbox.min_lat(), 60.0);
        assert_eq!(bbox.max_lon(), 10.5);
        assert_eq!(bbox.max_lat(), 61.0);
    }

    #[test]
    fn test_parse_bbox_errors() {
        assert!(parse_bbox("9,60,10").is_err());
        assert!(parse_bbox("9,60,10,north").is_err());
        // Inverted longitudes
        assert!(parse_bbox("10,60,9,61").is_err());
        assert!(parse_bbox("0,0,200,10").is_err());
    }
}
