//! Basic example demonstrating soil library usage.
//!
//! Run with: cargo run --example basic -- /path/to/soilgrids

use soil::{DepthInterval, SoilError, SoilProperty, SoilService, Statistic};
use std::env;

#[tokio::main]
async fn main() -> Result<(), SoilError> {
    // Get data directory from command line
    let data_dir = env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: cargo run --example basic -- /path/to/soilgrids");
        std::process::exit(1);
    });

    let service = SoilService::new(&data_dir);

    let locations = [
        ("Hedmark, Norway", 60.10, 9.58),
        ("Mato Grosso, Brazil", -12.64, -55.42),
        ("Iowa, USA", 42.03, -93.47),
    ];

    println!("Soil type queries:");
    println!("{:-<50}", "");

    for (name, lat, lon) in &locations {
        match service.get_soil_type(*lat, *lon, 3).await {
            Ok(info) => {
                println!("{}: {}", name, info.most_probable_soil_type);
                for p in info.probabilities.unwrap_or_default() {
                    println!("    {:<14} {:>3}%", p.soil_type.name(), p.probability);
                }
            }
            Err(SoilError::RasterUnavailable { path, .. }) => {
                println!("{}: raster not available locally ({})", name, path.display());
            }
            Err(e) => {
                println!("{}: error - {}", name, e);
            }
        }
    }

    println!("\nTopsoil properties:");
    println!("{:-<50}", "");

    let properties = [SoilProperty::Clay, SoilProperty::Sand, SoilProperty::Phh2o];
    for (name, lat, lon) in &locations {
        let list = service
            .get_soil_property(*lat, *lon, &[DepthInterval::D0To5], &properties, &[Statistic::Mean])
            .await?;
        println!("{}:", name);
        for layer in &list.layers {
            for depth in &layer.depths {
                if let Some(mean) = depth.values.mean {
                    println!(
                        "    {:<6} {:>8.2} {}",
                        layer.code,
                        layer.converted(mean),
                        layer.unit_measure.target_units
                    );
                }
            }
        }
    }

    Ok(())
}
