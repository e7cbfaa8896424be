pub mod info;
pub mod property;
pub mod soil_type;
pub mod summary;

use anyhow::{Context, Result};
use serde::Serialize;
use soil::{SoilService, SoilServiceBuilder};
use std::path::PathBuf;

/// Build the query service from `--data-dir`, falling back to `SOIL_DATA_DIR`.
pub fn service(data_dir: Option<PathBuf>, extension: &str) -> Result<SoilService> {
    let builder = match data_dir {
        Some(dir) => SoilServiceBuilder::new(dir),
        None => SoilServiceBuilder::from_env().context(
            "SOIL_DATA_DIR environment variable not set. Use --data-dir or set SOIL_DATA_DIR",
        )?,
    };

    Ok(builder.raster_extension(extension).build())
}

/// Print a value as JSON on stdout.
pub fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", text);
    Ok(())
}
