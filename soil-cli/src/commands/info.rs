use anyhow::{bail, Context, Result};
use serde::Serialize;
use soil::projection::unproject;
use soil::raster::{PixelWindow, RasterHandle, RasterInfo};
use std::collections::HashMap;
use std::path::Path;

use super::print_json;

/// Value statistics over a whole raster.
#[derive(Debug, Default, PartialEq, Serialize)]
struct ValueStats {
    cells: u64,
    no_data_cells: u64,
    distinct_values: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max: Option<i64>,
}

#[derive(Serialize)]
struct InfoResponse {
    #[serde(flatten)]
    info: RasterInfo,
    file_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<ValueStats>,
}

pub fn run(path: &Path, stats: bool, json: bool, pretty: bool) -> Result<()> {
    if !path.exists() {
        bail!("Raster not found: {}", path.display());
    }

    let mut raster = RasterHandle::open(path).context("Failed to open raster")?;
    let info = raster.info();
    let file_size = std::fs::metadata(path)?.len();

    let stats = if stats {
        let window = PixelWindow {
            col_off: 0,
            row_off: 0,
            width: info.width,
            height: info.height,
        };
        let counts = raster
            .count_window(&window)
            .context("Failed to read raster values")?;
        Some(value_stats(&counts, info.no_data))
    } else {
        None
    };

    if json {
        return print_json(
            &InfoResponse {
                info,
                file_size,
                stats,
            },
            pretty,
        );
    }

    let t = &info.transform;
    let (west, north) = t.pixel_to_world(0.0, 0.0);
    let (east, south) = t.pixel_to_world(f64::from(info.width), f64::from(info.height));

    // Display information
    println!("Raster: {}", info.path.display());
    println!();
    println!("Size: {}x{} cells ({})", info.width, info.height, info.sample_type);
    println!(
        "Chunks: {}x{} ({} total)",
        info.chunk_width, info.chunk_height, info.chunks
    );
    println!("Pixel size: {} x {}", t.a, t.e.abs());
    println!("Extent: x {} to {}, y {} to {}", west, east, south, north);

    // Homolosine extents are in meters; show them as lat/lon as well
    if t.a.abs() > 1.0 {
        if let (Some((lat_n, lon_w)), Some((lat_s, lon_e))) =
            (unproject(north, west), unproject(south, east))
        {
            println!(
                "Approx. coverage: lat {:.4} to {:.4}, lon {:.4} to {:.4}",
                lat_s, lat_n, lon_w, lon_e
            );
        }
    }

    match info.no_data {
        Some(value) => println!("No-data value: {}", value),
        None => println!("No-data value: none"),
    }
    println!("File size: {}", format_size(file_size));

    if let Some(stats) = stats {
        println!();
        if let (Some(min), Some(max)) = (stats.min, stats.max) {
            println!("Min value: {}", min);
            println!("Max value: {}", max);
        }
        println!("Distinct values: {}", stats.distinct_values);
        if stats.no_data_cells > 0 {
            let pct = (stats.no_data_cells as f64 / stats.cells as f64) * 100.0;
            println!("No-data cells: {} ({:.1}%)", stats.no_data_cells, pct);
        }
    }

    Ok(())
}

fn value_stats(counts: &HashMap<i64, u64>, no_data: Option<f64>) -> ValueStats {
    let is_no_data = |value: i64| no_data.is_some_and(|nd| value as f64 == nd);

    let mut stats = ValueStats::default();
    for (&value, &count) in counts {
        stats.cells += count;
        if is_no_data(value) {
            stats.no_data_cells += count;
            continue;
        }
        stats.distinct_values += 1;
        stats.min = Some(stats.min.map_or(value, |m| m.min(value)));
        stats.max = Some(stats.max.map_or(value, |m| m.max(value)));
    }
    stats
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
