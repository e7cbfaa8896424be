use anyhow::Result;
use clap::{Parser, Subcommand};
use soil::{DepthInterval, SoilProperty, Statistic};
use std::path::PathBuf;

mod commands;

/// SoilGrids soil type and soil property CLI tool
#[derive(Parser)]
#[command(name = "soil")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory containing the SoilGrids rasters
    #[arg(short, long, env = "SOIL_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Raster file extension
    #[arg(
        short,
        long,
        env = "SOIL_RASTER_EXTENSION",
        default_value = "tif",
        global = true
    )]
    extension: String,

    /// Pretty-print JSON output
    #[arg(short, long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query the soil type at a coordinate
    Type {
        /// Latitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Number of soil type probabilities to report (0 to 30)
        #[arg(short, long, default_value = "0")]
        top_k: usize,
    },

    /// Query soil properties at a coordinate
    Property {
        /// Latitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Depth intervals (e.g., 0-5cm,5-15cm)
        #[arg(long = "depth", value_delimiter = ',', required = true)]
        depths: Vec<DepthInterval>,

        /// Soil properties (e.g., bdod,clay,phh2o)
        #[arg(long = "property", value_delimiter = ',', required = true)]
        properties: Vec<SoilProperty>,

        /// Statistics (mean, Q0.05, Q0.5, Q0.95, uncertainty)
        #[arg(
            long = "value",
            value_delimiter = ',',
            default_value = "mean"
        )]
        statistics: Vec<Statistic>,
    },

    /// Summarize the soil types inside a bounding box
    Summary {
        /// Bounding box as min_lon,min_lat,max_lon,max_lat
        #[arg(long, allow_hyphen_values = true)]
        bbox: String,
    },

    /// Display information about a raster file
    Info {
        /// Path to a GeoTIFF raster
        path: PathBuf,

        /// Count every value in the raster (reads the whole file)
        #[arg(long)]
        stats: bool,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Type { lat, lon, top_k } => {
            let service = commands::service(cli.data_dir, &cli.extension)?;
            commands::soil_type::run(&service, lat, lon, top_k, cli.pretty).await
        }
        Commands::Property {
            lat,
            lon,
            depths,
            properties,
            statistics,
        } => {
            let service = commands::service(cli.data_dir, &cli.extension)?;
            commands::property::run(
                &service,
                lat,
                lon,
                &depths,
                &properties,
                &statistics,
                cli.pretty,
            )
            .await
        }
        Commands::Summary { bbox } => {
            let service = commands::service(cli.data_dir, &cli.extension)?;
            commands::summary::run(&service, &bbox, cli.pretty).await
        }
        Commands::Info { path, stats, json } => commands::info::run(&path, stats, json, cli.pretty),
    }
}
