//! Soil Service - HTTP microservice for soil type and soil property queries.
//!
//! A REST API over local SoilGrids rasters.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SOIL_DATA_DIR` | Directory containing the rasters | Required |
//! | `SOIL_RASTER_EXTENSION` | Raster file extension | tif |
//! | `SOIL_HOST` | Address to bind | 0.0.0.0 |
//! | `SOIL_PORT` | HTTP server port | 8080 |
//! | `SOIL_BLOCKING_THREADS` | Maximum concurrent raster reads | 64 |
//! | `RUST_LOG` | Log filter (e.g., "info", "debug") | "soil_service=info,soil=info,tower_http=info" |
//!
//! ## Endpoints
//!
//! - `GET /type?lat=X&lon=Y&top_k=N` - Soil type at coordinates
//! - `GET /property?lat=X&lon=Y&depths=..&properties=..&values=..` - Soil properties
//! - `GET /type/summary?min_lon=..&min_lat=..&max_lon=..&max_lat=..` - Soil types in a bbox
//! - `GET /health` - Liveness check
//! - `GET /ready` - Readiness check
//! - `GET /docs` - OpenAPI documentation (Swagger UI)

use std::sync::Arc;

use soil::SoilServiceBuilder;
use soil_service::{build_router, AppState, ServiceConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "soil_service=info,soil=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServiceConfig::from_env();

    // Raster reads run on the blocking pool, so its size caps read concurrency
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .max_blocking_threads(config.blocking_threads)
        .build()?;

    runtime.block_on(serve(config))
}

async fn serve(config: ServiceConfig) -> Result<(), Box<dyn std::error::Error>> {
    // The library handles SOIL_DATA_DIR and SOIL_RASTER_EXTENSION
    let soil_service = match SoilServiceBuilder::from_env() {
        Ok(builder) => builder.build(),
        Err(_) => {
            // Fallback: SOIL_DATA_DIR not set, use current directory
            tracing::warn!("SOIL_DATA_DIR not set, using current directory");
            SoilServiceBuilder::new(".").build()
        }
    };

    tracing::info!(
        data_dir = %soil_service.data_dir().display(),
        extension = soil_service.store().extension(),
        blocking_threads = config.blocking_threads,
        port = config.port,
        "Starting soil service"
    );

    if let Err(e) = soil_service.check_ready().await {
        tracing::warn!(error = %e, "Classification raster not readable yet");
    }

    let state = Arc::new(AppState { soil_service });
    let app = build_router(state);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
