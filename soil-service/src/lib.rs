//! Soil Service Library
//!
//! HTTP handlers, configuration and router for the soil lookup service.
//! This library is used by both the soil-service binary and integration tests.

pub mod config;
pub mod handlers;

use std::sync::Arc;

use axum::{routing::get, Router};
use soil::SoilService;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across handlers.
pub struct AppState {
    /// Soil service answering the queries.
    pub soil_service: SoilService,
}

/// OpenAPI documentation for the soil service.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Soil Service",
        version = "0.1.0",
        description = "REST API for soil type and soil property queries over SoilGrids rasters.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(
        handlers::get_soil_type,
        handlers::get_soil_property,
        handlers::get_soil_type_summary,
        handlers::health_check,
        handlers::ready,
    ),
    components(
        schemas(
            soil::feature::SoilTypeFeature,
            soil::feature::SoilPropertyFeature,
            soil::feature::SoilTypeSummaryFeature,
            handlers::ErrorResponse,
            handlers::HealthResponse,
            handlers::ReadyResponse,
        )
    ),
    tags(
        (name = "soil", description = "Soil type and soil property queries"),
        (name = "system", description = "System and health endpoints")
    )
)]
pub struct ApiDoc;

/// Build the application router with docs, tracing and CORS layers.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/type", get(handlers::get_soil_type))
        .route("/type/summary", get(handlers::get_soil_type_summary))
        .route("/property", get(handlers::get_soil_property))
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::ready))
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}

// Re-export commonly used types for convenience
pub use config::ServiceConfig;
pub use handlers::{
    ErrorResponse, HealthResponse, ReadyResponse, SoilTypeQuery, SoilTypeSummaryQuery,
};
