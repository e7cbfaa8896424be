//! HTTP request handlers for the soil service.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use soil::feature::{SoilPropertyFeature, SoilTypeFeature, SoilTypeSummaryFeature};
use soil::{BoundingBox, DepthInterval, SoilError, SoilProperty, Statistic};
use utoipa::{IntoParams, ToSchema};

use crate::AppState;

/// Query parameters for the soil type endpoint.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SoilTypeQuery {
    /// Latitude in decimal degrees (-90 to 90).
    pub lat: f64,
    /// Longitude in decimal degrees (-180 to 180).
    pub lon: f64,
    /// Number of soil type probabilities to return (0 to 30).
    #[serde(default)]
    pub top_k: usize,
}

/// Query parameters for the soil type summary endpoint.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SoilTypeSummaryQuery {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Readiness response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadyResponse {
    /// "ready" or "unavailable".
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Get the soil type at a location.
///
/// # Returns
///
/// - `200 OK` with a GeoJSON feature on success
/// - `400 Bad Request` if a coordinate or `top_k` is missing, malformed or out of range
/// - `404 Not Found` if the location is out of bounds or a raster is missing
#[utoipa::path(
    get,
    path = "/type",
    tag = "soil",
    params(SoilTypeQuery),
    responses(
        (status = 200, description = "Soil type at the location", body = SoilTypeFeature),
        (status = 400, description = "Invalid query", body = ErrorResponse),
        (status = 404, description = "Location out of bounds or raster unavailable", body = ErrorResponse)
    )
)]
pub async fn get_soil_type(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SoilTypeQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return rejected_query(rejection),
    };
    tracing::debug!(lat = query.lat, lon = query.lon, top_k = query.top_k, "Soil type query");

    match state
        .soil_service
        .get_soil_type(query.lat, query.lon, query.top_k)
        .await
    {
        Ok(info) => {
            tracing::info!(
                lat = query.lat,
                lon = query.lon,
                soil_type = %info.most_probable_soil_type,
                "Soil type found"
            );
            (
                StatusCode::OK,
                Json(SoilTypeFeature::new(query.lat, query.lon, info)),
            )
                .into_response()
        }
        Err(e) => error_response("Soil type query failed", e),
    }
}

/// Get soil properties at a location.
///
/// `depths`, `properties` and `values` accept repeated keys
/// (`properties=clay&properties=sand`) and comma separated lists
/// (`properties=clay,sand`).
#[utoipa::path(
    get,
    path = "/property",
    tag = "soil",
    params(
        ("lat" = f64, Query, description = "Latitude in decimal degrees (-90 to 90)"),
        ("lon" = f64, Query, description = "Longitude in decimal degrees (-180 to 180)"),
        ("depths" = Vec<String>, Query, description = "Depth intervals, e.g. 0-5cm. 0-30cm is only available for ocs"),
        ("properties" = Vec<String>, Query, description = "Soil properties, e.g. bdod, clay, phh2o"),
        ("values" = Vec<String>, Query, description = "Statistics: mean, Q0.05, Q0.5, Q0.95, uncertainty")
    ),
    responses(
        (status = 200, description = "Soil properties at the location", body = SoilPropertyFeature),
        (status = 400, description = "Invalid query", body = ErrorResponse),
        (status = 404, description = "Location out of bounds", body = ErrorResponse)
    )
)]
pub async fn get_soil_property(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let (lat, lon) = match (coordinate(&params, "lat"), coordinate(&params, "lon")) {
        (Ok(lat), Ok(lon)) => (lat, lon),
        (Err(message), _) | (_, Err(message)) => return bad_request(message),
    };
    let (depths, properties, statistics) = match property_lists(&params) {
        Ok(lists) => lists,
        Err(e) => return error_response("Soil property query failed", e),
    };

    tracing::debug!(
        lat,
        lon,
        depths = depths.len(),
        properties = properties.len(),
        statistics = statistics.len(),
        "Soil property query"
    );

    match state
        .soil_service
        .get_soil_property(lat, lon, &depths, &properties, &statistics)
        .await
    {
        Ok(layers) => {
            tracing::info!(lat, lon, layers = layers.layers.len(), "Soil properties found");
            (StatusCode::OK, Json(SoilPropertyFeature::new(lat, lon, layers))).into_response()
        }
        Err(e) => error_response("Soil property query failed", e),
    }
}

/// Get a summary of the soil types inside a bounding box.
#[utoipa::path(
    get,
    path = "/type/summary",
    tag = "soil",
    params(SoilTypeSummaryQuery),
    responses(
        (status = 200, description = "Soil type counts, most frequent first", body = SoilTypeSummaryFeature),
        (status = 400, description = "Invalid bounding box", body = ErrorResponse),
        (status = 404, description = "Bounding box out of bounds or raster unavailable", body = ErrorResponse)
    )
)]
pub async fn get_soil_type_summary(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SoilTypeSummaryQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return rejected_query(rejection),
    };
    tracing::debug!(?query, "Soil type summary query");

    let bbox = match BoundingBox::new(query.min_lon, query.min_lat, query.max_lon, query.max_lat) {
        Ok(bbox) => bbox,
        Err(e) => return error_response("Soil type summary query failed", e),
    };

    match state.soil_service.get_soil_type_summary(bbox).await {
        Ok(summary) => {
            tracing::info!(types = summary.summaries.len(), "Soil type summary computed");
            (StatusCode::OK, Json(SoilTypeSummaryFeature::new(&bbox, summary))).into_response()
        }
        Err(e) => error_response("Soil type summary query failed", e),
    }
}

/// Health check endpoint.
///
/// Returns service status and version.
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses((status = 200, description = "Service is alive", body = HealthResponse))
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness endpoint: the classification raster must be readable.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "system",
    responses(
        (status = 200, description = "Service is ready", body = ReadyResponse),
        (status = 503, description = "Rasters are not available", body = ReadyResponse)
    )
)]
pub async fn ready(State(state): State<Arc<AppState>>) -> Response {
    match state.soil_service.check_ready().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ReadyResponse {
                status: "ready".to_string(),
                message: None,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadyResponse {
                    status: "unavailable".to_string(),
                    message: Some(e.to_string()),
                }),
            )
                .into_response()
        }
    }
}

/// HTTP status for a soil error.
pub fn status_for(e: &SoilError) -> StatusCode {
    match e {
        SoilError::OutOfBounds { .. } | SoilError::RasterUnavailable { .. } => {
            StatusCode::NOT_FOUND
        }
        e if e.is_invalid_query() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(context: &'static str, e: SoilError) -> Response {
    let status = status_for(&e);
    tracing::warn!(status = status.as_u16(), error = %e, "{}", context);
    (status, Json(ErrorResponse { error: e.to_string() })).into_response()
}

fn bad_request(message: String) -> Response {
    tracing::warn!(error = %message, "Rejected query");
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: message })).into_response()
}

/// Extractor failures get the same JSON body as every other invalid query.
fn rejected_query(rejection: QueryRejection) -> Response {
    bad_request(rejection.body_text())
}

fn coordinate(params: &[(String, String)], key: &str) -> Result<f64, String> {
    let value = params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.trim())
        .ok_or_else(|| format!("Missing query parameter: {}", key))?;
    value
        .parse()
        .map_err(|_| format!("Invalid query parameter {}: {}", key, value))
}

type PropertyLists = (Vec<DepthInterval>, Vec<SoilProperty>, Vec<Statistic>);

fn property_lists(params: &[(String, String)]) -> soil::Result<PropertyLists> {
    Ok((
        list(params, "depths")?,
        list(params, "properties")?,
        list(params, "values")?,
    ))
}

/// Collect every value of `key`, splitting comma separated lists.
fn list<T>(params: &[(String, String)], key: &str) -> soil::Result<Vec<T>>
where
    T: FromStr<Err = SoilError>,
{
    params
        .iter()
        .filter(|(k, _)| k == key)
        .flat_map(|(_, v)| v.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}
