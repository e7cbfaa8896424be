//! Integration tests for the HTTP API.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::Value;
use soil::projection::reproject;
use soil::{SoilService, SoilType};
use soil_service::{build_router, AppState};
use tempfile::TempDir;
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;

const LAT: f64 = 60.10;
const LON: f64 = 9.58;

/// Most probable codes over lon 8..12, lat 59..63 in 1° cells.
#[rustfmt::skip]
const MOST_PROBABLE: [u8; 16] = [
    23, 23, 12, 255,
    23, 14, 12, 12,
    14, 23, 99, 12,
    0,  0,  0,  0,
];

fn create_dir_for(path: &Path) -> File {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    File::create(path).unwrap()
}

/// Write a 4x4 Byte GeoTIFF over lon 8..12, lat 59..63.
fn write_classification(path: &Path, data: &[u8]) {
    let mut encoder = TiffEncoder::new(create_dir_for(path)).unwrap();
    let mut image = encoder.new_image::<colortype::Gray8>(4, 4).unwrap();
    image
        .encoder()
        .write_tag(Tag::ModelPixelScaleTag, &[1.0, 1.0, 0.0][..])
        .unwrap();
    image
        .encoder()
        .write_tag(Tag::ModelTiepointTag, &[0.0, 0.0, 0.0, 8.0, 63.0, 0.0][..])
        .unwrap();
    image.write_data(data).unwrap();
}

/// Write a 3x3 Int16 GeoTIFF in Homolosine meters centred on the query point.
fn write_property(root: &Path, name: &str, centre: i16) {
    let (y, x) = reproject(LAT, LON);
    let pixel = 250.0;
    let mut data = [1i16; 9];
    data[4] = centre;

    let path = root.join(format!("{}.tif", name));
    let mut encoder = TiffEncoder::new(create_dir_for(&path)).unwrap();
    let mut image = encoder.new_image::<colortype::GrayI16>(3, 3).unwrap();
    image
        .encoder()
        .write_tag(Tag::ModelPixelScaleTag, &[pixel, pixel, 0.0][..])
        .unwrap();
    image
        .encoder()
        .write_tag(
            Tag::ModelTiepointTag,
            &[0.0, 0.0, 0.0, x - 1.5 * pixel, y + 1.5 * pixel, 0.0][..],
        )
        .unwrap();
    image.encoder().write_tag(Tag::GdalNodata, "-32768").unwrap();
    image.write_data(&data[..]).unwrap();
}

/// Data directory with every classification raster and a few property rasters.
fn create_fixture() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let wrb = dir.path().join("wrb");

    write_classification(&wrb.join("MostProbable.tif"), &MOST_PROBABLE);
    for soil_type in SoilType::GROUPS {
        let probability = match soil_type {
            SoilType::Podzols => 70,
            SoilType::Histosols => 45,
            SoilType::Gleysols => 30,
            _ => 0,
        };
        write_classification(
            &wrb.join(format!("{}.tif", soil_type.name())),
            &[probability; 16],
        );
    }

    write_property(dir.path(), "bdod/bdod_0-5cm_mean", 123);
    write_property(dir.path(), "bdod/bdod_0-5cm_Q0.05", 101);
    write_property(dir.path(), "clay/clay_0-5cm_mean", 250);
    write_property(dir.path(), "cfvo/cfvo_0-5cm_mean", -32768);
    dir
}

fn create_test_server(data_dir: &Path) -> TestServer {
    let state = Arc::new(AppState {
        soil_service: SoilService::new(data_dir),
    });
    TestServer::new(build_router(state)).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let temp_dir = tempfile::tempdir().unwrap();
    let server = create_test_server(temp_dir.path());

    let response = server.get("/health").await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["status"], "healthy");
    assert!(json["version"].as_str().is_some());
}

#[tokio::test]
async fn test_ready_endpoint() {
    let fixture = create_fixture();
    let server = create_test_server(fixture.path());

    let response = server.get("/ready").await;
    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["status"], "ready");
}

#[tokio::test]
async fn test_ready_endpoint_without_rasters() {
    let temp_dir = tempfile::tempdir().unwrap();
    let server = create_test_server(temp_dir.path());

    let response = server.get("/ready").await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let json: Value = response.json();
    assert_eq!(json["status"], "unavailable");
    assert!(json["message"].as_str().unwrap().contains("MostProbable"));
}

#[tokio::test]
async fn test_soil_type_endpoint() {
    let fixture = create_fixture();
    let server = create_test_server(fixture.path());

    let response = server.get("/type?lat=60.1&lon=9.58").await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["type"], "Feature");
    assert_eq!(json["geometry"]["type"], "Point");
    assert_eq!(json["geometry"]["coordinates"][0], 9.58);
    assert_eq!(json["geometry"]["coordinates"][1], 60.1);
    assert_eq!(json["properties"]["most_probable_soil_type"], "Podzols");
    assert!(json["properties"].get("probabilities").is_none());
}

#[tokio::test]
async fn test_soil_type_endpoint_with_probabilities() {
    let fixture = create_fixture();
    let server = create_test_server(fixture.path());

    let response = server.get("/type?lat=60.1&lon=9.58&top_k=3").await;

    response.assert_status_ok();
    let json: Value = response.json();
    let probabilities = json["properties"]["probabilities"].as_array().unwrap();
    assert_eq!(probabilities.len(), 3);
    assert_eq!(probabilities[0]["soil_type"], "Podzols");
    assert_eq!(probabilities[0]["probability"], 70);
    assert_eq!(probabilities[1]["soil_type"], "Histosols");
    assert_eq!(probabilities[2]["soil_type"], "Gleysols");
}

#[tokio::test]
async fn test_soil_type_no_information() {
    let fixture = create_fixture();
    let server = create_test_server(fixture.path());

    let response = server.get("/type?lat=62.5&lon=11.5&top_k=5").await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(
        json["properties"]["most_probable_soil_type"],
        "No information available"
    );
    assert!(json["properties"].get("probabilities").is_none());
}

#[tokio::test]
async fn test_soil_type_out_of_bounds() {
    let fixture = create_fixture();
    let server = create_test_server(fixture.path());

    let response = server.get("/type?lat=91.0&lon=0.0").await;
    response.assert_status(StatusCode::NOT_FOUND);
    let json: Value = response.json();
    assert!(json["error"].as_str().unwrap().contains("out of bounds"));
}

#[tokio::test]
async fn test_soil_type_invalid_top_k() {
    let fixture = create_fixture();
    let server = create_test_server(fixture.path());

    let response = server.get("/type?lat=60.1&lon=9.58&top_k=31").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let json: Value = response.json();
    assert!(json["error"].as_str().unwrap().contains("top_k"));
}

#[tokio::test]
async fn test_soil_type_malformed_top_k() {
    let fixture = create_fixture();
    let server = create_test_server(fixture.path());

    for top_k in ["-1", "abc", "2.5"] {
        let response = server
            .get(&format!("/type?lat=60.1&lon=9.58&top_k={}", top_k))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let json: Value = response.json();
        assert!(json["error"].is_string(), "top_k={}", top_k);
    }
}

#[tokio::test]
async fn test_soil_type_missing_rasters() {
    let temp_dir = tempfile::tempdir().unwrap();
    let server = create_test_server(temp_dir.path());

    let response = server.get("/type?lat=60.1&lon=9.58").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_soil_type_missing_params() {
    let fixture = create_fixture();
    let server = create_test_server(fixture.path());

    let response = server.get("/type?lon=9.58").await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server.get("/type").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let json: Value = response.json();
    assert!(json["error"].as_str().unwrap().contains("lat"));
}

#[tokio::test]
async fn test_soil_property_endpoint() {
    let fixture = create_fixture();
    let server = create_test_server(fixture.path());

    let response = server
        .get("/property?lat=60.1&lon=9.58&depths=0-5cm&properties=bdod&values=mean")
        .await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["type"], "Feature");
    assert_eq!(json["geometry"]["coordinates"][0], 9.58);
    assert_eq!(json["geometry"]["coordinates"][1], 60.1);

    let layers = json["properties"]["layers"].as_array().unwrap();
    assert_eq!(layers.len(), 1);
    let layer = &layers[0];
    assert_eq!(layer["code"], "bdod");
    assert_eq!(layer["name"], "Bulk density");
    assert_eq!(layer["unit_measure"]["d_factor"], 100);
    assert_eq!(layer["unit_measure"]["mapped_units"], "cg/cm³");
    assert_eq!(layer["unit_measure"]["target_units"], "kg/dm³");

    let depth = &layer["depths"][0];
    assert_eq!(depth["label"], "0-5cm");
    assert_eq!(depth["range"]["top_depth"], 0);
    assert_eq!(depth["range"]["bottom_depth"], 5);
    assert_eq!(depth["values"]["mean"], 123);
}

#[tokio::test]
async fn test_soil_property_lists() {
    let fixture = create_fixture();
    let server = create_test_server(fixture.path());

    // Comma separated and repeated keys mix freely
    let response = server
        .get("/property?lat=60.1&lon=9.58&depths=0-5cm&properties=bdod,clay&properties=cfvo&values=mean&values=Q0.05")
        .await;

    response.assert_status_ok();
    let json: Value = response.json();
    let layers = json["properties"]["layers"].as_array().unwrap();

    // cfvo reads no-data and clay has no Q0.05 raster
    let codes: Vec<&str> = layers
        .iter()
        .map(|layer| layer["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["bdod", "clay"]);

    let bdod = &layers[0]["depths"][0]["values"];
    assert_eq!(bdod["mean"], 123);
    assert_eq!(bdod["Q0.05"], 101);

    let clay = &layers[1]["depths"][0]["values"];
    assert_eq!(clay["mean"], 250);
    assert!(clay.get("Q0.05").is_none());
}

#[tokio::test]
async fn test_soil_property_unknown_property() {
    let fixture = create_fixture();
    let server = create_test_server(fixture.path());

    let response = server
        .get("/property?lat=60.1&lon=9.58&depths=0-5cm&properties=gold&values=mean")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let json: Value = response.json();
    assert!(json["error"].as_str().unwrap().contains("gold"));
}

#[tokio::test]
async fn test_soil_property_missing_coordinate() {
    let fixture = create_fixture();
    let server = create_test_server(fixture.path());

    let response = server
        .get("/property?lon=9.58&depths=0-5cm&properties=bdod&values=mean")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let json: Value = response.json();
    assert!(json["error"].as_str().unwrap().contains("lat"));
}

#[tokio::test]
async fn test_soil_property_empty_selection() {
    let fixture = create_fixture();
    let server = create_test_server(fixture.path());

    let response = server
        .get("/property?lat=60.1&lon=9.58&properties=bdod&values=mean")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server.get("/property?lat=60.1&lon=9.58").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_soil_property_out_of_bounds() {
    let fixture = create_fixture();
    let server = create_test_server(fixture.path());

    let response = server
        .get("/property?lat=60.1&lon=181&depths=0-5cm&properties=bdod&values=mean")
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_soil_type_summary_endpoint() {
    let fixture = create_fixture();
    let server = create_test_server(fixture.path());

    let response = server
        .get("/type/summary?min_lon=8&min_lat=59&max_lon=12&max_lat=63")
        .await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["type"], "Feature");
    assert_eq!(json["geometry"]["type"], "Polygon");
    assert_eq!(json["geometry"]["coordinates"][0].as_array().unwrap().len(), 5);

    let summaries = json["properties"]["summaries"].as_array().unwrap();
    let total: u64 = summaries
        .iter()
        .map(|s| s["count"].as_u64().unwrap())
        .sum();
    assert_eq!(total, 16);
    assert_eq!(summaries[0]["soil_type"], "Acrisols");
    assert_eq!(summaries[0]["count"], 4);
}

#[tokio::test]
async fn test_soil_type_summary_inverted_bbox() {
    let fixture = create_fixture();
    let server = create_test_server(fixture.path());

    let response = server
        .get("/type/summary?min_lon=12&min_lat=59&max_lon=8&max_lat=63")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_openapi_document() {
    let temp_dir = tempfile::tempdir().unwrap();
    let server = create_test_server(temp_dir.path());

    let response = server.get("/api-docs/openapi.json").await;

    response.assert_status_ok();
    let json: Value = response.json();
    for path in ["/type", "/type/summary", "/property", "/health", "/ready"] {
        assert!(json["paths"].get(path).is_some(), "missing path {}", path);
    }
}
