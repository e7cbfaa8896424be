use std::fs::File;
use std::path::Path;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use soil::catalog::{most_probable_raster, property_raster};
use soil::projection::reproject;
use soil::raster::RasterHandle;
use soil::sampler::RasterStore;
use soil::{BoundingBox, DepthInterval, ReadMode, SoilProperty, SoilService, Statistic};
use tempfile::TempDir;
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;

const SIZE: u32 = 1024;
const ROWS_PER_STRIP: u32 = 16;

/// Write a striped Int16 GeoTIFF with a value gradient.
fn create_raster(path: &Path, origin: (f64, f64), pixel: f64) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let data: Vec<i16> = (0..SIZE * SIZE).map(|i| (i % 4000) as i16).collect();

    let mut encoder = TiffEncoder::new(File::create(path).unwrap()).unwrap();
    let mut image = encoder.new_image::<colortype::GrayI16>(SIZE, SIZE).unwrap();
    image
        .encoder()
        .write_tag(Tag::ModelPixelScaleTag, &[pixel, pixel, 0.0][..])
        .unwrap();
    image
        .encoder()
        .write_tag(Tag::ModelTiepointTag, &[0.0, 0.0, 0.0, origin.0, origin.1, 0.0][..])
        .unwrap();
    image.rows_per_strip(ROWS_PER_STRIP).unwrap();
    image.write_data(&data).unwrap();
}

/// Classification raster over lon 0..10.24, lat 50..60.24 and one bdod
/// raster centred on (55, 5).
fn create_store() -> TempDir {
    let tmp = TempDir::new().unwrap();
    create_raster(&tmp.path().join("wrb/MostProbable.tif"), (0.0, 60.24), 0.01);

    let (y, x) = reproject(55.0, 5.0);
    let half = f64::from(SIZE) * 250.0 / 2.0;
    for statistic in Statistic::ALL {
        let name = format!("bdod/bdod_0-5cm_{}.tif", statistic);
        create_raster(&tmp.path().join(name), (x - half, y + half), 250.0);
    }
    tmp
}

fn bench_open_and_sample(c: &mut Criterion) {
    let tmp = create_store();
    let path = tmp.path().join("wrb/MostProbable.tif");

    c.bench_function("open_and_sample", |b| {
        b.iter(|| {
            let mut raster = RasterHandle::open(black_box(&path)).unwrap();
            black_box(raster.sample(black_box(5.5), black_box(55.5)).unwrap());
        });
    });
}

fn bench_sample_point(c: &mut Criterion) {
    let tmp = create_store();
    let store = RasterStore::new(tmp.path(), "tif");
    let id = property_raster(SoilProperty::Bdod, DepthInterval::D0To5, Statistic::Mean);
    let (y, x) = reproject(55.0, 5.0);

    c.bench_function("sample_point_projected", |b| {
        b.iter(|| {
            black_box(
                store
                    .sample_point(&id, black_box(y), black_box(x), ReadMode::Propagate)
                    .unwrap(),
            );
        });
    });
}

fn bench_aggregate_bbox(c: &mut Criterion) {
    let tmp = create_store();
    let store = RasterStore::new(tmp.path(), "tif");
    let id = most_probable_raster();
    let bbox = BoundingBox::new(2.0, 52.0, 6.0, 56.0).unwrap();

    c.bench_function("aggregate_bbox_400x400", |b| {
        b.iter(|| {
            black_box(store.aggregate_bbox(&id, black_box(&bbox)).unwrap());
        });
    });
}

fn bench_soil_property_fanout(c: &mut Criterion) {
    let tmp = create_store();
    let service = SoilService::new(tmp.path());
    let runtime = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("soil_property_5_statistics", |b| {
        b.to_async(&runtime).iter(|| async {
            black_box(
                service
                    .get_soil_property(
                        55.0,
                        5.0,
                        &[DepthInterval::D0To5],
                        &[SoilProperty::Bdod],
                        &Statistic::ALL,
                    )
                    .await
                    .unwrap(),
            );
        });
    });
}

criterion_group!(
    benches,
    bench_open_and_sample,
    bench_sample_point,
    bench_aggregate_bbox,
    bench_soil_property_fanout,
);
criterion_main!(benches);
