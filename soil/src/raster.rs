//! Single-band GeoTIFF access.
//!
//! This module provides the [`RasterHandle`] struct for reading individual
//! cells and pixel windows out of a georeferenced TIFF. The file is memory
//! mapped and only the strips or tiles a read touches are decoded.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use serde::Serialize;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;
use tiff::ColorType;

use crate::error::{Result, SoilError};
use crate::sampler::NO_DATA;

/// Slack used when snapping window edges onto the pixel grid.
const EDGE_EPSILON: f64 = 1e-9;

/// Affine transform from pixel space to world coordinates.
///
/// `x = c + a * col + b * row` and `y = f + d * col + e * row`, in the same
/// layout GDAL uses (without the reordering).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl GeoTransform {
    /// Build a north-up transform from `ModelPixelScale` and `ModelTiepoint`.
    pub fn from_scale_and_tiepoint(scale: &[f64], tiepoint: &[f64]) -> Option<Self> {
        if scale.len() < 2 || tiepoint.len() < 6 {
            return None;
        }
        let (sx, sy) = (scale[0], scale[1]);
        let (i, j, x, y) = (tiepoint[0], tiepoint[1], tiepoint[3], tiepoint[4]);
        Some(Self {
            a: sx,
            b: 0.0,
            c: x - i * sx,
            d: 0.0,
            e: -sy,
            f: y + j * sy,
        })
    }

    /// Build a transform from a 4x4 row-major `ModelTransformation` matrix.
    pub fn from_matrix(matrix: &[f64]) -> Option<Self> {
        if matrix.len() < 8 {
            return None;
        }
        Some(Self {
            a: matrix[0],
            b: matrix[1],
            c: matrix[3],
            d: matrix[4],
            e: matrix[5],
            f: matrix[7],
        })
    }

    /// World coordinates of a (fractional) pixel position.
    pub fn pixel_to_world(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.c + self.a * col + self.b * row,
            self.f + self.d * col + self.e * row,
        )
    }

    /// Fractional pixel position of a world coordinate.
    ///
    /// Returns `None` for a degenerate transform.
    pub fn world_to_pixel(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let det = self.a * self.e - self.b * self.d;
        if det.abs() < f64::EPSILON {
            return None;
        }
        let dx = x - self.c;
        let dy = y - self.f;
        let col = (self.e * dx - self.b * dy) / det;
        let row = (self.a * dy - self.d * dx) / det;
        Some((col, row))
    }
}

/// A rectangular block of cells, `[col_off, col_off + width)` by
/// `[row_off, row_off + height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelWindow {
    pub col_off: u32,
    pub row_off: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelWindow {
    /// Number of cells covered.
    pub fn cells(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Static description of a raster, as reported by `soil info`.
#[derive(Debug, Clone, Serialize)]
pub struct RasterInfo {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub chunk_width: u32,
    pub chunk_height: u32,
    pub chunks: u32,
    pub sample_type: String,
    pub transform: GeoTransform,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_data: Option<f64>,
}

/// An opened, memory-mapped GeoTIFF.
///
/// Handles are short lived: open, read, drop. Nothing is cached between
/// reads beyond what the operating system keeps in its page cache.
///
/// # Example
///
/// ```ignore
/// use soil::raster::RasterHandle;
///
/// let mut raster = RasterHandle::open("/data/wrb/MostProbable.tif")?;
/// let code = raster.sample(9.58, 60.10)?;
/// ```
pub struct RasterHandle {
    path: PathBuf,
    decoder: Decoder<Cursor<Mmap>>,
    width: u32,
    height: u32,
    chunk_width: u32,
    chunk_height: u32,
    color_type: ColorType,
    transform: GeoTransform,
    no_data: Option<f64>,
}

impl RasterHandle {
    /// Open a GeoTIFF and read its layout and georeferencing.
    ///
    /// # Errors
    ///
    /// Returns [`SoilError::RasterUnavailable`] if:
    /// - The file cannot be opened or memory-mapped
    /// - The file is not a TIFF or has more than one band
    /// - The file carries no georeferencing tags
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| SoilError::unavailable(&path, e))?;

        // SAFETY: Memory mapping is safe as long as the file is not modified
        // while mapped. We open the file read-only and don't expose the mapping.
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| SoilError::unavailable(&path, e))?;

        let mut decoder =
            Decoder::new(Cursor::new(mmap)).map_err(|e| SoilError::unavailable(&path, e))?;

        let (width, height) = decoder
            .dimensions()
            .map_err(|e| SoilError::unavailable(&path, e))?;
        let color_type = decoder
            .colortype()
            .map_err(|e| SoilError::unavailable(&path, e))?;
        if !matches!(color_type, ColorType::Gray(_)) {
            return Err(SoilError::unavailable(
                &path,
                format!("expected a single band raster, found {:?}", color_type),
            ));
        }

        let transform = read_transform(&mut decoder)
            .ok_or_else(|| SoilError::unavailable(&path, "missing georeferencing tags"))?;
        let no_data = read_no_data(&mut decoder);
        let (chunk_width, chunk_height) = decoder.chunk_dimensions();

        tracing::debug!(
            path = %path.display(),
            width,
            height,
            chunk_width,
            chunk_height,
            "Opened raster"
        );

        Ok(Self {
            path,
            decoder,
            width,
            height,
            chunk_width,
            chunk_height,
            color_type,
            transform,
            no_data,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    /// No-data value declared in the file (`GDAL_NODATA`), if any.
    pub fn no_data(&self) -> Option<f64> {
        self.no_data
    }

    pub fn info(&self) -> RasterInfo {
        RasterInfo {
            path: self.path.clone(),
            width: self.width,
            height: self.height,
            chunk_width: self.chunk_width,
            chunk_height: self.chunk_height,
            chunks: self.chunks_across() * self.height.div_ceil(self.chunk_height.max(1)),
            sample_type: format!("{:?}", self.color_type),
            transform: self.transform,
            no_data: self.no_data,
        }
    }

    /// Cell containing a world coordinate, or `None` outside the raster.
    pub fn cell_at(&self, x: f64, y: f64) -> Option<(u32, u32)> {
        let (col, row) = self.transform.world_to_pixel(x, y)?;
        let (col, row) = (col.floor(), row.floor());
        if col < 0.0
            || row < 0.0
            || col >= f64::from(self.width)
            || row >= f64::from(self.height)
        {
            return None;
        }
        Some((col as u32, row as u32))
    }

    /// Read the raw value of the cell containing a world coordinate.
    ///
    /// # Returns
    ///
    /// `Ok(None)` if the coordinate is outside the raster extent.
    ///
    /// # Errors
    ///
    /// Returns [`SoilError::RasterUnavailable`] if the chunk cannot be decoded.
    pub fn sample(&mut self, x: f64, y: f64) -> Result<Option<i64>> {
        match self.cell_at(x, y) {
            Some((col, row)) => self.read_cell(col, row).map(Some),
            None => Ok(None),
        }
    }

    /// Read the raw value of one cell.
    pub fn read_cell(&mut self, col: u32, row: u32) -> Result<i64> {
        let index = self.chunk_index(col, row);
        let (data_width, _) = self.chunk_extent(index)?;
        let values = self.read_chunk_values(index)?;

        let local_col = (col % self.chunk_width) as usize;
        let local_row = (row % self.chunk_height) as usize;
        values
            .get(local_row * data_width as usize + local_col)
            .copied()
            .ok_or_else(|| short_chunk(&self.path))
    }

    /// Pixel window covering every cell that intersects a world rectangle.
    ///
    /// Edges are snapped outward (floor of the low edge, ceil of the high
    /// edge) and clamped to the raster. A rectangle thinner than one cell
    /// still covers the cell it lies in.
    pub fn window(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Option<PixelWindow> {
        let corners = [
            self.transform.world_to_pixel(min_x, min_y)?,
            self.transform.world_to_pixel(min_x, max_y)?,
            self.transform.world_to_pixel(max_x, min_y)?,
            self.transform.world_to_pixel(max_x, max_y)?,
        ];

        let (mut col_lo, mut col_hi) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut row_lo, mut row_hi) = (f64::INFINITY, f64::NEG_INFINITY);
        for (col, row) in corners {
            col_lo = col_lo.min(col);
            col_hi = col_hi.max(col);
            row_lo = row_lo.min(row);
            row_hi = row_hi.max(row);
        }

        let (col0, col1) = snap(col_lo, col_hi, self.width);
        let (row0, row1) = snap(row_lo, row_hi, self.height);
        Some(PixelWindow {
            col_off: col0,
            row_off: row0,
            width: col1.saturating_sub(col0),
            height: row1.saturating_sub(row0),
        })
    }

    /// Count how often each raw value occurs inside a window.
    ///
    /// Only the chunks overlapping the window are decoded. No-data values
    /// are counted like any other value.
    pub fn count_window(&mut self, window: &PixelWindow) -> Result<HashMap<i64, u64>> {
        let mut counts = HashMap::new();
        if window.is_empty() {
            return Ok(counts);
        }

        let col_end = window.col_off + window.width;
        let row_end = window.row_off + window.height;
        let first_chunk_row = window.row_off / self.chunk_height;
        let last_chunk_row = (row_end - 1) / self.chunk_height;
        let first_chunk_col = window.col_off / self.chunk_width;
        let last_chunk_col = (col_end - 1) / self.chunk_width;

        for chunk_row in first_chunk_row..=last_chunk_row {
            for chunk_col in first_chunk_col..=last_chunk_col {
                let index = chunk_row * self.chunks_across() + chunk_col;
                let (data_width, data_height) = self.chunk_extent(index)?;
                let values = self.read_chunk_values(index)?;

                let origin_col = chunk_col * self.chunk_width;
                let origin_row = chunk_row * self.chunk_height;
                let rows = window.row_off.max(origin_row)..row_end.min(origin_row + data_height);
                let cols = window.col_off.max(origin_col)..col_end.min(origin_col + data_width);

                for row in rows {
                    let offset = ((row - origin_row) * data_width) as usize;
                    for col in cols.clone() {
                        let value = values
                            .get(offset + (col - origin_col) as usize)
                            .copied()
                            .ok_or_else(|| short_chunk(&self.path))?;
                        *counts.entry(value).or_insert(0) += 1;
                    }
                }
            }
        }

        Ok(counts)
    }

    fn chunks_across(&self) -> u32 {
        self.width.div_ceil(self.chunk_width.max(1))
    }

    /// Strips are chunks spanning the whole width, so the same formula
    /// covers striped and tiled files.
    fn chunk_index(&self, col: u32, row: u32) -> u32 {
        (row / self.chunk_height) * self.chunks_across() + col / self.chunk_width
    }

    /// Data extent of a chunk; the last strip or edge tiles are cropped to
    /// the image. `index` must come from an in-range cell.
    fn chunk_extent(&self, index: u32) -> Result<(u32, u32)> {
        let (w, h) = self.decoder.chunk_data_dimensions(index);
        if w == 0 || h == 0 {
            return Err(SoilError::unavailable(
                &self.path,
                format!("chunk {} is outside the image", index),
            ));
        }
        Ok((w, h))
    }

    fn read_chunk_values(&mut self, index: u32) -> Result<Vec<i64>> {
        let chunk = self
            .decoder
            .read_chunk(index)
            .map_err(|e| SoilError::unavailable(&self.path, e))?;
        into_values(chunk)
            .ok_or_else(|| SoilError::unavailable(&self.path, "unsupported sample type"))
    }
}

fn short_chunk(path: &Path) -> SoilError {
    SoilError::unavailable(path, "chunk is shorter than its layout")
}

fn snap(lo: f64, hi: f64, size: u32) -> (u32, u32) {
    let start = (lo + EDGE_EPSILON).floor();
    let end = (hi - EDGE_EPSILON).ceil().max(start + 1.0);
    let clamp = |v: f64| v.clamp(0.0, f64::from(size)) as u32;
    (clamp(start), clamp(end))
}

fn read_transform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<GeoTransform> {
    if let Ok(matrix) = decoder.get_tag_f64_vec(Tag::ModelTransformationTag) {
        return GeoTransform::from_matrix(&matrix);
    }
    let scale = decoder.get_tag_f64_vec(Tag::ModelPixelScaleTag).ok()?;
    let tiepoint = decoder.get_tag_f64_vec(Tag::ModelTiepointTag).ok()?;
    GeoTransform::from_scale_and_tiepoint(&scale, &tiepoint)
}

fn read_no_data<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<f64> {
    let value = decoder.find_tag(Tag::GdalNodata).ok()??;
    let text = value.into_string().ok()?;
    text.trim_matches(char::from(0)).trim().parse().ok()
}

fn float_value(value: f64) -> i64 {
    if value.is_finite() {
        value.round() as i64
    } else {
        NO_DATA
    }
}

/// Widen decoded samples to `i64`.
fn into_values(chunk: DecodingResult) -> Option<Vec<i64>> {
    let values = match chunk {
        DecodingResult::U8(v) => v.into_iter().map(i64::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(i64::from).collect(),
        DecodingResult::U32(v) => v.into_iter().map(i64::from).collect(),
        DecodingResult::U64(v) => v
            .into_iter()
            .map(|x| i64::try_from(x).unwrap_or(i64::MAX))
            .collect(),
        DecodingResult::I8(v) => v.into_iter().map(i64::from).collect(),
        DecodingResult::I16(v) => v.into_iter().map(i64::from).collect(),
        DecodingResult::I32(v) => v.into_iter().map(i64::from).collect(),
        DecodingResult::I64(v) => v,
        DecodingResult::F32(v) => v.into_iter().map(|x| float_value(f64::from(x))).collect(),
        DecodingResult::F64(v) => v.into_iter().map(float_value).collect(),
        #[allow(unreachable_patterns)]
        _ => return None,
    };
    Some(values)
}
