//! Packaged LUT files: fixed 48-byte header plus float32 payload.
//!
//! Layout (all little-endian), matching the native trilinear consumer:
//!
//! ```text
//! f32 x3   sun-zenith-secant  first, last, step
//! f32 x3   sat-zenith-secant  first, last, step
//! f32 x3   azimuth            first, last, step
//! i32 x3   counts             n_sun, n_sat, n_azimuth
//! f32 ...  payload, row-major [sun][sat][azimuth]
//! ```
//!
//! File size is exactly `48 + 4 * n_sun * n_sat * n_azimuth`. The consumer
//! reconstructs each axis as `first + i * step`, so grids must be uniform;
//! a non-uniform grid is rejected here instead of silently shifting every
//! lookup downstream.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use crate::types::{LutError, LutResult, ReducedCube};

/// Fixed header size in bytes: 9 x f32 + 3 x i32
pub const HEADER_SIZE: usize = 48;

/// Allowed relative deviation of any grid gap from the nominal step
const UNIFORMITY_REL_TOL: f64 = 1e-3;

/// One axis as stored in the header
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisDescriptor {
    pub first: f32,
    pub last: f32,
    pub step: f32,
    pub count: i32,
}

/// Parse result of a packaged LUT file
#[derive(Debug, Clone)]
pub struct PackedLut {
    pub sun_zenith: AxisDescriptor,
    pub sat_zenith: AxisDescriptor,
    pub azimuth: AxisDescriptor,
    pub values: Vec<f32>,
}

impl PackedLut {
    /// (n_sun, n_sat, n_azimuth)
    pub fn dims(&self) -> (usize, usize, usize) {
        (
            self.sun_zenith.count as usize,
            self.sat_zenith.count as usize,
            self.azimuth.count as usize,
        )
    }

    /// Min/max over the payload, for diagnostics
    pub fn value_range(&self) -> (f32, f32) {
        let min = self.values.iter().cloned().fold(f32::INFINITY, f32::min);
        let max = self
            .values
            .iter()
            .cloned()
            .fold(f32::NEG_INFINITY, f32::max);
        (min, max)
    }
}

/// Serialize a reduced cube to `path`.
///
/// The write goes to a temp file in the destination directory and is renamed
/// into place on success, so no truncated file is ever observable under the
/// final name. Values narrow from `f64` to `f32` here and nowhere else.
/// Returns the file size in bytes.
pub fn write_lut<P: AsRef<Path>>(path: P, cube: &ReducedCube) -> LutResult<u64> {
    let path = path.as_ref();

    let sun = axis_descriptor("sun_zenith_secant", &cube.sun_zenith_secant)?;
    let sat = axis_descriptor("sat_zenith_secant", &cube.sat_zenith_secant)?;
    let az = axis_descriptor("azimuth_difference", &cube.azimuth_difference)?;

    let dims = cube.dims();
    let expected = (sun.count as usize, sat.count as usize, az.count as usize);
    if dims != expected {
        return Err(LutError::SourceFormat(format!(
            "cube shape {:?} does not match axis lengths {:?}",
            dims, expected
        )));
    }

    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(parent)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        for axis in [&sun, &sat, &az] {
            writer.write_f32::<LittleEndian>(axis.first)?;
            writer.write_f32::<LittleEndian>(axis.last)?;
            writer.write_f32::<LittleEndian>(axis.step)?;
        }
        writer.write_i32::<LittleEndian>(sun.count)?;
        writer.write_i32::<LittleEndian>(sat.count)?;
        writer.write_i32::<LittleEndian>(az.count)?;
        for &value in cube.values.iter() {
            writer.write_f32::<LittleEndian>(value as f32)?;
        }
        writer.flush()?;
    }
    tmp.persist(path).map_err(|e| LutError::Io(e.error))?;

    let size = (HEADER_SIZE + 4 * dims.0 * dims.1 * dims.2) as u64;
    log::info!(
        "Wrote {} ({}x{}x{}, {} bytes)",
        path.display(),
        dims.0,
        dims.1,
        dims.2,
        size
    );
    Ok(size)
}

/// Parse a packaged LUT file back, verifying the layout the consumer relies
/// on: positive counts and a byte length of exactly `48 + 4 * n * m * k`.
pub fn read_lut<P: AsRef<Path>>(path: P) -> LutResult<PackedLut> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    if bytes.len() < HEADER_SIZE {
        return Err(LutError::InvalidLutFile {
            path: path.to_path_buf(),
            reason: format!("{} bytes is too short for the header", bytes.len()),
        });
    }

    let mut cursor = Cursor::new(&bytes[..]);
    let sun_span = read_span(&mut cursor)?;
    let sat_span = read_span(&mut cursor)?;
    let az_span = read_span(&mut cursor)?;
    let n_sun = cursor.read_i32::<LittleEndian>()?;
    let n_sat = cursor.read_i32::<LittleEndian>()?;
    let n_az = cursor.read_i32::<LittleEndian>()?;

    if n_sun < 1 || n_sat < 1 || n_az < 1 {
        return Err(LutError::InvalidLutFile {
            path: path.to_path_buf(),
            reason: format!("non-positive axis counts {}x{}x{}", n_sun, n_sat, n_az),
        });
    }

    // Counts come straight from the file, so the implied size must be
    // computed without overflow before it can be trusted.
    let total = (n_sun as usize)
        .checked_mul(n_sat as usize)
        .and_then(|n| n.checked_mul(n_az as usize))
        .filter(|&n| n <= (usize::MAX - HEADER_SIZE) / 4)
        .ok_or_else(|| LutError::InvalidLutFile {
            path: path.to_path_buf(),
            reason: format!(
                "axis counts {}x{}x{} overflow the file size",
                n_sun, n_sat, n_az
            ),
        })?;
    let expected_len = HEADER_SIZE + 4 * total;
    if bytes.len() != expected_len {
        return Err(LutError::InvalidLutFile {
            path: path.to_path_buf(),
            reason: format!(
                "file is {} bytes, header implies {}",
                bytes.len(),
                expected_len
            ),
        });
    }

    let mut values = Vec::with_capacity(total);
    for _ in 0..total {
        values.push(cursor.read_f32::<LittleEndian>()?);
    }

    Ok(PackedLut {
        sun_zenith: descriptor_from(sun_span, n_sun),
        sat_zenith: descriptor_from(sat_span, n_sat),
        azimuth: descriptor_from(az_span, n_az),
        values,
    })
}

fn read_span(cursor: &mut Cursor<&[u8]>) -> std::io::Result<(f32, f32, f32)> {
    Ok((
        cursor.read_f32::<LittleEndian>()?,
        cursor.read_f32::<LittleEndian>()?,
        cursor.read_f32::<LittleEndian>()?,
    ))
}

fn descriptor_from(span: (f32, f32, f32), count: i32) -> AxisDescriptor {
    AxisDescriptor {
        first: span.0,
        last: span.1,
        step: span.2,
        count,
    }
}

/// Derive the header descriptor for one grid, enforcing uniform spacing.
///
/// Step is `(last - first) / (count - 1)`, or 0 for a single-point axis.
fn axis_descriptor(name: &'static str, grid: &[f64]) -> LutResult<AxisDescriptor> {
    if grid.is_empty() {
        return Err(LutError::SourceFormat(format!("axis '{}' is empty", name)));
    }
    let count = grid.len();
    let first = grid[0];
    let last = grid[count - 1];
    let step = if count > 1 {
        (last - first) / (count - 1) as f64
    } else {
        0.0
    };

    let tolerance = step.abs() * UNIFORMITY_REL_TOL;
    for (i, pair) in grid.windows(2).enumerate() {
        let gap = pair[1] - pair[0];
        if (gap - step).abs() > tolerance {
            return Err(LutError::NonUniformAxis {
                axis: name,
                index: i,
                gap,
                step,
            });
        }
    }

    Ok(AxisDescriptor {
        first: first as f32,
        last: last as f32,
        step: step as f32,
        count: count as i32,
    })
}
