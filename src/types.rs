use ndarray::{Array3, Array4};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 4D source reflectance tensor (wavelength x sun-zenith x azimuth x sat-zenith)
pub type SourceTensor = Array4<f64>;

/// 3D per-band reflectance cube
pub type LutCube = Array3<f64>;

/// Side of the source wavelength range a clamped request fell on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClampSide {
    BelowRange,
    AboveRange,
}

impl std::fmt::Display for ClampSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClampSide::BelowRange => write!(f, "below"),
            ClampSide::AboveRange => write!(f, "above"),
        }
    }
}

/// Out-of-range wavelength request resolved by clamping to a boundary slice.
///
/// Carried in the extraction report rather than only logged, so callers can
/// inspect which bands were served degraded data.
#[derive(Debug, Clone, PartialEq)]
pub struct ClampWarning {
    pub band: String,
    pub requested_nm: f64,
    pub used_nm: f64,
    pub side: ClampSide,
}

impl std::fmt::Display for ClampWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "band {}: {} nm is {} the source range, using boundary slice at {} nm",
            self.band, self.requested_nm, self.side, self.used_nm
        )
    }
}

/// A satellite band to extract: output name plus central wavelength
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandSpec {
    pub name: String,
    pub wavelength_nm: f64,
}

impl BandSpec {
    pub fn new(name: impl Into<String>, wavelength_nm: f64) -> Self {
        BandSpec {
            name: name.into(),
            wavelength_nm,
        }
    }

    /// Packaged file name for this band, e.g. `rayleigh_lut_C01.bin`
    pub fn output_file_name(&self) -> String {
        format!("rayleigh_lut_{}.bin", self.name)
    }

    /// C symbol the embedder assigns to this band's byte array,
    /// e.g. `rayleigh_lut_c01_data`
    pub fn embed_symbol(&self) -> String {
        format!("rayleigh_lut_{}_data", self.name.to_lowercase())
    }

    /// GOES-19 ABI visible/NIR bands used for true-color atmospheric
    /// correction. C03 sits above the source table's range and clamps.
    pub fn goes_abi_defaults() -> Vec<BandSpec> {
        vec![
            BandSpec::new("C01", 470.0),
            BandSpec::new("C02", 640.0),
            BandSpec::new("C03", 865.0),
        ]
    }
}

/// Per-band cube in runtime axis order, with the grids it was sampled on.
///
/// `values` is indexed `[sun_zenith_secant][sat_zenith_secant][azimuth]`;
/// the grid vectors keep source order and working precision.
#[derive(Debug, Clone)]
pub struct ReducedCube {
    pub sun_zenith_secant: Vec<f64>,
    pub sat_zenith_secant: Vec<f64>,
    pub azimuth_difference: Vec<f64>,
    pub values: LutCube,
}

impl ReducedCube {
    /// (n_sun, n_sat, n_azimuth)
    pub fn dims(&self) -> (usize, usize, usize) {
        self.values.dim()
    }

    /// Min/max over the cube, for diagnostics
    pub fn value_range(&self) -> (f64, f64) {
        let min = self.values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = self
            .values
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max);
        (min, max)
    }
}

/// Explicit extraction configuration (no global defaults)
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    pub source_path: PathBuf,
    pub output_dir: PathBuf,
    pub bands: Vec<BandSpec>,
}

/// Error types for LUT extraction and packaging
#[derive(Debug, thiserror::Error)]
pub enum LutError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Invalid source format: {0}")]
    SourceFormat(String),

    #[error(
        "Axis '{axis}' is not uniformly spaced: gap {gap} at index {index} vs nominal step {step}"
    )]
    NonUniformAxis {
        axis: &'static str,
        index: usize,
        gap: f64,
        step: f64,
    },

    #[error("Invalid LUT file {}: {}", .path.display(), .reason)]
    InvalidLutFile { path: PathBuf, reason: String },

    #[error("Missing LUT input: {}", .0.display())]
    MissingAsset(PathBuf),
}

/// Result type for LUT operations
pub type LutResult<T> = Result<T, LutError>;
