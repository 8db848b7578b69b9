//! Source table loading and validation.
//!
//! The research-grade Rayleigh table ships as a NetCDF/HDF5 dataset holding a
//! 4D reflectance tensor and its four coordinate axes. Zenith axes are stored
//! as secants and the azimuth difference in degrees; they are used as-is, no
//! unit conversion happens anywhere in the pipeline (the downstream
//! interpolator works in secant space).

use crate::types::{LutError, LutResult, SourceTensor};
use ndarray::Array4;
use std::path::Path;

/// Default location of the research-grade source table
pub const DEFAULT_SOURCE_PATH: &str =
    "/data/cspp/geo2grid_v_1_2/pyspectral_data/rayleigh_only/rayleigh_lut_us-standard.h5";

pub const VAR_WAVELENGTHS: &str = "wavelengths";
pub const VAR_SUN_ZENITH_SECANT: &str = "sun_zenith_secant";
pub const VAR_AZIMUTH_DIFFERENCE: &str = "azimuth_difference";
pub const VAR_SAT_ZENITH_SECANT: &str = "satellite_zenith_secant";
pub const VAR_REFLECTANCE: &str = "reflectance";

/// In-memory copy of the 4D source table with its coordinate axes.
///
/// `reflectance` is indexed `[wavelength][sun_zenith][azimuth][sat_zenith]`,
/// matching the on-disk layout. Values are widened to `f64` on read and stay
/// at working precision until packaging.
#[derive(Debug, Clone)]
pub struct SourceLut {
    pub wavelengths: Vec<f64>,
    pub sun_zenith_secant: Vec<f64>,
    pub azimuth_difference: Vec<f64>,
    pub sat_zenith_secant: Vec<f64>,
    pub reflectance: SourceTensor,
}

impl SourceLut {
    /// Open a NetCDF source dataset and load all variables into memory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> LutResult<Self> {
        let path = path.as_ref();
        log::info!("Opening source LUT dataset: {}", path.display());

        let file = netcdf::open(path).map_err(|e| {
            LutError::Dataset(format!("failed to open {}: {}", path.display(), e))
        })?;

        let wavelengths = read_axis(&file, VAR_WAVELENGTHS)?;
        let sun_zenith_secant = read_axis(&file, VAR_SUN_ZENITH_SECANT)?;
        let azimuth_difference = read_axis(&file, VAR_AZIMUTH_DIFFERENCE)?;
        let sat_zenith_secant = read_axis(&file, VAR_SAT_ZENITH_SECANT)?;

        let refl_var = file.variable(VAR_REFLECTANCE).ok_or_else(|| {
            LutError::SourceFormat(format!("variable '{}' not found", VAR_REFLECTANCE))
        })?;
        let raw: Vec<f64> = refl_var.get_values(..).map_err(|e| {
            LutError::Dataset(format!("failed to read '{}': {}", VAR_REFLECTANCE, e))
        })?;

        // Tensor shape follows from the axis lengths; a mismatched element
        // count fails here before any band work starts.
        let shape = (
            wavelengths.len(),
            sun_zenith_secant.len(),
            azimuth_difference.len(),
            sat_zenith_secant.len(),
        );
        let reflectance = Array4::from_shape_vec(shape, raw).map_err(|e| {
            LutError::SourceFormat(format!("reflectance does not match axis lengths: {}", e))
        })?;

        Self::from_parts(
            wavelengths,
            sun_zenith_secant,
            azimuth_difference,
            sat_zenith_secant,
            reflectance,
        )
    }

    /// Assemble a source table from in-memory parts.
    ///
    /// Runs the same validation as `from_file`; used by tests and by callers
    /// that synthesize tables.
    pub fn from_parts(
        wavelengths: Vec<f64>,
        sun_zenith_secant: Vec<f64>,
        azimuth_difference: Vec<f64>,
        sat_zenith_secant: Vec<f64>,
        reflectance: SourceTensor,
    ) -> LutResult<Self> {
        let lut = SourceLut {
            wavelengths,
            sun_zenith_secant,
            azimuth_difference,
            sat_zenith_secant,
            reflectance,
        };
        lut.validate()?;

        log::info!(
            "Source LUT loaded: {} wavelengths x {} sun x {} azimuth x {} sat",
            lut.wavelengths.len(),
            lut.sun_zenith_secant.len(),
            lut.azimuth_difference.len(),
            lut.sat_zenith_secant.len()
        );
        Ok(lut)
    }

    /// First and last wavelength of the source grid, in nm
    pub fn wavelength_range(&self) -> (f64, f64) {
        (
            self.wavelengths[0],
            self.wavelengths[self.wavelengths.len() - 1],
        )
    }

    fn validate(&self) -> LutResult<()> {
        check_axis(VAR_WAVELENGTHS, &self.wavelengths)?;
        check_axis(VAR_SUN_ZENITH_SECANT, &self.sun_zenith_secant)?;
        check_axis(VAR_AZIMUTH_DIFFERENCE, &self.azimuth_difference)?;
        check_axis(VAR_SAT_ZENITH_SECANT, &self.sat_zenith_secant)?;

        let expected = (
            self.wavelengths.len(),
            self.sun_zenith_secant.len(),
            self.azimuth_difference.len(),
            self.sat_zenith_secant.len(),
        );
        if self.reflectance.dim() != expected {
            return Err(LutError::SourceFormat(format!(
                "reflectance shape {:?} does not match axis lengths {:?}",
                self.reflectance.dim(),
                expected
            )));
        }

        // Range check only: reflectances must be finite and non-negative.
        if let Some(bad) = self
            .reflectance
            .iter()
            .find(|v| !v.is_finite() || **v < 0.0)
        {
            return Err(LutError::SourceFormat(format!(
                "reflectance contains invalid value {}",
                bad
            )));
        }

        Ok(())
    }
}

fn read_axis(file: &netcdf::File, name: &str) -> LutResult<Vec<f64>> {
    let var = file
        .variable(name)
        .ok_or_else(|| LutError::SourceFormat(format!("variable '{}' not found", name)))?;
    let values: Vec<f64> = var
        .get_values(..)
        .map_err(|e| LutError::Dataset(format!("failed to read '{}': {}", name, e)))?;
    log::debug!("Read axis '{}': {} points", name, values.len());
    Ok(values)
}

fn check_axis(name: &str, values: &[f64]) -> LutResult<()> {
    if values.is_empty() {
        return Err(LutError::SourceFormat(format!("axis '{}' is empty", name)));
    }
    if let Some(i) = values.windows(2).position(|w| w[1] <= w[0]) {
        return Err(LutError::SourceFormat(format!(
            "axis '{}' is not strictly increasing at index {}",
            name,
            i + 1
        )));
    }
    Ok(())
}
