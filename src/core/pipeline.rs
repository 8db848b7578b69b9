//! Per-band extraction pipeline.
//!
//! Each band runs the same stateless chain: clamp the requested wavelength
//! to the source range, reduce the 4D table to a 3D slice, reorder axes for
//! the runtime consumer, and package the result. Bands never touch shared
//! mutable state and each writes its own output path, so they parallelize
//! trivially.

use crate::core::{reduce, reorder};
use crate::io::binary;
use crate::io::source::SourceLut;
use crate::types::{
    BandSpec, ClampSide, ClampWarning, ExtractConfig, LutResult, ReducedCube,
};
use std::path::PathBuf;

/// Outcome of packaging one band
#[derive(Debug, Clone)]
pub struct BandProduct {
    pub band: BandSpec,
    pub path: PathBuf,
    pub file_size: u64,
    pub dims: (usize, usize, usize),
    pub value_min: f64,
    pub value_max: f64,
    pub clamp: Option<ClampWarning>,
}

/// Result of a full extraction run
#[derive(Debug, Clone)]
pub struct ExtractReport {
    pub products: Vec<BandProduct>,
}

impl ExtractReport {
    /// Clamp warnings across all bands, in band order
    pub fn warnings(&self) -> Vec<&ClampWarning> {
        self.products
            .iter()
            .filter_map(|p| p.clamp.as_ref())
            .collect()
    }
}

/// Drives pre-clamp, spectral reduction, axis reordering, and packaging for
/// each configured band.
pub struct LutExtractor {
    config: ExtractConfig,
}

impl LutExtractor {
    pub fn new(config: ExtractConfig) -> Self {
        Self { config }
    }

    /// Load the source dataset and extract every configured band.
    pub fn run(&self) -> LutResult<ExtractReport> {
        let source = SourceLut::from_file(&self.config.source_path)?;
        self.run_parallel_with_source(&source)
    }

    /// Extract every configured band from an already-loaded source, serially.
    ///
    /// A failed band aborts the run; bands persisted before the failure stay
    /// valid on disk because each file lands atomically.
    pub fn run_with_source(&self, source: &SourceLut) -> LutResult<ExtractReport> {
        std::fs::create_dir_all(&self.config.output_dir)?;
        log::info!(
            "Extracting {} bands into {}",
            self.config.bands.len(),
            self.config.output_dir.display()
        );

        let products = self
            .config
            .bands
            .iter()
            .map(|band| self.process_band(source, band))
            .collect::<LutResult<Vec<_>>>()?;

        let report = ExtractReport { products };
        log::info!(
            "Extraction complete: {} bands, {} clamp warnings",
            report.products.len(),
            report.warnings().len()
        );
        Ok(report)
    }

    /// Parallel band extraction using Rayon (if available)
    #[cfg(feature = "parallel")]
    pub fn run_parallel_with_source(&self, source: &SourceLut) -> LutResult<ExtractReport> {
        use rayon::prelude::*;

        std::fs::create_dir_all(&self.config.output_dir)?;
        log::info!(
            "Extracting {} bands into {} (parallel)",
            self.config.bands.len(),
            self.config.output_dir.display()
        );

        let products = self
            .config
            .bands
            .par_iter()
            .map(|band| self.process_band(source, band))
            .collect::<LutResult<Vec<_>>>()?;

        let report = ExtractReport { products };
        log::info!(
            "Extraction complete: {} bands, {} clamp warnings",
            report.products.len(),
            report.warnings().len()
        );
        Ok(report)
    }

    #[cfg(not(feature = "parallel"))]
    pub fn run_parallel_with_source(&self, source: &SourceLut) -> LutResult<ExtractReport> {
        // Sequential fallback when the parallel feature is disabled
        self.run_with_source(source)
    }

    fn process_band(&self, source: &SourceLut, band: &BandSpec) -> LutResult<BandProduct> {
        log::info!("Processing band {} ({} nm)", band.name, band.wavelength_nm);

        let (target_nm, mut clamp) = reduce::clamp_band_wavelength(source, band);
        let (slice, side) = reduce::slice_at_wavelength(source, target_nm);
        if clamp.is_none() {
            // A below-range request surfaces here; above-range was already
            // folded into target_nm by the pre-clamp.
            clamp = side.map(|side| {
                let (wl_min, wl_max) = source.wavelength_range();
                let used_nm = match side {
                    ClampSide::BelowRange => wl_min,
                    ClampSide::AboveRange => wl_max,
                };
                ClampWarning {
                    band: band.name.clone(),
                    requested_nm: band.wavelength_nm,
                    used_nm,
                    side,
                }
            });
        }

        let values = reorder::to_runtime_order(slice);
        let cube = ReducedCube {
            sun_zenith_secant: source.sun_zenith_secant.clone(),
            sat_zenith_secant: source.sat_zenith_secant.clone(),
            azimuth_difference: source.azimuth_difference.clone(),
            values,
        };

        let path = self.config.output_dir.join(band.output_file_name());
        let file_size = binary::write_lut(&path, &cube)?;

        let dims = cube.dims();
        let (value_min, value_max) = cube.value_range();
        log::info!(
            "Band {}: {}x{}x{}, values in [{:.6}, {:.6}], {:.1} KB",
            band.name,
            dims.0,
            dims.1,
            dims.2,
            value_min,
            value_max,
            file_size as f64 / 1024.0
        );

        Ok(BandProduct {
            band: band.clone(),
            path,
            file_size,
            dims,
            value_min,
            value_max,
            clamp,
        })
    }
}
