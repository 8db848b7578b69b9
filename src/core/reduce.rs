//! Spectral reduction: collapse the wavelength axis to a single band slice.

use crate::io::source::SourceLut;
use crate::types::{BandSpec, ClampSide, ClampWarning, LutCube};
use ndarray::{Axis, Zip};

/// Extract the 3D reflectance slice for a target wavelength.
///
/// An exact grid hit returns the stored slice untouched. A target between
/// two grid wavelengths blends the bracketing slices linearly. A target
/// outside the grid clamps to the boundary slice and reports which side it
/// fell on. The output keeps source axis order `[sun][azimuth][sat]`.
pub fn slice_at_wavelength(source: &SourceLut, target_nm: f64) -> (LutCube, Option<ClampSide>) {
    let wl = &source.wavelengths;
    let idx = wl.partition_point(|&w| w < target_nm);

    // Exact hit: no arithmetic applied, the slice comes back bit-identical.
    if idx < wl.len() && wl[idx] == target_nm {
        log::debug!("Wavelength {} nm matches grid point {}", target_nm, idx);
        return (source.reflectance.index_axis(Axis(0), idx).to_owned(), None);
    }

    if idx == 0 {
        log::warn!(
            "Wavelength {} nm below source minimum {} nm, clamping to boundary slice",
            target_nm,
            wl[0]
        );
        return (
            source.reflectance.index_axis(Axis(0), 0).to_owned(),
            Some(ClampSide::BelowRange),
        );
    }
    if idx == wl.len() {
        log::warn!(
            "Wavelength {} nm above source maximum {} nm, clamping to boundary slice",
            target_nm,
            wl[wl.len() - 1]
        );
        return (
            source
                .reflectance
                .index_axis(Axis(0), wl.len() - 1)
                .to_owned(),
            Some(ClampSide::AboveRange),
        );
    }

    let (w_lo, w_hi) = (wl[idx - 1], wl[idx]);
    let alpha = (target_nm - w_lo) / (w_hi - w_lo);
    log::debug!(
        "Interpolating {} nm between {} nm and {} nm (alpha = {:.4})",
        target_nm,
        w_lo,
        w_hi,
        alpha
    );

    let lo = source.reflectance.index_axis(Axis(0), idx - 1);
    let hi = source.reflectance.index_axis(Axis(0), idx);
    let blended = Zip::from(&lo)
        .and(&hi)
        .map_collect(|&a, &b| a * (1.0 - alpha) + b * alpha);
    (blended, None)
}

/// Clamp a band's requested wavelength to the source maximum before
/// reduction.
///
/// Sensor bands beyond the table's top end are served the boundary slice.
/// Clamping up front sends the subsequent reduction down the exact-match
/// path, so a clamped band produces exactly one warning.
pub fn clamp_band_wavelength(source: &SourceLut, band: &BandSpec) -> (f64, Option<ClampWarning>) {
    let (_, wl_max) = source.wavelength_range();
    if band.wavelength_nm > wl_max {
        let warning = ClampWarning {
            band: band.name.clone(),
            requested_nm: band.wavelength_nm,
            used_nm: wl_max,
            side: ClampSide::AboveRange,
        };
        log::warn!("{}", warning);
        (wl_max, Some(warning))
    } else {
        (band.wavelength_nm, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array4;

    /// Three wavelengths with constant slices 0.1 / 0.2 / 0.4
    fn graded_source() -> SourceLut {
        let mut reflectance = Array4::zeros((3, 2, 2, 2));
        reflectance.index_axis_mut(Axis(0), 0).fill(0.1);
        reflectance.index_axis_mut(Axis(0), 1).fill(0.2);
        reflectance.index_axis_mut(Axis(0), 2).fill(0.4);
        SourceLut::from_parts(
            vec![400.0, 500.0, 600.0],
            vec![1.0, 2.0],
            vec![0.0, 90.0],
            vec![1.0, 3.0],
            reflectance,
        )
        .unwrap()
    }

    #[test]
    fn test_exact_match_returns_stored_slice() {
        let source = graded_source();
        let (cube, side) = slice_at_wavelength(&source, 500.0);
        assert!(side.is_none());
        assert_eq!(cube.dim(), (2, 2, 2));
        for &v in cube.iter() {
            assert_eq!(v, 0.2);
        }
    }

    #[test]
    fn test_midpoint_interpolation() {
        let source = graded_source();
        let (cube, side) = slice_at_wavelength(&source, 450.0);
        assert!(side.is_none());
        for &v in cube.iter() {
            assert_relative_eq!(v, 0.15, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_asymmetric_interpolation_weights() {
        let source = graded_source();
        // alpha = 0.25 between 500 nm (0.2) and 600 nm (0.4)
        let (cube, _) = slice_at_wavelength(&source, 525.0);
        for &v in cube.iter() {
            assert_relative_eq!(v, 0.25, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_below_range_clamps_to_first_slice() {
        let source = graded_source();
        let (cube, side) = slice_at_wavelength(&source, 300.0);
        assert_eq!(side, Some(ClampSide::BelowRange));
        for &v in cube.iter() {
            assert_eq!(v, 0.1);
        }
    }

    #[test]
    fn test_above_range_clamps_to_last_slice() {
        let source = graded_source();
        let (cube, side) = slice_at_wavelength(&source, 10000.0);
        assert_eq!(side, Some(ClampSide::AboveRange));
        for &v in cube.iter() {
            assert_eq!(v, 0.4);
        }
    }

    #[test]
    fn test_boundary_wavelengths_are_exact_hits() {
        let source = graded_source();
        let (_, side_lo) = slice_at_wavelength(&source, 400.0);
        let (_, side_hi) = slice_at_wavelength(&source, 600.0);
        assert!(side_lo.is_none());
        assert!(side_hi.is_none());
    }

    #[test]
    fn test_preclamp_above_range_band() {
        let source = graded_source();
        let band = BandSpec::new("C03", 865.0);
        let (target, warning) = clamp_band_wavelength(&source, &band);
        assert_eq!(target, 600.0);
        let warning = warning.unwrap();
        assert_eq!(warning.side, ClampSide::AboveRange);
        assert_eq!(warning.used_nm, 600.0);

        // The clamped target then takes the exact-match path: no second report.
        let (cube, side) = slice_at_wavelength(&source, target);
        assert!(side.is_none());
        for &v in cube.iter() {
            assert_eq!(v, 0.4);
        }
    }

    #[test]
    fn test_preclamp_leaves_in_range_band_alone() {
        let source = graded_source();
        let band = BandSpec::new("C01", 470.0);
        let (target, warning) = clamp_band_wavelength(&source, &band);
        assert_eq!(target, 470.0);
        assert!(warning.is_none());
    }
}
