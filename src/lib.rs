//! raylut: A Fast, Modular Rayleigh LUT Extractor and Packager for GOES ABI
//!
//! This library converts a research-grade 4D Rayleigh-scattering lookup table
//! (wavelength x sun-zenith-secant x azimuth x sat-zenith-secant) into compact
//! per-band 3D tables for a native trilinear interpolator, and packages them
//! as standalone binary files or statically embedded C arrays.
//!
//! The per-band pipeline is stateless: clamp the requested wavelength into
//! the source range, reduce the spectral axis (exact slice or linear blend of
//! the bracketing slices), permute axes into the consumer's layout, and write
//! the fixed-header binary. Everything works at `f64` precision in memory and
//! narrows to `f32` once, at packaging time.

pub mod types;
pub mod io;
pub mod core;

// Re-export main types and functions for easier access
pub use types::{
    BandSpec, ClampSide, ClampWarning, ExtractConfig, LutCube, LutError, LutResult, ReducedCube,
};

pub use crate::core::{BandProduct, ExtractReport, LutExtractor};
pub use io::{read_lut, write_lut, EmbedAsset, PackedLut, SourceLut};
