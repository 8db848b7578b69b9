//! Core LUT transformation modules

pub mod pipeline;
pub mod reduce;
pub mod reorder;

// Re-export main types
pub use pipeline::{BandProduct, ExtractReport, LutExtractor};
pub use reduce::{clamp_band_wavelength, slice_at_wavelength};
pub use reorder::to_runtime_order;
