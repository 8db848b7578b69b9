//! I/O modules: source dataset access, packaged binaries, embedded assets

pub mod binary;
pub mod embed;
pub mod source;

// Re-export main types
pub use binary::{read_lut, write_lut, AxisDescriptor, PackedLut};
pub use embed::{default_assets, generate_sources, EmbedAsset};
pub use source::SourceLut;
