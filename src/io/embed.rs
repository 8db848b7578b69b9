//! Embedded-asset generation: packaged LUTs as C byte arrays.
//!
//! Firmware-style consumers link the tables in statically instead of loading
//! files at runtime. Each packaged binary becomes a `const unsigned char`
//! array plus a `<symbol>_len` element count, with `extern` declarations in a
//! companion header. Output is deterministic: identical input bytes yield
//! identical text.

use crate::types::{BandSpec, LutError, LutResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Bytes per row in the generated array body. Formatting only; the parsed
/// byte sequence is what consumers depend on.
const BYTES_PER_ROW: usize = 12;

/// One packaged file to embed and the C symbol it becomes
#[derive(Debug, Clone)]
pub struct EmbedAsset {
    pub path: PathBuf,
    pub symbol: String,
}

impl EmbedAsset {
    pub fn new(path: impl Into<PathBuf>, symbol: impl Into<String>) -> Self {
        EmbedAsset {
            path: path.into(),
            symbol: symbol.into(),
        }
    }
}

/// The fixed GOES-19 band trio under `dir`, paired with the symbols the
/// downstream consumer links against.
pub fn default_assets(dir: &Path) -> Vec<EmbedAsset> {
    BandSpec::goes_abi_defaults()
        .iter()
        .map(|band| EmbedAsset::new(dir.join(band.output_file_name()), band.embed_symbol()))
        .collect()
}

/// Generate the C definition unit and its header from `assets`.
///
/// All inputs are read up front; a missing file aborts the batch before
/// either output is written, so the generated .c/.h pair can never disagree.
pub fn generate_sources(assets: &[EmbedAsset], c_path: &Path, h_path: &Path) -> LutResult<()> {
    let mut payloads = Vec::with_capacity(assets.len());
    for asset in assets {
        let bytes = fs::read(&asset.path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LutError::MissingAsset(asset.path.clone())
            } else {
                LutError::Io(e)
            }
        })?;
        log::info!(
            "Embedding {} ({} bytes) as {}",
            asset.path.display(),
            bytes.len(),
            asset.symbol
        );
        payloads.push(bytes);
    }

    let header_name = file_name_of(h_path);

    let mut c_out = String::new();
    c_out.push_str("/* Auto-generated file - DO NOT EDIT */\n");
    c_out.push_str("/* Generated from Rayleigh LUTs with secant-based interpolation */\n\n");
    c_out.push_str(&format!("#include \"{}\"\n\n", header_name));
    for (asset, bytes) in assets.iter().zip(&payloads) {
        render_byte_array(&mut c_out, &asset.symbol, bytes);
        c_out.push('\n');
    }

    let guard = guard_name(&header_name);
    let mut h_out = String::new();
    h_out.push_str("/* Auto-generated file - DO NOT EDIT */\n");
    h_out.push_str(&format!("#ifndef {}\n", guard));
    h_out.push_str(&format!("#define {}\n\n", guard));
    for asset in assets {
        h_out.push_str(&format!("extern const unsigned char {}[];\n", asset.symbol));
        h_out.push_str(&format!("extern const unsigned int {}_len;\n", asset.symbol));
    }
    h_out.push_str(&format!("\n#endif /* {} */\n", guard));

    fs::write(c_path, c_out)?;
    fs::write(h_path, h_out)?;
    log::info!("Generated {} and {}", c_path.display(), h_path.display());
    Ok(())
}

fn render_byte_array(out: &mut String, symbol: &str, bytes: &[u8]) {
    out.push_str(&format!("const unsigned char {}[] = {{\n", symbol));
    for (row, chunk) in bytes.chunks(BYTES_PER_ROW).enumerate() {
        out.push_str("    ");
        for (col, byte) in chunk.iter().enumerate() {
            out.push_str(&format!("0x{:02x}", byte));
            if row * BYTES_PER_ROW + col + 1 < bytes.len() {
                out.push(',');
                if col + 1 < chunk.len() {
                    out.push(' ');
                }
            }
        }
        out.push('\n');
    }
    out.push_str("};\n");
    out.push_str(&format!(
        "const unsigned int {}_len = {};\n",
        symbol,
        bytes.len()
    ));
}

fn guard_name(header_file: &str) -> String {
    header_file
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_c_array(text: &str, symbol: &str) -> Vec<u8> {
        let decl = format!("const unsigned char {}[] = {{", symbol);
        let start = text.find(&decl).expect("symbol not found") + decl.len();
        let end = text[start..].find('}').expect("unterminated array") + start;
        text[start..end]
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| u8::from_str_radix(t.trim_start_matches("0x"), 16).unwrap())
            .collect()
    }

    #[test]
    fn test_default_assets_cover_the_band_trio() {
        let assets = default_assets(Path::new("out"));
        assert_eq!(assets.len(), 3);
        assert!(assets[0].path.ends_with("rayleigh_lut_C01.bin"));
        assert_eq!(assets[0].symbol, "rayleigh_lut_c01_data");
        assert_eq!(assets[2].symbol, "rayleigh_lut_c03_data");
    }

    #[test]
    fn test_generated_arrays_decode_back_to_input_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let a_path = dir.path().join("a.bin");
        let b_path = dir.path().join("b.bin");
        let a_bytes: Vec<u8> = (0u16..=255).map(|b| b as u8).collect();
        let b_bytes = vec![0x00, 0xff, 0x7f, 0x80, 0x01];
        std::fs::write(&a_path, &a_bytes).unwrap();
        std::fs::write(&b_path, &b_bytes).unwrap();

        let assets = vec![
            EmbedAsset::new(&a_path, "lut_a_data"),
            EmbedAsset::new(&b_path, "lut_b_data"),
        ];
        let c_path = dir.path().join("embedded.c");
        let h_path = dir.path().join("embedded.h");
        generate_sources(&assets, &c_path, &h_path).unwrap();

        let c_text = std::fs::read_to_string(&c_path).unwrap();
        assert_eq!(decode_c_array(&c_text, "lut_a_data"), a_bytes);
        assert_eq!(decode_c_array(&c_text, "lut_b_data"), b_bytes);
        assert!(c_text.contains("const unsigned int lut_a_data_len = 256;"));
        assert!(c_text.contains("const unsigned int lut_b_data_len = 5;"));
        assert!(c_text.contains("#include \"embedded.h\""));
    }

    #[test]
    fn test_header_declares_every_symbol() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("x.bin");
        std::fs::write(&bin, [1u8, 2, 3]).unwrap();

        let assets = vec![EmbedAsset::new(&bin, "lut_x_data")];
        let c_path = dir.path().join("embedded.c");
        let h_path = dir.path().join("embedded.h");
        generate_sources(&assets, &c_path, &h_path).unwrap();

        let h_text = std::fs::read_to_string(&h_path).unwrap();
        assert!(h_text.contains("#ifndef EMBEDDED_H"));
        assert!(h_text.contains("#define EMBEDDED_H"));
        assert!(h_text.contains("extern const unsigned char lut_x_data[];"));
        assert!(h_text.contains("extern const unsigned int lut_x_data_len;"));
        assert!(h_text.contains("#endif /* EMBEDDED_H */"));
    }

    #[test]
    fn test_output_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("x.bin");
        std::fs::write(&bin, (0u8..100).collect::<Vec<_>>()).unwrap();
        let assets = vec![EmbedAsset::new(&bin, "lut_x_data")];

        // Same inputs, same output names, two scratch directories
        let out1 = tempfile::tempdir().unwrap();
        let out2 = tempfile::tempdir().unwrap();
        generate_sources(
            &assets,
            &out1.path().join("embedded.c"),
            &out1.path().join("embedded.h"),
        )
        .unwrap();
        generate_sources(
            &assets,
            &out2.path().join("embedded.c"),
            &out2.path().join("embedded.h"),
        )
        .unwrap();

        assert_eq!(
            std::fs::read_to_string(out1.path().join("embedded.c")).unwrap(),
            std::fs::read_to_string(out2.path().join("embedded.c")).unwrap()
        );
        assert_eq!(
            std::fs::read_to_string(out1.path().join("embedded.h")).unwrap(),
            std::fs::read_to_string(out2.path().join("embedded.h")).unwrap()
        );
    }

    #[test]
    fn test_no_trailing_comma_after_last_byte() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("x.bin");
        std::fs::write(&bin, [0xaau8; 13]).unwrap();
        let assets = vec![EmbedAsset::new(&bin, "lut_x_data")];
        let c_path = dir.path().join("embedded.c");
        generate_sources(&assets, &c_path, &dir.path().join("embedded.h")).unwrap();

        let c_text = std::fs::read_to_string(&c_path).unwrap();
        assert!(c_text.contains("0xaa\n};"));
        assert!(!c_text.contains("0xaa,\n};"));
    }

    #[test]
    fn test_missing_input_aborts_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let assets = vec![EmbedAsset::new(dir.path().join("absent.bin"), "lut_a_data")];
        let c_path = dir.path().join("embedded.c");
        let h_path = dir.path().join("embedded.h");

        let result = generate_sources(&assets, &c_path, &h_path);
        assert!(matches!(result, Err(LutError::MissingAsset(_))));
        assert!(!c_path.exists());
        assert!(!h_path.exists());
    }
}
