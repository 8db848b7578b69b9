//! raylut - Rayleigh LUT extraction and packaging CLI

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use raylut::io::source::DEFAULT_SOURCE_PATH;
use raylut::io::{binary, embed};
use raylut::{BandSpec, ExtractConfig, LutExtractor, SourceLut};

#[derive(Parser)]
#[command(name = "raylut")]
#[command(author, version, about = "Rayleigh LUT extraction and packaging for GOES ABI")]
#[command(long_about = "
Converts a research-grade 4D Rayleigh-scattering table (wavelength x
sun-zenith-secant x azimuth x sat-zenith-secant) into per-band 3D binary
LUTs for the native trilinear interpolator, and embeds them as C arrays
for static linking.

Examples:
  raylut extract --source rayleigh_lut_us-standard.h5 --out-dir luts
  raylut extract --bands bands.json --serial
  raylut embed --dir luts --source-out rayleigh_lut_embedded.c --header-out rayleigh_lut_embedded.h
  raylut info luts/rayleigh_lut_C01.bin
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract per-band binary LUTs from the source dataset
    #[command(visible_alias = "x")]
    Extract(ExtractArgs),

    /// Generate embedded C arrays from packaged LUTs
    Embed(EmbedArgs),

    /// Inspect packaged LUT files
    #[command(visible_alias = "i")]
    Info(InfoArgs),
}

#[derive(Args)]
struct ExtractArgs {
    /// Source NetCDF/HDF5 dataset
    #[arg(short, long, default_value = DEFAULT_SOURCE_PATH)]
    source: PathBuf,

    /// Output directory for the packaged .bin files
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// JSON band table: [{"name": "C01", "wavelength_nm": 470.0}, ...]
    /// (defaults to the GOES-19 ABI trio)
    #[arg(short, long)]
    bands: Option<PathBuf>,

    /// Process bands one at a time
    #[arg(long)]
    serial: bool,
}

#[derive(Args)]
struct EmbedArgs {
    /// Directory holding the packaged .bin files
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,

    /// Generated C definition file
    #[arg(long, default_value = "rayleigh_lut_embedded.c")]
    source_out: PathBuf,

    /// Generated C header file
    #[arg(long, default_value = "rayleigh_lut_embedded.h")]
    header_out: PathBuf,
}

#[derive(Args)]
struct InfoArgs {
    /// Packaged LUT file(s)
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stdout)
        .init();

    let cli = Cli::parse();

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    match cli.command {
        Commands::Extract(args) => run_extract(args),
        Commands::Embed(args) => run_embed(args),
        Commands::Info(args) => run_info(args),
    }
}

fn run_extract(args: ExtractArgs) -> Result<()> {
    let bands = match &args.bands {
        Some(path) => load_band_table(path)?,
        None => BandSpec::goes_abi_defaults(),
    };

    let source = SourceLut::from_file(&args.source)
        .with_context(|| format!("failed to load source {}", args.source.display()))?;

    let extractor = LutExtractor::new(ExtractConfig {
        source_path: args.source,
        output_dir: args.out_dir,
        bands,
    });
    let report = if args.serial {
        extractor.run_with_source(&source)?
    } else {
        extractor.run_parallel_with_source(&source)?
    };

    for product in &report.products {
        println!(
            "{}: {} ({} bytes)",
            product.band.name,
            product.path.display(),
            product.file_size
        );
    }
    Ok(())
}

fn run_embed(args: EmbedArgs) -> Result<()> {
    let assets = embed::default_assets(&args.dir);
    embed::generate_sources(&assets, &args.source_out, &args.header_out)
        .context("embedding failed")?;
    println!(
        "Generated {} and {}",
        args.source_out.display(),
        args.header_out.display()
    );
    Ok(())
}

fn run_info(args: InfoArgs) -> Result<()> {
    for path in &args.files {
        let packed = binary::read_lut(path)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        let dims = packed.dims();
        let (min, max) = packed.value_range();

        println!("{}", path.display());
        print_axis("sun zenith secant", &packed.sun_zenith);
        print_axis("sat zenith secant", &packed.sat_zenith);
        print_axis("azimuth (deg)    ", &packed.azimuth);
        println!(
            "  values: {} ({}x{}x{}), range [{:.6}, {:.6}]",
            packed.values.len(),
            dims.0,
            dims.1,
            dims.2,
            min,
            max
        );
    }
    Ok(())
}

fn print_axis(label: &str, axis: &binary::AxisDescriptor) {
    println!(
        "  {}: {} points, {} .. {} (step {})",
        label, axis.count, axis.first, axis.last, axis.step
    );
}

fn load_band_table(path: &Path) -> Result<Vec<BandSpec>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read band table {}", path.display()))?;
    let bands: Vec<BandSpec> = serde_json::from_str(&text)
        .with_context(|| format!("invalid band table {}", path.display()))?;
    if bands.is_empty() {
        anyhow::bail!("band table {} is empty", path.display());
    }
    Ok(bands)
}
