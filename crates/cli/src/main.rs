//! GeoLab CLI - elevation and vegetation-change walkthroughs over GeoTIFFs

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use geolab_algorithms::classification::{apply_mask, class_mask, reclassify};
use geolab_algorithms::elevation::{convert_units, LinearUnit};
use geolab_algorithms::imagery::{
    classify_change, index_difference, ndvi_from_image, BandLayout, ChangeThresholds, IndexParams,
};
use geolab_colormap::{
    auto_params, save_classified_png, save_masked_png, symmetric_params, ColorScheme,
    ColormapParams,
};
use geolab_core::io::{read_geotiff_bands, read_geotiff_masked, with_raster};
use geolab_core::{ClassifiedRaster, MaskedRaster, MultiBandRaster, RasterMetadata};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "geolab")]
#[command(author, version, about = "Raster walkthroughs: elevation bins and NDVI change", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory that relative input paths are resolved against
    #[arg(long, global = true, default_value = ".")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show metadata and masked statistics of a raster file
    Info {
        /// Input raster file
        input: PathBuf,
    },
    /// Elevation pipeline: mask, convert units, bin, mask by class
    Elevation {
        /// Input DTM file
        input: PathBuf,
        /// Water/land threshold, in the raster's own unit
        #[arg(short, long)]
        threshold: f64,
        /// Unit the DTM is stored in (m or ft)
        #[arg(long, default_value = "m", value_parser = parse_unit)]
        from: LinearUnit,
        /// Unit to convert the DTM to (m or ft)
        #[arg(long, default_value = "ft", value_parser = parse_unit)]
        to: LinearUnit,
        /// Explicit conversion factor, overriding --from/--to
        #[arg(short, long)]
        factor: Option<f64>,
        /// Explicit bin boundaries, ascending (default: min,threshold,inf)
        #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true)]
        bins: Option<Vec<f64>>,
        /// Class kept by the derived mask
        #[arg(short, long, default_value = "2")]
        keep_class: u16,
        /// Write PNG renderings of each stage into this directory
        #[arg(long)]
        plot_dir: Option<PathBuf>,
    },
    /// Imagery pipeline: NDVI before and after, and their difference
    NdviChange {
        /// Multi-band image before the event
        #[arg(long)]
        pre: PathBuf,
        /// Multi-band image after the event
        #[arg(long)]
        post: PathBuf,
        /// 0-based index of the red band
        #[arg(long, default_value = "0")]
        red_band: usize,
        /// 0-based index of the near-infrared band
        #[arg(long, default_value = "3")]
        nir_band: usize,
        /// Exclude NDVI values outside [-1, 1] instead of failing
        #[arg(long)]
        lenient: bool,
        /// Absolute NDVI difference counted as significant change
        #[arg(long, default_value = "0.1")]
        change_threshold: f64,
        /// Write PNG renderings of each stage into this directory
        #[arg(long)]
        plot_dir: Option<PathBuf>,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn parse_unit(s: &str) -> std::result::Result<LinearUnit, String> {
    s.parse().map_err(|e: geolab_core::Error| e.to_string())
}

fn resolve(data_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        data_dir.join(path)
    }
}

fn read_masked(path: &Path) -> Result<(MaskedRaster, RasterMetadata)> {
    let pb = spinner("Reading raster...");
    let result = read_geotiff_masked(path, None)
        .with_context(|| format!("Failed to read {}", path.display()));
    pb.finish_and_clear();
    let (raster, meta) = result?;
    info!("Input: {} x {} ({})", meta.width, meta.height, meta.data_type);
    Ok((raster, meta))
}

fn read_image(path: &Path) -> Result<MultiBandRaster> {
    let pb = spinner("Reading image...");
    let result = read_geotiff_bands(path)
        .with_context(|| format!("Failed to read {}", path.display()));
    pb.finish_and_clear();
    let (image, meta) = result?;
    info!("Input: {} x {}, {} band(s)", meta.width, meta.height, meta.band_count);
    Ok(image)
}

fn print_stats(label: &str, raster: &MaskedRaster) {
    let stats = raster.statistics();
    let fmt = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{:.4}", v));
    println!(
        "{}: min {}  max {}  mean {}  ({} valid, {} masked)",
        label,
        fmt(stats.min),
        fmt(stats.max),
        fmt(stats.mean),
        stats.valid_count,
        stats.excluded_count
    );
}

fn print_histogram(raster: &MaskedRaster, bins: usize) -> Result<()> {
    let Some(hist) = raster.histogram(bins)? else {
        return Ok(());
    };
    for (edge, count) in hist.edges.windows(2).zip(&hist.counts) {
        println!("  [{:>12.4}, {:>12.4})  {}", edge[0], edge[1], count);
    }
    Ok(())
}

fn print_classes(label: &str, classes: &ClassifiedRaster) {
    println!(
        "{}: unique labels {:?} ({} boundaries)",
        label,
        classes.unique_labels(),
        classes.boundary_count()
    );
    for (class, count) in classes.class_counts() {
        println!("  class {}: {} cells", class, count);
    }
    let (rows, cols) = classes.shape();
    let out_of_range = (0..rows)
        .flat_map(|r| (0..cols).map(move |c| (r, c)))
        .filter(|&(r, c)| classes.has_data(r, c) && !classes.in_range(r, c))
        .count();
    if out_of_range > 0 {
        println!("  {} cell(s) with data fall outside the bins", out_of_range);
    }
    let excluded = classes.mask().excluded_count();
    if excluded > 0 {
        println!("  {} cell(s) without data", excluded);
    }
}

/// Saves stage renderings when a plot directory was given
struct Plotter {
    dir: Option<PathBuf>,
}

impl Plotter {
    fn new(dir: Option<PathBuf>) -> Result<Self> {
        if let Some(dir) = &dir {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        Ok(Self { dir })
    }

    fn masked(&self, name: &str, raster: &MaskedRaster, params: &ColormapParams) -> Result<()> {
        if let Some(dir) = &self.dir {
            let path = dir.join(name);
            save_masked_png(&path, raster, params)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Plot: {}", path.display());
        }
        Ok(())
    }

    fn classified(&self, name: &str, classes: &ClassifiedRaster) -> Result<()> {
        if let Some(dir) = &self.dir {
            let path = dir.join(name);
            save_classified_png(&path, classes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Plot: {}", path.display());
        }
        Ok(())
    }
}

// ─── Pipelines ──────────────────────────────────────────────────────────

fn run_info(path: &Path) -> Result<()> {
    let (meta, raster) = with_raster(path, |src| {
        Ok((src.metadata().clone(), src.read_band_masked(0)?))
    })
    .with_context(|| format!("Failed to read {}", path.display()))?;

    println!("File: {}", path.display());
    println!("{}", meta);
    let bounds = meta.transform.bounds(meta.width, meta.height);
    println!(
        "bounds: ({:.6}, {:.6}) - ({:.6}, {:.6})",
        bounds.0, bounds.1, bounds.2, bounds.3
    );
    println!();
    print_stats("Band 0", &raster);
    print_histogram(&raster, 10)
}

fn run_elevation(
    path: &Path,
    threshold: f64,
    units: (LinearUnit, LinearUnit),
    factor: Option<f64>,
    bins: Option<Vec<f64>>,
    keep_class: u16,
    plots: &Plotter,
) -> Result<()> {
    let (from, to) = units;
    let (dtm, _) = read_masked(path)?;
    print_stats(&format!("DTM ({})", from), &dtm);
    print_histogram(&dtm, 5)?;
    let terrain = auto_params(&dtm, ColorScheme::Terrain);
    plots.masked("dtm.png", &dtm, &terrain)?;

    let start = Instant::now();
    let factor = factor.unwrap_or_else(|| from.factor_to(to));
    info!("Converting {} -> {} (x{})", from, to, factor);
    let converted = convert_units(&dtm, factor).context("Failed to convert units")?;
    print_stats(&format!("DTM ({})", to), &converted);
    plots.masked(
        "dtm_converted.png",
        &converted,
        &auto_params(&converted, ColorScheme::Terrain),
    )?;

    let bins = match bins {
        Some(bins) => bins,
        None => {
            let Some(min) = dtm.statistics().min else {
                bail!("{} has no valid cells to classify", path.display());
            };
            vec![min, threshold, f64::INFINITY]
        }
    };
    info!("Bins: {:?}", bins);
    let classes = reclassify(&dtm, &bins).context("Failed to reclassify")?;
    print_classes("Classes", &classes);
    plots.classified("classes.png", &classes)?;

    let mask = class_mask(&classes, keep_class).context("Failed to build class mask")?;
    println!("Mask keeps {} cell(s) of class {}", mask.kept_count(), keep_class);
    let kept = apply_mask(&dtm, &mask).context("Failed to apply mask")?;
    print_stats(&format!("DTM (class {} only)", keep_class), &kept);
    plots.masked(
        "mask.png",
        mask.as_masked(),
        &ColormapParams::with_range(ColorScheme::Grayscale, 0.0, 1.0),
    )?;
    plots.masked("dtm_masked.png", &kept, &terrain)?;

    info!("Processing time: {:.2?}", start.elapsed());
    Ok(())
}

fn run_ndvi_change(
    pre: &Path,
    post: &Path,
    layout: BandLayout,
    lenient: bool,
    change_threshold: f64,
    plots: &Plotter,
) -> Result<()> {
    let params = if lenient {
        IndexParams::lenient()
    } else {
        IndexParams::default()
    };

    let pre_image = read_image(pre)?;
    let post_image = read_image(post)?;

    let start = Instant::now();
    let ndvi_pre = ndvi_from_image(&pre_image, layout, &params)
        .with_context(|| format!("Failed to calculate NDVI for {}", pre.display()))?;
    let ndvi_post = ndvi_from_image(&post_image, layout, &params)
        .with_context(|| format!("Failed to calculate NDVI for {}", post.display()))?;
    print_stats("NDVI (pre)", &ndvi_pre);
    print_stats("NDVI (post)", &ndvi_post);
    plots.masked("ndvi_pre.png", &ndvi_pre, &ColormapParams::ndvi())?;
    plots.masked("ndvi_post.png", &ndvi_post, &ColormapParams::ndvi())?;

    let diff = index_difference(&ndvi_pre, &ndvi_post)
        .context("Failed to difference NDVI; are the images co-registered?")?;
    print_stats("NDVI difference", &diff);
    plots.masked(
        "ndvi_diff.png",
        &diff,
        &symmetric_params(&diff, ColorScheme::Divergent),
    )?;

    let thresholds = ChangeThresholds {
        decrease_threshold: -change_threshold.abs(),
        increase_threshold: change_threshold.abs(),
    };
    let change = classify_change(&diff, thresholds).context("Failed to classify change")?;
    print_classes("Change (1 = loss, 2 = stable, 3 = gain)", &change);
    plots.classified("ndvi_change.png", &change)?;

    info!("Processing time: {:.2?}", start.elapsed());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;
    let data_dir = cli.data_dir;

    match cli.command {
        Commands::Info { input } => run_info(&resolve(&data_dir, &input)),

        Commands::Elevation {
            input,
            threshold,
            from,
            to,
            factor,
            bins,
            keep_class,
            plot_dir,
        } => {
            let plots = Plotter::new(plot_dir)?;
            run_elevation(
                &resolve(&data_dir, &input),
                threshold,
                (from, to),
                factor,
                bins,
                keep_class,
                &plots,
            )
        }

        Commands::NdviChange {
            pre,
            post,
            red_band,
            nir_band,
            lenient,
            change_threshold,
            plot_dir,
        } => {
            let plots = Plotter::new(plot_dir)?;
            let layout = BandLayout {
                red: red_band,
                nir: nir_band,
            };
            run_ndvi_change(
                &resolve(&data_dir, &pre),
                &resolve(&data_dir, &post),
                layout,
                lenient,
                change_threshold,
                &plots,
            )
        }
    }
}
