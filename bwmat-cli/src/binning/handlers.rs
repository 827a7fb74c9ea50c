use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use log::{debug, info};

use bwmat_binning::consts::DEFAULT_BIN_SIZE;
use bwmat_binning::{
    BinningConfig, BinningEngine, CoordinateSpec, MatrixOrientation, open_tracks,
    write_result_store,
};
use bwmat_core::ChromSizes;
use bwmat_core::utils::find_paths_with_extensions;

///
/// Explicit track paths first, in the order given, followed by the sorted tracks found in
/// `tracks_dir`.
///
fn collect_track_paths<S: AsRef<str>>(
    explicit: Vec<PathBuf>,
    tracks_dir: Option<&Path>,
    extensions: &[S],
) -> Result<Vec<PathBuf>> {
    let mut paths = explicit;
    if let Some(dir) = tracks_dir {
        let found = find_paths_with_extensions(dir, extensions)
            .with_context(|| format!("Failed to scan tracks directory {}", dir.display()))?;
        debug!("Found {} tracks in {}", found.len(), dir.display());
        paths.extend(found);
    }

    if paths.is_empty() {
        bail!("No input tracks found");
    }
    Ok(paths)
}

fn load_chrom_sizes(matches: &ArgMatches) -> Result<ChromSizes> {
    let path = matches
        .get_one::<String>("chrom-sizes")
        .context("A chromosome sizes file is required.")?;

    ChromSizes::try_from(Path::new(path))
        .with_context(|| format!("Failed to load chromosome sizes from {}", path))
}

fn load_coords(matches: &ArgMatches, chrom_sizes: &ChromSizes) -> Result<CoordinateSpec> {
    match matches.get_one::<String>("coords") {
        Some(path) => CoordinateSpec::from_path(path, chrom_sizes)
            .with_context(|| format!("Failed to load coordinates from {}", path)),
        None => Ok(CoordinateSpec::full_chromosomes(chrom_sizes)),
    }
}

///
/// Configuration file values (or defaults) with command line flags applied on top.
///
fn resolve_config(matches: &ArgMatches) -> Result<BinningConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => BinningConfig::from_toml(path)
            .with_context(|| format!("Failed to load configuration from {}", path))?,
        None => BinningConfig::default(),
    };

    if let Some(&bin_size) = matches.get_one::<u32>("resolution") {
        config.bin_size = bin_size;
    }
    if let Some(&threads) = matches.get_one::<usize>("threads") {
        config.threads = Some(threads);
    }
    if matches.get_flag("transpose") {
        config.orientation = MatrixOrientation::TracksByBins;
    }
    if matches.get_flag("progress") {
        config.progress = true;
    }

    config.validate()?;
    Ok(config)
}

pub fn run_bin(matches: &ArgMatches) -> Result<()> {
    let config = resolve_config(matches)?;

    let out_dir = matches
        .get_one::<String>("out")
        .context("An output directory is required.")?;

    let explicit: Vec<PathBuf> = matches
        .get_many::<String>("track")
        .map(|values| values.map(PathBuf::from).collect())
        .unwrap_or_default();
    let tracks_dir = matches.get_one::<String>("tracks-dir").map(Path::new);
    let track_paths = collect_track_paths(explicit, tracks_dir, config.track_extensions.as_slice())?;

    let chrom_sizes = load_chrom_sizes(matches)?;
    let coords = load_coords(matches, &chrom_sizes)?;

    // every track is opened before any binning starts
    let tracks = open_tracks(&track_paths)?;
    let engine = BinningEngine::new(tracks, coords, config.bin_size)?
        .with_chunk_size(config.chunk_size)
        .with_progress(config.progress);

    let pool = config.thread_pool()?;
    let store = pool.install(|| engine.bin_all())?;
    info!("{}", store);

    write_result_store(&store, out_dir, config.orientation)
        .with_context(|| format!("Failed to write results to {}", out_dir))?;

    Ok(())
}

pub fn run_layout(matches: &ArgMatches) -> Result<()> {
    let bin_size = matches
        .get_one::<u32>("resolution")
        .copied()
        .unwrap_or(DEFAULT_BIN_SIZE);
    let config = BinningConfig {
        bin_size,
        ..Default::default()
    };
    config.validate()?;

    let chrom_sizes = load_chrom_sizes(matches)?;
    let coords = load_coords(matches, &chrom_sizes)?;

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    write_layout(&coords, bin_size, &mut writer)?;
    writer.flush()?;

    Ok(())
}

fn write_layout<W: Write>(coords: &CoordinateSpec, bin_size: u32, writer: &mut W) -> Result<()> {
    writeln!(writer, "chrom\tintervals\tbins")?;

    let mut total_bins = 0;
    for chrom in coords.chroms() {
        if let Some(layout) = coords.layout(chrom, bin_size) {
            writeln!(
                writer,
                "{}\t{}\t{}",
                chrom,
                layout.slots().len(),
                layout.total_bins()
            )?;
            total_bins += layout.total_bins();
        }
    }
    writeln!(writer, "total\t-\t{}", total_bins)?;

    Ok(())
}
