use std::collections::BTreeMap;
use std::fs::{File, create_dir_all};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};
use ndarray_npy::write_npy;
use serde::Serialize;

use crate::config::MatrixOrientation;
use crate::consts::{BIN_METADATA_FILE, MATRIX_FILE_EXT, TRACK_MANIFEST_FILE};
use crate::coords::ChromLayout;
use crate::errors::{BinningError, Result};
use crate::store::ResultStore;

#[derive(Serialize, Debug)]
struct SlotMetadata {
    start: u32,
    end: u32,
    first_bin: usize,
    num_bins: usize,
}

#[derive(Serialize, Debug)]
struct ChromMetadata {
    num_bins: usize,
    intervals: Vec<SlotMetadata>,
}

impl From<&ChromLayout> for ChromMetadata {
    fn from(layout: &ChromLayout) -> Self {
        ChromMetadata {
            num_bins: layout.total_bins(),
            intervals: layout
                .slots()
                .iter()
                .map(|slot| SlotMetadata {
                    start: slot.interval.start,
                    end: slot.interval.end,
                    first_bin: slot.first_bin,
                    num_bins: slot.num_bins,
                })
                .collect(),
        }
    }
}

#[derive(Serialize, Debug)]
struct BinMetadata<'a> {
    bin_size: u32,
    orientation: MatrixOrientation,
    tracks: &'a [String],
    chromosomes: BTreeMap<&'a str, ChromMetadata>,
}

/// Path of the matrix file written for `chrom`.
pub fn matrix_path(out_dir: &Path, chrom: &str) -> PathBuf {
    out_dir.join(format!("{}.{}", chrom, MATRIX_FILE_EXT))
}

///
/// Write a [ResultStore] to `out_dir`:
///
/// - `<chrom>.npy`: one `f64` matrix per binned chromosome, NaN where a bin is undefined
/// - `tracks.csv`: which track each matrix column (or row, when transposed) holds
/// - `bins.json`: bin size, orientation and the interval layout of every chromosome
///
/// The directory is created if it does not exist yet.
///
pub fn write_result_store<P: AsRef<Path>>(
    store: &ResultStore,
    out_dir: P,
    orientation: MatrixOrientation,
) -> Result<()> {
    let out_dir = out_dir.as_ref();
    if !out_dir.exists() {
        create_dir_all(out_dir)?;
        info!("Created output directory {}", out_dir.display());
    }

    for (chrom, matrix) in store.iter() {
        let path = matrix_path(out_dir, chrom);
        write_npy(&path, &matrix.to_f64(orientation)).map_err(|e| BinningError::MatrixWrite {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        debug!("Wrote {}", path.display());
    }

    write_track_manifest(store, &out_dir.join(TRACK_MANIFEST_FILE))?;
    write_bin_metadata(store, orientation, &out_dir.join(BIN_METADATA_FILE))?;

    info!("Wrote {} matrices to {}", store.len(), out_dir.display());
    Ok(())
}

fn write_track_manifest(store: &ResultStore, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "column,name")?;
    for (column, name) in store.track_names().iter().enumerate() {
        writeln!(writer, "{},{}", column, name)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_bin_metadata(
    store: &ResultStore,
    orientation: MatrixOrientation,
    path: &Path,
) -> Result<()> {
    let metadata = BinMetadata {
        bin_size: store.bin_size(),
        orientation,
        tracks: store.track_names(),
        chromosomes: store
            .iter()
            .map(|(chrom, matrix)| (chrom.as_str(), ChromMetadata::from(matrix.layout())))
            .collect(),
    };

    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, &metadata)?;
    Ok(())
}
