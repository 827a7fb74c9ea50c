use std::path::PathBuf;

use thiserror::Error;

use bwmat_core::CoreError;

/// Error type for everything that can go wrong while binning tracks.
#[derive(Error, Debug)]
pub enum BinningError {
    /// Bin sizes must be at least one base pair.
    #[error("Bin size must be a positive integer, got {0}")]
    InvalidBinSize(u32),

    #[error("Fetch chunk size must be a positive integer, got {0}")]
    InvalidChunkSize(u32),

    /// Nothing to bin.
    #[error("No input tracks found")]
    NoTracks,

    /// A bigWig could not be opened.
    #[error("Failed to open track {path}: {reason}")]
    TrackOpen { path: PathBuf, reason: String },

    /// Reading values from an opened track failed.
    #[error("Failed to read {chrom}:{start}-{end} from track {track}: {reason}")]
    TrackRead {
        track: String,
        chrom: String,
        start: u32,
        end: u32,
        reason: String,
    },

    /// The interval restriction file could not be used.
    #[error("Bad coordinates file {path}: {reason}")]
    CoordinateSource { path: PathBuf, reason: String },

    /// A chromosome was asked for that has no intervals to bin.
    #[error("Chromosome {0} is not part of the coordinate specification")]
    UnknownChromosome(String),

    /// Configuration file could not be parsed.
    #[error("Invalid configuration file {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Worker thread pool could not be built.
    #[error("Failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Failed to write matrix {path}: {reason}")]
    MatrixWrite { path: PathBuf, reason: String },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias for bwmat-binning operations.
pub type Result<T> = std::result::Result<T, BinningError>;
