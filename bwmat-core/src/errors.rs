use std::path::PathBuf;

use thiserror::Error;

/// Error type for bwmat-core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A file could not be opened or read.
    #[error("Can't read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A line of a chrom sizes file did not hold `name<whitespace>length`.
    #[error("Malformed chrom sizes line {line} in {path}: '{content}'")]
    MalformedChromSizes {
        path: PathBuf,
        line: usize,
        content: String,
    },

    /// A chromosome length of zero was found.
    #[error("Chromosome {0} has a length of zero")]
    EmptyChromosome(String),

    /// The chrom sizes file held no chromosomes at all.
    #[error("No chromosomes found in {0}")]
    NoChromosomes(PathBuf),

    /// A path that should be a directory is not one.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias for bwmat-core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
