use std::fmt::{self, Display};
use std::fs::read_to_string;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_BIN_SIZE, DEFAULT_FETCH_CHUNK_SIZE, DEFAULT_TRACK_EXTENSIONS};
use crate::errors::{BinningError, Result};

/// Which axis of the written matrices holds the tracks.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MatrixOrientation {
    /// One row per bin, one column per track.
    #[default]
    BinsByTracks,
    /// One row per track, one column per bin.
    TracksByBins,
}

impl Display for MatrixOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatrixOrientation::BinsByTracks => write!(f, "bins-by-tracks"),
            MatrixOrientation::TracksByBins => write!(f, "tracks-by-bins"),
        }
    }
}

///
/// Run configuration for binning.
///
/// Every field has a default so a TOML file only needs the keys it wants to change:
///
/// ```toml
/// bin_size = 1000
/// threads = 8
/// chunk_size = 500000
/// track_extensions = ["bw"]
/// orientation = "tracks-by-bins"
/// ```
///
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BinningConfig {
    /// Bin width in base pairs.
    pub bin_size: u32,
    /// Worker threads; `None` uses every available core.
    pub threads: Option<usize>,
    /// Bases read from a track at a time; bounds memory on long intervals.
    pub chunk_size: u32,
    /// Extensions (without '.') picked up when scanning a tracks directory.
    pub track_extensions: Vec<String>,
    pub orientation: MatrixOrientation,
    /// Show a progress bar over chromosomes.
    pub progress: bool,
}

impl Default for BinningConfig {
    fn default() -> Self {
        BinningConfig {
            bin_size: DEFAULT_BIN_SIZE,
            threads: None,
            chunk_size: DEFAULT_FETCH_CHUNK_SIZE,
            track_extensions: DEFAULT_TRACK_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            orientation: MatrixOrientation::default(),
            progress: false,
        }
    }
}

impl BinningConfig {
    ///
    /// Load a configuration from a TOML file. Missing keys keep their defaults.
    ///
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = read_to_string(path)?;
        let config: BinningConfig =
            toml::from_str(&content).map_err(|source| BinningError::Config {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.bin_size == 0 {
            return Err(BinningError::InvalidBinSize(self.bin_size));
        }
        if self.chunk_size == 0 {
            return Err(BinningError::InvalidChunkSize(self.chunk_size));
        }
        Ok(())
    }

    ///
    /// Build the rayon pool binning runs in.
    ///
    pub fn thread_pool(&self) -> Result<rayon::ThreadPool> {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(threads) = self.threads {
            builder = builder.num_threads(threads);
        }
        Ok(builder.build()?)
    }
}
