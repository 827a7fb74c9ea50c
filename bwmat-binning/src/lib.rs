//! # bwmat-binning
//!
//! Turns bigWig signal tracks into fixed-resolution, per-chromosome matrices ready to be fed
//! to machine learning models.
//!
//! ## Main Components
//!
//! - **`CoordinateSpec`**: which intervals of which chromosomes get binned
//! - **`Binner`**: reduces per-base values into bin means, treating missing data as undefined
//! - **`TrackReader`**: per-base value source; `BigWigTrack` reads bigWig files
//! - **`BinningEngine`**: fills one `bins x tracks` matrix per chromosome, in parallel
//! - **`write_result_store`**: writes the matrices as `.npy` files plus their metadata
//!
//! ## Example
//!
//! ```rust,no_run
//! use bwmat_binning::{BinningEngine, CoordinateSpec, MatrixOrientation, open_tracks, write_result_store};
//! use bwmat_core::ChromSizes;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let chrom_sizes = ChromSizes::try_from("hg38.chrom.sizes")?;
//! let coords = CoordinateSpec::full_chromosomes(&chrom_sizes);
//! let tracks = open_tracks(&["h3k27ac.bw", "atac.bw"])?;
//!
//! let engine = BinningEngine::new(tracks, coords, 1000)?;
//! let store = engine.bin_all()?;
//! write_result_store(&store, "matrices/", MatrixOrientation::BinsByTracks)?;
//! # Ok(())
//! # }
//! ```
pub mod binner;
pub mod config;
pub mod consts;
pub mod coords;
pub mod engine;
pub mod errors;
pub mod reader;
pub mod store;
pub mod writing;

pub use binner::{AggregateValue, Binner};
pub use config::{BinningConfig, MatrixOrientation};
pub use coords::{ChromLayout, CoordinateSpec, bins_in_interval};
pub use engine::BinningEngine;
pub use errors::{BinningError, Result};
pub use reader::{BigWigTrack, TrackReader, open_tracks};
pub use store::{ResultMatrix, ResultStore};
pub use writing::write_result_store;
