pub const DEFAULT_BIN_SIZE: u32 = 100;
// bases read from a track per fetch; rounded down to whole bins
pub const DEFAULT_FETCH_CHUNK_SIZE: u32 = 1_000_000;
pub const DEFAULT_TRACK_EXTENSIONS: [&str; 2] = ["bigWig", "bw"];

pub const MATRIX_FILE_EXT: &str = "npy";
pub const TRACK_MANIFEST_FILE: &str = "tracks.csv";
pub const BIN_METADATA_FILE: &str = "bins.json";
