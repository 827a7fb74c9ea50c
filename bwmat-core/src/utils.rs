use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use flate2::read::MultiGzDecoder;

use crate::errors::{CoreError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum FileType {
    BIGWIG,
    BIGBED,
    BED,
    UNKNOWN, // anything we do not know how to read
}

impl FromStr for FileType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bw" | "bigwig" => Ok(FileType::BIGWIG),
            "bb" | "bigbed" => Ok(FileType::BIGBED),
            "bed" => Ok(FileType::BED),
            _ => Ok(FileType::UNKNOWN),
        }
    }
}

pub struct FileInfo {
    pub file_type: FileType,
    pub is_gzipped: bool,
}

pub fn get_file_info(path: &Path) -> FileInfo {
    let mut file_type = FileType::UNKNOWN;
    let mut is_gzipped = false;

    if let Some(filename) = path.file_name().and_then(OsStr::to_str) {
        if let Some(base_filename) = filename.strip_suffix(".gz") {
            is_gzipped = true;
            // the extension before .gz decides the type
            if let Some(ext) = Path::new(base_filename).extension().and_then(OsStr::to_str) {
                file_type = FileType::from_str(ext).unwrap_or(FileType::UNKNOWN);
            }
        } else if let Some(ext) = path.extension().and_then(OsStr::to_str) {
            file_type = FileType::from_str(ext).unwrap_or(FileType::UNKNOWN);
        }
    }

    FileInfo {
        file_type,
        is_gzipped,
    }
}

///
/// Get a reader for either a gzip'd or non-gzip'd file.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> Result<BufReader<Box<dyn Read>>> {
    let is_gzipped = get_file_info(path).is_gzipped;
    let file = File::open(path).map_err(|source| CoreError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let file: Box<dyn Read> = match is_gzipped {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    Ok(BufReader::new(file))
}

///
/// Find all files in a directory whose extension is one of `extensions`.
///
/// _Note_: __not__ recursive. Extensions are given without the leading '.', matched
/// case-sensitively, and the returned paths are sorted so the result does not depend on
/// directory iteration order.
///
/// # Arguments
/// - search_dir: the directory to search
/// - extensions: the extensions to keep, e.g. `["bigWig", "bw"]`
pub fn find_paths_with_extensions<P: AsRef<Path>, S: AsRef<str>>(
    search_dir: P,
    extensions: &[S],
) -> Result<Vec<PathBuf>> {
    let search_dir = search_dir.as_ref();
    if !search_dir.is_dir() {
        return Err(CoreError::NotADirectory(search_dir.to_path_buf()));
    }

    let mut match_paths = Vec::new();
    for entry in std::fs::read_dir(search_dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| extensions.iter().any(|e| e.as_ref() == ext));
        if matches {
            match_paths.push(path);
        }
    }

    match_paths.sort();
    Ok(match_paths)
}

///
/// Display name of a track: its file name without the final extension.
///
/// `data/H3K27ac.bigWig` becomes `H3K27ac`; `data/rep1.fc.bw` becomes `rep1.fc`.
///
pub fn track_display_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}
