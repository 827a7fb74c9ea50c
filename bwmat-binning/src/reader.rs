use std::collections::HashSet;
use std::fmt::{self, Display};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use bigtools::BigWigRead;
use bigtools::utils::reopen::ReopenableFile;
use log::debug;

use bwmat_core::Interval;
use bwmat_core::utils::track_display_name;

use crate::errors::{BinningError, Result};

///
/// A source of per-base signal values for one track.
///
/// Implementations are shared between every chromosome being binned at the same time, so
/// they must be safe to call from several threads at once.
///
pub trait TrackReader: Send + Sync {
    ///
    /// Label of the track in the written matrices.
    ///
    fn name(&self) -> &str;

    ///
    /// One value per base pair of `interval` on `chrom`; `None` where the track holds no data.
    ///
    /// The returned vector always has `interval.width()` entries.
    ///
    fn fetch(&self, chrom: &str, interval: Interval) -> Result<Vec<Option<f64>>>;
}

///
/// A bigWig track opened with bigtools.
///
/// bigtools readers need `&mut` access to query, so the handle sits behind a mutex: concurrent
/// chromosome tasks take turns on the file while the binning itself runs unlocked.
///
pub struct BigWigTrack {
    name: String,
    path: PathBuf,
    chroms: HashSet<String>,
    reader: Mutex<BigWigRead<ReopenableFile>>,
}

impl BigWigTrack {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let open_err = |reason: String| BinningError::TrackOpen {
            path: path.to_path_buf(),
            reason,
        };

        let path_str = path
            .to_str()
            .ok_or_else(|| open_err("path is not valid UTF-8".to_string()))?;
        let reader = BigWigRead::open_file(path_str).map_err(|e| open_err(e.to_string()))?;
        let chroms = reader.chroms().iter().map(|c| c.name.clone()).collect();

        let name = track_display_name(path);
        debug!("Opened track {} from {}", name, path.display());

        Ok(BigWigTrack {
            name,
            path: path.to_path_buf(),
            chroms,
            reader: Mutex::new(reader),
        })
    }

    /// Whether the file holds a chromosome called `chrom` at all.
    pub fn has_chrom(&self, chrom: &str) -> bool {
        self.chroms.contains(chrom)
    }

    fn read_error(&self, chrom: &str, interval: Interval, reason: impl Display) -> BinningError {
        BinningError::TrackRead {
            track: self.name.clone(),
            chrom: chrom.to_string(),
            start: interval.start,
            end: interval.end,
            reason: reason.to_string(),
        }
    }
}

impl TrackReader for BigWigTrack {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self, chrom: &str, interval: Interval) -> Result<Vec<Option<f64>>> {
        let mut values = vec![None; interval.width() as usize];

        if values.is_empty() {
            return Ok(values);
        }
        if !self.has_chrom(chrom) {
            debug!("Track {} has no data for {}", self.name, chrom);
            return Ok(values);
        }

        let mut reader = self
            .reader
            .lock()
            .map_err(|_| self.read_error(chrom, interval, "reader lock poisoned"))?;

        let records = reader
            .get_interval(chrom, interval.start, interval.end)
            .map_err(|e| self.read_error(chrom, interval, e))?;

        for record in records {
            let record = record.map_err(|e| self.read_error(chrom, interval, e))?;

            if record.value.is_nan() || !interval.overlap(record.start, record.end) {
                continue;
            }
            // clip to the requested interval
            let start = record.start.max(interval.start);
            let end = record.end.min(interval.end);

            let value = Some(record.value as f64);
            let offset = interval.start;
            values[(start - offset) as usize..(end - offset) as usize].fill(value);
        }

        Ok(values)
    }
}

impl fmt::Debug for BigWigTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BigWigTrack")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("chroms", &self.chroms.len())
            .finish_non_exhaustive()
    }
}

impl Drop for BigWigTrack {
    fn drop(&mut self) {
        debug!("Closing track {}", self.name);
    }
}

///
/// Open every track up front, failing on the first one that cannot be read.
///
/// Tracks keep the order of `paths`, which is their column order in the output.
///
pub fn open_tracks<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<BigWigTrack>> {
    if paths.is_empty() {
        return Err(BinningError::NoTracks);
    }
    paths.iter().map(BigWigTrack::open).collect()
}
