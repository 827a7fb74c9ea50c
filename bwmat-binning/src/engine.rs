use std::collections::HashSet;

use indicatif::ProgressBar;
use log::{debug, info, warn};
use ndarray::{ArrayViewMut1, Axis};
use rayon::prelude::*;

use bwmat_core::Interval;

use crate::binner::{AggregateValue, Binner};
use crate::consts::DEFAULT_FETCH_CHUNK_SIZE;
use crate::coords::{BinSlot, CoordinateSpec};
use crate::errors::{BinningError, Result};
use crate::reader::TrackReader;
use crate::store::{ResultMatrix, ResultStore};

///
/// Drives the binning of every track over every chromosome of a [CoordinateSpec].
///
/// The engine owns the track readers; they are released when the engine is dropped, whether
/// or not binning succeeded.
///
/// Intervals are read from a track in bin-aligned chunks of about `chunk_size` bases, so a
/// whole chromosome never has to sit in memory as per-base values.
///
pub struct BinningEngine<R: TrackReader> {
    tracks: Vec<R>,
    coords: CoordinateSpec,
    binner: Binner,
    chunk_size: u32,
    progress: bool,
}

impl<R: TrackReader> BinningEngine<R> {
    pub fn new(tracks: Vec<R>, coords: CoordinateSpec, bin_size: u32) -> Result<Self> {
        if tracks.is_empty() {
            return Err(BinningError::NoTracks);
        }
        let binner = Binner::new(bin_size)?;

        let mut seen = HashSet::new();
        for track in tracks.iter() {
            if !seen.insert(track.name()) {
                warn!(
                    "Track name {} appears more than once; columns are still kept apart by position",
                    track.name()
                );
            }
        }

        Ok(BinningEngine {
            tracks,
            coords,
            binner,
            chunk_size: DEFAULT_FETCH_CHUNK_SIZE,
            progress: false,
        })
    }

    /// Bases fetched from a track at a time. Never less than one bin.
    pub fn with_chunk_size(mut self, bases: u32) -> Self {
        self.chunk_size = bases;
        self
    }

    /// Show a progress bar over chromosomes while binning.
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn track_names(&self) -> Vec<String> {
        self.tracks.iter().map(|t| t.name().to_string()).collect()
    }

    pub fn tracks(&self) -> &[R] {
        &self.tracks
    }

    pub fn coords(&self) -> &CoordinateSpec {
        &self.coords
    }

    pub fn bin_size(&self) -> u32 {
        self.binner.bin_size()
    }

    fn chunk_bins(&self) -> usize {
        ((self.chunk_size / self.bin_size()) as usize).max(1)
    }

    ///
    /// Bin every track over the intervals of `chrom`.
    ///
    /// Columns (tracks) are filled in parallel, and within a column every interval writes its
    /// own disjoint run of rows, also in parallel.
    ///
    pub fn bin_chrom(&self, chrom: &str) -> Result<ResultMatrix> {
        let layout = self
            .coords
            .layout(chrom, self.bin_size())
            .ok_or_else(|| BinningError::UnknownChromosome(chrom.to_string()))?;
        let slots = layout.slots().to_vec();

        let mut matrix = ResultMatrix::undefined(layout, self.tracks.len());
        debug!(
            "Allocated {} bins x {} tracks for {}",
            matrix.num_bins(),
            matrix.num_tracks(),
            chrom
        );

        matrix
            .values_mut()
            .axis_iter_mut(Axis(1))
            .into_par_iter()
            .zip(self.tracks.par_iter())
            .try_for_each(|(column, track)| self.fill_column(chrom, &slots, track, column))?;

        Ok(matrix)
    }

    fn fill_column(
        &self,
        chrom: &str,
        slots: &[BinSlot],
        track: &R,
        column: ArrayViewMut1<'_, AggregateValue>,
    ) -> Result<()> {
        let mut rest = column;
        let mut views = Vec::with_capacity(slots.len());
        for slot in slots {
            let (head, tail) = rest.split_at(Axis(0), slot.num_bins);
            rest = tail;
            if slot.num_bins > 0 {
                views.push((slot, head));
            }
        }

        views
            .into_par_iter()
            .try_for_each(|(slot, view)| self.fill_slot(chrom, slot, track, view))
    }

    fn fill_slot(
        &self,
        chrom: &str,
        slot: &BinSlot,
        track: &R,
        mut view: ArrayViewMut1<'_, AggregateValue>,
    ) -> Result<()> {
        let Some(window) = slot.window(self.bin_size()) else {
            return Ok(());
        };

        let bin_size = self.bin_size();
        let chunk_bins = self.chunk_bins();

        for (i, mut cells) in view.axis_chunks_iter_mut(Axis(0), chunk_bins).enumerate() {
            let start = window.start + (i * chunk_bins) as u32 * bin_size;
            let chunk = Interval::new(start, start + cells.len() as u32 * bin_size);

            let values = track.fetch(chrom, chunk)?;
            if values.len() != chunk.width() as usize {
                return Err(BinningError::TrackRead {
                    track: track.name().to_string(),
                    chrom: chrom.to_string(),
                    start: chunk.start,
                    end: chunk.end,
                    reason: format!(
                        "expected {} values, got {}",
                        chunk.width(),
                        values.len()
                    ),
                });
            }

            for (cell, value) in cells.iter_mut().zip(self.binner.bin(&values)) {
                *cell = value;
            }
        }
        Ok(())
    }

    ///
    /// Bin every chromosome of the coordinate specification, in parallel.
    ///
    /// The first error from any chromosome, track or interval aborts the run.
    ///
    pub fn bin_all(&self) -> Result<ResultStore> {
        let chroms: Vec<&String> = self.coords.chroms().collect();
        info!(
            "Binning {} tracks over {} chromosomes at {}bp",
            self.tracks.len(),
            chroms.len(),
            self.bin_size()
        );

        let bar = if self.progress {
            ProgressBar::new(chroms.len() as u64)
        } else {
            ProgressBar::hidden()
        };

        let matrices = chroms
            .par_iter()
            .map(|chrom| {
                let matrix = self.bin_chrom(chrom);
                bar.inc(1);
                matrix
            })
            .collect::<Result<Vec<_>>>()?;
        bar.finish_and_clear();

        let mut store = ResultStore::new(self.track_names(), self.bin_size());
        for matrix in matrices.iter() {
            info!(
                "Created {} matrix of shape {:?}",
                matrix.chrom(),
                matrix.values().dim()
            );
        }
        store.extend(matrices);

        Ok(store)
    }
}
