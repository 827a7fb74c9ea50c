//! Coordinate specification and the interval to bin-index arithmetic.
//!
//! Bins are anchored to the chromosome's global grid: bin `k` of a chromosome covers
//! `[k * bin_size, (k + 1) * bin_size)`. An interval only contributes the grid bins that lie
//! fully inside it, so partial leading and trailing fragments are dropped rather than padded.
//! The bins of a chromosome's intervals are then concatenated, in interval order, into a single
//! bin axis with no placeholders for the gaps between intervals.

use std::collections::{BTreeMap, HashSet};
use std::io::BufRead;
use std::ops::Range;
use std::path::{Path, PathBuf};

use bigtools::BigBedRead;
use log::{debug, info};

use bwmat_core::utils::{FileType, get_dynamic_reader, get_file_info};
use bwmat_core::{ChromSizes, Interval};

use crate::errors::{BinningError, Result};

///
/// Number of whole grid bins inside `[start, end)`: `floor(end / bin_size) - ceil(start / bin_size)`.
///
/// Saturates at zero, so empty or inverted intervals contribute no bins.
///
#[inline]
pub fn bins_in_interval(start: u32, end: u32, bin_size: u32) -> usize {
    let first = start.div_ceil(bin_size);
    let last = end / bin_size;
    last.saturating_sub(first) as usize
}

/// One interval's place on a chromosome's concatenated bin axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinSlot {
    pub interval: Interval,
    /// Row of the first bin of this interval in the chromosome matrix.
    pub first_bin: usize,
    /// Bins contributed by this interval (see [bins_in_interval]).
    pub num_bins: usize,
    /// Index of the first bin on the chromosome's global grid.
    pub grid_bin: u32,
}

impl BinSlot {
    /// Rows of the chromosome matrix this interval fills.
    pub fn bin_range(&self) -> Range<usize> {
        self.first_bin..self.first_bin + self.num_bins
    }

    ///
    /// Grid-aligned part of the interval that the bins summarise, `None` when it holds no
    /// whole bin.
    ///
    pub fn window(&self, bin_size: u32) -> Option<Interval> {
        if self.num_bins == 0 {
            return None;
        }
        let start = self.grid_bin * bin_size;
        Some(Interval::new(start, start + self.num_bins as u32 * bin_size))
    }
}

///
/// The bin axis of one chromosome: every interval with its starting bin offset, plus the
/// total number of bins (the matrix height).
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromLayout {
    chrom: String,
    bin_size: u32,
    slots: Vec<BinSlot>,
    total_bins: usize,
}

impl ChromLayout {
    pub fn new(chrom: &str, intervals: &[Interval], bin_size: u32) -> Self {
        let mut slots = Vec::with_capacity(intervals.len());
        let mut offset = 0;

        for interval in intervals {
            let num_bins = bins_in_interval(interval.start, interval.end, bin_size);
            slots.push(BinSlot {
                interval: *interval,
                first_bin: offset,
                num_bins,
                grid_bin: interval.start.div_ceil(bin_size),
            });
            offset += num_bins;
        }

        ChromLayout {
            chrom: chrom.to_string(),
            bin_size,
            slots,
            total_bins: offset,
        }
    }

    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    pub fn bin_size(&self) -> u32 {
        self.bin_size
    }

    pub fn slots(&self) -> &[BinSlot] {
        &self.slots
    }

    pub fn total_bins(&self) -> usize {
        self.total_bins
    }
}

///
/// Ordered intervals to bin over, per chromosome.
///
/// Built once before binning and never changed afterwards. Chromosomes without any interval
/// are simply not present.
///
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoordinateSpec {
    intervals: BTreeMap<String, Vec<Interval>>,
}

impl CoordinateSpec {
    ///
    /// One `[0, length)` interval for every chromosome in the size table.
    ///
    pub fn full_chromosomes(chrom_sizes: &ChromSizes) -> Self {
        let intervals: BTreeMap<String, Vec<Interval>> = chrom_sizes
            .iter()
            .map(|(chrom, &len)| (chrom.clone(), vec![Interval::new(0, len)]))
            .collect();

        for (chrom, chrom_intervals) in intervals.iter() {
            log_intervals(chrom, chrom_intervals);
        }

        CoordinateSpec { intervals }
    }

    ///
    /// Restrict binning to the intervals found in `path`, a bigBed or a (gzipped) BED file.
    ///
    /// Chromosomes of the size table without intervals in the file are left out; intervals on
    /// chromosomes the size table does not know are ignored.
    ///
    pub fn from_path<P: AsRef<Path>>(path: P, chrom_sizes: &ChromSizes) -> Result<Self> {
        let path = path.as_ref();
        let spec = match get_file_info(path).file_type {
            FileType::BIGBED => Self::from_bigbed(path, chrom_sizes)?,
            FileType::BED => Self::from_bed(path, chrom_sizes)?,
            _ => {
                return Err(BinningError::CoordinateSource {
                    path: path.to_path_buf(),
                    reason: "expected a .bb/.bigBed or .bed/.bed.gz file".to_string(),
                });
            }
        };

        let skipped = chrom_sizes.len() - spec.len();
        if skipped > 0 {
            info!(
                "{} of {} chromosomes have no intervals in {} and will not be binned",
                skipped,
                chrom_sizes.len(),
                path.display()
            );
        }

        Ok(spec)
    }

    ///
    /// Read the restriction intervals from a bigBed file, querying each chromosome of the size
    /// table over its full length.
    ///
    pub fn from_bigbed<P: AsRef<Path>>(path: P, chrom_sizes: &ChromSizes) -> Result<Self> {
        let path = path.as_ref();
        let source_err = |reason: String| BinningError::CoordinateSource {
            path: path.to_path_buf(),
            reason,
        };

        let path_str = path
            .to_str()
            .ok_or_else(|| source_err("path is not valid UTF-8".to_string()))?;
        let mut bigbed = BigBedRead::open_file(path_str)
            .map_err(|e| source_err(format!("not a readable bigBed file ({})", e)))?;

        let bigbed_chroms: HashSet<String> =
            bigbed.chroms().iter().map(|c| c.name.clone()).collect();

        let mut intervals = BTreeMap::new();
        for (chrom, &len) in chrom_sizes {
            if !bigbed_chroms.contains(chrom) {
                continue;
            }

            let chrom_intervals = bigbed
                .get_interval(chrom, 0, len)
                .map_err(|e| source_err(format!("{}: {}", chrom, e)))?
                .map(|entry| entry.map(|e| Interval::new(e.start, e.end)))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| source_err(format!("{}: {}", chrom, e)))?;

            if !chrom_intervals.is_empty() {
                log_intervals(chrom, &chrom_intervals);
                intervals.insert(chrom.clone(), chrom_intervals);
            }
        }

        Ok(CoordinateSpec { intervals })
    }

    ///
    /// Read the restriction intervals from a BED-like text file (first three columns).
    ///
    /// Comment, `track` and `browser` lines are skipped. Intervals keep their file order within
    /// each chromosome.
    ///
    pub fn from_bed<P: AsRef<Path>>(path: P, chrom_sizes: &ChromSizes) -> Result<Self> {
        let path = path.as_ref();
        let reader = get_dynamic_reader(path)?;
        Self::from_bed_reader(reader, path, chrom_sizes)
    }

    fn from_bed_reader<R: BufRead>(
        reader: R,
        path: &Path,
        chrom_sizes: &ChromSizes,
    ) -> Result<Self> {
        let mut intervals: BTreeMap<String, Vec<Interval>> = BTreeMap::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty()
                || trimmed.starts_with('#')
                || trimmed.starts_with("track")
                || trimmed.starts_with("browser")
            {
                continue;
            }

            let (chrom, interval) =
                parse_bed_line(trimmed).ok_or_else(|| BinningError::CoordinateSource {
                    path: PathBuf::from(path),
                    reason: format!("line {} is not a valid BED record: '{}'", idx + 1, line),
                })?;

            if chrom_sizes.contains(chrom) {
                intervals
                    .entry(chrom.to_string())
                    .or_default()
                    .push(interval);
            }
        }

        for (chrom, chrom_intervals) in intervals.iter() {
            log_intervals(chrom, chrom_intervals);
        }

        Ok(CoordinateSpec { intervals })
    }

    pub fn get(&self, chrom: &str) -> Option<&[Interval]> {
        self.intervals.get(chrom).map(|v| v.as_slice())
    }

    pub fn chroms(&self) -> impl Iterator<Item = &String> {
        self.intervals.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<Interval>)> {
        self.intervals.iter()
    }

    pub fn contains(&self, chrom: &str) -> bool {
        self.intervals.contains_key(chrom)
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    ///
    /// Bin axis of `chrom` at `bin_size`, `None` if the chromosome is not being binned.
    ///
    pub fn layout(&self, chrom: &str, bin_size: u32) -> Option<ChromLayout> {
        self.get(chrom)
            .map(|intervals| ChromLayout::new(chrom, intervals, bin_size))
    }
}

impl FromIterator<(String, Vec<Interval>)> for CoordinateSpec {
    /// Chromosomes with an empty interval list are dropped.
    fn from_iter<T: IntoIterator<Item = (String, Vec<Interval>)>>(iter: T) -> Self {
        let intervals = iter
            .into_iter()
            .filter(|(_, intervals)| !intervals.is_empty())
            .collect();
        CoordinateSpec { intervals }
    }
}

fn parse_bed_line(line: &str) -> Option<(&str, Interval)> {
    let mut fields = line.split_whitespace();
    let chrom = fields.next()?;
    let start = fields.next()?.parse::<u32>().ok()?;
    let end = fields.next()?.parse::<u32>().ok()?;
    Some((chrom, Interval::new(start, end)))
}

fn log_intervals(chrom: &str, intervals: &[Interval]) {
    debug!(
        "{} intervals for {}: {{ {} }}",
        intervals.len(),
        chrom,
        intervals
            .iter()
            .map(|iv| iv.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::io::Cursor;

    #[fixture]
    fn chrom_sizes() -> ChromSizes {
        vec![
            ("chr1".to_string(), 10),
            ("chr2".to_string(), 4),
            ("chr3".to_string(), 7),
        ]
        .into_iter()
        .collect()
    }

    #[rstest]
    #[case(0, 10, 2, 5)]
    #[case(0, 7, 2, 3)]
    #[case(1, 10, 2, 4)]
    #[case(1, 9, 2, 3)]
    #[case(3, 5, 2, 0)]
    #[case(3, 4, 2, 0)]
    #[case(0, 1, 2, 0)]
    #[case(100, 350, 100, 2)]
    #[case(150, 250, 100, 0)]
    #[case(5, 5, 2, 0)]
    #[case(8, 2, 2, 0)]
    fn test_bins_in_interval(
        #[case] start: u32,
        #[case] end: u32,
        #[case] bin_size: u32,
        #[case] expected: usize,
    ) {
        assert_eq!(bins_in_interval(start, end, bin_size), expected);
    }

    #[rstest]
    fn test_bins_in_interval_full_chromosome_is_floor() {
        for bin_size in 1..=13u32 {
            for len in 1..=200u32 {
                assert_eq!(bins_in_interval(0, len, bin_size), (len / bin_size) as usize);
            }
        }
    }

    #[rstest]
    fn test_bins_in_interval_matches_float_formula() {
        for bin_size in 1..=9u32 {
            for start in 0..40u32 {
                for end in start + 1..60u32 {
                    let expected = (end as f64 / bin_size as f64).floor()
                        - (start as f64 / bin_size as f64).ceil();
                    assert!(expected >= 0.0 || end - start < bin_size);
                    assert_eq!(
                        bins_in_interval(start, end, bin_size),
                        expected.max(0.0) as usize
                    );
                }
            }
        }
    }

    #[rstest]
    fn test_layout_offsets_are_gapless() {
        let intervals = vec![
            Interval::new(0, 7),
            Interval::new(9, 10),
            Interval::new(13, 30),
            Interval::new(31, 33),
            Interval::new(40, 52),
        ];
        let layout = ChromLayout::new("chr1", &intervals, 3);

        let mut next = 0;
        for slot in layout.slots() {
            assert_eq!(slot.bin_range().start, next);
            next = slot.bin_range().end;
        }
        assert_eq!(next, layout.total_bins());
        assert_eq!(
            layout
                .slots()
                .iter()
                .map(|s| s.num_bins)
                .collect::<Vec<_>>(),
            vec![2, 0, 5, 0, 3]
        );
    }

    #[rstest]
    fn test_layout_contiguous_split_matches_whole() {
        let whole = ChromLayout::new("chr1", &[Interval::new(0, 10)], 2);
        let split = ChromLayout::new("chr1", &[Interval::new(0, 4), Interval::new(4, 10)], 2);

        assert_eq!(whole.total_bins(), 5);
        assert_eq!(split.total_bins(), whole.total_bins());
        assert_eq!(split.slots()[1].first_bin, 2);
        assert_eq!(split.slots()[1].grid_bin, 2);
    }

    #[rstest]
    fn test_slot_window_is_grid_aligned() {
        let layout = ChromLayout::new("chr1", &[Interval::new(3, 20), Interval::new(21, 23)], 4);
        let slots = layout.slots();

        assert_eq!(slots[0].window(4), Some(Interval::new(4, 20)));
        assert_eq!(slots[0].num_bins, 4);
        assert_eq!(slots[1].window(4), None);
    }

    #[rstest]
    fn test_full_chromosomes(chrom_sizes: ChromSizes) {
        let spec = CoordinateSpec::full_chromosomes(&chrom_sizes);

        assert_eq!(spec.len(), 3);
        assert_eq!(spec.get("chr3"), Some(&[Interval::new(0, 7)][..]));
        assert_eq!(spec.layout("chr3", 2).unwrap().total_bins(), 3);
        assert_eq!(spec.layout("chrX", 2), None);
    }

    #[rstest]
    fn test_bed_restriction_excludes_uncovered_chromosomes(chrom_sizes: ChromSizes) {
        let bed = "track name=coords\n\
                   # comment\n\
                   chr1\t6\t10\tpeak_b\n\
                   chr1\t0\t4\tpeak_a\n\
                   chrUn\t0\t100\n\
                   chr3\t2\t6\n";
        let spec =
            CoordinateSpec::from_bed_reader(Cursor::new(bed), Path::new("coords.bed"), &chrom_sizes)
                .unwrap();

        assert_eq!(spec.chroms().collect::<Vec<_>>(), vec!["chr1", "chr3"]);
        // source order is kept
        assert_eq!(
            spec.get("chr1").unwrap(),
            &[Interval::new(6, 10), Interval::new(0, 4)]
        );
        assert!(!spec.contains("chr2"));
        assert!(!spec.contains("chrUn"));
    }

    #[rstest]
    fn test_bed_restriction_bad_line(chrom_sizes: ChromSizes) {
        let bed = "chr1\t0\t4\nchr1\tzero\t4\n";
        let err =
            CoordinateSpec::from_bed_reader(Cursor::new(bed), Path::new("coords.bed"), &chrom_sizes)
                .unwrap_err();

        match err {
            BinningError::CoordinateSource { reason, .. } => assert!(reason.contains("line 2")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[rstest]
    fn test_unknown_coordinate_file_type(chrom_sizes: ChromSizes) {
        let err = CoordinateSpec::from_path("coords.txt", &chrom_sizes).unwrap_err();
        assert!(matches!(err, BinningError::CoordinateSource { .. }));
    }

    #[rstest]
    fn test_from_iter_drops_empty(chrom_sizes: ChromSizes) {
        let spec: CoordinateSpec = chrom_sizes
            .iter()
            .map(|(chrom, _)| {
                let ivs = if chrom == "chr2" {
                    vec![]
                } else {
                    vec![Interval::new(0, 2)]
                };
                (chrom.clone(), ivs)
            })
            .collect();
        assert_eq!(spec.len(), 2);
        assert!(!spec.contains("chr2"));
    }
}
