use std::collections::BTreeMap;
use std::fmt::{self, Display};

use ndarray::{Array2, ArrayView1, Axis};

use crate::binner::AggregateValue;
use crate::config::MatrixOrientation;
use crate::coords::ChromLayout;

///
/// Binned values of one chromosome: one row per bin, one column per track.
///
#[derive(Debug, Clone, PartialEq)]
pub struct ResultMatrix {
    layout: ChromLayout,
    values: Array2<AggregateValue>,
}

impl ResultMatrix {
    ///
    /// Allocate a `total_bins x num_tracks` matrix where every cell is undefined.
    ///
    pub fn undefined(layout: ChromLayout, num_tracks: usize) -> Self {
        let values = Array2::from_elem((layout.total_bins(), num_tracks), None);
        ResultMatrix { layout, values }
    }

    pub fn chrom(&self) -> &str {
        self.layout.chrom()
    }

    pub fn layout(&self) -> &ChromLayout {
        &self.layout
    }

    pub fn values(&self) -> &Array2<AggregateValue> {
        &self.values
    }

    pub(crate) fn values_mut(&mut self) -> &mut Array2<AggregateValue> {
        &mut self.values
    }

    pub fn num_bins(&self) -> usize {
        self.values.nrows()
    }

    pub fn num_tracks(&self) -> usize {
        self.values.ncols()
    }

    pub fn get(&self, bin: usize, track: usize) -> Option<AggregateValue> {
        self.values.get((bin, track)).copied()
    }

    /// All bins of one track.
    pub fn track_column(&self, track: usize) -> ArrayView1<'_, AggregateValue> {
        self.values.index_axis(Axis(1), track)
    }

    ///
    /// Plain `f64` copy for serialization, undefined cells become NaN.
    ///
    pub fn to_f64(&self, orientation: MatrixOrientation) -> Array2<f64> {
        let dense = self.values.mapv(|v| v.unwrap_or(f64::NAN));
        match orientation {
            MatrixOrientation::BinsByTracks => dense,
            MatrixOrientation::TracksByBins => dense.t().as_standard_layout().into_owned(),
        }
    }
}

///
/// Everything a binning run produced: a matrix per binned chromosome and the track labels in
/// column order.
///
#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    track_names: Vec<String>,
    bin_size: u32,
    matrices: BTreeMap<String, ResultMatrix>,
}

impl ResultStore {
    pub fn new(track_names: Vec<String>, bin_size: u32) -> Self {
        ResultStore {
            track_names,
            bin_size,
            matrices: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, matrix: ResultMatrix) {
        self.matrices.insert(matrix.chrom().to_string(), matrix);
    }

    /// Track labels; index `i` labels column `i` of every matrix.
    pub fn track_names(&self) -> &[String] {
        &self.track_names
    }

    pub fn bin_size(&self) -> u32 {
        self.bin_size
    }

    pub fn get(&self, chrom: &str) -> Option<&ResultMatrix> {
        self.matrices.get(chrom)
    }

    /// `(chromosome, matrix)` pairs in chromosome name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ResultMatrix)> {
        self.matrices.iter()
    }

    pub fn chroms(&self) -> impl Iterator<Item = &String> {
        self.matrices.keys()
    }

    pub fn len(&self) -> usize {
        self.matrices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }
}

impl Extend<ResultMatrix> for ResultStore {
    fn extend<T: IntoIterator<Item = ResultMatrix>>(&mut self, iter: T) {
        for matrix in iter {
            self.insert(matrix);
        }
    }
}

impl Display for ResultStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ResultStore with {} chromosomes x {} tracks at {}bp.",
            self.len(),
            self.track_names.len(),
            self.bin_size
        )
    }
}
