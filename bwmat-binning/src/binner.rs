use rayon::prelude::*;

use crate::errors::{BinningError, Result};

/// One bin's statistic: `None` marks a bin without (complete) data, never zero.
pub type AggregateValue = Option<f64>;

///
/// Mean of `values`, or `None` as soon as any value is undefined.
///
/// An empty slice has no mean and is undefined as well.
///
#[inline]
pub fn undefined_aware_mean(values: &[Option<f64>]) -> AggregateValue {
    if values.is_empty() {
        return None;
    }

    let mut sum = 0.0;
    for value in values {
        sum += (*value)?;
    }
    Some(sum / values.len() as f64)
}

///
/// Reduces per-base values into fixed width bins.
///
/// Bins are laid out from the first value onward: every bin holds `bin_size` values except
/// possibly the last, which holds whatever is left.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binner {
    bin_size: usize,
}

impl Binner {
    pub fn new(bin_size: u32) -> Result<Self> {
        if bin_size == 0 {
            return Err(BinningError::InvalidBinSize(bin_size));
        }
        Ok(Binner {
            bin_size: bin_size as usize,
        })
    }

    pub fn bin_size(&self) -> u32 {
        self.bin_size as u32
    }

    /// `ceil(len / bin_size)`
    pub fn num_bins(&self, len: usize) -> usize {
        len.div_ceil(self.bin_size)
    }

    ///
    /// Bin `values`, one [undefined_aware_mean] per bin. Bins are reduced in parallel.
    ///
    pub fn bin(&self, values: &[Option<f64>]) -> Vec<AggregateValue> {
        values
            .par_chunks(self.bin_size)
            .map(undefined_aware_mean)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    fn defined(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[rstest]
    fn test_zero_bin_size_rejected() {
        assert!(matches!(
            Binner::new(0),
            Err(BinningError::InvalidBinSize(0))
        ));
    }

    #[rstest]
    fn test_alternating_values() {
        let binner = Binner::new(2).unwrap();
        let values = defined(&[0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0]);

        assert_eq!(binner.bin(&values), vec![Some(0.5); 5]);
    }

    #[rstest]
    fn test_undefined_poisons_bin() {
        let binner = Binner::new(2).unwrap();
        let values = vec![
            Some(0.0),
            None,
            Some(0.0),
            Some(1.0),
            Some(2.0),
            Some(3.0),
            None,
            None,
            Some(0.0),
            Some(1.0),
        ];

        assert_eq!(
            binner.bin(&values),
            vec![None, Some(0.5), Some(2.5), None, Some(0.5)]
        );
    }

    #[rstest]
    fn test_short_last_bin_is_its_own_value() {
        let binner = Binner::new(2).unwrap();
        let values = defined(&[0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 4.0]);

        let binned = binner.bin(&values);
        assert_eq!(binned.len(), 4);
        assert_eq!(binned[3], Some(4.0));
    }

    #[rstest]
    #[case(0, 3, 0)]
    #[case(1, 3, 1)]
    #[case(3, 3, 1)]
    #[case(4, 3, 2)]
    #[case(10, 2, 5)]
    #[case(7, 2, 4)]
    #[case(1000, 1, 1000)]
    fn test_bin_count(#[case] len: usize, #[case] bin_size: u32, #[case] expected: usize) {
        let binner = Binner::new(bin_size).unwrap();
        let values = vec![Some(1.0); len];

        assert_eq!(binner.num_bins(len), expected);
        assert_eq!(binner.bin(&values).len(), expected);
    }

    #[rstest]
    fn test_bins_hold_bin_size_values_except_last() {
        // value i lives in bin i / 3, so bin means reveal which values each bin saw
        let binner = Binner::new(3).unwrap();
        let values: Vec<Option<f64>> = (0..11).map(|i| Some(i as f64)).collect();

        assert_eq!(
            binner.bin(&values),
            vec![Some(1.0), Some(4.0), Some(7.0), Some(9.5)]
        );
    }

    #[rstest]
    fn test_single_undefined_among_many() {
        let binner = Binner::new(100).unwrap();
        let mut values = vec![Some(2.0); 100];
        values[57] = None;

        assert_eq!(binner.bin(&values), vec![None]);
    }

    #[rstest]
    fn test_all_undefined_bin() {
        assert_eq!(undefined_aware_mean(&[None, None]), None);
        assert_eq!(undefined_aware_mean(&[]), None);
    }
}
