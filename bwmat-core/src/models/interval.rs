use std::cmp::Ordering;
use std::fmt::{self, Display};

/// Represent a range from [start, end)
/// Inclusive start, exclusive of end
#[derive(Eq, PartialEq, Hash, Debug, Clone, Copy)]
pub struct Interval {
    pub start: u32,
    pub end: u32,
}

impl Interval {
    pub fn new(start: u32, end: u32) -> Self {
        Interval { start, end }
    }

    ///
    /// Number of base pairs covered. Zero for empty or inverted intervals.
    ///
    #[inline]
    pub fn width(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width() == 0
    }

    /// Check if the interval overlaps [start, end)
    #[inline]
    pub fn overlap(&self, start: u32, end: u32) -> bool {
        self.start < end && self.end > start
    }
}

impl Ord for Interval {
    #[inline]
    fn cmp(&self, other: &Interval) -> Ordering {
        match self.start.cmp(&other.start) {
            Ordering::Equal => self.end.cmp(&other.end),
            ord => ord,
        }
    }
}

impl PartialOrd for Interval {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{})", self.start, self.end)
    }
}
