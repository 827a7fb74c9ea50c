pub mod chrom_sizes;
pub mod interval;

// re-export for cleaner imports
pub use self::chrom_sizes::ChromSizes;
pub use self::interval::Interval;
