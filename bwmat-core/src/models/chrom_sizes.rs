use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt::{self, Display};
use std::io::BufRead;
use std::path::Path;

use crate::errors::{CoreError, Result};
use crate::utils::get_dynamic_reader;

///
/// Chromosome name to length (bp) table, iterated in name order.
///
/// Loaded once from a whitespace-delimited `name<whitespace>length` file and never mutated
/// afterwards.
///
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChromSizes {
    sizes: BTreeMap<String, u32>,
}

impl ChromSizes {
    ///
    /// Parse a chrom sizes table from any buffered reader.
    ///
    /// Blank lines are skipped and columns beyond the second are ignored. A later entry for a
    /// chromosome replaces an earlier one.
    ///
    /// # Arguments
    /// - reader: the reader to pull lines from
    /// - path: where the lines come from, only used for error messages
    pub fn from_reader<R: BufRead>(reader: R, path: &Path) -> Result<Self> {
        let mut sizes = BTreeMap::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|source| CoreError::FileRead {
                path: path.to_path_buf(),
                source,
            })?;

            if line.trim().is_empty() {
                continue;
            }

            let mut parts = line.split_whitespace();
            let malformed = || CoreError::MalformedChromSizes {
                path: path.to_path_buf(),
                line: idx + 1,
                content: line.clone(),
            };

            let name = parts.next().ok_or_else(malformed)?;
            let length = parts
                .next()
                .and_then(|s| s.parse::<u32>().ok())
                .ok_or_else(malformed)?;

            if length == 0 {
                return Err(CoreError::EmptyChromosome(name.to_string()));
            }

            sizes.insert(name.to_string(), length);
        }

        if sizes.is_empty() {
            return Err(CoreError::NoChromosomes(path.to_path_buf()));
        }

        Ok(ChromSizes { sizes })
    }

    pub fn get(&self, chrom: &str) -> Option<u32> {
        self.sizes.get(chrom).copied()
    }

    pub fn contains(&self, chrom: &str) -> bool {
        self.sizes.contains_key(chrom)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, u32> {
        self.sizes.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.sizes.keys()
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

impl TryFrom<&Path> for ChromSizes {
    type Error = CoreError;

    ///
    /// Read a chrom sizes file (optionally gzipped) from disk.
    ///
    fn try_from(value: &Path) -> Result<Self> {
        let reader = get_dynamic_reader(value)?;
        ChromSizes::from_reader(reader, value)
    }
}

impl TryFrom<&str> for ChromSizes {
    type Error = CoreError;

    fn try_from(value: &str) -> Result<Self> {
        ChromSizes::try_from(Path::new(value))
    }
}

impl FromIterator<(String, u32)> for ChromSizes {
    fn from_iter<T: IntoIterator<Item = (String, u32)>>(iter: T) -> Self {
        ChromSizes {
            sizes: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ChromSizes {
    type Item = (&'a String, &'a u32);
    type IntoIter = btree_map::Iter<'a, String, u32>;

    fn into_iter(self) -> Self::IntoIter {
        self.sizes.iter()
    }
}

impl Display for ChromSizes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChromSizes with {} chromosomes.", self.len())
    }
}
