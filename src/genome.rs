//! Chromosome length table.
//!
//! Chromosomes are addressed by 1-based index. The default table is the
//! 16-chromosome reference configuration; a table can also be loaded from a
//! genome file (tab-delimited: name\tlength), where line order gives the
//! index.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{PipelineError, Result};

/// Reference lengths for chromosomes 1..=16.
pub const REFERENCE_LENGTHS: [u64; 16] = [
    230208, 813178, 316617, 1531919, 576869, 270148, 1090947, 562643, 439885, 745741, 666454,
    1078175, 924429, 784334, 1091289, 948062,
];

/// Ordered chromosome lengths, passed explicitly to the coverage stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromosomeLengths {
    lengths: Vec<u64>,
}

impl Default for ChromosomeLengths {
    fn default() -> Self {
        Self::new(REFERENCE_LENGTHS.to_vec())
    }
}

impl ChromosomeLengths {
    pub fn new(lengths: Vec<u64>) -> Self {
        Self { lengths }
    }

    /// Load lengths from a genome file. The name column is ignored apart
    /// from documentation purposes; the n-th data line is chromosome n.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| PipelineError::unavailable(path, e))?;
        let reader = BufReader::new(file);
        let mut lengths = Vec::new();

        for (line_num, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 2 {
                return Err(PipelineError::Parse {
                    line: line_num + 1,
                    message: "Genome file requires two columns: chrom and size".to_string(),
                });
            }

            let size: u64 = fields[1].trim().parse().map_err(|_| PipelineError::Parse {
                line: line_num + 1,
                message: format!("Invalid chromosome size: {}", fields[1]),
            })?;
            lengths.push(size);
        }

        if lengths.is_empty() {
            return Err(PipelineError::InvalidFormat(format!(
                "genome file {} lists no chromosomes",
                path.display()
            )));
        }

        Ok(Self { lengths })
    }

    /// Length of chromosome `number` (1-based).
    #[inline]
    pub fn length(&self, number: u64) -> Option<u64> {
        let idx = usize::try_from(number).ok()?.checked_sub(1)?;
        self.lengths.get(idx).copied()
    }

    /// Zero-based slot for a 1-based chromosome number, if it is in the table.
    #[inline]
    pub fn slot(&self, number: u64) -> Option<usize> {
        let idx = usize::try_from(number).ok()?.checked_sub(1)?;
        (idx < self.lengths.len()).then_some(idx)
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.lengths
    }

    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    /// Sum of all chromosome lengths.
    pub fn total(&self) -> u64 {
        self.lengths.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_table() {
        let lengths = ChromosomeLengths::default();
        assert_eq!(lengths.len(), 16);
        assert_eq!(lengths.length(1), Some(230208));
        assert_eq!(lengths.length(16), Some(948062));
        assert_eq!(lengths.length(0), None);
        assert_eq!(lengths.length(17), None);
    }

    #[test]
    fn test_slot_is_zero_based() {
        let lengths = ChromosomeLengths::new(vec![10, 20]);
        assert_eq!(lengths.slot(1), Some(0));
        assert_eq!(lengths.slot(2), Some(1));
        assert_eq!(lengths.slot(3), None);
        assert_eq!(lengths.slot(0), None);
    }

    #[test]
    fn test_from_file_preserves_order() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "chrI\t1000").unwrap();
        writeln!(file, "# comment line").unwrap();
        writeln!(file, "chrII\t500").unwrap();

        let lengths = ChromosomeLengths::from_file(file.path()).unwrap();
        assert_eq!(lengths.as_slice(), &[1000, 500]);
        assert_eq!(lengths.total(), 1500);
    }

    #[test]
    fn test_from_file_rejects_bad_size() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "chrI\tabc").unwrap();
        assert!(ChromosomeLengths::from_file(file.path()).is_err());
    }
}
