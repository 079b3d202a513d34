//! Fragment length distribution.

use std::io::Write;

use tracing::warn;

use crate::config::DEFAULT_MAX_FRAGMENT_LENGTH;
use crate::error::Result;
use crate::streaming::RowWriter;
use crate::summary::{parse_chromosome_number, SummaryRow};

/// Count of fragments per length, indexed directly by length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LengthHistogram {
    counts: Vec<u64>,
}

impl LengthHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one fragment of the given length, growing the table first if
    /// the length has not been seen before. Returns false, leaving the
    /// table untouched, when the length cannot be used as an index.
    pub fn record(&mut self, length: u64) -> bool {
        let Some(idx) = usize::try_from(length).ok() else {
            return false;
        };
        let Some(needed) = idx.checked_add(1) else {
            return false;
        };
        if needed > self.counts.len() {
            self.counts.resize(needed, 0);
        }
        self.counts[idx] += 1;
        true
    }

    pub fn count(&self, length: u64) -> u64 {
        usize::try_from(length)
            .ok()
            .and_then(|idx| self.counts.get(idx))
            .copied()
            .unwrap_or(0)
    }

    /// Total fragments counted.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Smallest and largest length with a nonzero count.
    pub fn range(&self) -> Option<(u64, u64)> {
        let min = self.counts.iter().position(|&c| c > 0)?;
        let max = self.counts.iter().rposition(|&c| c > 0)?;
        Some((min as u64, max as u64))
    }

    /// `(length, count)` for every length in the observed range, zeros
    /// included.
    pub fn rows(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        let range = self.range();
        range
            .into_iter()
            .flat_map(|(min, max)| min..=max)
            .map(|len| (len, self.counts[len as usize]))
    }

    /// Add another histogram into this one.
    pub fn merge(&mut self, other: &LengthHistogram) {
        if other.counts.len() > self.counts.len() {
            self.counts.resize(other.counts.len(), 0);
        }
        for (a, b) in self.counts.iter_mut().zip(&other.counts) {
            *a += b;
        }
    }

    /// Two space-separated integer columns, no header.
    pub fn write<W: Write>(&self, output: W) -> Result<()> {
        let mut writer = RowWriter::new(output);
        for (length, count) in self.rows() {
            writer.write_int(length)?;
            writer.write_bytes(b" ")?;
            writer.write_int(count)?;
            writer.write_newline()?;
        }
        writer.flush()
    }
}

/// Outcome of offering one row to a [`LengthTabulator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tally {
    Counted,
    /// Chromosome is not a positive integer
    Unplaced,
    /// Length above the tabulator's bound
    Oversized,
}

/// Builds a [`LengthHistogram`] from read-summary rows, skipping rows whose
/// chromosome is not a positive integer or whose length exceeds the bound.
#[derive(Debug)]
pub struct LengthTabulator {
    histogram: LengthHistogram,
    max_length: u64,
    counted: usize,
    unplaced: usize,
    oversized: usize,
}

impl Default for LengthTabulator {
    fn default() -> Self {
        Self::new()
    }
}

impl LengthTabulator {
    pub fn new() -> Self {
        Self::with_max_length(DEFAULT_MAX_FRAGMENT_LENGTH)
    }

    pub fn with_max_length(max_length: u64) -> Self {
        Self {
            histogram: LengthHistogram::new(),
            max_length,
            counted: 0,
            unplaced: 0,
            oversized: 0,
        }
    }

    pub fn add(&mut self, chromosome: &str, length: u64) -> Tally {
        if parse_chromosome_number(chromosome).is_none() {
            self.unplaced += 1;
            return Tally::Unplaced;
        }
        if length > self.max_length || !self.histogram.record(length) {
            self.oversized += 1;
            warn!(chromosome, length, "fragment longer than the histogram bound; skipped");
            return Tally::Oversized;
        }
        self.counted += 1;
        Tally::Counted
    }

    pub fn add_row(&mut self, row: &SummaryRow) -> Tally {
        self.add(&row.chromosome, row.length)
    }

    pub fn counted(&self) -> usize {
        self.counted
    }

    pub fn unplaced(&self) -> usize {
        self.unplaced
    }

    pub fn oversized(&self) -> usize {
        self.oversized
    }

    pub fn finish(self) -> LengthHistogram {
        self.histogram
    }
}
