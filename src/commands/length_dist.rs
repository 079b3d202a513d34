//! Read summaries to a fragment length histogram.

use std::io::{self, Read, Write};
use std::path::Path;

use tracing::info;

use crate::config::DEFAULT_MAX_FRAGMENT_LENGTH;
use crate::error::Result;
use crate::length_dist::{LengthHistogram, LengthTabulator};
use crate::summary::SummaryReader;

/// Length distribution stage. Rows on non-numbered chromosomes, and rows
/// longer than `max_length`, are skipped.
#[derive(Debug, Clone)]
pub struct LengthDistCommand {
    pub max_length: u64,
}

impl Default for LengthDistCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl LengthDistCommand {
    pub fn new() -> Self {
        Self {
            max_length: DEFAULT_MAX_FRAGMENT_LENGTH,
        }
    }

    pub fn with_max_length(mut self, max_length: u64) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn run<P: AsRef<Path>, W: Write>(&self, input: P, output: &mut W) -> Result<LengthStats> {
        let reader = SummaryReader::from_path(input)?;
        self.write_run(reader, output)
    }

    pub fn run_stdin<W: Write>(&self, output: &mut W) -> Result<LengthStats> {
        let stdin = io::stdin();
        self.run_reader(stdin.lock(), output)
    }

    pub fn run_reader<R: Read, W: Write>(&self, input: R, output: &mut W) -> Result<LengthStats> {
        self.write_run(SummaryReader::new(input)?, output)
    }

    /// Build the histogram without writing it.
    pub fn tabulate<R: Read>(&self, input: R) -> Result<(LengthHistogram, LengthStats)> {
        self.collect(SummaryReader::new(input)?)
    }

    fn write_run<R: Read, W: Write>(
        &self,
        reader: SummaryReader<R>,
        output: &mut W,
    ) -> Result<LengthStats> {
        let (histogram, stats) = self.collect(reader)?;
        histogram.write(output)?;
        info!("length-dist: {}", stats);
        Ok(stats)
    }

    fn collect<R: Read>(
        &self,
        mut reader: SummaryReader<R>,
    ) -> Result<(LengthHistogram, LengthStats)> {
        let mut tabulator = LengthTabulator::with_max_length(self.max_length);
        while let Some(row) = reader.read_row()? {
            tabulator.add_row(&row);
        }

        let stats = LengthStats {
            counted: tabulator.counted(),
            unplaced: tabulator.unplaced(),
            oversized: tabulator.oversized(),
            malformed: reader.malformed(),
        };
        let histogram = tabulator.finish();
        Ok((histogram, stats))
    }
}

/// Statistics from a length distribution run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LengthStats {
    pub counted: usize,
    pub unplaced: usize,
    /// Rows longer than the histogram bound
    pub oversized: usize,
    pub malformed: usize,
}

impl std::fmt::Display for LengthStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Counted: {}, Unplaced: {}, Oversized: {}, Malformed: {}",
            self.counted, self.unplaced, self.oversized, self.malformed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_output() {
        let input = "chromosome\tstart\tlength\n\
1\t0\t34\n2\t0\t34\n3\t0\t36\n4\t0\t36\n5\t0\t36\nchrM\t0\t99\n";
        let mut output = Vec::new();
        let stats = LengthDistCommand::new()
            .run_reader(input.as_bytes(), &mut output)
            .unwrap();

        assert_eq!(String::from_utf8(output).unwrap(), "34 2\n35 0\n36 3\n");
        assert_eq!(stats.counted, 5);
        assert_eq!(stats.unplaced, 1);
    }

    #[test]
    fn test_no_rows_no_output() {
        let mut output = Vec::new();
        LengthDistCommand::new()
            .run_reader(&b"chromosome\tstart\tlength\n"[..], &mut output)
            .unwrap();
        assert!(output.is_empty());
    }

    #[test]
    fn test_huge_length_is_skipped_not_indexed() {
        let input = "chromosome\tstart\tlength\n\
1\t0\t18446744073709551615\n1\t0\t10000000000\n2\t0\t147\n";
        let mut output = Vec::new();
        let stats = LengthDistCommand::new()
            .run_reader(input.as_bytes(), &mut output)
            .unwrap();

        assert_eq!(String::from_utf8(output).unwrap(), "147 1\n");
        assert_eq!(stats.counted, 1);
        assert_eq!(stats.oversized, 2);
    }
}
