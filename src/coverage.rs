//! Fragment-center coverage tracks.
//!
//! Each fragment contributes a total weight of 1.0 at its center. Even-length
//! fragments have an integer center and put the whole weight on one base.
//! Odd-length fragments have a center halfway between two bases; the
//! [`CenterPolicy`] decides whether the weight is split 0.5/0.5 or given to
//! one neighbour picked at random.
//!
//! Tracks from independent runs over disjoint inputs combine by element-wise
//! addition, so large inputs can be sharded and merged.

use std::io::Write;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::CenterPolicy;
use crate::error::{PipelineError, Result};
use crate::fragment::FragmentSummary;
use crate::genome::ChromosomeLengths;
use crate::streaming::RowWriter;
use crate::summary::{parse_chromosome_number, SummaryRow};

/// Dense per-base weights, one track per chromosome in index order.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageTracks {
    tracks: Vec<Vec<f64>>,
}

impl CoverageTracks {
    /// Zero-filled tracks sized from the length table.
    pub fn new(lengths: &ChromosomeLengths) -> Self {
        Self {
            tracks: lengths
                .as_slice()
                .iter()
                .map(|&len| vec![0.0; len as usize])
                .collect(),
        }
    }

    /// Track for a zero-based chromosome slot.
    pub fn track(&self, slot: usize) -> Option<&[f64]> {
        self.tracks.get(slot).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Sum of every weight in every track.
    pub fn total_weight(&self) -> f64 {
        self.tracks.iter().flatten().sum()
    }

    /// Add another set of tracks into this one, element by element.
    pub fn merge(&mut self, other: &CoverageTracks) -> Result<()> {
        let same_shape = self.tracks.len() == other.tracks.len()
            && self
                .tracks
                .iter()
                .zip(&other.tracks)
                .all(|(a, b)| a.len() == b.len());
        if !same_shape {
            return Err(PipelineError::InvalidFormat(
                "cannot merge coverage tracks built from different chromosome lengths".to_string(),
            ));
        }

        for (mine, theirs) in self.tracks.iter_mut().zip(&other.tracks) {
            for (a, b) in mine.iter_mut().zip(theirs) {
                *a += b;
            }
        }
        Ok(())
    }

    /// Write one comma-delimited line per chromosome, values with one
    /// decimal place.
    pub fn write<W: Write>(&self, output: W) -> Result<()> {
        let mut writer = RowWriter::new(output);
        for track in &self.tracks {
            for (i, &value) in track.iter().enumerate() {
                if i > 0 {
                    writer.write_bytes(b",")?;
                }
                writer.write_fixed1(value)?;
            }
            writer.write_newline()?;
        }
        writer.flush()
    }

    #[inline]
    fn add(&mut self, slot: usize, pos: usize, weight: f64) {
        self.tracks[slot][pos] += weight;
    }
}

/// Where a fragment's weight ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Whole weight on one base
    Exact,
    /// Ambiguous center, resolved by the policy
    Ambiguous,
    /// Chromosome is not a positive integer within the length table
    Unplaced,
    /// Center falls outside the chromosome
    OutOfBounds,
}

/// Binning counters.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BinStats {
    pub exact: usize,
    pub ambiguous: usize,
    pub unplaced: usize,
    pub out_of_bounds: usize,
}

impl BinStats {
    /// Fragments that contributed weight.
    pub fn binned(&self) -> usize {
        self.exact + self.ambiguous
    }
}

/// Accumulates fragment centers into coverage tracks.
#[derive(Debug)]
pub struct CoverageBinner {
    tracks: CoverageTracks,
    lengths: ChromosomeLengths,
    policy: CenterPolicy,
    rng: SmallRng,
    stats: BinStats,
}

impl CoverageBinner {
    /// `seed` only matters under [`CenterPolicy::Randomize`].
    pub fn new(lengths: ChromosomeLengths, policy: CenterPolicy, seed: u64) -> Self {
        Self {
            tracks: CoverageTracks::new(&lengths),
            lengths,
            policy,
            rng: SmallRng::seed_from_u64(seed),
            stats: BinStats::default(),
        }
    }

    /// Bin one fragment given its chromosome field, start and length.
    pub fn add(&mut self, chromosome: &str, start: u64, length: u64) -> Placement {
        let placement = self.place(chromosome, start, length);
        match placement {
            Placement::Exact => self.stats.exact += 1,
            Placement::Ambiguous => self.stats.ambiguous += 1,
            Placement::Unplaced => self.stats.unplaced += 1,
            Placement::OutOfBounds => {
                self.stats.out_of_bounds += 1;
                tracing::warn!(
                    chromosome,
                    start,
                    length,
                    "fragment center outside chromosome; skipped"
                );
            }
        }
        placement
    }

    pub fn add_row(&mut self, row: &SummaryRow) -> Placement {
        self.add(&row.chromosome, row.start, row.length)
    }

    pub fn add_fragment(&mut self, fragment: &FragmentSummary) -> Placement {
        self.add(&fragment.chromosome, fragment.start, fragment.length)
    }

    pub fn stats(&self) -> &BinStats {
        &self.stats
    }

    pub fn tracks(&self) -> &CoverageTracks {
        &self.tracks
    }

    pub fn finish(self) -> (CoverageTracks, BinStats) {
        (self.tracks, self.stats)
    }

    fn place(&mut self, chromosome: &str, start: u64, length: u64) -> Placement {
        let Some(slot) = parse_chromosome_number(chromosome).and_then(|n| self.lengths.slot(n))
        else {
            return Placement::Unplaced;
        };
        let chrom_len = self.lengths.as_slice()[slot];

        // Integer part of start + length / 2
        let Some(floor) = start.checked_add(length / 2) else {
            return Placement::OutOfBounds;
        };

        if length % 2 == 0 {
            if floor >= chrom_len {
                return Placement::OutOfBounds;
            }
            self.tracks.add(slot, floor as usize, 1.0);
            return Placement::Exact;
        }

        if floor.saturating_add(1) >= chrom_len {
            return Placement::OutOfBounds;
        }
        match self.policy {
            CenterPolicy::Split => {
                self.tracks.add(slot, floor as usize, 0.5);
                self.tracks.add(slot, floor as usize + 1, 0.5);
            }
            CenterPolicy::Randomize => {
                let pos = if self.rng.gen_bool(0.5) { floor + 1 } else { floor };
                self.tracks.add(slot, pos as usize, 1.0);
            }
        }
        Placement::Ambiguous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> ChromosomeLengths {
        ChromosomeLengths::new(vec![100, 50])
    }

    #[test]
    fn test_even_length_hits_one_base() {
        let mut binner = CoverageBinner::new(small(), CenterPolicy::Split, 1);
        assert_eq!(binner.add("1", 10, 20), Placement::Exact);

        let (tracks, _) = binner.finish();
        let track = tracks.track(0).unwrap();
        assert_eq!(track[20], 1.0);
        assert_eq!(tracks.total_weight(), 1.0);
    }

    #[test]
    fn test_odd_length_split() {
        let mut binner = CoverageBinner::new(small(), CenterPolicy::Split, 1);
        assert_eq!(binner.add("2", 10, 5), Placement::Ambiguous);

        let (tracks, _) = binner.finish();
        let track = tracks.track(1).unwrap();
        assert_eq!(track[12], 0.5);
        assert_eq!(track[13], 0.5);
        assert_eq!(tracks.total_weight(), 1.0);
    }

    #[test]
    fn test_odd_length_randomized_picks_a_neighbour() {
        let mut binner = CoverageBinner::new(small(), CenterPolicy::Randomize, 7);
        for _ in 0..200 {
            binner.add("1", 10, 5);
        }
        let (tracks, stats) = binner.finish();
        let track = tracks.track(0).unwrap();

        assert_eq!(stats.ambiguous, 200);
        assert_eq!(track[12] + track[13], 200.0);
        assert!(track[12] > 0.0 && track[13] > 0.0);
        assert!(track.iter().all(|v| v.fract() == 0.0));
    }

    #[test]
    fn test_unplaced_rows_are_skipped() {
        let mut binner = CoverageBinner::new(small(), CenterPolicy::Split, 1);
        assert_eq!(binner.add("chrM", 10, 20), Placement::Unplaced);
        assert_eq!(binner.add("0", 10, 20), Placement::Unplaced);
        assert_eq!(binner.add("3", 10, 20), Placement::Unplaced);
        assert_eq!(binner.add("1,2", 10, 20), Placement::Unplaced);

        let (tracks, stats) = binner.finish();
        assert_eq!(stats.unplaced, 4);
        assert_eq!(tracks.total_weight(), 0.0);
    }

    #[test]
    fn test_out_of_bounds_skips_whole_fragment() {
        let mut binner = CoverageBinner::new(small(), CenterPolicy::Split, 1);
        // center 49.5 on a 50bp chromosome needs base 50
        assert_eq!(binner.add("2", 40, 19), Placement::OutOfBounds);
        assert_eq!(binner.add("2", 40, 18), Placement::Exact);

        let (tracks, stats) = binner.finish();
        assert_eq!(stats.out_of_bounds, 1);
        assert_eq!(tracks.total_weight(), 1.0);
    }

    #[test]
    fn test_extreme_coordinates_are_out_of_bounds() {
        let mut binner = CoverageBinner::new(small(), CenterPolicy::Split, 1);
        assert_eq!(binner.add("1", u64::MAX - 1, 3), Placement::OutOfBounds);
        assert_eq!(binner.add("1", u64::MAX, u64::MAX), Placement::OutOfBounds);
        assert_eq!(binner.stats().out_of_bounds, 2);
    }

    #[test]
    fn test_merge_requires_same_shape() {
        let mut a = CoverageTracks::new(&small());
        let b = CoverageTracks::new(&ChromosomeLengths::new(vec![100]));
        assert!(a.merge(&b).is_err());
    }

    #[test]
    fn test_write_format() {
        let lengths = ChromosomeLengths::new(vec![4, 3]);
        let mut binner = CoverageBinner::new(lengths, CenterPolicy::Split, 1);
        binner.add("1", 0, 2);
        binner.add("2", 0, 3);

        let (tracks, _) = binner.finish();
        let mut output = Vec::new();
        tracks.write(&mut output).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "0.0,1.0,0.0,0.0\n0.0,0.5,0.5\n"
        );
    }
}
