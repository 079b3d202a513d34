//! Reduction of one or two mate alignments into a fragment summary.

use crate::config::StrandMode;
use crate::pairing::MateUnit;
use crate::record::{chromosome_id, AlignmentRecord, Strand};

/// Delimiter between distinct chromosome ids when mates disagree.
pub const CHROM_DELIM: &str = ",";

/// One physical fragment (mate pair or singleton).
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentSummary {
    /// Numeric chromosome id, the raw reference name when it has no digits,
    /// or several ids joined by [`CHROM_DELIM`] when mates disagree
    pub chromosome: String,
    pub strand: Strand,
    pub start: u64,
    pub end: u64,
    pub center: f64,
    pub length: u64,
    pub valid_alignments: u64,
}

impl FragmentSummary {
    /// True when the mates mapped to different chromosomes. Such fragments
    /// indicate a questionable alignment rather than two chromosomes.
    pub fn has_ambiguous_chromosome(&self) -> bool {
        self.chromosome.contains(CHROM_DELIM)
    }
}

/// Combine the records of one fragment.
///
/// Works on any number of records, so pairs and singletons take the same
/// path. The interval is the union of the read intervals, the chromosome is
/// the set of distinct ids (sorted, so argument order does not matter), and
/// the valid-alignment counts are summed. An empty slice yields a
/// zero-length fragment at position 0.
pub fn combine(records: &[AlignmentRecord], strand_mode: StrandMode) -> FragmentSummary {
    let start = records.iter().map(|r| r.interval().0).min().unwrap_or(0);
    let end = records.iter().map(|r| r.interval().1).max().unwrap_or(start);
    let length = end - start;

    let mut chroms: Vec<&str> = records.iter().map(AlignmentRecord::chromosome_id).collect();
    chroms.sort_unstable();
    chroms.dedup();

    FragmentSummary {
        chromosome: chroms.join(CHROM_DELIM),
        strand: fragment_strand(records, strand_mode),
        start,
        end,
        center: start as f64 + length as f64 / 2.0,
        length,
        valid_alignments: records.iter().map(|r| u64::from(r.valid_alignments)).sum(),
    }
}

/// Combine a pairing unit.
pub fn combine_unit(unit: &MateUnit, strand_mode: StrandMode) -> FragmentSummary {
    combine(unit.records(), strand_mode)
}

/// Build a fragment from one mate-aware record whose template length spans
/// the whole fragment.
///
/// The end coordinate is inclusive here (`start + tlen - 1`) and the center
/// is the midpoint of that closed interval.
pub fn from_template(record: &AlignmentRecord, strand_mode: StrandMode) -> FragmentSummary {
    let length = record.template_length.map_or(record.read_length, |t| t.max(0) as u64);
    let start = record.start;
    let end = (start + length).saturating_sub(1);

    // Numeric ids are normalized ("chr01" -> "1")
    let id = chromosome_id(&record.reference_name);
    let chromosome = id
        .parse::<u64>()
        .map_or_else(|_| id.to_string(), |n| n.to_string());

    FragmentSummary {
        chromosome,
        strand: fragment_strand(std::slice::from_ref(record), strand_mode),
        start,
        end,
        center: start as f64 + (length as f64 - 1.0) / 2.0,
        length,
        valid_alignments: u64::from(record.valid_alignments),
    }
}

/// Strand of the leftmost read, or unknown when two reads start at the same
/// position on opposite strands.
fn fragment_strand(records: &[AlignmentRecord], strand_mode: StrandMode) -> Strand {
    if strand_mode == StrandMode::IgnoreStrand {
        return Strand::Forward;
    }

    let Some(first_start) = records.iter().map(|r| r.start).min() else {
        return Strand::Unknown;
    };
    let mut leftmost = records.iter().filter(|r| r.start == first_start).map(|r| r.strand);
    let strand = leftmost.next().unwrap_or(Strand::Unknown);
    if leftmost.all(|s| s == strand) {
        strand
    } else {
        Strand::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(strand: Strand, reference: &str, start: u64, len: u64, nvalid: u32) -> AlignmentRecord {
        AlignmentRecord::new("r#0/1", strand, reference, start, len, nvalid)
    }

    #[test]
    fn test_combine_pair() {
        let a = rec(Strand::Forward, "chr1", 100, 50, 1);
        let b = rec(Strand::Reverse, "chr1", 120, 50, 2);
        let frag = combine(&[a, b], StrandMode::IgnoreStrand);

        assert_eq!(frag.chromosome, "1");
        assert_eq!(frag.strand, Strand::Forward);
        assert_eq!(frag.start, 100);
        assert_eq!(frag.end, 170);
        assert_eq!(frag.length, 70);
        assert_eq!(frag.center, 135.0);
        assert_eq!(frag.valid_alignments, 3);
    }

    #[test]
    fn test_combine_singleton_odd_length() {
        let frag = combine(&[rec(Strand::Forward, "chr2", 200, 35, 0)], StrandMode::IgnoreStrand);

        assert_eq!(frag.start, 200);
        assert_eq!(frag.end, 235);
        assert_eq!(frag.length, 35);
        assert_eq!(frag.center, 217.5);
    }

    #[test]
    fn test_combine_is_commutative() {
        let a = rec(Strand::Forward, "chr3", 500, 36, 1);
        let b = rec(Strand::Reverse, "chr4", 440, 36, 4);
        for mode in [StrandMode::IgnoreStrand, StrandMode::Observed] {
            let ab = combine(&[a.clone(), b.clone()], mode);
            let ba = combine(&[b.clone(), a.clone()], mode);
            assert_eq!(ab, ba);
        }
    }

    #[test]
    fn test_disagreeing_chromosomes_are_joined() {
        let a = rec(Strand::Forward, "chr9", 10, 10, 0);
        let b = rec(Strand::Forward, "chr10", 30, 10, 0);
        let frag = combine(&[a, b], StrandMode::IgnoreStrand);

        assert_eq!(frag.chromosome, "10,9");
        assert!(frag.has_ambiguous_chromosome());
    }

    #[test]
    fn test_non_numeric_reference_kept() {
        let frag = combine(&[rec(Strand::Forward, "chrM", 10, 10, 0)], StrandMode::IgnoreStrand);
        assert_eq!(frag.chromosome, "chrM");
        assert!(!frag.has_ambiguous_chromosome());
    }

    #[test]
    fn test_observed_strand_uses_leftmost_read() {
        let a = rec(Strand::Reverse, "chr1", 300, 36, 0);
        let b = rec(Strand::Forward, "chr1", 250, 36, 0);
        assert_eq!(combine(&[a.clone(), b], StrandMode::Observed).strand, Strand::Forward);

        let c = rec(Strand::Forward, "chr1", 300, 36, 0);
        assert_eq!(combine(&[a, c], StrandMode::Observed).strand, Strand::Unknown);
    }

    #[test]
    fn test_ignore_strand_reports_forward_for_reverse_singleton() {
        // Fixed-strand mode reports '+' even for reverse-strand reads
        let frag = combine(&[rec(Strand::Reverse, "chr1", 0, 10, 0)], StrandMode::IgnoreStrand);
        assert_eq!(frag.strand, Strand::Forward);
    }

    #[test]
    fn test_from_template_inclusive_end() {
        let mut record = rec(Strand::Forward, "chr05", 100, 36, 3);
        record.template_length = Some(147);
        let frag = from_template(&record, StrandMode::IgnoreStrand);

        assert_eq!(frag.chromosome, "5");
        assert_eq!(frag.start, 100);
        assert_eq!(frag.end, 246);
        assert_eq!(frag.length, 147);
        assert_eq!(frag.center, 173.0);
        assert_eq!(frag.valid_alignments, 3);
    }
}
