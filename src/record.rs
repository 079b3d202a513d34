//! Core alignment types shared by the parsers and the pairing stage.

use std::fmt;

/// Strand orientation of an aligned read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Forward,
    Reverse,
    Unknown,
}

impl Strand {
    pub fn from_char(c: char) -> Self {
        match c {
            '+' => Strand::Forward,
            '-' => Strand::Reverse,
            _ => Strand::Unknown,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
            Strand::Unknown => '.',
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// One aligned read-end, normalized from either tabular or SAM/BAM input.
///
/// Coordinates are 0-based. Only the length of the read sequence matters
/// downstream, so the sequence itself is not retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentRecord {
    pub read_name: String,
    pub strand: Strand,
    pub reference_name: String,
    pub start: u64,
    pub read_length: u64,
    pub valid_alignments: u32,
    /// Observed template length, present only for mate-aware input.
    pub template_length: Option<i64>,
}

impl AlignmentRecord {
    pub fn new(
        read_name: impl Into<String>,
        strand: Strand,
        reference_name: impl Into<String>,
        start: u64,
        read_length: u64,
        valid_alignments: u32,
    ) -> Self {
        Self {
            read_name: read_name.into(),
            strand,
            reference_name: reference_name.into(),
            start,
            read_length,
            valid_alignments,
            template_length: None,
        }
    }

    /// Closed-open interval covered by the read: `[start, start + len)`.
    #[inline]
    pub fn interval(&self) -> (u64, u64) {
        (self.start, self.start + self.read_length)
    }

    /// Pairing key for this record.
    #[inline]
    pub fn read_identifier(&self) -> &str {
        read_identifier(&self.read_name)
    }

    /// Numeric chromosome id extracted from the reference name.
    #[inline]
    pub fn chromosome_id(&self) -> &str {
        chromosome_id(&self.reference_name)
    }
}

/// Strip a trailing `#...` mate/index suffix from a read name.
///
/// The split happens at the last `#` that has at least one character on
/// each side; names without such a `#` are returned unchanged.
///
/// ```
/// use fragcov::record::read_identifier;
///
/// assert_eq!(read_identifier("HWI-EAS:1:2#0/1"), "HWI-EAS:1:2");
/// assert_eq!(read_identifier("plain_name"), "plain_name");
/// ```
pub fn read_identifier(name: &str) -> &str {
    name.rmatch_indices('#')
        .map(|(idx, _)| idx)
        .find(|&idx| idx > 0 && idx + 1 < name.len())
        .map_or(name, |idx| &name[..idx])
}

/// First run of ASCII digits in a reference name, or the whole name when
/// it contains none (`chrM`, unplaced contigs).
pub fn chromosome_id(reference_name: &str) -> &str {
    let bytes = reference_name.as_bytes();
    let Some(first) = bytes.iter().position(u8::is_ascii_digit) else {
        return reference_name;
    };
    let len = bytes[first..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    &reference_name[first..first + len]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_identifier_strips_suffix() {
        assert_eq!(read_identifier("read1#0/1"), "read1");
        assert_eq!(read_identifier("read1#0/2"), "read1");
        assert_eq!(read_identifier("a#b#c"), "a#b");
    }

    #[test]
    fn test_read_identifier_needs_both_sides() {
        assert_eq!(read_identifier("#0/1"), "#0/1");
        assert_eq!(read_identifier("read1#"), "read1#");
        assert_eq!(read_identifier("read#1#"), "read");
    }

    #[test]
    fn test_chromosome_id() {
        assert_eq!(chromosome_id("chr1"), "1");
        assert_eq!(chromosome_id("chr12_random"), "12");
        assert_eq!(chromosome_id("chrXVI"), "chrXVI");
        assert_eq!(chromosome_id("chrM"), "chrM");
        assert_eq!(chromosome_id("chr07"), "07");
    }

    #[test]
    fn test_strand_roundtrip_chars() {
        assert_eq!(Strand::from_char('+'), Strand::Forward);
        assert_eq!(Strand::from_char('-'), Strand::Reverse);
        assert_eq!(Strand::from_char('x'), Strand::Unknown);
        assert_eq!(Strand::Reverse.to_string(), "-");
    }

    #[test]
    fn test_interval_is_closed_open() {
        let rec = AlignmentRecord::new("r", Strand::Forward, "chr1", 100, 50, 1);
        assert_eq!(rec.interval(), (100, 150));
    }
}
