//! Bowtie default (non-SAM) output parser.
//!
//! Each line has 8 tab-delimited fields: name, strand, reference, offset,
//! read sequence, read qualities, valid-alignment count, mismatches. The
//! mismatch column is usually empty and may be missing altogether.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use tracing::debug;

use crate::error::{PipelineError, RecordError, Result};
use crate::record::{AlignmentRecord, Strand};
use crate::streaming::buffers::{DEFAULT_INPUT_BUFFER, DEFAULT_LINE_BUFFER};
use crate::streaming::{parse_u32_fast, parse_u64_fast, should_skip_line, split_tabs, trim_line_end};

const BOWTIE_FIELDS: usize = 8;

/// Parse one Bowtie output line into an [`AlignmentRecord`].
pub fn parse_bowtie_line(line: &[u8]) -> std::result::Result<AlignmentRecord, RecordError> {
    let line = trim_line_end(line);
    let (fields, count) = split_tabs::<BOWTIE_FIELDS>(line);

    if !(BOWTIE_FIELDS - 1..=BOWTIE_FIELDS).contains(&count) {
        return Err(RecordError::FieldCount {
            expected: "7 or 8",
            found: count,
        });
    }

    let strand = match fields[1] {
        b"+" => Strand::Forward,
        b"-" => Strand::Reverse,
        other => {
            return Err(RecordError::InvalidStrand(
                String::from_utf8_lossy(other).into_owned(),
            ))
        }
    };

    let start = parse_u64_fast(fields[3]).ok_or_else(|| invalid("offset", fields[3]))?;
    let valid_alignments =
        parse_u32_fast(fields[6]).ok_or_else(|| invalid("valid-alignment count", fields[6]))?;

    Ok(AlignmentRecord::new(
        String::from_utf8_lossy(fields[0]),
        strand,
        String::from_utf8_lossy(fields[2]),
        start,
        fields[4].len() as u64,
        valid_alignments,
    ))
}

fn invalid(field: &'static str, value: &[u8]) -> RecordError {
    RecordError::InvalidNumber {
        field,
        value: String::from_utf8_lossy(value).into_owned(),
    }
}

/// Streaming reader over Bowtie output.
///
/// Malformed lines are dropped and counted; only I/O failures end the
/// stream with an error.
pub struct AlignmentReader<R: Read> {
    reader: BufReader<R>,
    line_number: usize,
    buffer: Vec<u8>,
    malformed: usize,
}

impl AlignmentReader<File> {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| PipelineError::unavailable(path, e))?;
        Ok(Self::new(file))
    }
}

impl<R: Read> AlignmentReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::with_capacity(DEFAULT_INPUT_BUFFER, reader),
            line_number: 0,
            buffer: Vec::with_capacity(DEFAULT_LINE_BUFFER),
            malformed: 0,
        }
    }

    /// Read the next well-formed record.
    pub fn read_record(&mut self) -> io::Result<Option<AlignmentRecord>> {
        loop {
            self.buffer.clear();
            let bytes_read = self.reader.read_until(b'\n', &mut self.buffer)?;
            if bytes_read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            if should_skip_line(&self.buffer) {
                continue;
            }

            match parse_bowtie_line(&self.buffer) {
                Ok(record) => return Ok(Some(record)),
                Err(e) => {
                    self.malformed += 1;
                    debug!(line = self.line_number, "dropping alignment: {}", e);
                }
            }
        }
    }

    /// Lines read so far, including dropped ones.
    pub fn lines_read(&self) -> usize {
        self.line_number
    }

    /// Lines dropped because they failed to parse.
    pub fn malformed(&self) -> usize {
        self.malformed
    }

    pub fn records(&mut self) -> AlignmentRecordIter<'_, R> {
        AlignmentRecordIter { reader: self }
    }
}

/// Iterator over well-formed alignment records.
pub struct AlignmentRecordIter<'a, R: Read> {
    reader: &'a mut AlignmentReader<R>,
}

impl<R: Read> Iterator for AlignmentRecordIter<'_, R> {
    type Item = Result<AlignmentRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.read_record().map_err(PipelineError::from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE: &[u8] =
        b"read1#0/1\t+\tchr3\t100\tACGTACGTAC\tIIIIIIIIII\t0\t\n";

    #[test]
    fn test_parse_bowtie_line() {
        let rec = parse_bowtie_line(LINE).unwrap();
        assert_eq!(rec.read_name, "read1#0/1");
        assert_eq!(rec.strand, Strand::Forward);
        assert_eq!(rec.reference_name, "chr3");
        assert_eq!(rec.start, 100);
        assert_eq!(rec.read_length, 10);
        assert_eq!(rec.valid_alignments, 0);
        assert_eq!(rec.template_length, None);
    }

    #[test]
    fn test_parse_without_mismatch_column() {
        let rec = parse_bowtie_line(b"r\t-\tchr1\t5\tACG\tIII\t2").unwrap();
        assert_eq!(rec.strand, Strand::Reverse);
        assert_eq!(rec.valid_alignments, 2);
    }

    #[test]
    fn test_reject_bad_offset() {
        let err = parse_bowtie_line(b"r\t+\tchr1\t1x0\tACG\tIII\t0\t").unwrap_err();
        assert!(matches!(err, RecordError::InvalidNumber { field: "offset", .. }));
    }

    #[test]
    fn test_reject_field_count() {
        let err = parse_bowtie_line(b"r\t+\tchr1\t10").unwrap_err();
        assert_eq!(
            err,
            RecordError::FieldCount {
                expected: "7 or 8",
                found: 4
            }
        );
    }

    #[test]
    fn test_reader_skips_malformed_lines() {
        let content = "r1\t+\tchr1\t10\tACGT\tIIII\t0\t\n\
                       garbage line\n\
                       \n\
                       r2\t-\tchr1\t20\tACGT\tIIII\tx\t\n\
                       r3\t-\tchr2\t30\tACGTA\tIIIII\t1\t0:A>G\n";
        let mut reader = AlignmentReader::new(content.as_bytes());
        let records: Vec<_> = reader.records().collect::<Result<_>>().unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].read_name, "r1");
        assert_eq!(records[1].read_name, "r3");
        assert_eq!(records[1].read_length, 5);
        assert_eq!(reader.malformed(), 2);
        assert_eq!(reader.lines_read(), 5);
    }
}
