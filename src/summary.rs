//! Read-summary row format.
//!
//! Tab-delimited, one header line, then one row per fragment:
//!
//! ```text
//! chromosome  strand  start  end  center  length  validCount
//! 1           +       100    170  135.0   70      3
//! ```
//!
//! Readers locate columns by header name, so only `chromosome`, `start` and
//! `length` need to be present; column order and extra columns are free.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::fragment::FragmentSummary;
use crate::streaming::buffers::{DEFAULT_INPUT_BUFFER, DEFAULT_LINE_BUFFER};
use crate::streaming::{parse_u64_fast, should_skip_line, trim_line_end, RowWriter};

/// Column names, in output order.
pub const COLUMNS: [&str; 7] = [
    "chromosome",
    "strand",
    "start",
    "end",
    "center",
    "length",
    "validCount",
];

/// Writes fragment summaries as read-summary rows.
pub struct SummaryWriter<W: Write> {
    writer: RowWriter<W>,
    rows_written: usize,
}

impl<W: Write> SummaryWriter<W> {
    /// Create a writer and emit the header line.
    pub fn new(output: W) -> Result<Self> {
        let mut writer = RowWriter::new(output);
        writer.write_str(&COLUMNS.join("\t"))?;
        writer.write_newline()?;
        Ok(Self {
            writer,
            rows_written: 0,
        })
    }

    pub fn write(&mut self, fragment: &FragmentSummary) -> Result<()> {
        let w = &mut self.writer;
        w.write_str(&fragment.chromosome)?;
        w.write_tab()?;
        let mut strand = [0u8; 4];
        w.write_str(fragment.strand.as_char().encode_utf8(&mut strand))?;
        w.write_tab()?;
        w.write_int(fragment.start)?;
        w.write_tab()?;
        w.write_int(fragment.end)?;
        w.write_tab()?;
        w.write_fixed1(fragment.center)?;
        w.write_tab()?;
        w.write_int(fragment.length)?;
        w.write_tab()?;
        w.write_int(fragment.valid_alignments)?;
        w.write_newline()?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flush buffered rows.
    pub fn finish(mut self) -> Result<usize> {
        self.writer.flush()?;
        Ok(self.rows_written)
    }
}

/// The fields downstream consumers need from a summary row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub chromosome: String,
    pub start: u64,
    pub length: u64,
}

impl SummaryRow {
    /// Chromosome as a positive integer, or None for unplaced,
    /// mitochondrial and multi-id rows.
    pub fn chromosome_number(&self) -> Option<u64> {
        parse_chromosome_number(&self.chromosome)
    }
}

/// Parse a chromosome field as a positive integer.
///
/// Surrounding whitespace, a leading `+` and leading zeros are accepted.
pub fn parse_chromosome_number(field: &str) -> Option<u64> {
    let field = field.trim();
    let digits = field.strip_prefix('+').unwrap_or(field);
    parse_u64_fast(digits.as_bytes()).filter(|&n| n > 0)
}

#[derive(Debug, Clone, Copy)]
struct Layout {
    chromosome: usize,
    start: usize,
    length: usize,
}

impl Layout {
    fn from_header(header: &[u8]) -> Result<Self> {
        let names: Vec<&[u8]> = trim_line_end(header).split(|&b| b == b'\t').collect();
        let find = |column: &str| {
            names
                .iter()
                .position(|name| name.trim_ascii() == column.as_bytes())
                .ok_or_else(|| {
                    PipelineError::InvalidFormat(format!(
                        "read-summary header lacks a '{}' column",
                        column
                    ))
                })
        };
        Ok(Self {
            chromosome: find("chromosome")?,
            start: find("start")?,
            length: find("length")?,
        })
    }
}

/// Streaming reader over read-summary rows.
///
/// Rows with a missing or non-numeric `start`/`length` are dropped and
/// counted. The chromosome filter is left to the consumer.
pub struct SummaryReader<R: Read> {
    reader: BufReader<R>,
    layout: Option<Layout>,
    line_number: usize,
    buffer: Vec<u8>,
    malformed: usize,
}

impl SummaryReader<File> {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| PipelineError::unavailable(path, e))?;
        Self::new(file)
    }
}

impl<R: Read> SummaryReader<R> {
    /// Create a reader and consume the header line. Empty input is valid
    /// and yields no rows.
    pub fn new(reader: R) -> Result<Self> {
        let mut reader = Self {
            reader: BufReader::with_capacity(DEFAULT_INPUT_BUFFER, reader),
            layout: None,
            line_number: 0,
            buffer: Vec::with_capacity(DEFAULT_LINE_BUFFER),
            malformed: 0,
        };
        reader.read_header()?;
        Ok(reader)
    }

    fn read_header(&mut self) -> Result<()> {
        loop {
            self.buffer.clear();
            if self.reader.read_until(b'\n', &mut self.buffer)? == 0 {
                return Ok(());
            }
            self.line_number += 1;
            if !should_skip_line(&self.buffer) {
                self.layout = Some(Layout::from_header(&self.buffer)?);
                return Ok(());
            }
        }
    }

    /// Read the next well-formed row.
    pub fn read_row(&mut self) -> io::Result<Option<SummaryRow>> {
        let Some(layout) = self.layout else {
            return Ok(None);
        };

        loop {
            self.buffer.clear();
            if self.reader.read_until(b'\n', &mut self.buffer)? == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            if should_skip_line(&self.buffer) {
                continue;
            }

            match parse_row(trim_line_end(&self.buffer), layout) {
                Some(row) => return Ok(Some(row)),
                None => {
                    self.malformed += 1;
                    debug!(line = self.line_number, "dropping malformed read-summary row");
                }
            }
        }
    }

    /// Rows dropped because they failed to parse.
    pub fn malformed(&self) -> usize {
        self.malformed
    }

    pub fn rows(&mut self) -> SummaryRowIter<'_, R> {
        SummaryRowIter { reader: self }
    }
}

fn parse_row(line: &[u8], layout: Layout) -> Option<SummaryRow> {
    let mut chromosome = None;
    let mut start = None;
    let mut length = None;

    for (idx, field) in line.split(|&b| b == b'\t').enumerate() {
        if idx == layout.chromosome {
            chromosome = Some(String::from_utf8_lossy(field).into_owned());
        }
        if idx == layout.start {
            start = parse_u64_fast(field.trim_ascii());
        }
        if idx == layout.length {
            length = parse_u64_fast(field.trim_ascii());
        }
    }

    Some(SummaryRow {
        chromosome: chromosome?,
        start: start?,
        length: length?,
    })
}

/// Iterator over well-formed summary rows.
pub struct SummaryRowIter<'a, R: Read> {
    reader: &'a mut SummaryReader<R>,
}

impl<R: Read> Iterator for SummaryRowIter<'_, R> {
    type Item = Result<SummaryRow>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.read_row().map_err(PipelineError::from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Strand;

    fn fragment(chromosome: &str, start: u64, end: u64) -> FragmentSummary {
        let length = end - start;
        FragmentSummary {
            chromosome: chromosome.to_string(),
            strand: Strand::Forward,
            start,
            end,
            center: start as f64 + length as f64 / 2.0,
            length,
            valid_alignments: 3,
        }
    }

    #[test]
    fn test_writer_format() {
        let mut output = Vec::new();
        let mut writer = SummaryWriter::new(&mut output).unwrap();
        writer.write(&fragment("1", 100, 170)).unwrap();
        writer.write(&fragment("2", 200, 235)).unwrap();
        assert_eq!(writer.finish().unwrap(), 2);

        let text = String::from_utf8(output).unwrap();
        assert_eq!(
            text,
            "chromosome\tstrand\tstart\tend\tcenter\tlength\tvalidCount\n\
             1\t+\t100\t170\t135.0\t70\t3\n\
             2\t+\t200\t235\t217.5\t35\t3\n"
        );
    }

    #[test]
    fn test_reader_uses_header_positions() {
        let content = "length\tchromosome\tstart\n70\t1\t100\n35\tchrM\t200\n";
        let mut reader = SummaryReader::new(content.as_bytes()).unwrap();
        let rows: Vec<_> = reader.rows().collect::<Result<_>>().unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].chromosome, "1");
        assert_eq!(rows[0].start, 100);
        assert_eq!(rows[0].length, 70);
        assert_eq!(rows[0].chromosome_number(), Some(1));
        assert_eq!(rows[1].chromosome_number(), None);
    }

    #[test]
    fn test_reader_drops_malformed_rows() {
        let content = "chromosome\tstart\tlength\n1\t10\t20\n1\tten\t20\n1\t30\n2\t40\t50\n";
        let mut reader = SummaryReader::new(content.as_bytes()).unwrap();
        let rows: Vec<_> = reader.rows().collect::<Result<_>>().unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(reader.malformed(), 2);
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let content = "chromosome\tstart\n1\t10\n";
        assert!(matches!(
            SummaryReader::new(content.as_bytes()),
            Err(PipelineError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        let mut reader = SummaryReader::new(&b""[..]).unwrap();
        assert!(reader.read_row().unwrap().is_none());
    }

    #[test]
    fn test_parse_chromosome_number() {
        assert_eq!(parse_chromosome_number("7"), Some(7));
        assert_eq!(parse_chromosome_number(" 07 "), Some(7));
        assert_eq!(parse_chromosome_number("0"), None);
        assert_eq!(parse_chromosome_number("-3"), None);
        assert_eq!(parse_chromosome_number("chrM"), None);
        assert_eq!(parse_chromosome_number("1,2"), None);
    }
}
