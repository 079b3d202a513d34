//! Mate-aware alignment input (SAM text or BAM).
//!
//! Only records flagged as properly paired with a positive template length
//! are kept. That selects exactly one record per pair (the leftmost mate),
//! so these records become fragments directly without a pairing pass.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use noodles::sam::alignment::record::data::field::Tag;
use noodles::sam::alignment::RecordBuf;
use noodles::{bam, sam};
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::record::{AlignmentRecord, Strand};

/// Optional tag carrying the per-record valid-alignment count.
pub const VALID_COUNT_TAG: [u8; 2] = *b"XM";

/// Counters for one pass over a mate-aware file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MateAwareStats {
    /// Records decoded from the file
    pub records_read: usize,
    /// Records kept (properly paired, positive template length)
    pub records_kept: usize,
    /// Records dropped by the pairing filter
    pub filtered: usize,
    /// Records that passed the filter but lacked a reference or position
    pub unlocated: usize,
}

impl std::fmt::Display for MateAwareStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Read: {}, Kept: {}, Filtered: {}, Unlocated: {}",
            self.records_read, self.records_kept, self.filtered, self.unlocated
        )
    }
}

/// What happened to one decoded record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversion {
    Kept(AlignmentRecord),
    Filtered,
    Unlocated,
}

/// An opened SAM or BAM file whose records have not been decoded yet.
///
/// The format is chosen by extension: `.bam` (any case) is read as BAM,
/// anything else as SAM text.
#[derive(Debug)]
pub struct MateAwareReader {
    file: File,
    is_bam: bool,
}

impl MateAwareReader {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| PipelineError::unavailable(path, e))?;
        let is_bam = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("bam"));
        Ok(Self { file, is_bam })
    }

    pub fn is_bam(&self) -> bool {
        self.is_bam
    }

    /// Decode the header, then build a sink with `start` and feed it every
    /// kept record. `start` is not called when the header cannot be decoded.
    pub fn read_into<S, I, F>(self, start: I, on_record: F) -> Result<(S, MateAwareStats)>
    where
        I: FnOnce() -> Result<S>,
        F: FnMut(&mut S, AlignmentRecord) -> Result<()>,
    {
        if self.is_bam {
            let mut reader = bam::io::Reader::new(self.file);
            let header = reader.read_header().map_err(decode_error)?;
            drive(&header, reader.record_bufs(&header), start()?, on_record)
        } else {
            let mut reader = sam::io::Reader::new(BufReader::new(self.file));
            let header = reader.read_header().map_err(decode_error)?;
            drive(&header, reader.record_bufs(&header), start()?, on_record)
        }
    }
}

/// Stream every kept record of a SAM or BAM file through `on_record`.
pub fn read_mate_aware<P, F>(path: P, mut on_record: F) -> Result<MateAwareStats>
where
    P: AsRef<Path>,
    F: FnMut(AlignmentRecord) -> Result<()>,
{
    let (_, stats) = MateAwareReader::from_path(path)?
        .read_into(|| Ok(()), |_, record| on_record(record))?;
    Ok(stats)
}

fn drive<I, S, F>(
    header: &sam::Header,
    records: I,
    mut sink: S,
    mut on_record: F,
) -> Result<(S, MateAwareStats)>
where
    I: Iterator<Item = io::Result<RecordBuf>>,
    F: FnMut(&mut S, AlignmentRecord) -> Result<()>,
{
    let mut stats = MateAwareStats::default();
    let tag = Tag::from(VALID_COUNT_TAG);

    for result in records {
        let record = result.map_err(decode_error)?;
        stats.records_read += 1;

        match convert_record(&record, header, tag) {
            Conversion::Kept(alignment) => {
                stats.records_kept += 1;
                on_record(&mut sink, alignment)?;
            }
            Conversion::Filtered => stats.filtered += 1,
            Conversion::Unlocated => {
                stats.unlocated += 1;
                debug!(
                    record = stats.records_read,
                    "dropping properly paired record without reference or position"
                );
            }
        }
    }

    Ok((sink, stats))
}

/// Normalize one decoded record.
pub fn convert_record(record: &RecordBuf, header: &sam::Header, tag: Tag) -> Conversion {
    let flags = record.flags();
    let template_length = record.template_length();

    if !flags.is_properly_segmented() || template_length <= 0 {
        return Conversion::Filtered;
    }

    let reference_name = record
        .reference_sequence_id()
        .and_then(|id| header.reference_sequences().get_index(id))
        .map(|(name, _)| name.to_string());
    let start = record.alignment_start().map(|pos| usize::from(pos) as u64 - 1);

    let (Some(reference_name), Some(start)) = (reference_name, start) else {
        return Conversion::Unlocated;
    };

    let valid_alignments = record
        .data()
        .get(&tag)
        .and_then(|value| value.as_int())
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0);

    let strand = if flags.is_reverse_complemented() {
        Strand::Reverse
    } else {
        Strand::Forward
    };

    Conversion::Kept(AlignmentRecord {
        read_name: record
            .name()
            .map(|name| name.to_string())
            .unwrap_or_default(),
        strand,
        reference_name,
        start,
        read_length: record.sequence().len() as u64,
        valid_alignments,
        template_length: Some(i64::from(template_length)),
    })
}

fn decode_error(e: io::Error) -> PipelineError {
    PipelineError::Alignment(e.to_string())
}
