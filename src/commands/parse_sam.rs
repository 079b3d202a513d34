//! Mate-aware alignments (SAM/BAM) to read summaries.
//!
//! The input is first handed to an [`AlignmentPreparer`] (conversion,
//! sorting, duplicate removal), then every properly paired record with a
//! positive template length becomes one fragment.

use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::alignment::{AlignmentPreparer, MateAwareReader, MateAwareStats};
use crate::config::StrandMode;
use crate::error::Result;
use crate::fragment::from_template;
use crate::summary::SummaryWriter;

/// SAM/BAM-to-summary stage configuration.
#[derive(Debug, Clone, Default)]
pub struct ParseSamCommand {
    pub strand_mode: StrandMode,
}

impl ParseSamCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strand_mode(mut self, strand_mode: StrandMode) -> Self {
        self.strand_mode = strand_mode;
        self
    }

    pub fn run<P, A, W>(&self, input: P, preparer: &A, output: &mut W) -> Result<ParseSamStats>
    where
        P: AsRef<Path>,
        A: AlignmentPreparer + ?Sized,
        W: Write,
    {
        let prepared = preparer.prepare(input.as_ref())?;
        info!(path = %prepared.display(), "reading prepared alignments");

        // Nothing is written until the input is open and its header decoded
        let reader = MateAwareReader::from_path(&prepared)?;
        let strand_mode = self.strand_mode;
        let (writer, records) = reader.read_into(
            || SummaryWriter::new(output),
            |writer, record| writer.write(&from_template(&record, strand_mode)),
        )?;

        let stats = ParseSamStats {
            records,
            fragments_written: writer.finish()?,
        };
        info!("parse-sam: {}", stats);
        Ok(stats)
    }
}

/// Statistics from a mate-aware parsing run.
#[derive(Debug, Default, Clone)]
pub struct ParseSamStats {
    pub records: MateAwareStats,
    pub fragments_written: usize,
}

impl std::fmt::Display for ParseSamStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, Fragments: {}", self.records, self.fragments_written)
    }
}
