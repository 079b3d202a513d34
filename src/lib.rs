//! fragcov: fragment coverage from paired-end alignments
//!
//! This library turns short-read alignments into per-fragment summaries and
//! then into genome-wide fragment-center coverage tracks and fragment length
//! histograms.
//!
//! # Pipeline
//!
//! 1. **Parse**: Bowtie lines or SAM/BAM records become
//!    [`AlignmentRecord`]s
//! 2. **Pair**: adjacent mates are grouped by read identifier
//! 3. **Combine**: each pair or singleton collapses to one
//!    [`FragmentSummary`], written as a read-summary row
//! 4. **Bin** or **Tabulate**: summary rows feed a [`CoverageBinner`] or a
//!    [`LengthTabulator`]
//!
//! # Example
//!
//! ```rust,no_run
//! use fragcov::commands::{CountsCommand, ParseBowtieCommand};
//! use std::fs::File;
//!
//! let mut summary = File::create("reads.summary").unwrap();
//! ParseBowtieCommand::new().run("reads.bowtie", &mut summary).unwrap();
//!
//! let mut counts = File::create("reads.counts").unwrap();
//! CountsCommand::new().run("reads.summary", &mut counts).unwrap();
//! ```

pub mod alignment;
pub mod commands;
pub mod config;
pub mod coverage;
pub mod error;
pub mod fragment;
pub mod genome;
pub mod length_dist;
pub mod pairing;
pub mod record;
pub mod streaming;
pub mod summary;

// Re-export commonly used types
pub use coverage::{CoverageBinner, CoverageTracks, Placement};
pub use error::{PipelineError, Result};
pub use fragment::{combine, FragmentSummary};
pub use genome::ChromosomeLengths;
pub use length_dist::{LengthHistogram, LengthTabulator, Tally};
pub use pairing::{MatePairer, MateUnit};
pub use record::{AlignmentRecord, Strand};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::alignment::{AlignmentReader, AsIs, Samtools};
    pub use crate::commands::{
        CountsCommand, LengthDistCommand, ParseBowtieCommand, ParseSamCommand,
    };
    pub use crate::config::{CenterPolicy, PairingConfig, PairingMode, StrandMode};
    pub use crate::coverage::{CoverageBinner, CoverageTracks};
    pub use crate::fragment::{combine, FragmentSummary};
    pub use crate::genome::ChromosomeLengths;
    pub use crate::length_dist::{LengthHistogram, LengthTabulator};
    pub use crate::pairing::{MatePairer, MateUnit};
    pub use crate::record::{AlignmentRecord, Strand};
    pub use crate::summary::{SummaryReader, SummaryWriter};
}
