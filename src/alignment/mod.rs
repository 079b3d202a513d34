//! Aligner output parsers.
//!
//! Both parsers normalize their input into [`AlignmentRecord`](crate::record::AlignmentRecord):
//! - [`bowtie`]: Bowtie's default tab-delimited output, one read-end per line
//! - [`sam`]: mate-aware SAM/BAM, already reduced to one record per pair
//!
//! [`prepare`] holds the hook through which external tools get SAM/BAM
//! input into shape before it is read.

pub mod bowtie;
pub mod prepare;
pub mod sam;

pub use bowtie::{parse_bowtie_line, AlignmentReader};
pub use prepare::{AlignmentPreparer, AsIs, Samtools};
pub use sam::{read_mate_aware, MateAwareReader, MateAwareStats};
