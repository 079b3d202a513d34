//! Pipeline stage drivers.

pub mod counts;
pub mod length_dist;
pub mod parse_bowtie;
pub mod parse_sam;

pub use counts::{CountsCommand, CountsStats};
pub use length_dist::{LengthDistCommand, LengthStats};
pub use parse_bowtie::{ParseBowtieCommand, ParseStats};
pub use parse_sam::{ParseSamCommand, ParseSamStats};
