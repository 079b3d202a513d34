//! Shared streaming utilities.
//!
//! Every stage is single-pass: records are read one line at a time and
//! results are written through a buffered writer. This module provides the
//! byte-level field splitting and number formatting those stages share.

pub mod buffers;
pub mod output;
pub mod parsing;

pub use output::RowWriter;
pub use parsing::{parse_u32_fast, parse_u64_fast, should_skip_line, split_tabs, trim_line_end};
