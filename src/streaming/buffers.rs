//! Buffer size constants for streaming stages.

/// Output buffer size (2 MB). Coverage tracks are written as one very long
/// line per chromosome, so a large buffer keeps syscalls down.
pub const DEFAULT_OUTPUT_BUFFER: usize = 2 * 1024 * 1024;

/// Input buffer size (256 KB).
pub const DEFAULT_INPUT_BUFFER: usize = 256 * 1024;

/// Line buffer capacity (1 KB). Aligner lines carry the read sequence and
/// qualities, which stay well under this for short reads.
pub const DEFAULT_LINE_BUFFER: usize = 1024;
