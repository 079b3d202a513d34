//! Run configuration.
//!
//! Every knob is an explicit value handed to the stage that needs it.
//! Nothing here is global.

/// Seed used when the caller does not supply one.
pub const DEFAULT_SEED: u64 = 20081025;

/// Default size of the recently-seen identifier window used to flag
/// non-adjacent mates.
pub const DEFAULT_COLLISION_WINDOW: usize = 1024;

/// Longest fragment the length histogram accepts. Longer rows are counted
/// and skipped; the histogram is a dense table indexed by length.
pub const DEFAULT_MAX_FRAGMENT_LENGTH: u64 = 1_000_000;

/// How alignments are grouped into fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PairingMode {
    /// Adjacent records sharing a read identifier form one fragment.
    #[default]
    Paired,
    /// Every record is its own fragment.
    SingleEnd,
}

/// Strand reported on fragment summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrandMode {
    /// Always report forward, regardless of how the reads aligned.
    #[default]
    IgnoreStrand,
    /// Report the strand of the leftmost read.
    Observed,
}

impl StrandMode {
    pub fn from_ignore_flag(ignore_strand: bool) -> Self {
        if ignore_strand {
            StrandMode::IgnoreStrand
        } else {
            StrandMode::Observed
        }
    }
}

/// Handling of fragment centers that fall between two base positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CenterPolicy {
    /// Half the weight to each neighbouring position.
    #[default]
    Split,
    /// Full weight to one neighbour chosen uniformly at random.
    Randomize,
}

impl CenterPolicy {
    pub fn from_randomize_flag(randomize: bool) -> Self {
        if randomize {
            CenterPolicy::Randomize
        } else {
            CenterPolicy::Split
        }
    }
}

/// Options for the alignment-to-fragment stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairingConfig {
    pub mode: PairingMode,
    /// Emit unpaired records as singletons instead of dropping them.
    pub keep_orphans: bool,
    /// Number of recent singleton identifiers remembered for the adjacency
    /// check. Zero disables the window.
    pub collision_window: usize,
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            mode: PairingMode::Paired,
            keep_orphans: true,
            collision_window: DEFAULT_COLLISION_WINDOW,
        }
    }
}
