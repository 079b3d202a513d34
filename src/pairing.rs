//! Mate pairing over a sequential alignment stream.
//!
//! # Algorithm
//!
//! A one-record look-back state machine:
//! 1. Compute the read identifier of the incoming record
//! 2. If a record is buffered and its identifier matches, emit both as a pair
//!    and clear the buffer
//! 3. Otherwise emit the buffered record as a singleton and buffer the new one
//! 4. At end of stream, flush the buffered record as a singleton
//!
//! # Requirements
//!
//! Mates MUST be adjacent in the input. Out-of-order input silently pairs
//! the wrong records; the collision check below only flags what it can see.
//!
//! # Memory Complexity
//!
//! O(1): one buffered record plus a bounded window of recent identifiers.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;
use tracing::warn;

use crate::config::{PairingConfig, PairingMode};
use crate::record::AlignmentRecord;

/// One physical fragment's worth of alignments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MateUnit {
    Pair([AlignmentRecord; 2]),
    Single(AlignmentRecord),
}

impl MateUnit {
    /// The one or two records making up this unit.
    pub fn records(&self) -> &[AlignmentRecord] {
        match self {
            MateUnit::Pair(pair) => pair,
            MateUnit::Single(record) => std::slice::from_ref(record),
        }
    }

    pub fn is_pair(&self) -> bool {
        matches!(self, MateUnit::Pair(_))
    }
}

/// Pairing counters.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PairingStats {
    pub records: usize,
    pub pairs: usize,
    pub singletons: usize,
    /// Unpaired records dropped because orphans are not kept
    pub orphans_dropped: usize,
    /// Records whose identifier was already emitted earlier in the stream
    pub adjacency_violations: usize,
}

/// Remembers the identifiers of recently emitted units.
#[derive(Debug, Default)]
struct RecentIds {
    capacity: usize,
    order: VecDeque<String>,
    members: FxHashSet<String>,
}

impl RecentIds {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            members: FxHashSet::default(),
        }
    }

    fn contains(&self, id: &str) -> bool {
        self.members.contains(id)
    }

    fn insert(&mut self, id: &str) {
        if self.capacity == 0 || self.members.contains(id) {
            return;
        }
        if self.order.len() == self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.members.remove(&evicted);
            }
        }
        self.order.push_back(id.to_string());
        self.members.insert(id.to_string());
    }
}

/// Groups adjacent records sharing a read identifier.
#[derive(Debug)]
pub struct MatePairer {
    config: PairingConfig,
    buffered: Option<AlignmentRecord>,
    last_pair_id: Option<String>,
    recent_singletons: RecentIds,
    stats: PairingStats,
}

impl Default for MatePairer {
    fn default() -> Self {
        Self::new(PairingConfig::default())
    }
}

impl MatePairer {
    pub fn new(config: PairingConfig) -> Self {
        Self {
            config,
            buffered: None,
            last_pair_id: None,
            recent_singletons: RecentIds::new(config.collision_window),
            stats: PairingStats::default(),
        }
    }

    /// Feed one record. Returns the unit completed by it, if any.
    pub fn push(&mut self, record: AlignmentRecord) -> Option<MateUnit> {
        self.stats.records += 1;

        if self.config.mode == PairingMode::SingleEnd {
            self.stats.singletons += 1;
            return Some(MateUnit::Single(record));
        }

        let matches_buffer = self
            .buffered
            .as_ref()
            .is_some_and(|prev| prev.read_identifier() == record.read_identifier());

        if matches_buffer {
            let prev = self.buffered.take()?;
            self.stats.pairs += 1;
            self.last_pair_id = Some(record.read_identifier().to_string());
            return Some(MateUnit::Pair([prev, record]));
        }

        self.check_adjacency(&record);
        let prev = self.buffered.replace(record)?;
        self.orphan(prev)
    }

    /// Flush the buffered record at end of stream.
    pub fn finish(&mut self) -> Option<MateUnit> {
        let prev = self.buffered.take()?;
        self.orphan(prev)
    }

    pub fn stats(&self) -> &PairingStats {
        &self.stats
    }

    fn orphan(&mut self, record: AlignmentRecord) -> Option<MateUnit> {
        self.recent_singletons.insert(record.read_identifier());
        if self.config.keep_orphans {
            self.stats.singletons += 1;
            Some(MateUnit::Single(record))
        } else {
            self.stats.orphans_dropped += 1;
            None
        }
    }

    fn check_adjacency(&mut self, record: &AlignmentRecord) {
        let id = record.read_identifier();
        let seen = self.last_pair_id.as_deref() == Some(id) || self.recent_singletons.contains(id);
        if seen {
            self.stats.adjacency_violations += 1;
            warn!(
                read = id,
                record = self.stats.records,
                "read identifier seen earlier in the stream; mates are not adjacent"
            );
        }
    }
}

/// Pair an entire record stream, collecting every unit. Convenience for
/// tests and small inputs; the stage drivers use [`MatePairer`] directly.
pub fn pair_all<I>(records: I, config: PairingConfig) -> (Vec<MateUnit>, PairingStats)
where
    I: IntoIterator<Item = AlignmentRecord>,
{
    let mut pairer = MatePairer::new(config);
    let mut units: Vec<MateUnit> = records
        .into_iter()
        .filter_map(|record| pairer.push(record))
        .collect();
    units.extend(pairer.finish());
    (units, pairer.stats().clone())
}
