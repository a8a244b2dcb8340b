//! Dataset module
//!
//! Typed records reconstructed from decrypted payloads: character
//! frequencies, directional cohesion, per-character summaries, the
//! character network and the tokenized transcript.

mod network;
mod records;
mod transcript;

pub use network::{build_network_graph, NetworkGraph, NetworkLink, NetworkNode};
pub use records::{normalize_records, parse_records};
pub use transcript::{is_transcript_char, tokenize_transcript, TextLine};

use serde::{Deserialize, Serialize};
use std::fmt;

/// One row of the frequency table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharFrequencyRecord {
    pub char: String,
    pub freq: u64,
}

/// Which side of the center character the neighbor sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Left => f.pad("left"),
            Direction::Right => f.pad("right"),
        }
    }
}

/// Observed adjacency strength between two characters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohesionRecord {
    pub center_char: String,
    pub neighbor_char: String,
    pub direction: Direction,
    pub cohesion_count: u64,
}

/// Per-character cohesion totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub char: String,
    pub left_cohesion_count: u64,
    pub right_cohesion_count: u64,
    pub total_cohesion: u64,
}

impl SummaryRecord {
    /// `total == left + right`. Upstream data is expected to hold this but
    /// it is never enforced.
    pub fn is_consistent(&self) -> bool {
        self.left_cohesion_count.checked_add(self.right_cohesion_count)
            == Some(self.total_cohesion)
    }
}
