//! Read-only queries over a session

use crate::dataset::{CharFrequencyRecord, CohesionRecord, NetworkGraph, SummaryRecord};
use crate::session::{Selection, Session};
use serde::Serialize;
use std::collections::HashSet;

/// How many top-frequency characters are active when nothing is selected
pub const DEFAULT_ACTIVE_CHARS: usize = 50;

/// Rows in the cohesion ranking
pub const TOP_COHESIVE_CHARS: usize = 20;

/// Position of a character in the transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    /// Line number as stored on the `TextLine`
    pub line_number: usize,
    /// 0-based index into the line's filtered characters
    pub index: usize,
}

/// Aggregates over the summary table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryOverview {
    pub total_chars: usize,
    pub total_cohesion: u64,
    pub average_cohesion: f64,
    /// First row of the frequency table
    pub top_frequency: Option<CharFrequencyRecord>,
    /// First row of the summary table
    pub top_cohesion: Option<SummaryRecord>,
}

impl Session {
    /// Frequency row of a character
    pub fn frequency_of(&self, ch: &str) -> Option<&CharFrequencyRecord> {
        self.char_freq().iter().find(|r| r.char == ch)
    }

    /// Summary row of a character
    pub fn summary_of(&self, ch: &str) -> Option<&SummaryRecord> {
        self.char_summary().iter().find(|r| r.char == ch)
    }

    /// Frequency rows whose character contains `query`, in table order.
    /// A blank query matches nothing.
    pub fn search_freq(&self, query: &str) -> Vec<&CharFrequencyRecord> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        self.char_freq()
            .iter()
            .filter(|r| r.char.contains(query))
            .collect()
    }

    /// The `n` summary rows with the highest total cohesion. Ties keep their
    /// table order.
    pub fn top_cohesive(&self, n: usize) -> Vec<&SummaryRecord> {
        let mut ranked: Vec<&SummaryRecord> = self.char_summary().iter().collect();
        ranked.sort_by(|a, b| b.total_cohesion.cmp(&a.total_cohesion));
        ranked.truncate(n);
        ranked
    }

    /// Cohesion records centered on `center`, strongest first.
    /// Ties keep their original order.
    pub fn cohesion_for(&self, center: &str) -> Vec<&CohesionRecord> {
        let mut records: Vec<&CohesionRecord> = self
            .char_cohesion()
            .iter()
            .filter(|r| r.center_char == center)
            .collect();
        records.sort_by(|a, b| b.cohesion_count.cmp(&a.cohesion_count));
        records
    }

    /// Distinct neighbors of `center`, in record order
    pub fn related_chars(&self, center: &str) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.char_cohesion()
            .iter()
            .filter(|r| r.center_char == center)
            .map(|r| r.neighbor_char.as_str())
            .filter(|c| seen.insert(*c))
            .collect()
    }

    /// Every place `ch` appears in the transcript
    pub fn occurrences(&self, ch: char) -> Vec<Occurrence> {
        self.transcript()
            .iter()
            .flat_map(|line| {
                line.chars
                    .iter()
                    .enumerate()
                    .filter(move |&(_, &c)| c == ch)
                    .map(move |(index, _)| Occurrence {
                        line_number: line.line_number,
                        index,
                    })
            })
            .collect()
    }

    /// Totals over the summary table. `None` when the table is empty.
    pub fn overview(&self) -> Option<SummaryOverview> {
        let summary = self.char_summary();
        if summary.is_empty() {
            return None;
        }

        let total_cohesion = summary
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.total_cohesion));

        Some(SummaryOverview {
            total_chars: summary.len(),
            total_cohesion,
            average_cohesion: total_cohesion as f64 / summary.len() as f64,
            top_frequency: self.char_freq().first().cloned(),
            top_cohesion: summary.first().cloned(),
        })
    }

    /// Characters the views work on: the checked ones in table order, or the
    /// first `DEFAULT_ACTIVE_CHARS` rows when nothing is checked.
    pub fn active_chars(&self, selection: &Selection) -> Vec<&CharFrequencyRecord> {
        let checked: HashSet<&str> = selection.checked_chars().into_iter().collect();
        let active: Vec<&CharFrequencyRecord> = self
            .char_freq()
            .iter()
            .filter(|r| checked.contains(r.char.as_str()))
            .collect();

        if active.is_empty() {
            self.char_freq().iter().take(DEFAULT_ACTIVE_CHARS).collect()
        } else {
            active
        }
    }

    /// Network restricted to the active characters
    pub fn network_for(&self, selection: &Selection) -> NetworkGraph {
        let active = self.active_chars(selection);
        self.network()
            .restricted_to(active.iter().map(|r| r.char.as_str()))
    }
}
