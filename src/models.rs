//! Core data models for routeloop
//!
//! These types flow through the whole pipeline: hops are parsed into
//! edges keyed by `(claim_id, status_code)`, per-group results fold into
//! a single best `CycleResult`, and run-wide counters end up in the
//! `AnalysisReport`.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Key identifying one group of hops.
///
/// Cycles never cross group boundaries: every edge of a cycle carries
/// the same claim id and status code. Ordering is lexicographic on
/// `(claim_id, status_code)`, which is also the reducer's tie-break.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    pub claim_id: String,
    pub status_code: String,
}

/// A directed hop between two systems. Names are opaque strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub source: String,
    pub destination: String,
}

/// The longest cycle found for one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleResult {
    pub claim_id: String,
    pub status_code: String,
    pub cycle_length: usize,
}

impl CycleResult {
    /// Reducer ordering: strictly longer wins; equal lengths fall back
    /// to the lexicographically smaller `(claim_id, status_code)`. The
    /// fold is associative and commutative, so bucket order and worker
    /// count never change the winner.
    pub fn better_than(&self, other: &CycleResult) -> bool {
        if self.cycle_length != other.cycle_length {
            return self.cycle_length > other.cycle_length;
        }
        (&self.claim_id, &self.status_code) < (&other.claim_id, &other.status_code)
    }
}

impl fmt::Display for CycleResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{}",
            self.claim_id, self.status_code, self.cycle_length
        )
    }
}

/// Full run statistics, accumulated alongside the best-cycle reducer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// The longest cycle across all groups, if any cycle exists.
    pub cycle: Option<CycleResult>,
    /// Valid hop lines seen (before per-group edge deduplication).
    pub total_hops: u64,
    /// Distinct claim ids seen.
    pub num_claims: u64,
    /// Number of groups containing a cycle, per status code.
    pub cycles_per_status: BTreeMap<String, u64>,
    /// Malformed lines skipped during partitioning.
    pub skipped_lines: u64,
}

impl AnalysisReport {
    pub fn avg_hops_per_claim(&self) -> f64 {
        if self.num_claims == 0 {
            return 0.0;
        }
        self.total_hops as f64 / self.num_claims as f64
    }

    /// Up to five status codes with the most cycle-bearing groups,
    /// ordered by count descending then status code ascending.
    pub fn top_status_codes(&self) -> Vec<(&str, u64)> {
        let mut entries: Vec<(&str, u64)> = self
            .cycles_per_status
            .iter()
            .map(|(status, count)| (status.as_str(), *count))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries.truncate(5);
        entries
    }

    /// Human-readable summary block (written to stderr under `--summary`).
    pub fn render_summary(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Total hops: {}\n", self.total_hops));
        out.push_str(&format!("Num claims: {}\n", self.num_claims));
        out.push_str(&format!(
            "Avg hops/claim: {:.2}\n",
            self.avg_hops_per_claim()
        ));
        if self.skipped_lines > 0 {
            out.push_str(&format!("Skipped lines: {}\n", self.skipped_lines));
        }
        let top = self.top_status_codes();
        if !top.is_empty() {
            out.push_str("Top status codes in cycles:\n");
            for (status, count) in top {
                out.push_str(&format!("  {status}: {count}\n"));
            }
        }
        match &self.cycle {
            Some(cycle) => out.push_str(&format!("Longest cycle: {cycle}\n")),
            None => out.push_str("No cycles found\n"),
        }
        out
    }
}
