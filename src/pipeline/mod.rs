//! Two-phase detection pipeline.
//!
//! Phase 1 partitions the input into on-disk buckets; phase 2 loads one
//! bucket at a time, analyzes each of its groups, and folds the results
//! into the global reducer. Buckets are disjoint by construction, so
//! `--workers > 1` fans phase 2 out over a rayon pool; the per-bucket
//! partials merge through an associative fold and the answer is
//! identical to the sequential run.

use anyhow::{Context, Result};
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::graph::cycle::{longest_cycle, SearchLimits};
use crate::graph::GroupGraph;
use crate::models::{AnalysisReport, CycleResult, GroupKey};
use crate::stream::partition::partition_file;
use crate::stream::reader;

/// Run configuration for one detection pass.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Partition fan-out (B). Any value >= 1 yields the same result.
    pub buckets: usize,
    /// Phase-2 bucket workers. 1 keeps the analysis single-threaded.
    pub workers: usize,
    /// Per-component expansion ceiling for the cycle search.
    pub max_expansions: u64,
}

/// Per-bucket partial result. Merging is associative and commutative.
#[derive(Debug, Default)]
struct BucketOutcome {
    best: Option<CycleResult>,
    total_hops: u64,
    claims: FxHashSet<String>,
    cycles_per_status: BTreeMap<String, u64>,
}

impl BucketOutcome {
    fn fold_candidate(&mut self, candidate: CycleResult) {
        match &self.best {
            Some(current) if !candidate.better_than(current) => {}
            _ => self.best = Some(candidate),
        }
    }

    fn merge(mut self, other: BucketOutcome) -> BucketOutcome {
        if let Some(candidate) = other.best {
            self.fold_candidate(candidate);
        }
        self.total_hops += other.total_hops;
        self.claims.extend(other.claims);
        for (status, count) in other.cycles_per_status {
            *self.cycles_per_status.entry(status).or_default() += count;
        }
        self
    }
}

/// Detect the longest routing cycle in the given (already local) input
/// file.
pub fn detect(input: &Path, options: &RunOptions) -> Result<AnalysisReport> {
    let partition = partition_file(input, options.buckets)?;
    info!(
        buckets = options.buckets,
        skipped = partition.skipped_lines,
        "partition phase complete, analyzing buckets"
    );

    let limits = SearchLimits {
        max_expansions: options.max_expansions,
    };

    let outcome = if options.workers > 1 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.workers)
            .build()
            .context("building worker pool")?;
        pool.install(|| {
            partition
                .bucket_paths
                .par_iter()
                .map(|path| analyze_bucket(path, &limits))
                .try_reduce(BucketOutcome::default, |a, b| Ok(a.merge(b)))
        })?
    } else {
        let mut acc = BucketOutcome::default();
        for path in &partition.bucket_paths {
            acc = acc.merge(analyze_bucket(path, &limits)?);
        }
        acc
    };

    Ok(AnalysisReport {
        cycle: outcome.best,
        total_hops: outcome.total_hops,
        num_claims: outcome.claims.len() as u64,
        cycles_per_status: outcome.cycles_per_status,
        skipped_lines: partition.skipped_lines,
    })
}

/// Analyze every group of one bucket, then delete the bucket file.
fn analyze_bucket(path: &Path, limits: &SearchLimits) -> Result<BucketOutcome> {
    let groups = reader::read_groups(path)?;
    let mut outcome = BucketOutcome::default();

    for (key, edges) in groups {
        outcome.total_hops += edges.len() as u64;
        outcome.claims.insert(key.claim_id.clone());

        let graph = GroupGraph::from_edges(&edges);
        drop(edges);
        let search = longest_cycle(&graph, limits);
        drop(graph);

        if search.truncated {
            warn!(
                claim_id = %key.claim_id,
                status_code = %key.status_code,
                "cycle search hit the expansion ceiling; reported length is a lower bound"
            );
        }
        if search.length > 0 {
            *outcome
                .cycles_per_status
                .entry(key.status_code.clone())
                .or_default() += 1;
            let GroupKey {
                claim_id,
                status_code,
            } = key;
            outcome.fold_candidate(CycleResult {
                claim_id,
                status_code,
                cycle_length: search.length,
            });
        }
    }

    debug!(bucket = %path.display(), "bucket consumed");
    reader::remove_bucket(path);
    Ok(outcome)
}
