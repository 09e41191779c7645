//! CLI definition and dispatch.

use anyhow::{ensure, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::warn;

use crate::graph::cycle::DEFAULT_MAX_EXPANSIONS;
use crate::pipeline::{self, RunOptions};
use crate::source;
use crate::stream::partition::DEFAULT_BUCKETS;

/// Routeloop - find the longest routing cycle in a claim hop log.
///
/// Reads `source|destination|claim_id|status_code` hop lines and prints
/// `claim_id,status_code,length` for the longest simple cycle whose
/// edges all share one (claim_id, status_code) key.
#[derive(Parser, Debug)]
#[command(name = "routeloop")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the hop log, or an http(s) URL to fetch
    pub input: String,

    /// Number of on-disk partition buckets
    #[arg(long, default_value_t = DEFAULT_BUCKETS)]
    pub buckets: usize,

    /// Parallel bucket workers for the analysis phase
    #[arg(long, default_value_t = 1)]
    pub workers: usize,

    /// Per-component node-expansion ceiling for the cycle search
    #[arg(long, default_value_t = DEFAULT_MAX_EXPANSIONS)]
    pub max_expansions: u64,

    /// Print an analysis summary to stderr
    #[arg(long)]
    pub summary: bool,

    /// Write the full analysis report as JSON to this path
    #[arg(long)]
    pub report: Option<PathBuf>,
}

/// Run the CLI with parsed arguments.
pub fn run(cli: Cli) -> Result<()> {
    ensure!(cli.buckets >= 1, "--buckets must be at least 1");
    ensure!(cli.workers >= 1, "--workers must be at least 1");

    let input = source::acquire(&cli.input)?;
    let options = RunOptions {
        buckets: cli.buckets,
        workers: cli.workers,
        max_expansions: cli.max_expansions,
    };
    let report = pipeline::detect(input.path(), &options)?;

    match &report.cycle {
        Some(cycle) => println!("{cycle}"),
        None => warn!("no cycles found"),
    }

    if cli.summary {
        eprint!("{}", report.render_summary());
    }
    if let Some(path) = &cli.report {
        let json = serde_json::to_string_pretty(&report).context("serializing report")?;
        std::fs::write(path, json)
            .with_context(|| format!("writing report to {}", path.display()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_input_source() {
        let cli = Cli::parse_from(["routeloop", "hops.txt"]);
        assert_eq!(cli.input, "hops.txt");
        assert_eq!(cli.buckets, DEFAULT_BUCKETS);
        assert_eq!(cli.workers, 1);
        assert!(!cli.summary);
    }

    #[test]
    fn parses_url_input() {
        let cli = Cli::parse_from(["routeloop", "https://example.com/data.txt"]);
        assert_eq!(cli.input, "https://example.com/data.txt");
    }

    #[test]
    fn parses_tuning_flags() {
        let cli = Cli::parse_from([
            "routeloop",
            "--buckets",
            "4",
            "--workers",
            "8",
            "--max-expansions",
            "1000",
            "hops.txt",
        ]);
        assert_eq!(cli.buckets, 4);
        assert_eq!(cli.workers, 8);
        assert_eq!(cli.max_expansions, 1000);
    }

    #[test]
    fn missing_input_is_a_usage_error() {
        assert!(Cli::try_parse_from(["routeloop"]).is_err());
    }

    #[test]
    fn zero_buckets_rejected() {
        let cli = Cli::parse_from(["routeloop", "--buckets", "0", "missing.txt"]);
        let err = run(cli).unwrap_err();
        assert!(err.to_string().contains("--buckets"));
    }
}
