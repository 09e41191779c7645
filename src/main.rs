//! Routeloop - longest routing-cycle detection for claim hop logs
//!
//! A two-phase out-of-core pipeline: a streaming pass shards hop lines
//! into on-disk buckets by (claim_id, status_code), then each bucket's
//! groups are analyzed one at a time (dedup, Tarjan SCC, bounded DFS)
//! and folded into a single best result.

mod cli;
mod graph;
mod models;
mod pipeline;
mod source;
mod stream;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    // All diagnostics go to stderr; stdout carries only the result line.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = cli::Cli::parse();
    if let Err(err) = cli::run(cli) {
        tracing::error!("{err:#}");
        std::process::exit(1);
    }
}
