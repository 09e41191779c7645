//! Phase 1: hash-partition the input into on-disk buckets.
//!
//! A single streaming pass routes each valid hop line to one of B
//! append-only bucket files keyed by `hash(claim_id, status_code) % B`,
//! so phase 2 can load one bucket's groups at a time instead of the
//! whole input. B bounds open file handles, not correctness: any B >= 1
//! produces the same final result.

use anyhow::{Context, Result};
use rustc_hash::FxHasher;
use std::fs::File;
use std::hash::Hasher;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

use crate::stream::parser::{self, ParsedLine};

/// Default partition fan-out. Sized so each bucket of a ~10^8-line
/// input fits comfortably in RAM while keeping open handles modest.
pub const DEFAULT_BUCKETS: usize = 128;

/// Completed phase-1 output. Owns the temp directory holding the bucket
/// files; dropping it removes whatever buckets phase 2 has not already
/// deleted.
#[derive(Debug)]
pub struct Partition {
    pub bucket_paths: Vec<PathBuf>,
    pub skipped_lines: u64,
    _dir: TempDir,
}

/// Bucket index for a group key. Pure function of the key: every edge
/// of a group lands in exactly one bucket.
pub fn bucket_index(claim_id: &str, status_code: &str, buckets: usize) -> usize {
    let mut hasher = FxHasher::default();
    hasher.write(claim_id.as_bytes());
    hasher.write_u8(b'|');
    hasher.write(status_code.as_bytes());
    (hasher.finish() % buckets as u64) as usize
}

/// Stream `input` once, appending each valid line to its bucket file.
///
/// Malformed lines (wrong arity, empty key fields, invalid UTF-8) are
/// skipped and tallied; the first one produces a warning. Read and
/// write I/O errors are fatal.
pub fn partition_file(input: &Path, buckets: usize) -> Result<Partition> {
    let dir = tempfile::Builder::new()
        .prefix("routeloop-buckets-")
        .tempdir()
        .context("creating bucket directory")?;

    let mut bucket_paths = Vec::with_capacity(buckets);
    let mut writers = Vec::with_capacity(buckets);
    for i in 0..buckets {
        let path = dir.path().join(format!("bucket-{i:03}.txt"));
        let file = File::create(&path)
            .with_context(|| format!("creating bucket file {}", path.display()))?;
        writers.push(BufWriter::new(file));
        bucket_paths.push(path);
    }

    let file =
        File::open(input).with_context(|| format!("opening input {}", input.display()))?;
    let mut reader = BufReader::new(file);

    let mut skipped_lines = 0u64;
    let mut line_no = 0u64;
    let mut raw = Vec::new();
    loop {
        raw.clear();
        let n = reader
            .read_until(b'\n', &mut raw)
            .context("reading input")?;
        if n == 0 {
            break;
        }
        line_no += 1;

        let parsed = match std::str::from_utf8(&raw) {
            Ok(text) => parser::parse_line(text),
            Err(_) => ParsedLine::Malformed,
        };
        match parsed {
            ParsedLine::Hop(hop) => {
                let idx = bucket_index(hop.claim_id, hop.status_code, buckets);
                writeln!(
                    writers[idx],
                    "{}|{}|{}|{}",
                    hop.source, hop.destination, hop.claim_id, hop.status_code
                )
                .context("writing bucket file")?;
            }
            ParsedLine::Blank => {}
            ParsedLine::Malformed => {
                if skipped_lines == 0 {
                    warn!(line = line_no, "skipping malformed hop line");
                }
                skipped_lines += 1;
            }
        }
    }

    for writer in &mut writers {
        writer.flush().context("flushing bucket file")?;
    }
    drop(writers);

    debug!(
        lines = line_no,
        skipped = skipped_lines,
        buckets,
        "partition phase complete"
    );

    Ok(Partition {
        bucket_paths,
        skipped_lines,
        _dir: dir,
    })
}
