//! Phase 2: load one bucket and hand out its groups.

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

use crate::models::{Edge, GroupKey};
use crate::stream::parser::{self, ParsedLine};

/// Read one bucket file and group its edges by `(claim_id, status_code)`.
///
/// Groups are returned sorted by key so the visit order is deterministic
/// regardless of hash-map iteration order. Edges within a group retain
/// input order.
pub fn read_groups(bucket_path: &Path) -> Result<Vec<(GroupKey, Vec<Edge>)>> {
    let file = File::open(bucket_path)
        .with_context(|| format!("opening bucket {}", bucket_path.display()))?;
    let mut reader = BufReader::new(file);

    let mut groups: FxHashMap<GroupKey, Vec<Edge>> = FxHashMap::default();
    let mut line = String::new();
    loop {
        line.clear();
        let n = reader
            .read_line(&mut line)
            .with_context(|| format!("reading bucket {}", bucket_path.display()))?;
        if n == 0 {
            break;
        }
        // Bucket files are written by the partitioner, so every line is
        // already normalized and valid.
        let ParsedLine::Hop(hop) = parser::parse_line(&line) else {
            continue;
        };
        groups
            .entry(GroupKey {
                claim_id: hop.claim_id.to_string(),
                status_code: hop.status_code.to_string(),
            })
            .or_default()
            .push(Edge {
                source: hop.source.to_string(),
                destination: hop.destination.to_string(),
            });
    }

    let mut out: Vec<(GroupKey, Vec<Edge>)> = groups.into_iter().collect();
    out.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(out)
}

/// Delete a bucket file once its groups have been folded into the
/// reducer, freeing temp disk before the next bucket is loaded.
pub fn remove_bucket(bucket_path: &Path) {
    if let Err(err) = std::fs::remove_file(bucket_path) {
        debug!(
            bucket = %bucket_path.display(),
            %err,
            "could not remove consumed bucket file"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_bucket(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn groups_by_key_sorted() {
        let bucket = write_bucket(&[
            "A|B|7|9",
            "A|B|7|10",
            "B|A|7|9",
            "X|Y|2|1",
        ]);

        let groups = read_groups(bucket.path()).unwrap();
        let keys: Vec<(&str, &str)> = groups
            .iter()
            .map(|(k, _)| (k.claim_id.as_str(), k.status_code.as_str()))
            .collect();
        assert_eq!(keys, vec![("2", "1"), ("7", "10"), ("7", "9")]);
    }

    #[test]
    fn edges_retain_input_order() {
        let bucket = write_bucket(&["A|B|1|1", "B|C|1|1", "C|A|1|1"]);

        let groups = read_groups(bucket.path()).unwrap();
        assert_eq!(groups.len(), 1);
        let (_, edges) = &groups[0];
        assert_eq!(edges[0].source, "A");
        assert_eq!(edges[1].source, "B");
        assert_eq!(edges[2].source, "C");
    }

    #[test]
    fn empty_bucket_yields_no_groups() {
        let bucket = write_bucket(&[]);
        assert!(read_groups(bucket.path()).unwrap().is_empty());
    }

    #[test]
    fn remove_bucket_deletes_file() {
        let bucket = write_bucket(&["A|B|1|1"]);
        let path = bucket.path().to_path_buf();
        let (_, kept_path) = bucket.keep().unwrap();
        remove_bucket(&kept_path);
        assert!(!path.exists());
    }
}
