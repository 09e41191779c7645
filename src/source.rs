//! Input acquisition: local files and http(s) URLs.
//!
//! URLs are fetched to a temp file before phase 1 so the partitioner
//! only ever streams from local storage. Uses ureq (sync HTTP), so no
//! async runtime is needed.

use anyhow::{ensure, Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing::debug;

/// Check if a string looks like a URL we can fetch.
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// A resolved local input path. Holds the downloaded temp file alive
/// for URL sources so it is removed when the run ends.
#[derive(Debug)]
pub struct AcquiredInput {
    path: PathBuf,
    _download: Option<NamedTempFile>,
}

impl AcquiredInput {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Resolve an input argument to a readable local file.
///
/// Local paths must exist and be regular files; URLs are downloaded in
/// full. Fetch failures are fatal.
pub fn acquire(source: &str) -> Result<AcquiredInput> {
    if is_url(source) {
        return download(source);
    }

    let path = PathBuf::from(source);
    ensure!(path.exists(), "file not found: {source}");
    ensure!(path.is_file(), "not a file: {source}");
    Ok(AcquiredInput {
        path,
        _download: None,
    })
}

fn make_agent() -> ureq::Agent {
    ureq::config::Config::builder()
        .timeout_global(Some(Duration::from_secs(300)))
        .build()
        .new_agent()
}

fn download(url: &str) -> Result<AcquiredInput> {
    let agent = make_agent();
    let response = agent
        .get(url)
        .call()
        .with_context(|| format!("fetching {url}"))?;

    let mut temp = tempfile::Builder::new()
        .prefix("routeloop-input-")
        .suffix(".txt")
        .tempfile()
        .context("creating download temp file")?;

    let mut body = response.into_body().into_reader();
    let bytes = std::io::copy(&mut body, temp.as_file_mut())
        .with_context(|| format!("downloading {url}"))?;
    debug!(url, bytes, "downloaded input to temp file");

    let path = temp.path().to_path_buf();
    Ok(AcquiredInput {
        path,
        _download: Some(temp),
    })
}
