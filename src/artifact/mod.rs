//! Remote model artifact fetching.
//!
//! A model artifact is identified by a remote source URL and a local storage
//! path. [`ensure_local_artifact`] guarantees the local path exists before
//! the runtime tries to load it, downloading the resource at most once: an
//! existing file short-circuits with zero network access.
//!
//! Presence is tested by a plain existence check, not an integrity check, so
//! a corrupt partial file from an interrupted earlier run would be treated as
//! valid. The optional `expected_len` argument mitigates this for fresh
//! downloads by rejecting a body whose byte count differs before it is
//! written; a partial write itself is not rolled back.

use crate::core::errors::{ClassifyError, ClassifyResult};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Ensures the named model artifact exists on local storage.
///
/// If `local_path` already denotes an existing file, returns immediately
/// without any network access. Otherwise performs a single blocking retrieval
/// of the entire resource into memory and writes it to `local_path`,
/// creating parent directories as needed.
///
/// A single attempt is made per call; the caller decides whether to retry.
///
/// # Errors
///
/// * `Fetch{Network}` if the request fails, the response has a non-success
///   status, the body cannot be read, or (when `expected_len` is set) the
///   body's byte count differs from the expected size.
/// * `Fetch{Write}` if the directory creation or file write fails.
pub fn ensure_local_artifact(
    source_url: &str,
    local_path: &Path,
    expected_len: Option<u64>,
) -> ClassifyResult<()> {
    if local_path.exists() {
        debug!(path = %local_path.display(), "model artifact already present, skipping download");
        return Ok(());
    }

    info!(url = source_url, path = %local_path.display(), "downloading model artifact");

    let response = reqwest::blocking::get(source_url).map_err(|e| {
        ClassifyError::fetch_network(format!("request to '{source_url}' failed"), e)
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ClassifyError::fetch_network_status(format!(
            "'{source_url}' returned status {status}"
        )));
    }

    let body = response.bytes().map_err(|e| {
        ClassifyError::fetch_network(format!("reading response body from '{source_url}' failed"), e)
    })?;

    if let Some(expected) = expected_len {
        if body.len() as u64 != expected {
            return Err(ClassifyError::fetch_network_status(format!(
                "'{source_url}' returned {} bytes, expected {expected}",
                body.len()
            )));
        }
    }

    if let Some(parent) = local_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                ClassifyError::fetch_write(
                    format!("creating directory '{}' failed", parent.display()),
                    e,
                )
            })?;
        }
    }

    fs::write(local_path, &body).map_err(|e| {
        ClassifyError::fetch_write(
            format!(
                "writing {} bytes to '{}' failed",
                body.len(),
                local_path.display()
            ),
            e,
        )
    })?;

    info!(bytes = body.len(), path = %local_path.display(), "model artifact stored");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::FetchFailure;

    // An address nothing listens on; any attempt to fetch from it fails, so
    // a success can only come from skipping the network entirely.
    const DEAD_URL: &str = "http://127.0.0.1:1/model.onnx";

    #[test]
    fn existing_file_skips_the_network() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.onnx");
        fs::write(&path, b"fake artifact").unwrap();

        assert!(ensure_local_artifact(DEAD_URL, &path, None).is_ok());
        // Idempotent: a second call with the same arguments also touches
        // nothing.
        assert!(ensure_local_artifact(DEAD_URL, &path, None).is_ok());
        assert_eq!(fs::read(&path).unwrap(), b"fake artifact");
    }

    #[test]
    fn missing_file_with_unreachable_source_is_a_network_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.onnx");

        let err = ensure_local_artifact(DEAD_URL, &path, None).unwrap_err();
        assert!(matches!(
            err,
            ClassifyError::Fetch {
                kind: FetchFailure::Network,
                ..
            }
        ));
        assert!(!path.exists());
    }

    #[test]
    fn failed_fetch_leaves_a_later_call_able_to_succeed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.onnx");

        assert!(ensure_local_artifact(DEAD_URL, &path, None).is_err());

        // Simulate the resource appearing out of band; the next call must
        // succeed because presence short-circuits the fetch.
        fs::write(&path, b"fake artifact").unwrap();
        assert!(ensure_local_artifact(DEAD_URL, &path, None).is_ok());
    }
}
