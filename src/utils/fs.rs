//! File system utilities for the signing pipeline.
//!
//! Documents handed to the signing client are plain JSON files; these helpers
//! write and read them with the path attached to every error.

use crate::signing::error::{ErrorExt, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::fs;

/// Serializes `value` as JSON into `path`, replacing any existing file.
///
/// Parent directories are created as needed.
pub async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .fs_context("creating directory", parent)?;
    }

    let bytes = serde_json::to_vec(value)?;
    fs::write(path, bytes)
        .await
        .fs_context("writing JSON document", path)?;
    Ok(())
}

/// Reads and parses a JSON file.
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path)
        .await
        .fs_context("reading JSON document", path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Returns true if `path` exists and is a regular file.
///
/// Unreadable metadata counts as absent.
pub async fn is_regular_file(path: &Path) -> bool {
    match fs::metadata(path).await {
        Ok(metadata) => metadata.is_file(),
        Err(_) => false,
    }
}
