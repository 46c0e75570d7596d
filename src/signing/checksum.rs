//! Signed package checksum.

use super::error::{ErrorExt, Result};
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::io::AsyncReadExt;

/// Calculates the hex-encoded SHA-256 of a file, reading in 8KB chunks.
pub async fn calculate_sha256(file_path: &Path) -> Result<String> {
    let mut file = tokio::fs::File::open(file_path)
        .await
        .fs_context("opening file for hashing", file_path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];

    loop {
        let n = file
            .read(&mut buffer)
            .await
            .fs_context("reading file for hash calculation", file_path)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
