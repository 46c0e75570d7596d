//! Post-invocation reporting.
//!
//! Prints the client's output log when present and checks for the signed
//! package. A missing package is only an error when the caller asks for it.

use super::checksum::calculate_sha256;
use super::error::{Error, Result};
use crate::cli::RuntimeConfig;
use crate::utils::fs::{is_regular_file, read_json};
use std::path::{Path, PathBuf};

/// The signed package as found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedArtifact {
    pub path: PathBuf,
    pub size: u64,
    pub sha256: String,
}

/// What the reporter observed after the client exited successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningOutcome {
    /// Where the signed package was expected
    pub signed_path: PathBuf,
    /// Output log contents, if the client wrote one
    pub output_log: Option<serde_json::Value>,
    /// The signed package, if it exists
    pub signed: Option<SignedArtifact>,
}

impl SigningOutcome {
    pub fn is_signed(&self) -> bool {
        self.signed.is_some()
    }
}

/// Inspects the signing client's results.
#[derive(Debug, Clone)]
pub struct ResultReporter {
    output_log: PathBuf,
    signed_path: PathBuf,
    require_signed: bool,
}

impl ResultReporter {
    /// # Arguments
    ///
    /// * `output_log` - Output log path passed to the client
    /// * `signed_path` - Expected signed package location
    /// * `require_signed` - Treat a missing signed package as an error
    pub fn new(output_log: PathBuf, signed_path: PathBuf, require_signed: bool) -> Self {
        Self {
            output_log,
            signed_path,
            require_signed,
        }
    }

    /// Reports on the run.
    ///
    /// An output log that exists but is not valid JSON is an error.
    pub async fn report(&self, runtime_config: &RuntimeConfig) -> Result<SigningOutcome> {
        let output_log = self.print_output_log(runtime_config).await?;

        let signed = if is_regular_file(&self.signed_path).await {
            let artifact = describe(&self.signed_path).await?;
            runtime_config.success(&format!("Success!\nSigned {}", artifact.path.display()));
            runtime_config.indent(&format!("Size:   {} bytes", artifact.size));
            runtime_config.indent(&format!("SHA256: {}", artifact.sha256));
            Some(artifact)
        } else if self.require_signed {
            return Err(Error::SignedArtifactMissing {
                path: self.signed_path.clone(),
            });
        } else {
            runtime_config.warn(&format!(
                "Signed package not found at {}",
                self.signed_path.display()
            ));
            log::warn!(
                "Signing client reported success but {} is missing",
                self.signed_path.display()
            );
            None
        };

        Ok(SigningOutcome {
            signed_path: self.signed_path.clone(),
            output_log,
            signed,
        })
    }

    async fn print_output_log(
        &self,
        runtime_config: &RuntimeConfig,
    ) -> Result<Option<serde_json::Value>> {
        if !is_regular_file(&self.output_log).await {
            log::debug!("No output log at {}", self.output_log.display());
            return Ok(None);
        }

        let value: serde_json::Value = read_json(&self.output_log).await?;
        runtime_config.println("ESRP output json:");
        runtime_config.println(&serde_json::to_string_pretty(&value)?);
        Ok(Some(value))
    }
}

async fn describe(path: &Path) -> Result<SignedArtifact> {
    let size = tokio::fs::metadata(path).await?.len();
    let sha256 = calculate_sha256(path).await?;
    Ok(SignedArtifact {
        path: path.to_path_buf(),
        size,
        sha256,
    })
}
