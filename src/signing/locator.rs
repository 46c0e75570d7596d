//! Unsigned package discovery.
//!
//! Exactly one package is expected under `<workspace>/<artifacts>/unsigned/`.
//! Enumeration order is whatever `glob` yields; only the first candidate is
//! ever used.

use super::error::{Error, Result};
use crate::bail;
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};

/// Subdirectory of the artifacts directory holding packages to sign.
pub const UNSIGNED_DIR: &str = "unsigned";

/// Subdirectory of the artifacts directory receiving signed packages.
pub const SIGNED_DIR: &str = "signed";

/// The package selected for signing and the directories derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedArtifact {
    /// Bare file name of the package, e.g. `pkg_1.0_amd64.deb`
    pub file_name: String,
    /// `<workspace>/<artifacts>/unsigned`
    pub source_root: PathBuf,
    /// `<workspace>/<artifacts>`
    pub destination_root: PathBuf,
}

impl LocatedArtifact {
    /// Destination relative to [`Self::destination_root`], as written into
    /// the sign request.
    pub fn destination_location(&self) -> String {
        format!("{}/{}", SIGNED_DIR, self.file_name)
    }

    /// Absolute path the signed package is expected at.
    pub fn signed_path(&self) -> PathBuf {
        self.destination_root.join(SIGNED_DIR).join(&self.file_name)
    }

    /// Absolute path of the unsigned package.
    pub fn source_path(&self) -> PathBuf {
        self.source_root.join(&self.file_name)
    }
}

/// Finds the single unsigned package in the artifacts directory.
#[derive(Debug, Clone)]
pub struct ArtifactLocator {
    workspace: PathBuf,
    artifacts_dir: PathBuf,
    extension: String,
}

impl ArtifactLocator {
    /// Creates a locator.
    ///
    /// # Arguments
    ///
    /// * `workspace` - Workspace root
    /// * `artifacts_dir` - Artifacts directory, relative to the workspace
    /// * `extension` - Package extension without the dot (e.g. `deb`)
    pub fn new(workspace: PathBuf, artifacts_dir: PathBuf, extension: impl Into<String>) -> Self {
        Self {
            workspace,
            artifacts_dir,
            extension: extension.into(),
        }
    }

    /// `<workspace>/<artifacts>`, made absolute.
    pub fn destination_root(&self) -> Result<PathBuf> {
        let joined = self.workspace.join(&self.artifacts_dir);
        Ok(joined.absolutize()?.into_owned())
    }

    /// `<workspace>/<artifacts>/unsigned`, made absolute.
    pub fn source_root(&self) -> Result<PathBuf> {
        Ok(self.destination_root()?.join(UNSIGNED_DIR))
    }

    /// Lists every entry matching `*.<extension>` in the unsigned directory.
    ///
    /// A missing directory yields an empty list.
    pub async fn candidates(&self) -> Result<Vec<PathBuf>> {
        let source_root = self.source_root()?;
        let pattern = candidate_pattern(&source_root, &self.extension)?;

        tokio::task::spawn_blocking(move || {
            let mut found = Vec::new();
            for entry in glob::glob(&pattern)? {
                match entry {
                    Ok(path) => found.push(path),
                    Err(e) => log::debug!("Skipping unreadable entry: {}", e),
                }
            }
            Ok::<Vec<PathBuf>, Error>(found)
        })
        .await
        .map_err(|e| Error::GenericError(format!("Artifact discovery task panicked: {}", e)))?
    }

    /// Selects the package to sign.
    ///
    /// The candidate list is printed before any decision is made. Fails if
    /// there is no candidate, or if the first one is not a regular file with
    /// the expected extension.
    pub async fn locate(&self, runtime_config: &crate::cli::RuntimeConfig) -> Result<LocatedArtifact> {
        let source_root = self.source_root()?;
        let candidates = self.candidates().await?;

        runtime_config.println("Found files:");
        runtime_config.println(&format_candidates(&candidates));

        let Some(first) = candidates.first() else {
            return Err(self.discovery_error(&source_root, "no matching files"));
        };

        if candidates.len() > 1 {
            log::warn!(
                "{} candidates found, using {} and ignoring {:?}",
                candidates.len(),
                first.display(),
                &candidates[1..]
            );
        }

        if first.extension().and_then(|e| e.to_str()) != Some(self.extension.as_str()) {
            return Err(self.discovery_error(
                &source_root,
                &format!("{} does not have a .{} extension", first.display(), self.extension),
            ));
        }

        if !crate::utils::fs::is_regular_file(first).await {
            return Err(self.discovery_error(
                &source_root,
                &format!("{} is not a regular file", first.display()),
            ));
        }

        let file_name = first
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                self.discovery_error(
                    &source_root,
                    &format!("{} has a file name that is not valid UTF-8", first.display()),
                )
            })?
            .to_string();

        log::info!("Selected {} for signing", file_name);

        Ok(LocatedArtifact {
            file_name,
            source_root,
            destination_root: self.destination_root()?,
        })
    }

    fn discovery_error(&self, directory: &Path, reason: &str) -> Error {
        Error::Discovery {
            directory: directory.to_path_buf(),
            extension: self.extension.clone(),
            reason: reason.to_string(),
        }
    }
}

fn candidate_pattern(source_root: &Path, extension: &str) -> Result<String> {
    let Some(root) = source_root.to_str() else {
        bail!(
            "Artifacts path contains invalid UTF-8: {}",
            source_root.display()
        );
    };

    let pattern = format!(
        "{}/*.{}",
        glob::Pattern::escape(root),
        glob::Pattern::escape(extension)
    );
    // Reject a malformed pattern before handing it to the blocking task.
    glob::Pattern::new(&pattern)?;
    Ok(pattern)
}

/// Renders the candidate list as `[]` or one quoted path per line.
pub fn format_candidates(candidates: &[PathBuf]) -> String {
    format!("{:#?}", candidates)
}
