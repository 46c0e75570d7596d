//! Pipeline orchestration: discover → configure → invoke → verify.

use super::error::Result;
use super::invoker::SigningInvoker;
use super::locator::{ArtifactLocator, LocatedArtifact};
use super::report::{ResultReporter, SigningOutcome};
use super::request::{DocumentPaths, RequestDocuments};
use crate::cli::RuntimeConfig;
use crate::profile::SigningProfile;
use std::path::PathBuf;

/// Everything one signing run needs.
#[derive(Debug, Clone)]
pub struct SignerConfig {
    /// Workspace root; the signing client runs here
    pub workspace: PathBuf,
    /// Artifacts directory, relative to the workspace
    pub artifacts_dir: PathBuf,
    /// Signing client path
    pub tool: PathBuf,
    /// Directory receiving the request documents and output log
    pub config_dir: PathBuf,
    /// Output log file name inside `config_dir`
    pub output_log: String,
    /// Client log level
    pub log_level: String,
    /// Correlation id override
    pub correlation_id: Option<String>,
    /// Fail if the signed package is missing after a successful run
    pub require_signed: bool,
    /// Stop after writing the documents
    pub dry_run: bool,
    pub profile: SigningProfile,
}

/// Result of a run.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// Documents were written and the client was not invoked
    DryRun {
        artifact: LocatedArtifact,
        documents: DocumentPaths,
    },
    /// The client ran and exited successfully
    Completed {
        artifact: LocatedArtifact,
        documents: DocumentPaths,
        outcome: SigningOutcome,
    },
}

/// Runs the four signing steps strictly in order.
#[derive(Debug)]
pub struct Signer {
    config: SignerConfig,
}

impl Signer {
    pub fn new(config: SignerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SignerConfig {
        &self.config
    }

    /// Output log path handed to the client.
    pub fn output_log_path(&self) -> PathBuf {
        self.config.config_dir.join(&self.config.output_log)
    }

    /// Runs the pipeline. Any error is terminal; written documents are left
    /// in place.
    pub async fn run(&self, runtime_config: &RuntimeConfig) -> Result<RunOutcome> {
        let config = &self.config;

        runtime_config.section("Locating unsigned package");
        let locator = ArtifactLocator::new(
            config.workspace.clone(),
            config.artifacts_dir.clone(),
            config.profile.signing.package_extension.clone(),
        );
        let artifact = locator.locate(runtime_config).await?;

        runtime_config.section("Writing signing request");
        let documents = RequestDocuments::build(
            &artifact,
            &config.profile,
            config.correlation_id.as_deref(),
        );
        let paths = documents.write_to(&config.config_dir).await?;
        if let Some(file) = documents.request_file() {
            runtime_config.verbose_println(&format!(
                "{} -> {} (correlation id {})",
                file.source_location, file.destination_location, file.customer_correlation_id
            ));
        }

        if config.dry_run {
            runtime_config.progress("Dry run: signing client not invoked");
            for path in [&paths.auth, &paths.input, &paths.policy] {
                runtime_config.indent(&path.display().to_string());
            }
            return Ok(RunOutcome::DryRun {
                artifact,
                documents: paths,
            });
        }

        runtime_config.section("Running signing client");
        let output_log = self.output_log_path();
        let invoker = SigningInvoker::new(
            config.tool.clone(),
            config.workspace.clone(),
            config.log_level.clone(),
        );
        invoker.invoke(&paths, &output_log).await?;

        runtime_config.section("Checking result");
        let reporter = ResultReporter::new(output_log, artifact.signed_path(), config.require_signed);
        let outcome = reporter.report(runtime_config).await?;

        Ok(RunOutcome::Completed {
            artifact,
            documents: paths,
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::Error;

    fn config(workspace: &std::path::Path, dry_run: bool) -> SignerConfig {
        SignerConfig {
            workspace: workspace.to_path_buf(),
            artifacts_dir: "out".into(),
            tool: "missing-client.exe".into(),
            config_dir: workspace.join("cfg"),
            output_log: "esrp_out.json".to_string(),
            log_level: "Verbose".to_string(),
            correlation_id: None,
            require_signed: false,
            dry_run,
            profile: SigningProfile::default(),
        }
    }

    fn with_package(name: &str) -> tempfile::TempDir {
        let workspace = tempfile::tempdir().unwrap();
        let unsigned = workspace.path().join("out/unsigned");
        std::fs::create_dir_all(&unsigned).unwrap();
        std::fs::write(unsigned.join(name), b"deb").unwrap();
        workspace
    }

    #[tokio::test]
    async fn dry_run_writes_documents_only() {
        let workspace = with_package("pkg_1.0_amd64.deb");
        let signer = Signer::new(config(workspace.path(), true));

        let outcome = signer.run(&RuntimeConfig::new(false, true)).await.unwrap();

        match outcome {
            RunOutcome::DryRun { artifact, documents } => {
                assert_eq!(artifact.file_name, "pkg_1.0_amd64.deb");
                assert!(documents.auth.is_file());
                assert!(documents.input.is_file());
                assert!(documents.policy.is_file());
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(!signer.output_log_path().exists());
    }

    #[tokio::test]
    async fn documents_are_written_before_invocation() {
        let workspace = with_package("pkg_1.0_amd64.deb");
        let signer = Signer::new(config(workspace.path(), false));

        let err = signer.run(&RuntimeConfig::new(false, true)).await.unwrap_err();

        assert!(matches!(err, Error::ToolNotFound { .. }));
        assert!(workspace.path().join("cfg/input.json").is_file());
    }

    #[tokio::test]
    async fn discovery_failure_writes_nothing() {
        let workspace = tempfile::tempdir().unwrap();
        let signer = Signer::new(config(workspace.path(), false));

        let err = signer.run(&RuntimeConfig::new(false, true)).await.unwrap_err();

        assert!(matches!(err, Error::Discovery { .. }));
        assert!(!workspace.path().join("cfg").exists());
    }
}
