//! Command line argument parsing and validation.
//!
//! Every input can come from a flag or, for the CI-provided values, from the
//! environment. Values are trimmed since CI variables often carry a trailing
//! newline.

use crate::error::{CliError, Result, SignerError};
use crate::profile::SigningProfile;
use crate::signing::SignerConfig;
use crate::signing::invoker::{DEFAULT_OUTPUT_LOG, DEFAULT_TOOL, LOG_LEVELS};
use clap::Parser;
use path_absolutize::Absolutize;
use std::path::PathBuf;

/// Sign a Debian package through the ESRP signing client
#[derive(Parser, Debug, Clone)]
#[command(
    name = "esrp_deb_sign",
    version,
    about = "Sign a Debian package through the ESRP signing client",
    long_about = "Finds the single .deb under <workspace>/<artifacts>/unsigned/, writes the
auth.json, input.json and policy.json request documents, runs the signing
client, and reports the signed package at <workspace>/<artifacts>/signed/.

Usage:
  GITHUB_WORKSPACE=$PWD ARTIFACTS_DIR=out esrp_deb_sign
  esrp_deb_sign --workspace . --artifacts-dir out --dry-run

Exit code 0 = the signing client succeeded. Exit code 1 = no package found,
or the signing client failed."
)]
pub struct Args {
    /// Workspace root; the signing client runs here
    #[arg(long, env = "GITHUB_WORKSPACE", value_name = "DIR")]
    pub workspace: String,

    /// Artifacts directory, relative to the workspace
    #[arg(long, env = "ARTIFACTS_DIR", value_name = "DIR")]
    pub artifacts_dir: String,

    /// Signing client executable, relative to the workspace or on PATH
    #[arg(long, env = "ESRP_TOOL", value_name = "PATH", default_value = DEFAULT_TOOL)]
    pub esrp_tool: String,

    /// Directory receiving auth.json, input.json, policy.json and the output log
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub config_dir: PathBuf,

    /// File name of the signing client's output log
    #[arg(long, value_name = "FILE", default_value = DEFAULT_OUTPUT_LOG)]
    pub output_log: String,

    /// Signing client log level: Verbose, Information, Warning, Error
    #[arg(long, value_name = "LEVEL", default_value = "Verbose")]
    pub log_level: String,

    /// Correlation id for the sign request (default: derived from the file name)
    #[arg(long, value_name = "ID")]
    pub correlation_id: Option<String>,

    /// TOML signing profile overriding identity, key and policy values
    #[arg(long, env = "ESRP_PROFILE", value_name = "FILE")]
    pub profile: Option<PathBuf>,

    /// Fail if the signed package is missing after the client succeeds
    #[arg(long)]
    pub require_signed: bool,

    /// Write the request documents without running the signing client
    #[arg(long)]
    pub dry_run: bool,

    /// Print extra detail
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.workspace.trim().is_empty() {
            return Err("Workspace cannot be empty (set GITHUB_WORKSPACE or --workspace)".to_string());
        }

        if self.artifacts_dir.trim().is_empty() {
            return Err(
                "Artifacts directory cannot be empty (set ARTIFACTS_DIR or --artifacts-dir)"
                    .to_string(),
            );
        }

        if self.esrp_tool.trim().is_empty() {
            return Err("Signing client path cannot be empty".to_string());
        }

        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Valid levels: {}",
                self.log_level,
                LOG_LEVELS.join(", ")
            ));
        }

        let output_log = self.output_log.trim();
        if output_log.is_empty() || output_log.contains(['/', '\\']) {
            return Err(format!(
                "Output log must be a plain file name: {:?}",
                self.output_log
            ));
        }

        if let Some(id) = &self.correlation_id {
            if id.trim().is_empty() {
                return Err("Correlation id cannot be empty".to_string());
            }
        }

        Ok(())
    }

    /// Builds the pipeline configuration, loading the profile if one is given.
    pub async fn into_signer_config(self) -> Result<SignerConfig> {
        self.validate()
            .map_err(|reason| SignerError::Cli(CliError::InvalidArguments { reason }))?;

        let profile = SigningProfile::load_or_default(self.profile.as_deref()).await?;

        Ok(SignerConfig {
            workspace: PathBuf::from(self.workspace.trim()).absolutize()?.into_owned(),
            artifacts_dir: PathBuf::from(self.artifacts_dir.trim()),
            tool: PathBuf::from(self.esrp_tool.trim()),
            config_dir: self.config_dir.absolutize()?.into_owned(),
            output_log: self.output_log.trim().to_string(),
            log_level: self.log_level,
            correlation_id: self.correlation_id.map(|id| id.trim().to_string()),
            require_signed: self.require_signed,
            dry_run: self.dry_run,
            profile,
        })
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self::new(args.verbose, false)
    }
}

impl RuntimeConfig {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            output: super::OutputManager::new(verbose, quiet),
        }
    }

    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Print a plain line
    pub fn println(&self, message: &str) {
        report_write_failure(self.output.println(message));
    }

    /// Print verbose message if in verbose mode
    pub fn verbose_println(&self, message: &str) {
        report_write_failure(self.output.verbose(message));
    }

    /// Print success message
    pub fn success(&self, message: &str) {
        report_write_failure(self.output.success(message));
    }

    /// Print warning message
    pub fn warn(&self, message: &str) {
        report_write_failure(self.output.warn(message));
    }

    /// Print error message
    pub fn error(&self, message: &str) {
        report_write_failure(self.output.error(message));
    }

    /// Print progress message
    pub fn progress(&self, message: &str) {
        report_write_failure(self.output.progress(message));
    }

    /// Print section header
    pub fn section(&self, title: &str) {
        report_write_failure(self.output.section(title));
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        report_write_failure(self.output.indent(message));
    }
}

// Terminal write failures (closed pipe) must not abort signing.
fn report_write_failure(result: std::io::Result<()>) {
    if let Err(e) = result {
        log::debug!("Failed to write output: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["esrp_deb_sign", "--workspace", "/ws", "--artifacts-dir", "out"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults() {
        let args = parse(&[]);
        assert_eq!(args.esrp_tool, DEFAULT_TOOL);
        assert_eq!(args.output_log, "esrp_out.json");
        assert_eq!(args.log_level, "Verbose");
        assert_eq!(args.config_dir, PathBuf::from("."));
        assert!(!args.require_signed);
        assert!(!args.dry_run);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        let err = parse(&["--log-level", "Loud"]).validate().unwrap_err();
        assert!(err.contains("Invalid log level: Loud"));
    }

    #[test]
    fn output_log_must_be_a_file_name() {
        assert!(parse(&["--output-log", "a/b.json"]).validate().is_err());
        assert!(parse(&["--output-log", " "]).validate().is_err());
    }

    #[test]
    fn blank_workspace_is_rejected() {
        let mut args = parse(&[]);
        args.workspace = "  \n".to_string();
        assert!(args.validate().unwrap_err().contains("GITHUB_WORKSPACE"));
    }

    #[tokio::test]
    async fn signer_config_trims_values() {
        let mut args = parse(&["--correlation-id", " abc "]);
        args.workspace = "/ws\n".to_string();
        args.artifacts_dir = " out ".to_string();

        let config = args.into_signer_config().await.unwrap();
        assert_eq!(config.workspace, PathBuf::from("/ws"));
        assert_eq!(config.artifacts_dir, PathBuf::from("out"));
        assert_eq!(config.correlation_id.as_deref(), Some("abc"));
        assert_eq!(config.profile, SigningProfile::default());
        assert!(config.config_dir.is_absolute());
    }

    #[tokio::test]
    async fn relative_workspace_is_made_absolute() {
        let mut args = parse(&[]);
        args.workspace = "ws".to_string();

        let config = args.into_signer_config().await.unwrap();
        assert!(config.workspace.is_absolute());
        assert!(config.workspace.ends_with("ws"));
    }

    #[tokio::test]
    async fn invalid_arguments_become_cli_errors() {
        let args = parse(&["--log-level", "Loud"]);
        let err = args.into_signer_config().await.unwrap_err();
        assert!(matches!(err, SignerError::Cli(CliError::InvalidArguments { .. })));
    }
}
