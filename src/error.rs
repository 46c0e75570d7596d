//! Top-level error types for the signing CLI.
//!
//! Everything that reaches `main` is one of these; `main` prints it and exits 1.

use thiserror::Error;

/// Result type alias for CLI-level operations
pub type Result<T> = std::result::Result<T, SignerError>;

/// Main error type for the signing CLI
#[derive(Error, Debug)]
pub enum SignerError {
    /// CLI argument or configuration errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Signing pipeline errors
    #[error("Signing error: {0}")]
    Signing(#[from] crate::signing::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Command execution failed
    #[error("Command execution failed: {command} - {reason}")]
    ExecutionFailed {
        /// Command that failed
        command: String,
        /// Reason for the error
        reason: String,
    },
}

/// Maps a failing result into [`CliError::ExecutionFailed`].
pub trait ExecutionContext<T> {
    /// Tags the error with the command name and a formatted reason.
    fn with_command<F>(self, command: &str, reason: F) -> Result<T>
    where
        F: FnOnce(&dyn std::fmt::Display) -> String;
}

impl<T, E: std::fmt::Display> ExecutionContext<T> for std::result::Result<T, E> {
    fn with_command<F>(self, command: &str, reason: F) -> Result<T>
    where
        F: FnOnce(&dyn std::fmt::Display) -> String,
    {
        self.map_err(|e| {
            SignerError::Cli(CliError::ExecutionFailed {
                command: command.to_string(),
                reason: reason(&e),
            })
        })
    }
}

impl SignerError {
    /// Actionable hints printed below the error message.
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            SignerError::Signing(crate::signing::Error::Discovery { .. }) => vec![
                "Check that the packaging step placed exactly one package in <artifacts>/unsigned/"
                    .to_string(),
                "Check the ARTIFACTS_DIR value (it is relative to GITHUB_WORKSPACE)".to_string(),
            ],
            SignerError::Signing(crate::signing::Error::ToolNotFound { .. }) => vec![
                "Check that the signing client was restored into the workspace".to_string(),
                "Pass --esrp-tool or set ESRP_TOOL to its location".to_string(),
            ],
            SignerError::Signing(crate::signing::Error::Invocation { .. }) => vec![
                "Inspect the signing client output above for the failure reason".to_string(),
            ],
            SignerError::Signing(crate::signing::Error::SignedArtifactMissing { .. }) => vec![
                "Inspect the signing client output log for the per-file status".to_string(),
            ],
            SignerError::Toml(_) => {
                vec!["Check the signing profile against the documented fields".to_string()]
            }
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn with_command_wraps_reason() {
        let failing: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let err = failing
            .with_command("read_profile", |e| format!("Failed: {}", e))
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "CLI error: Command execution failed: read_profile - Failed: gone"
        );
    }

    #[test]
    fn discovery_errors_have_suggestions() {
        let err = SignerError::Signing(crate::signing::Error::Discovery {
            directory: PathBuf::from("/w/out/unsigned"),
            extension: "deb".to_string(),
            reason: "no candidates".to_string(),
        });
        assert!(!err.recovery_suggestions().is_empty());
        assert!(err.to_string().contains("cannot find .deb to sign"));
    }

    #[test]
    fn json_failures_surface_through_signing_errors() {
        let parse = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err = SignerError::from(crate::signing::Error::from(parse));

        assert!(matches!(err, SignerError::Signing(crate::signing::Error::Json(_))));
        assert!(err.to_string().starts_with("Signing error: "));
    }
}
