//! Signing client execution.

use super::error::{Error, Result};
use super::request::DocumentPaths;
use crate::utils::fs::is_regular_file;
use path_absolutize::Absolutize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Default signing client location, relative to the workspace.
pub const DEFAULT_TOOL: &str = "esrp/tools/EsrpClient.exe";

/// Default name of the output log the client writes.
pub const DEFAULT_OUTPUT_LOG: &str = "esrp_out.json";

/// Log levels accepted by the signing client's `-l` flag.
pub const LOG_LEVELS: [&str; 4] = ["Verbose", "Information", "Warning", "Error"];

/// Runs the external signing client.
#[derive(Debug, Clone)]
pub struct SigningInvoker {
    tool: PathBuf,
    workspace: PathBuf,
    log_level: String,
}

impl SigningInvoker {
    /// Creates an invoker.
    ///
    /// # Arguments
    ///
    /// * `tool` - Client path; relative paths are resolved against `workspace`
    /// * `workspace` - Working directory of the child process
    /// * `log_level` - Value passed to `-l`
    pub fn new(tool: PathBuf, workspace: PathBuf, log_level: impl Into<String>) -> Self {
        Self {
            tool,
            workspace,
            log_level: log_level.into(),
        }
    }

    /// Resolves the configured tool to an absolute executable path.
    ///
    /// Absolute paths are taken as is. Relative paths are tried against the
    /// workspace first; a bare program name that is not in the workspace is
    /// looked up on `PATH`. The child runs inside the workspace, so a relative
    /// result would be resolved a second time there.
    pub async fn resolve_tool(&self) -> Result<PathBuf> {
        if self.tool.is_absolute() {
            return if is_regular_file(&self.tool).await {
                Ok(self.tool.clone())
            } else {
                Err(self.not_found())
            };
        }

        let in_workspace = self.workspace.join(&self.tool);
        if is_regular_file(&in_workspace).await {
            return Ok(in_workspace.absolutize()?.into_owned());
        }

        if self.tool.components().count() == 1 {
            match which::which(&self.tool) {
                Ok(path) => {
                    log::debug!("Found {} on PATH at {}", self.tool.display(), path.display());
                    return Ok(path);
                }
                Err(e) => log::debug!("{} not found on PATH: {}", self.tool.display(), e),
            }
        }

        Err(self.not_found())
    }

    /// Builds the client argument vector.
    ///
    /// `sign -a <auth> -i <input> -p <policy> -o <output> -l <level>`
    pub fn build_args(&self, documents: &DocumentPaths, output_log: &Path) -> Vec<OsString> {
        vec![
            "sign".into(),
            "-a".into(),
            documents.auth.clone().into_os_string(),
            "-i".into(),
            documents.input.clone().into_os_string(),
            "-p".into(),
            documents.policy.clone().into_os_string(),
            "-o".into(),
            output_log.to_path_buf().into_os_string(),
            "-l".into(),
            self.log_level.clone().into(),
        ]
    }

    /// Runs the client with the workspace as its working directory.
    ///
    /// Output is inherited so the client's own log lands in the CI log.
    /// Blocks until the client exits; there is no timeout. A spawn failure
    /// or non-zero exit is an [`Error::Invocation`].
    pub async fn invoke(&self, documents: &DocumentPaths, output_log: &Path) -> Result<()> {
        let tool = self.resolve_tool().await?;
        let args = self.build_args(documents, output_log);

        log::info!(
            "Running {} {}",
            tool.display(),
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );

        let status = Command::new(&tool)
            .args(&args)
            .current_dir(&self.workspace)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| Error::Invocation {
                tool: tool.display().to_string(),
                reason: e.to_string(),
            })?;

        if !status.success() {
            return Err(Error::Invocation {
                tool: tool.display().to_string(),
                reason: match status.code() {
                    Some(code) => format!("exited with code {}", code),
                    None => "terminated by signal".to_string(),
                },
            });
        }

        log::debug!("{} exited successfully", tool.display());
        Ok(())
    }

    fn not_found(&self) -> Error {
        Error::ToolNotFound {
            tool: self.tool.display().to_string(),
            workspace: self.workspace.clone(),
        }
    }
}
