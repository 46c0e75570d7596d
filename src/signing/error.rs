//! Error types for the signing pipeline.
//!
//! Every variant maps to a fatal outcome for the run; there is no retry or
//! degraded mode. Messages are written for the operator reading a CI log.

use std::path::{Path, PathBuf};
use thiserror::Error as ThisError;

/// Result type alias for signing operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the discover → configure → invoke → verify steps.
#[derive(ThisError, Debug)]
pub enum Error {
    /// No signable package was found in the unsigned directory
    #[error("cannot find .{extension} to sign in {}: {reason}", .directory.display())]
    Discovery {
        /// Directory that was searched
        directory: PathBuf,
        /// Expected package extension (without the dot)
        extension: String,
        /// Why discovery failed
        reason: String,
    },

    /// The signing client could not be located
    #[error("signing client not found: {tool} (looked in {})", .workspace.display())]
    ToolNotFound {
        /// Tool path or name as configured
        tool: String,
        /// Workspace the tool path was resolved against
        workspace: PathBuf,
    },

    /// The signing client failed to start or exited unsuccessfully
    #[error("failed to run {tool}: {reason}")]
    Invocation {
        /// Resolved tool path
        tool: String,
        /// Exit status or spawn failure
        reason: String,
    },

    /// The client reported success but the signed package is missing
    #[error("signing client exited successfully but {} does not exist", .path.display())]
    SignedArtifactMissing {
        /// Expected location of the signed package
        path: PathBuf,
    },

    /// Filesystem error with the operation and path that caused it
    #[error("{context} {}: {source}", .path.display())]
    Fs {
        /// What was being done
        context: &'static str,
        /// Path involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Bare IO error
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization or parse failure
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    /// Invalid glob pattern built from the artifacts path
    #[error("{0}")]
    Pattern(#[from] glob::PatternError),

    /// Anything else
    #[error("{0}")]
    GenericError(String),
}

/// Attaches filesystem context to IO results.
pub trait ErrorExt<T> {
    /// Wraps the error with a description of the operation and the path.
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|source| Error::Fs {
            context,
            path: path.as_ref().to_path_buf(),
            source,
        })
    }
}

/// Returns early with a [`Error::GenericError`] built from a format string.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::signing::Error::GenericError(format!($($arg)*)))
    };
}
