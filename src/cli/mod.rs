//! Command line interface for the Debian package signer.

mod args;
mod output;

pub use args::{Args, RuntimeConfig};
pub use output::OutputManager;

use crate::error::Result;
use crate::signing::{RunOutcome, Signer};

/// Main CLI entry point. Returns the process exit code.
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    let runtime_config = RuntimeConfig::from(&args);
    execute(args, &runtime_config).await
}

/// Runs the signing pipeline for already-parsed arguments.
pub async fn execute(args: Args, runtime_config: &RuntimeConfig) -> Result<i32> {
    let config = args.into_signer_config().await?;
    log::debug!("Signer configuration: {:?}", config);

    let signer = Signer::new(config);
    match signer.run(runtime_config).await? {
        RunOutcome::DryRun { artifact, .. } => {
            log::info!("Dry run complete for {}", artifact.file_name);
        }
        RunOutcome::Completed { outcome, .. } => {
            log::info!(
                "Signing complete, signed package {}",
                if outcome.is_signed() { "present" } else { "absent" }
            );
        }
    }

    Ok(0)
}
