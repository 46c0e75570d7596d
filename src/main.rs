//! ESRP Debian signer - signs the unsigned .deb produced by a packaging job.
//!
//! Locates the package, writes the signing request documents, runs the ESRP
//! signing client and reports the signed artifact.

use esrp_deb_sign::cli::{self, RuntimeConfig};
use std::process;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Run CLI and get exit code
    let exit_code = match cli::run().await {
        Ok(code) => code,
        Err(e) => {
            let output = RuntimeConfig::new(false, false);
            output.error(&e.to_string());
            for suggestion in e.recovery_suggestions() {
                output.indent(&format!("hint: {}", suggestion));
            }
            1
        }
    };

    process::exit(exit_code);
}
