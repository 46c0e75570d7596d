//! Debian package signing through the ESRP signing client.
//!
//! A run is a single linear pipeline:
//!
//! 1. [`locator`] finds the one unsigned package under `<artifacts>/unsigned/`
//! 2. [`request`] writes `auth.json`, `input.json` and `policy.json`
//! 3. [`invoker`] runs the signing client against those documents
//! 4. [`report`] prints the client's output log and checks for the signed package
//!
//! [`Signer`] drives the four steps; every failure ends the run.
//!
//! # Example
//!
//! ```no_run
//! use esrp_deb_sign::cli::RuntimeConfig;
//! use esrp_deb_sign::profile::SigningProfile;
//! use esrp_deb_sign::signing::{Signer, SignerConfig};
//!
//! # async fn example() -> esrp_deb_sign::signing::Result<()> {
//! let signer = Signer::new(SignerConfig {
//!     workspace: "/home/runner/work/repo".into(),
//!     artifacts_dir: "artifacts".into(),
//!     tool: "esrp/tools/EsrpClient.exe".into(),
//!     config_dir: ".".into(),
//!     output_log: "esrp_out.json".to_string(),
//!     log_level: "Verbose".to_string(),
//!     correlation_id: None,
//!     require_signed: false,
//!     dry_run: false,
//!     profile: SigningProfile::default(),
//! });
//!
//! signer.run(&RuntimeConfig::new(true, false)).await?;
//! # Ok(())
//! # }
//! ```

pub mod checksum;
pub mod error;
pub mod invoker;
pub mod locator;
mod orchestrator;
pub mod report;
pub mod request;

pub use error::{Error, ErrorExt, Result};
pub use locator::{ArtifactLocator, LocatedArtifact};
pub use orchestrator::{RunOutcome, Signer, SignerConfig};
pub use report::{ResultReporter, SignedArtifact, SigningOutcome};
pub use request::{DocumentPaths, RequestDocuments};
