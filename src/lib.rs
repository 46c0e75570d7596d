//! Debian package signing through the ESRP signing client.
//!
//! This library provides the signing pipeline used by the `esrp_deb_sign`
//! build step:
//! - locating the single unsigned `.deb` in the artifacts directory
//! - writing the authentication, sign batch and policy documents
//! - running the signing client and checking for the signed package
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod cli;
pub mod error;
pub mod profile;
pub mod signing;
pub mod utils;

// Re-export commonly used types
pub use error::{CliError, Result, SignerError};
