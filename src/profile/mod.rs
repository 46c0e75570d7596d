//! Signing profile: identity, key selection and policy constants.
//!
//! The built-in defaults describe the production Debian signing setup. A TOML
//! file can override any subset of them, e.g.
//!
//! ```toml
//! [auth]
//! client_id = "00000000-0000-0000-0000-000000000000"
//!
//! [signing]
//! key_code = "CP-000000-Pgp"
//! ```

use crate::error::{CliError, ExecutionContext, Result, SignerError};
use serde::Deserialize;
use std::path::Path;

/// Version string stamped on every generated document.
pub const DOCUMENT_VERSION: &str = "1.0.0";

/// Complete signing profile.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SigningProfile {
    /// Authentication identity
    pub auth: AuthProfile,
    /// Key and operation selection
    pub signing: OperationProfile,
    /// Advisory policy metadata
    pub policy: PolicyProfile,
}

/// Certificate-based identity used to authenticate with the signing service.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct AuthProfile {
    pub authentication_type: String,
    pub tenant_id: String,
    pub client_id: String,
    /// Appended to the client id to form the auth certificate subject
    pub auth_cert_domain: String,
    pub store_location: String,
    pub store_name: String,
}

impl Default for AuthProfile {
    fn default() -> Self {
        Self {
            authentication_type: "AAD_CERT".to_string(),
            tenant_id: "72f988bf-86f1-41af-91ab-2d7cd011db47".to_string(),
            client_id: "38aa33bc-a7e7-4007-bfb2-e8b17f04aadc".to_string(),
            auth_cert_domain: "microsoft.com".to_string(),
            store_location: "LocalMachine".to_string(),
            store_name: "My".to_string(),
        }
    }
}

impl AuthProfile {
    /// Subject name of the authentication certificate.
    pub fn auth_cert_subject(&self) -> String {
        format!("CN={}.{}", self.client_id, self.auth_cert_domain)
    }

    /// Subject name of the request signing certificate.
    pub fn request_signing_cert_subject(&self) -> String {
        format!("CN={}", self.client_id)
    }
}

/// Which key and operation the signing backend applies.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct OperationProfile {
    pub key_code: String,
    pub operation_code: String,
    pub tool_name: String,
    pub tool_version: String,
    /// Package extension searched for, without the dot
    pub package_extension: String,
}

impl Default for OperationProfile {
    fn default() -> Self {
        Self {
            key_code: "CP-450779-Pgp".to_string(),
            operation_code: "LinuxSign".to_string(),
            tool_name: "sign".to_string(),
            tool_version: "1.0".to_string(),
            package_extension: "deb".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyProfile {
    pub intent: String,
    pub content_type: String,
}

impl Default for PolicyProfile {
    fn default() -> Self {
        Self {
            intent: "production release".to_string(),
            content_type: "Debian package".to_string(),
        }
    }
}

impl SigningProfile {
    /// Parse a profile from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let profile: Self = toml::from_str(text)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Load a profile from a TOML file.
    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_command("read_profile", |e| {
                format!("Failed to read {}: {}", path.display(), e)
            })?;

        log::debug!("Loaded signing profile from {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Load from `path` if given, otherwise use the built-in defaults.
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path).await,
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        let required = [
            ("auth.client_id", &self.auth.client_id),
            ("auth.tenant_id", &self.auth.tenant_id),
            ("signing.key_code", &self.signing.key_code),
            ("signing.operation_code", &self.signing.operation_code),
            ("signing.package_extension", &self.signing.package_extension),
        ];

        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(SignerError::Cli(CliError::InvalidArguments {
                    reason: format!("Signing profile field {} cannot be empty", name),
                }));
            }
        }

        if self.signing.package_extension.starts_with('.') {
            return Err(SignerError::Cli(CliError::InvalidArguments {
                reason: format!(
                    "signing.package_extension must not start with a dot: {}",
                    self.signing.package_extension
                ),
            }));
        }

        Ok(())
    }
}
