//! Signing request documents.
//!
//! Three JSON documents are handed to the signing client: authentication,
//! the sign batch, and policy. Field names follow the client's PascalCase
//! wire format. Construction is pure; only [`RequestDocuments::write_to`]
//! touches the filesystem.

use super::error::Result;
use super::locator::LocatedArtifact;
use crate::profile::{DOCUMENT_VERSION, SigningProfile};
use crate::utils::fs::write_json;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// File name of the authentication document.
pub const AUTH_FILE: &str = "auth.json";
/// File name of the sign batch document.
pub const INPUT_FILE: &str = "input.json";
/// File name of the policy document.
pub const POLICY_FILE: &str = "policy.json";

/// Namespace for correlation ids derived from package file names.
pub const CORRELATION_NAMESPACE: Uuid = Uuid::from_u128(0x01A7F55F_6CDD_4123_B255_77E6F212CDAD);

/// Location type for source and destination roots (a plain path).
const LOCATION_TYPE_UNC: &str = "UNC";

/// Derives the correlation id for a package file name.
///
/// Same file name, same id; rendered upper-case like the ids the signing
/// service issues.
pub fn correlation_id_for(file_name: &str) -> String {
    Uuid::new_v5(&CORRELATION_NAMESPACE, file_name.as_bytes())
        .hyphenated()
        .to_string()
        .to_uppercase()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CertificateLookup {
    pub subject_name: String,
    pub store_location: String,
    pub store_name: String,
}

/// Authentication descriptor (`auth.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthDocument {
    pub version: String,
    pub authentication_type: String,
    pub tenant_id: String,
    pub client_id: String,
    pub auth_cert: CertificateLookup,
    pub request_signing_cert: CertificateLookup,
}

/// Sign request batch (`input.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InputDocument {
    pub version: String,
    pub sign_batches: Vec<SignBatch>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SignBatch {
    pub source_location_type: String,
    pub source_root_directory: PathBuf,
    pub destination_location_type: String,
    pub destination_root_directory: PathBuf,
    pub sign_request_files: Vec<SignRequestFile>,
    pub signing_info: SigningInfo,
}

/// One source → destination transformation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SignRequestFile {
    pub customer_correlation_id: String,
    pub source_location: String,
    pub destination_location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SigningInfo {
    pub operations: Vec<SigningOperation>,
}

/// Key code / operation code pair selecting the signing backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SigningOperation {
    pub key_code: String,
    pub operation_code: String,
    pub parameters: BTreeMap<String, String>,
    pub tool_name: String,
    pub tool_version: String,
}

/// Policy descriptor (`policy.json`). Advisory; not validated locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub intent: String,
    pub content_type: String,
}

/// Paths of the documents written for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPaths {
    pub auth: PathBuf,
    pub input: PathBuf,
    pub policy: PathBuf,
}

impl DocumentPaths {
    /// Standard file names inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            auth: dir.join(AUTH_FILE),
            input: dir.join(INPUT_FILE),
            policy: dir.join(POLICY_FILE),
        }
    }
}

/// The three documents for one signing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDocuments {
    pub auth: AuthDocument,
    pub input: InputDocument,
    pub policy: PolicyDocument,
}

impl RequestDocuments {
    /// Builds all three documents for `artifact`.
    ///
    /// `correlation_id` overrides the id derived from the file name.
    pub fn build(
        artifact: &LocatedArtifact,
        profile: &SigningProfile,
        correlation_id: Option<&str>,
    ) -> Self {
        let correlation_id = correlation_id
            .map(str::to_string)
            .unwrap_or_else(|| correlation_id_for(&artifact.file_name));

        Self {
            auth: build_auth(profile),
            input: build_input(artifact, profile, correlation_id),
            policy: build_policy(profile),
        }
    }

    /// The single request file in the batch.
    pub fn request_file(&self) -> Option<&SignRequestFile> {
        self.input
            .sign_batches
            .first()
            .and_then(|batch| batch.sign_request_files.first())
    }

    /// Writes `auth.json`, `input.json` and `policy.json` into `dir`,
    /// overwriting existing files.
    pub async fn write_to(&self, dir: &Path) -> Result<DocumentPaths> {
        let paths = DocumentPaths::in_dir(dir);

        write_json(&paths.auth, &self.auth).await?;
        write_json(&paths.input, &self.input).await?;
        write_json(&paths.policy, &self.policy).await?;

        log::debug!(
            "Wrote {}, {}, {}",
            paths.auth.display(),
            paths.input.display(),
            paths.policy.display()
        );
        Ok(paths)
    }
}

fn build_auth(profile: &SigningProfile) -> AuthDocument {
    let auth = &profile.auth;
    AuthDocument {
        version: DOCUMENT_VERSION.to_string(),
        authentication_type: auth.authentication_type.clone(),
        tenant_id: auth.tenant_id.clone(),
        client_id: auth.client_id.clone(),
        auth_cert: CertificateLookup {
            subject_name: auth.auth_cert_subject(),
            store_location: auth.store_location.clone(),
            store_name: auth.store_name.clone(),
        },
        request_signing_cert: CertificateLookup {
            subject_name: auth.request_signing_cert_subject(),
            store_location: auth.store_location.clone(),
            store_name: auth.store_name.clone(),
        },
    }
}

fn build_input(
    artifact: &LocatedArtifact,
    profile: &SigningProfile,
    correlation_id: String,
) -> InputDocument {
    let signing = &profile.signing;
    InputDocument {
        version: DOCUMENT_VERSION.to_string(),
        sign_batches: vec![SignBatch {
            source_location_type: LOCATION_TYPE_UNC.to_string(),
            source_root_directory: artifact.source_root.clone(),
            destination_location_type: LOCATION_TYPE_UNC.to_string(),
            destination_root_directory: artifact.destination_root.clone(),
            sign_request_files: vec![SignRequestFile {
                customer_correlation_id: correlation_id,
                source_location: artifact.file_name.clone(),
                destination_location: artifact.destination_location(),
            }],
            signing_info: SigningInfo {
                operations: vec![SigningOperation {
                    key_code: signing.key_code.clone(),
                    operation_code: signing.operation_code.clone(),
                    parameters: BTreeMap::new(),
                    tool_name: signing.tool_name.clone(),
                    tool_version: signing.tool_version.clone(),
                }],
            },
        }],
    }
}

fn build_policy(profile: &SigningProfile) -> PolicyDocument {
    PolicyDocument {
        version: DOCUMENT_VERSION.to_string(),
        intent: profile.policy.intent.clone(),
        content_type: profile.policy.content_type.clone(),
    }
}
