#![allow(deprecated)]
//! End-to-end runs of the `esrp_deb_sign` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PACKAGE: &str = "pkg_1.0_amd64.deb";

struct Workspace {
    root: TempDir,
    config: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let ws = Self {
            root: tempfile::tempdir().unwrap(),
            config: tempfile::tempdir().unwrap(),
        };
        fs::create_dir_all(ws.unsigned_dir()).unwrap();
        ws
    }

    fn with_package(name: &str) -> Self {
        let ws = Self::new();
        fs::write(ws.unsigned_dir().join(name), b"!<arch>\ndebian-binary").unwrap();
        ws
    }

    fn path(&self) -> &Path {
        self.root.path()
    }

    fn unsigned_dir(&self) -> PathBuf {
        self.path().join("out").join("unsigned")
    }

    fn signed_path(&self, name: &str) -> PathBuf {
        self.path().join("out").join("signed").join(name)
    }

    fn config_file(&self, name: &str) -> PathBuf {
        self.config.path().join(name)
    }

    fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("esrp_deb_sign").unwrap();
        cmd.env("GITHUB_WORKSPACE", self.path())
            .env("ARTIFACTS_DIR", "out")
            .env_remove("ESRP_TOOL")
            .env_remove("ESRP_PROFILE")
            .arg("--config-dir")
            .arg(self.config.path());
        cmd
    }

    fn read_config(&self, name: &str) -> Value {
        let text = fs::read_to_string(self.config_file(name)).unwrap();
        serde_json::from_str(&text).unwrap()
    }
}

#[test]
fn missing_environment_is_fatal() {
    let mut cmd = Command::cargo_bin("esrp_deb_sign").unwrap();
    cmd.env_remove("GITHUB_WORKSPACE")
        .env_remove("ARTIFACTS_DIR")
        .assert()
        .failure();
}

#[test]
fn no_package_exits_1_with_empty_candidate_list() {
    let ws = Workspace::new();

    ws.command()
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Found files:"))
        .stdout(predicate::str::contains("[]"))
        .stderr(predicate::str::contains("cannot find .deb to sign"));

    assert!(!ws.config_file("input.json").exists());
}

#[test]
fn package_without_real_extension_exits_1() {
    let ws = Workspace::with_package(".deb");

    ws.command().arg("--dry-run").assert().code(1);
}

#[test]
fn dry_run_writes_request_documents() {
    let ws = Workspace::with_package(PACKAGE);

    ws.command()
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains(PACKAGE));

    let input = ws.read_config("input.json");
    let batch = &input["SignBatches"][0];
    let file = &batch["SignRequestFiles"][0];
    assert_eq!(file["SourceLocation"], PACKAGE);
    assert_eq!(file["DestinationLocation"], format!("signed/{PACKAGE}"));
    assert_eq!(
        batch["SourceRootDirectory"],
        ws.unsigned_dir().display().to_string()
    );
    assert_eq!(
        batch["DestinationRootDirectory"],
        ws.path().join("out").display().to_string()
    );

    let auth = ws.read_config("auth.json");
    assert_eq!(auth["AuthenticationType"], "AAD_CERT");

    let policy = ws.read_config("policy.json");
    assert_eq!(policy["Intent"], "production release");
    assert_eq!(policy["ContentType"], "Debian package");
}

#[test]
fn repeated_runs_produce_identical_documents() {
    let ws = Workspace::with_package(PACKAGE);

    ws.command().arg("--dry-run").assert().success();
    let first: Vec<Value> = ["auth.json", "input.json", "policy.json"]
        .iter()
        .map(|name| ws.read_config(name))
        .collect();

    ws.command().arg("--dry-run").assert().success();
    let second: Vec<Value> = ["auth.json", "input.json", "policy.json"]
        .iter()
        .map(|name| ws.read_config(name))
        .collect();

    assert_eq!(first, second);
}

#[test]
fn profile_overrides_key_code() {
    let ws = Workspace::with_package(PACKAGE);
    let profile = ws.config_file("profile.toml");
    fs::write(&profile, "[signing]\nkey_code = \"CP-1-Pgp\"\n").unwrap();

    ws.command()
        .arg("--dry-run")
        .arg("--profile")
        .arg(&profile)
        .assert()
        .success();

    let input = ws.read_config("input.json");
    assert_eq!(
        input["SignBatches"][0]["SigningInfo"]["Operations"][0]["KeyCode"],
        "CP-1-Pgp"
    );
}

#[test]
fn missing_signing_client_exits_1() {
    let ws = Workspace::with_package(PACKAGE);

    ws.command()
        .assert()
        .code(1)
        .stderr(predicate::str::contains("signing client not found"));

    // Documents are written before the client is looked up.
    assert!(ws.config_file("input.json").exists());
}

#[cfg(unix)]
mod with_fake_client {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    /// Installs a shell script at the default client location.
    ///
    /// The script records its output log path from `-o`, writes `log_json`
    /// there (if non-empty), copies unsigned packages to `signed/` when
    /// `sign` is true, and exits with `code`.
    fn install_client(ws: &Workspace, sign: bool, log_json: &str, code: i32) {
        let tool = ws.path().join("esrp/tools/EsrpClient.exe");
        fs::create_dir_all(tool.parent().unwrap()).unwrap();

        let copy = if sign {
            "mkdir -p out/signed && cp out/unsigned/*.deb out/signed/"
        } else {
            ":"
        };
        let write_log = if log_json.is_empty() {
            ":".to_string()
        } else {
            format!("printf '%s' '{}' > \"$out\"", log_json)
        };

        let script = format!(
            "#!/bin/sh\n\
             out=\"\"\n\
             while [ $# -gt 0 ]; do\n\
               case \"$1\" in\n\
                 -o) out=\"$2\"; shift ;;\n\
               esac\n\
               shift\n\
             done\n\
             {copy}\n\
             {write_log}\n\
             exit {code}\n"
        );
        fs::write(&tool, script).unwrap();
        fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn successful_signing_reports_signed_path() {
        let ws = Workspace::with_package(PACKAGE);
        install_client(&ws, true, r#"{"Status":"pass"}"#, 0);
        let signed = ws.signed_path(PACKAGE);

        ws.command()
            .assert()
            .success()
            .stdout(predicate::str::contains("ESRP output json:"))
            .stdout(predicate::str::contains("\"Status\": \"pass\""))
            .stdout(predicate::str::contains("Success!"))
            .stdout(predicate::str::contains(format!(
                "Signed {}",
                signed.display()
            )));

        assert!(signed.is_file());
    }

    #[test]
    fn relative_workspace_runs_client_from_parent_directory() {
        let ws = Workspace::with_package(PACKAGE);
        install_client(&ws, true, r#"{"Status":"pass"}"#, 0);
        let parent = ws.path().parent().unwrap();
        let relative = ws.path().file_name().unwrap();

        ws.command()
            .current_dir(parent)
            .env("GITHUB_WORKSPACE", relative)
            .assert()
            .success()
            .stdout(predicate::str::contains("Success!"));

        assert!(ws.signed_path(PACKAGE).is_file());
    }

    #[test]
    fn client_failure_exits_1_without_success_message() {
        let ws = Workspace::with_package(PACKAGE);
        install_client(&ws, true, "", 2);

        ws.command()
            .assert()
            .code(1)
            .stdout(predicate::str::contains("Success!").not())
            .stderr(predicate::str::contains("exited with code 2"));
    }

    #[test]
    fn missing_signed_package_is_tolerated_by_default() {
        let ws = Workspace::with_package(PACKAGE);
        install_client(&ws, false, "", 0);

        ws.command()
            .assert()
            .success()
            .stdout(predicate::str::contains("Success!").not())
            .stderr(predicate::str::contains("Signed package not found"));
    }

    #[test]
    fn missing_signed_package_fails_when_required() {
        let ws = Workspace::with_package(PACKAGE);
        install_client(&ws, false, "", 0);

        ws.command()
            .arg("--require-signed")
            .assert()
            .code(1)
            .stderr(predicate::str::contains("does not exist"));
    }

    #[test]
    fn malformed_output_log_exits_1() {
        let ws = Workspace::with_package(PACKAGE);
        install_client(&ws, true, "not json", 0);

        ws.command().assert().code(1);
    }
}
