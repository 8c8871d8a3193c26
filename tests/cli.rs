//
//  bitbucket-provider
//  tests/cli.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

use assert_cmd::Command;
use predicates::prelude::*;

fn bbtf() -> Command {
    let mut cmd = Command::cargo_bin("bbtf").unwrap();
    cmd.env_remove("BITBUCKET_USERNAME")
        .env_remove("BITBUCKET_PASSWORD")
        .env_remove("BITBUCKET_OAUTH_TOKEN")
        .env_remove("BITBUCKET_PROVIDER_CONFIG");
    cmd
}

#[test]
fn test_schema_lists_registered_types() {
    bbtf()
        .arg("schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("resource  bitbucket_repository"))
        .stdout(predicate::str::contains("data      bitbucket_ip_ranges"));
}

#[test]
fn test_schema_describes_hook_fields() {
    bbtf()
        .args(["schema", "bitbucket_hook"])
        .assert()
        .success()
        .stdout(predicate::str::contains("events"))
        .stdout(predicate::str::contains("skip_cert_verification"));
}

#[test]
fn test_unknown_resource_type_is_usage_error() {
    bbtf()
        .args(["resource", "bitbucket_nope", "read", "--state", "{}"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown resource type"));
}

#[test]
fn test_malformed_import_id_is_usage_error() {
    let config = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(config.path(), "base_url = \"http://127.0.0.1:9\"\n").unwrap();

    bbtf()
        .args(["resource", "bitbucket_repository", "import", "only-one-part"])
        .arg("--provider-config")
        .arg(config.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("OWNER/REPO"));
}

#[test]
fn test_conflicting_credentials_are_rejected() {
    bbtf()
        .args(["data", "bitbucket_current_user"])
        .args(["--username", "ada", "--password", "pw", "--oauth-token", "tok"])
        .args(["--base-url", "http://127.0.0.1:9"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("oauth_token conflicts"));
}

#[test]
fn test_version() {
    bbtf()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("bbtf version"));
}
