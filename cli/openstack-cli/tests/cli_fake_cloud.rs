// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! End-to-end tests against a fake cloud on a loopback port

// Allow deprecated - cargo_bin is standard for CLI testing
#![allow(deprecated)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::io::Write;

use assert_cmd::Command;
use common::{FakeCloud, TOKEN, openstack_cmd};
use predicates::prelude::*;
use tempfile::NamedTempFile;

/// Command preconfigured with a pre-issued token and compute endpoint
fn token_endpoint_cmd(cloud: &FakeCloud) -> Command {
    let mut cmd = openstack_cmd();
    cmd.args(["--os-url", &cloud.compute_url(), "--os-token", TOKEN]);
    cmd
}

/// Command that authenticates through `clouds.yaml`
fn clouds_cmd(file: &NamedTempFile) -> Command {
    let mut cmd = openstack_cmd();
    cmd.env("OS_CLIENT_CONFIG_FILE", file.path()).env("OS_CLOUD", "fake");
    cmd
}

fn clouds_file(cloud: &FakeCloud) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(cloud.clouds_yaml().as_bytes()).unwrap();
    file
}

#[test]
fn test_server_show_by_name() {
    let cloud = FakeCloud::start();
    token_endpoint_cmd(&cloud)
        .args(["server", "show", "web1", "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"id\": \"s-1\""))
        .stdout(predicate::str::contains("\"flavor\": \"m1.small\""))
        .stdout(predicate::str::contains("\"image\": \"img-1\""))
        .stdout(predicate::str::contains("links").not());
}

#[test]
fn test_server_show_by_id() {
    let cloud = FakeCloud::start();
    token_endpoint_cmd(&cloud)
        .args(["server", "show", "s-2", "-f", "value", "-c", "name"])
        .assert()
        .success()
        .stdout("db\n");
}

#[test]
fn test_server_show_ambiguous_name() {
    let cloud = FakeCloud::start();
    token_endpoint_cmd(&cloud)
        .args(["server", "show", "dup"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("More than one"))
        .stderr(predicate::str::contains("'dup'"));
}

#[test]
fn test_server_show_missing() {
    let cloud = FakeCloud::start();
    token_endpoint_cmd(&cloud)
        .args(["server", "show", "nope"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("name or ID of 'nope' exists"));
}

#[test]
fn test_server_list_values() {
    let cloud = FakeCloud::start();
    token_endpoint_cmd(&cloud)
        .args(["server", "list", "-f", "value", "-c", "Name"])
        .assert()
        .success()
        .stdout("web1\ndb\ndup\ndup\n");
}

#[test]
fn test_server_list_json() {
    let cloud = FakeCloud::start();
    token_endpoint_cmd(&cloud)
        .args(["server", "list", "-f", "json", "--name", "web1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Name\": \"web1\""))
        .stdout(predicate::str::contains("\"Flavor\": \"m1.small\""))
        .stdout(predicate::str::contains("\"db\"").not());
}

#[test]
fn test_unknown_column_rejected() {
    let cloud = FakeCloud::start();
    token_endpoint_cmd(&cloud)
        .args(["server", "list", "-c", "Bogus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No recognized column names in Bogus"));
}

#[test]
fn test_token_issue_needs_keystone() {
    let cloud = FakeCloud::start();
    token_endpoint_cmd(&cloud)
        .args(["token", "issue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Only an authorized user may issue a new token."));
}

#[test]
fn test_network_list_through_catalog() {
    let cloud = FakeCloud::start();
    let file = clouds_file(&cloud);
    clouds_cmd(&file)
        .args(["network", "list", "-f", "value", "-c", "Name"])
        .assert()
        .success()
        .stdout("private\npublic\n");
}

#[test]
fn test_token_issue_from_clouds_yaml() {
    let cloud = FakeCloud::start();
    let file = clouds_file(&cloud);
    clouds_cmd(&file)
        .args(["token", "issue", "-f", "value", "-c", "id"])
        .assert()
        .success()
        .stdout(format!("{}\n", TOKEN));
}

#[test]
fn test_flag_overrides_cloud_password() {
    let cloud = FakeCloud::start();
    let file = clouds_file(&cloud);
    clouds_cmd(&file)
        .args(["--os-password", "wrong", "network", "list"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("requires authentication"));
}

#[test]
fn test_unknown_cloud() {
    let cloud = FakeCloud::start();
    let file = clouds_file(&cloud);
    openstack_cmd()
        .env("OS_CLIENT_CONFIG_FILE", file.path())
        .args(["--os-cloud", "missing", "server", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cloud missing was not found."));
}
