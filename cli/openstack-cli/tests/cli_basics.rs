// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Basic CLI tests - help, version, configuration, missing credentials

// Allow deprecated - cargo_bin is standard for CLI testing
#![allow(deprecated)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::openstack_cmd;
use predicates::prelude::*;

#[test]
fn test_openstack_version() {
    openstack_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("openstack"));
}

#[test]
fn test_openstack_help_short() {
    openstack_cmd()
        .arg("-h")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("server"))
        .stdout(predicate::str::contains("volume"));
}

#[test]
fn test_openstack_help_lists_global_options() {
    openstack_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--os-cloud"))
        .stdout(predicate::str::contains("--os-auth-url"))
        .stdout(predicate::str::contains("--format"));
}

#[test]
fn test_no_command_is_usage_error() {
    openstack_cmd().assert().failure().code(2);
}

#[test]
fn test_unknown_command_is_usage_error() {
    openstack_cmd()
        .arg("frobnicate")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_missing_credentials_reported_together() {
    openstack_cmd()
        .args(["server", "list"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Missing parameter(s)"))
        .stderr(predicate::str::contains("--os-username"))
        .stderr(predicate::str::contains("--os-auth-url"));
}

#[test]
fn test_token_endpoint_requires_url() {
    openstack_cmd()
        .args(["--os-auth-type", "token_endpoint", "--os-token", "abc", "server", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--os-url"));
}

#[test]
fn test_configuration_show_masks_password() {
    openstack_cmd()
        .args(["configuration", "show", "-f", "json"])
        .env("OS_USERNAME", "demo")
        .env("OS_PASSWORD", "s3cret")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"auth.username\": \"demo\""))
        .stdout(predicate::str::contains("<redacted>"))
        .stdout(predicate::str::contains("s3cret").not());
}

#[test]
fn test_configuration_show_unmask() {
    openstack_cmd()
        .args(["configuration", "show", "--unmask", "-f", "value", "-c", "auth.password"])
        .env("OS_PASSWORD", "s3cret")
        .assert()
        .success()
        .stdout("s3cret\n");
}

#[test]
fn test_complete_bash() {
    openstack_cmd()
        .args(["complete", "--shell", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("openstack"));
}
