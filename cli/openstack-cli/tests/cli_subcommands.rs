// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Subcommand help and argument validation; none of these reach a cloud

// Allow deprecated - cargo_bin is standard for CLI testing
#![allow(deprecated)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::openstack_cmd;
use predicates::prelude::*;
use test_case::test_case;

#[test_case(&["server"], "reboot" ; "server")]
#[test_case(&["flavor"], "unset" ; "flavor")]
#[test_case(&["keypair"], "create" ; "keypair")]
#[test_case(&["project"], "set" ; "project")]
#[test_case(&["user"], "delete" ; "user")]
#[test_case(&["role"], "add" ; "role")]
#[test_case(&["token"], "issue" ; "token")]
#[test_case(&["network"], "list" ; "network")]
#[test_case(&["subnet"], "create" ; "subnet")]
#[test_case(&["port"], "set" ; "port")]
#[test_case(&["router", "add"], "subnet" ; "router add")]
#[test_case(&["security", "group"], "rule" ; "security group")]
#[test_case(&["security", "group", "rule"], "create" ; "security group rule")]
#[test_case(&["volume"], "snapshot" ; "volume")]
#[test_case(&["volume", "type"], "unset" ; "volume type")]
#[test_case(&["container"], "save" ; "container")]
#[test_case(&["object"], "save" ; "object")]
#[test_case(&["object", "store", "account"], "show" ; "object store account")]
fn test_group_help(path: &[&str], expected: &str) {
    openstack_cmd()
        .args(path)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains(expected));
}

#[test]
fn test_server_create_requires_flavor() {
    openstack_cmd()
        .args(["server", "create", "vm1"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--flavor"));
}

#[test]
fn test_bad_nic_spec_rejected() {
    openstack_cmd()
        .args(["server", "create", "vm1", "--flavor", "m1", "--image", "img", "--nic", "bogus=1"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--nic"));
}

#[test]
fn test_bad_allocation_pool_rejected() {
    openstack_cmd()
        .args([
            "subnet",
            "create",
            "sn1",
            "--network",
            "net1",
            "--subnet-range",
            "10.0.0.0/24",
            "--allocation-pool",
            "start=10.0.0.2",
        ])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("end"));
}

#[test]
fn test_role_add_needs_scope_and_actor() {
    openstack_cmd()
        .args(["role", "add", "admin", "--user", "demo"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_bad_port_range_rejected() {
    openstack_cmd()
        .args(["security", "group", "rule", "create", "default", "--dst-port", "80:abc"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_unknown_output_format_rejected() {
    openstack_cmd()
        .args(["server", "list", "-f", "xml"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("xml"));
}
