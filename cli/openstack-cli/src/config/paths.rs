// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Configuration path resolution
//!
//! `clouds.yaml` and `secure.yaml` are searched in the current
//! directory, the user config directory and `/etc/openstack`.

use std::path::PathBuf;

const CLOUDS_FILE: &str = "clouds.yaml";
const SECURE_FILE: &str = "secure.yaml";

/// Directories searched for cloud configuration, most specific first
pub fn config_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![PathBuf::from(".")];
    if let Some(config) = dirs::config_dir() {
        dirs.push(config.join("openstack"));
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("openstack");
        if !dirs.contains(&xdg) {
            dirs.push(xdg);
        }
    }
    dirs.push(PathBuf::from("/etc/openstack"));
    dirs
}

/// Candidate `clouds.yaml` files
///
/// `OS_CLIENT_CONFIG_FILE` names a file that is checked before the
/// standard locations.
pub fn clouds_files() -> Vec<PathBuf> {
    candidates("OS_CLIENT_CONFIG_FILE", CLOUDS_FILE)
}

/// Candidate `secure.yaml` files (`OS_CLIENT_SECURE_FILE` first)
pub fn secure_files() -> Vec<PathBuf> {
    candidates("OS_CLIENT_SECURE_FILE", SECURE_FILE)
}

fn candidates(env_var: &str, name: &str) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(path) = std::env::var(env_var) {
        files.push(PathBuf::from(path));
    }
    files.extend(config_dirs().into_iter().map(|d| d.join(name)));
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_order() {
        let files = clouds_files();
        let tail: Vec<_> = files.iter().rev().take(1).collect();
        assert!(tail[0].ends_with("openstack/clouds.yaml"));
        assert!(files.iter().any(|f| f == &PathBuf::from("./clouds.yaml")));
    }
}
