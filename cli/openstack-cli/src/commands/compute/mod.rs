// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Compute commands: servers, flavors and keypairs

pub mod flavor;
pub mod keypair;
pub mod server;

pub use flavor::FlavorCommand;
pub use keypair::KeypairCommand;
pub use server::ServerCommand;

/// True when the requested compute microversion is at least
/// `major.minor`
pub fn microversion_at_least(version: &str, major: u32, minor: u32) -> bool {
    let mut parts = version.split('.').map(|p| p.trim().parse::<u32>().unwrap_or(0));
    let have = (parts.next().unwrap_or(0), parts.next().unwrap_or(0));
    have >= (major, minor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("2.1", 2, 37, false)]
    #[test_case("2.37", 2, 37, true)]
    #[test_case("2.100", 2, 37, true)]
    #[test_case("2", 2, 1, false)]
    #[test_case("3.0", 2, 99, true)]
    fn test_microversion_at_least(version: &str, major: u32, minor: u32, expected: bool) {
        assert_eq!(microversion_at_least(version, major, minor), expected);
    }
}
