// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! User-facing command failures

use openstack_client::ApiError;
use thiserror::Error;

/// A failure reported to the user as-is, exit status 1
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl CommandError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self::Message(msg.into())
    }
}

/// Tally for commands that delete several resources
///
/// Each failure is logged as it happens; the command keeps going and
/// reports the count at the end.
#[derive(Debug)]
pub struct DeleteReport {
    resource: &'static str,
    total: usize,
    failed: usize,
}

impl DeleteReport {
    pub fn new(resource: &'static str, total: usize) -> Self {
        Self {
            resource,
            total,
            failed: 0,
        }
    }

    /// Record the outcome for `name`
    pub fn record<E: std::fmt::Display>(&mut self, name: &str, result: Result<(), E>) {
        if let Err(e) = result {
            self.failed += 1;
            tracing::error!(
                "Failed to delete {} with name or ID '{}': {}",
                self.resource,
                name,
                e
            );
        }
    }

    pub fn finish(self) -> Result<(), CommandError> {
        if self.failed == 0 {
            Ok(())
        } else {
            Err(CommandError::new(format!(
                "{} of {} {}s failed to delete.",
                self.failed, self.total, self.resource
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_report_counts_failures() {
        let mut report = DeleteReport::new("server", 3);
        report.record("a", Ok::<(), String>(()));
        report.record("b", Err("boom"));
        report.record("c", Err("bang"));
        assert_eq!(
            report.finish().unwrap_err().to_string(),
            "2 of 3 servers failed to delete."
        );
    }

    #[test]
    fn test_delete_report_all_ok() {
        let mut report = DeleteReport::new("network", 1);
        report.record("a", Ok::<(), String>(()));
        assert!(report.finish().is_ok());
    }
}
