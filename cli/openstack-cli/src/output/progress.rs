// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Spinner shown while `--wait` polls a resource

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

pub struct Spinner {
    pb: ProgressBar,
    message: String,
}

impl Spinner {
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
            pb.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", " "]));
        }
        pb.set_message(message.clone());
        pb.enable_steady_tick(Duration::from_millis(80));
        Self { pb, message }
    }

    /// Progress callback for the `wait_for_*` helpers
    pub fn update(&mut self, progress: u64) {
        self.pb.set_message(format!("{} {}%", self.message, progress));
    }

    pub fn finish(self) {
        self.pb.finish_and_clear();
    }
}
