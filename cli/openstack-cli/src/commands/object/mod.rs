// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Object store commands: containers, objects and the account

pub mod container;
#[allow(clippy::module_inception)]
pub mod object;

pub use container::ContainerCommand;
pub use object::ObjectCommand;

use std::path::{Path, PathBuf};

use bytes::Bytes;
use clap::Args;
use openstack_client::{ListOptions, ObjectStoreClient};

use crate::error::CommandError;

/// Paging flags shared by `container list` and `object list`
#[derive(Args, Clone, Default)]
pub struct PageArgs {
    /// Filter list using <prefix>
    #[arg(long)]
    pub prefix: Option<String>,

    /// Anything after <marker> will be returned
    #[arg(long)]
    pub marker: Option<String>,

    /// Anything before <end-marker> will be returned
    #[arg(long)]
    pub end_marker: Option<String>,

    /// Limit the number of items returned
    #[arg(long)]
    pub limit: Option<u32>,

    /// List all items in the listing (default is 10000)
    #[arg(long)]
    pub all: bool,
}

impl PageArgs {
    pub fn options(&self, delimiter: Option<String>) -> ListOptions {
        ListOptions {
            prefix: self.prefix.clone(),
            delimiter,
            marker: self.marker.clone(),
            end_marker: self.end_marker.clone(),
            limit: self.limit,
            all: self.all,
        }
    }
}

/// Local path for a downloaded object; pseudo-directories become
/// real ones under `base`
pub fn local_path(base: Option<&Path>, object: &str) -> PathBuf {
    let relative = object.trim_start_matches('/');
    match base {
        Some(dir) => dir.join(relative),
        None => PathBuf::from(relative),
    }
}

/// Download `object` into `path`, creating parent directories
pub async fn save_object(
    store: &ObjectStoreClient,
    container: &str,
    object: &str,
    path: &Path,
) -> Result<(), CommandError> {
    let data: Bytes = store.download_object(container, object).await?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| CommandError::new(format!("Unable to create {}: {}", parent.display(), e)))?;
    }
    tokio::fs::write(path, &data)
        .await
        .map_err(|e| CommandError::new(format!("Unable to write {}: {}", path.display(), e)))?;
    tracing::debug!("saved {}/{} to {} ({} bytes)", container, object, path.display(), data.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_path_keeps_pseudo_directories() {
        assert_eq!(local_path(None, "logs/2026/app.log"), PathBuf::from("logs/2026/app.log"));
        assert_eq!(local_path(Some(Path::new("out")), "/a.txt"), PathBuf::from("out/a.txt"));
    }

    #[test]
    fn test_page_options() {
        let page = PageArgs {
            prefix: Some("logs/".into()),
            limit: Some(5),
            all: true,
            ..Default::default()
        };
        let options = page.options(Some("/".into()));
        assert_eq!(options.prefix.as_deref(), Some("logs/"));
        assert_eq!(options.delimiter.as_deref(), Some("/"));
        assert_eq!(options.limit, Some(5));
        assert!(options.all);
    }
}
