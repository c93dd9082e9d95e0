// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Identity commands: projects, users, roles and tokens

pub mod project;
pub mod role;
pub mod token;
pub mod user;

pub use project::ProjectCommand;
pub use role::RoleCommand;
pub use token::TokenCommand;
pub use user::UserCommand;

use openstack_client::{ApiError, Resource};

use crate::error::CommandError;

/// Handle `--or-show` on create: a conflict resolves to the existing
/// resource instead of failing
pub async fn created_or_existing<F>(
    created: Result<Resource, ApiError>,
    or_show: bool,
    name: &str,
    existing: F,
) -> Result<Resource, CommandError>
where
    F: AsyncFnOnce() -> Result<Resource, CommandError>,
{
    match created {
        Ok(r) => Ok(r),
        Err(e) if or_show && e.is_conflict() => {
            tracing::info!("{} already exists, showing it", name);
            existing().await
        }
        Err(e) => Err(e.into()),
    }
}
