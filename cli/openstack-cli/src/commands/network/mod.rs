// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Network commands: networks, subnets, ports, routers and security groups

#[allow(clippy::module_inception)]
pub mod network;
pub mod port;
pub mod router;
pub mod security_group;
pub mod subnet;

pub use network::NetworkCommand;
pub use port::PortCommand;
pub use router::RouterCommand;
pub use security_group::SecurityCommand;
pub use subnet::SubnetCommand;

use serde_json::{Map, Value};

use crate::commands::{self, Context};
use crate::error::CommandError;

/// `project_id` for `--project`/`--project-domain`, if given
pub async fn project_id(
    ctx: &Context,
    project: Option<&str>,
    domain: Option<&str>,
) -> Result<Option<String>, CommandError> {
    match project {
        Some(p) => Ok(Some(commands::project_id(ctx, p, domain).await?)),
        None => Ok(None),
    }
}

/// Copy the Neutron attribute `from` to the column key `to`
pub fn alias(resource: &mut openstack_client::Resource, from: &str, to: &str) {
    if let Some(v) = resource.get(from).cloned() {
        resource.insert(to, v);
    }
}

/// Optional `description` and `project_id` shared by Neutron bodies
pub fn common_attrs(body: &mut Map<String, Value>, description: Option<String>, project_id: Option<String>) {
    commands::insert_opt(body, "description", description);
    commands::insert_opt(body, "project_id", project_id);
}
