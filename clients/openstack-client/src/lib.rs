// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Clients for the OpenStack service APIs used by the `openstack` CLI
//!
//! A [`ClientManager`] owns the authenticated [`Session`] and builds one
//! client per service on demand. Each service client exposes
//! [`ResourceManager`]s for its collections plus the few calls that do
//! not fit plain CRUD (server actions, role grants, router interfaces,
//! object uploads).

pub mod client_manager;
pub mod compute;
pub mod error;
pub mod identity;
pub mod manager;
pub mod network;
pub mod object_store;
pub mod resource;
pub mod service;
pub mod session;
pub mod volume;

pub use client_manager::{ApiVersions, ClientManager};
pub use compute::ComputeClient;
pub use error::{ApiError, ErrorDetail};
pub use identity::{IdentityClient, RoleActor, RoleScope};
pub use manager::{Manager, ResourceManager, ResourceSpec, UpdateMethod};
pub use network::{NetworkClient, RouterInterface};
pub use object_store::{ListOptions, ObjectStoreClient};
pub use resource::{Lookup, Resource};
pub use service::{Query, ServiceClient};
pub use session::{Session, SessionConfig, build_http_client, install_crypto_provider};
pub use volume::VolumeClient;

pub use openstack_auth;
