// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Error types for openstack-auth

use thiserror::Error;

/// Errors that can occur while selecting a plugin or obtaining a token
#[derive(Error, Debug)]
pub enum AuthError {
    /// One or more options required by the selected plugin are missing
    #[error("Missing parameter(s): \n{0}")]
    MissingOptions(String),

    /// Keystone rejected the credentials (HTTP 401)
    #[error("Authorization failure: {0}")]
    AuthorizationFailure(String),

    /// Keystone answered with an unexpected status
    #[error("Identity service returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The token response did not have the expected shape
    #[error("Malformed identity response: {0}")]
    MalformedResponse(String),

    /// No endpoint in the catalog matches the request
    #[error("{0}")]
    EndpointNotFound(String),

    /// The auth URL could not be parsed
    #[error("Invalid auth URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Transport error talking to Keystone
    #[error("Unable to reach the identity service: {0}")]
    Transport(#[from] reqwest::Error),
}
