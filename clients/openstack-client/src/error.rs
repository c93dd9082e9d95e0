// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Errors returned by service calls

use std::fmt;

use openstack_auth::AuthError;
use serde_json::Value;
use thiserror::Error;

/// What a failed HTTP call said about itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetail {
    pub status: u16,
    pub message: String,
    pub request_id: Option<String>,
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (HTTP {})", self.message, self.status)?;
        if let Some(id) = &self.request_id {
            write!(f, " (Request-ID: {})", id)?;
        }
        Ok(())
    }
}

/// Errors from the per-service clients
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(ErrorDetail),

    #[error("{0}")]
    Unauthorized(ErrorDetail),

    #[error("{0}")]
    Forbidden(ErrorDetail),

    #[error("{0}")]
    NotFound(ErrorDetail),

    #[error("{0}")]
    MethodNotAllowed(ErrorDetail),

    #[error("{0}")]
    Conflict(ErrorDetail),

    #[error("{0}")]
    OverLimit(ErrorDetail),

    #[error("{0}")]
    NotImplemented(ErrorDetail),

    #[error("{0}")]
    ServiceUnavailable(ErrorDetail),

    /// Any other non-success status
    #[error("{0}")]
    Http(ErrorDetail),

    /// Authentication or catalog lookup failed
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Connection, TLS or timeout failure
    #[error("Unable to establish connection: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not what the service should return
    #[error("Unexpected response from {service}: {reason}")]
    Decode { service: String, reason: String },

    /// Bad local configuration (certificate files, API versions, ...)
    #[error("{0}")]
    Config(String),
}

impl ApiError {
    /// Map an HTTP status and body onto a typed error
    pub fn from_status(status: u16, body: &str, request_id: Option<String>) -> Self {
        let detail = ErrorDetail {
            status,
            message: extract_message(body).unwrap_or_else(|| default_message(status).to_string()),
            request_id,
        };
        match status {
            400 => Self::BadRequest(detail),
            401 => Self::Unauthorized(detail),
            403 => Self::Forbidden(detail),
            404 => Self::NotFound(detail),
            405 => Self::MethodNotAllowed(detail),
            409 => Self::Conflict(detail),
            413 | 429 => Self::OverLimit(detail),
            501 => Self::NotImplemented(detail),
            503 => Self::ServiceUnavailable(detail),
            _ => Self::Http(detail),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden(_))
    }

    /// HTTP status of the failure, if it came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::BadRequest(d)
            | Self::Unauthorized(d)
            | Self::Forbidden(d)
            | Self::NotFound(d)
            | Self::MethodNotAllowed(d)
            | Self::Conflict(d)
            | Self::OverLimit(d)
            | Self::NotImplemented(d)
            | Self::ServiceUnavailable(d)
            | Self::Http(d) => Some(d.status),
            _ => None,
        }
    }

    pub(crate) fn decode(service: &str, reason: impl Into<String>) -> Self {
        Self::Decode {
            service: service.to_string(),
            reason: reason.into(),
        }
    }
}

fn default_message(status: u16) -> &'static str {
    match status {
        400 => "Bad request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not found",
        405 => "Method Not Allowed",
        409 => "Conflict",
        413 | 429 => "Over limit",
        501 => "Not Implemented",
        503 => "Service Unavailable",
        _ => "Unknown Error",
    }
}

/// Pull a human readable message out of a service error body
///
/// Services wrap errors differently: Nova and Cinder use
/// `{"itemNotFound": {"message": ..}}`, Neutron uses
/// `{"NeutronError": {"message": ..}}`, Keystone uses
/// `{"error": {"message": ..}}`. Swift answers with plain text.
pub fn extract_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => {
            if let Some(msg) = map.get("message").and_then(Value::as_str) {
                return Some(msg.to_string());
            }
            map.values()
                .find_map(|v| v.get("message").and_then(Value::as_str))
                .map(str::to_string)
                .or_else(|| map.values().find_map(Value::as_str).map(str::to_string))
        }
        Ok(_) | Err(_) => {
            if trimmed.starts_with('<') {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nova_style_body() {
        let err = ApiError::from_status(
            404,
            r#"{"itemNotFound": {"message": "Instance abc could not be found.", "code": 404}}"#,
            Some("req-1".into()),
        );
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "Instance abc could not be found. (HTTP 404) (Request-ID: req-1)"
        );
    }

    #[test]
    fn test_neutron_style_body() {
        let err = ApiError::from_status(
            409,
            r#"{"NeutronError": {"type": "InUse", "message": "Network is in use.", "detail": ""}}"#,
            None,
        );
        assert!(err.is_conflict());
        assert_eq!(err.to_string(), "Network is in use. (HTTP 409)");
    }

    #[test]
    fn test_keystone_style_body() {
        assert_eq!(
            extract_message(r#"{"error": {"code": 403, "message": "You are not authorized.", "title": "Forbidden"}}"#)
                .as_deref(),
            Some("You are not authorized.")
        );
    }

    #[test]
    fn test_plain_and_html_bodies() {
        assert_eq!(extract_message("Container not empty").as_deref(), Some("Container not empty"));
        let err = ApiError::from_status(404, "<html><h1>Not Found</h1></html>", None);
        assert_eq!(err.to_string(), "Not found (HTTP 404)");
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(ApiError::from_status(413, "", None), ApiError::OverLimit(_)));
        assert!(matches!(ApiError::from_status(418, "", None), ApiError::Http(_)));
        assert_eq!(ApiError::from_status(503, "", None).status(), Some(503));
    }
}
