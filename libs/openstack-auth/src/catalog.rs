// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Service catalog returned with a token
//!
//! Both Keystone v2.0 and v3 catalogs are normalized into the same
//! shape: one [`CatalogEntry`] per service, each with a flat list of
//! `(interface, region, url)` endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::AuthError;

/// A single endpoint of a service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEndpoint {
    /// `public`, `internal` or `admin`
    pub interface: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub url: String,
}

/// A service and its endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(default)]
    pub name: String,
    pub endpoints: Vec<CatalogEndpoint>,
}

/// The catalog of services visible to a token
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCatalog {
    pub entries: Vec<CatalogEntry>,
}

impl ServiceCatalog {
    /// Build from the `token.catalog` array of a v3 token response
    pub fn from_v3(catalog: &Value) -> Self {
        let entries = catalog
            .as_array()
            .map(|services| {
                services
                    .iter()
                    .filter_map(|svc| {
                        let service_type = svc.get("type")?.as_str()?.to_string();
                        let name = str_field(svc, "name").unwrap_or_default();
                        let endpoints = svc
                            .get("endpoints")
                            .and_then(Value::as_array)
                            .map(|eps| {
                                eps.iter()
                                    .filter_map(|ep| {
                                        Some(CatalogEndpoint {
                                            interface: str_field(ep, "interface")?,
                                            region: str_field(ep, "region_id")
                                                .or_else(|| str_field(ep, "region")),
                                            url: str_field(ep, "url")?,
                                        })
                                    })
                                    .collect()
                            })
                            .unwrap_or_default();
                        Some(CatalogEntry {
                            service_type,
                            name,
                            endpoints,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self { entries }
    }

    /// Build from the `access.serviceCatalog` array of a v2.0 response
    pub fn from_v2(catalog: &Value) -> Self {
        const INTERFACES: [(&str, &str); 3] = [
            ("publicURL", "public"),
            ("internalURL", "internal"),
            ("adminURL", "admin"),
        ];

        let entries = catalog
            .as_array()
            .map(|services| {
                services
                    .iter()
                    .filter_map(|svc| {
                        let service_type = svc.get("type")?.as_str()?.to_string();
                        let name = str_field(svc, "name").unwrap_or_default();
                        let mut endpoints = Vec::new();
                        for ep in svc
                            .get("endpoints")
                            .and_then(Value::as_array)
                            .into_iter()
                            .flatten()
                        {
                            let region = str_field(ep, "region");
                            for (key, interface) in INTERFACES {
                                if let Some(url) = str_field(ep, key) {
                                    endpoints.push(CatalogEndpoint {
                                        interface: interface.to_string(),
                                        region: region.clone(),
                                        url,
                                    });
                                }
                            }
                        }
                        Some(CatalogEntry {
                            service_type,
                            name,
                            endpoints,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self { entries }
    }

    /// Find the URL of the first endpoint matching any of `service_types`
    ///
    /// `interface` accepts both the v3 (`public`) and v2 (`publicURL`)
    /// spellings. When `region` is `None` any region matches.
    pub fn url_for(
        &self,
        service_types: &[&str],
        interface: &str,
        region: Option<&str>,
    ) -> Result<String, AuthError> {
        let interface = normalize_interface(interface);

        for service_type in service_types {
            for entry in self.entries.iter().filter(|e| e.service_type == *service_type) {
                let found = entry.endpoints.iter().find(|ep| {
                    ep.interface == interface
                        && region.is_none_or(|r| ep.region.as_deref() == Some(r))
                });
                if let Some(ep) = found {
                    return Ok(ep.url.clone());
                }
            }
        }

        let mut msg = format!(
            "public endpoint for {} service not found",
            service_types.first().copied().unwrap_or("unknown")
        );
        if interface != "public" {
            msg = msg.replacen("public", interface, 1);
        }
        if let Some(region) = region {
            msg.push_str(&format!(" in {} region", region));
        }
        Err(AuthError::EndpointNotFound(msg))
    }
}

fn normalize_interface(interface: &str) -> &str {
    interface.strip_suffix("URL").unwrap_or(interface)
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn v3_catalog() -> Value {
        json!([
            {
                "type": "compute",
                "name": "nova",
                "endpoints": [
                    {"interface": "public", "region_id": "RegionOne", "url": "http://nova-one/v2.1"},
                    {"interface": "internal", "region_id": "RegionOne", "url": "http://nova-int/v2.1"},
                    {"interface": "public", "region_id": "RegionTwo", "url": "http://nova-two/v2.1"}
                ]
            },
            {
                "type": "volumev3",
                "name": "cinderv3",
                "endpoints": [
                    {"interface": "public", "region": "RegionOne", "url": "http://cinder/v3/abc"}
                ]
            }
        ])
    }

    #[test]
    fn test_v3_first_matching_region() {
        let catalog = ServiceCatalog::from_v3(&v3_catalog());
        assert_eq!(
            catalog.url_for(&["compute"], "public", Some("RegionTwo")).unwrap(),
            "http://nova-two/v2.1"
        );
        assert_eq!(
            catalog.url_for(&["compute"], "public", None).unwrap(),
            "http://nova-one/v2.1"
        );
    }

    #[test]
    fn test_interface_v2_spelling() {
        let catalog = ServiceCatalog::from_v3(&v3_catalog());
        assert_eq!(
            catalog.url_for(&["compute"], "internalURL", None).unwrap(),
            "http://nova-int/v2.1"
        );
    }

    #[test]
    fn test_service_type_aliases_in_order() {
        let catalog = ServiceCatalog::from_v3(&v3_catalog());
        assert_eq!(
            catalog
                .url_for(&["block-storage", "volumev3"], "public", None)
                .unwrap(),
            "http://cinder/v3/abc"
        );
    }

    #[test]
    fn test_missing_endpoint_message() {
        let catalog = ServiceCatalog::from_v3(&v3_catalog());
        let err = catalog
            .url_for(&["network"], "public", Some("RegionOne"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "public endpoint for network service not found in RegionOne region"
        );
    }

    #[test]
    fn test_v2_catalog_flattens_interfaces() {
        let catalog = ServiceCatalog::from_v2(&json!([
            {
                "type": "identity",
                "name": "keystone",
                "endpoints": [{
                    "region": "RegionOne",
                    "publicURL": "http://ks:5000/v2.0",
                    "adminURL": "http://ks:35357/v2.0"
                }]
            }
        ]));
        assert_eq!(catalog.entries[0].endpoints.len(), 2);
        assert_eq!(
            catalog.url_for(&["identity"], "admin", None).unwrap(),
            "http://ks:35357/v2.0"
        );
    }
}
