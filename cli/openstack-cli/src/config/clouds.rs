// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! `clouds.yaml` / `secure.yaml` parsing

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};

/// Credentials and scope from a cloud's `auth:` block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSection {
    pub auth_url: Option<String>,
    #[serde(alias = "endpoint")]
    pub url: Option<String>,
    pub token: Option<String>,
    pub username: Option<String>,
    pub user_id: Option<String>,
    pub password: Option<String>,
    #[serde(alias = "tenant_name")]
    pub project_name: Option<String>,
    #[serde(alias = "tenant_id")]
    pub project_id: Option<String>,
    pub user_domain_name: Option<String>,
    pub user_domain_id: Option<String>,
    pub project_domain_name: Option<String>,
    pub project_domain_id: Option<String>,
    pub domain_name: Option<String>,
    pub domain_id: Option<String>,
}

impl AuthSection {
    /// Fill every unset field from `other`
    fn fill_from(&mut self, other: AuthSection) {
        macro_rules! fill {
            ($($field:ident),*) => {
                $( if self.$field.is_none() { self.$field = other.$field; } )*
            };
        }
        fill!(
            auth_url,
            url,
            token,
            username,
            user_id,
            password,
            project_name,
            project_id,
            user_domain_name,
            user_domain_id,
            project_domain_name,
            project_domain_id,
            domain_name,
            domain_id
        );
    }
}

/// One named cloud
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudEntry {
    pub auth: AuthSection,
    pub auth_type: Option<String>,
    pub region_name: Option<String>,
    pub interface: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub identity_api_version: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub compute_api_version: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub network_api_version: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub volume_api_version: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub object_store_api_version: Option<String>,
    pub verify: Option<bool>,
    pub cacert: Option<PathBuf>,
}

impl CloudEntry {
    /// Overlay `secure` (from `secure.yaml`) onto this entry
    pub fn merge_secure(mut self, secure: CloudEntry) -> Self {
        let mut auth = secure.auth;
        auth.fill_from(self.auth);
        self.auth = auth;
        self.auth_type = secure.auth_type.or(self.auth_type);
        self.region_name = secure.region_name.or(self.region_name);
        self.interface = secure.interface.or(self.interface);
        self.cacert = secure.cacert.or(self.cacert);
        self.verify = secure.verify.or(self.verify);
        self
    }
}

/// Top level of a `clouds.yaml` file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CloudsFile {
    #[serde(default)]
    pub clouds: BTreeMap<String, CloudEntry>,
}

impl CloudsFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_yaml::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// The first existing file among `candidates`, if any
    pub fn load_first(candidates: &[PathBuf]) -> Result<Option<(PathBuf, Self)>> {
        for path in candidates {
            if path.is_file() {
                tracing::debug!("loading cloud config from {}", path.display());
                return Ok(Some((path.clone(), Self::load(path)?)));
            }
        }
        Ok(None)
    }
}

/// Look up `name` in the first clouds file, merged with the first
/// secure file
pub fn find_cloud(name: &str, clouds: &[PathBuf], secure: &[PathBuf]) -> Result<CloudEntry> {
    let entry = CloudsFile::load_first(clouds)?
        .and_then(|(_, mut f)| f.clouds.remove(name))
        .ok_or_else(|| anyhow::anyhow!("Cloud {} was not found.", name))?;

    let secure_entry = CloudsFile::load_first(secure)?.and_then(|(_, mut f)| f.clouds.remove(name));
    Ok(match secure_entry {
        Some(s) => entry.merge_secure(s),
        None => entry,
    })
}

/// Accept `3`, `2.1` or `"3"` for version fields
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_yaml::Value> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_yaml::Value::String(s)) => Some(s),
        Some(serde_yaml::Value::Number(n)) => Some(n.to_string()),
        Some(serde_yaml::Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const CLOUDS: &str = r#"
clouds:
  devstack:
    auth:
      auth_url: http://10.0.0.1/identity
      username: demo
      project_name: demo
      user_domain_name: Default
      project_domain_name: Default
    region_name: RegionOne
    identity_api_version: 3
    compute_api_version: 2.1
    verify: false
  legacy:
    auth:
      auth_url: http://old/v2.0
      tenant_name: admin
"#;

    const SECURE: &str = r#"
clouds:
  devstack:
    auth:
      password: s3cret
"#;

    fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(text.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_find_cloud_merges_secure() {
        let dir = tempfile::tempdir().unwrap();
        let clouds = write(dir.path(), "clouds.yaml", CLOUDS);
        let secure = write(dir.path(), "secure.yaml", SECURE);

        let cloud = find_cloud("devstack", &[clouds], &[secure]).unwrap();
        assert_eq!(cloud.auth.username.as_deref(), Some("demo"));
        assert_eq!(cloud.auth.password.as_deref(), Some("s3cret"));
        assert_eq!(cloud.identity_api_version.as_deref(), Some("3"));
        assert_eq!(cloud.compute_api_version.as_deref(), Some("2.1"));
        assert_eq!(cloud.verify, Some(false));
    }

    #[test]
    fn test_tenant_alias() {
        let dir = tempfile::tempdir().unwrap();
        let clouds = write(dir.path(), "clouds.yaml", CLOUDS);
        let cloud = find_cloud("legacy", &[clouds], &[]).unwrap();
        assert_eq!(cloud.auth.project_name.as_deref(), Some("admin"));
    }

    #[test]
    fn test_missing_cloud() {
        let dir = tempfile::tempdir().unwrap();
        let clouds = write(dir.path(), "clouds.yaml", CLOUDS);
        let err = find_cloud("nope", &[clouds], &[]).unwrap_err();
        assert_eq!(err.to_string(), "Cloud nope was not found.");
    }

    #[test]
    fn test_first_existing_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        let real = write(dir.path(), "clouds.yaml", CLOUDS);
        let missing = dir.path().join("absent.yaml");
        let (path, file) = CloudsFile::load_first(&[missing, real.clone()]).unwrap().unwrap();
        assert_eq!(path, real);
        assert!(file.clouds.contains_key("legacy"));
    }
}
