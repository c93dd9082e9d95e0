// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Remote resource representations

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A resource as returned by a service: a JSON object
///
/// The services own the schema; this type only offers convenient,
/// lenient accessors over the fields that come back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resource(Map<String, Value>);

impl Resource {
    /// Wrap a JSON value, which must be an object
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// The `id` field, or an empty string
    pub fn id(&self) -> &str {
        self.str_field("id").unwrap_or("")
    }

    /// The `name` field, or an empty string
    pub fn name(&self) -> &str {
        self.str_field("name").unwrap_or("")
    }

    /// Lower-cased `status` field, or an empty string
    pub fn status(&self) -> String {
        self.str_field("status").unwrap_or("").to_lowercase()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<Map<String, Value>> for Resource {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Outcome of a name lookup
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// Exactly one resource matched
    Found(Resource),
    /// More than one resource matched; carries the match count
    Ambiguous(usize),
    NotFound,
}

impl Lookup {
    /// Classify a set of exact matches
    pub fn from_matches(mut matches: Vec<Resource>) -> Self {
        match matches.len() {
            0 => Self::NotFound,
            1 => matches.pop().map_or(Self::NotFound, Self::Found),
            n => Self::Ambiguous(n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn res(v: Value) -> Resource {
        Resource::from_value(v).unwrap()
    }

    #[test]
    fn test_accessors() {
        let r = res(json!({"id": "abc", "name": "web", "status": "ACTIVE", "ram": 512}));
        assert_eq!(r.id(), "abc");
        assert_eq!(r.name(), "web");
        assert_eq!(r.status(), "active");
        assert_eq!(r.str_field("ram"), None);
        assert_eq!(r.get("ram"), Some(&json!(512)));
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(Resource::from_value(json!([1, 2])).is_none());
    }

    #[test]
    fn test_lookup_classification() {
        assert_eq!(Lookup::from_matches(vec![]), Lookup::NotFound);
        let one = res(json!({"id": "1"}));
        assert_eq!(Lookup::from_matches(vec![one.clone()]), Lookup::Found(one.clone()));
        assert_eq!(
            Lookup::from_matches(vec![one.clone(), one]),
            Lookup::Ambiguous(2)
        );
    }
}
