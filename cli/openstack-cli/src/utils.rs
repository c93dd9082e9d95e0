// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Helpers shared by the command modules

use std::cmp::Ordering;
use std::io::IsTerminal;
use std::path::Path;
use std::time::Duration;

use openstack_client::{ApiError, Lookup, Manager, Query, Resource};
use serde_json::Value;

use crate::error::CommandError;

/// Renders one field for display
pub type Formatter = fn(&Value) -> String;

/// Resolve a name or ID to a resource
///
/// Tries, in order: the canonical integer form of a numeric argument,
/// the argument as an ID, and finally an exact name match.
pub async fn find_resource(manager: &dyn Manager, name_or_id: &str) -> Result<Resource, CommandError> {
    find_resource_with(manager, name_or_id, &[]).await
}

/// [`find_resource`] with extra filters for the name lookup
/// (e.g. `domain_id` for identity resources)
pub async fn find_resource_with(
    manager: &dyn Manager,
    name_or_id: &str,
    filters: &Query,
) -> Result<Resource, CommandError> {
    let canonical = name_or_id.parse::<u64>().ok().map(|n| n.to_string());
    if let Some(id) = &canonical {
        match manager.get(id).await {
            Ok(r) => return Ok(r),
            Err(e) if lookup_miss(&e) => {}
            Err(e) => return Err(e.into()),
        }
    }

    if canonical.as_deref() != Some(name_or_id) {
        match manager.get(name_or_id).await {
            Ok(r) => return Ok(r),
            Err(e) if lookup_miss(&e) => {}
            Err(e) => return Err(e.into()),
        }
    }

    let resource = manager.resource_name();
    match manager.find(name_or_id, filters).await {
        Ok(Lookup::Found(r)) => Ok(r),
        Ok(Lookup::Ambiguous(_)) => Err(CommandError::new(format!(
            "More than one {} exists with the name '{}'.",
            resource, name_or_id
        ))),
        Ok(Lookup::NotFound) => Err(not_found(resource, name_or_id)),
        Err(e) if e.is_not_found() => Err(not_found(resource, name_or_id)),
        Err(e) if e.is_forbidden() => Err(CommandError::new(format!(
            "You are not authorized to find {} with the name '{}'.",
            resource, name_or_id
        ))),
        Err(e) => Err(e.into()),
    }
}

/// A failed `get` that just means "not this way": the ID does not exist
/// or the service rejects the argument as an ID
fn lookup_miss(e: &ApiError) -> bool {
    e.is_not_found() || e.status() == Some(400)
}

fn not_found(resource: &str, name_or_id: &str) -> CommandError {
    CommandError::new(format!(
        "No {} with a name or ID of '{}' exists.",
        resource, name_or_id
    ))
}

/// Sort by `key[:asc|desc]` criteria separated by commas
///
/// Earlier keys take precedence; later keys break ties.
pub fn sort_items(items: &mut [Resource], sort_str: &str) -> Result<(), CommandError> {
    if sort_str.trim().is_empty() {
        return Ok(());
    }

    let mut criteria = Vec::new();
    for part in sort_str.split(',') {
        let (key, direction) = match part.split_once(':') {
            Some((k, d)) => (k, d),
            None => (part, "asc"),
        };
        if key.is_empty() {
            return Err(CommandError::new(format!(
                "'{}' is not a valid sort key",
                part
            )));
        }
        let descending = match direction {
            "asc" => false,
            "desc" => true,
            other => {
                return Err(CommandError::new(format!(
                    "'{}' is not a valid sort direction for sort key {}, use asc or desc instead",
                    other, key
                )));
            }
        };
        criteria.push((key, descending));
    }

    // Stable sorts applied last-key-first leave earlier keys dominant.
    for (key, descending) in criteria.into_iter().rev() {
        items.sort_by(|a, b| {
            let ord = compare_values(a.get(key), b.get(key));
            if descending { ord.reverse() } else { ord }
        });
    }
    Ok(())
}

/// Order JSON values; missing and null sort first
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

/// Row values for `fields`, in order
///
/// Display names map to attribute names by lower-casing and replacing
/// spaces with underscores, except names listed in `mixed_case`.
/// Missing attributes come back as empty strings.
pub fn get_item_properties(
    item: &Resource,
    fields: &[&str],
    formatters: &[(&str, Formatter)],
    mixed_case: &[&str],
) -> Vec<Value> {
    fields
        .iter()
        .map(|field| {
            let attr = if mixed_case.contains(field) {
                field.replace(' ', "_")
            } else {
                field.to_lowercase().replace(' ', "_")
            };
            let data = item.get(&attr).cloned().unwrap_or(Value::from(""));
            match formatters.iter().find(|(name, _)| *name == *field || *name == attr) {
                Some((_, f)) => Value::String(f(&data)),
                None => data,
            }
        })
        .collect()
}

/// Plain string for a scalar value; `None` for null
pub fn value_to_string(v: &Value) -> String {
    match v {
        Value::Null => "None".to_string(),
        Value::String(s) => s.clone(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// `a='1', b='2'`, keys sorted, nested maps flattened with dots
pub fn format_dict(data: &Value) -> String {
    fn walk(prefix: &str, data: &serde_json::Map<String, Value>, out: &mut Vec<String>) {
        let mut keys: Vec<&String> = data.keys().collect();
        keys.sort();
        for k in keys {
            let key = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{}.{}", prefix, k)
            };
            match &data[k.as_str()] {
                Value::Object(inner) => walk(&key, inner, out),
                Value::Null => out.push(format!("{}=", key)),
                v => out.push(format!("{}='{}'", key, value_to_string(v))),
            }
        }
    }

    match data {
        Value::Object(map) => {
            let mut out = Vec::new();
            walk("", map, &mut out);
            out.join(", ")
        }
        Value::Null => String::new(),
        other => value_to_string(other),
    }
}

/// Sorted, comma separated list
pub fn format_list(data: &Value) -> String {
    match data {
        Value::Array(items) => {
            let mut items: Vec<String> = items.iter().map(value_to_string).collect();
            items.sort();
            items.join(", ")
        }
        Value::Null => String::new(),
        other => value_to_string(other),
    }
}

/// One [`format_dict`] line per element
pub fn format_list_of_dicts(data: &Value) -> String {
    match data {
        Value::Array(items) => items.iter().map(format_dict).collect::<Vec<_>>().join("\n"),
        Value::Null => String::new(),
        other => format_dict(other),
    }
}

/// `UP`/`DOWN` for `admin_state_up`
pub fn format_admin_state(data: &Value) -> String {
    if data.as_bool().unwrap_or(false) {
        "UP".to_string()
    } else {
        "DOWN".to_string()
    }
}

/// Poll until `status_field` reaches a success or error status
///
/// Returns `true` on success, `false` on an error status. `callback`
/// receives the resource's `progress` value (0 when absent) after each
/// poll that has not finished.
pub async fn wait_for_status(
    manager: &dyn Manager,
    res_id: &str,
    status_field: &str,
    success_status: &[&str],
    error_status: &[&str],
    sleep_time: Duration,
    mut callback: Option<&mut dyn FnMut(u64)>,
) -> Result<bool, ApiError> {
    loop {
        let res = manager.get(res_id).await?;
        let status = res.str_field(status_field).unwrap_or("").to_lowercase();
        if success_status.contains(&status.as_str()) {
            return Ok(true);
        }
        if error_status.contains(&status.as_str()) {
            return Ok(false);
        }
        if let Some(cb) = callback.as_mut() {
            cb(progress(&res));
        }
        tokio::time::sleep(sleep_time).await;
    }
}

/// Poll until the resource is gone
///
/// Returns `true` once the service reports it not found, `false` if it
/// enters an error status or `timeout` elapses.
pub async fn wait_for_delete(
    manager: &dyn Manager,
    res_id: &str,
    status_field: &str,
    error_status: &[&str],
    sleep_time: Duration,
    timeout: Duration,
    mut callback: Option<&mut dyn FnMut(u64)>,
) -> Result<bool, ApiError> {
    let mut total = Duration::ZERO;
    while total < timeout {
        let res = match manager.get(res_id).await {
            Ok(r) => r,
            Err(e) if e.is_not_found() => return Ok(true),
            Err(e) => return Err(e),
        };
        let status = res.str_field(status_field).unwrap_or("").to_lowercase();
        if error_status.contains(&status.as_str()) {
            return Ok(false);
        }
        if let Some(cb) = callback.as_mut() {
            cb(progress(&res));
        }
        tokio::time::sleep(sleep_time).await;
        total += sleep_time;
    }
    Ok(false)
}

fn progress(res: &Resource) -> u64 {
    res.get("progress").and_then(Value::as_u64).unwrap_or(0)
}

/// First non-empty environment variable among `names`
pub fn env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|n| std::env::var(n).ok().filter(|v| !v.is_empty()))
}

/// Prompt for a password on the terminal
pub fn get_password(prompt: &str, confirm: bool) -> Result<String, CommandError> {
    if !std::io::stdin().is_terminal() {
        return Err(CommandError::new(
            "There was a request to be prompted for a password and a terminal was not detected.",
        ));
    }
    loop {
        let first = rpassword::prompt_password(prompt)
            .map_err(|_| CommandError::new("Password input aborted."))?;
        if !confirm {
            return Ok(first);
        }
        let second = rpassword::prompt_password(format!("Repeat {}", prompt))
            .map_err(|_| CommandError::new("Password input aborted."))?;
        if first == second {
            return Ok(first);
        }
        eprintln!("The passwords entered were not the same");
    }
}

pub fn read_blob_file_contents(path: &Path) -> Result<String, CommandError> {
    std::fs::read_to_string(path).map_err(|e| {
        CommandError::new(format!(
            "Error occurred trying to read from file {}: {}",
            path.display(),
            e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    use async_trait::async_trait;
    use openstack_client::ErrorDetail;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use test_case::test_case;

    fn res(v: Value) -> Resource {
        Resource::from_value(v).unwrap()
    }

    fn not_found_err() -> ApiError {
        ApiError::NotFound(ErrorDetail {
            status: 404,
            message: "Not found".into(),
            request_id: None,
        })
    }

    /// Manager whose `get` always misses and whose `find` is canned
    struct FindOnly {
        found: Lookup,
    }

    #[async_trait]
    impl Manager for FindOnly {
        fn resource_name(&self) -> &str {
            "server"
        }

        async fn get(&self, _id: &str) -> Result<Resource, ApiError> {
            Err(not_found_err())
        }

        async fn list(&self, _query: &Query) -> Result<Vec<Resource>, ApiError> {
            Ok(vec![])
        }

        async fn find(&self, _name: &str, _filters: &Query) -> Result<Lookup, ApiError> {
            Ok(self.found.clone())
        }
    }

    #[tokio::test]
    async fn test_find_resource_falls_back_to_unique_name() {
        let m = FindOnly {
            found: Lookup::Found(res(json!({"id": "abc", "name": "web"}))),
        };
        let r = find_resource(&m, "web").await.unwrap();
        assert_eq!(r.id(), "abc");
    }

    #[tokio::test]
    async fn test_find_resource_ambiguous_names_type_and_name() {
        let m = FindOnly {
            found: Lookup::Ambiguous(2),
        };
        let err = find_resource(&m, "web").await.unwrap_err().to_string();
        assert_eq!(err, "More than one server exists with the name 'web'.");
    }

    #[tokio::test]
    async fn test_find_resource_not_found() {
        let m = FindOnly {
            found: Lookup::NotFound,
        };
        let err = find_resource(&m, "ghost").await.unwrap_err().to_string();
        assert_eq!(err, "No server with a name or ID of 'ghost' exists.");
    }

    /// Manager that only knows resources by ID, recording lookups
    struct ById {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Manager for ById {
        fn resource_name(&self) -> &str {
            "flavor"
        }

        async fn get(&self, id: &str) -> Result<Resource, ApiError> {
            self.calls.lock().unwrap().push(id.to_string());
            if id == "42" {
                Ok(res(json!({"id": "42", "name": "m1.answer"})))
            } else {
                Err(not_found_err())
            }
        }

        async fn list(&self, _query: &Query) -> Result<Vec<Resource>, ApiError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn test_find_resource_tries_canonical_integer_first() {
        let m = ById {
            calls: Mutex::new(vec![]),
        };
        let r = find_resource(&m, "042").await.unwrap();
        assert_eq!(r.name(), "m1.answer");
        assert_eq!(*m.calls.lock().unwrap(), vec!["42".to_string()]);
    }

    #[tokio::test]
    async fn test_find_resource_propagates_unauthorized() {
        struct Denied;

        #[async_trait]
        impl Manager for Denied {
            fn resource_name(&self) -> &str {
                "network"
            }
            async fn get(&self, _id: &str) -> Result<Resource, ApiError> {
                Err(ApiError::from_status(401, "", None))
            }
            async fn list(&self, _query: &Query) -> Result<Vec<Resource>, ApiError> {
                Ok(vec![])
            }
        }

        let err = find_resource(&Denied, "n1").await.unwrap_err();
        assert!(matches!(err, CommandError::Api(ApiError::Unauthorized(_))));
    }

    /// Manager whose `get` answers with a fixed status; `find` must not run
    struct Failing {
        status: u16,
    }

    #[async_trait]
    impl Manager for Failing {
        fn resource_name(&self) -> &str {
            "server"
        }

        async fn get(&self, _id: &str) -> Result<Resource, ApiError> {
            Err(ApiError::from_status(self.status, "db down", None))
        }

        async fn list(&self, _query: &Query) -> Result<Vec<Resource>, ApiError> {
            Ok(vec![])
        }

        async fn find(&self, _name: &str, _filters: &Query) -> Result<Lookup, ApiError> {
            panic!("find called after a service error");
        }
    }

    #[test_case(500 ; "server error")]
    #[test_case(403 ; "forbidden")]
    #[tokio::test]
    async fn test_find_resource_propagates_service_errors(status: u16) {
        let err = find_resource(&Failing { status }, "abc").await.unwrap_err();
        assert_eq!(err.to_string(), ApiError::from_status(status, "db down", None).to_string());
    }

    #[tokio::test]
    async fn test_find_resource_bad_request_falls_back_to_name() {
        struct RejectsId;

        #[async_trait]
        impl Manager for RejectsId {
            fn resource_name(&self) -> &str {
                "port"
            }
            async fn get(&self, _id: &str) -> Result<Resource, ApiError> {
                Err(ApiError::from_status(400, "not a uuid", None))
            }
            async fn list(&self, _query: &Query) -> Result<Vec<Resource>, ApiError> {
                Ok(vec![])
            }
            async fn find(&self, _name: &str, _filters: &Query) -> Result<Lookup, ApiError> {
                Ok(Lookup::Found(Resource::from_value(json!({"id": "p-1", "name": "web"})).unwrap()))
            }
        }

        assert_eq!(find_resource(&RejectsId, "web").await.unwrap().id(), "p-1");
    }

    #[tokio::test]
    async fn test_find_resource_canonical_integer_fetched_once() {
        let m = ById {
            calls: Mutex::new(vec![]),
        };
        assert!(find_resource(&m, "7").await.is_err());
        assert_eq!(*m.calls.lock().unwrap(), vec!["7".to_string()]);
    }

    #[test]
    fn test_sort_items_asc_then_desc() {
        let mut items = vec![
            res(json!({"a": 2, "b": "x"})),
            res(json!({"a": 1, "b": "y"})),
            res(json!({"a": 1, "b": "z"})),
            res(json!({"a": 2, "b": "w"})),
        ];
        sort_items(&mut items, "a,b:desc").unwrap();
        let got: Vec<(i64, &str)> = items
            .iter()
            .map(|r| (r.get("a").unwrap().as_i64().unwrap(), r.str_field("b").unwrap()))
            .collect();
        assert_eq!(got, vec![(1, "z"), (1, "y"), (2, "x"), (2, "w")]);
    }

    #[test_case(":asc", "':asc' is not a valid sort key" ; "empty key")]
    #[test_case("a:up", "'up' is not a valid sort direction for sort key a, use asc or desc instead" ; "bad direction")]
    fn test_sort_items_rejects(sort: &str, msg: &str) {
        let mut items = vec![res(json!({"a": 1}))];
        assert_eq!(sort_items(&mut items, sort).unwrap_err().to_string(), msg);
    }

    #[test]
    fn test_get_item_properties() {
        let item = res(json!({
            "id": "1",
            "name": "net",
            "admin_state_up": true,
            "subnets": ["s2", "s1"],
            "OS-EXT-AZ:availability_zone": "nova"
        }));
        let row = get_item_properties(
            &item,
            &["ID", "Name", "Admin State Up", "Subnets", "OS-EXT-AZ:availability_zone", "Missing"],
            &[("Subnets", format_list), ("admin_state_up", format_admin_state)],
            &["OS-EXT-AZ:availability_zone"],
        );
        assert_eq!(
            row,
            vec![
                json!("1"),
                json!("net"),
                json!("UP"),
                json!("s1, s2"),
                json!("nova"),
                json!("")
            ]
        );
    }

    #[test]
    fn test_format_dict_sorted_and_nested() {
        assert_eq!(
            format_dict(&json!({"b": "2", "a": 1, "n": {"x": true}})),
            "a='1', b='2', n.x='True'"
        );
    }

    #[test]
    fn test_format_dict_null_is_bare_key() {
        assert_eq!(format_dict(&json!({"a": null, "b": "x"})), "a=, b='x'");
    }

    #[test]
    fn test_format_list_and_dicts() {
        assert_eq!(format_list(&json!(["b", "a"])), "a, b");
        assert_eq!(
            format_list_of_dicts(&json!([{"k": "v"}, {"x": "y"}])),
            "k='v'\nx='y'"
        );
    }

    /// Manager whose resource disappears on the second poll
    struct Vanishing {
        polls: AtomicUsize,
    }

    #[async_trait]
    impl Manager for Vanishing {
        fn resource_name(&self) -> &str {
            "volume"
        }

        async fn get(&self, _id: &str) -> Result<Resource, ApiError> {
            if self.polls.fetch_add(1, AtomicOrdering::SeqCst) == 0 {
                Ok(res(json!({"id": "v1", "status": "deleting", "progress": 40})))
            } else {
                Err(not_found_err())
            }
        }

        async fn list(&self, _query: &Query) -> Result<Vec<Resource>, ApiError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn test_wait_for_delete_one_sleep_cycle() {
        let m = Vanishing {
            polls: AtomicUsize::new(0),
        };
        let mut ticks = Vec::new();
        let mut cb = |p: u64| ticks.push(p);
        let gone = wait_for_delete(
            &m,
            "v1",
            "status",
            &["error"],
            Duration::from_millis(5),
            Duration::from_secs(5),
            Some(&mut cb),
        )
        .await
        .unwrap();

        assert!(gone);
        assert_eq!(ticks, vec![40]);
        assert_eq!(m.polls.load(AtomicOrdering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_wait_for_status_error_status() {
        struct Failing;

        #[async_trait]
        impl Manager for Failing {
            fn resource_name(&self) -> &str {
                "server"
            }
            async fn get(&self, _id: &str) -> Result<Resource, ApiError> {
                Ok(Resource::from_value(json!({"id": "s", "status": "ERROR"})).unwrap())
            }
            async fn list(&self, _query: &Query) -> Result<Vec<Resource>, ApiError> {
                Ok(vec![])
            }
        }

        let ok = wait_for_status(
            &Failing,
            "s",
            "status",
            &["active"],
            &["error"],
            Duration::from_millis(1),
            None,
        )
        .await
        .unwrap();
        assert!(!ok);
    }
}
