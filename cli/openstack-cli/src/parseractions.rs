// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Value parsers for `key=value` style options
//!
//! clap parses each occurrence; the helpers here fold the occurrences
//! into the maps the commands send to the services.

use std::collections::BTreeMap;
use std::ffi::OsStr;

use clap::builder::TypedValueParser;
use clap::error::ErrorKind;

/// One `--property` occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyValue {
    /// `key=value`
    Set(String, String),
    /// bare `key`: drop it from the defaults
    Unset(String),
}

/// Parse `key=value` (or a bare `key`)
pub fn parse_key_value(s: &str) -> Result<KeyValue, String> {
    match s.split_once('=') {
        Some(("", _)) => Err(format!("Property key must be specified: {}", s)),
        Some((k, v)) => Ok(KeyValue::Set(k.to_string(), v.to_string())),
        None => Ok(KeyValue::Unset(s.to_string())),
    }
}

/// Fold `--property` occurrences onto `defaults`
pub fn apply_key_values(mut defaults: BTreeMap<String, String>, items: &[KeyValue]) -> BTreeMap<String, String> {
    for item in items {
        match item {
            KeyValue::Set(k, v) => {
                defaults.insert(k.clone(), v.clone());
            }
            KeyValue::Unset(k) => {
                defaults.remove(k);
            }
        }
    }
    defaults
}

/// `--property` occurrences as a fresh map
pub fn key_values(items: &[KeyValue]) -> BTreeMap<String, String> {
    apply_key_values(BTreeMap::new(), items)
}

/// Parse a strict `key=value` pair
pub fn parse_key_value_pair(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some(("", _)) => Err(format!("Property key must be specified: {}", s)),
        Some((k, v)) => Ok((k.to_string(), v.to_string())),
        None => Err(format!("Expected 'key=value' type, but got: {}", s)),
    }
}

/// Collect repeated keys into lists: `a=1`, `a=2` gives `{a: [1, 2]}`
pub fn key_value_append(items: &[(String, String)]) -> BTreeMap<String, Vec<String>> {
    let mut out: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (k, v) in items {
        out.entry(k.clone()).or_default().push(v.clone());
    }
    out
}

/// Parser for `k1=v1,k2=v2` options, one map per occurrence
///
/// When either key set is non-empty, every key must be one of them and
/// every required key must be present.
#[derive(Debug, Clone, Copy)]
pub struct MultiKeyValueParser {
    required: &'static [&'static str],
    optional: &'static [&'static str],
    /// Segments without `=` continue the previous value
    allow_commas: bool,
}

impl MultiKeyValueParser {
    pub const fn new(required: &'static [&'static str], optional: &'static [&'static str]) -> Self {
        Self {
            required,
            optional,
            allow_commas: false,
        }
    }

    /// Accept commas inside values (`key=a,b,other=c`)
    pub const fn comma(required: &'static [&'static str], optional: &'static [&'static str]) -> Self {
        Self {
            required,
            optional,
            allow_commas: true,
        }
    }

    pub fn parse_str(&self, s: &str) -> Result<BTreeMap<String, String>, String> {
        let mut map = BTreeMap::new();
        let mut last_key: Option<String> = None;

        for segment in s.split(',') {
            match segment.split_once('=') {
                Some((k, v)) if !k.is_empty() => {
                    map.insert(k.to_string(), v.to_string());
                    last_key = Some(k.to_string());
                }
                _ if self.allow_commas && last_key.is_some() && !segment.contains('=') => {
                    if let Some(prev) = last_key.as_ref().and_then(|k| map.get_mut(k)) {
                        prev.push(',');
                        prev.push_str(segment);
                    }
                }
                _ => {
                    return Err(format!(
                        "Expected comma separated 'key=value' pairs, but got: {}",
                        s
                    ));
                }
            }
        }

        self.validate(&map)?;
        Ok(map)
    }

    fn validate(&self, map: &BTreeMap<String, String>) -> Result<(), String> {
        if self.required.is_empty() && self.optional.is_empty() {
            return Ok(());
        }

        let invalid: Vec<&str> = map
            .keys()
            .map(String::as_str)
            .filter(|k| !self.required.contains(k) && !self.optional.contains(k))
            .collect();
        if !invalid.is_empty() {
            let mut valid: Vec<&str> = self.required.iter().chain(self.optional).copied().collect();
            valid.sort_unstable();
            return Err(format!(
                "Invalid keys {} specified.\nValid keys are: {}",
                invalid.join(", "),
                valid.join(", ")
            ));
        }

        let missing: Vec<&str> = self
            .required
            .iter()
            .copied()
            .filter(|k| !map.contains_key(*k))
            .collect();
        if !missing.is_empty() {
            return Err(format!(
                "Missing required keys {}.\nRequired keys are: {}",
                missing.join(", "),
                self.required.join(", ")
            ));
        }
        Ok(())
    }
}

impl TypedValueParser for MultiKeyValueParser {
    type Value = BTreeMap<String, String>;

    fn parse_ref(
        &self,
        cmd: &clap::Command,
        arg: Option<&clap::Arg>,
        value: &OsStr,
    ) -> Result<Self::Value, clap::Error> {
        let s = value.to_str().ok_or_else(|| {
            clap::Error::raw(ErrorKind::InvalidUtf8, "Argument is not valid UTF-8\n").with_cmd(cmd)
        })?;
        self.parse_str(s).map_err(|msg| {
            let name = arg
                .map(|a| match a.get_long() {
                    Some(long) => long.to_string(),
                    None => a.get_id().to_string().replace('_', "-"),
                })
                .unwrap_or_default();
            clap::Error::raw(
                ErrorKind::ValueValidation,
                format!("invalid value '{}' for '--{}': {}\n", s, name, msg),
            )
            .with_cmd(cmd)
        })
    }
}

/// `N` or `MIN:MAX`
pub fn parse_range(s: &str) -> Result<(u32, u32), String> {
    let parse = |v: &str| {
        v.trim()
            .parse::<u32>()
            .map_err(|_| format!("Invalid range, '{}' is not an integer", v))
    };
    let parts: Vec<&str> = s.split(':').collect();
    match parts.as_slice() {
        [single] => {
            let n = parse(single)?;
            Ok((n, n))
        }
        [min, max] => {
            let (min, max) = (parse(min)?, parse(max)?);
            if min <= max {
                Ok((min, max))
            } else {
                Err(format!("Invalid range, {} is not less than {}", min, max))
            }
        }
        _ => Err("Invalid range, too many values".to_string()),
    }
}

pub fn parse_non_negative(s: &str) -> Result<u64, String> {
    s.parse::<u64>()
        .map_err(|_| format!("{} expected a non-negative integer", s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_key_value_sets_pairs() {
        let items: Vec<KeyValue> = ["a=1", "b=2"]
            .iter()
            .map(|s| parse_key_value(s).unwrap())
            .collect();
        assert_eq!(key_values(&items), map(&[("a", "1"), ("b", "2")]));
    }

    #[test]
    fn test_key_value_bare_key_removes_default() {
        let defaults = map(&[("a", "0"), ("c", "3")]);
        let items = vec![parse_key_value("a").unwrap(), parse_key_value("b=2").unwrap()];
        assert_eq!(apply_key_values(defaults, &items), map(&[("b", "2"), ("c", "3")]));
    }

    #[test]
    fn test_key_value_value_may_contain_equals() {
        assert_eq!(
            parse_key_value("k=a=b").unwrap(),
            KeyValue::Set("k".into(), "a=b".into())
        );
    }

    #[test]
    fn test_key_value_empty_key_rejected() {
        assert!(parse_key_value("=v").unwrap_err().contains("Property key must be specified"));
    }

    #[test]
    fn test_key_value_append() {
        let items = vec![
            parse_key_value_pair("net=a").unwrap(),
            parse_key_value_pair("net=b").unwrap(),
            parse_key_value_pair("zone=z").unwrap(),
        ];
        let out = key_value_append(&items);
        assert_eq!(out["net"], vec!["a", "b"]);
        assert_eq!(out["zone"], vec!["z"]);
        assert!(parse_key_value_pair("novalue").is_err());
    }

    const REQUIRED: MultiKeyValueParser = MultiKeyValueParser::new(&["req1", "req2"], &["opt1"]);

    #[test]
    fn test_multi_key_value_required_present() {
        assert_eq!(
            REQUIRED.parse_str("req1=x,req2=y").unwrap(),
            map(&[("req1", "x"), ("req2", "y")])
        );
    }

    #[test]
    fn test_multi_key_value_missing_required() {
        let err = REQUIRED.parse_str("req1=x").unwrap_err();
        assert_eq!(err, "Missing required keys req2.\nRequired keys are: req1, req2");
    }

    #[test]
    fn test_multi_key_value_invalid_key() {
        let err = REQUIRED.parse_str("req1=x,req2=y,bogus=z").unwrap_err();
        assert!(err.starts_with("Invalid keys bogus specified."));
        assert!(err.contains("Valid keys are: opt1, req1, req2"));
    }

    #[test]
    fn test_multi_key_value_through_clap() {
        let cmd = clap::Command::new("t").arg(
            clap::Arg::new("nic")
                .long("nic")
                .action(clap::ArgAction::Append)
                .value_parser(REQUIRED),
        );
        let m = cmd
            .clone()
            .try_get_matches_from(["t", "--nic", "req1=a,req2=b", "--nic", "req1=c,req2=d"])
            .unwrap();
        let nics: Vec<&BTreeMap<String, String>> = m.get_many("nic").unwrap().collect();
        assert_eq!(nics.len(), 2);
        assert_eq!(nics[1]["req1"], "c");

        let err = cmd.try_get_matches_from(["t", "--nic", "req1=a"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_multi_key_value_comma_values() {
        let p = MultiKeyValueParser::comma(&[], &[]);
        assert_eq!(
            p.parse_str("hosts=a,b,c,zone=z").unwrap(),
            map(&[("hosts", "a,b,c"), ("zone", "z")])
        );
        assert!(p.parse_str("lead,k=v").is_err());
    }

    #[test_case("4", (4, 4) ; "single value")]
    #[test_case("6:9", (6, 9) ; "min and max")]
    #[test_case("7:7", (7, 7) ; "equal bounds")]
    fn test_range_ok(input: &str, expected: (u32, u32)) {
        assert_eq!(parse_range(input).unwrap(), expected);
    }

    #[test_case("9:6" ; "reversed")]
    #[test_case("1:2:3" ; "too many values")]
    #[test_case("a:b" ; "not integers")]
    fn test_range_err(input: &str) {
        assert!(parse_range(input).is_err());
    }

    #[test]
    fn test_range_reversed_message() {
        assert_eq!(
            parse_range("9:6").unwrap_err(),
            "Invalid range, 9 is not less than 6"
        );
    }

    #[test]
    fn test_non_negative() {
        assert_eq!(parse_non_negative("0").unwrap(), 0);
        assert_eq!(
            parse_non_negative("-1").unwrap_err(),
            "-1 expected a non-negative integer"
        );
    }
}
