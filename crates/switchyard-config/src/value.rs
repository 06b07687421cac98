//! Typed configuration values and dotted-key addressing
//!
//! Layer files are parsed into a [`ConfigTable`] tree. Values stay typed until a
//! caller asks for a specific representation, so the string `"false"` and an
//! absent key are never confused.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::{Error, Result};

/// A tree of configuration values keyed by segment name.
pub type ConfigTable = BTreeMap<String, ConfigValue>;

/// A single configuration value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    String(String),
    Bool(bool),
    Integer(i64),
    Float(f64),
    Array(Vec<ConfigValue>),
    Table(ConfigTable),
}

impl ConfigValue {
    /// Coerce to a boolean.
    ///
    /// Booleans pass through; strings accept `true/false`, `1/0`, `yes/no` and
    /// `on/off` in any case; integers accept `1` and `0`. Anything else is `None`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::String(s) => parse_bool(s),
            Self::Integer(1) => Some(true),
            Self::Integer(0) => Some(false),
            _ => None,
        }
    }

    /// Borrow the value as a string if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&ConfigTable> {
        match self {
            Self::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Whether this value counts as "not set" during layered resolution.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::String(s) => s.is_empty(),
            Self::Table(t) => t.is_empty(),
            _ => false,
        }
    }

    /// Human-readable rendering used by `config get`.
    ///
    /// Strings render bare; compound values render as compact JSON.
    pub fn render(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Bool(b) => b.to_string(),
            Self::Integer(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Array(_) | Self::Table(_) => self.to_json().to_string(),
        }
    }

    /// Infer a typed value from command-line text.
    ///
    /// `true`/`false` become booleans, integer and float literals become
    /// numbers, everything else stays a string.
    pub fn infer(text: &str) -> Self {
        match text {
            "true" => return Self::Bool(true),
            "false" => return Self::Bool(false),
            _ => {}
        }
        if let Ok(i) = text.parse::<i64>() {
            return Self::Integer(i);
        }
        if text.contains('.')
            && let Ok(f) = text.parse::<f64>()
            && f.is_finite()
        {
            return Self::Float(f);
        }
        Self::String(text.to_string())
    }

    /// Convert from a JSON tree. `null` has no representation and yields `None`.
    pub fn from_json(value: serde_json::Value) -> Option<Self> {
        use serde_json::Value;
        Some(match value {
            Value::Null => return None,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => Self::Float(n.as_f64()?),
            },
            Value::String(s) => Self::String(s),
            Value::Array(items) => {
                Self::Array(items.into_iter().filter_map(Self::from_json).collect())
            }
            Value::Object(map) => Self::Table(
                map.into_iter()
                    .filter_map(|(k, v)| Self::from_json(v).map(|v| (k, v)))
                    .collect(),
            ),
        })
    }

    /// Convert from a TOML tree. Datetimes are kept as their string form.
    pub fn from_toml(value: toml::Value) -> Self {
        use toml::Value;
        match value {
            Value::String(s) => Self::String(s),
            Value::Integer(i) => Self::Integer(i),
            Value::Float(f) => Self::Float(f),
            Value::Boolean(b) => Self::Bool(b),
            Value::Datetime(d) => Self::String(d.to_string()),
            Value::Array(items) => Self::Array(items.into_iter().map(Self::from_toml).collect()),
            Value::Table(map) => Self::Table(
                map.into_iter()
                    .map(|(k, v)| (k, Self::from_toml(v)))
                    .collect(),
            ),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            Self::String(s) => Value::String(s.clone()),
            Self::Bool(b) => Value::Bool(*b),
            Self::Integer(i) => Value::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::Array(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Table(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for ConfigValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for ConfigValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

/// Parse the boolean spellings accepted from environment variables and files.
pub fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Split a dotted key into its segments, rejecting empty segments.
pub fn split_key(key: &str) -> Result<Vec<&str>> {
    let segments: Vec<&str> = key.split('.').collect();
    if segments.iter().any(|s| s.trim().is_empty()) {
        return Err(Error::InvalidKey {
            key: key.to_string(),
        });
    }
    Ok(segments)
}

/// Look up a dotted key in a table.
pub fn lookup<'a>(table: &'a ConfigTable, key: &str) -> Option<&'a ConfigValue> {
    let segments = split_key(key).ok()?;
    let (last, parents) = segments.split_last()?;
    let mut current = table;
    for segment in parents {
        current = current.get(*segment)?.as_table()?;
    }
    current.get(*last)
}

/// Insert a value at a dotted key, creating intermediate tables.
pub fn insert(table: &mut ConfigTable, key: &str, value: ConfigValue) -> Result<()> {
    let segments = split_key(key)?;
    let Some((last, parents)) = segments.split_last() else {
        return Err(Error::InvalidKey {
            key: key.to_string(),
        });
    };
    let mut current = table;
    for segment in parents {
        let slot = current
            .entry((*segment).to_string())
            .or_insert_with(|| ConfigValue::Table(ConfigTable::new()));
        current = match slot {
            ConfigValue::Table(t) => t,
            _ => {
                return Err(Error::NotATable {
                    key: key.to_string(),
                    segment: (*segment).to_string(),
                });
            }
        };
    }
    current.insert((*last).to_string(), value);
    Ok(())
}

/// Remove a dotted key, pruning tables the removal leaves empty.
///
/// Returns whether anything was removed.
pub fn remove(table: &mut ConfigTable, key: &str) -> Result<bool> {
    let segments = split_key(key)?;
    Ok(remove_segments(table, &segments))
}

fn remove_segments(table: &mut ConfigTable, segments: &[&str]) -> bool {
    match segments {
        [] => false,
        [last] => table.remove(*last).is_some(),
        [head, rest @ ..] => {
            let Some(ConfigValue::Table(child)) = table.get_mut(*head) else {
                return false;
            };
            let removed = remove_segments(child, rest);
            let now_empty = child.is_empty();
            if removed && now_empty {
                table.remove(*head);
            }
            removed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn sample() -> ConfigTable {
        let mut table = ConfigTable::new();
        insert(&mut table, "vault.backend", "1password".into()).unwrap();
        insert(&mut table, "vault.timeout", 30i64.into()).unwrap();
        insert(&mut table, "features.hooks", true.into()).unwrap();
        table
    }

    #[test]
    fn lookup_walks_nested_tables() {
        let table = sample();
        assert_eq!(lookup(&table, "vault.backend"), Some(&ConfigValue::from("1password")));
        assert_eq!(lookup(&table, "features.hooks"), Some(&ConfigValue::Bool(true)));
        assert!(lookup(&table, "vault.missing").is_none());
        assert!(lookup(&table, "vault.backend.deeper").is_none());
    }

    #[test]
    fn insert_refuses_to_replace_scalar_with_table() {
        let mut table = sample();
        let err = insert(&mut table, "vault.backend.kind", "x".into()).unwrap_err();
        assert!(matches!(err, Error::NotATable { ref segment, .. } if segment == "backend"));
    }

    #[test]
    fn remove_prunes_empty_parents() {
        let mut table = sample();
        assert!(remove(&mut table, "features.hooks").unwrap());
        assert!(!table.contains_key("features"));
        assert!(remove(&mut table, "vault.backend").unwrap());
        assert!(table.contains_key("vault"));
        assert!(!remove(&mut table, "vault.backend").unwrap());
    }

    #[rstest]
    #[case("")]
    #[case(".vault")]
    #[case("vault.")]
    #[case("vault..backend")]
    #[case("vault. .backend")]
    fn split_key_rejects_empty_segments(#[case] key: &str) {
        assert!(matches!(split_key(key), Err(Error::InvalidKey { .. })));
    }

    #[rstest]
    #[case("true", Some(true))]
    #[case("YES", Some(true))]
    #[case(" on ", Some(true))]
    #[case("1", Some(true))]
    #[case("false", Some(false))]
    #[case("Off", Some(false))]
    #[case("0", Some(false))]
    #[case("maybe", None)]
    #[case("", None)]
    fn parse_bool_spellings(#[case] text: &str, #[case] expected: Option<bool>) {
        assert_eq!(parse_bool(text), expected);
    }

    #[test]
    fn string_false_is_a_present_value() {
        let value = ConfigValue::from("false");
        assert!(!value.is_empty());
        assert_eq!(value.as_bool(), Some(false));
        assert_eq!(value.as_str(), Some("false"));
    }

    #[rstest]
    #[case("true", ConfigValue::Bool(true))]
    #[case("42", ConfigValue::Integer(42))]
    #[case("-7", ConfigValue::Integer(-7))]
    #[case("1.5", ConfigValue::Float(1.5))]
    #[case("1password", ConfigValue::String("1password".into()))]
    #[case("inf", ConfigValue::String("inf".into()))]
    #[case("TRUE", ConfigValue::String("TRUE".into()))]
    fn infer_types_from_text(#[case] text: &str, #[case] expected: ConfigValue) {
        assert_eq!(ConfigValue::infer(text), expected);
    }

    #[test]
    fn from_json_drops_nulls() {
        let json = serde_json::json!({"a": null, "b": {"c": 1, "d": [true, null]}});
        let value = ConfigValue::from_json(json).unwrap();
        let table = value.as_table().unwrap();
        assert!(!table.contains_key("a"));
        assert_eq!(lookup(table, "b.c"), Some(&ConfigValue::Integer(1)));
        assert_eq!(
            lookup(table, "b.d"),
            Some(&ConfigValue::Array(vec![ConfigValue::Bool(true)]))
        );
    }

    #[test]
    fn render_compound_values_as_json() {
        let table = sample();
        let vault = lookup(&table, "vault").unwrap();
        assert_eq!(vault.render(), r#"{"backend":"1password","timeout":30}"#);
    }
}
