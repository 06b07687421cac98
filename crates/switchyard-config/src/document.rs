//! Reading and editing layer files
//!
//! Reads parse any supported format into a [`ConfigTable`]. TOML edits go
//! through `toml_edit` so comments and key order in hand-maintained files
//! survive a `Set`; JSON and YAML files are re-serialized from the tree.

use switchyard_fs::{Error as FsError, FileFormat, NormalizedPath, io};
use toml_edit::{DocumentMut, Item, TableLike};

use crate::value::{self, ConfigTable, ConfigValue};
use crate::{Error, Result};

/// Parse layer file content in the given format.
pub fn parse(path: &NormalizedPath, format: FileFormat, content: &str) -> Result<ConfigTable> {
    let root = match format {
        FileFormat::Toml => {
            let table: toml::Table =
                toml::from_str(content).map_err(|e| FsError::parse(path.to_native(), format, e))?;
            ConfigValue::from_toml(toml::Value::Table(table))
        }
        FileFormat::Json => {
            if content.trim().is_empty() {
                return Ok(ConfigTable::new());
            }
            let json: serde_json::Value = serde_json::from_str(content)
                .map_err(|e| FsError::parse(path.to_native(), format, e))?;
            ConfigValue::from_json(json).unwrap_or(ConfigValue::Table(ConfigTable::new()))
        }
        FileFormat::Yaml => {
            if content.trim().is_empty() {
                return Ok(ConfigTable::new());
            }
            let json: serde_json::Value = serde_yaml::from_str(content)
                .map_err(|e| FsError::parse(path.to_native(), format, e))?;
            ConfigValue::from_json(json).unwrap_or(ConfigValue::Table(ConfigTable::new()))
        }
    };

    match root {
        ConfigValue::Table(table) => Ok(table),
        _ => Err(FsError::parse(
            path.to_native(),
            format,
            "top level must be a table of keys",
        )
        .into()),
    }
}

/// Load a layer file. A missing file is `Ok(None)`.
pub fn load(path: &NormalizedPath) -> Result<Option<ConfigTable>> {
    let format = FileFormat::detect(path)?;
    match io::read_optional(path)? {
        Some(content) => parse(path, format, &content).map(Some),
        None => Ok(None),
    }
}

/// Set `key` to `value` in the layer file at `path`, creating it if absent.
pub fn write_key(path: &NormalizedPath, key: &str, value: &ConfigValue) -> Result<()> {
    let format = FileFormat::detect(path)?;
    let existing = io::read_optional(path)?.unwrap_or_default();

    let rendered = match format {
        FileFormat::Toml => {
            let mut doc = parse_document(path, &existing)?;
            set_in_document(&mut doc, key, value)?;
            doc.to_string()
        }
        FileFormat::Json | FileFormat::Yaml => {
            let mut table = parse(path, format, &existing)?;
            value::insert(&mut table, key, value.clone())?;
            serialize_tree(path, format, &table)?
        }
    };

    io::write_text(path, &rendered)?;
    Ok(())
}

/// Remove `key` from the layer file at `path`.
///
/// Returns whether the key was present. A missing file is left missing.
pub fn remove_key(path: &NormalizedPath, key: &str) -> Result<bool> {
    let format = FileFormat::detect(path)?;
    let Some(existing) = io::read_optional(path)? else {
        return Ok(false);
    };

    let (removed, rendered) = match format {
        FileFormat::Toml => {
            let mut doc = parse_document(path, &existing)?;
            let segments = value::split_key(key)?;
            let removed = remove_in_table(doc.as_table_mut(), &segments);
            (removed, doc.to_string())
        }
        FileFormat::Json | FileFormat::Yaml => {
            let mut table = parse(path, format, &existing)?;
            let removed = value::remove(&mut table, key)?;
            (removed, serialize_tree(path, format, &table)?)
        }
    };

    if removed {
        io::write_text(path, &rendered)?;
    }
    Ok(removed)
}

fn parse_document(path: &NormalizedPath, content: &str) -> Result<DocumentMut> {
    content
        .parse::<DocumentMut>()
        .map_err(|e| FsError::parse(path.to_native(), FileFormat::Toml, e).into())
}

fn serialize_tree(path: &NormalizedPath, format: FileFormat, table: &ConfigTable) -> Result<String> {
    let json = ConfigValue::Table(table.clone()).to_json();
    let rendered = match format {
        FileFormat::Json => serde_json::to_string_pretty(&json)
            .map(|s| s + "\n")
            .map_err(|e| FsError::serialize(path.to_native(), format, e))?,
        FileFormat::Yaml => serde_yaml::to_string(&json)
            .map_err(|e| FsError::serialize(path.to_native(), format, e))?,
        FileFormat::Toml => toml::to_string_pretty(&json)
            .map_err(|e| FsError::serialize(path.to_native(), format, e))?,
    };
    Ok(rendered)
}

fn set_in_document(doc: &mut DocumentMut, key: &str, value: &ConfigValue) -> Result<()> {
    let segments = value::split_key(key)?;
    let Some((last, parents)) = segments.split_last() else {
        return Err(Error::InvalidKey {
            key: key.to_string(),
        });
    };

    let mut current: &mut dyn TableLike = doc.as_table_mut();
    let mut inline = false;
    for segment in parents {
        let mut fresh = toml_edit::Table::new();
        fresh.set_implicit(true);
        let default = if inline {
            Item::Value(toml_edit::Value::InlineTable(toml_edit::InlineTable::new()))
        } else {
            Item::Table(fresh)
        };
        let item = current.entry(segment).or_insert(default);
        inline = item.is_inline_table();
        current = item.as_table_like_mut().ok_or_else(|| Error::NotATable {
            key: key.to_string(),
            segment: (*segment).to_string(),
        })?;
    }

    let mut item = match value {
        ConfigValue::Table(_) if !inline => to_edit_item(value),
        _ => Item::Value(to_edit_value(value)),
    };

    // Replace scalars in place so the key keeps its comments and spacing
    if let Some(Item::Value(existing)) = current.get_mut(last)
        && let Item::Value(replacement) = &mut item
    {
        *replacement.decor_mut() = existing.decor().clone();
        *existing = replacement.clone();
        return Ok(());
    }
    current.insert(last, item);
    Ok(())
}

fn remove_in_table(table: &mut dyn TableLike, segments: &[&str]) -> bool {
    match segments {
        [] => false,
        [last] => table.remove(last).is_some(),
        [head, rest @ ..] => {
            let Some(child) = table.get_mut(head).and_then(|item| item.as_table_like_mut()) else {
                return false;
            };
            let removed = remove_in_table(child, rest);
            let now_empty = child.is_empty();
            if removed && now_empty {
                table.remove(head);
            }
            removed
        }
    }
}

fn to_edit_item(value: &ConfigValue) -> Item {
    match value {
        ConfigValue::Table(map) => {
            let mut table = toml_edit::Table::new();
            for (k, v) in map {
                table.insert(k, to_edit_item(v));
            }
            Item::Table(table)
        }
        other => Item::Value(to_edit_value(other)),
    }
}

fn to_edit_value(value: &ConfigValue) -> toml_edit::Value {
    match value {
        ConfigValue::String(s) => s.as_str().into(),
        ConfigValue::Bool(b) => (*b).into(),
        ConfigValue::Integer(i) => (*i).into(),
        ConfigValue::Float(f) => (*f).into(),
        ConfigValue::Array(items) => {
            let mut array = toml_edit::Array::new();
            for item in items {
                array.push(to_edit_value(item));
            }
            toml_edit::Value::Array(array)
        }
        ConfigValue::Table(map) => {
            let mut table = toml_edit::InlineTable::new();
            for (k, v) in map {
                table.insert(k.as_str(), to_edit_value(v));
            }
            toml_edit::Value::InlineTable(table)
        }
    }
}
