//! Frontmatter parsing for content files.
//!
//! Headers are kept loosely typed: every key maps to a raw YAML value so the
//! field validators can tell a missing key from a key of the wrong shape.

use std::{collections::BTreeMap, path::Path};

use serde_yaml::Value;

use crate::error::{CoreError, Result};

/// Raw key-value header of a content file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    fields: BTreeMap<String, Value>,
}

impl Header {
    /// Look up a raw header value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// First present value among several spellings of a key.
    pub fn get_any(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter().find_map(|k| self.get(k))
    }

    /// Number of keys in the header.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the header has no keys.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, Value)> for Header {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Delimiter types for frontmatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontmatterFormat {
    /// YAML frontmatter delimited by `---`.
    Yaml,
    /// TOML frontmatter delimited by `+++`.
    Toml,
}

impl FrontmatterFormat {
    /// Get the delimiter string for this format.
    pub fn delimiter(&self) -> &'static str {
        match self {
            Self::Yaml => "---",
            Self::Toml => "+++",
        }
    }
}

/// Split content into frontmatter and body.
///
/// Both delimiters must sit on a line of their own; a `---` or `+++` inside a
/// header value does not close the header.
pub fn split_frontmatter(content: &str) -> Option<(FrontmatterFormat, &str, &str)> {
    let content = content.trim_start();

    let format = if content.starts_with("---") {
        FrontmatterFormat::Yaml
    } else if content.starts_with("+++") {
        FrontmatterFormat::Toml
    } else {
        return None;
    };

    let delimiter = format.delimiter();

    let (opening, rest) = content.split_once('\n')?;
    if opening.trim_end() != delimiter {
        return None;
    }
    let (start, end) = delimiter_line(rest, delimiter)?;

    let frontmatter = rest[..start].trim();
    let body = rest[end..].trim_start();

    Some((format, frontmatter, body))
}

/// Byte range of the first line consisting only of `delimiter`.
fn delimiter_line(text: &str, delimiter: &str) -> Option<(usize, usize)> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == delimiter {
            return Some((offset, offset + line.len()));
        }
        offset += line.len();
    }
    None
}

/// Parse a content file into its header and body.
///
/// A file without frontmatter yields an empty header and the whole text as body.
pub fn parse_frontmatter(content: &str, path: &Path) -> Result<(Header, String)> {
    let Some((format, fm_str, body)) = split_frontmatter(content) else {
        return Ok((Header::default(), content.to_string()));
    };

    let header = match format {
        FrontmatterFormat::Yaml => {
            let value: Value = serde_yaml::from_str(fm_str)
                .map_err(|e| CoreError::frontmatter(path, e.to_string()))?;
            header_from_yaml(value, path)?
        }
        FrontmatterFormat::Toml => {
            let table: toml::Table = toml::from_str(fm_str)
                .map_err(|e| CoreError::frontmatter(path, e.to_string()))?;
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_yaml(v)))
                .collect()
        }
    };

    Ok((header, body.to_string()))
}

fn header_from_yaml(value: Value, path: &Path) -> Result<Header> {
    match value {
        Value::Null => Ok(Header::default()),
        Value::Mapping(mapping) => Ok(mapping
            .into_iter()
            .filter_map(|(k, v)| match k {
                Value::String(key) => Some((key, v)),
                other => {
                    tracing::debug!(path = %path.display(), key = ?other, "ignoring non-string header key");
                    None
                }
            })
            .collect()),
        _ => Err(CoreError::frontmatter(path, "header must be a key-value mapping")),
    }
}

fn toml_to_yaml(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => Value::Number(f.into()),
        toml::Value::Boolean(b) => Value::Bool(b),
        // Dates stay textual; the blog loader parses them itself.
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Sequence(items.into_iter().map(toml_to_yaml).collect()),
        toml::Value::Table(table) => Value::Mapping(
            table
                .into_iter()
                .map(|(k, v)| (Value::String(k), toml_to_yaml(v)))
                .collect(),
        ),
    }
}
