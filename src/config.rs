//! Configuration file loading.
//!
//! The file is a flat mapping from config key to scalar. JSON is the
//! default format; files ending in `.toml` are read as TOML and converted
//! to the same representation. TOML's `nan` and `inf` have no JSON
//! equivalent and are rejected. A leading `~` is expanded to the home
//! directory.

use std::path::{Path, PathBuf};

use serde_json::{Number, Value as Json};

use crate::error::Error;
use crate::option::ConfigMap;

/// Loads the configuration file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read, does not decode, or its
/// top level is not an object/table.
pub fn load(path: &Path) -> Result<ConfigMap, Error> {
    let path = expand_home(path);

    let content = std::fs::read_to_string(&path).map_err(|source| Error::FileRead {
        path: path.clone(),
        source,
    })?;

    let config = if is_toml(&path) {
        let table = parse_toml(&content).map_err(|source| Error::TomlDecode {
            path: path.clone(),
            source,
        })?;
        toml_to_config(table).map_err(|key| Error::NonFiniteFloat {
            path: path.clone(),
            key,
        })?
    } else {
        parse_json(&content).map_err(|source| Error::JsonDecode {
            path: path.clone(),
            source,
        })?
    };

    tracing::debug!(
        "Loaded {} config keys from {}",
        config.len(),
        path.display()
    );
    Ok(config)
}

/// Parses a JSON object.
///
/// # Errors
///
/// Returns an error if the JSON is invalid or its top level is not an object.
pub fn parse_json(content: &str) -> Result<ConfigMap, serde_json::Error> {
    serde_json::from_str(content)
}

/// Parses a TOML document.
///
/// # Errors
///
/// Returns an error if the TOML is invalid.
pub fn parse_toml(content: &str) -> Result<toml::Table, toml::de::Error> {
    toml::from_str(content)
}

/// Converts a TOML table into the JSON representation.
///
/// Fails with the top-level key holding a NaN or infinite float.
fn toml_to_config(table: toml::Table) -> Result<ConfigMap, String> {
    table
        .into_iter()
        .map(|(key, value)| match toml_to_json(value) {
            Some(json) => Ok((key, json)),
            None => Err(key),
        })
        .collect()
}

fn toml_to_json(value: toml::Value) -> Option<Json> {
    let json = match value {
        toml::Value::String(s) => Json::String(s),
        toml::Value::Integer(i) => Json::from(i),
        toml::Value::Float(f) => Json::Number(Number::from_f64(f)?),
        toml::Value::Boolean(b) => Json::Bool(b),
        toml::Value::Datetime(d) => Json::String(d.to_string()),
        toml::Value::Array(items) => {
            Json::Array(items.into_iter().map(toml_to_json).collect::<Option<_>>()?)
        }
        toml::Value::Table(table) => Json::Object(
            table
                .into_iter()
                .map(|(key, value)| toml_to_json(value).map(|json| (key, json)))
                .collect::<Option<_>>()?,
        ),
    };
    Some(json)
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}

fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };

    dirs::home_dir().map_or_else(|| path.to_path_buf(), |home| home.join(rest))
}
