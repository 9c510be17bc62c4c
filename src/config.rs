//! Application settings.
//!
//! `Settings` is an immutable snapshot of configuration taken at startup:
//! process environment variables, optionally layered over a JSON settings
//! file (the file loses on conflicts). Lookup is case-insensitive, so
//! `get("storage_account")` finds `STORAGE_ACCOUNT`. Apps register the
//! snapshot as a singleton and inject it where needed.

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

/// Errors from loading a settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("settings file must contain a JSON object")]
    NotAnObject,
}

/// Immutable, case-insensitive configuration snapshot.
///
/// # Examples
///
/// ```
/// use fnboot::Settings;
///
/// std::env::set_var("FNBOOT_DOC_REGION", "eu-west-1");
/// let settings = Settings::from_env();
///
/// assert_eq!(settings.get("fnboot_doc_region"), Some("eu-west-1"));
/// assert_eq!(settings.get_or("missing", "fallback"), "fallback");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Settings {
    // Keys normalized to uppercase for case-insensitive lookup.
    values: HashMap<String, String>,
}

impl Settings {
    /// Snapshots the current process environment.
    pub fn from_env() -> Self {
        let values = std::env::vars()
            .map(|(k, v)| (k.to_uppercase(), v))
            .collect();
        Self { values }
    }

    /// Loads a JSON settings file, then layers the process environment on
    /// top (environment wins on conflicts).
    ///
    /// The file is a flat object of string-convertible values. A file with
    /// a top-level `"Values"` object uses that object, matching the local
    /// settings layout common in serverless tooling.
    pub fn from_env_and_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        let parsed: Value = serde_json::from_str(&content)?;

        let object = match &parsed {
            Value::Object(map) => match map.get("Values") {
                Some(Value::Object(values)) => values,
                Some(_) => return Err(SettingsError::NotAnObject),
                None => map,
            },
            _ => return Err(SettingsError::NotAnObject),
        };

        let mut values: HashMap<String, String> = object
            .iter()
            .map(|(k, v)| {
                let rendered = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.to_uppercase(), rendered)
            })
            .collect();

        for (k, v) in std::env::vars() {
            values.insert(k.to_uppercase(), v);
        }

        Ok(Self { values })
    }

    /// Looks up a setting, ignoring case. Returns `None` when absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&key.to_uppercase()).map(String::as_str)
    }

    /// Looks up a setting, falling back to `default` when absent.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Whether a setting is present under any casing.
    pub fn is_set(&self, key: &str) -> bool {
        self.values.contains_key(&key.to_uppercase())
    }

    /// Number of settings in the snapshot.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
