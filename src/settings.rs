//! Settings - the opaque key/value configuration handed to runners
//!
//! Settings are sourced externally (typically a JSON object in a config
//! file) and passed once to [`ExperimentRunner::initialize`]. The typed
//! accessor surface matches [`ResultRecord`](crate::ResultRecord).
//!
//! [`ExperimentRunner::initialize`]: crate::ExperimentRunner::initialize

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::coerce;
use crate::{Error, Result};

/// Opaque string-keyed settings map with heterogeneous values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    values: BTreeMap<String, Value>,
}

impl Settings {
    /// Create an empty settings map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse settings from a JSON object string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the input is not a JSON object.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        match value {
            Value::Object(map) => Ok(Self {
                values: map.into_iter().collect(),
            }),
            other => Err(Error::Configuration(format!(
                "settings must be a JSON object, got {}",
                coerce::json_type_name(&other)
            ))),
        }
    }

    /// Load settings from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a JSON object.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Insert or overwrite a setting.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Get a raw setting value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Number of settings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get a setting as `i64`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the setting is absent or does
    /// not coerce.
    pub fn get_i64(&self, key: &str) -> Result<i64> {
        match self.values.get(key) {
            Some(value) => coerce::to_i64(key, value),
            None => Err(coerce::absent(key, "integer")),
        }
    }

    /// Get a setting as `f64`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the setting is absent or does
    /// not coerce.
    pub fn get_f64(&self, key: &str) -> Result<f64> {
        match self.values.get(key) {
            Some(value) => coerce::to_f64(key, value),
            None => Err(coerce::absent(key, "float")),
        }
    }

    /// Get a setting as `bool`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the setting is absent or does
    /// not coerce.
    pub fn get_bool(&self, key: &str) -> Result<bool> {
        match self.values.get(key) {
            Some(value) => coerce::to_bool(key, value),
            None => Err(coerce::absent(key, "boolean")),
        }
    }

    /// Get a setting as `String`. Numbers and booleans are formatted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the setting is absent or is a
    /// null, array or object.
    pub fn get_string(&self, key: &str) -> Result<String> {
        match self.values.get(key) {
            Some(value) => coerce::to_string(key, value),
            None => Err(coerce::absent(key, "string")),
        }
    }
}
