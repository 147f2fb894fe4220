//! Result record - the keyed bag of inputs and outputs for one combination
//!
//! A fresh [`ResultRecord`] is constructed by the orchestrator for every
//! combination (no reuse across iterations), seeded with the combination's
//! key/value pairs, mutated by filters and the experiment runner, handed to
//! the summary writer, then dropped. This bounds memory use over
//! arbitrarily long sweeps.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::coerce;
use crate::space::Combination;
use crate::Result;

/// Mutable key/value bag holding one combination's parameters and outputs.
///
/// Keys are strings; values are heterogeneous (`serde_json::Value`).
/// Fields iterate in sorted key order, so derived output (summary lines,
/// checkpoints) has a stable column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    index: usize,
    created_at: DateTime<Utc>,
    fields: BTreeMap<String, Value>,
}

impl ResultRecord {
    /// Create an empty record with the given sequence index.
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self {
            index,
            created_at: Utc::now(),
            fields: BTreeMap::new(),
        }
    }

    /// Create a record seeded with a combination's key/value pairs.
    #[must_use]
    pub fn from_combination(index: usize, combination: &Combination) -> Self {
        let mut record = Self::new(index);
        for (key, value) in combination.entries() {
            record.fields.insert(key.clone(), value.clone());
        }
        record
    }

    /// Position of this record's combination in the sweep (0-indexed).
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Timestamp at which the record was created.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Insert or overwrite a field.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Get a raw field value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Whether a field is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// All fields in sorted key order.
    #[must_use]
    pub const fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Get a field as `i64`.
    ///
    /// Integral JSON numbers and string-encoded integers coerce.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`](crate::Error::TypeMismatch) if the
    /// field is absent or does not coerce.
    pub fn get_i64(&self, key: &str) -> Result<i64> {
        match self.fields.get(key) {
            Some(value) => coerce::to_i64(key, value),
            None => Err(coerce::absent(key, "integer")),
        }
    }

    /// Get a field as `f64`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`](crate::Error::TypeMismatch) if the
    /// field is absent or does not coerce.
    pub fn get_f64(&self, key: &str) -> Result<f64> {
        match self.fields.get(key) {
            Some(value) => coerce::to_f64(key, value),
            None => Err(coerce::absent(key, "float")),
        }
    }

    /// Get a field as `bool`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`](crate::Error::TypeMismatch) if the
    /// field is absent or does not coerce.
    pub fn get_bool(&self, key: &str) -> Result<bool> {
        match self.fields.get(key) {
            Some(value) => coerce::to_bool(key, value),
            None => Err(coerce::absent(key, "boolean")),
        }
    }

    /// Get a field as `String`. Numbers and booleans are formatted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`](crate::Error::TypeMismatch) if the
    /// field is absent or is a null, array or object.
    pub fn get_string(&self, key: &str) -> Result<String> {
        match self.fields.get(key) {
            Some(value) => coerce::to_string(key, value),
            None => Err(coerce::absent(key, "string")),
        }
    }

    /// Serialize this record as pretty JSON into `dir`, named by its
    /// sequence index (`record_000042.json`). Used for checkpointing;
    /// not part of the per-iteration persistence path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to_file(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = dir
            .as_ref()
            .join(format!("record_{:06}.json", self.index));
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json)?;
        Ok(path)
    }

    /// Deserialize a record previously written by
    /// [`save_to_file`](Self::save_to_file).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

impl std::fmt::Display for ResultRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} {{", self.index)?;
        for (i, (key, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{key}={value}")?;
        }
        write!(f, "}}")
    }
}
