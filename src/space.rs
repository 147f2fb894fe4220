//! Parameter space - named dimensions and deterministic enumeration
//!
//! A [`ParameterSpace`] holds named dimensions in registration order and
//! enumerates their Cartesian product lazily. The order is the mixed-radix
//! odometer order: the last-registered dimension varies fastest, so
//! combination *i* is obtained by reading *i* as a mixed-radix number whose
//! most-significant digit is the first-registered dimension.
//!
//! ## Design
//!
//! Enumeration is restartable and reproducible across runs given the same
//! registration sequence. This is what makes a crashed sweep resumable from
//! a known index: `combination_at(i)` gives O(k) random access into the
//! same sequence the iterator produces.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// A named parameter dimension with its ordered candidate values.
///
/// Values are heterogeneous (`serde_json::Value`): numbers, strings and
/// booleans all work. The value list is never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDimension {
    name: String,
    values: Vec<Value>,
}

impl ParameterDimension {
    /// Get the dimension name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the ordered candidate values.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Number of candidate values (the radix of this digit).
    #[must_use]
    pub fn size(&self) -> usize {
        self.values.len()
    }
}

/// A multi-dimensional space of named parameters.
///
/// # Example
///
/// ```rust
/// use paramsweep::ParameterSpace;
/// use serde_json::json;
///
/// let mut space = ParameterSpace::new();
/// space.add_dimension("x", vec![json!(1), json!(2)])?;
/// space.add_dimension("y", vec![json!("a"), json!("b")])?;
///
/// // Last-registered dimension varies fastest
/// let first = space.combinations()?.next().unwrap();
/// assert_eq!(first.get("x"), Some(&json!(1)));
/// assert_eq!(first.get("y"), Some(&json!("a")));
/// # Ok::<(), paramsweep::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpace {
    dimensions: Vec<ParameterDimension>,
}

impl ParameterSpace {
    /// Create an empty parameter space.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a dimension. Registration order defines enumeration order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `name` is already registered or
    /// `values` is empty.
    pub fn add_dimension(&mut self, name: impl Into<String>, values: Vec<Value>) -> Result<()> {
        let name = name.into();
        if self.dimensions.iter().any(|d| d.name == name) {
            return Err(Error::Configuration(format!(
                "dimension '{name}' is already registered"
            )));
        }
        if values.is_empty() {
            return Err(Error::Configuration(format!(
                "dimension '{name}' has no candidate values"
            )));
        }
        self.dimensions.push(ParameterDimension { name, values });
        Ok(())
    }

    /// Get the registered dimensions in registration order.
    #[must_use]
    pub fn dimensions(&self) -> &[ParameterDimension] {
        &self.dimensions
    }

    /// Number of registered dimensions.
    #[must_use]
    pub fn dimension_count(&self) -> usize {
        self.dimensions.len()
    }

    /// Total number of combinations (product of all dimension sizes).
    ///
    /// Returns 0 for a space with no dimensions.
    #[must_use]
    pub fn total_combinations(&self) -> usize {
        if self.dimensions.is_empty() {
            return 0;
        }
        self.dimensions.iter().map(ParameterDimension::size).product()
    }

    /// Enumerate all combinations lazily in odometer order.
    ///
    /// Repeated calls yield the identical sequence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if no dimensions are registered.
    pub fn combinations(&self) -> Result<Combinations<'_>> {
        if self.dimensions.is_empty() {
            return Err(Error::Configuration(
                "parameter space has no dimensions".to_string(),
            ));
        }
        Ok(Combinations {
            space: self,
            next: 0,
            total: self.total_combinations(),
        })
    }

    /// Random access into the enumeration sequence.
    ///
    /// `combination_at(i)` equals the i-th item produced by
    /// [`combinations`](Self::combinations). Returns `None` when `index`
    /// is out of range or the space is empty.
    #[must_use]
    pub fn combination_at(&self, index: usize) -> Option<Combination> {
        let total = self.total_combinations();
        if index >= total {
            return None;
        }
        // Mixed-radix decomposition: least-significant digit is the
        // last-registered dimension.
        let mut picks = vec![0usize; self.dimensions.len()];
        let mut remaining = index;
        for (slot, dim) in self.dimensions.iter().enumerate().rev() {
            picks[slot] = remaining % dim.size();
            remaining /= dim.size();
        }
        let entries = self
            .dimensions
            .iter()
            .zip(picks)
            .map(|(dim, pick)| (dim.name.clone(), dim.values[pick].clone()))
            .collect();
        Some(Combination { entries })
    }
}

/// One fully-specified assignment of values across all dimensions.
///
/// Entries are kept in dimension registration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combination {
    entries: Vec<(String, Value)>,
}

impl Combination {
    /// Look up the value selected for a dimension.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// All (dimension, value) pairs in registration order.
    #[must_use]
    pub fn entries(&self) -> &[(String, Value)] {
        &self.entries
    }

    /// Number of dimensions covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the combination covers no dimensions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Display for Combination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{key}={value}")?;
        }
        write!(f, "}}")
    }
}

/// Lazy iterator over all combinations of a [`ParameterSpace`].
#[derive(Debug, Clone)]
pub struct Combinations<'a> {
    space: &'a ParameterSpace,
    next: usize,
    total: usize,
}

impl Iterator for Combinations<'_> {
    type Item = Combination;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.total {
            return None;
        }
        let combination = self.space.combination_at(self.next);
        self.next += 1;
        combination
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Combinations<'_> {}
