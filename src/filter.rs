//! Filter chain - ordered predicates over candidate combinations
//!
//! Filters decide whether a combination reaches the experiment runner.
//! The chain evaluates in addition order and short-circuits on the first
//! non-`Continue` code: `Skip` drops the combination and the sweep moves
//! on, `Abort` terminates the whole sweep.
//!
//! Filters may annotate the record they are given (e.g. a rejection
//! reason) but must not retain references across calls.

use crate::record::ResultRecord;
use crate::{ControlCode, Result};

/// Predicate over a candidate combination's [`ResultRecord`].
pub trait Filter {
    /// Inspect a record and decide how the sweep should proceed.
    ///
    /// # Errors
    ///
    /// An error is treated as fatal by the orchestrator; recoverable
    /// conditions should be expressed as `Skip` or `Abort` instead.
    fn check(&mut self, record: &mut ResultRecord) -> Result<ControlCode>;
}

impl<F> Filter for F
where
    F: FnMut(&mut ResultRecord) -> Result<ControlCode>,
{
    fn check(&mut self, record: &mut ResultRecord) -> Result<ControlCode> {
        self(record)
    }
}

/// Ordered sequence of filters with short-circuit evaluation.
#[derive(Default)]
pub struct FilterChain {
    filters: Vec<Box<dyn Filter>>,
}

impl std::fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterChain")
            .field("filters", &self.filters.len())
            .finish()
    }
}

impl FilterChain {
    /// Create an empty chain (accepts every combination).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter. Addition order is evaluation order.
    pub fn add_filter(&mut self, filter: impl Filter + 'static) -> &mut Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Number of filters in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Whether the chain is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Run the filters in order, short-circuiting on the first
    /// non-`Continue` result.
    ///
    /// # Errors
    ///
    /// Propagates the first filter error unchanged.
    pub fn evaluate(&mut self, record: &mut ResultRecord) -> Result<ControlCode> {
        for filter in &mut self.filters {
            match filter.check(record)? {
                ControlCode::Continue => {}
                code => return Ok(code),
            }
        }
        Ok(ControlCode::Continue)
    }
}
