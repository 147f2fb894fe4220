//! Error types for paramsweep
//!
//! The taxonomy separates configuration faults (detected before any
//! execution), per-value coercion faults (local to one combination),
//! stage faults (fatal to the sweep), and persistence faults (fatal,
//! since they break the durability guarantee).

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Paramsweep error types
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed parameter space or settings (duplicate dimension,
    /// empty value list, empty space). Detected before execution.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A value could not be coerced to the type the caller expected.
    /// Local to one combination; runners typically turn this into a
    /// `Skip` or `Abort` control code.
    #[error("type mismatch for key '{key}': expected {expected}, got {actual}")]
    TypeMismatch {
        /// Key whose value failed coercion
        key: String,
        /// Type the caller asked for
        expected: &'static str,
        /// JSON type actually stored
        actual: &'static str,
    },

    /// Uncaught fault inside a filter or runner. Always fatal to the
    /// sweep; masking it risks an inconsistent summary.
    #[error("execution error in {stage} at combination {index}: {message}")]
    Execution {
        /// Stage that faulted ("initialize", "filter", "execute")
        stage: &'static str,
        /// Sequence index of the offending combination
        index: usize,
        /// Underlying fault description
        message: String,
    },

    /// Summary append failed. Fatal: the sweep cannot guarantee that
    /// every accepted record is durably recorded.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
