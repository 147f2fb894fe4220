//! Experiment runner - the user-extension contract
//!
//! Implementations supply the domain-specific experiment logic. The
//! orchestrator calls [`initialize`](ExperimentRunner::initialize) exactly
//! once before the sweep, then [`execute`](ExperimentRunner::execute) once
//! per combination that survives the filter chain.

use crate::record::ResultRecord;
use crate::settings::Settings;
use crate::{ControlCode, Result};

/// User-supplied experiment logic, driven by the orchestrator.
///
/// # Example
///
/// ```rust
/// use paramsweep::{ControlCode, ExperimentRunner, ResultRecord, Settings};
///
/// struct SumRunner;
///
/// impl ExperimentRunner for SumRunner {
///     fn initialize(&mut self, _template: &ResultRecord, _settings: &Settings)
///         -> paramsweep::Result<()>
///     {
///         Ok(())
///     }
///
///     fn execute(&mut self, record: &mut ResultRecord) -> paramsweep::Result<ControlCode> {
///         let sum = record.get_i64("x")? + record.get_i64("y")?;
///         record.put("sum", sum);
///         Ok(ControlCode::Continue)
///     }
/// }
/// ```
pub trait ExperimentRunner {
    /// One-time setup before the sweep begins.
    ///
    /// `template` is an empty record showing the shape runners will
    /// receive; `settings` is the externally sourced configuration map.
    /// No combination-specific work happens here.
    ///
    /// # Errors
    ///
    /// An error fails the sweep before any combination is drawn.
    fn initialize(&mut self, template: &ResultRecord, settings: &Settings) -> Result<()>;

    /// Run the experiment for one combination.
    ///
    /// Read parameters with the record's typed accessors, write output
    /// fields back, and return a control code: `Continue` persists the
    /// record, `Skip` discards it and the sweep moves on (e.g. a
    /// numerically invalid run), `Abort` discards it and stops the sweep
    /// (e.g. a fatal resource failure).
    ///
    /// # Errors
    ///
    /// An uncaught error is fatal to the sweep. Expected per-value
    /// faults (type mismatches) should be handled here and turned into
    /// a control code.
    fn execute(&mut self, record: &mut ResultRecord) -> Result<ControlCode>;
}
