//! Batch orchestrator - the sweep state machine
//!
//! Drives the loop: draw the next combination, seed a fresh record,
//! evaluate the filter chain, invoke the experiment runner, interpret
//! control codes, persist accepted records, and decide whether to
//! continue, skip, or abort.
//!
//! ## State machine
//!
//! ```text
//! READY ──start──> RUNNING ──┬──> COMPLETED   (space exhausted)
//!                            ├──> ABORTED     (Abort control code)
//!                            └──> FAILED      (uncaught stage error)
//! ```
//!
//! Terminal states are final. Execution is single-threaded and
//! synchronous: exactly one combination is in flight at any time, and an
//! accepted record is durably persisted before the next combination is
//! drawn.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::filter::{Filter, FilterChain};
use crate::record::ResultRecord;
use crate::runner::ExperimentRunner;
use crate::settings::Settings;
use crate::space::ParameterSpace;
use crate::summary::SummaryWriter;
use crate::{ControlCode, Error, Result};

/// Lifecycle state of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SweepState {
    /// Constructed, not yet started.
    Ready,
    /// Processing combinations.
    Running,
    /// All combinations drawn and handled.
    Completed,
    /// Stopped early by an `Abort` control code.
    Aborted,
    /// Stopped by an uncaught error in a stage.
    Failed,
}

impl SweepState {
    /// Whether the state is terminal (no further transitions).
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Aborted | Self::Failed)
    }

    /// Process exit code for CLI wrappers: 0 for `Completed`, 2 for
    /// `Aborted` (deliberate early stop), 1 otherwise.
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Completed => 0,
            Self::Aborted => 2,
            Self::Ready | Self::Running | Self::Failed => 1,
        }
    }
}

impl std::fmt::Display for SweepState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Ready => "ready",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Aborted => "aborted",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Per-sweep record counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepCounts {
    /// Combinations drawn from the space.
    pub processed: usize,
    /// Combinations rejected by the filter chain.
    pub filtered_out: usize,
    /// Combinations the runner discarded with `Skip`.
    pub runner_skipped: usize,
    /// Records durably appended to the summary store.
    pub persisted: usize,
}

/// Outcome summary of one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Terminal state of the sweep.
    pub state: SweepState,
    /// Record counters.
    pub counts: SweepCounts,
    /// Index of the last combination handled end to end, if any. A
    /// resume can start from `last_index + 1` thanks to deterministic
    /// enumeration order.
    pub last_index: Option<usize>,
}

#[derive(Debug)]
struct CheckpointPolicy {
    dir: PathBuf,
    interval: usize,
}

/// Drives a sweep over a [`ParameterSpace`] end to end.
///
/// # Example
///
/// ```rust
/// use paramsweep::{
///     BatchOrchestrator, ControlCode, ExperimentRunner, MemorySummaryWriter,
///     ParameterSpace, ResultRecord, Settings, SweepState,
/// };
/// use serde_json::json;
///
/// struct SumRunner;
///
/// impl ExperimentRunner for SumRunner {
///     fn initialize(&mut self, _: &ResultRecord, _: &Settings) -> paramsweep::Result<()> {
///         Ok(())
///     }
///     fn execute(&mut self, record: &mut ResultRecord) -> paramsweep::Result<ControlCode> {
///         let sum = record.get_i64("x")? + record.get_i64("y")?;
///         record.put("sum", sum);
///         Ok(ControlCode::Continue)
///     }
/// }
///
/// let mut space = ParameterSpace::new();
/// space.add_dimension("x", vec![json!(1), json!(2)])?;
/// space.add_dimension("y", vec![json!(10), json!(20)])?;
///
/// let mut orchestrator = BatchOrchestrator::new(space, MemorySummaryWriter::new());
/// let report = orchestrator.run(&mut SumRunner)?;
///
/// assert_eq!(report.state, SweepState::Completed);
/// assert_eq!(report.counts.persisted, 4);
/// # Ok::<(), paramsweep::Error>(())
/// ```
#[derive(Debug)]
pub struct BatchOrchestrator<W: SummaryWriter> {
    space: ParameterSpace,
    filters: FilterChain,
    writer: W,
    settings: Settings,
    state: SweepState,
    counts: SweepCounts,
    last_index: Option<usize>,
    start_index: usize,
    checkpoint: Option<CheckpointPolicy>,
}

impl<W: SummaryWriter> BatchOrchestrator<W> {
    /// Create an orchestrator in the `Ready` state.
    #[must_use]
    pub fn new(space: ParameterSpace, writer: W) -> Self {
        Self {
            space,
            filters: FilterChain::new(),
            writer,
            settings: Settings::new(),
            state: SweepState::Ready,
            counts: SweepCounts::default(),
            last_index: None,
            start_index: 0,
            checkpoint: None,
        }
    }

    /// Supply the settings map passed to
    /// [`ExperimentRunner::initialize`].
    #[must_use]
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Append a filter to the chain (addition order is evaluation order).
    #[must_use]
    pub fn with_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.add_filter(filter);
        self
    }

    /// Start the sweep at combination `index` instead of 0. Combinations
    /// before it are neither drawn nor counted. This is the resume hook:
    /// enumeration order is deterministic, so restarting at
    /// `last_index + 1` of a halted sweep continues where it left off.
    #[must_use]
    pub fn with_start_index(mut self, index: usize) -> Self {
        self.start_index = index;
        self
    }

    /// Snapshot every `interval`-th persisted record as JSON into `dir`.
    /// Checkpoints are a convenience for later inspection; a checkpoint
    /// write failure is logged but does not halt the sweep.
    #[must_use]
    pub fn with_checkpoints(mut self, dir: impl Into<PathBuf>, interval: usize) -> Self {
        self.checkpoint = Some(CheckpointPolicy {
            dir: dir.into(),
            interval: interval.max(1),
        });
        self
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> SweepState {
        self.state
    }

    /// Record counters accumulated so far.
    #[must_use]
    pub const fn counts(&self) -> SweepCounts {
        self.counts
    }

    /// Index of the last combination handled end to end.
    #[must_use]
    pub const fn last_index(&self) -> Option<usize> {
        self.last_index
    }

    /// Borrow the summary writer.
    #[must_use]
    pub const fn writer(&self) -> &W {
        &self.writer
    }

    /// Consume the orchestrator and return the summary writer.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Outcome summary for the sweep so far.
    #[must_use]
    pub const fn report(&self) -> SweepReport {
        SweepReport {
            state: self.state,
            counts: self.counts,
            last_index: self.last_index,
        }
    }

    /// Run the sweep to a terminal state.
    ///
    /// Calls `runner.initialize` exactly once, then processes one
    /// combination at a time: fresh record, filter chain, runner,
    /// durable summary append. `Skip` discards the current record and
    /// moves on; `Abort` discards it and terminates the sweep.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the orchestrator is not
    /// `Ready` or the space is empty, [`Error::Execution`] if a stage
    /// faults (terminal state `Failed`), and [`Error::Persistence`] if
    /// a summary append fails (also `Failed`). A sweep that ends in
    /// `Completed` or `Aborted` returns `Ok` with its report.
    pub fn run(&mut self, runner: &mut dyn ExperimentRunner) -> Result<SweepReport> {
        if self.state != SweepState::Ready {
            return Err(Error::Configuration(format!(
                "sweep cannot start from state '{}'",
                self.state
            )));
        }
        // Malformed configuration fails before any execution.
        if let Err(e) = self.space.combinations() {
            self.state = SweepState::Failed;
            return Err(e);
        }
        if let Some(policy) = &self.checkpoint {
            if let Err(e) = fs::create_dir_all(&policy.dir) {
                self.state = SweepState::Failed;
                return Err(e.into());
            }
        }

        let total = self.space.total_combinations();
        self.state = SweepState::Running;
        info!(total, start_index = self.start_index, "sweep started");

        let template = ResultRecord::new(self.start_index);
        if let Err(e) = runner.initialize(&template, &self.settings) {
            error!(error = %e, "runner initialization failed");
            self.state = SweepState::Failed;
            return Err(Error::Execution {
                stage: "initialize",
                index: self.start_index,
                message: e.to_string(),
            });
        }

        let mut aborted = false;
        for index in self.start_index..total {
            let Some(combination) = self.space.combination_at(index) else {
                break;
            };
            self.counts.processed += 1;
            let mut record = ResultRecord::from_combination(index, &combination);

            match self.filters.evaluate(&mut record) {
                Ok(ControlCode::Continue) => {}
                Ok(ControlCode::Skip) => {
                    debug!(index, "combination rejected by filter chain");
                    self.counts.filtered_out += 1;
                    self.last_index = Some(index);
                    continue;
                }
                Ok(ControlCode::Abort) => {
                    warn!(index, %combination, "filter chain aborted the sweep");
                    aborted = true;
                    break;
                }
                Err(e) => {
                    error!(index, %combination, error = %e, "filter chain failed");
                    self.state = SweepState::Failed;
                    return Err(Error::Execution {
                        stage: "filter",
                        index,
                        message: e.to_string(),
                    });
                }
            }

            match runner.execute(&mut record) {
                Ok(ControlCode::Continue) => {
                    if let Err(e) = self.writer.append(&record) {
                        error!(index, error = %e, "summary append failed");
                        self.state = SweepState::Failed;
                        return Err(e);
                    }
                    self.counts.persisted += 1;
                    debug!(index, "record persisted");
                    self.maybe_checkpoint(&record);
                }
                Ok(ControlCode::Skip) => {
                    debug!(index, "runner discarded the record");
                    self.counts.runner_skipped += 1;
                }
                Ok(ControlCode::Abort) => {
                    warn!(index, %combination, "runner aborted the sweep");
                    aborted = true;
                    break;
                }
                Err(e) => {
                    error!(index, %combination, error = %e, "runner failed");
                    self.state = SweepState::Failed;
                    return Err(Error::Execution {
                        stage: "execute",
                        index,
                        message: e.to_string(),
                    });
                }
            }

            self.last_index = Some(index);
        }

        self.state = if aborted {
            SweepState::Aborted
        } else {
            SweepState::Completed
        };
        info!(
            state = %self.state,
            processed = self.counts.processed,
            filtered_out = self.counts.filtered_out,
            runner_skipped = self.counts.runner_skipped,
            persisted = self.counts.persisted,
            "sweep finished"
        );
        Ok(self.report())
    }

    fn maybe_checkpoint(&self, record: &ResultRecord) {
        let Some(policy) = &self.checkpoint else {
            return;
        };
        if self.counts.persisted % policy.interval != 0 {
            return;
        }
        if let Err(e) = record.save_to_file(&policy.dir) {
            warn!(index = record.index(), error = %e, "checkpoint write failed");
        }
    }
}
