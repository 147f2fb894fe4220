//! # Paramsweep: Batch Experiment Orchestrator
//!
//! Paramsweep enumerates every combination of a multi-dimensional
//! parameter space, optionally discards unwanted combinations through a
//! filter chain, invokes user-supplied experiment logic on each surviving
//! combination, and incrementally persists results so a long-running
//! sweep survives partial failure.
//!
//! ## Design Principles
//!
//! - **Deterministic enumeration**: combinations come out in mixed-radix
//!   odometer order (last-registered dimension varies fastest), so a
//!   sweep is reproducible and resumable from a known index.
//! - **Arena-per-iteration**: a fresh [`ResultRecord`] is built for every
//!   combination and dropped after persistence; no state leaks across
//!   iterations and memory stays bounded over arbitrarily long sweeps.
//! - **Flush-before-advance**: an accepted record is durably appended to
//!   the summary store before the next combination is drawn; a crash
//!   loses at most the one in-flight iteration.
//!
//! ## Example Usage
//!
//! ```rust
//! use paramsweep::{
//!     BatchOrchestrator, ControlCode, ExperimentRunner, MemorySummaryWriter,
//!     ParameterSpace, ResultRecord, Settings, SweepState,
//! };
//! use serde_json::json;
//!
//! struct Throughput;
//!
//! impl ExperimentRunner for Throughput {
//!     fn initialize(&mut self, _: &ResultRecord, _: &Settings) -> paramsweep::Result<()> {
//!         Ok(())
//!     }
//!     fn execute(&mut self, record: &mut ResultRecord) -> paramsweep::Result<ControlCode> {
//!         let batch = record.get_i64("batch_size")?;
//!         let workers = record.get_i64("workers")?;
//!         record.put("throughput", batch * workers);
//!         Ok(ControlCode::Continue)
//!     }
//! }
//!
//! let mut space = ParameterSpace::new();
//! space.add_dimension("batch_size", vec![json!(16), json!(32)])?;
//! space.add_dimension("workers", vec![json!(1), json!(2), json!(4)])?;
//!
//! let mut orchestrator = BatchOrchestrator::new(space, MemorySummaryWriter::new())
//!     .with_filter(|record: &mut ResultRecord| {
//!         // A 16-element batch never needs 4 workers.
//!         if record.get_i64("batch_size")? == 16 && record.get_i64("workers")? == 4 {
//!             return Ok(ControlCode::Skip);
//!         }
//!         Ok(ControlCode::Continue)
//!     });
//!
//! let report = orchestrator.run(&mut Throughput)?;
//! assert_eq!(report.state, SweepState::Completed);
//! assert_eq!(report.counts.persisted, 5);
//! # Ok::<(), paramsweep::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

#[cfg(feature = "compression")]
pub mod archive;
mod coerce;
pub mod error;
pub mod filter;
pub mod orchestrator;
pub mod record;
pub mod runner;
pub mod settings;
pub mod space;
pub mod summary;

pub use error::{Error, Result};
pub use filter::{Filter, FilterChain};
pub use orchestrator::{BatchOrchestrator, SweepCounts, SweepReport, SweepState};
pub use record::ResultRecord;
pub use runner::ExperimentRunner;
pub use settings::Settings;
pub use space::{Combination, Combinations, ParameterDimension, ParameterSpace};
pub use summary::{FileSummaryWriter, MemorySummaryWriter, SummaryWriter};

/// Tri-state control signal steering the sweep.
///
/// Filters and runners communicate with the orchestrator exclusively
/// through this code (plus mutation of the record they are handed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCode {
    /// Proceed: the combination (or record) is good.
    Continue,
    /// Discard this record and continue with the next combination.
    Skip,
    /// Discard this record and terminate the entire sweep.
    Abort,
}
