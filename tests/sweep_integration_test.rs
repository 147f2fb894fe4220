//! End-to-end sweep tests: space -> filters -> runner -> summary store.

use paramsweep::{
    BatchOrchestrator, ControlCode, ExperimentRunner, FileSummaryWriter, MemorySummaryWriter,
    ParameterSpace, ResultRecord, Settings, SweepState,
};
use serde_json::json;

// =============================================================================
// Shared fixtures
// =============================================================================

fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

fn xy_space() -> ParameterSpace {
    let mut space = ParameterSpace::new();
    space.add_dimension("x", vec![json!(1), json!(2)]).unwrap();
    space
        .add_dimension("y", vec![json!(10), json!(20)])
        .unwrap();
    space
}

struct SumRunner;

impl ExperimentRunner for SumRunner {
    fn initialize(&mut self, _: &ResultRecord, _: &Settings) -> paramsweep::Result<()> {
        Ok(())
    }

    fn execute(&mut self, record: &mut ResultRecord) -> paramsweep::Result<ControlCode> {
        let sum = record.get_i64("x")? + record.get_i64("y")?;
        record.put("sum", sum);
        Ok(ControlCode::Continue)
    }
}

// =============================================================================
// Scenarios from the orchestration contract
// =============================================================================

#[test]
fn test_full_sweep_sums_in_order() {
    init_tracing();
    let mut orchestrator = BatchOrchestrator::new(xy_space(), MemorySummaryWriter::new());
    let report = orchestrator.run(&mut SumRunner).unwrap();

    assert_eq!(report.state, SweepState::Completed);
    assert_eq!(report.counts.persisted, 4);

    let sums: Vec<i64> = orchestrator
        .writer()
        .records()
        .iter()
        .map(|r| r.get_i64("sum").unwrap())
        .collect();
    assert_eq!(sums, vec![11, 21, 12, 22]);
}

#[test]
fn test_filter_skips_x_equals_two() {
    let mut orchestrator = BatchOrchestrator::new(xy_space(), MemorySummaryWriter::new())
        .with_filter(|record: &mut ResultRecord| {
            if record.get_i64("x")? == 2 {
                return Ok(ControlCode::Skip);
            }
            Ok(ControlCode::Continue)
        });
    let report = orchestrator.run(&mut SumRunner).unwrap();

    assert_eq!(report.state, SweepState::Completed);
    assert_eq!(report.counts.persisted, 2);
    assert_eq!(report.counts.filtered_out, 2);
    for record in orchestrator.writer().records() {
        assert_eq!(record.get_i64("x").unwrap(), 1);
    }
}

#[test]
fn test_abort_on_third_invocation() {
    struct AbortOnThird {
        calls: usize,
    }
    impl ExperimentRunner for AbortOnThird {
        fn initialize(&mut self, _: &ResultRecord, _: &Settings) -> paramsweep::Result<()> {
            Ok(())
        }
        fn execute(&mut self, record: &mut ResultRecord) -> paramsweep::Result<ControlCode> {
            self.calls += 1;
            if self.calls == 3 {
                return Ok(ControlCode::Abort);
            }
            let sum = record.get_i64("x")? + record.get_i64("y")?;
            record.put("sum", sum);
            Ok(ControlCode::Continue)
        }
    }

    let mut orchestrator = BatchOrchestrator::new(xy_space(), MemorySummaryWriter::new());
    let report = orchestrator.run(&mut AbortOnThird { calls: 0 }).unwrap();

    assert_eq!(report.state, SweepState::Aborted);
    assert_eq!(report.counts.persisted, 2);
    assert_eq!(report.counts.processed, 3);
    assert_eq!(report.state.exit_code(), 2);
}

// =============================================================================
// Durable summary file
// =============================================================================

#[test]
fn test_sweep_writes_durable_summary_file() {
    let dir = tempfile::tempdir().unwrap();
    let summary_path = dir.path().join("summary.txt");

    let writer = FileSummaryWriter::create(&summary_path).unwrap();
    let mut orchestrator = BatchOrchestrator::new(xy_space(), writer);
    let report = orchestrator.run(&mut SumRunner).unwrap();

    assert_eq!(report.counts.persisted, 4);
    assert_eq!(orchestrator.writer().entries_written(), 4);

    let text = std::fs::read_to_string(&summary_path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 5, "header plus one line per accepted record");
    assert_eq!(lines[0], "index\tcreated_at\tsum\tx\ty");

    // Sweep order is preserved on disk.
    let sums: Vec<&str> = lines[1..]
        .iter()
        .map(|line| line.split('\t').nth(2).unwrap())
        .collect();
    assert_eq!(sums, vec!["11", "21", "12", "22"]);
}

#[test]
fn test_summary_entry_count_matches_accept_count() {
    let dir = tempfile::tempdir().unwrap();
    let summary_path = dir.path().join("summary.txt");

    struct SkipOddSums;
    impl ExperimentRunner for SkipOddSums {
        fn initialize(&mut self, _: &ResultRecord, _: &Settings) -> paramsweep::Result<()> {
            Ok(())
        }
        fn execute(&mut self, record: &mut ResultRecord) -> paramsweep::Result<ControlCode> {
            let sum = record.get_i64("x")? + record.get_i64("y")?;
            if sum % 2 == 1 {
                return Ok(ControlCode::Skip);
            }
            record.put("sum", sum);
            Ok(ControlCode::Continue)
        }
    }

    let writer = FileSummaryWriter::create(&summary_path).unwrap().with_header(false);
    let mut orchestrator = BatchOrchestrator::new(xy_space(), writer);
    let report = orchestrator.run(&mut SkipOddSums).unwrap();

    // Sums are 11, 21, 12, 22: two odd, two even.
    assert_eq!(report.counts.runner_skipped, 2);
    assert_eq!(report.counts.persisted, 2);

    let text = std::fs::read_to_string(&summary_path).unwrap();
    assert_eq!(text.lines().count(), 2);
}

// =============================================================================
// Resume after a halt
// =============================================================================

#[test]
fn test_resume_from_reported_index_covers_remaining_combinations() {
    struct AbortAt {
        at: usize,
    }
    impl ExperimentRunner for AbortAt {
        fn initialize(&mut self, _: &ResultRecord, _: &Settings) -> paramsweep::Result<()> {
            Ok(())
        }
        fn execute(&mut self, record: &mut ResultRecord) -> paramsweep::Result<ControlCode> {
            if record.index() == self.at {
                return Ok(ControlCode::Abort);
            }
            let sum = record.get_i64("x")? + record.get_i64("y")?;
            record.put("sum", sum);
            Ok(ControlCode::Continue)
        }
    }

    // First attempt halts at combination 2.
    let mut first = BatchOrchestrator::new(xy_space(), MemorySummaryWriter::new());
    let report = first.run(&mut AbortAt { at: 2 }).unwrap();
    assert_eq!(report.state, SweepState::Aborted);
    assert_eq!(report.last_index, Some(1));

    // Resume from the combination after the last processed one.
    let resume_at = report.last_index.unwrap() + 1;
    let mut second =
        BatchOrchestrator::new(xy_space(), MemorySummaryWriter::new()).with_start_index(resume_at);
    second.run(&mut SumRunner).unwrap();

    let all_sums: Vec<i64> = first
        .writer()
        .records()
        .iter()
        .chain(second.writer().records())
        .map(|r| r.get_i64("sum").unwrap())
        .collect();
    assert_eq!(all_sums, vec![11, 21, 12, 22]);
}

// =============================================================================
// Settings flow
// =============================================================================

#[test]
fn test_settings_from_json_drive_the_runner() {
    struct ScaledSum {
        scale: i64,
    }
    impl ExperimentRunner for ScaledSum {
        fn initialize(&mut self, _: &ResultRecord, settings: &Settings) -> paramsweep::Result<()> {
            self.scale = settings.get_i64("scale")?;
            Ok(())
        }
        fn execute(&mut self, record: &mut ResultRecord) -> paramsweep::Result<ControlCode> {
            let sum = record.get_i64("x")? + record.get_i64("y")?;
            record.put("scaled_sum", sum * self.scale);
            Ok(ControlCode::Continue)
        }
    }

    let settings = Settings::from_json_str(r#"{"scale": 100}"#).unwrap();
    let mut orchestrator =
        BatchOrchestrator::new(xy_space(), MemorySummaryWriter::new()).with_settings(settings);
    orchestrator.run(&mut ScaledSum { scale: 0 }).unwrap();

    let first = &orchestrator.writer().records()[0];
    assert_eq!(first.get_i64("scaled_sum").unwrap(), 1100);
}
