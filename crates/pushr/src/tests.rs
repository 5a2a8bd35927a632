use std::path::PathBuf;

use super::*;
use pretty_assertions::assert_eq;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_owned()).collect()
}

fn options(steps: i64) -> Options {
    Options {
        path: PathBuf::from("test.push"),
        steps,
        seed: Some(7),
        collect: false,
    }
}

#[test]
fn parses_all_options() {
    let parsed = parse_args(&args(&["--steps", "10", "prog.push", "--seed", "3", "--collect"])).unwrap();
    assert_eq!(
        parsed,
        Options {
            path: PathBuf::from("prog.push"),
            steps: 10,
            seed: Some(3),
            collect: true,
        }
    );
}

#[test]
fn defaults_to_unbounded_run() {
    let parsed = parse_args(&args(&["prog.push"])).unwrap();
    assert_eq!(parsed.steps, 0);
    assert_eq!(parsed.seed, None);
    assert!(!parsed.collect);
}

#[test]
fn rejects_bad_arguments() {
    assert!(matches!(parse_args(&args(&[])), Err(CliError::Usage(_))));
    assert!(matches!(parse_args(&args(&["a", "b"])), Err(CliError::Usage(_))));
    assert!(matches!(parse_args(&args(&["a", "--steps"])), Err(CliError::Usage(_))));
    assert!(matches!(parse_args(&args(&["a", "--steps", "x"])), Err(CliError::Usage(_))));
    assert!(matches!(parse_args(&args(&["a", "--seed", "-1"])), Err(CliError::Usage(_))));
    assert!(matches!(parse_args(&args(&["a", "--fast"])), Err(CliError::Usage(_))));
}

#[test]
fn runs_program_to_completion() {
    let report = run_source(
        &options(0),
        "(push-state (stacks (exec (2 3 INTEGER.+ INTEGER.DUP INTEGER.*))))",
    )
    .unwrap();
    assert_eq!(report.steps, 6);
    assert!(report.collected.is_none());
    assert!(report.state.contains("(integer 25)"));
    assert!(report.state.contains("(exec)"));
}

#[test]
fn step_budget_stops_early() {
    let report = run_source(&options(2), "(push-state (stacks (exec 1 2 3)))").unwrap();
    assert_eq!(report.steps, 2);
    assert!(report.state.contains("(exec 1)"));
    assert!(report.state.contains("(integer 3 2)"));
}

#[test]
fn collect_reports_stats() {
    let mut opts = options(0);
    opts.collect = true;
    let report = run_source(&opts, "(push-state (stacks (exec (1 2))))").unwrap();
    let stats = report.collected.unwrap();
    assert!(stats.freed >= 1);
}

#[test]
fn snapshot_errors_name_the_file() {
    let err = run_source(&options(0), "(push-state").unwrap_err();
    assert!(matches!(err, CliError::Snapshot { .. }));
    assert!(err.to_string().starts_with("test.push: parse error"));
}

#[test]
fn missing_file_is_a_read_error() {
    let mut opts = options(0);
    opts.path = PathBuf::from("/nonexistent/pushr/state.push");
    assert!(matches!(run_file(&opts), Err(CliError::Read { .. })));
}
