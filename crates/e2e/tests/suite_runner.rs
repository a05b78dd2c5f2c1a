//! Suite runner tests against a fake runner script
//!
//! The script stands in for `npx cypress run` and prints canned mocha JSON
//! depending on the spec name it is given.

#![cfg(unix)]

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use tempfile::TempDir;
use voucherkit_e2e::runner::PARSE_FAILURE;
use voucherkit_e2e::{RunnerCommand, SpecOutcome, Suite, SuiteRunner};

const FAKE_RUNNER: &str = r#"#!/bin/sh
case "$1" in
  *passing*)
    echo "Opening Cypress..."
    printf '%s\n' '{"stats":{"suites":1,"tests":2,"passes":2,"pending":0,"failures":0,"duration":120},"failures":[]}'
    ;;
  *failing*)
    printf '%s\n' '{"stats":{"tests":2,"passes":1,"pending":0,"failures":1,"duration":300},"failures":[{"title":"Client reserves a class","err":{"message":"Expected to find content: Reservation confirmed\n    at Context.eval"}}]}'
    exit 1
    ;;
  *slow*)
    sleep 5
    ;;
  *orphan*)
    sleep 30 &
    echo $! > "$CHILD_PID_FILE"
    wait
    ;;
  *base-url*)
    if [ "$CYPRESS_BASE_URL" = "http://app.test:4000" ]; then
      printf '%s\n' '{"stats":{"tests":1,"passes":1,"pending":0,"failures":0,"duration":10},"failures":[]}'
    fi
    ;;
  *)
    echo "Cannot find module 'cypress'" >&2
    echo "not a report"
    ;;
esac
"#;

fn fixture(specs: &[&str]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("fake-runner.sh"), FAKE_RUNNER).unwrap();
    let features = tmp.path().join("features");
    fs::create_dir(&features).unwrap();
    for spec in specs {
        fs::write(features.join(spec), "Feature: fixture\n").unwrap();
    }
    tmp
}

fn runner(root: &Path, timeout: Duration) -> SuiteRunner {
    let command = RunnerCommand {
        program: "sh".to_string(),
        args: vec![
            root.join("fake-runner.sh").to_string_lossy().to_string(),
            "{spec}".to_string(),
        ],
    };
    SuiteRunner::new(command, timeout)
}

#[tokio::test]
async fn mixed_suite_summary() {
    let tmp = fixture(&["a-passing.feature", "b-failing.feature", "c-broken.feature"]);
    let suite = Suite::discover(&tmp.path().join("features"), "feature").unwrap();

    let summary = runner(tmp.path(), Duration::from_secs(30))
        .run_suite(&suite)
        .await
        .unwrap();

    assert_eq!(summary.total, 3);
    assert_eq!(summary.passed, 1);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.exit_code(), 1);

    match &summary.results[0].outcome {
        SpecOutcome::Passed { stats } => assert_eq!(stats.passes, 2),
        other => panic!("expected pass, got {:?}", other),
    }
    match &summary.results[1].outcome {
        SpecOutcome::Failed { stats, failures } => {
            assert_eq!(stats.failures, 1);
            assert_eq!(failures[0].title, "Client reserves a class");
            assert_eq!(failures[0].error, "Expected to find content: Reservation confirmed");
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(
        summary.results[2].outcome,
        SpecOutcome::Errored {
            reason: PARSE_FAILURE.to_string()
        }
    );

    let text = summary.render_text();
    assert!(text.contains("✅ PASSED (1/3):\n  - a-passing.feature"));
    assert!(text.contains("Total: 1 passed, 2 failed"));
}

#[tokio::test]
async fn all_passing_suite_exits_zero() {
    let tmp = fixture(&["login-passing.feature", "settings-passing.feature"]);
    let suite = Suite::discover(&tmp.path().join("features"), "feature").unwrap();

    let summary = runner(tmp.path(), Duration::from_secs(30))
        .run_suite(&suite)
        .await
        .unwrap();
    assert!(summary.all_passed());
    assert_eq!(summary.exit_code(), 0);
}

#[tokio::test]
async fn timed_out_spec_is_errored() {
    let tmp = fixture(&["slow.feature"]);
    let suite = Suite::discover(&tmp.path().join("features"), "feature").unwrap();

    let summary = runner(tmp.path(), Duration::from_secs(1))
        .run_suite(&suite)
        .await
        .unwrap();
    match &summary.results[0].outcome {
        SpecOutcome::Errored { reason } => assert!(reason.contains("timed out"), "{}", reason),
        other => panic!("expected errored, got {:?}", other),
    }
}

#[tokio::test]
async fn missing_runner_program_is_errored() {
    let tmp = fixture(&["login.feature"]);
    let suite = Suite::discover(&tmp.path().join("features"), "feature").unwrap();
    let command = RunnerCommand {
        program: tmp.path().join("no-such-runner").to_string_lossy().to_string(),
        args: vec!["{spec}".to_string()],
    };

    let summary = SuiteRunner::new(command, Duration::from_secs(5))
        .run_suite(&suite)
        .await
        .unwrap();
    match &summary.results[0].outcome {
        SpecOutcome::Errored { reason } => {
            assert!(reason.starts_with("Failed to spawn"), "{}", reason)
        }
        other => panic!("expected errored, got {:?}", other),
    }
    assert_eq!(summary.exit_code(), 1);
}

#[tokio::test]
async fn fixed_list_with_missing_file_still_runs_others() {
    let tmp = fixture(&["a-passing.feature"]);
    let features = tmp.path().join("features");
    let suite = Suite::from_list(
        &features,
        &["a-passing.feature".to_string(), "gone.feature".to_string()],
    );

    let summary = runner(tmp.path(), Duration::from_secs(30))
        .run_suite(&suite)
        .await
        .unwrap();
    assert_eq!(summary.passed, 1);
    assert_eq!(summary.failed, 1);
}

#[tokio::test]
async fn empty_suite_is_an_error() {
    let tmp = fixture(&[]);
    let suite = Suite::discover(&tmp.path().join("features"), "feature").unwrap();
    let result = runner(tmp.path(), Duration::from_secs(5)).run_suite(&suite).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn base_url_reaches_the_runner() {
    let tmp = fixture(&["base-url.feature"]);
    let suite = Suite::discover(&tmp.path().join("features"), "feature").unwrap();

    let summary = runner(tmp.path(), Duration::from_secs(30))
        .with_base_url("http://app.test:4000")
        .run_suite(&suite)
        .await
        .unwrap();
    assert!(summary.all_passed());

    let without = runner(tmp.path(), Duration::from_secs(30))
        .run_suite(&suite)
        .await
        .unwrap();
    assert_eq!(without.failed, 1);
}

/// Alive and not a zombie waiting for a parent that never reaps it
fn is_running(pid: nix::unistd::Pid) -> bool {
    if nix::sys::signal::kill(pid, None).is_err() {
        return false;
    }
    match fs::read_to_string(format!("/proc/{}/stat", pid)) {
        Ok(stat) => !stat
            .rsplit_once(')')
            .is_some_and(|(_, rest)| rest.trim_start().starts_with('Z')),
        Err(_) => true,
    }
}

#[tokio::test]
async fn timeout_kills_the_runners_children() {
    let tmp = fixture(&["orphan.feature"]);
    let suite = Suite::discover(&tmp.path().join("features"), "feature").unwrap();
    let pid_file = tmp.path().join("child.pid");

    let summary = runner(tmp.path(), Duration::from_secs(1))
        .with_env("CHILD_PID_FILE", pid_file.to_string_lossy())
        .run_suite(&suite)
        .await
        .unwrap();
    assert!(matches!(summary.results[0].outcome, SpecOutcome::Errored { .. }));

    let pid: i32 = fs::read_to_string(&pid_file).unwrap().trim().parse().unwrap();
    let pid = nix::unistd::Pid::from_raw(pid);

    // The orphaned sleep is reparented and reaped asynchronously
    let deadline = Instant::now() + Duration::from_secs(5);
    while is_running(pid) {
        assert!(Instant::now() < deadline, "runner child {} survived the timeout", pid);
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}
