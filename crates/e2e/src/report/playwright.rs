//! Playwright `json` reporter output

use serde::Deserialize;
use serde_json::Value;
use tracing::trace;

use super::{first_line, FailureDetail, ParsedReport, ReportStats};
use crate::error::E2eResult;

#[derive(Debug, Deserialize)]
struct PlaywrightReport {
    #[serde(default)]
    suites: Vec<Suite>,
    stats: Stats,
    #[serde(default)]
    errors: Vec<TestError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Stats {
    expected: u64,
    unexpected: u64,
    flaky: u64,
    skipped: u64,
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct Suite {
    #[serde(default)]
    title: String,
    #[serde(default)]
    specs: Vec<Spec>,
    #[serde(default)]
    suites: Vec<Suite>,
}

#[derive(Debug, Deserialize)]
struct Spec {
    title: String,
    #[serde(default)]
    tests: Vec<Test>,
}

#[derive(Debug, Deserialize)]
struct Test {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    results: Vec<TestRun>,
}

#[derive(Debug, Deserialize)]
struct TestRun {
    #[serde(default)]
    error: Option<TestError>,
    #[serde(default)]
    errors: Vec<TestError>,
}

#[derive(Debug, Deserialize)]
struct TestError {
    #[serde(default)]
    message: Option<String>,
}

impl Test {
    fn failed(&self) -> bool {
        self.status.as_deref() == Some("unexpected")
    }

    /// Message of the last attempt, since retries end there
    fn last_message(&self) -> Option<&str> {
        let run = self.results.last()?;
        run.error
            .as_ref()
            .or_else(|| run.errors.first())
            .and_then(|e| e.message.as_deref())
    }
}

fn collect_failures(suite: &Suite, failures: &mut Vec<FailureDetail>) {
    for spec in &suite.specs {
        for test in spec.tests.iter().filter(|t| t.failed()) {
            failures.push(FailureDetail {
                title: spec.title.clone(),
                error: first_line(test.last_message()),
            });
        }
    }
    for child in &suite.suites {
        collect_failures(child, failures);
    }
}

pub(super) fn parse(value: Value) -> E2eResult<ParsedReport> {
    let report: PlaywrightReport = serde_json::from_value(value)?;

    let mut failures = Vec::new();
    for suite in &report.suites {
        trace!("Collecting failures from suite '{}'", suite.title);
        collect_failures(suite, &mut failures);
    }
    // Errors outside any test, e.g. a spec file that fails to load
    for error in &report.errors {
        failures.push(FailureDetail {
            title: "Test file error".to_string(),
            error: first_line(error.message.as_deref()),
        });
    }

    let stats = &report.stats;
    let failed = stats.unexpected.max(failures.len() as u64);
    Ok(ParsedReport {
        stats: ReportStats {
            tests: stats.expected + stats.unexpected + stats.flaky + stats.skipped,
            passes: stats.expected + stats.flaky,
            failures: failed,
            pending: stats.skipped,
            duration_ms: stats.duration.max(0.0) as u64,
        },
        failures,
    })
}
