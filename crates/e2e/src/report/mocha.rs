//! mocha `json` reporter output, as written by `cypress run --reporter json`

use serde::Deserialize;
use serde_json::Value;

use super::{first_line, FailureDetail, ParsedReport, ReportStats};
use crate::error::E2eResult;

#[derive(Debug, Deserialize)]
struct MochaReport {
    stats: MochaStats,
    #[serde(default)]
    failures: Vec<MochaTest>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MochaStats {
    tests: u64,
    passes: u64,
    pending: u64,
    failures: u64,
    duration: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct MochaTest {
    #[serde(default)]
    title: String,
    #[serde(default, rename = "fullTitle")]
    full_title: Option<String>,
    #[serde(default)]
    err: MochaError,
}

#[derive(Debug, Default, Deserialize)]
struct MochaError {
    message: Option<String>,
}

pub(super) fn parse(value: Value) -> E2eResult<ParsedReport> {
    let report: MochaReport = serde_json::from_value(value)?;

    let failures = report
        .failures
        .iter()
        .map(|t| FailureDetail {
            title: if t.title.is_empty() {
                t.full_title.clone().unwrap_or_default()
            } else {
                t.title.clone()
            },
            error: first_line(t.err.message.as_deref()),
        })
        .collect();

    Ok(ParsedReport {
        stats: ReportStats {
            tests: report.stats.tests,
            passes: report.stats.passes,
            failures: report.stats.failures,
            pending: report.stats.pending,
            duration_ms: report.stats.duration.unwrap_or(0),
        },
        failures,
    })
}
