//! Suite summary and its text rendering

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::E2eResult;
use crate::runner::{SpecOutcome, SpecResult};

pub const SUMMARY_FILE: &str = "suite-summary.json";

const RULE_WIDTH: usize = 80;

/// Result of running all specs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteSummary {
    pub total: usize,
    pub passed: usize,
    /// Failed plus errored specs
    pub failed: usize,
    pub duration_ms: u64,
    pub results: Vec<SpecResult>,
}

impl SuiteSummary {
    pub fn from_results(results: Vec<SpecResult>, duration_ms: u64) -> Self {
        let passed = results.iter().filter(|r| r.passed()).count();
        Self {
            total: results.len(),
            passed,
            failed: results.len() - passed,
            duration_ms,
            results,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// 0 when every spec passed, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        if self.all_passed() {
            0
        } else {
            1
        }
    }

    pub fn passed_specs(&self) -> impl Iterator<Item = &SpecResult> {
        self.results.iter().filter(|r| r.passed())
    }

    pub fn failed_specs(&self) -> impl Iterator<Item = &SpecResult> {
        self.results.iter().filter(|r| !r.passed())
    }

    /// Human-readable report
    pub fn render_text(&self) -> String {
        let rule = "=".repeat(RULE_WIDTH);
        let mut out = String::new();

        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "📊 TEST SUMMARY");
        let _ = writeln!(out, "{rule}");

        let _ = writeln!(out, "\n✅ PASSED ({}/{}):", self.passed, self.total);
        for result in self.passed_specs() {
            let _ = writeln!(out, "  - {}", result.name);
        }

        let _ = writeln!(out, "\n❌ FAILED ({}/{}):", self.failed, self.total);
        for result in self.failed_specs() {
            let _ = writeln!(out, "\n  📁 {}:", result.name);
            match &result.outcome {
                SpecOutcome::Failed { failures, .. } => {
                    for failure in failures {
                        let _ = writeln!(out, "    - {}", failure.title);
                        let _ = writeln!(out, "      Error: {}", failure.error);
                    }
                }
                SpecOutcome::Errored { reason } => {
                    let _ = writeln!(out, "    - Test execution failed");
                    let _ = writeln!(out, "      Error: {}", reason);
                }
                SpecOutcome::Passed { .. } => {}
            }
        }

        let _ = writeln!(out, "\n{rule}");
        let _ = writeln!(out, "Total: {} passed, {} failed", self.passed, self.failed);
        out
    }

    /// Write the summary as pretty JSON into `dir`
    pub fn write_json(&self, dir: &Path) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(dir)?;

        let path = dir.join(SUMMARY_FILE);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;

        info!("Summary written to: {}", path.display());
        Ok(path)
    }
}
