//! Runs spec files one at a time through the external runner

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use voucherkit_common::config::{CustomRunner, RunnerKind, SuiteConfig};

use crate::error::{E2eError, E2eResult};
use crate::process::kill_group;
use crate::report::{parse_report, FailureDetail, ReportStats};
use crate::suite::{Suite, SuiteEntry};
use crate::summary::SuiteSummary;

/// Reason recorded when runner output holds no usable report
pub const PARSE_FAILURE: &str = "Could not parse test results";

/// Placeholder replaced with the spec path in runner arguments
pub const SPEC_PLACEHOLDER: &str = "{spec}";

/// Program and argument template for one spec run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl RunnerCommand {
    /// `npx cypress run --spec <spec> --reporter json`
    pub fn cypress() -> Self {
        Self::npx(&["cypress", "run", "--spec", SPEC_PLACEHOLDER, "--reporter", "json"])
    }

    /// `npx playwright test <spec> --reporter=json`
    pub fn playwright() -> Self {
        Self::npx(&["playwright", "test", SPEC_PLACEHOLDER, "--reporter=json"])
    }

    pub fn custom(custom: &CustomRunner) -> Self {
        Self {
            program: custom.program.clone(),
            args: custom.args.clone(),
        }
    }

    pub fn for_kind(kind: &RunnerKind) -> Self {
        match kind {
            RunnerKind::Cypress => Self::cypress(),
            RunnerKind::Playwright => Self::playwright(),
        }
    }

    /// A custom runner wins over the runner kind
    pub fn from_config(config: &SuiteConfig) -> Self {
        match &config.custom {
            Some(custom) => Self::custom(custom),
            None => Self::for_kind(&config.runner),
        }
    }

    fn npx(args: &[&str]) -> Self {
        Self {
            program: "npx".to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Arguments with the spec path filled in
    pub fn args_for(&self, spec: &Path) -> Vec<String> {
        let spec = spec.to_string_lossy();
        self.args
            .iter()
            .map(|a| a.replace(SPEC_PLACEHOLDER, &spec))
            .collect()
    }

    /// Printable command line for logs
    pub fn display_for(&self, spec: &Path) -> String {
        std::iter::once(self.program.clone())
            .chain(self.args_for(spec))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// How a single spec file ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SpecOutcome {
    /// Report parsed and no test failed
    Passed { stats: ReportStats },

    /// Report parsed and at least one test failed
    Failed {
        stats: ReportStats,
        failures: Vec<FailureDetail>,
    },

    /// No usable report: spawn error, timeout or unparseable output
    Errored { reason: String },
}

/// Result of running one spec file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecResult {
    pub name: String,
    pub elapsed_ms: u64,
    #[serde(flatten)]
    pub outcome: SpecOutcome,
}

impl SpecResult {
    pub fn passed(&self) -> bool {
        matches!(self.outcome, SpecOutcome::Passed { .. })
    }
}

/// Decide the outcome from captured runner stdout
pub fn outcome_from_output(output: &str) -> SpecOutcome {
    match parse_report(output) {
        Ok(report) if report.stats.failures == 0 && report.failures.is_empty() => {
            SpecOutcome::Passed { stats: report.stats }
        }
        Ok(report) => SpecOutcome::Failed {
            stats: report.stats,
            failures: report.failures,
        },
        Err(e) => {
            debug!("Report parse failed: {}", e);
            SpecOutcome::Errored {
                reason: PARSE_FAILURE.to_string(),
            }
        }
    }
}

/// Sequential spec runner
pub struct SuiteRunner {
    command: RunnerCommand,
    timeout: Duration,
    working_dir: Option<PathBuf>,
    envs: Vec<(String, String)>,
}

impl SuiteRunner {
    pub fn new(command: RunnerCommand, timeout: Duration) -> Self {
        Self {
            command,
            timeout,
            working_dir: None,
            envs: Vec::new(),
        }
    }

    pub fn from_config(config: &SuiteConfig) -> Self {
        Self::new(
            RunnerCommand::from_config(config),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Run the runner from this directory instead of the current one
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Extra environment for every runner process
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Point the runner at `base_url` through `CYPRESS_BASE_URL` and `BASE_URL`
    pub fn with_base_url(self, base_url: &str) -> Self {
        self.with_env("CYPRESS_BASE_URL", base_url)
            .with_env("BASE_URL", base_url)
    }

    pub fn command(&self) -> &RunnerCommand {
        &self.command
    }

    /// Spawn the runner for one spec and collect stdout. stderr is discarded.
    async fn capture(&self, spec: &Path) -> E2eResult<String> {
        debug!("Running: {}", self.command.display_for(spec));

        let mut cmd = Command::new(&self.command.program);
        cmd.args(self.command.args_for(spec))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd.spawn().map_err(|source| E2eError::RunnerSpawn {
            program: self.command.program.clone(),
            source,
        })?;
        let mut stdout = child.stdout.take();

        let collected = timeout(self.timeout, async {
            let mut buf = Vec::new();
            if let Some(pipe) = stdout.as_mut() {
                pipe.read_to_end(&mut buf).await?;
            }
            let status = child.wait().await?;
            Ok::<_, std::io::Error>((status, buf))
        })
        .await;

        let (status, stdout) = match collected {
            Ok(result) => result?,
            Err(_) => {
                // The runner's own children share its process group
                if let Some(pid) = child.id() {
                    kill_group(pid);
                }
                let _ = child.kill().await;
                return Err(E2eError::RunnerTimeout(self.timeout.as_secs()));
            }
        };

        if !status.success() {
            debug!("Runner exited with {}", status);
        }
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }

    /// Run a single spec. Never fails; problems become `SpecOutcome::Errored`.
    pub async fn run_spec(&self, entry: &SuiteEntry) -> SpecResult {
        let start = Instant::now();

        let outcome = match self.capture(&entry.path).await {
            Ok(output) => outcome_from_output(&output),
            Err(e) => {
                warn!("{}: {}", entry.name, e);
                SpecOutcome::Errored {
                    reason: e.to_string(),
                }
            }
        };

        SpecResult {
            name: entry.name.clone(),
            elapsed_ms: start.elapsed().as_millis() as u64,
            outcome,
        }
    }

    /// Run every spec of the suite in order
    pub async fn run_suite(&self, suite: &Suite) -> E2eResult<SuiteSummary> {
        if suite.is_empty() {
            return Err(E2eError::NoSpecs(suite.dir().to_path_buf()));
        }

        let start = Instant::now();
        let total = suite.len();
        let mut results = Vec::with_capacity(total);

        info!("Running {} spec file(s) with {}", total, self.command.program);

        for (i, entry) in suite.entries().iter().enumerate() {
            info!("[{}/{}] Testing: {}", i + 1, total, entry.name);

            let result = self.run_spec(entry).await;
            match &result.outcome {
                SpecOutcome::Passed { stats } => {
                    info!(
                        "  ✅ Passed: {}, ❌ Failed: 0 ({} ms)",
                        stats.passes, result.elapsed_ms
                    );
                }
                SpecOutcome::Failed { stats, .. } => {
                    error!("  ✅ Passed: {}, ❌ Failed: {}", stats.passes, stats.failures);
                }
                SpecOutcome::Errored { reason } => {
                    error!("  ❌ Test execution failed: {}", reason);
                }
            }
            results.push(result);
        }

        let summary = SuiteSummary::from_results(results, start.elapsed().as_millis() as u64);
        info!(
            "Suite finished: {} passed, {} failed ({} ms)",
            summary.passed, summary.failed, summary.duration_ms
        );
        Ok(summary)
    }
}
