//! Suite execution command

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use tracing::{info, warn};

use voucherkit_common::RunnerKind;
use voucherkit_e2e::server::AppServer;
use voucherkit_e2e::{SpecOutcome, SpecResult, Suite, SuiteRunner};

use crate::commands::Context;
use crate::output::{print_json, print_list, OutputFormat, TableDisplay};

#[derive(Args)]
pub struct RunArgs {
    /// External runner (cypress or playwright)
    #[arg(long)]
    pub runner: Option<RunnerKind>,

    /// Directory holding the spec files
    #[arg(long)]
    pub features: Option<PathBuf>,

    /// Run only these spec files (repeatable)
    #[arg(long = "spec")]
    pub specs: Vec<String>,

    /// Run only specs whose name contains this text
    #[arg(long)]
    pub filter: Option<String>,

    /// Per-spec timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Base URL of the app under test
    #[arg(long)]
    pub base_url: Option<String>,

    /// Reuse or start the app and wait until it answers before running
    #[arg(long)]
    pub wait_for_app: bool,

    /// Directory for suite-summary.json
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl TableDisplay for SpecResult {
    fn headers() -> Vec<&'static str> {
        vec!["Spec", "Result", "Passed", "Failed", "Time (ms)"]
    }

    fn row(&self) -> Vec<String> {
        let (result, passes, failures) = match &self.outcome {
            SpecOutcome::Passed { stats } => {
                ("✅ passed", stats.passes.to_string(), stats.failures.to_string())
            }
            SpecOutcome::Failed { stats, .. } => {
                ("❌ failed", stats.passes.to_string(), stats.failures.to_string())
            }
            SpecOutcome::Errored { .. } => ("💥 errored", "-".to_string(), "-".to_string()),
        };
        vec![
            self.name.clone(),
            result.to_string(),
            passes,
            failures,
            self.elapsed_ms.to_string(),
        ]
    }
}

/// Run the suite and return the process exit code
pub async fn execute(args: RunArgs, ctx: &Context) -> Result<i32> {
    let mut config = ctx.config.clone();
    if let Some(runner) = args.runner {
        config.suite.runner = runner;
        config.suite.custom = None;
    }
    if let Some(features) = args.features {
        config.suite.features_dir = features;
        config.suite.specs.clear();
    }
    if let Some(timeout) = args.timeout {
        config.suite.timeout_secs = timeout;
    }
    if let Some(output) = args.output {
        config.suite.output_dir = output;
    }
    if let Some(base_url) = &args.base_url {
        config.app.base_url = base_url.clone();
    }

    let mut suite = Suite::from_config(&config.suite)?;
    if !args.specs.is_empty() {
        suite = suite.only(&args.specs)?;
    }
    if let Some(pattern) = &args.filter {
        suite = suite.filter(pattern);
    }

    // Held until the suite is done; a spawned app is stopped on drop
    let _app = if args.wait_for_app {
        Some(AppServer::ensure(&config.app).await?)
    } else {
        None
    };

    let mut runner = SuiteRunner::from_config(&config.suite);
    if args.wait_for_app || args.base_url.is_some() {
        runner = runner.with_base_url(&config.app.base_url);
    }

    let summary = runner.run_suite(&suite).await?;

    match summary.write_json(&config.suite.output_dir) {
        Ok(path) => info!("Detailed results: {}", path.display()),
        Err(e) => warn!("Could not write summary: {}", e),
    }

    match ctx.format {
        OutputFormat::Text => print!("\n{}", summary.render_text()),
        OutputFormat::Table => {
            print_list(&summary.results, "No specs were run.");
            println!("Total: {} passed, {} failed", summary.passed, summary.failed);
        }
        OutputFormat::Json => print_json(&summary)?,
    }

    Ok(summary.exit_code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use voucherkit_e2e::report::ReportStats;

    #[test]
    fn test_spec_result_row() {
        let result = SpecResult {
            name: "login.feature".to_string(),
            elapsed_ms: 900,
            outcome: SpecOutcome::Passed {
                stats: ReportStats {
                    tests: 4,
                    passes: 4,
                    ..Default::default()
                },
            },
        };
        assert_eq!(
            result.row(),
            vec!["login.feature", "✅ passed", "4", "0", "900"]
        );

        let errored = SpecResult {
            name: "settings.feature".to_string(),
            elapsed_ms: 5,
            outcome: SpecOutcome::Errored {
                reason: "Runner timed out after 600s".to_string(),
            },
        };
        assert_eq!(errored.row()[1], "💥 errored");
        assert_eq!(errored.row()[2], "-");
    }
}
