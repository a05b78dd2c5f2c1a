//! Step definition commands

use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::PathBuf;

use voucherkit_common::config::StepsConfig;
use voucherkit_steps::{
    fix_dir, plan_fixes, scan_dir, DuplicateGroup, FileFix, FixOptions, ScanReport,
};

use crate::commands::Context;
use crate::output::{
    print_json, print_list, print_success, print_warning, OutputFormat, TableDisplay,
};

#[derive(Subcommand)]
pub enum StepsCommands {
    /// Report duplicate step definitions
    Scan {
        #[command(flatten)]
        target: StepsTarget,

        /// Exit with status 1 when duplicates exist
        #[arg(long)]
        check: bool,
    },

    /// Comment out duplicate step definitions, keeping the first
    Fix {
        #[command(flatten)]
        target: StepsTarget,

        /// Show what would change without writing files
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Args)]
pub struct StepsTarget {
    /// Step definitions directory
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// File extension to scan (repeatable)
    #[arg(short, long = "ext")]
    pub extensions: Vec<String>,
}

impl StepsTarget {
    fn resolve(&self, config: &StepsConfig) -> (PathBuf, Vec<String>) {
        let dir = self.dir.clone().unwrap_or_else(|| config.dir.clone());
        let extensions = if self.extensions.is_empty() {
            config.extensions.clone()
        } else {
            self.extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_string())
                .collect()
        };
        (dir, extensions)
    }
}

impl TableDisplay for DuplicateGroup {
    fn headers() -> Vec<&'static str> {
        vec!["Step", "Kept", "Duplicates"]
    }

    fn row(&self) -> Vec<String> {
        let kept = self.kept();
        let redundant = self
            .redundant()
            .iter()
            .map(|o| format!("{}:{}", o.file, o.line))
            .collect::<Vec<_>>()
            .join("\n");
        vec![self.key.to_string(), format!("{}:{}", kept.file, kept.line), redundant]
    }
}

impl TableDisplay for FileFix {
    fn headers() -> Vec<&'static str> {
        vec!["File", "Commented out"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.file.clone(), self.commented.to_string()]
    }
}

/// Text listing of every duplicated key and its locations
pub fn render_duplicates(report: &ScanReport) -> String {
    if !report.has_duplicates() {
        return "No duplicate step definitions found.\n".to_string();
    }

    let mut out = String::from("Found duplicate step definitions:\n\n");
    for group in &report.duplicates {
        out.push_str(&format!("{}:\n", group.key));
        for occurrence in &group.occurrences {
            out.push_str(&format!("  - {}:{}\n", occurrence.file, occurrence.line));
        }
        out.push('\n');
    }
    out
}

fn print_report(report: &ScanReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", render_duplicates(report)),
        OutputFormat::Table => {
            print_list(&report.duplicates, "No duplicate step definitions found.")
        }
        OutputFormat::Json => print_json(report)?,
    }
    Ok(())
}

pub fn execute(cmd: StepsCommands, ctx: &Context) -> Result<i32> {
    match cmd {
        StepsCommands::Scan { target, check } => {
            let (dir, extensions) = target.resolve(&ctx.config.steps);
            let report = scan_dir(&dir, &extensions)?;
            print_report(&report, ctx.format)?;

            if ctx.format == OutputFormat::Text && report.has_duplicates() {
                let files = plan_fixes(&report).len();
                print_warning(&format!(
                    "{} definition(s) in {} file(s) would be commented out by `vkit steps fix`",
                    report.redundant_count(),
                    files
                ));
            }

            Ok(if check && report.has_duplicates() { 1 } else { 0 })
        }

        StepsCommands::Fix { target, dry_run } => {
            let (dir, extensions) = target.resolve(&ctx.config.steps);
            let outcome = fix_dir(&dir, &extensions, &FixOptions { dry_run })?;

            match ctx.format {
                OutputFormat::Json => print_json(&outcome)?,
                OutputFormat::Table => {
                    print_list(&outcome.report.duplicates, "No duplicate step definitions found.");
                    print_list(&outcome.files, "Nothing to fix.");
                }
                OutputFormat::Text => {
                    print!("{}", render_duplicates(&outcome.report));
                    let verb = if dry_run { "Would fix" } else { "Fixed" };
                    for file in &outcome.files {
                        println!(
                            "{} {}: commented out {} duplicate(s)",
                            verb, file.file, file.commented
                        );
                    }
                    if outcome.files.is_empty() {
                        println!("Nothing to fix.");
                    } else if dry_run {
                        print_warning("Dry run: no files were changed");
                    } else {
                        println!();
                        print_success("Duplicates fixed!");
                    }
                }
            }
            Ok(0)
        }
    }
}
