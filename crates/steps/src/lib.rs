//! Duplicate Cucumber step-definition scanner
//!
//! Scans a directory of step definition files for `Given` / `When` / `Then`
//! definitions that share a pattern, and comments out every definition after
//! the first one.
//!
//! Files are visited in file-name order, so the kept definition is the one in
//! the alphabetically first file (or the earliest one within a file). The end
//! of a definition body is found by brace counting, which can be thrown off
//! by braces inside string literals.

pub mod fix;
pub mod scan;

pub use fix::{apply_fixes, fix_dir, plan_fixes, FileFix, Fix, FixOptions, FixOutcome};
pub use scan::{
    scan_dir, scan_source, DuplicateGroup, Occurrence, ScanReport, StepKey, StepKeyword,
};
