//! Commenting out duplicate step definitions

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

use voucherkit_common::Result;

use crate::scan::{read_step_file, scan_dir, ScanReport};

/// One redundant definition to comment out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fix {
    pub file: String,

    /// 1-based line of the definition
    pub line: usize,

    /// Display form of the duplicated key
    pub key: String,

    /// File holding the definition that stays active
    pub keep_file: String,
}

/// Per-file result of a fix run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFix {
    pub file: String,
    pub commented: usize,
}

/// Options for `fix_dir`
#[derive(Debug, Clone, Default)]
pub struct FixOptions {
    /// Report what would change without writing files
    pub dry_run: bool,
}

/// Result of a fix run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixOutcome {
    pub report: ScanReport,
    pub files: Vec<FileFix>,
    pub dry_run: bool,
}

impl FixOutcome {
    pub fn total_commented(&self) -> usize {
        self.files.iter().map(|f| f.commented).sum()
    }
}

/// Marker written in place of a removed definition's first line
pub fn duplicate_marker(keep_file: &str) -> String {
    format!("// Duplicate - already defined in {}", keep_file)
}

/// Every occurrence after the first becomes a fix, grouped by file
pub fn plan_fixes(report: &ScanReport) -> BTreeMap<String, Vec<Fix>> {
    let mut plan: BTreeMap<String, Vec<Fix>> = BTreeMap::new();

    for group in &report.duplicates {
        let keep_file = &group.kept().file;
        for occurrence in group.redundant() {
            plan.entry(occurrence.file.clone()).or_default().push(Fix {
                file: occurrence.file.clone(),
                line: occurrence.line,
                key: group.key.to_string(),
                keep_file: keep_file.clone(),
            });
        }
    }

    plan
}

/// Index of the last line of the definition starting at `start`.
///
/// Counting begins at the first line containing `=>`. The block ends on the
/// first line where the brace balance is back to zero and `);` appears.
/// Braces inside string literals are counted too. Falls back to `start`.
pub fn definition_end(lines: &[&str], start: usize) -> usize {
    let mut depth: i64 = 0;
    let mut in_definition = false;

    for (i, line) in lines.iter().enumerate().skip(start) {
        if line.contains("=>") {
            in_definition = true;
        }
        if in_definition {
            depth += line.matches('{').count() as i64;
            depth -= line.matches('}').count() as i64;

            if depth == 0 && line.contains(");") {
                return i;
            }
        }
    }

    start
}

/// Apply fixes to one file's content
pub fn apply_fixes(content: &str, fixes: &[Fix]) -> String {
    let mut lines: Vec<String> = content.split('\n').map(str::to_string).collect();

    // Bottom-up so earlier line numbers stay valid
    let mut ordered: Vec<&Fix> = fixes.iter().collect();
    ordered.sort_by(|a, b| b.line.cmp(&a.line));

    for fix in ordered {
        let start = fix.line.saturating_sub(1);
        if start >= lines.len() {
            continue;
        }

        let end = {
            let view: Vec<&str> = lines.iter().map(String::as_str).collect();
            definition_end(&view, start)
        };
        debug!("{}: commenting out lines {}-{} ({})", fix.file, start + 1, end + 1, fix.key);

        lines[start] = duplicate_marker(&fix.keep_file);
        for line in lines.iter_mut().take(end + 1).skip(start + 1) {
            *line = format!("// {}", line);
        }
    }

    lines.join("\n")
}

/// Scan `dir` and comment out every redundant definition
pub fn fix_dir(dir: &Path, extensions: &[String], options: &FixOptions) -> Result<FixOutcome> {
    let report = scan_dir(dir, extensions)?;
    let plan = plan_fixes(&report);
    let mut files = Vec::new();

    for (file, fixes) in &plan {
        let path = dir.join(file);
        if !options.dry_run {
            let content = read_step_file(&path)?;
            std::fs::write(&path, apply_fixes(&content, fixes))?;
            info!("Fixed {}: commented out {} duplicate(s)", file, fixes.len());
        } else {
            info!("Would fix {}: {} duplicate(s)", file, fixes.len());
        }
        files.push(FileFix {
            file: file.clone(),
            commented: fixes.len(),
        });
    }

    Ok(FixOutcome {
        report,
        files,
        dry_run: options.dry_run,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix_at(line: usize, keep_file: &str) -> Fix {
        Fix {
            file: "b.ts".to_string(),
            line,
            key: "Given('x'".to_string(),
            keep_file: keep_file.to_string(),
        }
    }

    #[test]
    fn test_definition_end_multiline() {
        let lines = vec![
            "Given('x', () => {",
            "  cy.get('a').then(($el) => {",
            "    cy.wrap($el).click();",
            "  });",
            "});",
            "",
        ];
        assert_eq!(definition_end(&lines, 0), 4);
    }

    #[test]
    fn test_definition_end_one_liner() {
        let lines = vec!["Then('y', () => cy.visit('/'));", "Then('z', () => {});"];
        assert_eq!(definition_end(&lines, 0), 0);
    }

    #[test]
    fn test_definition_end_arrow_on_next_line() {
        let lines = vec![
            "When(",
            "  'I log in',",
            "  () => {",
            "    cy.login();",
            "  }",
            ");",
        ];
        // `);` on its own line after the brace closed
        assert_eq!(definition_end(&lines, 0), 5);
    }

    #[test]
    fn test_definition_end_falls_back_to_start() {
        let lines = vec!["Given('x', function () {", "  cy.visit('/');", "}"];
        assert_eq!(definition_end(&lines, 0), 0);
    }

    #[test]
    fn test_definition_end_unbalanced_literal() {
        let lines = vec![
            "Given('x', () => {",
            "  cy.log('{');",
            "});",
            "Given('y', () => {",
            "});",
        ];
        // The stray brace keeps the balance above zero, so no end is found
        assert_eq!(definition_end(&lines, 0), 0);
    }

    #[test]
    fn test_apply_fixes_comments_block() {
        let content = "import x;\nGiven('x', () => {\n  cy.visit('/');\n});\n\nThen('keep', () => {});\n";
        let fixed = apply_fixes(content, &[fix_at(2, "a.ts")]);
        assert_eq!(
            fixed,
            "import x;\n// Duplicate - already defined in a.ts\n//   cy.visit('/');\n// });\n\nThen('keep', () => {});\n"
        );
    }

    #[test]
    fn test_apply_fixes_multiple_in_one_file() {
        let content = "Given('a', () => {\n});\nGiven('b', () => {\n  go();\n});";
        let fixed = apply_fixes(content, &[fix_at(1, "one.ts"), fix_at(3, "two.ts")]);
        assert_eq!(
            fixed,
            "// Duplicate - already defined in one.ts\n// });\n// Duplicate - already defined in two.ts\n//   go();\n// });"
        );
    }

    #[test]
    fn test_apply_fixes_crlf_line_endings() {
        let content = "Given('a', () => {\r\n});\r\n";
        let fixed = apply_fixes(content, &[fix_at(1, "a.ts")]);
        assert_eq!(fixed, "// Duplicate - already defined in a.ts\n// });\r\n");
    }
}
