//! Runner JSON report parsing
//!
//! Cypress emits mocha's `json` reporter format and Playwright emits its own
//! `json` reporter format. Both are reduced to `ParsedReport`. The format is
//! picked from the shape of the `stats` object.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{E2eError, E2eResult};

pub mod mocha;
pub mod playwright;

/// Counts reported by a runner for one spec file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportStats {
    pub tests: u64,
    pub passes: u64,
    pub failures: u64,
    pub pending: u64,
    pub duration_ms: u64,
}

/// One failed test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureDetail {
    pub title: String,

    /// First line of the error message
    pub error: String,
}

/// A report reduced to what the summary needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedReport {
    pub stats: ReportStats,
    pub failures: Vec<FailureDetail>,
}

/// Which reporter produced the output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Mocha,
    Playwright,
}

/// First line of an error message, with the fallback used when none was given
pub(crate) fn first_line(message: Option<&str>) -> String {
    message
        .and_then(|m| m.lines().next())
        .map(|l| l.trim_end().to_string())
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| "Unknown error".to_string())
}

/// The first JSON object in `output`, starting at the first line that begins
/// with `{`. Anything after the object is ignored.
pub fn extract_json(output: &str) -> Option<Value> {
    let mut offset = 0;
    for line in output.split_inclusive('\n') {
        if line.starts_with('{') {
            let mut stream =
                serde_json::Deserializer::from_str(&output[offset..]).into_iter::<Value>();
            if let Some(Ok(value)) = stream.next() {
                if value.is_object() {
                    return Some(value);
                }
            }
        }
        offset += line.len();
    }
    None
}

/// Guess the reporter from the `stats` object
pub fn detect_format(report: &Value) -> Option<ReportFormat> {
    let stats = report.get("stats")?;
    if stats.get("expected").is_some() || stats.get("unexpected").is_some() {
        Some(ReportFormat::Playwright)
    } else if stats.get("passes").is_some() || stats.get("failures").is_some() {
        Some(ReportFormat::Mocha)
    } else {
        None
    }
}

/// Parse runner stdout into a report
pub fn parse_report(output: &str) -> E2eResult<ParsedReport> {
    let value = extract_json(output)
        .ok_or_else(|| E2eError::ReportParse("no JSON object in runner output".to_string()))?;
    let format = detect_format(&value)
        .ok_or_else(|| E2eError::ReportParse("unrecognised report shape".to_string()))?;
    debug!("Detected {:?} report", format);

    match format {
        ReportFormat::Mocha => mocha::parse(value),
        ReportFormat::Playwright => playwright::parse(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_skips_leading_noise() {
        let output = "DevTools listening on ws://127.0.0.1\nOpening Cypress...\n{\n  \"stats\": {\"passes\": 1}\n}\nTrailing text\n";
        let value = extract_json(output).unwrap();
        assert_eq!(value["stats"]["passes"], 1);
    }

    #[test]
    fn test_extract_json_skips_unparseable_brace_lines() {
        let output = "{not json\n{\"stats\": {\"failures\": 0}}\n";
        let value = extract_json(output).unwrap();
        assert_eq!(value["stats"]["failures"], 0);
    }

    #[test]
    fn test_extract_json_none() {
        assert!(extract_json("").is_none());
        assert!(extract_json("Error: Cannot find module 'cypress'\n").is_none());
    }

    #[test]
    fn test_detect_format() {
        let mocha: Value = serde_json::json!({"stats": {"passes": 2, "failures": 0}});
        let pw: Value = serde_json::json!({"stats": {"expected": 2, "unexpected": 0}});
        assert_eq!(detect_format(&mocha), Some(ReportFormat::Mocha));
        assert_eq!(detect_format(&pw), Some(ReportFormat::Playwright));
        assert_eq!(detect_format(&serde_json::json!({"ok": true})), None);
    }

    #[test]
    fn test_first_line() {
        assert_eq!(
            first_line(Some("Timed out retrying after 4000ms\n\nat foo.js:1")),
            "Timed out retrying after 4000ms"
        );
        assert_eq!(first_line(None), "Unknown error");
        assert_eq!(first_line(Some("")), "Unknown error");
    }

    #[test]
    fn test_parse_report_errors() {
        assert!(matches!(parse_report("garbage"), Err(E2eError::ReportParse(_))));
        assert!(matches!(parse_report("{\"foo\": 1}"), Err(E2eError::ReportParse(_))));
    }
}
