//! Step definition discovery and duplicate detection

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use voucherkit_common::{Error, Result};

/// A step definition at the start of a line: keyword, open paren, quoted pattern.
static STEP_DEFINITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^(Given|When|Then)\(['"](.+?)['"]"#).expect("static regex is valid")
});

/// Cucumber step keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepKeyword {
    Given,
    When,
    Then,
}

impl StepKeyword {
    fn from_match(s: &str) -> Option<Self> {
        match s {
            "Given" => Some(StepKeyword::Given),
            "When" => Some(StepKeyword::When),
            "Then" => Some(StepKeyword::Then),
            _ => None,
        }
    }
}

impl fmt::Display for StepKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepKeyword::Given => write!(f, "Given"),
            StepKeyword::When => write!(f, "When"),
            StepKeyword::Then => write!(f, "Then"),
        }
    }
}

/// Identity of a step definition: keyword plus pattern text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepKey {
    pub keyword: StepKeyword,
    pub pattern: String,
}

impl fmt::Display for StepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}('{}'", self.keyword, self.pattern)
    }
}

/// Where a step definition was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    /// File name relative to the scanned directory
    pub file: String,

    /// 1-based line number
    pub line: usize,

    /// The matched text, e.g. `Given('I visit {string}'`
    pub text: String,
}

/// A key defined more than once. The first occurrence is the one kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateGroup {
    pub key: StepKey,
    pub occurrences: Vec<Occurrence>,
}

impl DuplicateGroup {
    pub fn kept(&self) -> &Occurrence {
        &self.occurrences[0]
    }

    pub fn redundant(&self) -> &[Occurrence] {
        &self.occurrences[1..]
    }
}

/// Result of scanning a directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub dir: PathBuf,
    pub files_scanned: usize,
    pub definitions: usize,
    pub duplicates: Vec<DuplicateGroup>,
}

impl ScanReport {
    pub fn has_duplicates(&self) -> bool {
        !self.duplicates.is_empty()
    }

    /// Number of definitions that would be commented out
    pub fn redundant_count(&self) -> usize {
        self.duplicates.iter().map(|g| g.redundant().len()).sum()
    }
}

/// Extract step definitions from one file's content, in source order
pub fn scan_source(file: &str, content: &str) -> Vec<(StepKey, Occurrence)> {
    STEP_DEFINITION
        .captures_iter(content)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let keyword = StepKeyword::from_match(caps.get(1)?.as_str())?;
            let pattern = caps.get(2)?.as_str().to_string();
            let line = content[..whole.start()].matches('\n').count() + 1;

            Some((
                StepKey { keyword, pattern },
                Occurrence {
                    file: file.to_string(),
                    line,
                    text: whole.as_str().to_string(),
                },
            ))
        })
        .collect()
}

/// Group occurrences by key, keeping first-seen order of keys.
/// Only keys with more than one occurrence are returned.
pub fn find_duplicates<I>(definitions: I) -> Vec<DuplicateGroup>
where
    I: IntoIterator<Item = (StepKey, Occurrence)>,
{
    let mut order: Vec<StepKey> = Vec::new();
    let mut by_key: HashMap<StepKey, Vec<Occurrence>> = HashMap::new();

    for (key, occurrence) in definitions {
        by_key
            .entry(key.clone())
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(occurrence);
    }

    order
        .into_iter()
        .filter_map(|key| {
            let occurrences = by_key.remove(&key)?;
            (occurrences.len() > 1).then_some(DuplicateGroup { key, occurrences })
        })
        .collect()
}

/// List the scannable files of `dir`, sorted by file name. Not recursive.
pub fn list_step_files(dir: &Path, extensions: &[String]) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Err(Error::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matches_ext = path
            .extension()
            .map(|ext| extensions.iter().any(|e| ext == e.as_str()))
            .unwrap_or(false);
        if matches_ext {
            if let Some(name) = path.file_name() {
                files.push(name.to_string_lossy().to_string());
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Read a step file, failing on non UTF-8 content
pub(crate) fn read_step_file(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    String::from_utf8(bytes).map_err(|_| Error::NotUtf8(path.to_path_buf()))
}

/// Scan every step file in `dir` for duplicate definitions
pub fn scan_dir(dir: &Path, extensions: &[String]) -> Result<ScanReport> {
    let files = list_step_files(dir, extensions)?;
    debug!("Scanning {} step file(s) in {}", files.len(), dir.display());

    let mut definitions = Vec::new();
    for file in &files {
        let content = read_step_file(&dir.join(file))?;
        let found = scan_source(file, &content);
        debug!("{}: {} definition(s)", file, found.len());
        definitions.extend(found);
    }

    let total = definitions.len();
    let duplicates = find_duplicates(definitions);
    info!(
        "Scanned {} file(s): {} definition(s), {} duplicated key(s)",
        files.len(),
        total,
        duplicates.len()
    );

    Ok(ScanReport {
        dir: dir.to_path_buf(),
        files_scanned: files.len(),
        definitions: total,
        duplicates,
    })
}
