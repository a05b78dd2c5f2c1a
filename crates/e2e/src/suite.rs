//! Spec file discovery

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use voucherkit_common::config::SuiteConfig;

use crate::error::{E2eError, E2eResult};

/// A single spec/feature file to hand to the runner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteEntry {
    /// File name, as shown in progress and summaries
    pub name: String,

    /// Path passed to the runner
    pub path: PathBuf,
}

/// Ordered list of spec files
#[derive(Debug, Clone)]
pub struct Suite {
    dir: PathBuf,
    entries: Vec<SuiteEntry>,
}

impl Suite {
    /// Every file in `dir` with the given extension, sorted by name
    pub fn discover(dir: &Path, extension: &str) -> E2eResult<Self> {
        if !dir.is_dir() {
            return Err(E2eError::FeaturesDirNotFound(dir.to_path_buf()));
        }

        let mut names = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().map(|e| e == extension).unwrap_or(false) {
                if let Some(name) = path.file_name() {
                    names.push(name.to_string_lossy().to_string());
                }
            }
        }
        names.sort();

        Ok(Self::from_list(dir, &names))
    }

    /// A fixed list of file names under `dir`, in the given order.
    /// Missing files are not checked here; they fail when run.
    pub fn from_list(dir: &Path, names: &[String]) -> Self {
        let entries = names
            .iter()
            .map(|name| SuiteEntry {
                name: name.clone(),
                path: dir.join(name),
            })
            .collect();

        Self {
            dir: dir.to_path_buf(),
            entries,
        }
    }

    /// Fixed list from config when given, discovery otherwise
    pub fn from_config(config: &SuiteConfig) -> E2eResult<Self> {
        if config.specs.is_empty() {
            Self::discover(&config.features_dir, &config.extension)
        } else {
            Ok(Self::from_list(&config.features_dir, &config.specs))
        }
    }

    /// Keep entries whose name contains `pattern`
    pub fn filter(mut self, pattern: &str) -> Self {
        self.entries.retain(|e| e.name.contains(pattern));
        self
    }

    /// Keep only the named entries, in suite order. Every name must exist.
    pub fn only(mut self, names: &[String]) -> E2eResult<Self> {
        if let Some(missing) = names
            .iter()
            .find(|n| !self.entries.iter().any(|e| &e.name == *n))
        {
            return Err(E2eError::SpecNotFound(missing.clone()));
        }
        self.entries.retain(|e| names.contains(&e.name));
        Ok(self)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entries(&self) -> &[SuiteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
