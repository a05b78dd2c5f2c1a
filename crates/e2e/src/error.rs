//! Error types for suite execution

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("App failed to start: {0}")]
    AppStartup(String),

    #[error("App at {url} not reachable after {attempts} attempt(s)")]
    AppUnreachable { url: String, attempts: usize },

    #[error("Failed to spawn {program}: {source}")]
    RunnerSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Runner timed out after {0}s")]
    RunnerTimeout(u64),

    #[error("Features directory not found: {}", .0.display())]
    FeaturesDirNotFound(PathBuf),

    #[error("No spec files to run in {}", .0.display())]
    NoSpecs(PathBuf),

    #[error("Spec not found: {0}")]
    SpecNotFound(String),

    #[error("Report parse error: {0}")]
    ReportParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type E2eResult<T> = Result<T, E2eError>;
