//! voucherkit configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Error, Result};

/// Default config file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "voucherkit.toml";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoucherkitConfig {
    /// Step definition scanning
    pub steps: StepsConfig,

    /// Feature/spec suite execution
    pub suite: SuiteConfig,

    /// Application under test
    pub app: AppConfig,

    /// Playwright storage-state fixtures
    pub auth: AuthConfig,
}

/// Step definition scanner configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepsConfig {
    /// Directory containing step definition files
    pub dir: PathBuf,

    /// File extensions to scan (without the dot)
    pub extensions: Vec<String>,
}

impl Default for StepsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("cypress/support/step_definitions"),
            extensions: vec!["ts".to_string()],
        }
    }
}

/// Which external test runner drives the browser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunnerKind {
    #[default]
    Cypress,
    Playwright,
}

impl fmt::Display for RunnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunnerKind::Cypress => write!(f, "cypress"),
            RunnerKind::Playwright => write!(f, "playwright"),
        }
    }
}

impl FromStr for RunnerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "cypress" => Ok(RunnerKind::Cypress),
            "playwright" => Ok(RunnerKind::Playwright),
            other => Err(Error::UnknownVariant {
                kind: "runner",
                value: other.to_string(),
            }),
        }
    }
}

/// A user-supplied runner command. `{spec}` in any argument is replaced
/// with the spec path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomRunner {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Suite execution configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    pub runner: RunnerKind,

    /// Overrides `runner` when set
    pub custom: Option<CustomRunner>,

    /// Directory holding the feature/spec files
    pub features_dir: PathBuf,

    /// Extension used for discovery (without the dot)
    pub extension: String,

    /// Fixed list of spec file names. Empty means discover from `features_dir`.
    pub specs: Vec<String>,

    /// Per-spec timeout
    pub timeout_secs: u64,

    /// Where `suite-summary.json` is written
    pub output_dir: PathBuf,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            runner: RunnerKind::Cypress,
            custom: None,
            features_dir: PathBuf::from("cypress/e2e/features"),
            extension: "feature".to_string(),
            specs: Vec::new(),
            timeout_secs: 600,
            output_dir: PathBuf::from("test-results"),
        }
    }
}

/// Application under test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,

    /// Path requested to decide whether the app is up
    pub probe_path: String,

    /// Command used to start the app when it is not already running,
    /// e.g. `["npm", "start"]`
    pub start_command: Vec<String>,

    pub startup_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            probe_path: "/login".to_string(),
            start_command: Vec::new(),
            startup_timeout_secs: 120,
        }
    }
}

/// Storage-state fixture output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub dir: PathBuf,
    pub origin: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("playwright/.auth"),
            origin: "http://localhost:3000".to_string(),
        }
    }
}

impl VoucherkitConfig {
    /// Load configuration from file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.steps.extensions.is_empty() {
            return Err(Error::InvalidConfig(
                "steps.extensions must name at least one extension".to_string(),
            ));
        }
        if self.suite.timeout_secs == 0 {
            return Err(Error::InvalidConfig(
                "suite.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if let Some(custom) = &self.suite.custom {
            if custom.program.trim().is_empty() {
                return Err(Error::InvalidConfig(
                    "suite.custom.program must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = VoucherkitConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, VoucherkitConfig::default());
        assert_eq!(config.app.base_url, "http://localhost:3000");
        assert_eq!(config.suite.timeout_secs, 600);
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config = VoucherkitConfig::from_toml(
            r#"
[suite]
runner = "playwright"
specs = ["login.feature", "settings.feature"]

[app]
start_command = ["npm", "start"]
"#,
        )
        .unwrap();
        assert_eq!(config.suite.runner, RunnerKind::Playwright);
        assert_eq!(config.suite.specs.len(), 2);
        assert_eq!(config.suite.extension, "feature");
        assert_eq!(config.app.start_command, vec!["npm", "start"]);
        assert_eq!(config.app.probe_path, "/login");
        assert_eq!(config.steps.extensions, vec!["ts"]);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = VoucherkitConfig::from_toml("[suite]\ntimeout_secs = 0\n").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/voucherkit.toml");
        let mut config = VoucherkitConfig::default();
        config.suite.custom = Some(CustomRunner {
            program: "./run.sh".to_string(),
            args: vec!["{spec}".to_string()],
        });
        config.save(&path).unwrap();
        assert_eq!(VoucherkitConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_runner_kind_from_str() {
        assert_eq!("Cypress".parse::<RunnerKind>().unwrap(), RunnerKind::Cypress);
        assert_eq!("playwright".parse::<RunnerKind>().unwrap(), RunnerKind::Playwright);
        assert!("jest".parse::<RunnerKind>().is_err());
    }
}
