//! Suite file management
//!
//! Handles finding, loading, and validating check-suite files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::checks::{CommandCheck, HttpCheck};
use crate::config::RunnerConfig;
use crate::models::TestCase;

/// Suite file versions this build understands
const SUPPORTED_VERSIONS: &[&str] = &["1"];

/// Problems with a suite declaration
#[derive(Error, Debug)]
pub enum SuiteError {
    #[error("unsupported suite version: {0}")]
    UnsupportedVersion(String),

    #[error("suite declares no checks")]
    Empty,

    #[error("duplicate check id: {0}")]
    DuplicateId(String),

    #[error("check '{id}': {reason}")]
    InvalidCheck { id: String, reason: String },
}

/// A declared suite of checks plus run defaults
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SuiteFile {
    #[serde(default = "default_version")]
    pub version: String,

    /// Human-readable suite name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Run defaults, overridable from the command line
    #[serde(default)]
    pub defaults: SuiteDefaults,

    pub checks: Vec<CheckSpec>,
}

fn default_version() -> String {
    "1".to_string()
}

/// Suite-level runner defaults
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SuiteDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrent: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_on_error: Option<bool>,
}

/// One declared check
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckSpec {
    pub id: String,

    /// Display name, defaults to the id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(flatten)]
    pub kind: CheckKind,

    /// Per-check deadline override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// Per-check retry override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,
}

impl CheckSpec {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    /// Convert into a runnable test case, applying per-check overrides
    pub fn into_case(self) -> Result<TestCase> {
        let name = self.display_name().to_string();
        let mut case = match self.kind {
            CheckKind::Http(check) => check.into_case(&self.id, &name)?,
            CheckKind::Command(check) => check.into_case(&self.id, &name)?,
        };

        if let Some(timeout_ms) = self.timeout_ms {
            case = case.with_timeout(std::time::Duration::from_millis(timeout_ms));
        }
        if let Some(retries) = self.retries {
            case = case.with_retries(retries);
        }

        Ok(case)
    }

    fn validate(&self) -> std::result::Result<(), SuiteError> {
        let result = match &self.kind {
            CheckKind::Http(check) => check.validate(),
            CheckKind::Command(check) => check.validate(),
        };
        result.map_err(|err| SuiteError::InvalidCheck {
            id: self.id.clone(),
            reason: err.to_string(),
        })
    }
}

/// Check kind discriminated by the `kind` field
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CheckKind {
    Http(HttpCheck),
    Command(CommandCheck),
}

impl CheckKind {
    pub fn label(&self) -> &'static str {
        match self {
            CheckKind::Http(_) => "http",
            CheckKind::Command(_) => "command",
        }
    }

    /// Short description of the probe target
    pub fn target(&self) -> String {
        match self {
            CheckKind::Http(check) => format!("{} {}", check.method, check.url),
            CheckKind::Command(check) => check.command.join(" "),
        }
    }
}

impl SuiteFile {
    /// Load a suite from file; YAML or JSON is selected by extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = expand_path(path.as_ref());
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read suite file: {}", path.display()))?;

        let suite: Self = if is_yaml_file(&path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("failed to parse YAML suite: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("failed to parse JSON suite: {}", path.display()))?
        };

        suite.validate()?;
        Ok(suite)
    }

    /// Save the suite to file; YAML or JSON is selected by extension
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = expand_path(path.as_ref());
        let content = if is_yaml_file(&path) {
            serde_yaml::to_string(self).context("failed to serialize suite")?
        } else {
            serde_json::to_string_pretty(self).context("failed to serialize suite")?
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create directory: {}", parent.display()))?;
            }
        }

        std::fs::write(&path, content)
            .with_context(|| format!("failed to write suite file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the whole declaration
    pub fn validate(&self) -> std::result::Result<(), SuiteError> {
        if !SUPPORTED_VERSIONS.contains(&self.version.as_str()) {
            return Err(SuiteError::UnsupportedVersion(self.version.clone()));
        }
        if self.checks.is_empty() {
            return Err(SuiteError::Empty);
        }

        let mut seen = HashSet::new();
        for check in &self.checks {
            if check.id.is_empty() {
                return Err(SuiteError::InvalidCheck {
                    id: check.id.clone(),
                    reason: "id must not be empty".to_string(),
                });
            }
            if !seen.insert(check.id.as_str()) {
                return Err(SuiteError::DuplicateId(check.id.clone()));
            }
            check.validate()?;
        }

        Ok(())
    }

    /// Runner configuration derived from the suite defaults
    pub fn runner_config(&self) -> RunnerConfig {
        let mut config = RunnerConfig::default();
        if let Some(timeout_ms) = self.defaults.timeout_ms {
            config = config.with_timeout_ms(timeout_ms);
        }
        if let Some(retries) = self.defaults.retries {
            config = config.with_retries(retries);
        }
        if let Some(max_concurrent) = self.defaults.max_concurrent {
            config = config.with_max_concurrency(max_concurrent);
        }
        if let Some(stop_on_error) = self.defaults.stop_on_error {
            config = config.with_stop_on_error(stop_on_error);
        }
        config
    }

    /// Convert every declared check into a runnable test case
    pub fn into_cases(self) -> Result<Vec<TestCase>> {
        self.checks.into_iter().map(CheckSpec::into_case).collect()
    }

    /// Generate an example suite
    pub fn example() -> Self {
        Self {
            version: default_version(),
            name: Some("example smoke suite".to_string()),
            defaults: SuiteDefaults {
                timeout_ms: Some(5_000),
                retries: Some(1),
                max_concurrent: Some(4),
                stop_on_error: Some(false),
            },
            checks: vec![
                CheckSpec {
                    id: "api-health".to_string(),
                    name: Some("API health endpoint".to_string()),
                    kind: CheckKind::Http(
                        HttpCheck::new("http://localhost:8080/health")
                            .with_body_contains("ok"),
                    ),
                    timeout_ms: Some(2_000),
                    retries: None,
                },
                CheckSpec {
                    id: "disk-space".to_string(),
                    name: Some("enough disk space".to_string()),
                    kind: CheckKind::Command(CommandCheck::new([
                        "sh", "-c", "test $(df --output=pcent / | tail -1 | tr -dc 0-9) -lt 90",
                    ])),
                    timeout_ms: None,
                    retries: None,
                },
            ],
        }
    }
}

/// Expand ~ to home directory
fn expand_path(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}

/// Check if file is YAML based on extension
fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}
