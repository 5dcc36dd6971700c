//! Harness settings and pre-run validation.
//!
//! Settings come from an optional TOML file with environment overrides.
//! Validation catches configuration mistakes before any external command
//! is spawned.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable overriding the workspace CLI binary.
pub const CLI_BIN_ENV: &str = "ATLAS_E2E_CLI";

/// Environment variable forcing scratch workspaces to be kept.
pub const KEEP_WORKSPACES_ENV: &str = "ATLAS_E2E_KEEP";

/// Harness-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Workspace CLI binary to drive.
    #[serde(default = "default_cli_bin")]
    pub cli_bin: String,

    /// Directory scratch workspaces are created under.
    /// Defaults to the system temp directory.
    #[serde(default)]
    pub scratch_root: Option<PathBuf>,

    /// Keep the scratch workspace when a scenario fails (default: true).
    #[serde(default = "default_true")]
    pub keep_on_failure: bool,

    /// Keep the scratch workspace when a scenario passes (default: false).
    #[serde(default)]
    pub keep_on_success: bool,
}

fn default_cli_bin() -> String {
    "atlas".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cli_bin: default_cli_bin(),
            scratch_root: None,
            keep_on_failure: true,
            keep_on_success: false,
        }
    }
}

impl Settings {
    /// Loads settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse settings: {}", e)))
    }

    /// Applies environment overrides on top of the current values.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(bin) = std::env::var(CLI_BIN_ENV) {
            if !bin.is_empty() {
                self.cli_bin = bin;
            }
        }
        if let Ok(keep) = std::env::var(KEEP_WORKSPACES_ENV) {
            if keep == "1" || keep.eq_ignore_ascii_case("true") {
                self.keep_on_failure = true;
                self.keep_on_success = true;
            }
        }
        self
    }

    /// Returns the scratch root, falling back to the system temp directory.
    pub fn scratch_root(&self) -> PathBuf {
        self.scratch_root
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }

    /// Sets the workspace CLI binary.
    pub fn with_cli_bin(mut self, bin: impl Into<String>) -> Self {
        self.cli_bin = bin.into();
        self
    }

    /// Sets the scratch root directory.
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }
}

/// Validation report containing all found issues.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// List of validation errors (fatal).
    pub errors: Vec<String>,
    /// List of validation warnings (non-fatal).
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Returns true if validation passed (no errors).
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Adds an error to the report.
    pub fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    /// Adds a warning to the report.
    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Merges another report into this one.
    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Converts to a Result, failing if there are errors.
    pub fn into_result(self) -> Result<Vec<String>> {
        if self.is_valid() {
            Ok(self.warnings)
        } else {
            Err(Error::Config(self.errors.join("; ")))
        }
    }
}

/// Trait for validatable configuration types.
pub trait Validate {
    /// Validates the configuration and returns any issues found.
    fn validate(&self) -> ValidationReport;
}

impl Validate for Settings {
    fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();

        if self.cli_bin.trim().is_empty() {
            report.add_error("cli_bin cannot be empty");
        }

        if let Some(root) = &self.scratch_root {
            if !root.exists() {
                report.add_warning(format!(
                    "scratch_root {} does not exist yet",
                    root.display()
                ));
            }
        }

        report
    }
}

/// Timeout pair bounding the dev-server readiness wait.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutConfig {
    /// Maximum time without any new output before giving up.
    pub idle_timeout: Duration,
    /// Maximum total wall-clock time before giving up.
    pub total_timeout: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(120),
            total_timeout: Duration::from_secs(300),
        }
    }
}

impl Validate for TimeoutConfig {
    fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();

        if self.idle_timeout >= self.total_timeout {
            report.add_error("idle_timeout must be less than total_timeout");
        }
        if self.idle_timeout < Duration::from_secs(5) {
            report.add_warning("idle_timeout under 5 seconds may cut off a slow dev server");
        }

        report
    }
}
