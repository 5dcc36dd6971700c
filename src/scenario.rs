//! Scenario fixtures.
//!
//! A scenario describes one end-to-end run of the mobile plugin lifecycle:
//! which CLI binary to drive, the dev-server port, timeouts, and which
//! optional steps to include.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::settings::{TimeoutConfig, Validate, ValidationReport};

/// A scenario fixture loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,

    /// Description of what this scenario covers.
    #[serde(default)]
    pub description: String,

    /// Dev-server port for the start step.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Total timeout in seconds for the readiness wait.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Idle timeout in seconds for the readiness wait.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout: u64,

    /// Run the install target (off by default; the target needs network
    /// access to the framework's package registry).
    #[serde(default)]
    pub run_install: bool,

    /// Run the typecheck step through the detected package manager.
    #[serde(default = "default_true")]
    pub run_typecheck: bool,

    /// Extra environment variables for every CLI invocation.
    #[serde(default)]
    pub env: HashMap<String, String>,
}

fn default_port() -> u16 {
    8081
}

fn default_timeout() -> u64 {
    300
}

fn default_idle_timeout() -> u64 {
    120
}

fn default_true() -> bool {
    true
}

impl Scenario {
    /// Creates a scenario with defaults.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            port: default_port(),
            timeout: default_timeout(),
            idle_timeout: default_idle_timeout(),
            run_install: false,
            run_typecheck: true,
            env: HashMap::new(),
        }
    }

    /// Loads a scenario from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse scenario: {}", e)))
    }

    /// Returns the readiness timeouts as a [`TimeoutConfig`].
    pub fn timeouts(&self) -> TimeoutConfig {
        TimeoutConfig {
            idle_timeout: Duration::from_secs(self.idle_timeout),
            total_timeout: Duration::from_secs(self.timeout),
        }
    }
}

impl Validate for Scenario {
    fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();

        if self.name.trim().is_empty() {
            report.add_error("scenario name cannot be empty");
        }
        if self.port < 1024 {
            report.add_warning(format!("port {} is in the privileged range", self.port));
        }
        report.merge(self.timeouts().validate());

        report
    }
}
