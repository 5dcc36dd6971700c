//! Workspace CLI runner.
//!
//! Resolves one-line subcommand strings like
//! `generate mobile:application my-app --no-interactive` into invocations of
//! the workspace CLI binary, rooted at the workspace under test.

use std::path::PathBuf;

use crate::runner::{CommandRunner, CommandSpec};

/// Environment variable that disables the CLI's VCS status check.
///
/// Prebuild refuses to sync native projects with a dirty checkout unless
/// this is set to `true`.
pub const NO_VCS_STATUS_ENV: &str = "ATLAS_NO_VCS_STATUS";

/// Runner for the workspace CLI.
pub struct WorkspaceCli {
    /// CLI binary name or path.
    bin: String,
    /// Workspace the CLI operates on.
    workspace_root: PathBuf,
    /// Environment applied to every invocation.
    env: Vec<(String, String)>,
}

impl WorkspaceCli {
    /// Creates a runner for `bin` rooted at `workspace_root`.
    pub fn new(bin: impl Into<String>, workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            bin: bin.into(),
            workspace_root: workspace_root.into(),
            env: Vec::new(),
        }
    }

    /// Adds an environment variable applied to every invocation.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Returns the CLI binary.
    pub fn bin(&self) -> &str {
        &self.bin
    }

    /// Returns the workspace root the CLI operates on.
    pub fn workspace_root(&self) -> &std::path::Path {
        &self.workspace_root
    }
}

impl CommandRunner for WorkspaceCli {
    fn name(&self) -> &str {
        "workspace-cli"
    }

    fn command(&self, line: &str) -> CommandSpec {
        let mut spec = CommandSpec::new(&self.bin, &self.workspace_root)
            .args(line.split_whitespace().map(str::to_string));
        for (key, value) in &self.env {
            spec = spec.env(key.clone(), value.clone());
        }
        spec
    }
}
