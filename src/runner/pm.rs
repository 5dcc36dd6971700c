//! Package manager detection.
//!
//! The typecheck step runs an uninstalled package binary through whatever
//! package manager the workspace uses, detected from its lockfile.

use std::path::Path;

/// Package manager in use by a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PackageManager {
    #[default]
    Npm,
    Yarn,
    Pnpm,
    Bun,
}

impl PackageManager {
    /// Detects the package manager from lockfiles in `workspace_root`.
    ///
    /// Falls back to npm when no lockfile is present.
    pub fn detect(workspace_root: &Path) -> Self {
        if workspace_root.join("bun.lockb").exists() {
            Self::Bun
        } else if workspace_root.join("pnpm-lock.yaml").exists() {
            Self::Pnpm
        } else if workspace_root.join("yarn.lock").exists() {
            Self::Yarn
        } else {
            Self::Npm
        }
    }

    /// Command prefix that runs a package binary without installing it.
    pub fn run_uninstalled(&self) -> &'static str {
        match self {
            Self::Npm => "npx",
            Self::Yarn => "yarn",
            Self::Pnpm => "pnpm dlx",
            Self::Bun => "bunx",
        }
    }

    /// Returns the package manager name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Yarn => "yarn",
            Self::Pnpm => "pnpm",
            Self::Bun => "bun",
        }
    }
}
