//! Scratch workspace management.
//!
//! Each scenario runs against a freshly scaffolded workspace in a scratch
//! directory. Workspaces are cleaned up or kept according to the harness
//! settings, and keeping a failed workspace is the main debugging aid.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Error, Result};
use crate::settings::Settings;

/// Returns `prefix` with a short unique suffix, safe for project names.
pub fn uniq(prefix: &str) -> String {
    let short = &uuid::Uuid::new_v4().simple().to_string()[..8];
    format!("{}{}", prefix, short)
}

/// A scaffolded workspace in a scratch directory.
pub struct ScratchWorkspace {
    /// Workspace name (directory name under the scratch root).
    name: String,
    /// Absolute path to the workspace root.
    root: PathBuf,
    /// Whether to keep the directory on drop.
    keep: bool,
}

impl ScratchWorkspace {
    /// Scaffolds a new workspace by running `<cli> new <name> --no-interactive`
    /// under the scratch root.
    pub fn create(settings: &Settings) -> Result<Self> {
        let name = uniq("ws-");
        let scratch = settings.scratch_root();
        std::fs::create_dir_all(&scratch)?;

        tracing::info!(workspace = %name, cli = %settings.cli_bin, "scaffolding workspace");

        let output = Command::new(&settings.cli_bin)
            .args(["new", &name, "--no-interactive"])
            .current_dir(&scratch)
            .output()
            .map_err(|e| Error::Launch {
                command: format!("{} new", settings.cli_bin),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Workspace(format!(
                "failed to scaffold workspace {}: {}",
                name, stderr
            )));
        }

        let root = scratch.join(&name);
        if !root.is_dir() {
            return Err(Error::Workspace(format!(
                "CLI reported success but {} was not created",
                root.display()
            )));
        }

        Ok(Self {
            name,
            root,
            keep: false,
        })
    }

    /// Wraps an already-existing workspace directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::Workspace(format!(
                "{} is not a directory",
                root.display()
            )));
        }
        let name = root
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("workspace")
            .to_string();

        Ok(Self {
            name,
            root,
            // Not ours to delete.
            keep: true,
        })
    }

    /// Returns the workspace name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the workspace root path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Marks the workspace to be kept on drop.
    pub fn keep(&mut self) {
        self.keep = true;
    }

    /// Returns whether the workspace will be kept on drop.
    pub fn is_kept(&self) -> bool {
        self.keep
    }

    /// Returns whether a workspace-relative path exists.
    pub fn file_exists(&self, rel: impl AsRef<Path>) -> bool {
        self.root.join(rel).exists()
    }

    /// Reads a workspace-relative file to a string.
    pub fn read_file(&self, rel: impl AsRef<Path>) -> Result<String> {
        Ok(std::fs::read_to_string(self.root.join(rel))?)
    }

    /// Writes a workspace-relative file, creating parent directories.
    pub fn write_file(&self, rel: impl AsRef<Path>, content: &str) -> Result<()> {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Rewrites a workspace-relative file through a transform closure.
    pub fn update_file(
        &self,
        rel: impl AsRef<Path>,
        transform: impl FnOnce(&str) -> String,
    ) -> Result<()> {
        let path = self.root.join(rel.as_ref());
        let content = std::fs::read_to_string(&path)?;
        std::fs::write(&path, transform(&content))?;
        Ok(())
    }

    /// Reads a workspace-relative JSON document.
    pub fn read_json(&self, rel: impl AsRef<Path>) -> Result<serde_json::Value> {
        let content = self.read_file(rel)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Writes a workspace-relative JSON document.
    pub fn write_json(&self, rel: impl AsRef<Path>, value: &serde_json::Value) -> Result<()> {
        self.write_file(rel, &serde_json::to_string(value)?)
    }

    /// Removes the workspace directory now, regardless of the keep flag.
    pub fn cleanup(mut self) -> Result<()> {
        self.keep = true; // Drop must not try again
        if self.root.exists() {
            std::fs::remove_dir_all(&self.root)?;
        }
        Ok(())
    }
}

impl Drop for ScratchWorkspace {
    fn drop(&mut self) {
        if !self.keep && self.root.exists() {
            if let Err(e) = std::fs::remove_dir_all(&self.root) {
                tracing::warn!(path = ?self.root, error = %e, "failed to remove scratch workspace");
            }
        }
    }
}
