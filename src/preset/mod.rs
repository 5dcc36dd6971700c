//! Browser test-runner configuration preset.
//!
//! Given the location of a project's runner config file, builds the base
//! configuration the workspace recommends: three desktop browsers, output
//! and report directories computed relative to the config location under the
//! workspace's dist tree, and retry/worker policy switched on CI.
//!
//! Callers extend the returned value with their own settings before handing
//! it to the external test engine.

pub mod devices;

use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use crate::error::Result;

use self::devices::DeviceDescriptor;

/// Workspace marker file used to locate the workspace root.
pub const WORKSPACE_MARKER: &str = "atlas.json";

/// Options for [`browser_preset`].
#[derive(Debug, Clone, Default)]
pub struct PresetOptions {
    /// Directory containing the e2e specs, relative to the config file.
    /// Defaults to `./src`.
    pub test_dir: Option<String>,

    /// Include Mobile Chrome and Mobile Safari in the project matrix.
    pub include_mobile_browsers: bool,

    /// Include Microsoft Edge and Google Chrome in the project matrix.
    pub include_branded_browsers: bool,
}

impl PresetOptions {
    /// Sets the test directory.
    pub fn with_test_dir(mut self, dir: impl Into<String>) -> Self {
        self.test_dir = Some(dir.into());
        self
    }

    /// Enables the mobile browser pair.
    pub fn with_mobile_browsers(mut self) -> Self {
        self.include_mobile_browsers = true;
        self
    }

    /// Enables the branded browser pair.
    pub fn with_branded_browsers(mut self) -> Self {
        self.include_branded_browsers = true;
        self
    }
}

/// Per-project emulation settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectUse {
    #[serde(flatten)]
    pub device: DeviceDescriptor,
    /// Branded browser channel, when targeting a branded build.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}

/// One named entry in the project matrix.
#[derive(Debug, Clone, Serialize)]
pub struct BrowserProject {
    pub name: String,
    #[serde(rename = "use")]
    pub use_: ProjectUse,
}

impl BrowserProject {
    fn new(name: &str, device: DeviceDescriptor) -> Self {
        Self {
            name: name.to_string(),
            use_: ProjectUse {
                device,
                channel: None,
            },
        }
    }

    fn with_channel(name: &str, device: DeviceDescriptor, channel: &str) -> Self {
        Self {
            name: name.to_string(),
            use_: ProjectUse {
                device,
                channel: Some(channel.to_string()),
            },
        }
    }
}

/// HTML reporter settings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HtmlReporter {
    pub output_folder: PathBuf,
}

/// Settings shared by every project.
#[derive(Debug, Clone, Serialize)]
pub struct SharedSettings {
    /// Trace collection policy.
    pub trace: String,
}

/// The assembled runner configuration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerConfig {
    pub test_dir: String,
    pub output_dir: PathBuf,
    pub fully_parallel: bool,
    pub forbid_only: bool,
    pub retries: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<u32>,
    pub reporter: Vec<(String, HtmlReporter)>,
    #[serde(rename = "use")]
    pub shared: SharedSettings,
    pub projects: Vec<BrowserProject>,
}

/// Builds the recommended runner configuration for the config file at
/// `path_to_config`.
///
/// Reads the CI policy from the `CI` environment variable.
pub fn browser_preset(path_to_config: impl AsRef<Path>, options: &PresetOptions) -> Result<RunnerConfig> {
    browser_preset_with_ci(path_to_config, options, is_ci())
}

/// [`browser_preset`] with an explicit CI flag.
pub fn browser_preset_with_ci(
    path_to_config: impl AsRef<Path>,
    options: &PresetOptions,
    ci: bool,
) -> Result<RunnerConfig> {
    let path = path_to_config.as_ref();
    // No-follow: a config symlink should resolve against its own directory.
    let metadata = std::fs::symlink_metadata(path)?;
    let normalized = if metadata.is_dir() {
        path
    } else {
        path.parent().unwrap_or(path)
    };

    let workspace_root = find_workspace_root(normalized);
    let project_path = relative(&workspace_root, normalized);
    let offset = relative(normalized, &workspace_root);

    let output_dir = offset
        .join("dist")
        .join(".playwright")
        .join(&project_path)
        .join("test-output");
    let report_dir = offset
        .join("dist")
        .join(".playwright")
        .join(&project_path)
        .join("playwright-report");

    let mut projects = vec![
        BrowserProject::new("chromium", devices::desktop_chrome()),
        BrowserProject::new("firefox", devices::desktop_firefox()),
        BrowserProject::new("webkit", devices::desktop_safari()),
    ];
    if options.include_mobile_browsers {
        projects.push(BrowserProject::new("Mobile Chrome", devices::pixel_5()));
        projects.push(BrowserProject::new("Mobile Safari", devices::iphone_12()));
    }
    if options.include_branded_browsers {
        projects.push(BrowserProject::with_channel(
            "Microsoft Edge",
            devices::desktop_edge(),
            "msedge",
        ));
        projects.push(BrowserProject::with_channel(
            "Google Chrome",
            devices::desktop_chrome(),
            "chrome",
        ));
    }

    Ok(RunnerConfig {
        test_dir: options
            .test_dir
            .clone()
            .unwrap_or_else(|| "./src".to_string()),
        output_dir,
        fully_parallel: true,
        forbid_only: ci,
        retries: if ci { 2 } else { 0 },
        workers: if ci { Some(1) } else { None },
        reporter: vec![(
            "html".to_string(),
            HtmlReporter {
                output_folder: report_dir,
            },
        )],
        shared: SharedSettings {
            trace: "on-first-retry".to_string(),
        },
        projects,
    })
}

/// Returns whether a CI environment is indicated.
fn is_ci() -> bool {
    std::env::var("CI").map(|v| !v.is_empty()).unwrap_or(false)
}

/// Walks up from `start` to the workspace root.
///
/// The root is the nearest ancestor carrying the workspace marker file,
/// falling back to the nearest VCS root, falling back to `start` itself.
pub fn find_workspace_root(start: &Path) -> PathBuf {
    for dir in start.ancestors() {
        if dir.join(WORKSPACE_MARKER).is_file() {
            return dir.to_path_buf();
        }
    }
    for dir in start.ancestors() {
        if dir.join(".git").exists() {
            return dir.to_path_buf();
        }
    }
    start.to_path_buf()
}

/// Computes the relative path from `from` to `to`.
///
/// Both paths must share a root for the result to be meaningful; equal paths
/// yield an empty path, which joins as a no-op.
fn relative(from: &Path, to: &Path) -> PathBuf {
    let from: Vec<Component<'_>> = from.components().collect();
    let to: Vec<Component<'_>> = to.components().collect();

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut result = PathBuf::new();
    for _ in common..from.len() {
        result.push("..");
    }
    for component in &to[common..] {
        result.push(component.as_os_str());
    }
    result
}
