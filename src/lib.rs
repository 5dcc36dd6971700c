//! Atlas Mobile E2E - end-to-end harness for the Atlas workspace CLI mobile plugin
//!
//! This library drives the workspace CLI through the full lifecycle of a
//! mobile-app scaffold (generate, test, lint, export, prebuild, dev server
//! start/stop, library build) against a scratch workspace, and builds the
//! recommended browser test-runner configuration for e2e projects.

pub mod assertions;
pub mod error;
pub mod harness;
pub mod manifest;
pub mod preset;
pub mod runner;
pub mod scenario;
pub mod server;
pub mod settings;
pub mod workspace;

pub use error::Error;

pub use assertions::{check_files_exist, expect_output_contains, expect_success, expect_tests_pass};
pub use harness::{
    dev_server_ready, MobileSuite, ScenarioResult, StepResult, CONFIG_SYNCED_MARKER,
    EXPORT_SUCCESS_MARKER, INSTALL_SUCCESS_MARKER, LINT_CLEAN_MARKER,
};
pub use manifest::AppManifest;
pub use preset::{
    browser_preset, browser_preset_with_ci, find_workspace_root, BrowserProject, PresetOptions,
    RunnerConfig,
};
pub use runner::{
    run_spec, CommandEvent, CommandOutput, CommandRunner, CommandSpec, PackageManager,
    ShellRunner, WorkspaceCli, NO_VCS_STATUS_ENV,
};
pub use scenario::Scenario;
pub use server::{kill_port, DevServer};
pub use settings::{Settings, TimeoutConfig, Validate, ValidationReport};
pub use workspace::{uniq, ScratchWorkspace};
