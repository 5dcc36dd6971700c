//! Scenario orchestrator for the mobile plugin lifecycle.
//!
//! Drives the workspace CLI through the full command sequence against a
//! freshly scaffolded workspace: generate, test, lint, export, export-web,
//! prebuild, optional install, start/stop of the dev server, library build
//! and typecheck. Every step records a result; any failure fails the
//! scenario.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::assertions::{
    check_files_exist, expect_output_contains, expect_tests_pass,
};
use crate::error::Result;
use crate::manifest::AppManifest;
use crate::runner::{
    run_spec, CommandRunner, PackageManager, ShellRunner, WorkspaceCli, NO_VCS_STATUS_ENV,
};
use crate::scenario::Scenario;
use crate::server::{kill_port, DevServer};
use crate::settings::{Settings, Validate};
use crate::workspace::{uniq, ScratchWorkspace};

/// Marker printed by a successful export.
pub const EXPORT_SUCCESS_MARKER: &str = "Export was successful";

/// Marker printed when prebuild synced the native projects.
pub const CONFIG_SYNCED_MARKER: &str = "Config synced";

/// Marker printed by a successful install target.
pub const INSTALL_SUCCESS_MARKER: &str = "Successfully ran target install";

/// Marker printed by a clean lint run.
pub const LINT_CLEAN_MARKER: &str = "All files pass linting.";

/// Platform identifier patched into the app manifest before prebuild.
pub const PREBUILD_BUNDLE_ID: &str = "dev.atlas.e2e";

/// Readiness predicate for the dev server on `port`.
///
/// The server announces either a native packager or a web endpoint,
/// depending on which platform target it resolved.
pub fn dev_server_ready(port: u16) -> impl Fn(&str) -> bool {
    let native = format!("Packager is ready at http://localhost:{}", port);
    let web = format!("Web is waiting on http://localhost:{}", port);
    move |output: &str| output.contains(&native) || output.contains(&web)
}

/// Result of a single scenario step.
#[derive(Debug, Clone)]
pub struct StepResult {
    /// Step name.
    pub name: String,
    /// Whether the step passed.
    pub passed: bool,
    /// Failure message, if any.
    pub message: Option<String>,
}

impl StepResult {
    fn passed(name: &str) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            message: None,
        }
    }

    fn failed(name: &str, message: String) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            message: Some(message),
        }
    }
}

/// Result of a scenario run.
#[derive(Debug)]
pub struct ScenarioResult {
    /// Scenario name.
    pub scenario: String,
    /// Per-step results, in execution order.
    pub steps: Vec<StepResult>,
    /// Overall pass/fail.
    pub passed: bool,
    /// Wall-clock duration of the run.
    pub duration: Duration,
    /// Workspace path, if scaffolding got that far.
    pub workspace: Option<PathBuf>,
    /// Whether the workspace was kept on disk.
    pub workspace_kept: bool,
    /// Infrastructure error that aborted the run, if any.
    pub error: Option<String>,
}

impl ScenarioResult {
    fn aborted(scenario: &str, started: Instant, error: String) -> Self {
        Self {
            scenario: scenario.to_string(),
            steps: Vec::new(),
            passed: false,
            duration: started.elapsed(),
            workspace: None,
            workspace_kept: false,
            error: Some(error),
        }
    }
}

/// Generated project names for one scenario run.
#[derive(Debug, Clone)]
struct ProjectNames {
    app: String,
    lib: String,
}

impl ProjectNames {
    fn generate() -> Self {
        Self {
            app: uniq("my-app"),
            lib: uniq("lib"),
        }
    }
}

/// Orchestrator for the mobile plugin lifecycle.
pub struct MobileSuite {
    scenario: Scenario,
    settings: Settings,
}

impl MobileSuite {
    /// Creates a suite for the given scenario and settings.
    pub fn new(scenario: Scenario, settings: Settings) -> Self {
        Self { scenario, settings }
    }

    /// Runs the scenario end to end.
    pub async fn run(&self) -> ScenarioResult {
        let started = Instant::now();

        let mut validation = self.scenario.validate();
        validation.merge(self.settings.validate());
        for warning in &validation.warnings {
            tracing::warn!(scenario = %self.scenario.name, "{}", warning);
        }
        if let Err(e) = validation.into_result() {
            return ScenarioResult::aborted(&self.scenario.name, started, e.to_string());
        }

        let mut workspace = match ScratchWorkspace::create(&self.settings) {
            Ok(ws) => ws,
            Err(e) => {
                return ScenarioResult::aborted(
                    &self.scenario.name,
                    started,
                    format!("failed to scaffold workspace: {}", e),
                );
            }
        };

        let names = ProjectNames::generate();
        let mut cli = WorkspaceCli::new(&self.settings.cli_bin, workspace.root());
        for (key, value) in &self.scenario.env {
            cli = cli.with_env(key, value);
        }

        tracing::info!(
            scenario = %self.scenario.name,
            workspace = %workspace.root().display(),
            app = %names.app,
            lib = %names.lib,
            "running scenario"
        );

        // Scaffolding is a precondition for everything else; abort on failure.
        if let Err(e) = self.scaffold(&cli, &workspace, &names).await {
            workspace.keep();
            let mut result = ScenarioResult::aborted(
                &self.scenario.name,
                started,
                format!("scaffolding failed: {}", e),
            );
            result.workspace = Some(workspace.root().to_path_buf());
            result.workspace_kept = self.settings.keep_on_failure;
            if !self.settings.keep_on_failure {
                let _ = workspace.cleanup();
                result.workspace_kept = false;
            }
            return result;
        }

        let mut steps = Vec::new();
        let mut passed = true;
        let mut record = |name: &str, result: Result<()>| match result {
            Ok(()) => {
                tracing::info!(step = name, "step passed");
                steps.push(StepResult::passed(name));
                true
            }
            Err(e) => {
                tracing::error!(step = name, error = %e, "step failed");
                steps.push(StepResult::failed(name, e.to_string()));
                false
            }
        };

        passed &= record(
            "test-and-lint",
            self.test_and_lint(&cli, &names).await,
        );
        passed &= record("export", self.export(&cli, &workspace, &names).await);
        passed &= record(
            "export-web",
            self.export_web(&cli, &workspace, &names).await,
        );
        passed &= record("prebuild", self.prebuild(&cli, &workspace, &names).await);
        if self.scenario.run_install {
            passed &= record("install", self.install(&cli, &names).await);
        }
        passed &= record("start", self.start(&cli, &names).await);
        passed &= record(
            "build-library",
            self.build_library(&cli, &workspace, &names).await,
        );
        if self.scenario.run_typecheck {
            passed &= record("typecheck", self.typecheck(&workspace, &names).await);
        }

        let keep = if passed {
            self.settings.keep_on_success
        } else {
            self.settings.keep_on_failure
        };
        let workspace_path = workspace.root().to_path_buf();
        if keep {
            workspace.keep();
        }

        ScenarioResult {
            scenario: self.scenario.name.clone(),
            steps,
            passed,
            duration: started.elapsed(),
            workspace: Some(workspace_path),
            workspace_kept: keep,
            error: None,
        }
    }

    /// Generates the app, the buildable library, and a component exported
    /// from the library, then wires the component import into the app.
    async fn scaffold(
        &self,
        cli: &WorkspaceCli,
        workspace: &ScratchWorkspace,
        names: &ProjectNames,
    ) -> Result<()> {
        cli.run_checked(&format!(
            "generate mobile:application {} --no-interactive",
            names.app
        ))
        .await?;
        cli.run_checked(&format!(
            "generate mobile:library {} --buildable --publishable --importPath={}/{} --no-interactive",
            names.lib,
            workspace.name(),
            names.lib
        ))
        .await?;

        let component = uniq("component");
        cli.run_checked(&format!(
            "generate mobile:component {} --project={} --export --no-interactive",
            component, names.lib
        ))
        .await?;

        let import_path = format!("{}/{}", workspace.name(), names.lib);
        workspace.update_file(
            format!("apps/{}/src/app/App.tsx", names.app),
            |content| {
                format!(
                    "// eslint-disable-next-line @typescript-eslint/no-unused-vars\nimport {{{}}} from '{}';\n{}",
                    component, import_path, content
                )
            },
        )?;

        Ok(())
    }

    /// Runs the test and lint targets for both projects.
    async fn test_and_lint(&self, cli: &WorkspaceCli, names: &ProjectNames) -> Result<()> {
        expect_tests_pass(&cli.run(&format!("test {}", names.app)).await?)?;
        expect_tests_pass(&cli.run(&format!("test {}", names.lib)).await?)?;

        let app_lint = cli.run(&format!("lint {}", names.app)).await?;
        expect_output_contains(&app_lint, LINT_CLEAN_MARKER)?;

        let lib_lint = cli.run(&format!("lint {}", names.lib)).await?;
        expect_output_contains(&lib_lint, LINT_CLEAN_MARKER)?;

        Ok(())
    }

    /// Exports the app and checks the build metadata landed in dist.
    async fn export(
        &self,
        cli: &WorkspaceCli,
        workspace: &ScratchWorkspace,
        names: &ProjectNames,
    ) -> Result<()> {
        let output = cli
            .run(&format!("export {} --no-interactive", names.app))
            .await?;
        expect_output_contains(&output, EXPORT_SUCCESS_MARKER)?;

        check_files_exist(
            workspace.root(),
            &[format!("dist/apps/{}/metadata.json", names.app)],
        )
    }

    /// Exports the web bundle into the app's own dist directory.
    async fn export_web(
        &self,
        cli: &WorkspaceCli,
        workspace: &ScratchWorkspace,
        names: &ProjectNames,
    ) -> Result<()> {
        cli.run_checked(&format!("export-web {}", names.app)).await?;

        check_files_exist(
            workspace.root(),
            &[
                format!("apps/{}/dist/index.html", names.app),
                format!("apps/{}/dist/metadata.json", names.app),
            ],
        )
    }

    /// Patches platform identifiers into the app manifest and runs prebuild
    /// with the VCS status check disabled.
    async fn prebuild(
        &self,
        cli: &WorkspaceCli,
        workspace: &ScratchWorkspace,
        names: &ProjectNames,
    ) -> Result<()> {
        let manifest_path = workspace
            .root()
            .join(format!("apps/{}/app.json", names.app));
        let mut manifest = AppManifest::load(&manifest_path)?;
        let ios = manifest.set_ios_bundle_identifier(PREBUILD_BUNDLE_ID);
        let android = manifest.set_android_package(PREBUILD_BUNDLE_ID);
        manifest.save()?;
        tracing::debug!(ios, android, "patched app manifest for prebuild");

        let spec = cli
            .command(&format!(
                "prebuild {} --no-interactive --install=false",
                names.app
            ))
            .env(NO_VCS_STATUS_ENV, "true");
        let output = run_spec(spec).await?;

        expect_output_contains(&output, CONFIG_SYNCED_MARKER)
    }

    /// Runs the install target.
    async fn install(&self, cli: &WorkspaceCli, names: &ProjectNames) -> Result<()> {
        let output = cli
            .run(&format!("install {} --no-interactive", names.app))
            .await?;
        expect_output_contains(&output, INSTALL_SUCCESS_MARKER)
    }

    /// Starts the dev server, waits for readiness, then tears it down and
    /// frees the port. Termination errors fail the step.
    async fn start(&self, cli: &WorkspaceCli, names: &ProjectNames) -> Result<()> {
        let port = self.scenario.port;
        let spec = cli.command(&format!("start {} -- --port={}", names.app, port));

        let mut server = DevServer::spawn(spec)?;
        server
            .wait_until(dev_server_ready(port), self.scenario.timeouts())
            .await?;

        server.shutdown().await?;
        kill_port(port).await
    }

    /// Builds the publishable library and checks its dist artifacts.
    async fn build_library(
        &self,
        cli: &WorkspaceCli,
        workspace: &ScratchWorkspace,
        names: &ProjectNames,
    ) -> Result<()> {
        cli.run_checked(&format!("build {}", names.lib)).await?;

        check_files_exist(
            workspace.root(),
            &[
                format!("dist/libs/{}/index.js", names.lib),
                format!("dist/libs/{}/src/index.d.ts", names.lib),
            ],
        )
    }

    /// Typechecks the app through the workspace's package manager and checks
    /// the compiled output tree.
    async fn typecheck(&self, workspace: &ScratchWorkspace, names: &ProjectNames) -> Result<()> {
        let pm = PackageManager::detect(workspace.root());
        let shell = ShellRunner::new(workspace.root());

        shell
            .run_checked(&format!(
                "{} tsc -p apps/{}/tsconfig.app.json",
                pm.run_uninstalled(),
                names.app
            ))
            .await?;

        check_files_exist(
            workspace.root(),
            &[
                format!("dist/out-tsc/apps/{}/src/app/App.js", names.app),
                format!("dist/out-tsc/apps/{}/src/app/App.d.ts", names.app),
                format!("dist/out-tsc/libs/{}/src/index.js", names.lib),
                format!("dist/out-tsc/libs/{}/src/index.d.ts", names.lib),
            ],
        )
    }
}
