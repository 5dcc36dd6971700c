//! Hermetic end-to-end tests.
//!
//! These run the full scenario orchestration against a stub workspace CLI
//! (a shell script) that mimics the command surface: scaffold layout,
//! success markers, produced artifacts, and a dev server that announces
//! readiness and then blocks.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use atlas_mobile_e2e::{MobileSuite, Scenario, Settings};

const STUB_CLI: &str = r#"#!/bin/sh
# Stub workspace CLI covering the mobile plugin command surface.
cmd="$1"; shift
case "$cmd" in
  new)
    mkdir -p "$1"
    echo "Workspace $1 created"
    ;;
  generate)
    kind="$1"; name="$2"
    case "$kind" in
      mobile:application)
        mkdir -p "apps/$name/src/app"
        printf 'export function App() {\n  return null;\n}\n' > "apps/$name/src/app/App.tsx"
        printf '{"app":{"name":"%s","ios":{},"android":{}}}\n' "$name" > "apps/$name/app.json"
        echo "Generated application $name"
        ;;
      mobile:library)
        mkdir -p "libs/$name/src"
        printf 'export {};\n' > "libs/$name/src/index.ts"
        echo "Generated library $name"
        ;;
      mobile:component)
        echo "Generated component $name"
        ;;
      *)
        echo "Unknown generator $kind" >&2
        exit 1
        ;;
    esac
    ;;
  test)
    echo "PASS apps/$1"
    echo "Ran all test suites."
    ;;
  lint)
    echo "All files pass linting."
    ;;
  export)
    name="$1"
    if [ "$STUB_BREAK_EXPORT" = "1" ]; then
      echo "Export crashed" >&2
      exit 1
    fi
    mkdir -p "dist/apps/$name"
    echo '{"bundles":{}}' > "dist/apps/$name/metadata.json"
    echo "Export was successful. Your exported files can be found in dist/apps/$name"
    ;;
  export-web)
    name="$1"
    mkdir -p "apps/$name/dist"
    echo '<!doctype html>' > "apps/$name/dist/index.html"
    echo '{}' > "apps/$name/dist/metadata.json"
    echo "Web export complete"
    ;;
  prebuild)
    if [ "$ATLAS_NO_VCS_STATUS" != "true" ]; then
      echo "Refusing to prebuild with VCS status check enabled" >&2
      exit 1
    fi
    if ! grep -q 'bundleIdentifier' "apps/$1/app.json"; then
      echo "Manifest missing bundle identifier" >&2
      exit 1
    fi
    echo "Config synced"
    ;;
  install)
    echo "Successfully ran target install"
    ;;
  start)
    name="$1"
    port=8081
    for arg in "$@"; do
      case "$arg" in
        --port=*) port="${arg#--port=}" ;;
      esac
    done
    echo "Starting dev server for $name"
    echo "Packager is ready at http://localhost:${port}"
    sleep 30
    ;;
  build)
    name="$1"
    mkdir -p "dist/libs/$name/src"
    echo 'module.exports = {};' > "dist/libs/$name/index.js"
    echo 'export {};' > "dist/libs/$name/src/index.d.ts"
    echo "Built library $name"
    ;;
  *)
    echo "Unknown command $cmd" >&2
    exit 1
    ;;
esac
"#;

fn write_stub_cli(dir: &Path) -> PathBuf {
    let path = dir.join("atlas-stub");
    std::fs::write(&path, STUB_CLI).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

fn stub_settings(temp: &TempDir) -> Settings {
    let cli = write_stub_cli(temp.path());
    Settings::default()
        .with_cli_bin(cli.to_string_lossy())
        .with_scratch_root(temp.path().join("scratch"))
}

fn stub_scenario(name: &str, port: u16) -> Scenario {
    let mut scenario = Scenario::new(name);
    scenario.port = port;
    scenario.timeout = 30;
    scenario.idle_timeout = 10;
    scenario.run_install = true;
    // The stub workspace has no package manager toolchain.
    scenario.run_typecheck = false;
    scenario
}

#[tokio::test]
async fn full_lifecycle_passes_against_stub_cli() {
    let temp = TempDir::new().unwrap();
    let mut settings = stub_settings(&temp);
    settings.keep_on_success = true;

    let scenario = stub_scenario("stub-lifecycle", 8123);
    let result = MobileSuite::new(scenario, settings).run().await;

    assert!(result.error.is_none(), "run aborted: {:?}", result.error);
    for step in &result.steps {
        assert!(step.passed, "step {} failed: {:?}", step.name, step.message);
    }
    assert!(result.passed);

    let names: Vec<&str> = result.steps.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "test-and-lint",
            "export",
            "export-web",
            "prebuild",
            "install",
            "start",
            "build-library"
        ]
    );

    // The workspace was kept: the prebuild step must have patched the
    // manifest before the stub checked it.
    let workspace = result.workspace.expect("workspace path");
    assert!(result.workspace_kept);
    let apps: Vec<_> = std::fs::read_dir(workspace.join("apps"))
        .unwrap()
        .flatten()
        .collect();
    assert_eq!(apps.len(), 1);
    let manifest = std::fs::read_to_string(apps[0].path().join("app.json")).unwrap();
    assert!(manifest.contains("dev.atlas.e2e"));

    std::fs::remove_dir_all(&workspace).unwrap();
}

#[tokio::test]
async fn export_failure_is_recorded_and_remaining_steps_still_run() {
    let temp = TempDir::new().unwrap();
    let settings = stub_settings(&temp);

    let mut scenario = stub_scenario("stub-broken-export", 8127);
    scenario
        .env
        .insert("STUB_BREAK_EXPORT".to_string(), "1".to_string());

    let result = MobileSuite::new(scenario, settings).run().await;

    assert!(!result.passed);
    let export = result
        .steps
        .iter()
        .find(|s| s.name == "export")
        .expect("export step recorded");
    assert!(!export.passed);
    assert!(export
        .message
        .as_deref()
        .unwrap_or_default()
        .contains("export"));

    // Later steps still ran and passed.
    let build = result
        .steps
        .iter()
        .find(|s| s.name == "build-library")
        .expect("build step recorded");
    assert!(build.passed);

    // Failed runs keep the workspace for debugging.
    assert!(result.workspace_kept);
    let workspace = result.workspace.expect("workspace path");
    assert!(workspace.exists());
    std::fs::remove_dir_all(&workspace).unwrap();
}

#[tokio::test]
async fn successful_run_cleans_up_scratch_workspace() {
    let temp = TempDir::new().unwrap();
    let settings = stub_settings(&temp);

    let scenario = stub_scenario("stub-cleanup", 8131);
    let result = MobileSuite::new(scenario, settings).run().await;

    assert!(result.passed);
    assert!(!result.workspace_kept);
    assert!(!result.workspace.expect("workspace path").exists());
}
