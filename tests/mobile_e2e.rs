//! End-to-end tests against a real workspace CLI.
//!
//! These drive the actual `atlas` binary and need it on PATH (or pointed at
//! via `ATLAS_E2E_CLI`), plus whatever toolchain the mobile framework pulls
//! in.
//!
//! Run with: `cargo test --test mobile_e2e -- --ignored`
//!
//! Environment variables:
//! - `ATLAS_E2E_CLI` - workspace CLI binary (default: atlas)
//! - `ATLAS_E2E_KEEP=1` - keep scratch workspaces for inspection

use std::path::PathBuf;

use atlas_mobile_e2e::{MobileSuite, Scenario, ScenarioResult, Settings};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn print_result(result: &ScenarioResult) {
    println!("\n=== Scenario Result ===");
    println!("Scenario: {}", result.scenario);
    println!("Passed: {}", result.passed);
    println!("Duration: {:?}", result.duration);

    for step in &result.steps {
        let status = if step.passed { "ok" } else { "FAILED" };
        match &step.message {
            Some(message) => println!("  {:<16} {} - {}", step.name, status, message),
            None => println!("  {:<16} {}", step.name, status),
        }
    }

    if let Some(workspace) = &result.workspace {
        if result.workspace_kept {
            println!("Workspace kept at {}", workspace.display());
        }
    }

    if let Some(error) = &result.error {
        println!("Error: {}", error);
    }
}

#[tokio::test]
#[ignore] // Run manually with --ignored
async fn full_lifecycle() {
    let scenario = Scenario::load(fixtures_dir().join("full-lifecycle.yaml"))
        .expect("failed to load scenario");
    let settings = Settings::default().with_env_overrides();

    let result = MobileSuite::new(scenario, settings).run().await;
    print_result(&result);

    assert!(result.passed, "scenario failed: {:?}", result.error);
}

#[tokio::test]
#[ignore]
async fn full_lifecycle_with_install() {
    let scenario = Scenario::load(fixtures_dir().join("with-install.yaml"))
        .expect("failed to load scenario");
    let settings = Settings::default().with_env_overrides();

    let result = MobileSuite::new(scenario, settings).run().await;
    print_result(&result);

    assert!(result.passed, "scenario failed: {:?}", result.error);
}
