//! Preset property tests.
//!
//! Pin down the observable contract of the browser preset: project matrix
//! composition, computed output directories, and CI policy.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use atlas_mobile_e2e::preset::{browser_preset_with_ci, PresetOptions};

/// Lays out `<root>/atlas.json` and `<root>/apps/web-e2e/runner.config.ts`,
/// returning the config path.
fn workspace_with_config(temp: &TempDir) -> PathBuf {
    std::fs::write(temp.path().join("atlas.json"), "{}").unwrap();
    let project = temp.path().join("apps").join("web-e2e");
    std::fs::create_dir_all(&project).unwrap();
    let config = project.join("runner.config.ts");
    std::fs::write(&config, "export default {}").unwrap();
    config
}

fn names(config: &atlas_mobile_e2e::RunnerConfig) -> Vec<&str> {
    config.projects.iter().map(|p| p.name.as_str()).collect()
}

#[test]
fn default_matrix_is_exactly_three_desktop_browsers() {
    let temp = TempDir::new().unwrap();
    let config_path = workspace_with_config(&temp);

    let config = browser_preset_with_ci(&config_path, &PresetOptions::default(), false).unwrap();

    assert_eq!(names(&config), vec!["chromium", "firefox", "webkit"]);
}

#[test]
fn mobile_flag_appends_two_mobile_entries() {
    let temp = TempDir::new().unwrap();
    let config_path = workspace_with_config(&temp);
    let options = PresetOptions::default().with_mobile_browsers();

    let config = browser_preset_with_ci(&config_path, &options, false).unwrap();

    assert_eq!(
        names(&config),
        vec!["chromium", "firefox", "webkit", "Mobile Chrome", "Mobile Safari"]
    );
}

#[test]
fn branded_flag_appends_two_branded_entries() {
    let temp = TempDir::new().unwrap();
    let config_path = workspace_with_config(&temp);
    let options = PresetOptions::default().with_branded_browsers();

    let config = browser_preset_with_ci(&config_path, &options, false).unwrap();

    assert_eq!(
        names(&config),
        vec!["chromium", "firefox", "webkit", "Microsoft Edge", "Google Chrome"]
    );

    let edge = &config.projects[3];
    assert_eq!(edge.use_.channel.as_deref(), Some("msedge"));
    let chrome = &config.projects[4];
    assert_eq!(chrome.use_.channel.as_deref(), Some("chrome"));
}

#[test]
fn both_flags_yield_all_seven_entries() {
    let temp = TempDir::new().unwrap();
    let config_path = workspace_with_config(&temp);
    let options = PresetOptions::default()
        .with_mobile_browsers()
        .with_branded_browsers();

    let config = browser_preset_with_ci(&config_path, &options, false).unwrap();

    assert_eq!(config.projects.len(), 7);
    assert_eq!(
        names(&config),
        vec![
            "chromium",
            "firefox",
            "webkit",
            "Mobile Chrome",
            "Mobile Safari",
            "Microsoft Edge",
            "Google Chrome"
        ]
    );
}

#[test]
fn output_dirs_are_relative_to_config_dir_under_dist() {
    let temp = TempDir::new().unwrap();
    let config_path = workspace_with_config(&temp);

    let config = browser_preset_with_ci(&config_path, &PresetOptions::default(), false).unwrap();

    assert_eq!(
        config.output_dir,
        Path::new("../../dist/.playwright/apps/web-e2e/test-output")
    );
    let report_dir = &config.reporter[0].1.output_folder;
    assert_eq!(
        report_dir,
        Path::new("../../dist/.playwright/apps/web-e2e/playwright-report")
    );
}

#[test]
fn config_at_workspace_root_uses_plain_dist_paths() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("atlas.json"), "{}").unwrap();
    let config_path = temp.path().join("runner.config.ts");
    std::fs::write(&config_path, "export default {}").unwrap();

    let config = browser_preset_with_ci(&config_path, &PresetOptions::default(), false).unwrap();

    assert_eq!(
        config.output_dir,
        Path::new("dist/.playwright/test-output")
    );
}

#[test]
fn ci_policy_switches_retries_and_workers() {
    let temp = TempDir::new().unwrap();
    let config_path = workspace_with_config(&temp);

    let ci = browser_preset_with_ci(&config_path, &PresetOptions::default(), true).unwrap();
    assert_eq!(ci.retries, 2);
    assert_eq!(ci.workers, Some(1));
    assert!(ci.forbid_only);

    let local = browser_preset_with_ci(&config_path, &PresetOptions::default(), false).unwrap();
    assert_eq!(local.retries, 0);
    assert_eq!(local.workers, None);
    assert!(!local.forbid_only);
}

#[test]
fn test_dir_defaults_and_overrides() {
    let temp = TempDir::new().unwrap();
    let config_path = workspace_with_config(&temp);

    let default = browser_preset_with_ci(&config_path, &PresetOptions::default(), false).unwrap();
    assert_eq!(default.test_dir, "./src");

    let options = PresetOptions::default().with_test_dir("./e2e");
    let custom = browser_preset_with_ci(&config_path, &options, false).unwrap();
    assert_eq!(custom.test_dir, "./e2e");
}

#[test]
fn parallelism_is_always_on() {
    let temp = TempDir::new().unwrap();
    let config_path = workspace_with_config(&temp);

    for ci in [false, true] {
        let config = browser_preset_with_ci(&config_path, &PresetOptions::default(), ci).unwrap();
        assert!(config.fully_parallel);
    }
}
