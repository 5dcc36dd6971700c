//! Atlas Mobile E2E CLI
//!
//! Runs scenario files against the workspace CLI and prints browser runner
//! preset configurations.

use atlas_mobile_e2e::preset::{browser_preset, PresetOptions};
use atlas_mobile_e2e::{MobileSuite, Scenario, Settings};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("run") if args.len() >= 3 => run_scenario(&args[2], args.get(3)).await,
        Some("preset") if args.len() >= 3 => print_preset(&args[2], &args[3..]),
        _ => {
            usage();
            std::process::exit(1);
        }
    }
}

fn usage() {
    eprintln!("Usage:");
    eprintln!("  atlas-mobile-e2e run <scenario.yaml> [settings.toml]");
    eprintln!("  atlas-mobile-e2e preset <config-path> [--mobile] [--branded]");
    eprintln!();
    eprintln!("Environment variables:");
    eprintln!("  ATLAS_E2E_CLI   Workspace CLI binary to drive (default: atlas)");
    eprintln!("  ATLAS_E2E_KEEP  Keep scratch workspaces regardless of outcome");
}

async fn run_scenario(scenario_path: &str, settings_path: Option<&String>) {
    let scenario = match Scenario::load(scenario_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to load scenario: {}", e);
            std::process::exit(1);
        }
    };

    let settings = match settings_path {
        Some(path) => match Settings::load(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Failed to load settings: {}", e);
                std::process::exit(1);
            }
        },
        None => Settings::default(),
    }
    .with_env_overrides();

    let suite = MobileSuite::new(scenario, settings);
    let result = suite.run().await;

    println!("\n{}", "=".repeat(60));
    println!("Scenario: {}", result.scenario);
    println!("{}", "=".repeat(60));
    for step in &result.steps {
        let status = if step.passed { "ok" } else { "FAILED" };
        match &step.message {
            Some(message) => println!("  {:<16} {} - {}", step.name, status, message),
            None => println!("  {:<16} {}", step.name, status),
        }
    }
    if let Some(error) = &result.error {
        println!("Error: {}", error);
    }
    if let Some(workspace) = &result.workspace {
        if result.workspace_kept {
            println!("Workspace kept at {}", workspace.display());
        }
    }
    println!("Duration: {:?}", result.duration);
    println!("Result: {}", if result.passed { "PASSED" } else { "FAILED" });

    if !result.passed {
        std::process::exit(1);
    }
}

fn print_preset(config_path: &str, flags: &[String]) {
    let mut options = PresetOptions::default();
    for flag in flags {
        match flag.as_str() {
            "--mobile" => options.include_mobile_browsers = true,
            "--branded" => options.include_branded_browsers = true,
            other => {
                eprintln!("Unknown preset flag: {}", other);
                std::process::exit(1);
            }
        }
    }

    match browser_preset(config_path, &options) {
        Ok(config) => match serde_json::to_string_pretty(&config) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize preset: {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            eprintln!("Failed to build preset: {}", e);
            std::process::exit(1);
        }
    }
}
