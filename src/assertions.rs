//! Output and filesystem assertions.
//!
//! Assertion failures surface as [`Error`] values so a scenario step fails
//! loudly with the offending command line and output attached.

use std::path::Path;

use crate::error::{Error, Result};
use crate::runner::CommandOutput;

/// Checks that every path in `files` exists under `root`.
pub fn check_files_exist<P: AsRef<Path>>(root: &Path, files: &[P]) -> Result<()> {
    for file in files {
        let path = root.join(file.as_ref());
        if !path.exists() {
            return Err(Error::MissingFile(path));
        }
        tracing::debug!(path = ?path, "found expected file");
    }
    Ok(())
}

/// Checks that a command exited successfully.
pub fn expect_success(output: &CommandOutput) -> Result<()> {
    if output.success() {
        Ok(())
    } else {
        Err(Error::Command {
            command: output.command.clone(),
            status: output.status,
            output: output.combined.clone(),
        })
    }
}

/// Checks that a command succeeded and its combined output contains `needle`.
pub fn expect_output_contains(output: &CommandOutput, needle: &str) -> Result<()> {
    expect_success(output)?;
    if output.combined.contains(needle) {
        Ok(())
    } else {
        Err(Error::OutputMismatch {
            command: output.command.clone(),
            needle: needle.to_string(),
        })
    }
}

/// Checks that a test-target run passed.
///
/// The underlying test runner reports per-suite failures with a FAIL marker
/// even when summarizing, so a clean run is a zero exit with no FAIL lines.
pub fn expect_tests_pass(output: &CommandOutput) -> Result<()> {
    expect_success(output)?;
    if output.combined.contains("FAIL") {
        return Err(Error::OutputMismatch {
            command: output.command.clone(),
            needle: "no FAIL markers".to_string(),
        });
    }
    Ok(())
}
