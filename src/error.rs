//! Error types for the atlas-mobile-e2e harness.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Top-level error type for harness operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to launch an external command.
    #[error("failed to launch `{command}`: {reason}")]
    Launch { command: String, reason: String },

    /// An external command exited with a non-zero status.
    #[error("`{command}` exited with {status}\n{output}")]
    Command {
        command: String,
        status: std::process::ExitStatus,
        output: String,
    },

    /// An expected file was not produced.
    #[error("expected file missing: {0}")]
    MissingFile(PathBuf),

    /// Command output did not contain an expected marker.
    #[error("output of `{command}` did not contain {needle:?}")]
    OutputMismatch { command: String, needle: String },

    /// The dev server did not emit its readiness marker in time.
    #[error("dev server not ready after {0:?}")]
    ReadinessTimeout(Duration),

    /// A TCP port could not be freed.
    #[error("port {port} could not be freed: {reason}")]
    Port { port: u16, reason: String },

    /// Workspace scaffolding or file manipulation failed.
    #[error("workspace error: {0}")]
    Workspace(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON read/write error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Scenario or settings configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for harness operations.
pub type Result<T> = std::result::Result<T, Error>;
