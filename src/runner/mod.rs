//! Command runners for driving external CLIs.
//!
//! A runner turns a one-line command into a [`CommandSpec`] and executes it
//! with stdout/stderr streamed line-by-line over a channel. The combined
//! output preserves arrival order, which is what the e2e assertions check.

mod cli;
mod pm;
mod shell;

pub use cli::{WorkspaceCli, NO_VCS_STATUS_ENV};
pub use pm::PackageManager;
pub use shell::ShellRunner;

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

use crate::error::{Error, Result};

/// A single line of output from a running command.
#[derive(Debug, Clone)]
pub enum CommandEvent {
    /// Standard output line.
    Stdout(String),
    /// Standard error line.
    Stderr(String),
}

impl CommandEvent {
    /// Returns the line text regardless of stream.
    pub fn line(&self) -> &str {
        match self {
            Self::Stdout(line) | Self::Stderr(line) => line,
        }
    }
}

/// A fully-resolved command invocation.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    /// Program to execute.
    pub program: String,
    /// Arguments.
    pub args: Vec<String>,
    /// Working directory.
    pub cwd: PathBuf,
    /// Extra environment variables.
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    /// Creates a spec for `program` running in `cwd`.
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
            env: Vec::new(),
        }
    }

    /// Appends an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Adds an environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Human-readable command line, used in errors and logs.
    pub fn display(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    /// Builds the tokio command with piped output and no stdin.
    pub(crate) fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .current_dir(&self.cwd)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(Stdio::null());
        for (key, value) in &self.env {
            command.env(key, value);
        }
        command
    }
}

/// Collected output of a finished command.
#[derive(Debug)]
pub struct CommandOutput {
    /// Stdout text.
    pub stdout: String,
    /// Stderr text.
    pub stderr: String,
    /// Stdout and stderr interleaved in arrival order.
    pub combined: String,
    /// Exit status.
    pub status: ExitStatus,
    /// Command line that produced this output.
    pub command: String,
}

impl CommandOutput {
    /// Returns whether the command exited successfully.
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

/// Trait for command runners.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Returns the name of this runner.
    fn name(&self) -> &str;

    /// Resolves a one-line command into a concrete invocation.
    fn command(&self, line: &str) -> CommandSpec;

    /// Runs a command to completion, collecting its output.
    async fn run(&self, line: &str) -> Result<CommandOutput> {
        let spec = self.command(line);
        tracing::debug!(runner = %self.name(), command = %spec.display(), "running command");
        run_spec(spec).await
    }

    /// Runs a command and fails on a non-zero exit status.
    async fn run_checked(&self, line: &str) -> Result<CommandOutput> {
        let output = self.run(line).await?;
        if output.success() {
            Ok(output)
        } else {
            Err(Error::Command {
                command: output.command.clone(),
                status: output.status,
                output: output.combined,
            })
        }
    }
}

/// Runs a resolved spec to completion, collecting its output.
pub async fn run_spec(spec: CommandSpec) -> Result<CommandOutput> {
    let command = spec.display();
    let (tx, mut rx) = mpsc::channel(256);

    let (status, (stdout, stderr, combined)) = tokio::join!(stream_spec(spec, tx), async move {
        let mut stdout = String::new();
        let mut stderr = String::new();
        let mut combined = String::new();
        while let Some(event) = rx.recv().await {
            match &event {
                CommandEvent::Stdout(line) => {
                    stdout.push_str(line);
                    stdout.push('\n');
                }
                CommandEvent::Stderr(line) => {
                    stderr.push_str(line);
                    stderr.push('\n');
                }
            }
            combined.push_str(event.line());
            combined.push('\n');
        }
        (stdout, stderr, combined)
    });

    Ok(CommandOutput {
        stdout,
        stderr,
        combined,
        status: status?,
        command,
    })
}

/// Spawns a spec and streams its output line-by-line to `tx`.
///
/// Returns the exit status once both streams close.
pub async fn stream_spec(spec: CommandSpec, tx: mpsc::Sender<CommandEvent>) -> Result<ExitStatus> {
    let display = spec.display();
    let mut child = spec.to_command().spawn().map_err(|e| Error::Launch {
        command: display.clone(),
        reason: e.to_string(),
    })?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    stream_child_output(stdout, stderr, tx).await;

    child.wait().await.map_err(|e| Error::Launch {
        command: display,
        reason: format!("failed to wait: {}", e),
    })
}

/// Drains a child's stdout/stderr concurrently, forwarding lines to `tx`.
pub(crate) async fn stream_child_output(
    stdout: Option<tokio::process::ChildStdout>,
    stderr: Option<tokio::process::ChildStderr>,
    tx: mpsc::Sender<CommandEvent>,
) {
    let mut stdout_lines = stdout.map(|s| BufReader::new(s).lines());
    let mut stderr_lines = stderr.map(|s| BufReader::new(s).lines());
    let mut stdout_open = stdout_lines.is_some();
    let mut stderr_open = stderr_lines.is_some();

    while stdout_open || stderr_open {
        tokio::select! {
            line = next_line(&mut stdout_lines), if stdout_open => {
                match line {
                    Some(line) => {
                        if tx.send(CommandEvent::Stdout(line)).await.is_err() {
                            break;
                        }
                    }
                    None => stdout_open = false,
                }
            }
            line = next_line(&mut stderr_lines), if stderr_open => {
                match line {
                    Some(line) => {
                        if tx.send(CommandEvent::Stderr(line)).await.is_err() {
                            break;
                        }
                    }
                    None => stderr_open = false,
                }
            }
        }
    }
}

async fn next_line<R>(lines: &mut Option<tokio::io::Lines<BufReader<R>>>) -> Option<String>
where
    R: tokio::io::AsyncRead + Unpin,
{
    match lines {
        Some(lines) => match lines.next_line().await {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "error reading child output");
                None
            }
        },
        None => None,
    }
}
