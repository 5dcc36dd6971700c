//! Raw shell command runner.
//!
//! Used for commands that are not workspace CLI subcommands, such as package
//! manager invocations for the typecheck step.

use std::path::PathBuf;

use crate::runner::{CommandRunner, CommandSpec};

/// Runner executing commands through `sh -c`.
pub struct ShellRunner {
    /// Working directory for every command.
    cwd: PathBuf,
}

impl ShellRunner {
    /// Creates a shell runner rooted at `cwd`.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self { cwd: cwd.into() }
    }
}

impl CommandRunner for ShellRunner {
    fn name(&self) -> &str {
        "shell"
    }

    fn command(&self, line: &str) -> CommandSpec {
        CommandSpec::new("sh", &self.cwd).arg("-c").arg(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::CommandRunner;

    #[test]
    fn command_wraps_line_in_sh() {
        let shell = ShellRunner::new("/work/ws");

        let spec = shell.command("npx tsc -p apps/my-app/tsconfig.app.json");

        assert_eq!(spec.program, "sh");
        assert_eq!(
            spec.args,
            vec!["-c", "npx tsc -p apps/my-app/tsconfig.app.json"]
        );
    }

    #[tokio::test]
    async fn shell_runner_executes_commands() {
        let shell = ShellRunner::new(std::env::temp_dir());

        let output = shell.run_checked("echo shell-ok").await.unwrap();

        assert!(output.combined.contains("shell-ok"));
    }
}
