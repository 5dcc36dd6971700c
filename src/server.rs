//! Dev-server lifecycle management.
//!
//! The start step launches a long-running dev server, waits until its output
//! matches a readiness predicate, then tears the whole process tree down and
//! frees the listening port.

use std::time::Instant;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{Error, Result};
use crate::runner::{stream_child_output, CommandEvent, CommandSpec};
use crate::settings::TimeoutConfig;

/// A spawned long-running dev-server process.
pub struct DevServer {
    child: tokio::process::Child,
    rx: mpsc::Receiver<CommandEvent>,
    transcript: String,
    command: String,
    _reader: JoinHandle<()>,
}

impl DevServer {
    /// Spawns the dev server described by `spec`.
    ///
    /// The child is placed in its own process group so the whole tree can be
    /// killed on shutdown.
    pub fn spawn(spec: CommandSpec) -> Result<Self> {
        let command = spec.display();
        let mut cmd = spec.to_command();
        cmd.kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);

        tracing::info!(command = %command, "spawning dev server");

        let mut child = cmd.spawn().map_err(|e| Error::Launch {
            command: command.clone(),
            reason: e.to_string(),
        })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let (tx, rx) = mpsc::channel(256);
        let reader = tokio::spawn(stream_child_output(stdout, stderr, tx));

        Ok(Self {
            child,
            rx,
            transcript: String::new(),
            command,
            _reader: reader,
        })
    }

    /// Returns everything the server has written so far.
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// Waits until the accumulated output satisfies `ready`.
    ///
    /// Gives up when no new output arrives within the idle timeout or when
    /// the total timeout elapses. If the server exits before becoming ready,
    /// the exit status and transcript are reported instead.
    pub async fn wait_until(
        &mut self,
        ready: impl Fn(&str) -> bool,
        timeouts: TimeoutConfig,
    ) -> Result<()> {
        let start = Instant::now();
        let mut last_activity = start;

        loop {
            if ready(&self.transcript) {
                return Ok(());
            }

            let idle_deadline = last_activity + timeouts.idle_timeout;
            let total_deadline = start + timeouts.total_timeout;
            let deadline = idle_deadline.min(total_deadline);
            if Instant::now() >= deadline {
                return Err(Error::ReadinessTimeout(start.elapsed()));
            }

            match tokio::time::timeout_at(deadline.into(), self.rx.recv()).await {
                Ok(Some(event)) => {
                    self.transcript.push_str(event.line());
                    self.transcript.push('\n');
                    last_activity = Instant::now();
                }
                Ok(None) => {
                    // Output closed: the server exited before becoming ready.
                    let status = self.child.wait().await.map_err(|e| Error::Launch {
                        command: self.command.clone(),
                        reason: format!("failed to wait: {}", e),
                    })?;
                    return Err(Error::Command {
                        command: self.command.clone(),
                        status,
                        output: self.transcript.clone(),
                    });
                }
                Err(_) => {
                    return Err(Error::ReadinessTimeout(start.elapsed()));
                }
            }
        }
    }

    /// Terminates the server's entire process tree and reaps the child.
    pub async fn shutdown(mut self) -> Result<()> {
        tracing::info!(command = %self.command, "shutting down dev server");

        #[cfg(unix)]
        if let Some(pid) = self.child.id() {
            // The child leads its own process group, so -pid addresses the tree.
            let killed = tokio::process::Command::new("kill")
                .args(["-9", "--", &format!("-{}", pid)])
                .output()
                .await
                .map_err(|e| Error::Launch {
                    command: "kill".to_string(),
                    reason: e.to_string(),
                })?;
            if !killed.status.success() {
                tracing::debug!(pid, "process group already gone");
            }
        }

        // Direct kill covers the non-unix path and an already-collected group.
        let _ = self.child.start_kill();
        self.child.wait().await.map_err(|e| Error::Launch {
            command: self.command.clone(),
            reason: format!("failed to reap: {}", e),
        })?;

        Ok(())
    }
}

/// Kills any process listening on `port` and verifies the port is free.
pub async fn kill_port(port: u16) -> Result<()> {
    // Best effort: lsof may be absent or report nothing.
    let listed = tokio::process::Command::new("sh")
        .arg("-c")
        .arg(format!("lsof -t -i tcp:{}", port))
        .output()
        .await;

    if let Ok(out) = listed {
        for pid in String::from_utf8_lossy(&out.stdout).split_whitespace() {
            tracing::debug!(pid = %pid, port, "killing port listener");
            let _ = tokio::process::Command::new("kill")
                .args(["-9", pid])
                .output()
                .await;
        }
    }

    let mut reason = String::from("unknown");
    for _ in 0..20 {
        match std::net::TcpListener::bind(("127.0.0.1", port)) {
            Ok(_) => return Ok(()),
            Err(e) => {
                reason = e.to_string();
                tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            }
        }
    }

    Err(Error::Port { port, reason })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn shell_spec(script: &str) -> CommandSpec {
        CommandSpec::new("sh", std::env::temp_dir())
            .arg("-c")
            .arg(script)
    }

    fn short_timeouts() -> TimeoutConfig {
        TimeoutConfig {
            idle_timeout: Duration::from_millis(500),
            total_timeout: Duration::from_secs(2),
        }
    }

    #[tokio::test]
    async fn wait_until_sees_readiness_marker() {
        let mut server =
            DevServer::spawn(shell_spec("echo starting; echo 'server ready'; sleep 5")).unwrap();

        server
            .wait_until(|out| out.contains("server ready"), short_timeouts())
            .await
            .unwrap();

        assert!(server.transcript().contains("starting"));
        server.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn wait_until_times_out_on_silence() {
        let mut server = DevServer::spawn(shell_spec("sleep 5")).unwrap();

        let result = server
            .wait_until(|out| out.contains("never"), short_timeouts())
            .await;

        assert!(matches!(result, Err(Error::ReadinessTimeout(_))));
        server.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn wait_until_reports_early_exit() {
        let mut server = DevServer::spawn(shell_spec("echo wrong marker")).unwrap();

        let result = server
            .wait_until(|out| out.contains("never"), short_timeouts())
            .await;

        match result {
            Err(Error::Command { output, .. }) => assert!(output.contains("wrong marker")),
            other => panic!("expected Command error, got {:?}", other),
        }
        server.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn shutdown_kills_process_tree() {
        let mut server =
            DevServer::spawn(shell_spec("echo up; sleep 30")).unwrap();
        server
            .wait_until(|out| out.contains("up"), short_timeouts())
            .await
            .unwrap();

        server.shutdown().await.unwrap();
    }

    #[test]
    fn kill_port_succeeds_on_free_port() {
        // Nothing listens here; the bind probe must succeed immediately.
        tokio_test::block_on(kill_port(47123)).unwrap();
    }
}
