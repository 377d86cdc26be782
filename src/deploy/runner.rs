use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::errors::DeployError;

/// One external program invocation: program, argv and working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Captured result of a command run to completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    /// Human-readable exit status, e.g. `exit status: 1`.
    pub status: String,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Turn a non-zero exit into `DeployError::CommandFailed`.
    pub fn check(self, spec: &CommandSpec) -> Result<Self, DeployError> {
        if self.success {
            Ok(self)
        } else {
            Err(DeployError::CommandFailed {
                command: spec.to_string(),
                status: self.status,
                stderr: self.stderr,
            })
        }
    }
}

/// Abstraction over process execution for testability.
/// Real implementation: `SystemRunner`. Test double: `FakeRunner`.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run to completion, capturing stdout and stderr.
    async fn output(&self, spec: &CommandSpec) -> Result<CommandOutput, DeployError>;

    /// Start the command and return without waiting for it. Output is discarded.
    async fn spawn_detached(&self, spec: &CommandSpec) -> Result<(), DeployError>;
}

/// Runs commands as real child processes on the tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    fn command(spec: &CommandSpec) -> Command {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args).stdin(Stdio::null());
        if let Some(ref cwd) = spec.cwd {
            cmd.current_dir(cwd);
        }
        cmd
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn output(&self, spec: &CommandSpec) -> Result<CommandOutput, DeployError> {
        debug!(command = %spec, "running");
        let output = Self::command(spec)
            .output()
            .await
            .map_err(|source| DeployError::SpawnFailed {
                command: spec.to_string(),
                source,
            })?;

        Ok(CommandOutput {
            success: output.status.success(),
            status: output.status.to_string(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    async fn spawn_detached(&self, spec: &CommandSpec) -> Result<(), DeployError> {
        let mut child = Self::command(spec)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| DeployError::SpawnFailed {
                command: spec.to_string(),
                source,
            })?;

        let command = spec.to_string();
        info!(command = %command, pid = child.id(), "started in background");

        // Reap the child so it does not linger as a zombie.
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) if status.success() => {
                    info!(command = %command, "background command finished")
                }
                Ok(status) => {
                    warn!(command = %command, status = %status, "background command failed")
                }
                Err(e) => warn!(command = %command, error = %e, "failed to wait on background command"),
            }
        });

        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_spec_display() {
        let spec = CommandSpec::new("docker")
            .args(["compose", "up"])
            .arg("-d")
            .current_dir("/tmp");
        assert_eq!(spec.to_string(), "docker compose up -d");
        assert_eq!(spec.cwd.as_deref(), Some(Path::new("/tmp")));
    }

    #[test]
    fn test_check_maps_failure() {
        let spec = CommandSpec::new("docker").arg("stop").arg("web");
        let out = CommandOutput {
            success: false,
            status: "exit status: 1".into(),
            stdout: String::new(),
            stderr: "No such container: web".into(),
        };
        match out.check(&spec) {
            Err(DeployError::CommandFailed {
                command, stderr, ..
            }) => {
                assert_eq!(command, "docker stop web");
                assert_eq!(stderr, "No such container: web");
            }
            other => panic!("Expected CommandFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_system_runner_captures_output() {
        let spec = CommandSpec::new("sh").args(["-c", "echo out; echo err >&2"]);
        let out = SystemRunner.output(&spec).await.unwrap();
        assert!(out.success);
        assert_eq!(out.stdout.trim(), "out");
        assert_eq!(out.stderr.trim(), "err");
    }

    #[tokio::test]
    async fn test_system_runner_reports_exit_status() {
        let spec = CommandSpec::new("sh").args(["-c", "exit 3"]);
        let out = SystemRunner.output(&spec).await.unwrap();
        assert!(!out.success);
        assert!(out.status.contains('3'));
    }

    #[tokio::test]
    async fn test_system_runner_runs_in_cwd() {
        let dir = tempfile::tempdir().unwrap();
        let spec = CommandSpec::new("pwd").current_dir(dir.path());
        let out = SystemRunner.output(&spec).await.unwrap();
        let reported = PathBuf::from(out.stdout.trim()).canonicalize().unwrap();
        assert_eq!(reported, dir.path().canonicalize().unwrap());
    }

    #[tokio::test]
    async fn test_system_runner_spawn_failure() {
        let spec = CommandSpec::new("/nonexistent/launchpad-test-binary");
        let err = SystemRunner.output(&spec).await.unwrap_err();
        assert!(matches!(err, DeployError::SpawnFailed { .. }));
        let err = SystemRunner.spawn_detached(&spec).await.unwrap_err();
        assert!(matches!(err, DeployError::SpawnFailed { .. }));
    }

    #[tokio::test]
    async fn test_system_runner_detached_returns_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("done");
        let spec = CommandSpec::new("sh")
            .arg("-c")
            .arg(format!("sleep 0.2 && touch {}", marker.display()));

        SystemRunner.spawn_detached(&spec).await.unwrap();
        assert!(!marker.exists());

        for _ in 0..50 {
            if marker.exists() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        }
        assert!(marker.exists());
    }
}
