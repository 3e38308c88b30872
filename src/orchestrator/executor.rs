//! External command execution: structured invocations, output streaming, exit checks.
//!
//! Every call into binutils/GCC build systems, `tar` and the NASM installer is
//! described by a [`CommandSpec`] (program + argument vector, never a shell
//! string) and executed through a [`CommandRunner`]. Output from the child is
//! streamed line by line into the [`LogCollector`].

use crate::error::BuildError;
use crate::LogCollector;
use futures::future::BoxFuture;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

/// One external invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Working directory for the child
    pub cwd: Option<PathBuf>,
    /// Variables removed from the inherited environment
    pub env_remove: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        CommandSpec {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env_remove: Vec::new(),
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

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.cwd = Some(dir.to_path_buf());
        self
    }

    pub fn env_remove<I, S>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.env_remove.extend(vars.into_iter().map(Into::into));
        self
    }

    /// Program file name without its directory, e.g. `make` or `configure`.
    pub fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.to_string_lossy().into_owned())
    }

    /// Display form for logs and error messages. Not meant to be fed to a shell.
    pub fn display(&self) -> String {
        let mut out = self.program.to_string_lossy().into_owned();
        for arg in &self.args {
            out.push(' ');
            out.push_str(arg);
        }
        out
    }
}

/// Runs external commands to completion, one at a time.
pub trait CommandRunner: Send + Sync {
    /// Run `spec` and wait for it. A non-zero exit is an error.
    fn run<'a>(&'a self, spec: &'a CommandSpec) -> BoxFuture<'a, Result<(), BuildError>>;
}

/// Production runner: spawns real processes with `tokio::process`.
pub struct SystemRunner {
    log_collector: Option<Arc<LogCollector>>,
}

impl SystemRunner {
    pub fn new(log_collector: Option<Arc<LogCollector>>) -> Self {
        SystemRunner { log_collector }
    }

    fn record(&self, line: String) {
        match self.log_collector {
            Some(ref collector) => collector.log_output(line),
            None => log::debug!("{}", line),
        }
    }

    async fn execute(&self, spec: &CommandSpec) -> Result<(), BuildError> {
        let display = spec.display();
        log::info!("[Exec] Running: {}", display);

        let mut command = Command::new(&spec.program);
        command.args(&spec.args);
        if let Some(ref cwd) = spec.cwd {
            command.current_dir(cwd);
        }
        for var in &spec.env_remove {
            command.env_remove(var);
        }
        command.stdin(Stdio::null());
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());

        let mut child = command.spawn().map_err(|e| BuildError::CommandFailed {
            cmd: display.clone(),
            reason: format!("failed to spawn: {}", e),
        })?;

        let stdout = child.stdout.take().ok_or_else(|| BuildError::CommandFailed {
            cmd: display.clone(),
            reason: "failed to capture stdout".to_string(),
        })?;
        let stderr = child.stderr.take().ok_or_else(|| BuildError::CommandFailed {
            cmd: display.clone(),
            reason: "failed to capture stderr".to_string(),
        })?;

        let mut stdout_lines = BufReader::new(stdout).lines();
        let mut stderr_lines = BufReader::new(stderr).lines();
        let mut stdout_closed = false;
        let mut stderr_closed = false;

        while !(stdout_closed && stderr_closed) {
            tokio::select! {
                line = stdout_lines.next_line(), if !stdout_closed => {
                    match line {
                        Ok(Some(line)) => self.record(line),
                        Ok(None) => stdout_closed = true,
                        Err(e) => {
                            self.record(format!("stdout read error: {}", e));
                            stdout_closed = true;
                        }
                    }
                }
                line = stderr_lines.next_line(), if !stderr_closed => {
                    match line {
                        Ok(Some(line)) => self.record(format!("[STDERR] {}", line)),
                        Ok(None) => stderr_closed = true,
                        Err(e) => {
                            self.record(format!("stderr read error: {}", e));
                            stderr_closed = true;
                        }
                    }
                }
            }
        }

        let status = child.wait().await.map_err(|e| BuildError::CommandFailed {
            cmd: display.clone(),
            reason: format!("failed to wait for process: {}", e),
        })?;

        if status.success() {
            log::debug!("[Exec] Finished: {}", display);
            return Ok(());
        }

        let reason = match status.code() {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        };
        log::error!("[Exec] {} failed: {}", display, reason);
        Err(BuildError::CommandFailed { cmd: display, reason })
    }
}

impl CommandRunner for SystemRunner {
    fn run<'a>(&'a self, spec: &'a CommandSpec) -> BoxFuture<'a, Result<(), BuildError>> {
        Box::pin(self.execute(spec))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_spec_builder() {
        let spec = CommandSpec::new("make")
            .arg("-j4")
            .args(["-C", "/tmp/build"])
            .current_dir(Path::new("/tmp"))
            .env_remove(["CC", "CXX"]);

        assert_eq!(spec.args, vec!["-j4", "-C", "/tmp/build"]);
        assert_eq!(spec.cwd, Some(PathBuf::from("/tmp")));
        assert_eq!(spec.env_remove, vec!["CC", "CXX"]);
        assert_eq!(spec.display(), "make -j4 -C /tmp/build");
    }

    #[test]
    fn test_program_name_strips_directory() {
        let spec = CommandSpec::new("/opt/toolchain/gcc-13.2.0/configure");
        assert_eq!(spec.program_name(), "configure");
        assert_eq!(CommandSpec::new("tar").program_name(), "tar");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_system_runner_success() {
        let runner = SystemRunner::new(None);
        let spec = CommandSpec::new("sh").args(["-c", "echo configured; echo warn >&2"]);
        assert!(runner.run(&spec).await.is_ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_system_runner_propagates_exit_code() {
        let runner = SystemRunner::new(None);
        let spec = CommandSpec::new("sh").args(["-c", "exit 3"]);
        match runner.run(&spec).await {
            Err(BuildError::CommandFailed { reason, .. }) => assert_eq!(reason, "exit code 3"),
            other => panic!("expected CommandFailed, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_system_runner_clears_environment() {
        std::env::set_var("TOOLCHAIN_BOOTSTRAP_PROBE", "leaked");
        let runner = SystemRunner::new(None);
        let spec = CommandSpec::new("sh")
            .args(["-c", "test -z \"$TOOLCHAIN_BOOTSTRAP_PROBE\""])
            .env_remove(["TOOLCHAIN_BOOTSTRAP_PROBE"]);
        assert!(runner.run(&spec).await.is_ok());
    }

    #[tokio::test]
    async fn test_system_runner_missing_program() {
        let runner = SystemRunner::new(None);
        let spec = CommandSpec::new("/nonexistent/definitely-not-a-tool");
        let result = runner.run(&spec).await;
        assert!(matches!(result, Err(BuildError::CommandFailed { .. })));
    }
}
