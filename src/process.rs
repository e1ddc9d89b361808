//! Centralized command execution with consistent error handling.
//!
//! Every external tool (npm, npx prebuild, node) is described by a [`Cmd`]
//! and executed through a [`CommandRunner`]. Production code uses
//! [`SystemRunner`]; tests inject a runner that records invocations and
//! returns scripted exit codes.

use anyhow::{bail, Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Result of a command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandResult {
    /// Exit code, `None` if terminated by signal.
    pub code: Option<i32>,
    /// Captured stdout as a string.
    pub stdout: String,
    /// Captured stderr as a string.
    pub stderr: String,
}

impl CommandResult {
    /// Returns true if the command exited successfully.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Get the exit code, or -1 if terminated by signal.
    pub fn code(&self) -> i32 {
        self.code.unwrap_or(-1)
    }

    /// Get stdout, trimmed of whitespace.
    pub fn stdout_trimmed(&self) -> &str {
        self.stdout.trim()
    }

    /// Get stderr, trimmed of whitespace.
    pub fn stderr_trimmed(&self) -> &str {
        self.stderr.trim()
    }
}

/// Capability to execute external commands.
pub trait CommandRunner {
    /// Run to completion with stdout/stderr captured.
    fn output(&self, cmd: &Cmd) -> Result<CommandResult>;

    /// Run to completion with inherited stdio. Returns the exit code
    /// (`None` if terminated by signal).
    fn status(&self, cmd: &Cmd) -> Result<Option<i32>>;
}

/// Runs commands as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    fn command(cmd: &Cmd) -> Command {
        // Resolving through PATH picks up `npx.cmd`/`npm.cmd` shims on Windows.
        let program = which::which(&cmd.program).unwrap_or_else(|_| PathBuf::from(&cmd.program));
        let mut command = Command::new(program);
        command.args(&cmd.args);
        if let Some(ref dir) = cmd.current_dir {
            command.current_dir(dir);
        }
        command
    }
}

impl CommandRunner for SystemRunner {
    fn output(&self, cmd: &Cmd) -> Result<CommandResult> {
        let output = Self::command(cmd)
            .output()
            .with_context(|| format!("Failed to execute '{}'. Is it installed?", cmd.program))?;

        Ok(CommandResult {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn status(&self, cmd: &Cmd) -> Result<Option<i32>> {
        let status = Self::command(cmd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .with_context(|| format!("Failed to execute '{}'. Is it installed?", cmd.program))?;
        Ok(status.code())
    }
}

/// Builder for configuring command execution.
#[derive(Debug, Clone)]
pub struct Cmd {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    /// Custom error message prefix.
    error_prefix: Option<String>,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new(program: impl AsRef<str>) -> Self {
        Self {
            program: program.as_ref().to_string(),
            args: Vec::new(),
            current_dir: None,
            error_prefix: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<str>) -> Self {
        self.args.push(arg.as_ref().to_string());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            self.args.push(arg.as_ref().to_string());
        }
        self
    }

    /// Add an argument only when `cond` holds.
    pub fn arg_if(self, cond: bool, arg: impl AsRef<str>) -> Self {
        if cond {
            self.arg(arg)
        } else {
            self
        }
    }

    /// Set the working directory.
    pub fn dir(mut self, dir: &Path) -> Self {
        self.current_dir = Some(dir.to_path_buf());
        self
    }

    /// Set a custom error message prefix.
    pub fn error_msg(mut self, msg: impl AsRef<str>) -> Self {
        self.error_prefix = Some(msg.as_ref().to_string());
        self
    }

    pub fn get_program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    fn failure_prefix(&self) -> String {
        self.error_prefix
            .clone()
            .unwrap_or_else(|| format!("'{}' failed", self.program))
    }

    /// Run the command through `runner` and capture output.
    pub fn run_with(self, runner: &dyn CommandRunner) -> Result<CommandResult> {
        tracing::debug!("exec: {}", self);
        let result = runner.output(&self)?;

        if !result.success() {
            let prefix = self.failure_prefix();
            let stderr = result.stderr_trimmed();
            if stderr.is_empty() {
                bail!("{} (exit code {})", prefix, result.code());
            } else {
                bail!("{} (exit code {}):\n{}", prefix, result.code(), stderr);
            }
        }

        Ok(result)
    }

    /// Run the command through `runner` with inherited stdio.
    ///
    /// Output goes directly to the terminal. Use for long-running commands
    /// where the user should see progress (installs, native builds).
    pub fn run_interactive_with(self, runner: &dyn CommandRunner) -> Result<Option<i32>> {
        tracing::debug!("exec: {}", self);
        let code = runner.status(&self)?;

        if code != Some(0) {
            bail!(
                "{} (exit code {})",
                self.failure_prefix(),
                code.unwrap_or(-1)
            );
        }

        Ok(code)
    }
}

impl fmt::Display for Cmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Check if a program exists in PATH.
///
/// Returns the full path if found, None otherwise.
pub fn find_program(program: &str) -> Option<PathBuf> {
    which::which(program).ok()
}

/// Check if a program exists in PATH (bool version).
pub fn exists(program: &str) -> bool {
    find_program(program).is_some()
}

// =============================================================================
// Tests
// =============================================================================
