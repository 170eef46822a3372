//! Process execution for the external analysis tools.
//!
//! Tools are spawned directly (no shell) from an [`Invocation`], their
//! output is captured, and the call suspends until the child exits. There is
//! no timeout: a tool runs until it finishes on its own.

use crate::core::error::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;
use tokio::process::Command;

/// Exit status shells use for "command not found".
pub const EXIT_COMMAND_NOT_FOUND: i32 = 127;

/// Stderr fragments that package-manager runners print when the requested
/// binary is not installed.
const NOT_FOUND_SIGNATURES: &[&str] = &[
    "command not found",
    "could not determine executable to run",
    "ERR_PNPM_RECURSIVE_EXEC_FIRST_FAIL",
    "error: Script not found",
];

/// A fully specified process to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program to execute, looked up on `PATH`.
    pub program: String,
    /// Arguments passed verbatim.
    pub args: Vec<String>,
    /// Working directory for the child.
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    /// Creates an invocation of `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Appends an argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets the working directory.
    #[must_use]
    pub fn cwd(mut self, path: impl AsRef<Path>) -> Self {
        self.cwd = Some(path.as_ref().to_path_buf());
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Output from a command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// Exit code of the command.
    pub exit_code: i32,
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
    /// Duration the command took to run.
    pub duration: Duration,
}

impl CommandOutput {
    /// Returns true if the command succeeded (exit code 0).
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Returns combined stdout and stderr output.
    #[must_use]
    pub fn combined_output(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }

    /// Returns true if the runner reported that the tool itself is missing,
    /// as opposed to the tool running and reporting findings.
    #[must_use]
    pub fn command_not_found(&self) -> bool {
        self.exit_code == EXIT_COMMAND_NOT_FOUND
            || NOT_FOUND_SIGNATURES
                .iter()
                .any(|sig| self.stderr.contains(sig))
            || self.stderr.lines().any(is_missing_command_line)
    }
}

/// Something that can run an [`Invocation`] to completion.
///
/// The production implementation is [`Executor`]; tests substitute canned
/// outputs.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Runs the invocation and waits for it to exit.
    ///
    /// A nonzero exit is a normal `Ok` result. `Err` means the process could
    /// not be started or waited on at all.
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput>;
}

/// Executor for running external tools.
#[derive(Debug, Default, Clone, Copy)]
pub struct Executor;

impl Executor {
    /// Creates a new executor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Checks if a command exists in PATH.
    #[must_use]
    pub fn command_exists(command: &str) -> bool {
        which::which(command).is_ok()
    }
}

impl CommandRunner for Executor {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        let start = Instant::now();
        tracing::debug!(command = %invocation, cwd = ?invocation.cwd, "Running command");

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);

        if let Some(ref cwd) = invocation.cwd {
            cmd.current_dir(cwd);
        }

        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::CommandNotFound {
                    command: invocation.program.clone(),
                }
            } else {
                Error::io(format!("spawn {}", invocation.program), e)
            }
        })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // Both pipes are drained concurrently with the wait so a chatty tool
        // cannot fill one pipe and stall.
        let (stdout, stderr, status) =
            tokio::join!(read_pipe(stdout), read_pipe(stderr), child.wait());

        let status = status.map_err(|e| Error::io("wait for command", e))?;

        let output = CommandOutput {
            exit_code: status.code().unwrap_or(1),
            stdout,
            stderr,
            duration: start.elapsed(),
        };

        tracing::debug!(
            command = %invocation,
            exit_code = output.exit_code,
            duration_ms = output.duration.as_millis(),
            "Command finished"
        );

        Ok(output)
    }
}

/// yarn: `error Command "tsc" not found.`
fn is_missing_command_line(line: &str) -> bool {
    line.split_once("Command \"")
        .and_then(|(_, rest)| rest.split_once('"'))
        .is_some_and(|(_, tail)| tail.trim_start().starts_with("not found"))
}

/// Reads a child pipe to end-of-stream, lossily decoding it as UTF-8.
async fn read_pipe<R>(pipe: Option<R>) -> String
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        if let Err(e) = pipe.read_to_end(&mut buf).await {
            tracing::warn!(error = %e, "Failed to read child output");
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}
