use anyhow::{Context, Result};
use std::ffi::OsStr;
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

use crate::errors::HelmDenoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// stdout and stderr are collected separately and returned.
    Capture,
    /// The child writes straight to our stdout/stderr.
    Inherit,
}

#[derive(Debug, Clone, Copy)]
pub struct RunOptions<'a> {
    pub mode: OutputMode,
    pub stdin: Option<&'a [u8]>,
    pub auto_exit_on_failure: bool,
}

impl RunOptions<'_> {
    pub fn capture() -> Self {
        Self {
            mode: OutputMode::Capture,
            stdin: None,
            auto_exit_on_failure: false,
        }
    }

    pub fn inherit() -> Self {
        Self {
            mode: OutputMode::Inherit,
            stdin: None,
            auto_exit_on_failure: false,
        }
    }
}

impl<'a> RunOptions<'a> {
    pub fn with_stdin(mut self, input: &'a [u8]) -> Self {
        self.stdin = Some(input);
        self
    }

    pub fn auto_exit(mut self) -> Self {
        self.auto_exit_on_failure = true;
        self
    }
}

#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub success: bool,
}

/// Runs `program` to completion.
///
/// In capture mode a failed run is an error carrying the child's stderr. With
/// `auto_exit_on_failure` the failure becomes [`HelmDenoError::ChildExited`] instead, which
/// makes the wrapper finish with the child's exit code once cleanup has run.
/// An inherited run without auto-exit hands the exit code back to the caller.
pub fn run<S: AsRef<OsStr>>(
    program: &Path,
    args: &[S],
    options: RunOptions<'_>,
) -> Result<ProcessOutput> {
    let program_name = program.display().to_string();
    log::debug!(
        "Running: {} {}",
        program_name,
        args.iter()
            .map(|a| a.as_ref().to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    );

    let mut command = Command::new(program);
    command.args(args);
    command.stdin(match options.stdin {
        Some(_) => Stdio::piped(),
        None if options.mode == OutputMode::Inherit => Stdio::inherit(),
        None => Stdio::null(),
    });
    match options.mode {
        OutputMode::Capture => command.stdout(Stdio::piped()).stderr(Stdio::piped()),
        OutputMode::Inherit => command.stdout(Stdio::inherit()).stderr(Stdio::inherit()),
    };

    let mut child = command
        .spawn()
        .with_context(|| format!("Failed to run {program_name}"))?;

    let stdin = child.stdin.take();
    let (status, stdout, stderr) = std::thread::scope(|scope| -> Result<_> {
        if let (Some(mut pipe), Some(input)) = (stdin, options.stdin) {
            scope.spawn(move || {
                // A child that exits without reading its input closes the pipe early.
                if let Err(err) = pipe.write_all(input) {
                    if err.kind() != ErrorKind::BrokenPipe {
                        log::debug!("Could not write stdin of child process: {err}");
                    }
                }
            });
        }

        // Drains stdout and stderr concurrently while waiting for exit.
        let output = child
            .wait_with_output()
            .with_context(|| format!("Failed to wait for {program_name}"))?;
        Ok((
            output.status,
            String::from_utf8_lossy(&output.stdout).into_owned(),
            String::from_utf8_lossy(&output.stderr).into_owned(),
        ))
    })?;

    let (exit_code, signal) = exit_code_of(status);
    let stderr = match signal {
        Some(signal) => format!(
            "Child process terminated via {}\n{}",
            signal_name(signal),
            stderr
        ),
        None => stderr,
    };

    let output = ProcessOutput {
        stdout,
        stderr,
        exit_code,
        success: status.success(),
    };

    if output.success {
        return Ok(output);
    }

    if options.auto_exit_on_failure {
        if options.mode == OutputMode::Capture {
            print!("{}", output.stdout);
            eprint!("{}", output.stderr);
        }
        return Err(HelmDenoError::ChildExited {
            program: program_name,
            code: exit_code,
        }
        .into());
    }

    match options.mode {
        OutputMode::Capture => Err(HelmDenoError::ProcessFailed {
            program: program_name,
            stderr: output.stderr,
        }
        .into()),
        OutputMode::Inherit => Ok(output),
    }
}

#[cfg(unix)]
fn exit_code_of(status: ExitStatus) -> (i32, Option<i32>) {
    use std::os::unix::process::ExitStatusExt;

    match (status.code(), status.signal()) {
        (Some(code), _) => (code, None),
        (None, Some(signal)) => (128 + signal, Some(signal)),
        (None, None) => (1, None),
    }
}

#[cfg(not(unix))]
fn exit_code_of(status: ExitStatus) -> (i32, Option<i32>) {
    (status.code().unwrap_or(1), None)
}

fn signal_name(signal: i32) -> String {
    match signal {
        1 => "SIGHUP".to_string(),
        2 => "SIGINT".to_string(),
        6 => "SIGABRT".to_string(),
        9 => "SIGKILL".to_string(),
        13 => "SIGPIPE".to_string(),
        15 => "SIGTERM".to_string(),
        other => format!("signal {other}"),
    }
}
