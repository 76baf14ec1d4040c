// SPDX-FileCopyrightText: Copyright © 2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Bounded execution of vendor management tools
//!
//! Every invocation is capped at a fixed ceiling. Overrunning it kills the tool
//! and fails the call, as does a failure to start or a non-zero exit.

use std::{
    io::{self, Read},
    path::Path,
    process::{Child, Command, ExitStatus, Stdio},
    sync::mpsc::{self, Receiver, RecvTimeoutError},
    thread,
    time::{Duration, Instant},
};

use log::{debug, trace};
use thiserror::Error;

/// Ceiling for a single tool invocation
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Errors from running an external tool
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The tool could not be started at all
    #[error("failed to start {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The tool ran but reported failure
    #[error("{command} failed with {status}: {stderr}")]
    Exit {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    /// The tool was killed after exceeding the time limit
    #[error("{command} timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    /// Waiting on or reading from the tool failed
    #[error("io error running {command}: {source}")]
    Io {
        command: String,
        #[source]
        source: io::Error,
    },
}

impl ExecutionError {
    /// Returns true if the tool was killed for running too long
    pub fn is_timeout(&self) -> bool {
        matches!(self, ExecutionError::Timeout { .. })
    }
}

/// Runs an external program and hands back its standard output.
pub trait Runner {
    fn run(&self, program: &Path, args: &[&str]) -> Result<Vec<u8>, ExecutionError>;
}

impl<T: Runner + ?Sized> Runner for &T {
    fn run(&self, program: &Path, args: &[&str]) -> Result<Vec<u8>, ExecutionError> {
        (**self).run(program, args)
    }
}

/// Runs tools as child processes with a hard time limit
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    timeout: Duration,
    debug: bool,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(false)
    }
}

impl ProcessRunner {
    /// Creates a runner using the default ceiling.
    ///
    /// With `debug` set, each invocation and its raw output is logged verbatim.
    pub fn new(debug: bool) -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            debug,
        }
    }

    /// Overrides the per-invocation ceiling
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    /// Returns the per-invocation ceiling
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Runner for ProcessRunner {
    fn run(&self, program: &Path, args: &[&str]) -> Result<Vec<u8>, ExecutionError> {
        let command = command_line(program, args);
        trace!("Executing: {command}");

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ExecutionError::Spawn {
                command: command.clone(),
                source,
            })?;

        // Drain both pipes concurrently so a chatty tool cannot block on a full pipe
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let deadline = Instant::now() + self.timeout;
        let timed_out = |command: String| {
            if self.debug {
                debug!("Command '{command}' timed out after {:?}", self.timeout);
            }
            ExecutionError::Timeout {
                command,
                timeout: self.timeout,
            }
        };

        let status = match wait_until(&mut child, deadline) {
            Ok(Some(status)) => status,
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(timed_out(command));
            }
            Err(source) => {
                let _ = child.kill();
                return Err(ExecutionError::Io { command, source });
            }
        };

        // Helpers left behind by the tool may still hold the pipes open
        let output = match collect(stdout, deadline) {
            Ok(Some(output)) => output,
            Ok(None) => return Err(timed_out(command)),
            Err(source) => return Err(ExecutionError::Io { command, source }),
        };

        if self.debug {
            debug!(
                "Command '{command}' output is:\n'''\n{}\n'''",
                String::from_utf8_lossy(&output)
            );
        }

        if !status.success() {
            let stderr = collect(stderr, deadline).ok().flatten().unwrap_or_default();
            return Err(ExecutionError::Exit {
                command,
                status,
                stderr: String::from_utf8_lossy(&stderr).trim().to_owned(),
            });
        }

        Ok(output)
    }
}

/// Renders a program and its arguments as a single line for logs and errors
pub(crate) fn command_line(program: &Path, args: &[&str]) -> String {
    let mut line = program.display().to_string();
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}

type Pipe = Option<Receiver<io::Result<Vec<u8>>>>;

fn drain<R: Read + Send + 'static>(reader: Option<R>) -> Pipe {
    reader.map(|mut r| {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = tx.send(r.read_to_end(&mut buf).map(|_| buf));
        });
        rx
    })
}

/// Waits for a pipe to reach end of file, giving up at `deadline`
fn collect(pipe: Pipe, deadline: Instant) -> io::Result<Option<Vec<u8>>> {
    let Some(rx) = pipe else {
        return Ok(Some(Vec::new()));
    };
    match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
        Ok(read) => read.map(Some),
        Err(RecvTimeoutError::Timeout) => Ok(None),
        Err(RecvTimeoutError::Disconnected) => Err(io::Error::other("output reader panicked")),
    }
}

/// Polls the child until it exits or the deadline passes
fn wait_until(child: &mut Child, deadline: Instant) -> io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL.min(deadline - now));
    }
}
