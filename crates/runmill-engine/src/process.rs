//! Child process execution and timing

use std::process::Command;
use std::time::{Duration, Instant};

use runmill_foundation::{Result, RunError};
use tracing::debug;

/// How an executed child process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitKind {
    /// The process ran to completion; zero means success. A process killed
    /// by a signal other than SIGINT reports the negated signal number.
    Code(i32),
    /// The process was cut short by Ctrl-C
    Interrupted,
}

/// Result of executing one command line
#[derive(Debug, Clone, Copy)]
pub struct Execution {
    pub exit: ExitKind,
    pub elapsed: Duration,
}

impl Execution {
    /// True when the process exited with status 0
    pub fn success(&self) -> bool {
        matches!(self.exit, ExitKind::Code(0))
    }

    /// The exit code, unless the process was interrupted
    pub fn code(&self) -> Option<i32> {
        match self.exit {
            ExitKind::Code(code) => Some(code),
            ExitKind::Interrupted => None,
        }
    }
}

/// Executes rendered command lines as child processes.
///
/// Failing to start a process at all is an error. A process that starts and
/// exits nonzero is a normal [`Execution`]; the caller decides what a bad
/// exit status means.
#[cfg_attr(test, mockall::automock)]
pub trait ProcessRunner {
    fn execute(&self, command: &str) -> Result<Execution>;
}

/// Splits command lines on whitespace and spawns the argv directly, without
/// a shell. Quoting is not interpreted, so paths and arguments containing
/// spaces cannot be expressed.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn execute(&self, command: &str) -> Result<Execution> {
        let mut parts = command.split_whitespace();
        let Some(program) = parts.next() else {
            return Err(RunError::spawn(
                command,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command line"),
            ));
        };
        let args: Vec<&str> = parts.collect();

        debug!(%command, "Spawning child process");
        let started = Instant::now();

        // The child inherits stdio and the default SIGINT disposition.
        let mut child = Command::new(program)
            .args(&args)
            .spawn()
            .map_err(|e| RunError::spawn(program, e))?;

        // Ignore Ctrl-C while waiting so it reaches only the foreground
        // child; its termination is then reported as Interrupted.
        let guard = InterruptGuard::install();
        let status = child.wait();
        drop(guard);

        let elapsed = started.elapsed();
        let exit = exit_kind(status?);
        debug!(?exit, elapsed_ms = elapsed.as_millis() as u64, "Child process finished");

        Ok(Execution { exit, elapsed })
    }
}

#[cfg(unix)]
fn exit_kind(status: std::process::ExitStatus) -> ExitKind {
    use std::os::unix::process::ExitStatusExt;

    match status.code() {
        Some(code) => ExitKind::Code(code),
        None => match status.signal() {
            Some(signo) if signo == nix::sys::signal::Signal::SIGINT as i32 => {
                ExitKind::Interrupted
            }
            Some(signo) => ExitKind::Code(-signo),
            None => ExitKind::Code(1),
        },
    }
}

#[cfg(not(unix))]
fn exit_kind(status: std::process::ExitStatus) -> ExitKind {
    ExitKind::Code(status.code().unwrap_or(1))
}

/// Holds SIGINT ignored for its lifetime and restores the previous
/// disposition on drop.
#[cfg(unix)]
struct InterruptGuard {
    previous: Option<nix::sys::signal::SigHandler>,
}

#[cfg(unix)]
impl InterruptGuard {
    fn install() -> Self {
        use nix::sys::signal::{signal, SigHandler, Signal};

        // Safety: SIG_IGN is a valid disposition and installs no handler code.
        let previous = unsafe { signal(Signal::SIGINT, SigHandler::SigIgn) }.ok();
        Self { previous }
    }
}

#[cfg(unix)]
impl Drop for InterruptGuard {
    fn drop(&mut self) {
        use nix::sys::signal::{signal, Signal};

        if let Some(previous) = self.previous.take() {
            // Safety: restores the disposition recorded at install time.
            let _ = unsafe { signal(Signal::SIGINT, previous) };
        }
    }
}

#[cfg(not(unix))]
struct InterruptGuard;

#[cfg(not(unix))]
impl InterruptGuard {
    fn install() -> Self {
        Self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_execute_reports_zero_exit() {
        let execution = SystemRunner.execute("true").unwrap();
        assert!(execution.success());
        assert_eq!(execution.code(), Some(0));
    }

    #[cfg(unix)]
    #[test]
    fn test_execute_reports_nonzero_exit() {
        let execution = SystemRunner.execute("false").unwrap();
        assert!(!execution.success());
        assert_eq!(execution.code(), Some(1));
    }

    #[cfg(unix)]
    #[test]
    fn test_execute_splits_arguments_on_whitespace() {
        // `sh -c "exit 7"` would need quoting; use test(1) instead.
        let execution = SystemRunner.execute("test a = b").unwrap();
        assert_eq!(execution.code(), Some(1));
        let execution = SystemRunner.execute("test a = a").unwrap();
        assert_eq!(execution.code(), Some(0));
    }

    #[test]
    fn test_spawn_failure_is_an_error() {
        let result = SystemRunner.execute("runmill-no-such-binary-a8c3");
        assert!(matches!(result, Err(RunError::Spawn { .. })));
    }

    #[test]
    fn test_empty_command_line_is_an_error() {
        assert!(matches!(
            SystemRunner.execute("   "),
            Err(RunError::Spawn { .. })
        ));
    }
}
