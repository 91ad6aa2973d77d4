//! Protoc process launcher.
//!
//! This module runs protoc for an [`Invocation`], retrying a bounded number
//! of times when process creation fails for a transient OS-level reason
//! (for example `ETXTBSY` right after a plugin binary was written).

use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use tracing::{debug, warn};

use crate::argfile::ArgumentFile;
use crate::error::{InvocationError, InvocationResult, LaunchError};
use crate::invocation::Invocation;
use crate::output::CapturedOutput;

/// Default number of launch attempts (the first try plus two retries).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default pause between launch attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Exit status reported when the platform provides none.
pub const UNKNOWN_EXIT_STATUS: i32 = -1;

/// What to execute.
#[derive(Debug, Clone, Copy)]
pub struct ProcessRequest<'a> {
    pub executable: &'a Path,
    pub args: &'a [String],
    /// Directory to run in; the caller's current directory when `None`.
    pub working_directory: Option<&'a Path>,
}

/// Executes a command with separate stdout and stderr capture.
pub trait ProcessRunner {
    /// Runs the process to completion and returns its exit status.
    ///
    /// Output is appended to `stdout` and `stderr`. An `Err` means the
    /// process could not be started at all.
    fn run(
        &self,
        request: &ProcessRequest<'_>,
        stdout: &mut CapturedOutput,
        stderr: &mut CapturedOutput,
    ) -> Result<i32, LaunchError>;
}

/// Runs processes with [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(
        &self,
        request: &ProcessRequest<'_>,
        stdout: &mut CapturedOutput,
        stderr: &mut CapturedOutput,
    ) -> Result<i32, LaunchError> {
        let mut cmd = Command::new(request.executable);
        cmd.args(request.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = request.working_directory {
            cmd.current_dir(dir);
        }

        let output = cmd.output().map_err(|e| {
            LaunchError::with_cause(
                format!(
                    "Error while executing process {}",
                    request.executable.display()
                ),
                e,
            )
        })?;

        stdout.extend(&output.stdout);
        stderr.extend(&output.stderr);
        Ok(exit_status_code(output.status))
    }
}

#[cfg(unix)]
fn exit_status_code(status: std::process::ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .or_else(|| status.signal().map(|signal| 128 + signal))
        .unwrap_or(UNKNOWN_EXIT_STATUS)
}

#[cfg(not(unix))]
fn exit_status_code(status: std::process::ExitStatus) -> i32 {
    status.code().unwrap_or(UNKNOWN_EXIT_STATUS)
}

/// Default transient-failure classifier: the failure wraps an underlying cause.
pub fn is_transient_launch_failure(err: &LaunchError) -> bool {
    err.has_cause()
}

/// Retry settings for launching protoc.
#[derive(Clone, Copy)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first.
    pub max_attempts: u32,
    /// Pause between attempts.
    pub delay: Duration,
    /// Decides whether a launch failure is worth retrying.
    pub is_transient: fn(&LaunchError) -> bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
            is_transient: is_transient_launch_failure,
        }
    }
}

impl std::fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

impl RetryPolicy {
    /// Sets the attempt budget (at least one attempt is always made).
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Sets the pause between attempts.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Replaces the transient-failure classifier.
    pub fn classifier(mut self, is_transient: fn(&LaunchError) -> bool) -> Self {
        self.is_transient = is_transient;
        self
    }
}

/// Cancellation handle for the pause between launch attempts.
///
/// Clones share state; triggering any clone wakes a pausing launcher.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn trigger(&self) {
        let (flag, condvar) = &*self.inner;
        *flag.lock().unwrap_or_else(|e| e.into_inner()) = true;
        condvar.notify_all();
    }

    /// Returns true while a cancellation is pending.
    pub fn is_triggered(&self) -> bool {
        *self.inner.0.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Waits for `duration`. Returns `Err(Cancelled)` if interrupted.
    ///
    /// A cancellation is consumed by the pause it aborts, so later pauses
    /// wait normally until the handle is triggered again.
    pub fn sleep(&self, duration: Duration) -> InvocationResult<()> {
        let (flag, condvar) = &*self.inner;
        let guard = flag.lock().unwrap_or_else(|e| e.into_inner());
        let (mut guard, _) = condvar
            .wait_timeout_while(guard, duration, |triggered| !*triggered)
            .unwrap_or_else(|e| e.into_inner());
        if *guard {
            *guard = false;
            return Err(InvocationError::Cancelled);
        }
        Ok(())
    }
}

/// Where a launcher is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchState {
    Idle,
    Launching,
    Retrying,
    /// Protoc ran; its exit status may still be nonzero.
    Succeeded,
    Failed,
    Cancelled,
}

/// Launches protoc and keeps its captured output.
///
/// Output accumulates across the retries of one launch and is cleared when
/// the next launch starts.
#[derive(Debug)]
pub struct Launcher<R = SystemRunner> {
    runner: R,
    policy: RetryPolicy,
    interrupt: Interrupt,
    stdout: CapturedOutput,
    stderr: CapturedOutput,
    state: LaunchState,
    attempts: u32,
}

impl Launcher<SystemRunner> {
    /// Creates a launcher that spawns real processes.
    pub fn new() -> Self {
        Self::with_runner(SystemRunner)
    }
}

impl Default for Launcher<SystemRunner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ProcessRunner> Launcher<R> {
    /// Creates a launcher with a custom process runner.
    pub fn with_runner(runner: R) -> Self {
        Self {
            runner,
            policy: RetryPolicy::default(),
            interrupt: Interrupt::new(),
            stdout: CapturedOutput::new(),
            stderr: CapturedOutput::new(),
            state: LaunchState::Idle,
            attempts: 0,
        }
    }

    /// Sets the retry policy.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Uses the given cancellation handle.
    pub fn interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Returns a handle that cancels a pending retry.
    pub fn interrupt_handle(&self) -> Interrupt {
        self.interrupt.clone()
    }

    /// Runs protoc and returns its exit status.
    ///
    /// A nonzero status is returned as-is; interpreting it is up to the caller.
    pub fn launch(&mut self, invocation: &Invocation) -> InvocationResult<i32> {
        self.state = LaunchState::Launching;
        self.attempts = 0;
        self.stdout = CapturedOutput::new();
        self.stderr = CapturedOutput::new();

        let command_line = invocation.command_line();
        let argument_file = if invocation.use_argument_file() {
            let file = ArgumentFile::create(&command_line, invocation.temp_directory())
                .inspect_err(|_| self.state = LaunchState::Failed)?;
            debug!(path = %file.path().display(), "Using arguments file");
            Some(file)
        } else {
            None
        };
        let args = match argument_file {
            Some(ref file) => vec![file.reference()],
            None => command_line,
        };

        let request = ProcessRequest {
            executable: invocation.executable(),
            args: &args,
            working_directory: invocation.working_directory(),
        };

        let max_attempts = self.policy.max_attempts.max(1);
        loop {
            self.attempts += 1;
            match self
                .runner
                .run(&request, &mut self.stdout, &mut self.stderr)
            {
                Ok(exit_code) => {
                    self.state = LaunchState::Succeeded;
                    debug!(exit_code, attempts = self.attempts, "protoc finished");
                    return Ok(exit_code);
                }
                Err(err) => {
                    let attempts_left = max_attempts - self.attempts;
                    if attempts_left == 0 || !(self.policy.is_transient)(&err) {
                        self.state = LaunchState::Failed;
                        return Err(InvocationError::Launch {
                            attempts: self.attempts,
                            source: err,
                        });
                    }

                    warn!(
                        error = %err,
                        "Unable to invoke protoc, will retry {} time(s)",
                        attempts_left
                    );
                    self.state = LaunchState::Retrying;
                    if let Err(cancelled) = self.interrupt.sleep(self.policy.delay) {
                        self.state = LaunchState::Cancelled;
                        return Err(cancelled);
                    }
                    self.state = LaunchState::Launching;
                }
            }
        }
    }

    /// Captured standard output, decoded as UTF-8.
    pub fn output(&self) -> String {
        self.stdout.text()
    }

    /// Captured standard error, decoded as UTF-8.
    pub fn error(&self) -> String {
        self.stderr.text()
    }

    pub fn state(&self) -> LaunchState {
        self.state
    }

    /// Number of attempts made by the last launch.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }
}
